//! Human-readable caption under the barcode.
//!
//! Drawn with the Spleen 12x24 bitmap font, close to the 20 px caption
//! bill-payment barcodes are usually printed with.

use image::{Rgb, RgbImage};
use spleen_font::{FONT_12X24, PSF2Font};

use super::RenderError;

pub const GLYPH_WIDTH: u64 = 12;
pub const GLYPH_HEIGHT: u64 = 24;

/// Caption for barcode data: CR delimiters are shown as spaces.
pub fn caption_text(data: &str) -> String {
    data.replace('\r', " ")
}

/// Width of `text` in pixels.
pub fn text_width(text: &str) -> u64 {
    text.chars().count() as u64 * GLYPH_WIDTH
}

/// Draw `text` with its top-left corner at (`x`, `y`), clipped to the image.
pub fn draw_text(
    img: &mut RgbImage,
    text: &str,
    x: u32,
    y: u32,
    color: Rgb<u8>,
) -> Result<(), RenderError> {
    let mut font = PSF2Font::new(FONT_12X24)
        .map_err(|_| RenderError::Image("failed to load caption font".to_string()))?;

    let mut cursor_x = u64::from(x);
    for ch in text.chars() {
        let utf8 = ch.to_string();
        if let Some(glyph) = font.glyph_for_utf8(utf8.as_bytes()) {
            for (row_y, row) in glyph.enumerate() {
                for (col_x, on) in row.enumerate() {
                    let px = cursor_x + col_x as u64;
                    let py = u64::from(y) + row_y as u64;
                    if on && px < u64::from(img.width()) && py < u64::from(img.height()) {
                        img.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
        cursor_x += GLYPH_WIDTH;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DARK: Rgb<u8> = Rgb([0, 0, 0]);

    fn dark_pixels(img: &RgbImage) -> usize {
        img.pixels().filter(|p| **p == DARK).count()
    }

    #[test]
    fn test_caption_text_replaces_cr() {
        assert_eq!(caption_text("|0994\rA\rB\r100"), "|0994 A B 100");
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width(""), 0);
        assert_eq!(text_width("|0994 A"), 7 * GLYPH_WIDTH);
    }

    #[test]
    fn test_draw_glyph() {
        let mut img = RgbImage::from_pixel(12, 24, Rgb([255, 255, 255]));
        draw_text(&mut img, "8", 0, 0, DARK).unwrap();
        assert!(dark_pixels(&img) > 0);
    }

    #[test]
    fn test_space_draws_nothing() {
        let mut img = RgbImage::from_pixel(12, 24, Rgb([255, 255, 255]));
        draw_text(&mut img, " ", 0, 0, DARK).unwrap();
        assert_eq!(dark_pixels(&img), 0);
    }

    #[test]
    fn test_draw_clips_at_edge() {
        let mut img = RgbImage::from_pixel(6, 6, Rgb([255, 255, 255]));
        draw_text(&mut img, "WWW", 3, 3, DARK).unwrap();
        assert_eq!(img.dimensions(), (6, 6));
    }
}
