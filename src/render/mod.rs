//! # Payload Rendering
//!
//! Turns finished payload strings into PNG images.
//!
//! ## Architecture
//!
//! ```text
//! EMV payload ─▶ qrcode matrix  ─┐
//!                                ├─▶ RgbImage ─▶ PNG bytes ─┬─▶ data URL
//! BOT text    ─▶ Code 128 bars  ─┘                          └─▶ file
//! ```
//!
//! Every function here is synchronous and CPU bound. Async callers should
//! run them on the blocking pool (see [`crate::generate::generate_async`]).
//!
//! ## Example
//!
//! ```
//! use thaibill::render::{self, BarcodeStyle, QrStyle};
//!
//! let qr_png = render::render_qr("00020101021153037645802TH6304", &QrStyle::default())?;
//! let url = render::to_data_url(&qr_png);
//! assert!(url.starts_with("data:image/png;base64,"));
//!
//! let bar_png = render::render_barcode("|0994\rA\rB\r100", &BarcodeStyle::default())?;
//! assert!(!bar_png.is_empty());
//! # Ok::<(), thaibill::render::RenderError>(())
//! ```

mod caption;
pub mod code128;
mod style;

pub use style::{BarcodeStyle, Color, ErrorCorrection, QrStyle};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageEncoder, Rgb, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix of every data URL produced by [`to_data_url`].
pub const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Largest image either renderer will allocate, in pixels.
pub const MAX_PIXELS: u64 = 64 * 1024 * 1024;

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Nothing to render: payload is empty")]
    EmptyPayload,

    #[error("Cannot encode barcode: {0}")]
    Unencodable(String),

    #[error("QR code generation failed: {0}")]
    Qr(String),

    #[error("Image encoding error: {0}")]
    Image(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Render a QR code as a square PNG of exactly `style.width` pixels.
///
/// The image is never smaller than one pixel per module; a width below the
/// module count is raised to it.
pub fn render_qr(payload: &str, style: &QrStyle) -> Result<Vec<u8>, RenderError> {
    if payload.is_empty() {
        return Err(RenderError::EmptyPayload);
    }

    let code =
        qrcode::QrCode::with_error_correction_level(payload.as_bytes(), style.error_correction.into())
            .map_err(|e| RenderError::Qr(e.to_string()))?;

    let qr_size = code.width();
    let margin = style.margin as usize;
    let modules = qr_size + 2 * margin;
    let side = u64::from(style.width).max(modules as u64);
    let (size, _) = canvas_size(side, side)?;

    let mut img = RgbImage::from_pixel(size, size, style.light.into());
    let dark: Rgb<u8> = style.dark.into();

    // Map every pixel back to its module so the output is exactly `size`
    // wide regardless of how the module count divides it.
    for y in 0..size {
        let my = y as usize * modules / size as usize;
        if my < margin || my >= margin + qr_size {
            continue;
        }
        for x in 0..size {
            let mx = x as usize * modules / size as usize;
            if mx < margin || mx >= margin + qr_size {
                continue;
            }
            if code[(mx - margin, my - margin)] == qrcode::Color::Dark {
                img.put_pixel(x, y, dark);
            }
        }
    }

    tracing::debug!(version = ?code.version(), modules = qr_size, size, "rendered QR code");
    to_png(&img)
}

/// Render a Code 128 barcode as PNG.
///
/// Code sets are chosen automatically, so CR delimiters, the `|` marker and
/// lowercase references all encode. With `show_text` the payload is printed
/// under the bars, CR shown as a space; the image widens if the caption is
/// wider than the symbol.
pub fn render_barcode(payload: &str, style: &BarcodeStyle) -> Result<Vec<u8>, RenderError> {
    let bars = code128::encode(payload)?;

    let module_width = u64::from(style.module_width.max(1));
    let bar_height = u64::from(style.height.max(1));
    let margin = u64::from(style.margin);

    let label = style.show_text.then(|| caption::caption_text(payload));
    let caption_width = label.as_deref().map_or(0, caption::text_width);
    let caption_height = match label {
        Some(_) => u64::from(style.text_margin) + caption::GLYPH_HEIGHT,
        None => 0,
    };

    let bars_width = (bars.len() as u64).saturating_mul(module_width);
    let content_width = bars_width.max(caption_width);
    let (width, height) = canvas_size(
        content_width.saturating_add(2 * margin),
        bar_height + caption_height + 2 * margin,
    )?;

    let mut img = RgbImage::from_pixel(width, height, style.light.into());
    let dark: Rgb<u8> = style.dark.into();

    // Every coordinate below is inside the validated canvas.
    let bars_x = margin + (content_width - bars_width) / 2;
    for (i, &bar) in bars.iter().enumerate() {
        if !bar {
            continue;
        }
        let x0 = bars_x + i as u64 * module_width;
        for x in x0..x0 + module_width {
            for y in margin..margin + bar_height {
                img.put_pixel(x as u32, y as u32, dark);
            }
        }
    }

    if let Some(text) = &label {
        let x = margin + (content_width - caption_width) / 2;
        let y = margin + bar_height + u64::from(style.text_margin);
        caption::draw_text(&mut img, text, x as u32, y as u32, dark)?;
    }

    tracing::debug!(modules = bars.len(), width, height, "rendered Code 128 barcode");
    to_png(&img)
}

/// Validate image dimensions against [`MAX_PIXELS`].
fn canvas_size(width: u64, height: u64) -> Result<(u32, u32), RenderError> {
    let too_large = || {
        RenderError::Image(format!(
            "{}x{} image exceeds the {} pixel limit",
            width, height, MAX_PIXELS
        ))
    };
    let pixels = width.checked_mul(height).ok_or_else(too_large)?;
    if pixels > MAX_PIXELS {
        return Err(too_large());
    }
    Ok((
        u32::try_from(width).map_err(|_| too_large())?,
        u32::try_from(height).map_err(|_| too_large())?,
    ))
}

/// Encode an RGB image as PNG bytes.
fn to_png(img: &RgbImage) -> Result<Vec<u8>, RenderError> {
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e: image::ImageError| RenderError::Image(e.to_string()))?;

    Ok(png_bytes)
}

/// Wrap PNG bytes in a `data:image/png;base64,` URL.
pub fn to_data_url(png: &[u8]) -> String {
    format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(png))
}

/// Write PNG bytes to `path`, returning the absolute path when it resolves.
///
/// The file handle is owned by this call and flushed before returning; it
/// is closed on every exit path.
pub fn write_png(path: &Path, png: &[u8]) -> Result<PathBuf, RenderError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(png)?;
    writer.flush()?;

    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    tracing::info!(path = %resolved.display(), bytes = png.len(), "saved image");
    Ok(resolved)
}
