//! Rendering options for QR codes and barcodes.

use image::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque RGB color, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const BLACK: Color = Color([0, 0, 0]);
    pub const WHITE: Color = Color([0xFF, 0xFF, 0xFF]);
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("invalid color {:?}, expected #RRGGBB", s));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Color([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
    }
}

impl From<Color> for Rgb<u8> {
    fn from(color: Color) -> Self {
        Rgb(color.0)
    }
}

/// QR error correction level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum ErrorCorrection {
    /// ~7% recovery
    L,
    /// ~15% recovery
    #[default]
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => qrcode::EcLevel::L,
            ErrorCorrection::M => qrcode::EcLevel::M,
            ErrorCorrection::Q => qrcode::EcLevel::Q,
            ErrorCorrection::H => qrcode::EcLevel::H,
        }
    }
}

/// QR code rendering options.
///
/// Defaults match what Thai banking apps scan reliably: level M, 500 px,
/// a one-module quiet zone, black on white.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QrStyle {
    pub error_correction: ErrorCorrection,
    /// Output image width and height in pixels
    pub width: u32,
    /// Quiet zone in modules
    pub margin: u32,
    pub dark: Color,
    pub light: Color,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrection::M,
            width: 500,
            margin: 1,
            dark: Color::BLACK,
            light: Color::WHITE,
        }
    }
}

/// Code 128 rendering options.
///
/// At 96 DPI the default 120 px bar height is about 3.2 cm, comfortably
/// above the 1 cm minimum BOT asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BarcodeStyle {
    /// Width of the narrowest bar in pixels
    pub module_width: u32,
    /// Bar height in pixels
    pub height: u32,
    /// Blank border on every side in pixels
    pub margin: u32,
    /// Print the barcode data under the bars
    pub show_text: bool,
    /// Gap between bars and caption in pixels
    pub text_margin: u32,
    pub dark: Color,
    pub light: Color,
}

impl Default for BarcodeStyle {
    fn default() -> Self {
        Self {
            module_width: 2,
            height: 120,
            margin: 10,
            show_text: true,
            text_margin: 3,
            dark: Color::BLACK,
            light: Color::WHITE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse() {
        assert_eq!("#000000".parse::<Color>().unwrap(), Color::BLACK);
        assert_eq!("ffffff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("#1A2b3C".parse::<Color>().unwrap(), Color([0x1A, 0x2B, 0x3C]));
        assert!("#12345".parse::<Color>().is_err());
        assert!("#GGGGGG".parse::<Color>().is_err());
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color([0x1A, 0x2B, 0x3C]).to_string(), "#1A2B3C");
    }

    #[test]
    fn test_qr_style_deserialize() {
        let style: QrStyle =
            serde_json::from_str(r##"{"width": 300, "errorCorrection": "H", "dark": "#112233"}"##)
                .unwrap();
        assert_eq!(style.width, 300);
        assert_eq!(style.error_correction, ErrorCorrection::H);
        assert_eq!(style.dark, Color([0x11, 0x22, 0x33]));
        assert_eq!(style.light, Color::WHITE);
        assert_eq!(style.margin, 1);
    }

    #[test]
    fn test_barcode_style_caption_options() {
        let style: BarcodeStyle = serde_json::from_str(r#"{"showText": false}"#).unwrap();
        assert!(!style.show_text);
        assert_eq!(style.text_margin, 3);
        assert!(BarcodeStyle::default().show_text);
    }

    #[test]
    fn test_barcode_style_rejects_bad_color() {
        let result: Result<BarcodeStyle, _> = serde_json::from_str(r#"{"dark": "black"}"#);
        assert!(result.is_err());
    }
}
