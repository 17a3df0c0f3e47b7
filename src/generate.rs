//! # End-to-End Generation
//!
//! Parse a BOT barcode, encode both payloads and render them.
//!
//! Each artifact (QR code, barcode) is produced in one of three ways:
//!
//! | `return_blob` | output path | Result |
//! |---------------|-------------|--------|
//! | `true` | ignored | `data:image/png;base64,...` URL |
//! | `false` | set | PNG written to the path |
//! | `false` | unset | not rendered |
//!
//! The payload strings and parsed record are returned in every case.
//!
//! ## Example
//!
//! ```
//! use thaibill::generate::{generate, GenerateOptions};
//!
//! let options = GenerateOptions {
//!     return_blob: true,
//!     ..Default::default()
//! };
//! let result = generate(
//!     "|099400016301108 50A0230680100001 0000000105542003108 20000",
//!     &options,
//! )?;
//!
//! assert!(result.qr_code.unwrap().starts_with("data:image/png;base64,"));
//! assert_eq!(result.parsed_data.amount().to_baht_string(), "200.00");
//! # Ok::<(), thaibill::ThaiBillError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::codec::{
    BarcodeCodec, BillPayment, BotBarcodeText, Checked, CodecOptions, EmvQrPayload, Warning,
};
use crate::error::ThaiBillError;
use crate::render::{self, BarcodeStyle, QrStyle, RenderError};

/// Options for [`generate`] and [`generate_async`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateOptions {
    /// Where to save the QR code (ignored when `return_blob` is set)
    pub qr_output_path: Option<PathBuf>,
    /// Where to save the barcode (ignored when `return_blob` is set)
    pub barcode_output_path: Option<PathBuf>,
    /// Return data URLs instead of writing files
    pub return_blob: bool,
    #[serde(flatten)]
    pub codec: CodecOptions,
    pub qr_style: QrStyle,
    pub barcode_style: BarcodeStyle,
}

impl GenerateOptions {
    /// Load options from a JSON file with camelCase keys.
    pub fn from_json_file(path: &Path) -> Result<Self, ThaiBillError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| {
            ThaiBillError::Config(format!("invalid options file {}: {}", path.display(), e))
        })
    }
}

/// Everything produced from one barcode.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generated {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode_path: Option<PathBuf>,
    pub parsed_data: BillPayment,
    pub qr_payload: EmvQrPayload,
    pub barcode_data: BotBarcodeText,
    pub warnings: Vec<Warning>,
}

/// How one rendered image was delivered.
#[derive(Debug)]
enum Artifact {
    DataUrl(String),
    File(PathBuf),
    Skipped,
}

/// Parsed record plus both payloads, before rendering.
struct Payloads {
    bill: BillPayment,
    qr_payload: EmvQrPayload,
    barcode_data: BotBarcodeText,
    warnings: Vec<Warning>,
}

impl Payloads {
    fn encode(input: &str, options: &CodecOptions) -> Result<Self, ThaiBillError> {
        let codec = BarcodeCodec::new(*options);
        let Checked {
            value: bill,
            mut warnings,
        } = codec.parse(input)?;

        let barcode = codec.encode_bot_barcode(&bill);
        warnings.extend(barcode.warnings);
        let qr_payload = codec.encode_emv_qr(&bill)?;

        tracing::debug!(
            biller_id = bill.biller_id(),
            amount = %bill.amount(),
            "encoded bill payment"
        );

        Ok(Self {
            bill,
            qr_payload,
            barcode_data: barcode.value,
            warnings,
        })
    }

    fn finish(self, qr: Artifact, barcode: Artifact) -> Generated {
        let mut generated = Generated {
            qr_code: None,
            barcode: None,
            qr_code_path: None,
            barcode_path: None,
            parsed_data: self.bill,
            qr_payload: self.qr_payload,
            barcode_data: self.barcode_data,
            warnings: self.warnings,
        };
        match qr {
            Artifact::DataUrl(url) => generated.qr_code = Some(url),
            Artifact::File(path) => generated.qr_code_path = Some(path),
            Artifact::Skipped => {}
        }
        match barcode {
            Artifact::DataUrl(url) => generated.barcode = Some(url),
            Artifact::File(path) => generated.barcode_path = Some(path),
            Artifact::Skipped => {}
        }
        generated
    }
}

/// Render only if the options ask for this artifact.
fn produce(
    return_blob: bool,
    path: Option<&Path>,
    draw: impl FnOnce() -> Result<Vec<u8>, RenderError>,
) -> Result<Artifact, RenderError> {
    if return_blob {
        Ok(Artifact::DataUrl(render::to_data_url(&draw()?)))
    } else if let Some(path) = path {
        let png = draw()?;
        Ok(Artifact::File(render::write_png(path, &png)?))
    } else {
        Ok(Artifact::Skipped)
    }
}

/// Generate QR code and barcode from BOT barcode text, blocking.
pub fn generate(input: &str, options: &GenerateOptions) -> Result<Generated, ThaiBillError> {
    let payloads = Payloads::encode(input, &options.codec)?;

    let qr = produce(
        options.return_blob,
        options.qr_output_path.as_deref(),
        || render::render_qr(payloads.qr_payload.as_str(), &options.qr_style),
    )?;
    let barcode = produce(
        options.return_blob,
        options.barcode_output_path.as_deref(),
        || render::render_barcode(payloads.barcode_data.as_str(), &options.barcode_style),
    )?;

    Ok(payloads.finish(qr, barcode))
}

/// Generate QR code and barcode from BOT barcode text.
///
/// Both images render in parallel on the blocking thread pool.
pub async fn generate_async(
    input: &str,
    options: &GenerateOptions,
) -> Result<Generated, ThaiBillError> {
    let payloads = Payloads::encode(input, &options.codec)?;
    let return_blob = options.return_blob;

    let qr_task = {
        let payload = payloads.qr_payload.as_str().to_string();
        let path = options.qr_output_path.clone();
        let style = options.qr_style;
        tokio::task::spawn_blocking(move || {
            produce(return_blob, path.as_deref(), || render::render_qr(&payload, &style))
        })
    };
    let barcode_task = {
        let payload = payloads.barcode_data.as_str().to_string();
        let path = options.barcode_output_path.clone();
        let style = options.barcode_style;
        tokio::task::spawn_blocking(move || {
            produce(return_blob, path.as_deref(), || {
                render::render_barcode(&payload, &style)
            })
        })
    };

    let (qr, barcode) = tokio::join!(qr_task, barcode_task);
    let qr = qr.map_err(|e| ThaiBillError::Task(e.to_string()))??;
    let barcode = barcode.map_err(|e| ThaiBillError::Task(e.to_string()))??;

    Ok(payloads.finish(qr, barcode))
}

/// QR code data URL for BOT barcode text.
pub fn qr_data_url(input: &str) -> Result<String, ThaiBillError> {
    let payloads = Payloads::encode(input, &CodecOptions::default())?;
    let png = render::render_qr(payloads.qr_payload.as_str(), &QrStyle::default())?;
    Ok(render::to_data_url(&png))
}

/// Barcode data URL for BOT barcode text.
pub fn barcode_data_url(input: &str) -> Result<String, ThaiBillError> {
    let payloads = Payloads::encode(input, &CodecOptions::default())?;
    let png = render::render_barcode(payloads.barcode_data.as_str(), &BarcodeStyle::default())?;
    Ok(render::to_data_url(&png))
}

/// Save QR code and barcode for BOT barcode text to the given files.
pub fn save(input: &str, qr_path: &Path, barcode_path: &Path) -> Result<Generated, ThaiBillError> {
    generate(
        input,
        &GenerateOptions {
            qr_output_path: Some(qr_path.to_path_buf()),
            barcode_output_path: Some(barcode_path.to_path_buf()),
            ..Default::default()
        },
    )
}

/// Render barcode text that came from another producer.
///
/// The text is checked first: a missing `|` is repaired (the default) or
/// rejected per `text_marker_policy`, and delimiter or length problems are returned as
/// warnings alongside the PNG.
pub fn barcode_png_from_text(
    text: &str,
    codec: &CodecOptions,
    style: &BarcodeStyle,
) -> Result<Checked<Vec<u8>>, ThaiBillError> {
    let checked = BarcodeCodec::new(*codec).normalize_bot_text(text)?;
    let png = render::render_barcode(checked.value.as_str(), style)?;
    Ok(checked.map(|_| png))
}
