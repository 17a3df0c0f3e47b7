//! # thaibill - Thai Bill-Payment Barcode Converter
//!
//! thaibill turns a Bank of Thailand (BOT) bill-payment barcode into the two
//! artifacts Thai banking apps can scan. It provides:
//!
//! - **Codec**: parse BOT barcode text, re-encode it as canonical Code 128
//!   content and as an EMVCo "Thai QR" bill-payment payload
//! - **Rendering**: QR code and Code 128 images as PNG, data URLs or files
//! - **Generation**: the full pipeline, blocking or on the tokio blocking pool
//! - **Server**: a small HTTP API around the pipeline
//!
//! ## Quick Start
//!
//! ```
//! use thaibill::{BarcodeCodec, render};
//!
//! let codec = BarcodeCodec::default();
//! let bill = codec
//!     .parse("|099400016301108 50A0230680100001 0000000105542003108 20000")?
//!     .value;
//!
//! // EMVCo payload for the QR code
//! let qr_payload = codec.encode_emv_qr(&bill)?;
//! let qr_png = render::render_qr(qr_payload.as_str(), &render::QrStyle::default())?;
//!
//! // CR-delimited content for the Code 128 barcode
//! let barcode = codec.encode_bot_barcode(&bill).value;
//! let barcode_png = render::render_barcode(barcode.as_str(), &render::BarcodeStyle::default())?;
//!
//! assert!(!qr_png.is_empty() && !barcode_png.is_empty());
//! # Ok::<(), thaibill::error::ThaiBillError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`codec`] | Barcode parsing, BOT text and EMV QR encoding |
//! | [`render`] | QR and Code 128 rasterization |
//! | [`generate`] | End-to-end pipeline and output options |
//! | [`server`] | HTTP API |
//! | [`error`] | Error types |

pub mod codec;
pub mod error;
pub mod generate;
pub mod render;
pub mod server;

// Re-exports for convenience
pub use codec::{BarcodeCodec, BillPayment, Satang};
pub use error::ThaiBillError;
pub use generate::{GenerateOptions, Generated, generate, generate_async};
