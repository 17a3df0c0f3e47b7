//! # Bill-Payment Barcode Codec
//!
//! Parses BOT bill-payment barcode text and re-encodes it in the two
//! formats consuming banks expect.
//!
//! ## Pipeline
//!
//! ```text
//! "|0994... 50A0... 0000... 20000"
//!         │
//!         ▼  BarcodeCodec::parse
//!    BillPayment { biller_id, ref1, ref2, amount }
//!         │
//!         ├──▶ encode_bot_barcode ──▶ "|0994...\r50A0...\r0000...\r20000"
//!         └──▶ encode_emv_qr      ──▶ "000201010211...6304FE79"
//! ```
//!
//! ## Example
//!
//! ```
//! use thaibill::codec::BarcodeCodec;
//!
//! let codec = BarcodeCodec::default();
//! let bill = codec
//!     .parse("|099400016301108 50A0230680100001 0000000105542003108 20000")?
//!     .value;
//!
//! assert_eq!(bill.biller_id(), "099400016301108");
//! assert_eq!(bill.amount().to_baht_string(), "200.00");
//!
//! let barcode = codec.encode_bot_barcode(&bill);
//! assert!(barcode.warnings.is_empty());
//!
//! let qr = codec.encode_emv_qr(&bill)?;
//! assert!(qr.as_str().ends_with("6304FE79"));
//! # Ok::<(), thaibill::codec::CodecError>(())
//! ```
//!
//! ## Diagnostics
//!
//! Problems that real producers get wrong (missing marker in lenient mode,
//! missing CR delimiters, over-long content) do not abort. They come back as
//! [`Warning`]s in a [`Checked`] value and are logged at debug level;
//! callers decide whether to surface them louder.

pub mod bot;
pub mod emv;
mod record;

pub use bot::BotBarcodeText;
pub use emv::{EmvQrPayload, Initiation};
pub use record::{BillPayment, Satang};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that abort parsing or encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Wrong field count, empty field, or a field with invalid characters
    #[error("Malformed barcode: {0}")]
    MalformedInput(String),

    /// Barcode text does not start with `|` and the policy is strict
    #[error("Barcode does not start with the '|' marker")]
    MissingMarker,

    /// Amount field is not a non-negative integer
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    /// The EMV payload could not be built
    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Non-fatal findings about barcode text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Warning {
    /// The leading `|` was missing and has been assumed
    MarkerInserted,
    /// No CR delimiters; some banks cannot read such barcodes
    MissingDelimiter,
    /// Content (CR excluded) is longer than the BOT limit
    LengthExceeded { length: usize, limit: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MarkerInserted => write!(f, "missing '|' marker was inserted"),
            Warning::MissingDelimiter => {
                write!(f, "no carriage-return field delimiters in barcode data")
            }
            Warning::LengthExceeded { length, limit } => write!(
                f,
                "barcode data is {} characters excluding CR (BOT limit {})",
                length, limit
            ),
        }
    }
}

/// A value together with the warnings raised while producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checked<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

impl<T> Checked<T> {
    fn new(value: T, warnings: Vec<Warning>) -> Self {
        for warning in &warnings {
            tracing::debug!(%warning, "barcode diagnostic");
        }
        Self { value, warnings }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Checked<U> {
        Checked {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

/// How to treat text that lacks the leading `|` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerPolicy {
    /// Reject with [`CodecError::MissingMarker`]
    #[default]
    Strict,
    /// Assume the marker and report [`Warning::MarkerInserted`]
    Lenient,
}

/// Codec configuration.
///
/// Parsing and BOT-text normalization have separate marker policies:
/// scanned input is rejected without its marker by default, while text
/// headed for the barcode renderer gets the marker inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodecOptions {
    /// Applies to [`BarcodeCodec::parse`]
    pub marker_policy: MarkerPolicy,
    /// Applies to [`BarcodeCodec::normalize_bot_text`]
    pub text_marker_policy: MarkerPolicy,
    pub initiation: Initiation,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            marker_policy: MarkerPolicy::Strict,
            text_marker_policy: MarkerPolicy::Lenient,
            initiation: Initiation::default(),
        }
    }
}

/// Parser and encoders for BOT bill-payment barcodes.
///
/// Holds only configuration; every method is a pure function of its
/// arguments and the codec can be shared freely between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarcodeCodec {
    options: CodecOptions,
}

impl BarcodeCodec {
    pub fn new(options: CodecOptions) -> Self {
        Self { options }
    }

    /// A codec that assumes a missing marker instead of failing.
    pub fn lenient() -> Self {
        Self::new(CodecOptions {
            marker_policy: MarkerPolicy::Lenient,
            text_marker_policy: MarkerPolicy::Lenient,
            ..Default::default()
        })
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Parse barcode text into a [`BillPayment`].
    ///
    /// Accepts the space-separated form printed under barcodes
    /// (`|<biller> <ref1> <ref2> <satang>`) and the CR-separated form
    /// produced by [`encode_bot_barcode`](Self::encode_bot_barcode).
    pub fn parse(&self, input: &str) -> Result<Checked<BillPayment>, CodecError> {
        let input = input.trim();
        let separator = if input.contains(bot::DELIMITER) {
            bot::DELIMITER
        } else {
            ' '
        };

        let fields: Vec<&str> = input.split(separator).map(str::trim).collect();
        let &[first, ref1, ref2, amount] = fields.as_slice() else {
            return Err(CodecError::MalformedInput(format!(
                "expected 4 fields, found {}",
                fields.len()
            )));
        };
        if fields.iter().any(|field| field.is_empty()) {
            return Err(CodecError::MalformedInput("empty field".to_string()));
        }

        let mut warnings = Vec::new();
        let biller_id = match first.strip_prefix(bot::MARKER) {
            Some(rest) => rest,
            None => match self.options.marker_policy {
                MarkerPolicy::Strict => return Err(CodecError::MissingMarker),
                MarkerPolicy::Lenient => {
                    warnings.push(Warning::MarkerInserted);
                    first
                }
            },
        };

        let amount: Satang = amount.parse()?;
        let bill = BillPayment::new(biller_id, ref1, ref2, amount)?;

        Ok(Checked::new(bill, warnings))
    }

    /// Encode the canonical CR-delimited BOT barcode text.
    ///
    /// Never fails; an over-long result is reported as
    /// [`Warning::LengthExceeded`].
    pub fn encode_bot_barcode(&self, bill: &BillPayment) -> Checked<BotBarcodeText> {
        let text = bot::encode(bill);
        let warnings = bot::check(text.as_str());
        Checked::new(text, warnings)
    }

    /// Validate barcode text from an outside producer before rendering.
    ///
    /// A missing marker is inserted (the default) or rejected according to
    /// `text_marker_policy`. Missing delimiters and excess length only warn.
    pub fn normalize_bot_text(&self, text: &str) -> Result<Checked<BotBarcodeText>, CodecError> {
        let mut warnings = Vec::new();
        let text = if text.starts_with(bot::MARKER) {
            text.to_string()
        } else {
            match self.options.text_marker_policy {
                MarkerPolicy::Strict => return Err(CodecError::MissingMarker),
                MarkerPolicy::Lenient => {
                    warnings.push(Warning::MarkerInserted);
                    format!("{}{}", bot::MARKER, text)
                }
            }
        };

        warnings.extend(bot::check(&text));
        Ok(Checked::new(BotBarcodeText::from_marked(text), warnings))
    }

    /// Encode the EMVCo bill-payment QR payload.
    pub fn encode_emv_qr(&self, bill: &BillPayment) -> Result<EmvQrPayload, CodecError> {
        emv::encode(bill, self.options.initiation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "|099400016301108 50A0230680100001 0000000105542003108 20000";

    #[test]
    fn test_parse_sample() {
        let parsed = BarcodeCodec::default().parse(SAMPLE).unwrap();
        let bill = parsed.value;
        assert_eq!(bill.biller_id(), "099400016301108");
        assert_eq!(bill.ref1(), "50A0230680100001");
        assert_eq!(bill.ref2(), "0000000105542003108");
        assert_eq!(bill.amount(), Satang::new(20000));
        assert_eq!(bill.amount().baht(), (200, 0));
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_parse_trims_input() {
        let padded = format!("  {}\n", SAMPLE);
        let bill = BarcodeCodec::default().parse(&padded).unwrap().value;
        assert_eq!(bill.amount(), Satang::new(20000));
    }

    #[test]
    fn test_parse_wrong_field_count() {
        let codec = BarcodeCodec::default();
        assert!(matches!(
            codec.parse("|abc def"),
            Err(CodecError::MalformedInput(_))
        ));
        assert!(matches!(
            codec.parse("|1 A B 100 extra"),
            Err(CodecError::MalformedInput(_))
        ));
        assert!(matches!(codec.parse(""), Err(CodecError::MalformedInput(_))));
    }

    #[test]
    fn test_parse_empty_field() {
        // Double space yields an empty field
        assert!(matches!(
            BarcodeCodec::default().parse("|1 A  100"),
            Err(CodecError::MalformedInput(_))
        ));
        assert!(matches!(
            BarcodeCodec::default().parse("| A B 100"),
            Err(CodecError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_parse_invalid_amount() {
        let codec = BarcodeCodec::default();
        for amount in ["notanumber", "-100", "1.00"] {
            let input = format!("|099400016301108 50A0230680100001 0000000105542003108 {}", amount);
            assert_eq!(
                codec.parse(&input),
                Err(CodecError::InvalidAmount(amount.to_string()))
            );
        }
    }

    #[test]
    fn test_parse_missing_marker_strict() {
        let input = "099400016301108 50A0230680100001 0000000105542003108 20000";
        assert_eq!(
            BarcodeCodec::default().parse(input),
            Err(CodecError::MissingMarker)
        );
    }

    #[test]
    fn test_parse_missing_marker_lenient() {
        let input = "099400016301108 50A0230680100001 0000000105542003108 20000";
        let parsed = BarcodeCodec::lenient().parse(input).unwrap();
        assert_eq!(parsed.value.biller_id(), "099400016301108");
        assert_eq!(parsed.warnings, vec![Warning::MarkerInserted]);
    }

    #[test]
    fn test_parse_cr_form() {
        let input = "|099400016301108\r50A0230680100001\r0000000105542003108\r20000";
        let bill = BarcodeCodec::default().parse(input).unwrap().value;
        assert_eq!(bill, SAMPLE.parse::<BillPayment>().unwrap());
    }

    #[test]
    fn test_parse_crlf_form() {
        let input = "|1\r\nA\r\nB\r\n5";
        let bill = BarcodeCodec::default().parse(input).unwrap().value;
        assert_eq!(bill.ref1(), "A");
        assert_eq!(bill.amount(), Satang::new(5));
    }

    #[test]
    fn test_encode_bot_barcode() {
        let codec = BarcodeCodec::default();
        let bill = codec.parse(SAMPLE).unwrap().value;
        let encoded = codec.encode_bot_barcode(&bill);

        let text = encoded.value.as_str();
        assert!(text.starts_with("|099400016301108"));
        assert_eq!(text.matches('\r').count(), 3);
        assert!(encoded.value.content_length() <= bot::MAX_LENGTH);
        assert!(encoded.warnings.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let codec = BarcodeCodec::default();
        for amount in [0, 1, 10, 99, 100, 105, 20000, 123456789, u64::MAX] {
            let bill = BillPayment::new("0994000163011", "REF1", "abc123", Satang::new(amount))
                .unwrap();
            let once = codec
                .parse(codec.encode_bot_barcode(&bill).value.as_str())
                .unwrap()
                .value;
            let twice = codec
                .parse(codec.encode_bot_barcode(&once).value.as_str())
                .unwrap()
                .value;
            assert_eq!(once, bill);
            assert_eq!(twice, bill);
        }
    }

    #[test]
    fn test_encode_long_barcode_warns() {
        let codec = BarcodeCodec::default();
        let bill = BillPayment::new(
            "099400016301108",
            "ABCDEFGHIJKLMNOPQRST",
            "12345678901234567890",
            Satang::new(1234567),
        )
        .unwrap();
        let encoded = codec.encode_bot_barcode(&bill);
        assert_eq!(
            encoded.warnings,
            vec![Warning::LengthExceeded {
                length: 63,
                limit: 62
            }]
        );
    }

    #[test]
    fn test_normalize_inserts_marker_by_default() {
        let checked = BarcodeCodec::default()
            .normalize_bot_text("0994\rA\rB\r100")
            .unwrap();
        assert_eq!(checked.value.as_str(), "|0994\rA\rB\r100");
        assert_eq!(checked.warnings, vec![Warning::MarkerInserted]);
    }

    #[test]
    fn test_default_policies_differ_by_direction() {
        let codec = BarcodeCodec::default();
        assert_eq!(
            codec.parse("0994 A B 100"),
            Err(CodecError::MissingMarker)
        );
        assert!(codec.normalize_bot_text("0994\rA\rB\r100").is_ok());
    }

    #[test]
    fn test_normalize_strict_rejects() {
        let codec = BarcodeCodec::new(CodecOptions {
            text_marker_policy: MarkerPolicy::Strict,
            ..Default::default()
        });
        assert_eq!(
            codec.normalize_bot_text("0994\rA\rB\r100"),
            Err(CodecError::MissingMarker)
        );
    }

    #[test]
    fn test_normalize_reports_all() {
        let text = format!("{} A B 100", "9".repeat(60));
        let checked = BarcodeCodec::lenient().normalize_bot_text(&text).unwrap();
        assert_eq!(
            checked.warnings,
            vec![
                Warning::MarkerInserted,
                Warning::MissingDelimiter,
                Warning::LengthExceeded {
                    length: 69,
                    limit: 62
                },
            ]
        );
    }

    #[test]
    fn test_emv_idempotent() {
        let codec = BarcodeCodec::default();
        let bill = codec.parse(SAMPLE).unwrap().value;
        assert_eq!(
            codec.encode_emv_qr(&bill).unwrap(),
            codec.encode_emv_qr(&bill).unwrap()
        );
    }

    #[test]
    fn test_emv_checksum_matches() {
        let codec = BarcodeCodec::default();
        let bill = codec.parse(SAMPLE).unwrap().value;
        let payload = codec.encode_emv_qr(&bill).unwrap();
        let text = payload.as_str();
        let (body, crc) = text.split_at(text.len() - 4);
        assert!(body.ends_with("6304"));
        assert!(crc.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(
            u16::from_str_radix(crc, 16).unwrap(),
            emv::crc16_ccitt_false(body.as_bytes())
        );
    }

    #[test]
    fn test_options_deserialize() {
        let options: CodecOptions =
            serde_json::from_str(r#"{"markerPolicy": "lenient", "initiation": "dynamic"}"#).unwrap();
        assert_eq!(options.marker_policy, MarkerPolicy::Lenient);
        assert_eq!(options.initiation, Initiation::Dynamic);

        assert_eq!(options.text_marker_policy, MarkerPolicy::Lenient);

        let defaults: CodecOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, CodecOptions::default());
        assert_eq!(defaults.marker_policy, MarkerPolicy::Strict);

        let strict: CodecOptions =
            serde_json::from_str(r#"{"textMarkerPolicy": "strict"}"#).unwrap();
        assert_eq!(strict.text_marker_policy, MarkerPolicy::Strict);
    }
}
