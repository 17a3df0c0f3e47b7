//! # BOT Barcode Text
//!
//! The Code 128 content defined by the Bank of Thailand for bill payment:
//!
//! ```text
//! |<biller id>\r<ref1>\r<ref2>\r<amount in satang>
//! ```
//!
//! Fields are separated by carriage returns. Some banks (SCB among them)
//! will not read a barcode whose fields are separated by anything else. The
//! content excluding CR characters should not exceed 62 characters, though
//! issuers exceed it in practice, so that limit only produces a warning.

use serde::Serialize;
use std::fmt;

use super::{BillPayment, Warning};

/// Leading marker of every BOT barcode.
pub const MARKER: char = '|';

/// Field delimiter inside the barcode.
pub const DELIMITER: char = '\r';

/// Maximum content length, CR characters excluded.
pub const MAX_LENGTH: usize = 62;

/// Canonical BOT barcode text, ready for a Code 128 renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct BotBarcodeText(String);

impl BotBarcodeText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Character count with CR delimiters left out.
    pub fn content_length(&self) -> usize {
        content_length(&self.0)
    }

    /// Wrap text that already starts with the marker.
    pub(crate) fn from_marked(text: String) -> Self {
        debug_assert!(text.starts_with(MARKER));
        Self(text)
    }
}

impl AsRef<str> for BotBarcodeText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BotBarcodeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn content_length(text: &str) -> usize {
    text.chars().filter(|&c| c != DELIMITER).count()
}

/// Build the canonical text for a record.
pub(crate) fn encode(bill: &BillPayment) -> BotBarcodeText {
    BotBarcodeText(format!(
        "{MARKER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}",
        bill.biller_id(),
        bill.ref1(),
        bill.ref2(),
        bill.amount().get()
    ))
}

/// Structural checks that never reject the text.
pub(crate) fn check(text: &str) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if !text.contains(DELIMITER) {
        warnings.push(Warning::MissingDelimiter);
    }

    let length = content_length(text);
    if length > MAX_LENGTH {
        warnings.push(Warning::LengthExceeded {
            length,
            limit: MAX_LENGTH,
        });
    }

    warnings
}
