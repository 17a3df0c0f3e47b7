//! # EMVCo Bill-Payment QR Payload
//!
//! Encodes a [`BillPayment`] as a Thai QR bill-payment payload: an EMVCo
//! merchant-presented TLV string terminated by a CRC-16 checksum.
//!
//! ## Layout
//!
//! Every element is `TT LL V`: a two-digit tag, a two-digit decimal length
//! and the value. Top-level tags are emitted in ascending order.
//!
//! | Tag | Name | Value |
//! |-----|------|-------|
//! | 00 | Payload format indicator | `01` |
//! | 01 | Point of initiation | `11` static, `12` dynamic |
//! | 30 | Merchant account info (bill payment) | nested TLV, see below |
//! | 53 | Transaction currency | `764` (THB) |
//! | 54 | Transaction amount | `200.00`, omitted for zero |
//! | 58 | Country code | `TH` |
//! | 63 | CRC | 4 uppercase hex digits |
//!
//! Tag 30 contains:
//!
//! | Sub-tag | Value |
//! |---------|-------|
//! | 00 | AID `A000000677010112` |
//! | 01 | Biller id |
//! | 02 | Reference 1 |
//! | 03 | Reference 2 |
//!
//! ## Checksum
//!
//! CRC-16/CCITT-FALSE (polynomial `0x1021`, initial value `0xFFFF`, no
//! reflection, no final XOR) over the whole payload including the `6304`
//! header of the CRC element itself.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{BillPayment, CodecError};

/// Application identifier for domestic bill payment.
pub const BILL_PAYMENT_AID: &str = "A000000677010112";

/// ISO 4217 numeric code for Thai Baht.
pub const CURRENCY_THB: &str = "764";

pub const COUNTRY_TH: &str = "TH";

/// Longest value a two-digit length field can describe.
pub const MAX_VALUE_LENGTH: usize = 99;

/// Longest transaction amount EMVCo allows in tag 54.
pub const MAX_AMOUNT_LENGTH: usize = 13;

/// Top-level and tag 30 identifiers.
pub mod tag {
    pub const PAYLOAD_FORMAT: &str = "00";
    pub const POINT_OF_INITIATION: &str = "01";
    pub const MERCHANT_BILL_PAYMENT: &str = "30";
    pub const CURRENCY: &str = "53";
    pub const AMOUNT: &str = "54";
    pub const COUNTRY: &str = "58";
    pub const CRC: &str = "63";

    pub const BILLER_AID: &str = "00";
    pub const BILLER_ID: &str = "01";
    pub const BILLER_REF1: &str = "02";
    pub const BILLER_REF2: &str = "03";
}

/// Point of initiation method (tag 01).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Initiation {
    /// `11`: the same code may be paid repeatedly
    #[default]
    Static,
    /// `12`: the code is meant for a single transaction
    Dynamic,
}

impl Initiation {
    pub fn code(self) -> &'static str {
        match self {
            Initiation::Static => "11",
            Initiation::Dynamic => "12",
        }
    }
}

/// A finished EMVCo QR payload, checksum included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmvQrPayload(String);

impl EmvQrPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// The four hex digits of the trailing CRC element.
    pub fn checksum(&self) -> &str {
        &self.0[self.0.len() - 4..]
    }
}

impl AsRef<str> for EmvQrPayload {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmvQrPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append one TLV element.
fn push_tlv(out: &mut String, tag: &str, value: &str) -> Result<(), CodecError> {
    if value.len() > MAX_VALUE_LENGTH {
        return Err(CodecError::Encoding(format!(
            "value for tag {} is {} characters (max {})",
            tag,
            value.len(),
            MAX_VALUE_LENGTH
        )));
    }
    out.push_str(tag);
    out.push_str(&format!("{:02}", value.len()));
    out.push_str(value);
    Ok(())
}

/// Encode a bill payment as an EMVCo QR payload.
pub(crate) fn encode(bill: &BillPayment, initiation: Initiation) -> Result<EmvQrPayload, CodecError> {
    let mut merchant = String::new();
    push_tlv(&mut merchant, tag::BILLER_AID, BILL_PAYMENT_AID)?;
    push_tlv(&mut merchant, tag::BILLER_ID, bill.biller_id())?;
    push_tlv(&mut merchant, tag::BILLER_REF1, bill.ref1())?;
    push_tlv(&mut merchant, tag::BILLER_REF2, bill.ref2())?;

    let mut payload = String::with_capacity(160);
    push_tlv(&mut payload, tag::PAYLOAD_FORMAT, "01")?;
    push_tlv(&mut payload, tag::POINT_OF_INITIATION, initiation.code())?;
    push_tlv(&mut payload, tag::MERCHANT_BILL_PAYMENT, &merchant)?;
    push_tlv(&mut payload, tag::CURRENCY, CURRENCY_THB)?;

    if !bill.amount().is_zero() {
        let amount = bill.amount().to_baht_string();
        if amount.len() > MAX_AMOUNT_LENGTH {
            return Err(CodecError::Encoding(format!(
                "amount {} exceeds {} characters",
                amount, MAX_AMOUNT_LENGTH
            )));
        }
        push_tlv(&mut payload, tag::AMOUNT, &amount)?;
    }

    push_tlv(&mut payload, tag::COUNTRY, COUNTRY_TH)?;

    // The checksum covers its own tag and length.
    payload.push_str(tag::CRC);
    payload.push_str("04");
    let crc = crc16_ccitt_false(payload.as_bytes());
    payload.push_str(&format!("{:04X}", crc));

    Ok(EmvQrPayload(payload))
}

/// CRC-16/CCITT-FALSE: poly `0x1021`, init `0xFFFF`, MSB first, no xorout.
///
/// ```
/// use thaibill::codec::emv::crc16_ccitt_false;
///
/// assert_eq!(crc16_ccitt_false(b"123456789"), 0x29B1);
/// ```
pub fn crc16_ccitt_false(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Check the trailing `6304XXXX` element of a payload.
///
/// Returns false for anything that does not end in a CRC element. Hex
/// digits are compared case-insensitively.
pub fn verify_crc(payload: &str) -> bool {
    if !payload.is_ascii() || payload.len() < 8 {
        return false;
    }
    let split = payload.len() - 4;
    let (body, checksum) = payload.split_at(split);
    if !body.ends_with("6304") {
        return false;
    }
    match u16::from_str_radix(checksum, 16) {
        Ok(expected) => {
            checksum.bytes().all(|b| b.is_ascii_hexdigit())
                && crc16_ccitt_false(body.as_bytes()) == expected
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Satang;
    use pretty_assertions::assert_eq;

    fn sample(amount: u64) -> BillPayment {
        BillPayment::new(
            "099400016301108",
            "50A0230680100001",
            "0000000105542003108",
            Satang::new(amount),
        )
        .unwrap()
    }

    #[test]
    fn test_crc_check_value() {
        assert_eq!(crc16_ccitt_false(b"123456789"), 0x29B1);
        assert_eq!(crc16_ccitt_false(b""), 0xFFFF);
    }

    #[test]
    fn test_push_tlv() {
        let mut out = String::new();
        push_tlv(&mut out, "58", "TH").unwrap();
        push_tlv(&mut out, "00", "").unwrap();
        assert_eq!(out, "5802TH0000");
    }

    #[test]
    fn test_push_tlv_too_long() {
        let mut out = String::new();
        let value = "9".repeat(100);
        assert!(matches!(
            push_tlv(&mut out, "01", &value),
            Err(CodecError::Encoding(_))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_encode_reference_payload() {
        let payload = encode(&sample(20000), Initiation::Static).unwrap();
        assert_eq!(
            payload.as_str(),
            "00020101021130820016A0000006770101120115099400016301108021650A0230680100001\
             0319000000010554200310853037645406200.005802TH6304FE79"
        );
        assert_eq!(payload.checksum(), "FE79");
    }

    #[test]
    fn test_encode_dynamic() {
        let payload = encode(&sample(20000), Initiation::Dynamic).unwrap();
        assert!(payload.as_str().starts_with("000201010212"));
        assert_eq!(payload.checksum(), "BE90");
    }

    #[test]
    fn test_zero_amount_omits_tag() {
        let payload = encode(&sample(0), Initiation::Static).unwrap();
        assert!(!payload.as_str().contains("5406"));
        assert!(payload.as_str().ends_with("53037645802TH6304B5D9"));
    }

    #[test]
    fn test_amount_too_long() {
        // 10^12 baht renders as 16 characters
        let bill = sample(100_000_000_000_000);
        assert!(matches!(
            encode(&bill, Initiation::Static),
            Err(CodecError::Encoding(_))
        ));
    }

    #[test]
    fn test_longest_amount_fits() {
        // 9999999999.99 is exactly 13 characters
        let bill = sample(999_999_999_999);
        let payload = encode(&bill, Initiation::Static).unwrap();
        assert!(payload.as_str().contains("54139999999999.99"));
    }

    #[test]
    fn test_verify_crc() {
        let payload = encode(&sample(20000), Initiation::Static).unwrap();
        assert!(verify_crc(payload.as_str()));
        let text = payload.as_str();
        let lowercase = format!("{}{}", &text[..text.len() - 4], payload.checksum().to_lowercase());
        assert!(verify_crc(&lowercase));

        let tampered = payload.as_str().replace("200.00", "900.00");
        assert!(!verify_crc(&tampered));
        assert!(!verify_crc("6304"));
        assert!(!verify_crc("00020101021163041234"));
        assert!(!verify_crc("0002016304+FFF"));
    }
}
