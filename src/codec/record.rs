//! # Bill Payment Record
//!
//! The decoded form of a BOT bill-payment barcode: biller id, two
//! references and an amount in satang.
//!
//! Amounts are fixed-point. [`Satang`] stores the integer minor units and
//! derives the baht value on demand, so a record always re-encodes to the
//! exact text it was parsed from.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;
use std::str::FromStr;

use super::{BarcodeCodec, CodecError};

/// An amount in satang (1/100 baht).
///
/// ## Example
///
/// ```
/// use thaibill::codec::Satang;
///
/// let amount: Satang = "20000".parse().unwrap();
/// assert_eq!(amount.baht(), (200, 0));
/// assert_eq!(amount.to_baht_string(), "200.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Satang(u64);

impl Satang {
    /// Satang per baht
    pub const PER_BAHT: u64 = 100;

    pub const ZERO: Satang = Satang(0);

    pub const fn new(satang: u64) -> Self {
        Self(satang)
    }

    /// Raw minor units.
    pub const fn get(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Whole baht and the remaining satang.
    pub const fn baht(self) -> (u64, u8) {
        (self.0 / Self::PER_BAHT, (self.0 % Self::PER_BAHT) as u8)
    }

    /// Major-unit amount with exactly two fraction digits, e.g. `"200.00"`.
    pub fn to_baht_string(self) -> String {
        let (baht, satang) = self.baht();
        format!("{}.{:02}", baht, satang)
    }
}

impl fmt::Display for Satang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_baht_string())
    }
}

/// Parses the barcode amount field: ASCII digits only.
///
/// Signs, decimal points and whitespace are rejected rather than
/// interpreted, so `"-5"`, `"+5"` and `"1.50"` are all invalid.
impl FromStr for Satang {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::InvalidAmount(s.to_string()));
        }
        s.parse::<u64>()
            .map(Satang)
            .map_err(|_| CodecError::InvalidAmount(s.to_string()))
    }
}

impl From<u64> for Satang {
    fn from(satang: u64) -> Self {
        Self(satang)
    }
}

/// A validated bill-payment record.
///
/// Fields are private and only reachable through getters; a record cannot
/// change once constructed.
///
/// ## Example
///
/// ```
/// use thaibill::codec::{BillPayment, Satang};
///
/// let bill = BillPayment::new("099400016301108", "50A0230680100001", "0000000105542003108", Satang::new(20000))?;
/// assert_eq!(bill.amount().to_baht_string(), "200.00");
/// # Ok::<(), thaibill::codec::CodecError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BillPayment {
    biller_id: String,
    ref1: String,
    ref2: String,
    amount: Satang,
}

impl BillPayment {
    /// Build a record, validating every field.
    ///
    /// The biller id must be ASCII digits, both references ASCII
    /// alphanumeric, and none of them empty.
    pub fn new(
        biller_id: impl Into<String>,
        ref1: impl Into<String>,
        ref2: impl Into<String>,
        amount: Satang,
    ) -> Result<Self, CodecError> {
        let biller_id = biller_id.into();
        let ref1 = ref1.into();
        let ref2 = ref2.into();

        if biller_id.is_empty() || !biller_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::MalformedInput(format!(
                "biller id must be digits, got {:?}",
                biller_id
            )));
        }
        check_reference("ref1", &ref1)?;
        check_reference("ref2", &ref2)?;

        Ok(Self {
            biller_id,
            ref1,
            ref2,
            amount,
        })
    }

    pub fn biller_id(&self) -> &str {
        &self.biller_id
    }

    pub fn ref1(&self) -> &str {
        &self.ref1
    }

    pub fn ref2(&self) -> &str {
        &self.ref2
    }

    pub fn amount(&self) -> Satang {
        self.amount
    }
}

fn check_reference(name: &str, value: &str) -> Result<(), CodecError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(CodecError::MalformedInput(format!(
            "{} must be alphanumeric, got {:?}",
            name, value
        )));
    }
    Ok(())
}

/// Parses with default (strict) codec options, discarding warnings.
impl FromStr for BillPayment {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BarcodeCodec::default().parse(s).map(|checked| checked.value)
    }
}

impl Serialize for BillPayment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("BillPayment", 5)?;
        state.serialize_field("billerId", &self.biller_id)?;
        state.serialize_field("ref1", &self.ref1)?;
        state.serialize_field("ref2", &self.ref2)?;
        state.serialize_field("amount", &self.amount.to_baht_string())?;
        state.serialize_field("amountSatang", &self.amount.get())?;
        state.end()
    }
}
