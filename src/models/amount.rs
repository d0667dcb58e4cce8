use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A non-negative GBP amount, normalized to exactly two fractional digits.
///
/// Equality, ordering and deduplication all happen after rounding, so
/// `92.5` and `92.50` are the same amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub fn new(value: Decimal) -> Self {
        let mut rounded = value.round_dp(2);
        rounded.rescale(2);
        Amount(rounded)
    }

    /// Parse a plain decimal string such as `92.50` or `92`. Negative
    /// values are not amounts.
    pub fn parse(text: &str) -> Option<Self> {
        let value = Decimal::from_str(text).ok()?;
        if value.is_sign_negative() {
            return None;
        }
        Some(Amount::new(value))
    }

    /// Build an amount from separately displayed integer and fractional
    /// parts. Both parts must be non-empty and consist solely of digits.
    pub fn from_parts(int_part: &str, dec_part: &str) -> Option<Self> {
        if int_part.is_empty() || dec_part.is_empty() {
            return None;
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !dec_part.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }
        Amount::parse(&format!("{int_part}.{dec_part}"))
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        let value = Decimal::from_f64(value)?;
        if value.is_sign_negative() {
            return None;
        }
        Some(Amount::new(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn abs_distance(&self, other: Amount) -> Decimal {
        (self.0 - other.0).abs()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // scale is pinned to 2 at construction, so this renders e.g. 92.50
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        if value.is_sign_negative() {
            return Err(serde::de::Error::custom("amount must be non-negative"));
        }
        Ok(Amount::new(value))
    }
}
