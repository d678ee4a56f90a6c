//! Non-negative monetary amount.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;

/// Largest accepted amount, in whole units (exclusive).
///
/// Far below `Decimal::MAX`, so summing any realistic number of rows cannot
/// overflow.
pub const MAX_AMOUNT_UNITS: i64 = 1_000_000_000_000_000;

/// A non-negative decimal amount below [`MAX_AMOUNT_UNITS`].
///
/// The sign of a movement lives in its [`Direction`](super::Direction), never
/// in the amount. Backed by `Decimal` so repeated sums never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new Amount, rejecting negative and oversized values.
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::NegativeAmount);
        }
        if value >= Decimal::from(MAX_AMOUNT_UNITS) {
            return Err(DomainError::AmountTooLarge);
        }
        // -0 normalises to 0
        Ok(Self(value.abs()))
    }

    /// Parses user input such as `"1500"` or `" 99.90 "`.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DomainError::MissingField("monto"));
        }
        let value = Decimal::from_str(trimmed)
            .map_err(|_| DomainError::InvalidAmount(trimmed.to_string()))?;
        Self::new(value)
    }

    /// Returns the underlying decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
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
        Amount::new(value).map_err(serde::de::Error::custom)
    }
}
