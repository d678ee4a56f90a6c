//! Transaction domain model.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amount::Amount;
use super::category::{Category, Direction};
use crate::dto::TransactionPatch;

/// Identifier assigned by the remote store on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(i64);

impl TransactionId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id value.
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TransactionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// The user owning a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A recorded income or expense.
///
/// Serialises with the persisted column names of the `control` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Store-assigned identifier, never reassigned
    #[serde(rename = "transaccion_id")]
    pub id: TransactionId,
    /// Owner, fixed at creation
    #[serde(rename = "usuario_id")]
    pub owner_id: OwnerId,
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "motivo")]
    pub reason: Option<String>,
    #[serde(rename = "fecha", with = "fecha")]
    pub date: DateTime<Utc>,
    #[serde(rename = "tipo_movimiento")]
    pub direction: Direction,
    #[serde(rename = "tipo_category")]
    pub category: Category,
    #[serde(rename = "monto")]
    pub amount: Amount,
}

impl Transaction {
    /// Amount with the sign implied by the direction.
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Inflow => self.amount.value(),
            Direction::Outflow => -self.amount.value(),
        }
    }

    /// Returns a copy with the patch fields merged in. Identity fields are kept.
    pub fn apply(&self, patch: &TransactionPatch) -> Transaction {
        let mut merged = self.clone();
        if let Some(name) = &patch.name {
            merged.name = name.clone();
        }
        if let Some(reason) = &patch.reason {
            merged.reason = reason.clone();
        }
        if let Some(date) = patch.date {
            merged.date = date;
        }
        if let Some(direction) = patch.direction {
            merged.direction = direction;
        }
        if let Some(category) = patch.category {
            merged.category = category;
        }
        if let Some(amount) = patch.amount {
            merged.amount = amount;
        }
        merged
    }
}

/// Serde helpers for the `fecha` column.
///
/// Writes RFC 3339 UTC. Reads RFC 3339, naive timestamps (taken as UTC) and
/// bare dates (midnight UTC): the edit form persists dates without a time.
pub mod fecha {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_wire(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid fecha: {raw}")))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            date: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => serializer.serialize_some(&to_wire(date)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            raw.map(|raw| {
                parse(&raw)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid fecha: {raw}")))
            })
            .transpose()
        }
    }

    /// Drops sub-millisecond precision, which no store keeps.
    pub fn truncate(date: DateTime<Utc>) -> DateTime<Utc> {
        date.trunc_subsecs(3)
    }

    /// Canonical text form; sorts lexicographically in date order.
    pub fn to_wire(date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }

    /// Parses any of the accepted `fecha` forms.
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return Some(naive.and_utc());
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}
