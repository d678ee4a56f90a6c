//! Data Transfer Objects for ledger mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Amount, Category, Direction, OwnerId, Transaction, TransactionId, fecha};
use crate::error::DomainError;

// ─────────────────────────────────────────────────────────────────────────────
// Create
// ─────────────────────────────────────────────────────────────────────────────

/// Raw input of the "new movement" form, before validation.
///
/// The amount is kept as typed so that non-numeric input can be rejected with
/// a proper validation error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionDraft {
    pub name: Option<String>,
    pub reason: Option<String>,
    /// Defaults to the current time when absent
    pub date: Option<DateTime<Utc>>,
    pub direction: Option<Direction>,
    pub category: Option<Category>,
    pub amount: String,
}

impl TransactionDraft {
    /// Validates the draft into an insertable record owned by `owner_id`.
    pub fn validate(&self, owner_id: &OwnerId) -> Result<NewTransaction, DomainError> {
        let amount = Amount::parse(&self.amount)?;
        let direction = self
            .direction
            .ok_or(DomainError::MissingField("tipo_movimiento"))?;
        let category = self
            .category
            .ok_or(DomainError::MissingField("tipo_category"))?;

        Ok(NewTransaction {
            owner_id: owner_id.clone(),
            name: normalize_text(self.name.as_deref()),
            reason: normalize_text(self.reason.as_deref()),
            date: fecha::truncate(self.date.unwrap_or_else(Utc::now)),
            direction,
            category,
            amount,
        })
    }
}

/// A validated record without an id, ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
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

impl NewTransaction {
    /// Attaches the store-assigned id.
    pub fn with_id(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            owner_id: self.owner_id,
            name: self.name,
            reason: self.reason,
            date: self.date,
            direction: self.direction,
            category: self.category,
            amount: self.amount,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Update
// ─────────────────────────────────────────────────────────────────────────────

/// Partial field set for an update. Only present fields are sent.
///
/// `name` and `reason` are doubly optional: `Some(None)` clears the column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionPatch {
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<Option<String>>,
    #[serde(rename = "motivo", skip_serializing_if = "Option::is_none")]
    pub reason: Option<Option<String>>,
    #[serde(
        rename = "fecha",
        with = "fecha::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "tipo_movimiento", skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(rename = "tipo_category", skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(rename = "monto", skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
}

impl TransactionPatch {
    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.reason.is_none()
            && self.date.is_none()
            && self.direction.is_none()
            && self.category.is_none()
            && self.amount.is_none()
    }

    /// Names of the columns this patch touches.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = Vec::new();
        if self.name.is_some() {
            columns.push("nombre");
        }
        if self.reason.is_some() {
            columns.push("motivo");
        }
        if self.date.is_some() {
            columns.push("fecha");
        }
        if self.direction.is_some() {
            columns.push("tipo_movimiento");
        }
        if self.category.is_some() {
            columns.push("tipo_category");
        }
        if self.amount.is_some() {
            columns.push("monto");
        }
        columns
    }

    /// Blank names and reasons become `Some(None)`, clearing the column.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.map(|name| normalize_text(name.as_deref()));
        self.reason = self.reason.map(|reason| normalize_text(reason.as_deref()));
        self.date = self.date.map(fecha::truncate);
        self
    }

    /// Drops fields whose value already matches `current`.
    pub fn changes_against(mut self, current: &Transaction) -> Self {
        if self.name.as_ref() == Some(&current.name) {
            self.name = None;
        }
        if self.reason.as_ref() == Some(&current.reason) {
            self.reason = None;
        }
        if self.date == Some(current.date) {
            self.date = None;
        }
        if self.direction == Some(current.direction) {
            self.direction = None;
        }
        if self.category == Some(current.category) {
            self.category = None;
        }
        if self.amount == Some(current.amount) {
            self.amount = None;
        }
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Listing
// ─────────────────────────────────────────────────────────────────────────────

/// Ordering requested from the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// Newest first, ties broken by id descending
    #[default]
    DateDescending,
    DateAscending,
}

/// Blank text is stored as `NULL`.
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
