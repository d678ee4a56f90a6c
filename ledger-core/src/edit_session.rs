//! Single-record edit workflow.
//!
//! ```text
//! Idle    --open-->        Editing
//! Editing --submit-->      Saving   (Idle at once when nothing changed)
//! Saving  --ok-->          Idle
//! Saving  --error-->       Failed
//! Failed  --edit/submit--> Editing / Saving
//! Editing, Failed --cancel--> Idle
//! ```

use chrono::{DateTime, Utc};
use ledger_types::{
    Amount, Category, Direction, LedgerError, RemoteLedgerClient, Transaction, TransactionPatch,
    domain::fecha, normalize_text,
};
use tracing::debug;

use crate::coordinator::MutationCoordinator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditStatus {
    #[default]
    Idle,
    Editing,
    Saving,
    Failed,
}

/// One field change on the open draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditField {
    Name(String),
    Reason(String),
    Date(DateTime<Utc>),
    Direction(Direction),
    Category(Category),
    /// Raw text, parsed on submit
    Amount(String),
}

/// The form state: text fields as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub name: String,
    pub reason: String,
    pub date: DateTime<Utc>,
    pub direction: Direction,
    pub category: Category,
    pub amount: String,
}

impl From<&Transaction> for EditDraft {
    fn from(tx: &Transaction) -> Self {
        Self {
            name: tx.name.clone().unwrap_or_default(),
            reason: tx.reason.clone().unwrap_or_default(),
            date: tx.date,
            direction: tx.direction,
            category: tx.category,
            // Exact value, so an untouched amount never shows up in the diff
            amount: tx.amount.value().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("Another edit is still open ({0:?})")]
    Busy(EditStatus),

    #[error("Cannot {action} while {status:?}")]
    InvalidTransition {
        action: &'static str,
        status: EditStatus,
    },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Edits at most one transaction at a time.
#[derive(Debug, Default)]
pub struct EditSession {
    status: EditStatus,
    target: Option<Transaction>,
    draft: Option<EditDraft>,
    last_error: Option<String>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> EditStatus {
        self.status
    }

    /// The row as it was when the edit was opened.
    pub fn target(&self) -> Option<&Transaction> {
        self.target.as_ref()
    }

    pub fn draft(&self) -> Option<&EditDraft> {
        self.draft.as_ref()
    }

    /// Message of the last failed submit, kept until the next one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.status != EditStatus::Idle
    }

    /// Starts editing `transaction` with a draft of its current values.
    pub fn open(&mut self, transaction: Transaction) -> Result<(), EditError> {
        if self.status != EditStatus::Idle {
            return Err(EditError::Busy(self.status));
        }
        debug!(id = %transaction.id, "edit opened");
        self.draft = Some(EditDraft::from(&transaction));
        self.target = Some(transaction);
        self.last_error = None;
        self.status = EditStatus::Editing;
        Ok(())
    }

    /// Applies one field change. Editing a failed draft resumes editing.
    pub fn edit(&mut self, field: EditField) -> Result<(), EditError> {
        self.expect_draft("edit")?;
        let status = self.status;
        let Some(draft) = self.draft.as_mut() else {
            return Err(EditError::InvalidTransition {
                action: "edit",
                status,
            });
        };

        match field {
            EditField::Name(name) => draft.name = name,
            EditField::Reason(reason) => draft.reason = reason,
            EditField::Date(date) => draft.date = fecha::truncate(date),
            EditField::Direction(direction) => draft.direction = direction,
            EditField::Category(category) => draft.category = category,
            EditField::Amount(amount) => draft.amount = amount,
        }
        self.status = EditStatus::Editing;
        Ok(())
    }

    /// Fields of the draft that differ from the original row.
    pub fn diff(&self) -> Result<TransactionPatch, EditError> {
        let (Some(target), Some(draft)) = (&self.target, &self.draft) else {
            return Err(self.invalid("diff"));
        };

        let amount = Amount::parse(&draft.amount).map_err(LedgerError::from)?;
        let patch = TransactionPatch {
            name: Some(normalize_text(Some(&draft.name))),
            reason: Some(normalize_text(Some(&draft.reason))),
            date: Some(draft.date),
            direction: Some(draft.direction),
            category: Some(draft.category),
            amount: Some(amount),
        };
        Ok(patch.changes_against(target))
    }

    /// Sends the diff through `coordinator`.
    ///
    /// An empty diff closes the session without a remote call and returns
    /// the original row. On failure the session moves to `Failed` and keeps
    /// the draft, so it can be corrected or resubmitted.
    pub async fn submit<R: RemoteLedgerClient>(
        &mut self,
        coordinator: &MutationCoordinator<R>,
    ) -> Result<Transaction, EditError> {
        self.expect_draft("submit")?;

        let patch = match self.diff() {
            Ok(patch) => patch,
            Err(err) => return Err(self.fail(err)),
        };
        let Some(target) = self.target.clone() else {
            return Err(self.invalid("submit"));
        };

        if patch.is_empty() {
            debug!(id = %target.id, "edit closed without changes");
            self.close();
            return Ok(target);
        }

        self.status = EditStatus::Saving;
        match coordinator.update(target.id, patch).await {
            Ok(updated) => {
                self.close();
                Ok(updated)
            }
            Err(err) => Err(self.fail(err.into())),
        }
    }

    /// Discards the draft.
    pub fn cancel(&mut self) -> Result<(), EditError> {
        self.expect_draft("cancel")?;
        self.close();
        Ok(())
    }

    fn expect_draft(&self, action: &'static str) -> Result<(), EditError> {
        match self.status {
            EditStatus::Editing | EditStatus::Failed => Ok(()),
            _ => Err(self.invalid(action)),
        }
    }

    fn invalid(&self, action: &'static str) -> EditError {
        EditError::InvalidTransition {
            action,
            status: self.status,
        }
    }

    fn fail(&mut self, err: EditError) -> EditError {
        self.status = EditStatus::Failed;
        self.last_error = Some(err.to_string());
        err
    }

    fn close(&mut self) {
        *self = Self::default();
    }
}
