//! The published state of a ledger session.

use ledger_types::Transaction;
use rust_decimal::Decimal;

use crate::aggregate::{self, AggregationSnapshot, ChartSeries};

/// Rows of the current dashboard table, newest first.
pub const RECENT_ROWS: usize = 10;

/// Cache contents plus everything derived from them.
///
/// Rebuilt from scratch after every cache mutation, so a view is always
/// consistent with exactly one collection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerView {
    pub transactions: Vec<Transaction>,
    pub snapshot: AggregationSnapshot,
    pub series: ChartSeries,
}

impl LedgerView {
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let snapshot = aggregate::snapshot(&transactions);
        let series = aggregate::series_from(&snapshot.breakdown);
        Self {
            transactions,
            snapshot,
            series,
        }
    }

    /// The `n` newest rows.
    pub fn recent(&self, n: usize) -> &[Transaction] {
        &self.transactions[..n.min(self.transactions.len())]
    }

    pub fn balance(&self) -> Decimal {
        self.snapshot.balance
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
