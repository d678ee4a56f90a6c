//! # Ledger Core
//!
//! Session logic for a personal income/expense ledger.
//!
//! ## Architecture
//!
//! - `cache` - Local mirror of one owner's rows, newest first
//! - `aggregate` - Pure functions deriving balance and per-category sums
//! - `view` - The published state (rows + aggregates)
//! - `coordinator` - Serialises mutations against the remote store
//! - `edit_session` - The single-record edit workflow
//!
//! The coordinator is generic over `R: RemoteLedgerClient`, allowing
//! different stores to be injected.

pub mod aggregate;
pub mod cache;
pub mod coordinator;
pub mod edit_session;
pub mod view;

#[cfg(test)]
mod coordinator_tests;

pub use aggregate::{
    AggregationSnapshot, CategoryBreakdown, ChartSeries, aggregate_by_category, balance,
    chart_series, snapshot,
};
pub use cache::TransactionCache;
pub use coordinator::MutationCoordinator;
pub use edit_session::{EditDraft, EditError, EditField, EditSession, EditStatus};
pub use view::{LedgerView, RECENT_ROWS};
