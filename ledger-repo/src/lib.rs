//! # Ledger Repository
//!
//! Local store implementations (adapters) of the `RemoteLedgerClient` port:
//! a process-local [`MemoryLedger`] and, with the `sqlite` feature, a
//! file-backed [`SqliteLedger`].

use async_trait::async_trait;
use ledger_types::{
    ListOrder, NewTransaction, OwnerId, RemoteError, RemoteLedgerClient, Transaction,
    TransactionId, TransactionPatch,
};

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
mod types;


pub use memory::MemoryLedger;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteLedger;

/// URL selecting the in-memory store.
pub const MEMORY_URL: &str = "memory://";

/// Unified store wrapper chosen at runtime from a URL.
pub enum LedgerRepo {
    Memory(MemoryLedger),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteLedger),
}

/// Build and initialize a store from a database URL.
///
/// ```ignore
/// let repo = build_repo("memory://").await?;
/// let repo = build_repo("sqlite://ledger.db?mode=rwc").await?;
/// ```
pub async fn build_repo(database_url: &str) -> anyhow::Result<LedgerRepo> {
    LedgerRepo::new(database_url).await
}

impl LedgerRepo {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        if database_url == MEMORY_URL {
            return Ok(Self::Memory(MemoryLedger::new()));
        }

        if database_url.starts_with("sqlite:") {
            return Self::sqlite(database_url).await;
        }

        anyhow::bail!("Unsupported database URL: {database_url}")
    }

    #[cfg(feature = "sqlite")]
    async fn sqlite(database_url: &str) -> anyhow::Result<Self> {
        Ok(Self::Sqlite(SqliteLedger::new(database_url).await?))
    }

    #[cfg(not(feature = "sqlite"))]
    async fn sqlite(_database_url: &str) -> anyhow::Result<Self> {
        anyhow::bail!("SQLite support was not compiled in (enable the `sqlite` feature)")
    }

    fn inner(&self) -> &dyn RemoteLedgerClient {
        match self {
            LedgerRepo::Memory(ledger) => ledger,
            #[cfg(feature = "sqlite")]
            LedgerRepo::Sqlite(ledger) => ledger,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Implement RemoteLedgerClient for LedgerRepo (delegation)
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RemoteLedgerClient for LedgerRepo {
    async fn list(
        &self,
        owner_id: &OwnerId,
        order: ListOrder,
    ) -> Result<Vec<Transaction>, RemoteError> {
        self.inner().list(owner_id, order).await
    }

    async fn insert(&self, transaction: NewTransaction) -> Result<Transaction, RemoteError> {
        self.inner().insert(transaction).await
    }

    async fn update(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<(), RemoteError> {
        self.inner().update(id, patch).await
    }

    async fn delete(&self, id: TransactionId) -> Result<(), RemoteError> {
        self.inner().delete(id).await
    }
}
