//! Runtime selection of the ledger store.

use async_trait::async_trait;
use ledger_client::PostgrestLedgerClient;
use ledger_repo::{LedgerRepo, build_repo};
use ledger_types::{
    ListOrder, NewTransaction, OwnerId, RemoteError, RemoteLedgerClient, Transaction,
    TransactionId, TransactionPatch,
};

use crate::config::BackendConfig;

/// Local store or hosted PostgREST table.
pub enum Backend {
    Local(LedgerRepo),
    Rest(PostgrestLedgerClient),
}

impl Backend {
    pub async fn connect(config: &BackendConfig) -> anyhow::Result<Self> {
        match config {
            BackendConfig::Database { url } => Ok(Self::Local(build_repo(url).await?)),
            BackendConfig::Postgrest {
                url,
                anon_key,
                access_token,
                table,
            } => {
                let mut client = PostgrestLedgerClient::new(url, anon_key).with_table(table);
                if let Some(token) = access_token {
                    client = client.with_access_token(token);
                }
                Ok(Self::Rest(client))
            }
        }
    }

    fn inner(&self) -> &dyn RemoteLedgerClient {
        match self {
            Backend::Local(repo) => repo,
            Backend::Rest(client) => client,
        }
    }
}

#[async_trait]
impl RemoteLedgerClient for Backend {
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
