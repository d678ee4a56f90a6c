//! PostgREST adapter for the hosted `control` table.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use ledger_types::{
    ListOrder, NewTransaction, OwnerId, RemoteError, RemoteLedgerClient, Transaction,
    TransactionId, TransactionPatch,
};

use crate::error_message;

/// Table holding the ledger rows.
pub const DEFAULT_TABLE: &str = "control";

/// Ledger client for a PostgREST endpoint (as exposed by Supabase).
pub struct PostgrestLedgerClient {
    base_url: String,
    table: String,
    api_key: String,
    access_token: Option<String>,
    http: Client,
}

impl PostgrestLedgerClient {
    /// Creates a client for the project at `base_url` using its anon key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            table: DEFAULT_TABLE.to_string(),
            api_key: api_key.into(),
            access_token: None,
            http: Client::new(),
        }
    }

    /// Overrides the table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Sends `token` as the bearer instead of the anon key, so row-level
    /// security applies to the signed-in user.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        req.header("apikey", &self.api_key).bearer_auth(bearer)
    }

    fn row_filter(id: TransactionId) -> (&'static str, String) {
        ("transaccion_id", format!("eq.{id}"))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, RemoteError> {
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        handle_response(resp).await
    }

    /// Sends a mutation that asks for the affected rows back and treats an
    /// empty answer as a missing row.
    async fn mutate_one(&self, req: RequestBuilder) -> Result<(), RemoteError> {
        let rows: Vec<serde_json::Value> = self
            .send(req.header("Prefer", "return=representation"))
            .await?;
        if rows.is_empty() {
            return Err(RemoteError::NotFound);
        }
        Ok(())
    }
}

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, RemoteError> {
    let status = resp.status();
    if status.is_success() {
        let body = resp
            .text()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    } else {
        let body = resp.text().await.unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            message: error_message(body),
        })
    }
}

#[async_trait]
impl RemoteLedgerClient for PostgrestLedgerClient {
    async fn list(
        &self,
        owner_id: &OwnerId,
        order: ListOrder,
    ) -> Result<Vec<Transaction>, RemoteError> {
        let order = match order {
            ListOrder::DateDescending => "fecha.desc,transaccion_id.desc",
            ListOrder::DateAscending => "fecha.asc,transaccion_id.asc",
        };
        let req = self.http.get(self.endpoint()).query(&[
            ("select", "*".to_string()),
            ("usuario_id", format!("eq.{owner_id}")),
            ("order", order.to_string()),
        ]);

        let rows: Vec<Transaction> = self.send(req).await?;
        debug!(count = rows.len(), "rows listed");
        Ok(rows)
    }

    async fn insert(&self, transaction: NewTransaction) -> Result<Transaction, RemoteError> {
        let req = self
            .http
            .post(self.endpoint())
            .header("Prefer", "return=representation")
            .json(&transaction);

        let rows: Vec<Transaction> = self.send(req).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::Decode("insert returned no row".to_string()))
    }

    async fn update(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<(), RemoteError> {
        if patch.is_empty() {
            // Nothing to write; only confirm the row is there.
            let req = self
                .http
                .get(self.endpoint())
                .query(&[("select", "transaccion_id".to_string()), Self::row_filter(id)]);
            let rows: Vec<serde_json::Value> = self.send(req).await?;
            return if rows.is_empty() {
                Err(RemoteError::NotFound)
            } else {
                Ok(())
            };
        }

        let req = self
            .http
            .patch(self.endpoint())
            .query(&[Self::row_filter(id)])
            .json(patch);
        self.mutate_one(req).await
    }

    async fn delete(&self, id: TransactionId) -> Result<(), RemoteError> {
        let req = self
            .http
            .delete(self.endpoint())
            .query(&[Self::row_filter(id)]);
        self.mutate_one(req).await
    }
}
