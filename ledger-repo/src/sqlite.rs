//! SQLite ledger store.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use ledger_types::{
    ListOrder, NewTransaction, OwnerId, RemoteError, RemoteLedgerClient, Transaction,
    TransactionId, TransactionPatch, domain::fecha,
};

use crate::types::DbTransaction;

const SELECT_COLUMNS: &str = "SELECT transaccion_id, usuario_id, nombre, motivo, fecha, \
     tipo_movimiento, tipo_category, monto FROM control";

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Ledger
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite-backed store for the `control` table.
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Opens (or creates) the database and runs the migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if !in_memory {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent()
                    && !parent.as_os_str().is_empty()
                {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // An in-memory database lives only as long as a connection holds it.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;

        let ledger = Self { pool };
        ledger.create_schema().await?;
        Ok(ledger)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the `control` table and its index if missing.
    pub async fn create_schema(&self) -> Result<(), RemoteError> {
        let ddl = include_str!("../migrations/0001_create_control.sql");
        sqlx::raw_sql(ddl)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn exists(&self, id: TransactionId) -> Result<bool, RemoteError> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT transaccion_id FROM control WHERE transaccion_id = ?")
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;
        Ok(found.is_some())
    }
}

fn db_error(err: sqlx::Error) -> RemoteError {
    RemoteError::Database(err.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Port implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RemoteLedgerClient for SqliteLedger {
    async fn list(
        &self,
        owner_id: &OwnerId,
        order: ListOrder,
    ) -> Result<Vec<Transaction>, RemoteError> {
        let order_by = match order {
            ListOrder::DateDescending => "ORDER BY fecha DESC, transaccion_id DESC",
            ListOrder::DateAscending => "ORDER BY fecha ASC, transaccion_id ASC",
        };
        let sql = format!("{SELECT_COLUMNS} WHERE usuario_id = ? {order_by}");

        let rows: Vec<DbTransaction> = sqlx::query_as(&sql)
            .bind(owner_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(DbTransaction::into_domain).collect()
    }

    async fn insert(&self, transaction: NewTransaction) -> Result<Transaction, RemoteError> {
        let result = sqlx::query(
            r#"INSERT INTO control (usuario_id, nombre, motivo, fecha, tipo_movimiento, tipo_category, monto)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(transaction.owner_id.as_str())
        .bind(&transaction.name)
        .bind(&transaction.reason)
        .bind(fecha::to_wire(&transaction.date))
        .bind(transaction.direction.as_str())
        .bind(transaction.category.as_str())
        .bind(transaction.amount.value().to_string())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let id = TransactionId::new(result.last_insert_rowid());
        debug!(%id, "row inserted");

        // Report the date at the precision it was stored with.
        let mut stored = transaction.with_id(id);
        stored.date = fecha::truncate(stored.date);
        Ok(stored)
    }

    async fn update(
        &self,
        id: TransactionId,
        patch: &TransactionPatch,
    ) -> Result<(), RemoteError> {
        if patch.is_empty() {
            return if self.exists(id).await? {
                Ok(())
            } else {
                Err(RemoteError::NotFound)
            };
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE control SET ");
        {
            let mut set = query.separated(", ");
            if let Some(name) = &patch.name {
                set.push("nombre = ").push_bind_unseparated(name.clone());
            }
            if let Some(reason) = &patch.reason {
                set.push("motivo = ").push_bind_unseparated(reason.clone());
            }
            if let Some(date) = &patch.date {
                set.push("fecha = ").push_bind_unseparated(fecha::to_wire(date));
            }
            if let Some(direction) = patch.direction {
                set.push("tipo_movimiento = ")
                    .push_bind_unseparated(direction.as_str());
            }
            if let Some(category) = patch.category {
                set.push("tipo_category = ")
                    .push_bind_unseparated(category.as_str());
            }
            if let Some(amount) = patch.amount {
                set.push("monto = ")
                    .push_bind_unseparated(amount.value().to_string());
            }
        }
        query.push(" WHERE transaccion_id = ").push_bind(id.get());

        let result = query.build().execute(&self.pool).await.map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(RemoteError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: TransactionId) -> Result<(), RemoteError> {
        let result = sqlx::query("DELETE FROM control WHERE transaccion_id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RemoteError::NotFound);
        }
        Ok(())
    }
}
