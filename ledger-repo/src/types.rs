//! Database row types for the `control` table.

use sqlx::FromRow;

use ledger_types::{Amount, OwnerId, RemoteError, Transaction, TransactionId, domain::fecha};

/// Row as stored by SQLite: enums as their wire tokens, the amount as exact
/// decimal text and the date as RFC 3339 text.
#[derive(Debug, FromRow)]
pub struct DbTransaction {
    pub transaccion_id: i64,
    pub usuario_id: String,
    pub nombre: Option<String>,
    pub motivo: Option<String>,
    pub fecha: String,
    pub tipo_movimiento: String,
    pub tipo_category: String,
    pub monto: String,
}

impl DbTransaction {
    pub fn into_domain(self) -> Result<Transaction, RemoteError> {
        let date = fecha::parse(&self.fecha)
            .ok_or_else(|| RemoteError::Decode(format!("invalid fecha: {}", self.fecha)))?;

        Ok(Transaction {
            id: TransactionId::new(self.transaccion_id),
            owner_id: OwnerId::new(self.usuario_id),
            name: self.nombre,
            reason: self.motivo,
            date,
            direction: self.tipo_movimiento.parse().map_err(decode)?,
            category: self.tipo_category.parse().map_err(decode)?,
            amount: Amount::parse(&self.monto).map_err(decode)?,
        })
    }
}

fn decode(err: impl std::fmt::Display) -> RemoteError {
    RemoteError::Decode(err.to_string())
}
