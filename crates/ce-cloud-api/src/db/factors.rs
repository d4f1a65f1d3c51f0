//! PostgreSQL factor queries.
//!
//! Generated SQL runs inside a read-only transaction with a local statement
//! timeout, and the transaction is always rolled back. sqlx prepares the
//! statement, so a string holding more than one statement is rejected by
//! the server instead of executed.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::{FactorStore, StoreError, StoreResult};

/// Factor store backed by a `PgPool`; every lookup uses its own pooled
/// connection.
#[derive(Clone)]
pub struct PgFactorStore {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PgFactorStore {
    pub fn new(pool: PgPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }
}

#[async_trait]
impl FactorStore for PgFactorStore {
    async fn fetch_factor(&self, sql: &str) -> StoreResult<Option<f64>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!(
            "SET LOCAL statement_timeout = {}",
            self.statement_timeout.as_millis()
        ))
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(sql.trim().trim_end_matches(';'))
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| classify_query_error(e, self.statement_timeout))?;

        tx.rollback().await?;

        row.map(|row| decode_factor(&row)).transpose().map(Option::flatten)
    }

    fn backend_name(&self) -> &str {
        "postgres"
    }
}

/// SQLSTATE 57014 is `query_canceled`, raised when statement_timeout fires.
fn classify_query_error(err: sqlx::Error, bound: Duration) -> StoreError {
    let canceled = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "57014");
    if canceled {
        StoreError::Timeout(bound)
    } else {
        StoreError::Database(err)
    }
}

/// First column as f64: FLOAT8, FLOAT4, INT8, INT4 or NUMERIC. NULL reads
/// as no value.
fn decode_factor(row: &PgRow) -> StoreResult<Option<f64>> {
    if let Ok(v) = row.try_get::<Option<f64>, _>(0) {
        return Ok(v);
    }
    if let Ok(v) = row.try_get::<Option<f32>, _>(0) {
        return Ok(v.map(f64::from));
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(0) {
        return Ok(v.map(|n| n as f64));
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(0) {
        return Ok(v.map(f64::from));
    }
    match row.try_get::<Option<Decimal>, _>(0) {
        Ok(Some(v)) => v
            .to_string()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| StoreError::Decode(format!("numeric {v}: {e}"))),
        Ok(None) => Ok(None),
        Err(e) => Err(StoreError::Decode(e.to_string())),
    }
}
