//! Database access layer for the emission factor reference table.
//!
//! - [`FactorStore`] is the narrow contract the pipeline depends on: run a
//!   SQL string, get back at most one numeric value.
//! - [`factors::PgFactorStore`] runs it against PostgreSQL.
//! - [`memory::MemoryFactorStore`] answers from an in-memory sample table.
//! - [`lookup::EmissionFactorLookup`] turns store outcomes into a factor or `None`.

pub mod factors;
pub mod lookup;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::config::parse_var;

pub use factors::PgFactorStore;
pub use lookup::EmissionFactorLookup;
pub use memory::MemoryFactorStore;

/// Reference-table connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL. None selects the in-memory store.
    pub url: Option<String>,
    /// Pool size.
    pub max_connections: u32,
    /// Bound on acquiring a pooled connection.
    pub acquire_timeout: Duration,
    /// Bound on a single factor query.
    pub statement_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
            statement_timeout: Duration::from_millis(5000),
        }
    }
}

impl DatabaseConfig {
    pub(crate) fn from_vars(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        Self {
            url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            max_connections: parse_var(lookup, "DB_MAX_CONNECTIONS")
                .unwrap_or(default.max_connections),
            acquire_timeout: default.acquire_timeout,
            statement_timeout: parse_var(lookup, "DB_STATEMENT_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(default.statement_timeout),
        }
    }
}

/// Errors from executing a factor query.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("query exceeded {0:?}")]
    Timeout(Duration),

    #[error("factor column is not numeric: {0}")]
    Decode(String),

    #[error("unsupported query: {0}")]
    Unsupported(String),
}

/// Convenience alias.
pub type StoreResult<T> = Result<T, StoreError>;

/// Executes factor queries. Implementations must be safe to share across
/// concurrent requests.
#[async_trait]
pub trait FactorStore: Send + Sync {
    /// Run `sql` and return the first column of the first row, if any.
    async fn fetch_factor(&self, sql: &str) -> StoreResult<Option<f64>>;

    /// Backend name (for logging).
    fn backend_name(&self) -> &str;
}

/// Connect to PostgreSQL and run migrations.
pub async fn connect(config: &DatabaseConfig, database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(database_url)
        .await?;

    tracing::info!("running database migrations");
    sqlx::raw_sql(include_str!("../../migrations/001_emission_data.sql"))
        .execute(&pool)
        .await?;
    tracing::info!("migrations complete");

    Ok(pool)
}
