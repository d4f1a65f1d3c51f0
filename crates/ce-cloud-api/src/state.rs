//! Shared application state for the Axum server.
//!
//! Supports two modes per collaborator:
//! - **Database mode**: `PgFactorStore` over a `PgPool` (production).
//! - **In-memory mode**: `MemoryFactorStore` with sample factors (tests and development).
//!
//! and likewise Bedrock or template SQL generation.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::{self, EmissionFactorLookup, FactorStore, MemoryFactorStore, PgFactorStore};
use crate::inference::bedrock::BedrockModelClient;
use crate::inference::{QueryGenerator, SqlGenerator, TemplateQueryGenerator};
use crate::pipeline::RequestPipeline;

/// Shared application state, wrapped in `Arc` for Axum handler sharing.
///
/// Holds no per-request data; every request runs its own pipeline pass.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RequestPipeline>,
}

impl AppState {
    /// Create state around pre-built collaborators.
    pub fn new(generator: Arc<dyn SqlGenerator>, store: Arc<dyn FactorStore>) -> Self {
        Self {
            pipeline: Arc::new(RequestPipeline::new(
                generator,
                EmissionFactorLookup::new(store),
            )),
        }
    }

    /// Template generation over the in-memory sample table.
    pub fn with_sample_data() -> Self {
        Self::new(
            Arc::new(TemplateQueryGenerator::new()),
            Arc::new(MemoryFactorStore::with_sample_data()),
        )
    }

    /// Build collaborators from configuration.
    pub async fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn FactorStore> = match &config.database.url {
            Some(database_url) => {
                tracing::info!("connecting to PostgreSQL");
                let pool = db::connect(&config.database, database_url).await?;
                Arc::new(PgFactorStore::new(pool, config.database.statement_timeout))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory sample factors");
                Arc::new(MemoryFactorStore::with_sample_data())
            }
        };

        let generator: Arc<dyn SqlGenerator> = if config.bedrock.enabled {
            tracing::info!(
                model_id = %config.bedrock.model_id,
                region = %config.bedrock.region,
                "bedrock SQL generation enabled"
            );
            let client = BedrockModelClient::from_config(&config.bedrock).await;
            Arc::new(QueryGenerator::new(Arc::new(client), &config.bedrock))
        } else {
            tracing::warn!("BEDROCK_ENABLED not set, using template SQL generation");
            Arc::new(TemplateQueryGenerator::new())
        };

        Ok(Self::new(generator, store))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_sample_data()
    }
}
