//! Request pipeline: one estimate per call.
//!
//! Stages run strictly in order:
//! `ExtractQuantity → GenerateSql → LookupFactor → Calculate → Done`.
//! The first failing stage ends the run with its [`PipelineError`]. Nothing
//! is retried here (throttling retries live in the SQL generator) and
//! nothing carries over between runs.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use ce_protocol::EmissionResult;
use ce_quantity::{calculate_emission, extract_quantity};

use crate::db::EmissionFactorLookup;
use crate::inference::SqlGenerator;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    ExtractQuantity,
    GenerateSql,
    LookupFactor,
    Calculate,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::ExtractQuantity => "extract_quantity",
            PipelineStage::GenerateSql => "generate_sql",
            PipelineStage::LookupFactor => "lookup_factor",
            PipelineStage::Calculate => "calculate",
            PipelineStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Terminal failure of a run. Messages are caller-facing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("No valid quantity found in query.")]
    NoQuantityFound,

    #[error("Failed to generate SQL query.")]
    SqlGenerationFailed,

    #[error("No emission data found in database.")]
    NoEmissionDataFound { sql_query: String },

    #[error("Emission estimate out of range.")]
    EmissionOutOfRange { sql_query: String },
}

impl PipelineError {
    /// Stage that failed.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::NoQuantityFound => PipelineStage::ExtractQuantity,
            PipelineError::SqlGenerationFailed => PipelineStage::GenerateSql,
            PipelineError::NoEmissionDataFound { .. } => PipelineStage::LookupFactor,
            PipelineError::EmissionOutOfRange { .. } => PipelineStage::Calculate,
        }
    }

    /// SQL attempted before the failure, if any.
    pub fn sql_query(&self) -> Option<&str> {
        match self {
            PipelineError::NoEmissionDataFound { sql_query }
            | PipelineError::EmissionOutOfRange { sql_query } => Some(sql_query),
            _ => None,
        }
    }
}

/// Composes extraction, SQL generation, factor lookup and calculation.
pub struct RequestPipeline {
    generator: Arc<dyn SqlGenerator>,
    lookup: EmissionFactorLookup,
}

impl RequestPipeline {
    pub fn new(generator: Arc<dyn SqlGenerator>, lookup: EmissionFactorLookup) -> Self {
        Self { generator, lookup }
    }

    /// Name of the SQL generation tier in use.
    pub fn generator_tier(&self) -> &str {
        self.generator.tier_name()
    }

    /// Estimate the emissions described by `text`.
    pub async fn run(&self, text: &str) -> Result<EmissionResult, PipelineError> {
        let span = tracing::info_span!(
            "estimate",
            request_id = %Uuid::now_v7(),
            tier = self.generator.tier_name(),
        );

        async move {
            let result = self.run_stages(text).await;
            match &result {
                Ok(estimate) => tracing::info!(
                    stage = %PipelineStage::Done,
                    carbon_emission_kg = estimate.carbon_emission_kg,
                    "estimate complete"
                ),
                Err(e) => tracing::warn!(stage = %e.stage(), error = %e, "estimate failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run_stages(&self, text: &str) -> Result<EmissionResult, PipelineError> {
        tracing::info!(query = %text, "query received");

        let quantity = extract_quantity(text).map_err(|_| PipelineError::NoQuantityFound)?;
        tracing::info!(
            stage = %PipelineStage::ExtractQuantity,
            quantity = quantity.value,
            unit = %quantity.unit,
            "quantity extracted"
        );

        let sql_query = self
            .generator
            .generate_sql(text)
            .await
            .ok_or(PipelineError::SqlGenerationFailed)?;
        tracing::info!(stage = %PipelineStage::GenerateSql, sql = %sql_query, "sql generated");

        let Some(factor) = self.lookup.fetch_factor(&sql_query).await else {
            return Err(PipelineError::NoEmissionDataFound { sql_query });
        };
        tracing::info!(
            stage = %PipelineStage::LookupFactor,
            kgco2e = factor.kgco2e(),
            "factor retrieved"
        );

        let total = calculate_emission(&quantity, factor);
        if !total.is_finite() {
            return Err(PipelineError::EmissionOutOfRange { sql_query });
        }
        tracing::debug!(stage = %PipelineStage::Calculate, total, "emission calculated");

        Ok(EmissionResult::new(sql_query, quantity, factor, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::FactorRow;
    use crate::db::{FactorStore, MemoryFactorStore, StoreResult};
    use async_trait::async_trait;
    use ce_protocol::Unit;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PETROL_SQL: &str = "SELECT kgco2e FROM uk_no_carbon_ai.emission_data WHERE fuel_or_emission_type = 'Petrol' AND unit = 'gallons'";

    /// Generator returning a fixed statement (or nothing), counting calls.
    struct FixedGenerator {
        sql: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl FixedGenerator {
        fn new(sql: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                sql,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SqlGenerator for FixedGenerator {
        async fn generate_sql(&self, _text: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sql.map(str::to_string)
        }

        fn tier_name(&self) -> &str {
            "fixed"
        }
    }

    /// Store returning a fixed factor, counting calls.
    struct CountingStore {
        value: Option<f64>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FactorStore for CountingStore {
        async fn fetch_factor(&self, _sql: &str) -> StoreResult<Option<f64>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.value)
        }

        fn backend_name(&self) -> &str {
            "counting"
        }
    }

    fn store(value: Option<f64>) -> Arc<CountingStore> {
        Arc::new(CountingStore {
            value,
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn end_to_end_estimate() {
        let pipeline = RequestPipeline::new(
            FixedGenerator::new(Some(PETROL_SQL)),
            EmissionFactorLookup::new(store(Some(2.31))),
        );

        let result = pipeline.run("200 gallons of petrol").await.unwrap();
        assert_eq!(result.sql_query, PETROL_SQL);
        assert_eq!(result.kgco2e_retrieved, 2.31);
        assert!((result.carbon_emission_kg - 462.0).abs() < 1e-9);
        assert_eq!(result.quantity, 200.0);
        assert_eq!(result.unit, Unit::Gallons);
    }

    #[tokio::test]
    async fn no_quantity_stops_before_generation() {
        let generator = FixedGenerator::new(Some(PETROL_SQL));
        let pipeline = RequestPipeline::new(
            generator.clone(),
            EmissionFactorLookup::new(store(Some(2.31))),
        );

        let err = pipeline
            .run("I am not sure how much fuel I used")
            .await
            .unwrap_err();
        assert_eq!(err, PipelineError::NoQuantityFound);
        assert_eq!(err.stage(), PipelineStage::ExtractQuantity);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generation_failure_stops_before_lookup() {
        let factors = store(Some(2.31));
        let pipeline = RequestPipeline::new(
            FixedGenerator::new(None),
            EmissionFactorLookup::new(factors.clone()),
        );

        let err = pipeline.run("200 gallons of petrol").await.unwrap_err();
        assert_eq!(err, PipelineError::SqlGenerationFailed);
        assert!(err.sql_query().is_none());
        assert_eq!(factors.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_factor_reports_attempted_sql() {
        let pipeline = RequestPipeline::new(
            FixedGenerator::new(Some(PETROL_SQL)),
            EmissionFactorLookup::new(store(None)),
        );

        let err = pipeline.run("200 gallons of petrol").await.unwrap_err();
        assert_eq!(err.stage(), PipelineStage::LookupFactor);
        assert_eq!(err.sql_query(), Some(PETROL_SQL));
        assert_eq!(err.to_string(), "No emission data found in database.");
    }

    #[tokio::test]
    async fn overflowing_product_is_rejected() {
        let pipeline = RequestPipeline::new(
            FixedGenerator::new(Some(PETROL_SQL)),
            EmissionFactorLookup::new(store(Some(2.5))),
        );

        let text = format!("1{} gallons of petrol", "0".repeat(308));
        let err = pipeline.run(&text).await.unwrap_err();
        assert_eq!(err.stage(), PipelineStage::Calculate);
        assert_eq!(err.sql_query(), Some(PETROL_SQL));
    }

    #[tokio::test]
    async fn template_and_memory_store_compose() {
        let pipeline = RequestPipeline::new(
            Arc::new(crate::inference::TemplateQueryGenerator::new()),
            EmissionFactorLookup::new(Arc::new(MemoryFactorStore::new(vec![FactorRow::new(
                "Diesel", "litres", 2.5,
            )]))),
        );

        let result = pipeline
            .run("I used 50 litres of diesel and drove 2 miles")
            .await
            .unwrap();
        assert!((result.carbon_emission_kg - 125.0).abs() < 1e-9);
        assert_eq!(pipeline.generator_tier(), "template");
    }
}
