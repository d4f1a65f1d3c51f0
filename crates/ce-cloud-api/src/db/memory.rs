//! In-memory factor store (development and tests).
//!
//! Understands the one query shape the pipeline needs: a `SELECT` against
//! the reference table filtered by `fuel_or_emission_type = '…'` and
//! `unit = '…'`. Filter values compare exactly, as in PostgreSQL.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use ce_protocol::vocabulary::TABLE;

use super::{FactorStore, StoreError, StoreResult};

const FUEL_FILTER: &str = r#"(?i)\b"?fuel_or_emission_type"?\s*=\s*'([^']*)'"#;
const UNIT_FILTER: &str = r#"(?i)\b"?unit"?\s*=\s*'([^']*)'"#;

static RE_FUEL_FILTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(FUEL_FILTER).unwrap());

static RE_UNIT_FILTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(UNIT_FILTER).unwrap());

/// One reference-table row.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorRow {
    pub fuel_or_emission_type: String,
    pub unit: String,
    pub kgco2e: f64,
}

impl FactorRow {
    pub fn new(fuel: &str, unit: &str, kgco2e: f64) -> Self {
        Self {
            fuel_or_emission_type: fuel.to_string(),
            unit: unit.to_string(),
            kgco2e,
        }
    }
}

/// Read-only table held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFactorStore {
    rows: Vec<FactorRow>,
}

impl MemoryFactorStore {
    pub fn new(rows: Vec<FactorRow>) -> Self {
        Self { rows }
    }

    /// Store with a small set of UK conversion factors for development.
    pub fn with_sample_data() -> Self {
        Self::new(vec![
            FactorRow::new("Diesel", "litres", 2.51279),
            FactorRow::new("Diesel", "tonnes", 3203.6),
            FactorRow::new("Diesel", "kWh", 0.25301),
            FactorRow::new("Petrol", "litres", 2.33969),
            FactorRow::new("Petrol", "tonnes", 3154.08),
            FactorRow::new("Petrol", "kWh", 0.24115),
            FactorRow::new("LPG", "litres", 1.55713),
            FactorRow::new("LPG", "tonnes", 2939.36),
            FactorRow::new("CNG", "kg", 2.5407),
            FactorRow::new("LNG", "litres", 1.17216),
            FactorRow::new("Butane", "litres", 1.74533),
            FactorRow::new("Natural gas", "cubic metres", 2.04542),
            FactorRow::new("Natural gas", "kWh", 0.18293),
            FactorRow::new("Battery Electric Vehicle", "km", 0.04678),
            FactorRow::new("Battery Electric Vehicle", "miles", 0.07528),
            FactorRow::new("Plug-in Hybrid Electric Vehicle", "km", 0.10974),
            FactorRow::new("Plug-in Hybrid Electric Vehicle", "miles", 0.17661),
        ])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[async_trait]
impl FactorStore for MemoryFactorStore {
    async fn fetch_factor(&self, sql: &str) -> StoreResult<Option<f64>> {
        let lower = sql.to_lowercase();
        if !lower.trim_start().starts_with("select") || !lower.contains(TABLE) {
            return Err(StoreError::Unsupported(
                "expected a SELECT on the emission table".into(),
            ));
        }

        let fuel = capture(&RE_FUEL_FILTER, sql)
            .ok_or_else(|| StoreError::Unsupported("missing fuel type filter".into()))?;
        let unit = capture(&RE_UNIT_FILTER, sql)
            .ok_or_else(|| StoreError::Unsupported("missing unit filter".into()))?;

        Ok(self
            .rows
            .iter()
            .find(|row| row.fuel_or_emission_type == fuel && row.unit == unit)
            .map(|row| row.kgco2e))
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

fn capture<'a>(re: &Regex, sql: &'a str) -> Option<&'a str> {
    re.captures(sql)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
