//! Emission factor lookup.
//!
//! Every failure collapses to `None`: callers cannot tell an empty result
//! from a failed query.

use std::sync::Arc;

use ce_protocol::EmissionFactor;

use super::FactorStore;

/// Runs generated SQL through a [`FactorStore`] and validates the result.
#[derive(Clone)]
pub struct EmissionFactorLookup {
    store: Arc<dyn FactorStore>,
}

impl EmissionFactorLookup {
    pub fn new(store: Arc<dyn FactorStore>) -> Self {
        Self { store }
    }

    /// Fetch the factor selected by `sql`.
    ///
    /// `None` when the query yields no row, a NULL, a negative or
    /// non-finite value, or fails for any reason.
    pub async fn fetch_factor(&self, sql: &str) -> Option<EmissionFactor> {
        match self.store.fetch_factor(sql).await {
            Ok(Some(raw)) => {
                let factor = EmissionFactor::new(raw);
                if factor.is_none() {
                    tracing::warn!(value = raw, "store returned an invalid emission factor");
                }
                factor
            }
            Ok(None) => {
                tracing::warn!(
                    backend = self.store.backend_name(),
                    "no emission data for query"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    backend = self.store.backend_name(),
                    error = %e,
                    "emission factor query failed"
                );
                None
            }
        }
    }
}
