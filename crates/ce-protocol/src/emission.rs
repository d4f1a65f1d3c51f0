use serde::{Deserialize, Serialize};

use crate::quantity::{Quantity, Unit};

/// Emission factor in kg CO2e per unit of fuel or energy.
///
/// Always finite and non-negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct EmissionFactor(f64);

impl EmissionFactor {
    /// Wrap a raw store value. Rejects negative, NaN and infinite values.
    pub fn new(kgco2e: f64) -> Option<Self> {
        (kgco2e.is_finite() && kgco2e >= 0.0).then_some(Self(kgco2e))
    }

    pub fn kgco2e(&self) -> f64 {
        self.0
    }
}

/// Inbound request body: a single free-text query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmissionRequest {
    /// e.g. "I burned 50 litres of diesel".
    pub query: String,
}

/// Successful estimate returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionResult {
    /// SQL that selected the factor row.
    pub sql_query: String,
    /// Factor retrieved from the reference table.
    pub kgco2e_retrieved: f64,
    /// `quantity * kgco2e_retrieved`.
    pub carbon_emission_kg: f64,
    /// Quantity extracted from the query text.
    pub quantity: f64,
    /// Unit extracted alongside the quantity.
    pub unit: Unit,
}

impl EmissionResult {
    pub fn new(
        sql_query: String,
        quantity: Quantity,
        factor: EmissionFactor,
        carbon_emission_kg: f64,
    ) -> Self {
        Self {
            sql_query,
            kgco2e_retrieved: factor.kgco2e(),
            carbon_emission_kg,
            quantity: quantity.value,
            unit: quantity.unit,
        }
    }
}

/// Failure body. `sql_query` is present when a query had been generated
/// before the request failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFailure {
    pub error: String,
    /// HTTP status code of the response carrying this body.
    #[serde(default)]
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_query: Option<String>,
}

/// Either response shape of the estimate endpoint, for clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmissionResponse {
    Success(EmissionResult),
    Failure(EmissionFailure),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_rejects_invalid_values() {
        assert!(EmissionFactor::new(-0.5).is_none());
        assert!(EmissionFactor::new(f64::NAN).is_none());
        assert!(EmissionFactor::new(f64::INFINITY).is_none());
        assert_eq!(EmissionFactor::new(0.0).unwrap().kgco2e(), 0.0);
        assert_eq!(EmissionFactor::new(2.31).unwrap().kgco2e(), 2.31);
    }

    #[test]
    fn result_serializes_expected_fields() {
        let result = EmissionResult::new(
            "SELECT kgco2e FROM t".into(),
            Quantity::new(50.0, Unit::Litres),
            EmissionFactor::new(2.5).unwrap(),
            125.0,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["sql_query"], "SELECT kgco2e FROM t");
        assert_eq!(json["kgco2e_retrieved"], 2.5);
        assert_eq!(json["carbon_emission_kg"], 125.0);
        assert_eq!(json["unit"], "litres");
    }

    #[test]
    fn failure_omits_missing_sql() {
        let failure = EmissionFailure {
            error: "No valid quantity found in query.".into(),
            status: 422,
            sql_query: None,
        };
        let json = serde_json::to_string(&failure).unwrap();
        assert!(!json.contains("sql_query"));
        assert!(json.contains(r#""status":422"#));
    }

    #[test]
    fn response_distinguishes_shapes() {
        let ok = r#"{"sql_query":"SELECT 1","kgco2e_retrieved":2.31,"carbon_emission_kg":462.0,"quantity":200.0,"unit":"gallons"}"#;
        let err = r#"{"error":"No emission data found in database.","sql_query":"SELECT 1","status":404}"#;

        assert!(matches!(
            serde_json::from_str::<EmissionResponse>(ok).unwrap(),
            EmissionResponse::Success(_)
        ));
        match serde_json::from_str::<EmissionResponse>(err).unwrap() {
            EmissionResponse::Failure(f) => {
                assert_eq!(f.sql_query.as_deref(), Some("SELECT 1"));
                assert_eq!(f.status, 404);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
