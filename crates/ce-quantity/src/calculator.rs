//! Emission arithmetic.

use ce_protocol::{EmissionFactor, Quantity};

/// Total emission in kg CO2e: `quantity.value * factor`.
///
/// No unit conversion happens here. The caller is responsible for the
/// factor's unit matching the quantity's unit.
pub fn calculate_emission(quantity: &Quantity, factor: EmissionFactor) -> f64 {
    quantity.value * factor.kgco2e()
}
