use std::fmt;

use serde::{Deserialize, Serialize};

/// Unit attached to an extracted quantity.
///
/// Spelling variants found in free text ("litre", "liters", "m3") collapse
/// onto one canonical label per unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "litres")]
    Litres,
    #[serde(rename = "kg")]
    Kilograms,
    #[serde(rename = "gallons")]
    Gallons,
    #[serde(rename = "tons")]
    Tons,
    #[serde(rename = "barrels")]
    Barrels,
    #[serde(rename = "cubic meters")]
    CubicMeters,
    #[serde(rename = "ml")]
    Millilitres,
    /// No unit token followed the number.
    #[serde(rename = "units")]
    Units,
}

impl Unit {
    /// Canonical label, as serialized in API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Litres => "litres",
            Unit::Kilograms => "kg",
            Unit::Gallons => "gallons",
            Unit::Tons => "tons",
            Unit::Barrels => "barrels",
            Unit::CubicMeters => "cubic meters",
            Unit::Millilitres => "ml",
            Unit::Units => "units",
        }
    }

    /// Map a matched unit token (any case, any recognized spelling) to a unit.
    ///
    /// Returns `None` for tokens outside the vocabulary.
    pub fn from_token(token: &str) -> Option<Self> {
        let lower = token.trim().to_lowercase();
        let collapsed = lower.split_whitespace().collect::<Vec<_>>().join(" ");
        let unit = match collapsed.as_str() {
            "litre" | "litres" | "liter" | "liters" => Unit::Litres,
            "kg" => Unit::Kilograms,
            "gallon" | "gallons" => Unit::Gallons,
            "ton" | "tons" => Unit::Tons,
            "barrel" | "barrels" => Unit::Barrels,
            "cubic meter" | "cubic meters" | "cubic metre" | "cubic metres" | "m3" => {
                Unit::CubicMeters
            }
            "ml" => Unit::Millilitres,
            "unit" | "units" => Unit::Units,
            _ => return None,
        };
        Some(unit)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric amount of fuel or energy, as read from the caller's text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
