//! Static vocabulary of the emission factor reference table.
//!
//! Changing the recognized fuel types or table units means editing these
//! lists; they are not runtime configuration.

/// Schema holding the reference table.
pub const SCHEMA: &str = "uk_no_carbon_ai";

/// Reference table of emission factors.
pub const TABLE: &str = "emission_data";

/// Column naming the fuel or emission type of a row.
pub const FUEL_TYPE_COLUMN: &str = "fuel_or_emission_type";

/// Column naming the unit a factor applies to.
pub const UNIT_COLUMN: &str = "unit";

/// Column holding the factor itself (kg CO2e per unit).
pub const FACTOR_COLUMN: &str = "kgco2e";

/// Every `fuel_or_emission_type` value in the table. The empty label is a
/// real row category and is kept.
pub const FUEL_TYPES: &[&str] = &[
    "",
    "Plug-in Hybrid Electric Vehicle",
    "Battery Electric Vehicle",
    "Butane",
    "CNG",
    "LNG",
    "LPG",
    "Natural gas",
    "Petrol",
    "Diesel",
];

/// Every `unit` value in the table.
pub const TABLE_UNITS: &[&str] = &[
    "kWh",
    "km",
    "miles",
    "tonnes",
    "litres",
    "cubic metres",
    "GJ",
    "kg",
];

/// Fully qualified table name, `schema.table`.
pub fn qualified_table() -> String {
    format!("{SCHEMA}.{TABLE}")
}

/// Quote each label as a SQL string literal and join with ", ".
pub fn quoted_list(labels: &[&str]) -> String {
    labels
        .iter()
        .map(|label| format!("'{label}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
