//! Template SQL generator: keyword matching against the static vocabulary.
//!
//! Builds one fixed statement shape whose filter values come only from the
//! reference-table vocabulary, never from caller text. Used when Bedrock is
//! disabled, and as a safe baseline shape for factor lookups.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use ce_protocol::Unit;
use ce_protocol::vocabulary::{FACTOR_COLUMN, FUEL_TYPE_COLUMN, UNIT_COLUMN, qualified_table};

use super::SqlGenerator;

/// Fuel aliases, most specific first. Labels are `FUEL_TYPES` entries.
const FUEL_ALIASES: &[(&str, &str)] = &[
    (
        r"plug[- ]?in hybrid|\bphev\b",
        "Plug-in Hybrid Electric Vehicle",
    ),
    (
        r"battery electric|electric (?:car|vehicle)|\bbev\b",
        "Battery Electric Vehicle",
    ),
    (r"\bbutane\b", "Butane"),
    (r"compressed natural gas|\bcng\b", "CNG"),
    (r"liquefied natural gas|\blng\b", "LNG"),
    (r"liquefied petroleum gas|\blpg\b|autogas", "LPG"),
    (r"natural gas", "Natural gas"),
    (r"\bpetrol\b|\bgasoline\b", "Petrol"),
    (r"\bdiesel\b", "Diesel"),
];

/// Table-unit keywords. A digit may directly precede the keyword ("10km").
const UNIT_KEYWORDS: &[(&str, &str)] = &[
    (r"(?:\b|\d)(?:kwh|kilowatt[- ]?hours?)\b", "kWh"),
    (r"(?:\b|\d)(?:km|kilomet(?:er|re)s?)\b", "km"),
    (r"(?:\b|\d)miles?\b", "miles"),
    (r"(?:\b|\d)(?:tonnes?|tons?)\b", "tonnes"),
    (r"(?:\b|\d)(?:lit(?:re|er)s?)\b", "litres"),
    (r"(?:\b|\d)(?:cubic met(?:er|re)s?|m3)\b", "cubic metres"),
    (r"(?:\b|\d)(?:gj|gigajoules?)\b", "GJ"),
    (r"(?:\b|\d)(?:kg|kilograms?)\b", "kg"),
];

static FUEL_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> =
    LazyLock::new(|| compile(FUEL_ALIASES));

static UNIT_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> =
    LazyLock::new(|| compile(UNIT_KEYWORDS));

fn compile(table: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    table
        .iter()
        .map(|(pattern, label)| (Regex::new(&format!("(?i){pattern}")).unwrap(), *label))
        .collect()
}

/// Rule-based generator producing a templated factor query.
pub struct TemplateQueryGenerator;

impl TemplateQueryGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TemplateQueryGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SqlGenerator for TemplateQueryGenerator {
    async fn generate_sql(&self, text: &str) -> Option<String> {
        let sql = template_sql(text);
        if sql.is_none() {
            tracing::debug!("template generator found no fuel type and unit");
        }
        sql
    }

    fn tier_name(&self) -> &str {
        "template"
    }
}

/// Build the templated query, or `None` when fuel type or unit is unknown.
pub fn template_sql(text: &str) -> Option<String> {
    let fuel = match_fuel(text)?;
    let unit = match_unit(text)?;
    Some(factor_query(fuel, unit))
}

/// The single statement shape this generator emits.
pub fn factor_query(fuel: &str, unit: &str) -> String {
    format!(
        "SELECT {FACTOR_COLUMN} FROM {table} WHERE {FUEL_TYPE_COLUMN} = '{fuel}' AND {UNIT_COLUMN} = '{unit}' LIMIT 1",
        table = qualified_table(),
    )
}

fn match_fuel(text: &str) -> Option<&'static str> {
    FUEL_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, label)| *label)
}

/// Prefer the unit next to the extracted quantity; fall back to any
/// table-unit keyword in the text.
fn match_unit(text: &str) -> Option<&'static str> {
    let adjacent = ce_quantity::extract_quantity(text)
        .ok()
        .and_then(|q| table_unit(q.unit));

    adjacent.or_else(|| {
        UNIT_PATTERNS
            .iter()
            .find(|(re, _)| re.is_match(text))
            .map(|(_, label)| *label)
    })
}

/// Table unit for an extracted unit, when the table has one.
fn table_unit(unit: Unit) -> Option<&'static str> {
    match unit {
        Unit::Litres => Some("litres"),
        Unit::Kilograms => Some("kg"),
        Unit::Tons => Some("tonnes"),
        Unit::CubicMeters => Some("cubic metres"),
        Unit::Gallons | Unit::Barrels | Unit::Millilitres | Unit::Units => None,
    }
}
