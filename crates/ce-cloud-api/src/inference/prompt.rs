//! Prompt construction for SQL generation.

use ce_protocol::vocabulary::{
    FACTOR_COLUMN, FUEL_TYPE_COLUMN, FUEL_TYPES, SCHEMA, TABLE, TABLE_UNITS, UNIT_COLUMN,
    quoted_list,
};

/// Build the SQL-generation prompt for one caller query.
///
/// The caller text is embedded verbatim; the schema, columns and both
/// vocabularies are fixed.
pub fn build_sql_prompt(user_query: &str) -> String {
    let fuel_types = quoted_list(FUEL_TYPES);
    let units = quoted_list(TABLE_UNITS);

    format!(
        r#"Given the following request: "{user_query}", generate an SQL query.
The database schema is `{SCHEMA}` and the table is `{TABLE}`.
The relevant columns are:
  - `{FUEL_TYPE_COLUMN}`
  - `{UNIT_COLUMN}`
  - `{FACTOR_COLUMN}` (carbon emission factor)
Ensure the SQL query retrieves `{FACTOR_COLUMN}` based on the specified fuel type and unit.
The fuel types to consider are: {fuel_types}.
The units to consider are: {units}.
Output only the SQL query, without explanations."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_request_text() {
        let prompt = build_sql_prompt("I burned 50 litres of diesel");
        assert!(prompt.contains(r#""I burned 50 litres of diesel""#));
    }

    #[test]
    fn names_schema_table_and_columns() {
        let prompt = build_sql_prompt("x");
        assert!(prompt.contains("`uk_no_carbon_ai`"));
        assert!(prompt.contains("`emission_data`"));
        for column in ["fuel_or_emission_type", "unit", "kgco2e"] {
            assert!(prompt.contains(&format!("`{column}`")), "missing {column}");
        }
    }

    #[test]
    fn lists_every_fuel_type_and_unit() {
        let prompt = build_sql_prompt("x");
        for fuel in FUEL_TYPES {
            assert!(prompt.contains(&format!("'{fuel}'")), "missing fuel {fuel}");
        }
        for unit in TABLE_UNITS {
            assert!(prompt.contains(&format!("'{unit}'")), "missing unit {unit}");
        }
    }

    #[test]
    fn asks_for_sql_only() {
        let prompt = build_sql_prompt("x");
        assert!(prompt.ends_with("Output only the SQL query, without explanations."));
    }
}
