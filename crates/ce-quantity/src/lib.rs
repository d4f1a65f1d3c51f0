//! Quantity extraction and emission arithmetic.
//!
//! - [`extract_quantity`] reads the (value, unit) pair out of a free-text query.
//! - [`calculate_emission`] multiplies a quantity by an emission factor.

pub mod calculator;
pub mod error;
pub mod extract;

pub use calculator::calculate_emission;
pub use error::{QuantityError, QuantityResult};
pub use extract::{extract_quantity, find_candidates};
