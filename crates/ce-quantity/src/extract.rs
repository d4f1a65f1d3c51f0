//! Quantity extraction from free text.
//!
//! Every number in the text is a candidate, optionally followed by a unit
//! token. The largest candidate wins: incidental small numbers ("2 cars",
//! "3 trips") lose to the fuel amount in the common case. This is a
//! heuristic, not an understanding of which number is the quantity; it
//! picks wrong on inputs like "350 vehicles, 5 litres".

use regex::Regex;
use std::sync::LazyLock;

use ce_protocol::{Quantity, Unit};

use crate::error::{QuantityError, QuantityResult};

// NUMBER [whitespace] [UNIT]
static RE_QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+\.?\d*)\s*(litres?|liters?|kg|gallons?|tons?|barrels?|cubic\s+met(?:er|re)s?|m3|ml)?",
    )
    .unwrap()
});

/// Every (value, unit) candidate in `text`, in order of appearance.
///
/// A number without a recognized unit token gets [`Unit::Units`]. Numbers
/// too large for an `f64` are skipped.
pub fn find_candidates(text: &str) -> Vec<Quantity> {
    RE_QUANTITY
        .captures_iter(text)
        .filter_map(|caps| {
            let value = caps[1]
                .trim_end_matches('.')
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())?;
            let unit = caps
                .get(2)
                .and_then(|m| Unit::from_token(m.as_str()))
                .unwrap_or(Unit::Units);
            Some(Quantity::new(value, unit))
        })
        .collect()
}

/// Extract the quantity from a free-text query.
///
/// Picks the candidate with the largest value; the first one wins a tie.
/// Returns [`QuantityError::NoQuantityFound`] when the text holds no number.
pub fn extract_quantity(text: &str) -> QuantityResult<Quantity> {
    let mut best: Option<Quantity> = None;
    for candidate in find_candidates(text) {
        if best.as_ref().is_none_or(|b| candidate.value > b.value) {
            best = Some(candidate);
        }
    }

    match best {
        Some(quantity) => {
            tracing::debug!(quantity = quantity.value, unit = %quantity.unit, "quantity extracted");
            Ok(quantity)
        }
        None => {
            tracing::warn!("no quantity found in query");
            Err(QuantityError::NoQuantityFound)
        }
    }
}
