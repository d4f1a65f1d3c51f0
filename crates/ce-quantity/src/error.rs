//! Quantity extraction error types.

use thiserror::Error;

/// Errors that can occur while reading a quantity from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("no quantity found in query")]
    NoQuantityFound,
}

/// Convenience alias for extraction results.
pub type QuantityResult<T> = Result<T, QuantityError>;
