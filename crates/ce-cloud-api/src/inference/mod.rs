//! SQL generation from natural-language fuel queries.
//!
//! Turns caller text ("50 litres of diesel") into a SQL statement that
//! selects the matching emission factor row.
//!
//! Two tiers:
//! - **Bedrock** (cloud): prompts a remote model, retrying on throttling.
//! - **Template** (local): keyword matching against the static vocabulary,
//!   used when Bedrock is disabled.

pub mod bedrock;
pub mod generator;
pub mod prompt;
pub mod retry;
pub mod template;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Trait for engines that turn a fuel query into a factor-selecting SQL statement.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    /// Generate SQL for the query text.
    /// Returns None if no usable statement could be produced.
    async fn generate_sql(&self, text: &str) -> Option<String>;

    /// Name of this generation tier (for logging/audit).
    fn tier_name(&self) -> &str;
}

/// A single prompt sent to a remote model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    /// Provider model identifier.
    pub model_id: String,
    /// Full prompt text, sent as one user message.
    pub prompt: String,
    /// Cap on generated tokens.
    pub max_tokens: u32,
}

/// Failure classes of a remote model call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Rate limited by the endpoint. Transient.
    #[error("throttled: {0}")]
    Throttled(String),

    /// The endpoint rejected the request (validation, access, missing model).
    #[error("client error: {0}")]
    Client(String),

    /// The call did not complete within its bound.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Transport, dispatch or response-body failure.
    #[error("{0}")]
    Other(String),
}

impl ModelError {
    /// Whether the call may succeed if repeated after a wait.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModelError::Throttled(_))
    }
}

/// Remote model invocation. Implementations must be safe to share across
/// concurrent requests.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Invoke the model and return its decoded JSON response body.
    async fn invoke(&self, request: &ModelRequest) -> Result<serde_json::Value, ModelError>;
}

pub use generator::QueryGenerator;
pub use retry::RetryPolicy;
pub use template::TemplateQueryGenerator;
