//! LLM-backed SQL generation with throttling retries.
//!
//! Sends the SQL prompt to a [`ModelClient`] and reads the statement out of
//! the first content block of the response. Throttling is retried with
//! exponential backoff up to the policy's attempt cap; every other failure
//! ends generation immediately.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, timeout};

use super::bedrock::BedrockConfig;
use super::prompt::build_sql_prompt;
use super::{ModelClient, ModelError, ModelRequest, RetryPolicy, SqlGenerator};

/// SQL generator backed by a remote model.
pub struct QueryGenerator {
    client: Arc<dyn ModelClient>,
    model_id: String,
    max_tokens: u32,
    timeout: Duration,
    retry: RetryPolicy,
}

impl QueryGenerator {
    pub fn new(client: Arc<dyn ModelClient>, config: &BedrockConfig) -> Self {
        Self {
            client,
            model_id: config.model_id.clone(),
            max_tokens: config.max_tokens,
            timeout: config.timeout,
            retry: config.retry,
        }
    }

    /// One bounded model call.
    async fn invoke_once(&self, request: &ModelRequest) -> Result<serde_json::Value, ModelError> {
        match timeout(self.timeout, self.client.invoke(request)).await {
            Ok(result) => result,
            Err(_) => Err(ModelError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl SqlGenerator for QueryGenerator {
    async fn generate_sql(&self, text: &str) -> Option<String> {
        let request = ModelRequest {
            model_id: self.model_id.clone(),
            prompt: build_sql_prompt(text),
            max_tokens: self.max_tokens,
        };

        let attempts = self.retry.attempts();
        let mut wait = self.retry.initial_wait;

        for attempt in 1..=attempts {
            match self.invoke_once(&request).await {
                Ok(body) => {
                    let sql = extract_sql(&body);
                    if sql.is_none() {
                        tracing::warn!(attempt, "model response held no usable SQL");
                    }
                    return sql;
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    tracing::warn!(
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "model throttled, backing off"
                    );
                    sleep(wait).await;
                    wait = self.retry.next_wait(wait);
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(attempts, error = %e, "model still throttled, giving up");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "model invocation failed");
                    return None;
                }
            }
        }

        None
    }

    fn tier_name(&self) -> &str {
        "bedrock"
    }
}

/// Read the SQL statement out of a model response body.
///
/// Expects `{"content": [{"text": "..."}, ...]}` and uses the first block.
/// A missing, empty or malformed list, or blank text, yields `None`.
pub fn extract_sql(body: &serde_json::Value) -> Option<String> {
    let first = body.get("content")?.as_array()?.first()?;
    let text = first.get("text")?.as_str()?;
    let sql = strip_code_fence(text);
    (!sql.is_empty()).then(|| sql.to_string())
}

/// Strip a markdown code fence the model may wrap around its SQL.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();

    // Try ```sql ... ``` first
    if let Some(start) = trimmed.find("```sql") {
        let after_fence = &trimmed[start + 6..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    // Try ``` ... ```
    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    trimmed
}
