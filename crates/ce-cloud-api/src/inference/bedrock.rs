//! AWS Bedrock model client: InvokeModel with an Anthropic messages body.
//!
//! Maps SDK failures onto [`ModelError`]: `ThrottlingException` becomes
//! [`ModelError::Throttled`], any other service error [`ModelError::Client`],
//! and dispatch/transport/body failures [`ModelError::Other`].

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use aws_sdk_bedrockruntime::config::Region;
use aws_sdk_bedrockruntime::config::retry::RetryConfig;
use aws_sdk_bedrockruntime::error::SdkError;
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde::Serialize;

use super::retry::RetryPolicy;
use super::{ModelClient, ModelError, ModelRequest};
use crate::config::{flag_var, parse_var};

/// Anthropic message-API version accepted by Bedrock.
const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Configuration for Bedrock SQL generation.
#[derive(Debug, Clone)]
pub struct BedrockConfig {
    /// Use Bedrock for SQL generation (BEDROCK_ENABLED). Off selects the
    /// template generator.
    pub enabled: bool,
    /// Bedrock model ID.
    pub model_id: String,
    /// AWS region hosting the model.
    pub region: String,
    /// Per-call timeout.
    pub timeout: Duration,
    /// Cap on generated tokens.
    pub max_tokens: u32,
    /// Backoff applied to throttled calls.
    pub retry: RetryPolicy,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model_id: "anthropic.claude-3-5-sonnet-20240620-v1:0".into(),
            region: "us-east-1".into(),
            timeout: Duration::from_secs(30),
            max_tokens: 500,
            retry: RetryPolicy::default(),
        }
    }
}

impl BedrockConfig {
    pub(crate) fn from_vars(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        Self {
            enabled: flag_var(lookup, "BEDROCK_ENABLED"),
            model_id: lookup("BEDROCK_MODEL_ID").unwrap_or(default.model_id),
            region: lookup("AWS_REGION").unwrap_or(default.region),
            timeout: parse_var(lookup, "BEDROCK_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(default.timeout),
            max_tokens: parse_var(lookup, "BEDROCK_MAX_TOKENS").unwrap_or(default.max_tokens),
            retry: RetryPolicy::from_vars(lookup),
        }
    }
}

/// Bedrock InvokeModel client.
pub struct BedrockModelClient {
    client: BedrockClient,
}

impl BedrockModelClient {
    /// Create a client with a pre-built Bedrock SDK client.
    pub fn new(client: BedrockClient) -> Self {
        Self { client }
    }

    /// Load AWS credentials from the default chain for the configured region.
    ///
    /// SDK-level retries are disabled: throttled calls are retried only by
    /// the generator's [`RetryPolicy`].
    pub async fn from_config(config: &BedrockConfig) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .retry_config(RetryConfig::disabled())
            .load()
            .await;
        Self::new(BedrockClient::new(&sdk_config))
    }
}

#[async_trait]
impl ModelClient for BedrockModelClient {
    async fn invoke(&self, request: &ModelRequest) -> Result<serde_json::Value, ModelError> {
        let body = serde_json::to_vec(&AnthropicRequest::from_request(request))
            .map_err(|e| ModelError::Other(format!("failed to encode request body: {e}")))?;

        let output = self
            .client
            .invoke_model()
            .model_id(&request.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(classify_sdk_error)?;

        serde_json::from_slice(output.body().as_ref())
            .map_err(|e| ModelError::Other(format!("failed to decode response body: {e}")))
    }
}

/// Classify an InvokeModel failure.
fn classify_sdk_error<R>(err: SdkError<InvokeModelError, R>) -> ModelError {
    match err.as_service_error() {
        Some(service) => classify_service_error(service),
        None => ModelError::Other(format!("bedrock dispatch failed: {err}")),
    }
}

fn classify_service_error(err: &InvokeModelError) -> ModelError {
    if err.is_throttling_exception() {
        ModelError::Throttled(err.to_string())
    } else {
        ModelError::Client(err.to_string())
    }
}

/// Anthropic messages request body.
#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    anthropic_version: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: Vec<AnthropicContent<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicContent<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    text: &'a str,
}

impl<'a> AnthropicRequest<'a> {
    fn from_request(request: &'a ModelRequest) -> Self {
        Self {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: request.max_tokens,
            messages: vec![AnthropicMessage {
                role: "user",
                content: vec![AnthropicContent {
                    kind: "text",
                    text: &request.prompt,
                }],
            }],
        }
    }
}
