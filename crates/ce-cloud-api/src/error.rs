//! Unified API error type with Axum `IntoResponse` support.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use ce_protocol::EmissionFailure;

use crate::pipeline::PipelineError;

/// API error type that converts to proper HTTP responses.
///
/// Messages are caller-facing. Upstream error details stay in the logs.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {message}")]
    NotFound {
        message: String,
        sql_query: Option<String>,
    },

    #[error("unprocessable: {message}")]
    Unprocessable {
        message: String,
        sql_query: Option<String>,
    },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("upstream failure: {0}")]
    BadGateway(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        let message = err.to_string();
        match err {
            PipelineError::NoQuantityFound => ApiError::Unprocessable {
                message,
                sql_query: None,
            },
            PipelineError::SqlGenerationFailed => ApiError::BadGateway(message),
            PipelineError::NoEmissionDataFound { sql_query } => ApiError::NotFound {
                message,
                sql_query: Some(sql_query),
            },
            PipelineError::EmissionOutOfRange { sql_query } => ApiError::Unprocessable {
                message,
                sql_query: Some(sql_query),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, sql_query) = match self {
            ApiError::NotFound { message, sql_query } => {
                (StatusCode::NOT_FOUND, message, sql_query)
            }
            ApiError::Unprocessable { message, sql_query } => {
                (StatusCode::UNPROCESSABLE_ENTITY, message, sql_query)
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg, None),
        };

        let body = EmissionFailure {
            error,
            status: status.as_u16(),
            sql_query,
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Convenience alias.
pub type ApiResult<T> = Result<T, ApiError>;
