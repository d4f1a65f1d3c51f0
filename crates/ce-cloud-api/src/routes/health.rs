//! Health check and welcome endpoints.

use axum::Json;
use serde_json::{Value, json};

/// GET /health — liveness check.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET / — welcome message.
pub async fn home() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Carbon Emission API!" }))
}
