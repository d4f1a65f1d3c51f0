//! Emission estimate endpoint.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use ce_protocol::{EmissionRequest, EmissionResult};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /calculate_emission — estimate kg CO2e for a free-text fuel query.
pub async fn calculate_emission(
    State(state): State<AppState>,
    payload: Result<Json<EmissionRequest>, JsonRejection>,
) -> ApiResult<Json<EmissionResult>> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let result = state.pipeline.run(&req.query).await?;
    Ok(Json(result))
}
