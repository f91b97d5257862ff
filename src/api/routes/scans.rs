use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use crate::api::AppState;
use crate::errors::DeepScanError;
use crate::trigger::{ScanStatusResponse, StartScanResponse};

/// 202 when a run was queued, 200 when one was already in flight.
pub async fn start_scan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<StartScanResponse>), DeepScanError> {
    let response = state.trigger.start_deep_scan(&id).await?;
    let status = if response.already_running { StatusCode::OK } else { StatusCode::ACCEPTED };
    Ok((status, Json(response)))
}

pub async fn get_scan_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScanStatusResponse>, DeepScanError> {
    Ok(Json(state.trigger.get_scan_status(&id).await?))
}
