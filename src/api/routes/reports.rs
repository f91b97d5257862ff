use axum::{
    extract::{Path, State},
    Json,
};
use crate::api::models::ReportResponse;
use crate::api::AppState;
use crate::errors::DeepScanError;

pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReportResponse>, DeepScanError> {
    let report = state.trigger.render_latest_report(&id).await?;
    Ok(Json(ReportResponse {
        subject_id: id,
        format: "markdown",
        report,
    }))
}
