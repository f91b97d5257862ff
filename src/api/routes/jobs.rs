use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use crate::api::AppState;
use crate::jobs::Job;
use crate::trigger::JobListResponse;

pub async fn list_jobs(State(state): State<AppState>) -> Json<JobListResponse> {
    Json(state.trigger.list_jobs())
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Job>, (StatusCode, Json<Value>)> {
    state
        .trigger
        .get_job_status(&id)
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, Json(json!({"error": format!("Job not found: {}", id)}))))
}
