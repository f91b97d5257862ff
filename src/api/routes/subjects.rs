use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use crate::api::models::CreateSubjectRequest;
use crate::api::AppState;
use crate::errors::DeepScanError;
use crate::models::{NewSubject, Subject};

pub async fn create_subject(
    State(state): State<AppState>,
    Json(req): Json<CreateSubjectRequest>,
) -> Result<(StatusCode, Json<Subject>), DeepScanError> {
    let subject = state
        .trigger
        .register_subject(NewSubject {
            name: req.name.unwrap_or_default(),
            url: req.url,
            owner_email: req.owner_email,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(subject)))
}

pub async fn list_subjects(State(state): State<AppState>) -> Result<Json<Value>, DeepScanError> {
    let subjects = state.trigger.list_subjects().await?;
    Ok(Json(json!({ "subjects": subjects, "total": subjects.len() })))
}
