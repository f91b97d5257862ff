use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use crate::errors::DeepScanError;

impl DeepScanError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeepScanError::SubjectNotFound(_) | DeepScanError::ReportNotFound(_) => StatusCode::NOT_FOUND,
            DeepScanError::Config(_) | DeepScanError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            DeepScanError::DuplicateJob(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DeepScanError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(json!({"error": self.to_string()}))).into_response()
    }
}
