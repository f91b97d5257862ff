pub mod errors;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use tokio_util::sync::CancellationToken;

use crate::config::DeepScanConfig;
use crate::db::Database;
use crate::errors::DeepScanError;
use crate::trigger::{self, ScanTrigger};

#[derive(Clone)]
pub struct AppState {
    pub trigger: Arc<ScanTrigger>,
}

impl AppState {
    pub fn new(trigger: ScanTrigger) -> Self {
        Self { trigger: Arc::new(trigger) }
    }
}

pub fn create_app_state(
    db_path: &str,
    config: &DeepScanConfig,
    shutdown: CancellationToken,
) -> Result<AppState, DeepScanError> {
    let db = Database::new(db_path)?;
    Ok(AppState::new(trigger::build_trigger(db, config, shutdown)))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", axum::routing::get(routes::health::health_check))
        .route(
            "/api/subjects",
            axum::routing::post(routes::subjects::create_subject).get(routes::subjects::list_subjects),
        )
        .route(
            "/api/subjects/{id}/scan",
            axum::routing::post(routes::scans::start_scan).get(routes::scans::get_scan_status),
        )
        .route("/api/subjects/{id}/report", axum::routing::get(routes::reports::get_report))
        .route("/api/jobs", axum::routing::get(routes::jobs::list_jobs))
        .route("/api/jobs/{id}", axum::routing::get(routes::jobs::get_job))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
