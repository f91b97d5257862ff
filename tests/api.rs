use axum::http::StatusCode;
use axum::body::Body;
use http_body_util::BodyExt;
use tower::ServiceExt;
use serde_json::{json, Value};
use deepscan::api::{build_router, AppState};
use deepscan::config::ScanSettings;
use deepscan::db::Database;
use deepscan::process::{CommandRunner, CommandSpec, ProcessOutput};
use deepscan::trigger::build_trigger_with_runner;
use std::sync::Arc;
use std::time::Duration;

/// Every tool answers instantly with nothing.
struct SilentTools;

#[async_trait::async_trait]
impl CommandRunner for SilentTools {
    async fn execute(&self, _spec: &CommandSpec, _timeout: Duration) -> ProcessOutput {
        ProcessOutput { completed: true, exit_code: Some(0), ..Default::default() }
    }
}

fn create_test_state() -> AppState {
    let db = Arc::new(Database::in_memory().unwrap());
    let settings = ScanSettings { stage_pause: Duration::ZERO, ..ScanSettings::default() };
    AppState::new(build_trigger_with_runner(db, Arc::new(SilentTools), &settings))
}

fn app(state: &AppState) -> axum::Router {
    build_router(state.clone())
}

fn make_request(method: &str, uri: &str, body: Option<Value>) -> axum::http::Request<Body> {
    let builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    match body {
        Some(b) => builder.body(Body::from(serde_json::to_string(&b).unwrap())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn response_json(response: axum::http::Response<Body>) -> Value {
    let (parts, body) = response.into_parts();
    let bytes = body.collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        panic!("Empty response body. Status: {}, Headers: {:?}", parts.status, parts.headers);
    }
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("JSON parse error: {}. Body: {:?}", e, String::from_utf8_lossy(&bytes)))
}

async fn create_subject(state: &AppState, url: &str) -> String {
    let req = make_request("POST", "/api/subjects", Some(json!({ "url": url })));
    let response = app(state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let state = create_test_state();
    let req = make_request("GET", "/api/health", None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "deepscan");
}

#[tokio::test]
async fn test_create_and_list_subjects() {
    let state = create_test_state();

    let req = make_request("POST", "/api/subjects", Some(json!({
        "url": "https://shop.example.com/login",
        "owner_email": "ops@example.com"
    })));
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["name"], "shop.example.com");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["owner_email"], "ops@example.com");

    create_subject(&state, "https://b.example.org").await;

    let req = make_request("GET", "/api/subjects", None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["subjects"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_subject_invalid_url() {
    let state = create_test_state();
    let req = make_request("POST", "/api/subjects", Some(json!({ "url": "https://" })));
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("Invalid target"));
}

#[tokio::test]
async fn test_scan_unknown_subject() {
    let state = create_test_state();
    let req = make_request("POST", "/api/subjects/nonexistent/scan", None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let req = make_request("GET", "/api/subjects/nonexistent/scan", None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_report_before_any_scan() {
    let state = create_test_state();
    let id = create_subject(&state, "https://example.com").await;

    let req = make_request("GET", &format!("/api/subjects/{}/report", id), None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_job_not_found() {
    let state = create_test_state();
    let req = make_request("GET", "/api/jobs/scan-missing", None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("scan-missing"));
}

#[tokio::test]
async fn test_start_scan_then_fetch_report() {
    let state = create_test_state();
    let id = create_subject(&state, "https://example.com").await;

    let req = make_request("POST", &format!("/api/subjects/{}/scan", id), None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = response_json(response).await;
    assert_eq!(body["already_running"], false);
    assert_eq!(body["status"], "scanning");
    let job_id = body["job_id"].as_str().unwrap().to_string();
    assert!(job_id.starts_with(&format!("scan-{}-", id)));

    let mut job = Value::Null;
    for _ in 0..200 {
        let req = make_request("GET", &format!("/api/jobs/{}", job_id), None);
        let response = app(&state).oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        job = response_json(response).await;
        if job["status"] == "complete" || job["status"] == "failed" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(job["status"], "complete");

    let req = make_request("GET", &format!("/api/subjects/{}/scan", id), None);
    let response = app(&state).oneshot(req).await.unwrap();
    let status = response_json(response).await;
    assert_eq!(status["status"], "scanned");
    assert_eq!(status["latest_score"], 100);
    assert_eq!(status["active"], false);

    let req = make_request("GET", &format!("/api/subjects/{}/report", id), None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["format"], "markdown");
    assert!(body["report"].as_str().unwrap().contains("example.com"));
}

#[tokio::test]
async fn test_list_jobs() {
    let state = create_test_state();

    let req = make_request("GET", "/api/jobs", None);
    let response = app(&state).oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["jobs"], json!([]));
    assert_eq!(body["active_scans"], 0);

    let id = create_subject(&state, "https://example.com").await;
    let req = make_request("POST", &format!("/api/subjects/{}/scan", id), None);
    let response = app(&state).oneshot(req).await.unwrap();
    let job_id = response_json(response).await["job_id"].as_str().unwrap().to_string();

    let mut body = Value::Null;
    for _ in 0..200 {
        let req = make_request("GET", "/api/jobs", None);
        let response = app(&state).oneshot(req).await.unwrap();
        body = response_json(response).await;
        if body["jobs"][0]["status"] == "complete" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let jobs = body["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["id"], job_id.as_str());
    assert_eq!(jobs[0]["status"], "complete");
    assert_eq!(body["active_scans"], 0);
}
