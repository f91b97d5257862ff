use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct CreateSubjectRequest {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owner_email: Option<String>,
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub subject_id: String,
    pub format: &'static str,
    pub report: String,
}
