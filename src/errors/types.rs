use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeepScanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Job already registered: {0}")]
    DuplicateJob(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
