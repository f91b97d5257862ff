use super::types::DeepScanError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    /// Caused by what the caller asked for rather than by the system.
    pub caller_fault: bool,
}

impl DeepScanError {
    /// Classify this error for log-event metadata and surface mapping.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            DeepScanError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                caller_fault: true,
            },
            DeepScanError::SubjectNotFound(_) => ErrorClassification {
                error_type: "SubjectNotFoundError",
                caller_fault: true,
            },
            DeepScanError::ReportNotFound(_) => ErrorClassification {
                error_type: "ReportNotFoundError",
                caller_fault: true,
            },
            DeepScanError::InvalidTarget(_) => ErrorClassification {
                error_type: "InvalidTargetError",
                caller_fault: true,
            },
            DeepScanError::DuplicateJob(_) => ErrorClassification {
                error_type: "DuplicateJobError",
                caller_fault: true,
            },

            DeepScanError::Notification(_) => ErrorClassification {
                error_type: "NotificationError",
                caller_fault: false,
            },
            DeepScanError::Database(_) => ErrorClassification {
                error_type: "DatabaseError",
                caller_fault: false,
            },
            DeepScanError::Io(_) => ErrorClassification {
                error_type: "IoError",
                caller_fault: false,
            },
            DeepScanError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                caller_fault: false,
            },
            DeepScanError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                caller_fault: false,
            },
            DeepScanError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                caller_fault: false,
            },
        }
    }
}
