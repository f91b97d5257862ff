use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a scan subject as stored by the persistence store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectStatus {
    Pending,
    Scanning,
    Scanned,
    Down,
}

impl SubjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scanning => "scanning",
            Self::Scanned => "scanned",
            Self::Down => "down",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "scanning" => Some(Self::Scanning),
            "scanned" => Some(Self::Scanned),
            "down" => Some(Self::Down),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The logical entity scans run against and reports attach to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub url: String,
    pub owner_email: Option<String>,
    pub status: SubjectStatus,
    pub progress: Option<String>,
    pub last_scan_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSubject {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub owner_email: Option<String>,
}

/// Extra columns written alongside a status change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectUpdate {
    pub progress: Option<String>,
    pub last_scan_at: Option<DateTime<Utc>>,
}

impl SubjectUpdate {
    pub fn progress(text: impl Into<String>) -> Self {
        Self { progress: Some(text.into()), ..Default::default() }
    }

    pub fn scanned_at(at: DateTime<Utc>) -> Self {
        Self { last_scan_at: Some(at), ..Default::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "error" => Self::Error,
            "warn" => Self::Warn,
            _ => Self::Info,
        }
    }
}

/// A persisted system log event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub id: String,
    pub level: LogLevel,
    pub message: String,
    pub subject_id: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
