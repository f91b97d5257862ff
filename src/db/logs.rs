use chrono::Utc;
use uuid::Uuid;
use crate::errors::DeepScanError;
use crate::models::{LogEvent, LogLevel};
use super::connection::parse_timestamp;
use super::Database;

fn event_from_row(row: &rusqlite::Row) -> rusqlite::Result<LogEvent> {
    let level: String = row.get(1)?;
    let metadata: Option<String> = row.get(4)?;
    let created_at: String = row.get(5)?;
    Ok(LogEvent {
        id: row.get(0)?,
        level: LogLevel::parse(&level),
        message: row.get(2)?,
        subject_id: row.get(3)?,
        metadata: metadata
            .and_then(|m| serde_json::from_str(&m).ok())
            .unwrap_or(serde_json::Value::Null),
        created_at: parse_timestamp(5, &created_at)?,
    })
}

impl Database {
    pub fn insert_log_event(
        &self,
        level: LogLevel,
        message: &str,
        subject_id: Option<&str>,
        metadata: &serde_json::Value,
    ) -> Result<LogEvent, DeepScanError> {
        let event = LogEvent {
            id: Uuid::new_v4().to_string(),
            level,
            message: message.to_string(),
            subject_id: subject_id.map(str::to_string),
            metadata: metadata.clone(),
            created_at: Utc::now(),
        };
        let metadata_json = match metadata {
            serde_json::Value::Null => None,
            other => Some(serde_json::to_string(other)?),
        };

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO log_events (id, level, message, subject_id, metadata, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                event.id,
                event.level.as_str(),
                event.message,
                event.subject_id,
                metadata_json,
                event.created_at.to_rfc3339()
            ],
        ).map_err(|e| DeepScanError::Database(format!("Failed to write log event: {}", e)))?;
        Ok(event)
    }

    /// Newest first, optionally for one subject.
    pub fn log_events(&self, subject_id: Option<&str>, limit: usize) -> Result<Vec<LogEvent>, DeepScanError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, level, message, subject_id, metadata, created_at FROM log_events \
             WHERE (?1 IS NULL OR subject_id = ?1) ORDER BY created_at DESC, rowid DESC LIMIT ?2"
        ).map_err(|e| DeepScanError::Database(format!("Query failed: {}", e)))?;

        let rows = stmt.query_map(rusqlite::params![subject_id, limit as i64], event_from_row)
            .map_err(|e| DeepScanError::Database(format!("Query failed: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DeepScanError::Database(format!("Row read failed: {}", e)))
    }
}
