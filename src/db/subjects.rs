use chrono::Utc;
use uuid::Uuid;
use crate::errors::DeepScanError;
use crate::models::{NewSubject, Subject, SubjectStatus, SubjectUpdate};
use super::connection::{parse_optional_timestamp, parse_timestamp};
use super::Database;

const SUBJECT_COLUMNS: &str =
    "id, name, url, owner_email, status, progress, last_scan_at, created_at";

fn subject_from_row(row: &rusqlite::Row) -> rusqlite::Result<Subject> {
    let status: String = row.get(4)?;
    let created_at: String = row.get(7)?;
    Ok(Subject {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        owner_email: row.get(3)?,
        status: SubjectStatus::parse(&status).unwrap_or(SubjectStatus::Pending),
        progress: row.get(5)?,
        last_scan_at: parse_optional_timestamp(6, row.get(6)?)?,
        created_at: parse_timestamp(7, &created_at)?,
    })
}

impl Database {
    pub fn create_subject(&self, new: &NewSubject) -> Result<Subject, DeepScanError> {
        let subject = Subject {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            url: new.url.trim().to_string(),
            owner_email: new.owner_email.clone().filter(|e| !e.trim().is_empty()),
            status: SubjectStatus::Pending,
            progress: None,
            last_scan_at: None,
            created_at: Utc::now(),
        };

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO subjects (id, name, url, owner_email, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                subject.id,
                subject.name,
                subject.url,
                subject.owner_email,
                subject.status.as_str(),
                subject.created_at.to_rfc3339()
            ],
        ).map_err(|e| DeepScanError::Database(format!("Failed to create subject: {}", e)))?;
        Ok(subject)
    }

    pub fn get_subject(&self, id: &str) -> Result<Option<Subject>, DeepScanError> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM subjects WHERE id = ?1", SUBJECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)
            .map_err(|e| DeepScanError::Database(format!("Query failed: {}", e)))?;

        match stmt.query_row(rusqlite::params![id], subject_from_row) {
            Ok(subject) => Ok(Some(subject)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DeepScanError::Database(format!("Query failed: {}", e))),
        }
    }

    pub fn list_subjects(&self) -> Result<Vec<Subject>, DeepScanError> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM subjects ORDER BY created_at DESC", SUBJECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)
            .map_err(|e| DeepScanError::Database(format!("Query failed: {}", e)))?;

        let rows = stmt.query_map([], subject_from_row)
            .map_err(|e| DeepScanError::Database(format!("Query failed: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DeepScanError::Database(format!("Row read failed: {}", e)))
    }

    /// Write a new status. Progress is kept only while scanning; a
    /// `last_scan_at` in `update` overwrites the stored one.
    pub fn set_subject_status(
        &self,
        id: &str,
        status: SubjectStatus,
        update: &SubjectUpdate,
    ) -> Result<(), DeepScanError> {
        let progress = match status {
            SubjectStatus::Scanning => update.progress.clone(),
            _ => None,
        };
        let last_scan_at = update.last_scan_at.map(|t| t.to_rfc3339());

        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE subjects SET status = ?2, progress = ?3, last_scan_at = COALESCE(?4, last_scan_at) WHERE id = ?1",
            rusqlite::params![id, status.as_str(), progress, last_scan_at],
        ).map_err(|e| DeepScanError::Database(format!("Update failed: {}", e)))?;

        if changed == 0 {
            return Err(DeepScanError::SubjectNotFound(id.to_string()));
        }
        Ok(())
    }
}
