//! SQLite-backed processing queue repository.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{connect, parse_datetime, QueueStore, Result};
use crate::models::{ProcessingQueueEntry, ProcessingStatus};

/// SQLite persistence for processing queue entries.
pub struct QueueRepository {
    db_path: PathBuf,
}

impl QueueRepository {
    /// Create the repository, initializing the schema if needed.
    pub fn new(db_path: &Path) -> Result<Self> {
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    fn connect(&self) -> Result<Connection> {
        connect(&self.db_path)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS processing_queue (
                document_id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                last_error TEXT,
                retry_count INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_processing_queue_status
                ON processing_queue(status);
            "#,
        )?;
        Ok(())
    }
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<ProcessingQueueEntry> {
    let status: String = row.get("status")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    Ok(ProcessingQueueEntry {
        document_id: row.get("document_id")?,
        status: ProcessingStatus::parse(&status).unwrap_or(ProcessingStatus::Pending),
        last_error: row.get("last_error")?,
        retry_count: row.get::<_, i64>("retry_count")? as u32,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

#[async_trait]
impl QueueStore for QueueRepository {
    async fn upsert(&self, entry: &ProcessingQueueEntry) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO processing_queue (
                document_id, status, last_error, retry_count, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(document_id) DO UPDATE SET
                status = excluded.status,
                last_error = excluded.last_error,
                retry_count = excluded.retry_count,
                updated_at = excluded.updated_at
            "#,
            params![
                entry.document_id,
                entry.status.as_str(),
                entry.last_error,
                entry.retry_count as i64,
                entry.created_at.to_rfc3339(),
                entry.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn get(&self, document_id: &str) -> Result<Option<ProcessingQueueEntry>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM processing_queue WHERE document_id = ?")?;
        let entry = stmt
            .query_row(params![document_id], row_to_entry)
            .optional()?;
        Ok(entry)
    }

    async fn next_pending(&self, limit: usize) -> Result<Vec<ProcessingQueueEntry>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM processing_queue
             WHERE status = 'pending'
             ORDER BY updated_at ASC
             LIMIT ?",
        )?;
        let entries = stmt
            .query_map(params![limit as i64], row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }
}
