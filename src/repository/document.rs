//! SQLite-backed document repository.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{connect, parse_datetime, parse_datetime_opt, DocumentStore, Result, StoreError};
use crate::models::{Document, FilingMetadata, ProcessingStatus};

/// SQLite persistence for documents.
pub struct DocumentRepository {
    db_path: PathBuf,
}

impl DocumentRepository {
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
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                folder_path TEXT NOT NULL,
                original_filename TEXT NOT NULL,
                display_name TEXT NOT NULL,
                storage_key TEXT NOT NULL,
                storage_bucket TEXT NOT NULL,
                file_size INTEGER NOT NULL,
                mime_type TEXT NOT NULL,
                fingerprint TEXT NOT NULL,
                status TEXT NOT NULL,
                metadata TEXT NOT NULL,
                deleted_at TEXT,
                created_by TEXT NOT NULL,
                updated_by TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_documents_project_fingerprint
                ON documents(project_id, fingerprint);
            CREATE INDEX IF NOT EXISTS idx_documents_project_path
                ON documents(project_id, folder_path);
            "#,
        )?;
        Ok(())
    }
}

fn row_to_document(row: &Row<'_>) -> rusqlite::Result<Document> {
    let status: String = row.get("status")?;
    let metadata: String = row.get("metadata")?;
    let metadata: FilingMetadata = serde_json::from_str(&metadata).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    Ok(Document {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        folder_path: row.get("folder_path")?,
        original_filename: row.get("original_filename")?,
        display_name: row.get("display_name")?,
        storage_key: row.get("storage_key")?,
        storage_bucket: row.get("storage_bucket")?,
        file_size: row.get::<_, i64>("file_size")? as u64,
        mime_type: row.get("mime_type")?,
        fingerprint: row.get("fingerprint")?,
        status: ProcessingStatus::parse(&status).unwrap_or(ProcessingStatus::Pending),
        metadata,
        deleted_at: parse_datetime_opt(row.get("deleted_at")?),
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

#[async_trait]
impl DocumentStore for DocumentRepository {
    async fn insert(&self, document: &Document) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO documents (
                id, project_id, folder_path, original_filename, display_name,
                storage_key, storage_bucket, file_size, mime_type, fingerprint,
                status, metadata, deleted_at, created_by, updated_by,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
            params![
                document.id,
                document.project_id,
                document.folder_path,
                document.original_filename,
                document.display_name,
                document.storage_key,
                document.storage_bucket,
                document.file_size as i64,
                document.mime_type,
                document.fingerprint,
                document.status.as_str(),
                serde_json::to_string(&document.metadata)?,
                document.deleted_at.map(|t| t.to_rfc3339()),
                document.created_by,
                document.updated_by,
                document.created_at.to_rfc3339(),
                document.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Document>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT * FROM documents WHERE id = ?")?;
        let doc = stmt.query_row(params![id], row_to_document).optional()?;
        Ok(doc)
    }

    async fn find_active_by_fingerprint(
        &self,
        project_id: &str,
        fingerprint: &str,
    ) -> Result<Option<Document>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM documents
             WHERE project_id = ? AND fingerprint = ? AND deleted_at IS NULL
             LIMIT 1",
        )?;
        let doc = stmt
            .query_row(params![project_id, fingerprint], row_to_document)
            .optional()?;
        Ok(doc)
    }

    async fn count_active_matching(
        &self,
        project_id: &str,
        folder_path: &str,
        name_fragment: &str,
    ) -> Result<u64> {
        let conn = self.connect()?;
        // instr() keeps the match an exact substring check, no LIKE escaping.
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM documents
             WHERE project_id = ?1 AND folder_path = ?2
               AND deleted_at IS NULL AND instr(display_name, ?3) > 0",
            params![project_id, folder_path, name_fragment],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    async fn list_active(&self, project_id: &str) -> Result<Vec<Document>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM documents
             WHERE project_id = ? AND deleted_at IS NULL
             ORDER BY folder_path, display_name",
        )?;
        let docs = stmt
            .query_map(params![project_id], row_to_document)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(docs)
    }

    async fn set_status(&self, id: &str, status: ProcessingStatus) -> Result<()> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE documents SET status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, status.as_str(), Utc::now().to_rfc3339()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("document {}", id)));
        }
        Ok(())
    }

    async fn move_document(
        &self,
        id: &str,
        folder_path: &str,
        display_name: &str,
        actor: &str,
    ) -> Result<()> {
        let conn = self.connect()?;
        let changed = conn.execute(
            "UPDATE documents
             SET folder_path = ?2, display_name = ?3, updated_by = ?4, updated_at = ?5
             WHERE id = ?1 AND deleted_at IS NULL",
            params![id, folder_path, display_name, actor, Utc::now().to_rfc3339()],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("document {}", id)));
        }
        Ok(())
    }

    async fn soft_delete(&self, id: &str, actor: &str) -> Result<()> {
        let conn = self.connect()?;
        let now = Utc::now().to_rfc3339();
        let changed = conn.execute(
            "UPDATE documents
             SET deleted_at = ?2, updated_by = ?3, updated_at = ?2
             WHERE id = ?1 AND deleted_at IS NULL",
            params![id, now, actor],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("document {}", id)));
        }
        Ok(())
    }
}
