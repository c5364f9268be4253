//! SQLite-backed firm repository.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{connect, parse_datetime, parse_datetime_opt, FirmStore, Result};
use crate::models::Firm;

/// SQLite persistence for firms.
pub struct FirmRepository {
    db_path: PathBuf,
}

impl FirmRepository {
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
            CREATE TABLE IF NOT EXISTS firms (
                id TEXT PRIMARY KEY,
                project_id TEXT NOT NULL,
                entity TEXT NOT NULL,
                ordinal INTEGER NOT NULL,
                deleted_at TEXT,
                created_by TEXT NOT NULL,
                updated_by TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_firms_project_entity
                ON firms(project_id, entity);
            "#,
        )?;
        Ok(())
    }
}

fn row_to_firm(row: &Row<'_>) -> rusqlite::Result<Firm> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    Ok(Firm {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        entity: row.get("entity")?,
        ordinal: row.get::<_, i64>("ordinal")? as u32,
        deleted_at: parse_datetime_opt(row.get("deleted_at")?),
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

#[async_trait]
impl FirmStore for FirmRepository {
    async fn insert(&self, firm: &Firm) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            r#"
            INSERT INTO firms (
                id, project_id, entity, ordinal, deleted_at,
                created_by, updated_by, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                firm.id,
                firm.project_id,
                firm.entity,
                firm.ordinal as i64,
                firm.deleted_at.map(|t| t.to_rfc3339()),
                firm.created_by,
                firm.updated_by,
                firm.created_at.to_rfc3339(),
                firm.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    async fn find_active_by_name(&self, project_id: &str, entity: &str) -> Result<Option<Firm>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM firms
             WHERE project_id = ? AND entity = ? AND deleted_at IS NULL
             LIMIT 1",
        )?;
        let firm = stmt
            .query_row(params![project_id, entity], row_to_firm)
            .optional()?;
        Ok(firm)
    }

    async fn max_ordinal(&self, project_id: &str) -> Result<u32> {
        let conn = self.connect()?;
        let max: i64 = conn.query_row(
            "SELECT COALESCE(MAX(ordinal), 0) FROM firms
             WHERE project_id = ? AND deleted_at IS NULL",
            params![project_id],
            |row| row.get(0),
        )?;
        Ok(max as u32)
    }

    async fn list_active(&self, project_id: &str) -> Result<Vec<Firm>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM firms
             WHERE project_id = ? AND deleted_at IS NULL
             ORDER BY ordinal",
        )?;
        let firms = stmt
            .query_map(params![project_id], row_to_firm)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(firms)
    }
}
