//! Repository layer for relational persistence.
//!
//! The engine depends only on the store traits defined here; the SQLite
//! implementations back the CLI and the in-memory implementation backs unit
//! tests. Sequence numbers and dedup decisions are derived from store
//! contents, never cached, so the engine stays a pure function of what the
//! store holds.

pub mod document;
pub mod firm;
pub mod memory;
pub mod queue;

pub use document::DocumentRepository;
pub use firm::FirmRepository;
pub use memory::MemoryStore;
pub use queue::QueueRepository;

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use thiserror::Error;

use crate::models::{Document, Firm, ProcessingQueueEntry, ProcessingStatus};

/// Store-layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

/// Open a connection with the pragmas all repositories rely on.
pub(crate) fn connect(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(conn)
}

/// Parse a datetime string from the database, defaulting to Unix epoch on
/// error.
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Parse an optional datetime string from the database.
pub fn parse_datetime_opt(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

/// Query capabilities the engine needs over stored documents.
///
/// "Active" always means not soft-deleted.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new document record.
    async fn insert(&self, document: &Document) -> Result<()>;

    /// Fetch a document by id, deleted or not.
    async fn get(&self, id: &str) -> Result<Option<Document>>;

    /// Find an active document in a project by content fingerprint.
    async fn find_active_by_fingerprint(
        &self,
        project_id: &str,
        fingerprint: &str,
    ) -> Result<Option<Document>>;

    /// Count active documents in a folder whose display name contains the
    /// given fragment (exact, case-sensitive substring). Backs sequence
    /// numbering.
    async fn count_active_matching(
        &self,
        project_id: &str,
        folder_path: &str,
        name_fragment: &str,
    ) -> Result<u64>;

    /// All active documents in a project.
    async fn list_active(&self, project_id: &str) -> Result<Vec<Document>>;

    /// Update the denormalized processing status.
    async fn set_status(&self, id: &str, status: ProcessingStatus) -> Result<()>;

    /// Move a document to a new folder path and display name.
    async fn move_document(
        &self,
        id: &str,
        folder_path: &str,
        display_name: &str,
        actor: &str,
    ) -> Result<()>;

    /// Soft-delete a document. Never removes the row.
    async fn soft_delete(&self, id: &str, actor: &str) -> Result<()>;
}

/// Query capabilities the engine needs over firms.
#[async_trait]
pub trait FirmStore: Send + Sync {
    /// Insert a new firm row.
    async fn insert(&self, firm: &Firm) -> Result<()>;

    /// Find an active firm by exact, case-sensitive display name.
    async fn find_active_by_name(&self, project_id: &str, entity: &str) -> Result<Option<Firm>>;

    /// Highest display ordinal among active firms in the project, or 0.
    async fn max_ordinal(&self, project_id: &str) -> Result<u32>;

    /// All active firms in a project, ordered by ordinal.
    async fn list_active(&self, project_id: &str) -> Result<Vec<Firm>>;
}

/// Persistence for processing queue entries (one per document).
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Insert or replace the entry for a document.
    async fn upsert(&self, entry: &ProcessingQueueEntry) -> Result<()>;

    /// Fetch the entry for a document.
    async fn get(&self, document_id: &str) -> Result<Option<ProcessingQueueEntry>>;

    /// Oldest pending entries, for the external extraction worker to poll.
    async fn next_pending(&self, limit: usize) -> Result<Vec<ProcessingQueueEntry>>;
}
