//! Firm model.
//!
//! A firm is a lightweight organizational record (vendor, consultant, or
//! contractor) scoped to a project, created on demand the first time a filing
//! context names it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project-scoped organizational entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Firm {
    /// Unique identifier.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Display name. Matched by exact string comparison during lookup.
    pub entity: String,
    /// Display ordinal, monotonically increasing per project.
    pub ordinal: u32,
    /// Soft-delete timestamp. Firms are never hard-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Firm {
    /// Create a new firm attributed to the acting identity.
    pub fn new(project_id: &str, entity: &str, ordinal: u32, created_by: &str) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            entity: entity.to_string(),
            ordinal,
            deleted_at: None,
            created_by: created_by.to_string(),
            updated_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}
