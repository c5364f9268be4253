//! Firm find-or-create registry.

use std::sync::Arc;

use crate::models::Firm;
use crate::repository::{FirmStore, Result as StoreResult};

/// Finds or creates firms by display name within a project.
///
/// Lookup is an exact, case-sensitive name match; a miss creates a new firm
/// with the next display ordinal. The returned firm carries the canonical
/// name, which callers use in place of whatever casing the upload context
/// supplied.
#[derive(Clone)]
pub struct FirmRegistry {
    store: Arc<dyn FirmStore>,
}

impl FirmRegistry {
    pub fn new(store: Arc<dyn FirmStore>) -> Self {
        Self { store }
    }

    /// Return the existing active firm with this name, or create one.
    pub async fn resolve(&self, project_id: &str, name: &str, actor: &str) -> StoreResult<Firm> {
        if let Some(firm) = self.store.find_active_by_name(project_id, name).await? {
            return Ok(firm);
        }

        let ordinal = self.store.max_ordinal(project_id).await? + 1;
        let firm = Firm::new(project_id, name, ordinal, actor);
        self.store.insert(&firm).await?;
        tracing::info!(
            project_id,
            firm_id = %firm.id,
            ordinal,
            "created firm '{}'",
            name
        );
        Ok(firm)
    }

    /// Active firms in a project, ordered by display ordinal.
    pub async fn list(&self, project_id: &str) -> StoreResult<Vec<Firm>> {
        self.store.list_active(project_id).await
    }
}
