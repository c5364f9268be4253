//! In-memory store implementation.
//!
//! Implements every store trait over plain maps so the engine can run
//! against a fake store in unit tests or embedded tooling. Semantics match
//! the SQLite repositories, including case-sensitive substring counting and
//! soft-delete visibility.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{DocumentStore, FirmStore, QueueStore, Result, StoreError};
use crate::models::{Document, Firm, ProcessingQueueEntry, ProcessingStatus};

/// Map-backed implementation of all three store traits.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, Document>>,
    firms: Mutex<HashMap<String, Firm>>,
    queue: Mutex<HashMap<String, ProcessingQueueEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A poisoned lock only means another test thread panicked mid-write;
    // the data is still usable here.
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, document: &Document) -> Result<()> {
        lock(&self.documents).insert(document.id.clone(), document.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Document>> {
        Ok(lock(&self.documents).get(id).cloned())
    }

    async fn find_active_by_fingerprint(
        &self,
        project_id: &str,
        fingerprint: &str,
    ) -> Result<Option<Document>> {
        Ok(lock(&self.documents)
            .values()
            .find(|d| {
                d.project_id == project_id && d.fingerprint == fingerprint && d.is_active()
            })
            .cloned())
    }

    async fn count_active_matching(
        &self,
        project_id: &str,
        folder_path: &str,
        name_fragment: &str,
    ) -> Result<u64> {
        Ok(lock(&self.documents)
            .values()
            .filter(|d| {
                d.project_id == project_id
                    && d.folder_path == folder_path
                    && d.is_active()
                    && d.display_name.contains(name_fragment)
            })
            .count() as u64)
    }

    async fn list_active(&self, project_id: &str) -> Result<Vec<Document>> {
        let mut docs: Vec<Document> = lock(&self.documents)
            .values()
            .filter(|d| d.project_id == project_id && d.is_active())
            .cloned()
            .collect();
        docs.sort_by(|a, b| {
            (a.folder_path.as_str(), a.display_name.as_str())
                .cmp(&(b.folder_path.as_str(), b.display_name.as_str()))
        });
        Ok(docs)
    }

    async fn set_status(&self, id: &str, status: ProcessingStatus) -> Result<()> {
        let mut docs = lock(&self.documents);
        let doc = docs
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("document {}", id)))?;
        doc.status = status;
        doc.updated_at = Utc::now();
        Ok(())
    }

    async fn move_document(
        &self,
        id: &str,
        folder_path: &str,
        display_name: &str,
        actor: &str,
    ) -> Result<()> {
        let mut docs = lock(&self.documents);
        let doc = docs
            .get_mut(id)
            .filter(|d| d.is_active())
            .ok_or_else(|| StoreError::NotFound(format!("document {}", id)))?;
        doc.folder_path = folder_path.to_string();
        doc.display_name = display_name.to_string();
        doc.updated_by = actor.to_string();
        doc.updated_at = Utc::now();
        Ok(())
    }

    async fn soft_delete(&self, id: &str, actor: &str) -> Result<()> {
        let mut docs = lock(&self.documents);
        let doc = docs
            .get_mut(id)
            .filter(|d| d.is_active())
            .ok_or_else(|| StoreError::NotFound(format!("document {}", id)))?;
        doc.deleted_at = Some(Utc::now());
        doc.updated_by = actor.to_string();
        doc.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl FirmStore for MemoryStore {
    async fn insert(&self, firm: &Firm) -> Result<()> {
        lock(&self.firms).insert(firm.id.clone(), firm.clone());
        Ok(())
    }

    async fn find_active_by_name(&self, project_id: &str, entity: &str) -> Result<Option<Firm>> {
        Ok(lock(&self.firms)
            .values()
            .find(|f| f.project_id == project_id && f.entity == entity && f.is_active())
            .cloned())
    }

    async fn max_ordinal(&self, project_id: &str) -> Result<u32> {
        Ok(lock(&self.firms)
            .values()
            .filter(|f| f.project_id == project_id && f.is_active())
            .map(|f| f.ordinal)
            .max()
            .unwrap_or(0))
    }

    async fn list_active(&self, project_id: &str) -> Result<Vec<Firm>> {
        let mut firms: Vec<Firm> = lock(&self.firms)
            .values()
            .filter(|f| f.project_id == project_id && f.is_active())
            .cloned()
            .collect();
        firms.sort_by_key(|f| f.ordinal);
        Ok(firms)
    }
}

#[async_trait]
impl QueueStore for MemoryStore {
    async fn upsert(&self, entry: &ProcessingQueueEntry) -> Result<()> {
        lock(&self.queue).insert(entry.document_id.clone(), entry.clone());
        Ok(())
    }

    async fn get(&self, document_id: &str) -> Result<Option<ProcessingQueueEntry>> {
        Ok(lock(&self.queue).get(document_id).cloned())
    }

    async fn next_pending(&self, limit: usize) -> Result<Vec<ProcessingQueueEntry>> {
        let mut entries: Vec<ProcessingQueueEntry> = lock(&self.queue)
            .values()
            .filter(|e| e.status == ProcessingStatus::Pending)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.updated_at);
        entries.truncate(limit);
        Ok(entries)
    }
}
