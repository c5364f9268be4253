//! Processing queue tracking.
//!
//! Entries move `pending → processing → completed | failed`, driven by the
//! external extraction worker. The one transition owned by users is the
//! explicit retry, which forces a failed (or stuck) document back to
//! `pending` with cleared bookkeeping. Every transition also updates the
//! document's denormalized status.

use std::sync::Arc;

use crate::error::IngestError;
use crate::models::{ProcessingQueueEntry, ProcessingStatus};
use crate::repository::{DocumentStore, QueueStore, Result as StoreResult, StoreError};

/// Tracks documents through asynchronous post-processing.
#[derive(Clone)]
pub struct ProcessingQueue {
    queue: Arc<dyn QueueStore>,
    documents: Arc<dyn DocumentStore>,
}

impl ProcessingQueue {
    pub fn new(queue: Arc<dyn QueueStore>, documents: Arc<dyn DocumentStore>) -> Self {
        Self { queue, documents }
    }

    /// Enroll a freshly ingested document in `pending` state.
    pub async fn enqueue(&self, document_id: &str) -> StoreResult<()> {
        self.queue
            .upsert(&ProcessingQueueEntry::new(document_id))
            .await
    }

    /// Queue entry for a document, if one exists.
    pub async fn status(&self, document_id: &str) -> StoreResult<Option<ProcessingQueueEntry>> {
        self.queue.get(document_id).await
    }

    /// Oldest pending entries for the external worker to poll.
    pub async fn next_pending(&self, limit: usize) -> StoreResult<Vec<ProcessingQueueEntry>> {
        self.queue.next_pending(limit).await
    }

    /// User-initiated retry: verify the document still exists, reset its
    /// denormalized status, and reset (or recreate) the queue entry.
    pub async fn retry(&self, document_id: &str) -> Result<(), IngestError> {
        let document = self
            .documents
            .get(document_id)
            .await
            .map_err(|e| retry_failed(document_id, &e))?;
        let document = match document {
            Some(doc) if doc.is_active() => doc,
            _ => return Err(IngestError::NotFound(document_id.to_string())),
        };

        // Recreate the entry if the document somehow lost it.
        let mut entry = self
            .queue
            .get(document_id)
            .await
            .map_err(|e| retry_failed(document_id, &e))?
            .unwrap_or_else(|| ProcessingQueueEntry::new(document_id));
        entry.reset();

        self.documents
            .set_status(document_id, ProcessingStatus::Pending)
            .await
            .map_err(|e| retry_failed(document_id, &e))?;
        self.queue
            .upsert(&entry)
            .await
            .map_err(|e| retry_failed(document_id, &e))?;

        tracing::info!(
            document_id,
            project_id = %document.project_id,
            "document re-queued for processing"
        );
        Ok(())
    }

    /// Worker claimed the document's entry.
    pub async fn mark_processing(&self, document_id: &str) -> StoreResult<()> {
        self.transition(document_id, |entry| entry.mark_processing())
            .await
    }

    /// Worker finished the document successfully.
    pub async fn mark_completed(&self, document_id: &str) -> StoreResult<()> {
        self.transition(document_id, |entry| entry.mark_completed())
            .await
    }

    /// Worker failed on the document; records the error and counts the
    /// attempt.
    pub async fn mark_failed(&self, document_id: &str, error: &str) -> StoreResult<()> {
        tracing::warn!(document_id, error, "processing failed");
        self.transition(document_id, |entry| entry.mark_failed(error))
            .await
    }

    async fn transition(
        &self,
        document_id: &str,
        apply: impl FnOnce(&mut ProcessingQueueEntry),
    ) -> StoreResult<()> {
        let mut entry = self
            .queue
            .get(document_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("queue entry for {}", document_id)))?;
        apply(&mut entry);
        self.documents.set_status(document_id, entry.status).await?;
        self.queue.upsert(&entry).await
    }
}

fn retry_failed(document_id: &str, err: &StoreError) -> IngestError {
    IngestError::RetryFailed {
        document_id: document_id.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{compute_fingerprint, Document, FilingMetadata};
    use crate::repository::MemoryStore;

    fn sample_document(project_id: &str) -> Document {
        Document::new(
            project_id.to_string(),
            "Invoices".to_string(),
            "invoice.pdf".to_string(),
            "A_Invoice_001.PDF".to_string(),
            "p1/Invoices/A_Invoice_001.PDF".to_string(),
            "tender-documents".to_string(),
            4,
            "application/pdf".to_string(),
            compute_fingerprint(b"data"),
            FilingMetadata {
                auto_filed: true,
                original_filename: "invoice.pdf".to_string(),
                context: Default::default(),
                firm_id: None,
            },
            "user1".to_string(),
        )
    }

    async fn setup() -> (Arc<MemoryStore>, ProcessingQueue, Document) {
        let store = Arc::new(MemoryStore::new());
        let queue = ProcessingQueue::new(store.clone(), store.clone());
        let doc = sample_document("p1");
        DocumentStore::insert(store.as_ref(), &doc).await.unwrap();
        queue.enqueue(&doc.id).await.unwrap();
        (store, queue, doc)
    }

    #[tokio::test]
    async fn test_retry_resets_entry_and_document_status() {
        let (store, queue, doc) = setup().await;

        queue.mark_processing(&doc.id).await.unwrap();
        queue.mark_failed(&doc.id, "timeout").await.unwrap();
        queue.mark_processing(&doc.id).await.unwrap();
        queue.mark_failed(&doc.id, "timeout").await.unwrap();

        let entry = queue.status(&doc.id).await.unwrap().unwrap();
        assert_eq!(entry.status, ProcessingStatus::Failed);
        assert_eq!(entry.retry_count, 2);
        assert_eq!(entry.last_error.as_deref(), Some("timeout"));

        queue.retry(&doc.id).await.unwrap();

        let entry = queue.status(&doc.id).await.unwrap().unwrap();
        assert_eq!(entry.status, ProcessingStatus::Pending);
        assert!(entry.last_error.is_none());
        assert_eq!(entry.retry_count, 0);

        let doc = DocumentStore::get(store.as_ref(), &doc.id).await.unwrap().unwrap();
        assert_eq!(doc.status, ProcessingStatus::Pending);
    }

    #[tokio::test]
    async fn test_retry_missing_document_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let queue = ProcessingQueue::new(store.clone(), store);

        let err = queue.retry("ghost").await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_retry_recreates_missing_entry() {
        let store = Arc::new(MemoryStore::new());
        let queue = ProcessingQueue::new(store.clone(), store.clone());
        let doc = sample_document("p1");
        DocumentStore::insert(store.as_ref(), &doc).await.unwrap();
        // No enqueue: the entry is missing.

        queue.retry(&doc.id).await.unwrap();

        let entry = queue.status(&doc.id).await.unwrap().unwrap();
        assert_eq!(entry.status, ProcessingStatus::Pending);
        assert_eq!(entry.retry_count, 0);
    }

    #[tokio::test]
    async fn test_retry_soft_deleted_document_is_not_found() {
        let (store, queue, doc) = setup().await;
        DocumentStore::soft_delete(store.as_ref(), &doc.id, "user1")
            .await
            .unwrap();

        let err = queue.retry(&doc.id).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_worker_transitions_update_document() {
        let (store, queue, doc) = setup().await;

        queue.mark_processing(&doc.id).await.unwrap();
        let loaded = DocumentStore::get(store.as_ref(), &doc.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, ProcessingStatus::Processing);

        queue.mark_completed(&doc.id).await.unwrap();
        let loaded = DocumentStore::get(store.as_ref(), &doc.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, ProcessingStatus::Completed);
    }
}
