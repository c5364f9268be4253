//! Processing queue entry model.
//!
//! One row per document requiring asynchronous post-processing (AI text
//! extraction). The entry tracks the claim/complete/fail lifecycle driven by
//! the external extraction worker; retries are user-initiated, never
//! scheduled by this engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::ProcessingStatus;

/// Post-processing state for one document. At most one entry per document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingQueueEntry {
    /// The document this entry tracks (1:1).
    pub document_id: String,
    pub status: ProcessingStatus,
    /// Message from the most recent failure, if any.
    pub last_error: Option<String>,
    /// Number of failed attempts. Informational; no automatic backoff.
    pub retry_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProcessingQueueEntry {
    /// Create a fresh entry in `pending` status.
    pub fn new(document_id: &str) -> Self {
        let now = Utc::now();
        Self {
            document_id: document_id.to_string(),
            status: ProcessingStatus::Pending,
            last_error: None,
            retry_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Worker claimed the entry.
    pub fn mark_processing(&mut self) {
        self.status = ProcessingStatus::Processing;
        self.updated_at = Utc::now();
    }

    /// Worker finished successfully.
    pub fn mark_completed(&mut self) {
        self.status = ProcessingStatus::Completed;
        self.last_error = None;
        self.updated_at = Utc::now();
    }

    /// Worker failed; keeps the error for display and counts the attempt.
    pub fn mark_failed(&mut self, error: &str) {
        self.status = ProcessingStatus::Failed;
        self.last_error = Some(error.to_string());
        self.retry_count += 1;
        self.updated_at = Utc::now();
    }

    /// User-initiated retry: back to `pending`, error cleared, retry count
    /// reset to zero.
    pub fn reset(&mut self) {
        self.status = ProcessingStatus::Pending;
        self.last_error = None;
        self.retry_count = 0;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_transitions() {
        let mut entry = ProcessingQueueEntry::new("doc1");
        assert_eq!(entry.status, ProcessingStatus::Pending);

        entry.mark_processing();
        assert_eq!(entry.status, ProcessingStatus::Processing);

        entry.mark_failed("timeout");
        assert_eq!(entry.status, ProcessingStatus::Failed);
        assert_eq!(entry.last_error.as_deref(), Some("timeout"));
        assert_eq!(entry.retry_count, 1);

        entry.mark_failed("timeout again");
        assert_eq!(entry.retry_count, 2);
    }

    #[test]
    fn test_reset_clears_error_and_count() {
        let mut entry = ProcessingQueueEntry::new("doc1");
        entry.mark_failed("timeout");
        entry.mark_failed("timeout");

        entry.reset();
        assert_eq!(entry.status, ProcessingStatus::Pending);
        assert!(entry.last_error.is_none());
        assert_eq!(entry.retry_count, 0);
    }

    #[test]
    fn test_complete_clears_error() {
        let mut entry = ProcessingQueueEntry::new("doc1");
        entry.mark_failed("flaky");
        entry.mark_processing();
        entry.mark_completed();
        assert_eq!(entry.status, ProcessingStatus::Completed);
        assert!(entry.last_error.is_none());
        // retry history survives completion
        assert_eq!(entry.retry_count, 1);
    }
}
