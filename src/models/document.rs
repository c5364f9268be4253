//! Document model for stored tender files.
//!
//! Each document records where its bytes live in object storage, the filing
//! decision that placed it there, and a content fingerprint used to detect
//! byte-identical re-uploads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::context::FilingContext;

/// Post-ingestion processing status, denormalized from the queue for fast
/// reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Compute the SHA-256 content fingerprint of uploaded bytes.
///
/// Deterministic for identical byte sequences; used for deduplication, not
/// security. Runs before any storage or database interaction.
pub fn compute_fingerprint(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Audit record of a filing decision, embedded on the document as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingMetadata {
    /// True when the path and name were generated by the classifier/resolver;
    /// false when the caller supplied them manually.
    pub auto_filed: bool,
    /// Filename as uploaded, before renaming.
    pub original_filename: String,
    /// Full upload context the filing decision was based on.
    pub context: FilingContext,
    /// Firm resolved during filing, if the filing implied one.
    pub firm_id: Option<String>,
}

/// A stored tender document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier.
    pub id: String,
    /// Owning project. Ownership is exclusive.
    pub project_id: String,
    /// Slash-delimited folder path rendered as a tree by the UI.
    pub folder_path: String,
    /// Filename as uploaded.
    pub original_filename: String,
    /// Generated (or manually supplied) display name.
    pub display_name: String,
    /// Object storage key for the raw bytes.
    pub storage_key: String,
    /// Object storage bucket/container.
    pub storage_bucket: String,
    /// Size in bytes.
    pub file_size: u64,
    /// Declared MIME type.
    pub mime_type: String,
    /// SHA-256 content fingerprint (hex).
    pub fingerprint: String,
    /// Denormalized processing status.
    pub status: ProcessingStatus,
    /// Filing provenance.
    pub metadata: FilingMetadata,
    /// Soft-delete timestamp. Deleted documents never block re-upload.
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document record in `pending` status.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        project_id: String,
        folder_path: String,
        original_filename: String,
        display_name: String,
        storage_key: String,
        storage_bucket: String,
        file_size: u64,
        mime_type: String,
        fingerprint: String,
        metadata: FilingMetadata,
        created_by: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id,
            folder_path,
            original_filename,
            display_name,
            storage_key,
            storage_bucket,
            file_size,
            mime_type,
            fingerprint,
            status: ProcessingStatus::Pending,
            metadata,
            deleted_at: None,
            updated_by: created_by.clone(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the document has not been soft-deleted.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = compute_fingerprint(b"tender package");
        let b = compute_fingerprint(b"tender package");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // SHA-256 produces 64 hex chars
    }

    #[test]
    fn test_fingerprint_differs_for_different_content() {
        assert_ne!(compute_fingerprint(b"a"), compute_fingerprint(b"b"));
    }

    #[test]
    fn test_new_document_starts_pending_and_active() {
        let doc = Document::new(
            "p1".into(),
            "Invoices".into(),
            "invoice.pdf".into(),
            "ABC_Invoice_001.PDF".into(),
            "p1/Invoices/ABC_Invoice_001.PDF".into(),
            "tender-documents".into(),
            42,
            "application/pdf".into(),
            compute_fingerprint(b"bytes"),
            FilingMetadata {
                auto_filed: true,
                original_filename: "invoice.pdf".into(),
                context: Default::default(),
                firm_id: None,
            },
            "user1".into(),
        );
        assert_eq!(doc.status, ProcessingStatus::Pending);
        assert!(doc.is_active());
        assert_eq!(doc.created_by, doc.updated_by);
        assert_eq!(doc.created_at, doc.updated_at);
    }
}
