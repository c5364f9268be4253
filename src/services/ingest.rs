//! Batch upload coordination.
//!
//! The entry point the rest of the application calls. Each batch is
//! validated up front (no partial side effects for validation errors), then
//! files are processed sequentially: fingerprint, dedup short-circuit,
//! classify and resolve (or honor a manual override), store the bytes,
//! create the document record, and enroll it in the processing queue.
//! Storage and persistence failures are scoped to the file they hit; the
//! failing file surfaces in the result rather than disappearing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex as AsyncMutex;

use crate::error::IngestError;
use crate::filing::{classify, FilingPathResolver, PreviewFiling};
use crate::models::{
    compute_fingerprint, Document, FilingContext, FilingMetadata, ManualFiling,
};
use crate::repository::{DocumentStore, FirmStore, QueueStore, StoreError};
use crate::services::{FirmRegistry, ProcessingQueue};
use crate::storage::{storage_key, ObjectStore};

/// Size ceiling per uploaded file: 15 MiB.
pub const MAX_FILE_SIZE: u64 = 15 * 1024 * 1024;

/// Content types accepted for upload: PDF, common image types, legacy and
/// OOXML Word/Excel.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

/// One file in an upload batch.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
    /// Caller-supplied filing that bypasses classification.
    pub manual: Option<ManualFiling>,
}

/// Per-file result of a batch ingestion.
#[derive(Debug)]
pub enum FileOutcome {
    /// Newly filed document.
    Filed(Document),
    /// Byte-identical content already stored; the existing record is
    /// returned unchanged and nothing is written.
    Duplicate(Document),
    /// Storage or persistence failed for this file.
    Failed {
        file_name: String,
        error: IngestError,
    },
}

impl FileOutcome {
    /// The stored document, when this outcome carries one.
    pub fn document(&self) -> Option<&Document> {
        match self {
            Self::Filed(doc) | Self::Duplicate(doc) => Some(doc),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Per-project async locks serializing count-then-create filing sections.
///
/// Sequence numbers and firm ordinals are derived from live store contents,
/// so two concurrent batches touching the same project must not interleave
/// between counting and inserting. One lock per project covers both races
/// within a process.
#[derive(Default)]
struct ProjectLocks {
    inner: StdMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ProjectLocks {
    fn for_project(&self, project_id: &str) -> Arc<AsyncMutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(project_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

/// Orchestrates end-to-end upload batches.
pub struct IngestionCoordinator {
    documents: Arc<dyn DocumentStore>,
    objects: Arc<dyn ObjectStore>,
    resolver: FilingPathResolver,
    queue: ProcessingQueue,
    locks: ProjectLocks,
}

impl IngestionCoordinator {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        firms: Arc<dyn FirmStore>,
        queue_store: Arc<dyn QueueStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        let registry = FirmRegistry::new(firms);
        Self {
            resolver: FilingPathResolver::new(documents.clone(), registry),
            queue: ProcessingQueue::new(queue_store, documents.clone()),
            documents,
            objects,
            locks: ProjectLocks::default(),
        }
    }

    /// The processing queue tracking this coordinator's documents.
    pub fn queue(&self) -> &ProcessingQueue {
        &self.queue
    }

    /// Ingest a batch of files into a project.
    ///
    /// Validation failures (size, content type, missing caller or project)
    /// abort the whole batch before any I/O. After that, each file either
    /// completes ingestion or reports a [`FileOutcome::Failed`]; earlier
    /// successes in the batch stand.
    pub async fn ingest(
        &self,
        files: Vec<UploadFile>,
        context: &FilingContext,
        project_id: &str,
        caller: Option<&str>,
    ) -> Result<Vec<FileOutcome>, IngestError> {
        let caller = caller.ok_or(IngestError::Unauthorized)?;
        if project_id.trim().is_empty() {
            return Err(IngestError::MissingProject);
        }
        for file in &files {
            validate_file(file)?;
        }

        // Serialize filing per project: sequence numbers and firm ordinals
        // are count-then-create against live store contents.
        let project_lock = self.locks.for_project(project_id);
        let _guard = project_lock.lock().await;

        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            outcomes.push(self.ingest_one(file, context, project_id, caller).await);
        }
        Ok(outcomes)
    }

    async fn ingest_one(
        &self,
        file: UploadFile,
        context: &FilingContext,
        project_id: &str,
        caller: &str,
    ) -> FileOutcome {
        let fingerprint = compute_fingerprint(&file.content);

        // Idempotent re-upload: byte-identical content short-circuits to the
        // existing record.
        match self
            .documents
            .find_active_by_fingerprint(project_id, &fingerprint)
            .await
        {
            Ok(Some(existing)) => {
                tracing::info!(
                    document_id = %existing.id,
                    project_id,
                    caller,
                    file_name = %file.file_name,
                    "duplicate content, returning existing document"
                );
                return FileOutcome::Duplicate(existing);
            }
            Ok(None) => {}
            Err(err) => return failed(&file.file_name, &err.to_string()),
        }

        let (folder_path, display_name, firm_id, auto_filed) = match &file.manual {
            Some(manual) => (
                manual.folder_path.clone(),
                manual.display_name.clone(),
                None,
                false,
            ),
            None => {
                let category = classify(&file.file_name, context);
                match self
                    .resolver
                    .resolve(category, context, &file.file_name, project_id, caller)
                    .await
                {
                    Ok(resolved) => (
                        resolved.folder_path,
                        resolved.display_name,
                        resolved.firm_id,
                        true,
                    ),
                    Err(err) => return failed(&file.file_name, &err.to_string()),
                }
            }
        };

        let key = storage_key(project_id, &folder_path, &display_name);
        let stored = match self.objects.put(&file.content, &key, &file.content_type).await {
            Ok(stored) => stored,
            Err(err) => return failed(&file.file_name, &err.to_string()),
        };

        let document = Document::new(
            project_id.to_string(),
            folder_path,
            file.file_name.clone(),
            display_name,
            stored.key,
            stored.bucket,
            file.content.len() as u64,
            file.content_type.clone(),
            fingerprint,
            FilingMetadata {
                auto_filed,
                original_filename: file.file_name.clone(),
                context: context.clone(),
                firm_id,
            },
            caller.to_string(),
        );

        if let Err(err) = self.documents.insert(&document).await {
            // The blob already landed; it stays orphaned and a sweep can
            // reclaim it later.
            tracing::error!(
                project_id,
                caller,
                file_name = %file.file_name,
                storage_key = %document.storage_key,
                error = %err,
                "document insert failed after blob write"
            );
            return failed(&file.file_name, &err.to_string());
        }

        if let Err(err) = self.queue.enqueue(&document.id).await {
            tracing::error!(
                document_id = %document.id,
                project_id,
                error = %err,
                "queue enrollment failed"
            );
            return failed(&file.file_name, &err.to_string());
        }

        tracing::info!(
            document_id = %document.id,
            project_id,
            caller,
            file_name = %file.file_name,
            folder_path = %document.folder_path,
            display_name = %document.display_name,
            auto_filed,
            "document filed"
        );
        FileOutcome::Filed(document)
    }

    /// Advisory filing preview with no store or storage access.
    pub fn preview(file_name: &str, context: &FilingContext) -> PreviewFiling {
        FilingPathResolver::preview(file_name, context)
    }

    /// Soft-delete a document. Its queue entry and blob are left in place.
    pub async fn delete_document(&self, id: &str, caller: &str) -> Result<(), StoreError> {
        self.documents.soft_delete(id, caller).await?;
        tracing::info!(document_id = id, caller, "document soft-deleted");
        Ok(())
    }

    /// Active documents in a project.
    pub async fn list_documents(&self, project_id: &str) -> Result<Vec<Document>, StoreError> {
        self.documents.list_active(project_id).await
    }
}

fn validate_file(file: &UploadFile) -> Result<(), IngestError> {
    let size = file.content.len() as u64;
    if size > MAX_FILE_SIZE {
        return Err(IngestError::FileTooLarge {
            file_name: file.file_name.clone(),
            size,
            limit: MAX_FILE_SIZE,
        });
    }
    if !ALLOWED_CONTENT_TYPES.contains(&file.content_type.as_str()) {
        return Err(IngestError::InvalidFileType {
            file_name: file.file_name.clone(),
            content_type: file.content_type.clone(),
        });
    }
    Ok(())
}

fn failed(file_name: &str, message: &str) -> FileOutcome {
    FileOutcome::Failed {
        file_name: file_name.to_string(),
        error: IngestError::UploadFailed {
            file_name: file_name.to_string(),
            message: message.to_string(),
        },
    }
}
