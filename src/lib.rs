//! tenderfile - document filing and ingestion engine for construction
//! tender packages.
//!
//! Decides deterministically where an uploaded file belongs and what it is
//! renamed to, deduplicates byte-identical content, creates or reuses firms
//! as a filing side effect, and tracks each stored document through an
//! asynchronous post-processing queue with user-initiated retries.

pub mod config;
pub mod error;
pub mod filing;
pub mod models;
pub mod repository;
pub mod services;
pub mod storage;
pub mod utils;

pub use error::{IngestError, ServiceResponse};
pub use filing::{classify, Category, FilingPathResolver, PreviewFiling};
pub use models::{
    Document, FilingContext, FilingMetadata, Firm, ManualFiling, ProcessingQueueEntry,
    ProcessingStatus,
};
pub use services::{FileOutcome, IngestionCoordinator, ProcessingQueue, UploadFile};
