//! Domain models for document filing and processing.

pub mod context;
pub mod document;
pub mod firm;
pub mod queue;

pub use context::{CardType, FilingContext, ManualFiling, UploadLocation};
pub use document::{compute_fingerprint, Document, FilingMetadata, ProcessingStatus};
pub use firm::Firm;
pub use queue::ProcessingQueueEntry;
