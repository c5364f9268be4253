//! Service layer: firm registry, ingestion coordination, and queue tracking.

pub mod firms;
pub mod ingest;
pub mod processing;

pub use firms::FirmRegistry;
pub use ingest::{FileOutcome, IngestionCoordinator, UploadFile, ALLOWED_CONTENT_TYPES, MAX_FILE_SIZE};
pub use processing::ProcessingQueue;
