//! Object storage for document content.
//!
//! The engine only needs two operations from durable blob storage: `put`
//! raw bytes under a key and mint a time-limited download URL. The
//! filesystem implementation backs the CLI; hosted object stores slot in
//! behind the same trait.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use crate::utils::sanitize_filename;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// Result of a successful `put`.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub url: String,
}

/// Durable blob storage, external to this engine.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store raw bytes under the given key, overwriting any previous object.
    async fn put(&self, content: &[u8], key: &str, content_type: &str)
        -> Result<StoredObject, StorageError>;

    /// Time-limited download URL for an object, or `None` when the object is
    /// missing, so listing endpoints can degrade gracefully instead of
    /// throwing.
    async fn signed_download_url(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<Option<String>, StorageError>;
}

/// Build the storage key for a filed document:
/// `{project}/{folder path}/{display name}` with each segment sanitized.
pub fn storage_key(project_id: &str, folder_path: &str, display_name: &str) -> String {
    let folder: Vec<String> = folder_path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(sanitize_filename)
        .collect();
    format!(
        "{}/{}/{}",
        sanitize_filename(project_id),
        folder.join("/"),
        sanitize_filename(display_name)
    )
}

/// Filesystem-backed object store rooted at a local directory.
pub struct FsObjectStore {
    root: PathBuf,
    bucket: String,
}

impl FsObjectStore {
    pub fn new(root: &Path, bucket: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            bucket: bucket.to_string(),
        }
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.split('/').any(|seg| seg.is_empty() || seg == "..") {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        content: &[u8],
        key: &str,
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(StoredObject {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            url: format!("file://{}", path.display()),
        })
    }

    async fn signed_download_url(
        &self,
        key: &str,
        ttl: Duration,
    ) -> Result<Option<String>, StorageError> {
        let path = self.object_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let expires = Utc::now().timestamp() + ttl.as_secs() as i64;
        Ok(Some(format!(
            "file://{}?expires={}",
            path.display(),
            expires
        )))
    }
}
