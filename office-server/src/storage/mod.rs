//! Blob storage
//!
//! Member photos and expense attachments live outside the database. Rows
//! keep a relative path (`depenses-attachments/<uuid>.pdf`) that resolves
//! against a [`BlobStore`] root.

mod local;

pub use local::{LocalBlobStore, extension_of};

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Directory of expense attachments inside the store
pub const ATTACHMENTS_DIR: &str = "depenses-attachments";

/// Directory of member photos inside the store
pub const PHOTOS_DIR: &str = "membres-photos";

/// Stored blob metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Path relative to the store root
    pub path: String,
    pub mime: Option<String>,
    pub size: u64,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Invalid blob path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(path) => {
                AppError::with_message(ErrorCode::AttachmentNotFound, format!("File not found: {path}"))
            }
            StorageError::InvalidPath(path) => {
                AppError::invalid_request(format!("Invalid file path: {path}"))
            }
            StorageError::Io(e) => {
                tracing::error!(error = %e, "Blob storage failure");
                AppError::with_message(ErrorCode::FileStorageFailed, e.to_string())
            }
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// File storage behind photos and attachments
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `dir` with a fresh unique name keeping the original
    /// extension
    async fn store(
        &self,
        dir: &str,
        original_name: &str,
        mime: Option<&str>,
        bytes: &[u8],
    ) -> StorageResult<StoredBlob>;

    async fn read(&self, path: &str) -> StorageResult<Vec<u8>>;

    async fn exists(&self, path: &str) -> bool;

    /// Remove a blob; a missing blob is not an error
    async fn delete(&self, path: &str) -> StorageResult<()>;
}

/// Delete every path, logging failures instead of aborting
///
/// Returns the number of blobs removed.
pub async fn delete_all(store: &dyn BlobStore, paths: &[String]) -> usize {
    let mut deleted = 0;
    for path in paths {
        match store.delete(path).await {
            Ok(()) => deleted += 1,
            Err(e) => tracing::warn!(path = %path, error = %e, "Failed to delete blob"),
        }
    }
    if deleted > 0 {
        tracing::info!(count = deleted, "Blobs deleted");
    }
    deleted
}
