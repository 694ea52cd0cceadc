//! Local filesystem blob store

use super::{BlobStore, StorageError, StorageResult, StoredBlob};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Blob store rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative blob path, refusing anything that leaves the root
    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if path.is_empty() || escapes {
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

/// Lowercased extension of a client file name
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty())
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(
        &self,
        dir: &str,
        original_name: &str,
        mime: Option<&str>,
        bytes: &[u8],
    ) -> StorageResult<StoredBlob> {
        let file_name = match extension_of(original_name) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };
        let relative = format!("{dir}/{file_name}");
        let target = self.resolve(&relative)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, bytes).await?;

        let mime = mime.map(str::to_string).or_else(|| {
            mime_guess::from_path(original_name)
                .first()
                .map(|m| m.essence_str().to_string())
        });

        tracing::debug!(path = %relative, size = bytes.len(), "Blob stored");
        Ok(StoredBlob {
            path: relative,
            mime,
            size: bytes.len() as u64,
        })
    }

    async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        let target = self.resolve(path)?;
        match fs::read(&target).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> bool {
        match self.resolve(path) {
            Ok(target) => fs::try_exists(&target).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ATTACHMENTS_DIR, delete_all};

    #[tokio::test]
    async fn test_store_read_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());

        let blob = store
            .store(ATTACHMENTS_DIR, "Facture.PDF", None, b"%PDF-1.4")
            .await
            .unwrap();
        assert!(blob.path.starts_with("depenses-attachments/"));
        assert!(blob.path.ends_with(".pdf"));
        assert_eq!(blob.mime.as_deref(), Some("application/pdf"));
        assert_eq!(blob.size, 8);

        assert!(store.exists(&blob.path).await);
        assert_eq!(store.read(&blob.path).await.unwrap(), b"%PDF-1.4");

        store.delete(&blob.path).await.unwrap();
        assert!(!store.exists(&blob.path).await);
        // deleting twice is fine
        store.delete(&blob.path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_blob_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        let err = store.read("depenses-attachments/nope.png").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rejects_path_escape() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        assert!(matches!(
            store.read("../secret.txt").await,
            Err(StorageError::InvalidPath(_))
        ));
        assert!(matches!(
            store.delete("/etc/passwd").await,
            Err(StorageError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn test_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        let a = store.store("x", "a.png", None, b"1").await.unwrap();
        let b = store.store("x", "a.png", None, b"2").await.unwrap();
        assert_ne!(a.path, b.path);
        assert_eq!(delete_all(&store, &[a.path, b.path]).await, 2);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("scan.JPEG").as_deref(), Some("jpeg"));
        assert_eq!(extension_of("noext"), None);
    }
}
