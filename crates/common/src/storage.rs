//! Local file storage for uploaded media.
//!
//! Media rows reference a file on disk via their `path` column; the storage
//! backend owns reading, writing, and removing those files.

use std::path::{Path, PathBuf};

use crate::{AppError, AppResult};

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write a file and return its absolute path on disk.
    async fn save(&self, key: &str, data: &[u8]) -> AppResult<PathBuf>;

    /// Remove a file by its stored path.
    ///
    /// Removal of a missing file is an error: the media row claimed to own
    /// a file that is not there, which callers must surface.
    async fn remove(&self, path: &Path) -> AppResult<()>;

    /// Public URL under which the key is served.
    fn public_url(&self, key: &str) -> String;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn save(&self, key: &str, data: &[u8]) -> AppResult<PathBuf> {
        let path = self.base_path.join(key);

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        Ok(path)
    }

    async fn remove(&self, path: &Path) -> AppResult<()> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to remove {}: {e}", path.display())))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.base_url.trim_end_matches('/'))
    }
}

/// Derive a storage key from a file ID and original name, keeping the
/// extension.
#[must_use]
pub fn storage_key(file_id: &str, original_name: &str) -> String {
    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("bin");
    format!("{file_id}.{ext}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key() {
        assert_eq!(storage_key("abc123", "image.png"), "abc123.png");
        assert_eq!(storage_key("abc123", "clip.mp4"), "abc123.mp4");
        assert_eq!(storage_key("abc123", "noextension"), "abc123.bin");
    }

    #[test]
    fn test_public_url() {
        let storage = LocalStorage::new(PathBuf::from("/tmp/media"), "/media/".to_string());
        assert_eq!(storage.public_url("abc.png"), "/media/abc.png");
    }

    #[tokio::test]
    async fn test_save_and_remove_round_trip() {
        let dir = std::env::temp_dir().join("verdant-storage-test");
        let storage = LocalStorage::new(dir.clone(), "/media".to_string());

        let path = storage.save("probe.bin", b"abc").await.unwrap();
        assert!(tokio::fs::try_exists(&path).await.unwrap());

        storage.remove(&path).await.unwrap();
        assert!(!tokio::fs::try_exists(&path).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_an_error() {
        let storage = LocalStorage::new(std::env::temp_dir(), "/media".to_string());
        let missing = std::env::temp_dir().join("verdant-does-not-exist.bin");

        let result = storage.remove(&missing).await;
        assert!(matches!(result, Err(AppError::Storage(_))));
    }
}
