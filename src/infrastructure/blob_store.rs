// Blob storage for uploaded media bytes. The entity store only keeps the returned reference.

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::MediaConfig;
use crate::error::{AppError, AppResult};

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` and return a stable reference string for them
    async fn store(&self, filename: &str, bytes: &[u8]) -> AppResult<String>;

    /// Delete a blob previously returned by `store`
    async fn remove(&self, reference: &str) -> AppResult<()>;
}

/// Writes blobs into a local directory that is served statically under `url_prefix`
pub struct LocalBlobStore {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalBlobStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(&config.dir, &config.url_prefix)
    }
}

/// Keep only the final path component and a conservative character set
fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn store(&self, filename: &str, bytes: &[u8]) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create media directory: {}", e)))?;

        let name = format!("{}_{}", Uuid::new_v4().simple(), sanitize_filename(filename));
        tokio::fs::write(self.dir.join(&name), bytes)
            .await
            .map_err(|e| {
                AppError::Internal(format!("Failed to write media file {}: {}", name, e))
            })?;

        debug!("Stored blob {}", name);
        Ok(format!("{}/{}", self.url_prefix, name))
    }

    #[instrument(skip(self))]
    async fn remove(&self, reference: &str) -> AppResult<()> {
        let name = reference
            .strip_prefix(self.url_prefix.as_str())
            .map(|rest| rest.trim_start_matches('/'))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']))
            .ok_or_else(|| {
                AppError::Internal(format!("Not a local blob reference: {}", reference))
            })?;

        tokio::fs::remove_file(self.dir.join(name))
            .await
            .map_err(|e| {
                AppError::Internal(format!("Failed to remove media file {}: {}", name, e))
            })?;
        debug!("Removed blob {}", name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("cat.png"), "cat.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename("..."), "upload");
    }

    #[tokio::test]
    async fn test_store_writes_file_and_returns_reference() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path().join("media"), "/media_files/");

        let reference = store.store("cat.png", b"\x89PNG").await.unwrap();
        assert!(reference.starts_with("/media_files/"));
        assert!(reference.ends_with("_cat.png"));

        let name = reference.trim_start_matches("/media_files/");
        let written = std::fs::read(dir.path().join("media").join(name)).unwrap();
        assert_eq!(written, b"\x89PNG");
    }

    #[tokio::test]
    async fn test_remove_deletes_stored_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/media_files");
        let reference = store.store("cat.png", b"\x89PNG").await.unwrap();

        store.remove(&reference).await.unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        assert!(store.remove(&reference).await.is_err());
        assert!(store.remove("/elsewhere/cat.png").await.is_err());
        assert!(store.remove("/media_files/../secret").await.is_err());
    }

    #[tokio::test]
    async fn test_same_filename_gets_distinct_references() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/media_files");
        let a = store.store("a.jpg", b"1").await.unwrap();
        let b = store.store("a.jpg", b"2").await.unwrap();
        assert_ne!(a, b);
    }
}
