use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

use super::{validate_key, Storage, StorageError, StoredObject};

/// Local filesystem storage backend. Files are served back by the router
/// under `public_base_url`.
pub struct LocalStorage {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(storage_path: &str, public_base_url: &str) -> Self {
        let base_path = PathBuf::from(storage_path);
        // Ensure directory exists (best-effort at construction time).
        std::fs::create_dir_all(&base_path).ok();
        Self {
            base_path,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn resolve_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_bytes(&self, data: &[u8], key: &str) -> Result<StoredObject, StorageError> {
        let path = self.resolve_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, data).await?;
        Ok(StoredObject {
            key: key.to_string(),
            url: self.public_url(key),
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }

    fn provider_name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(dir: &TempDir) -> LocalStorage {
        LocalStorage::new(dir.path().to_str().unwrap(), "/uploads/")
    }

    #[tokio::test]
    async fn test_local_upload_writes_file() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);

        let stored = storage
            .upload_bytes(b"hello world", "questions/file.png")
            .await
            .unwrap();
        assert_eq!(stored.key, "questions/file.png");
        assert_eq!(stored.url, "/uploads/questions/file.png");

        let written = std::fs::read(dir.path().join("questions/file.png")).unwrap();
        assert_eq!(written, b"hello world");
    }

    #[tokio::test]
    async fn test_local_upload_overwrites_same_key() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);

        storage.upload_bytes(b"first", "a.png").await.unwrap();
        storage.upload_bytes(b"second", "a.png").await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("a.png")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_local_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let result = storage(&dir).upload_bytes(b"x", "../escape.png").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[test]
    fn test_public_url_joins_base() {
        let dir = TempDir::new().unwrap();
        assert_eq!(storage(&dir).public_url("q/x.jpg"), "/uploads/q/x.jpg");
    }
}
