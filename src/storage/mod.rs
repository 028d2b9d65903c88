pub mod local;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::Settings;
use crate::vision::image::ImagePayload;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

/// Abstract storage backend for uploaded question images.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload raw bytes.
    async fn upload_bytes(&self, data: &[u8], key: &str) -> Result<StoredObject, StorageError>;

    /// Public URL the object is served under.
    fn public_url(&self, key: &str) -> String;

    fn provider_name(&self) -> &str;
}

pub fn build(settings: &Settings) -> anyhow::Result<Arc<dyn Storage>> {
    match settings.storage_provider.as_str() {
        "local" => Ok(Arc::new(local::LocalStorage::new(
            &settings.storage_path,
            &settings.public_base_url,
        ))),
        other => anyhow::bail!("Unknown storage provider: {other}"),
    }
}

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Storage key for a new question image: `questions/<uuid>.<ext>`.
///
/// The extension comes from `filename` when it names a known image type,
/// otherwise from the payload's MIME type.
pub fn image_key(filename: Option<&str>, payload: &ImagePayload) -> String {
    let ext = filename
        .and_then(|f| f.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or_else(|| payload.extension().to_string());
    format!("questions/{}.{ext}", uuid::Uuid::new_v4())
}

/// Reject keys that could escape the storage root.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if bad {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
