pub mod remote;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Settings;

/// Abstract image embedding interface.
#[async_trait]
pub trait ImageEmbedder: Send + Sync {
    /// Embed a base64-encoded image (a `data:` URI prefix is allowed).
    async fn embed_image(&self, image_base64: &str) -> anyhow::Result<Vec<f32>>;
}

/// Build the configured embedder. Construction never touches the network.
pub fn build(settings: &Settings) -> anyhow::Result<Arc<dyn ImageEmbedder>> {
    match settings.embedding_provider.as_str() {
        "remote" => Ok(Arc::new(remote::RemoteImageEmbedder::new(
            settings.embedding_api_base.clone(),
            settings.vector_dimensions,
            settings.embedding_timeout_secs,
        )?)),
        other => anyhow::bail!("Unknown embedding provider: {other}"),
    }
}
