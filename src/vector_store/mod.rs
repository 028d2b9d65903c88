pub mod memory;
pub mod milvus;
pub mod pgvector;
pub mod utils;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::models::question::VectorHit;

/// Abstract vector index: image embeddings keyed by question id.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Store the embedding for a question.
    async fn insert(&self, id: i64, embedding: &[f32]) -> anyhow::Result<()>;

    /// Nearest question ids to `embedding`, closest first, at most `k`.
    async fn search(&self, embedding: &[f32], k: usize) -> anyhow::Result<Vec<VectorHit>>;

    /// Remove the embedding for a question. Returns whether anything was removed,
    /// where the backend can tell.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;

    /// Create the collection/table if needed.
    async fn initialize(&self) -> anyhow::Result<()>;

    /// Return the provider name for logging.
    fn provider_name(&self) -> &str;
}

/// Build and initialize the configured vector index.
pub async fn connect(settings: &Settings) -> anyhow::Result<Arc<dyn VectorIndex>> {
    let index: Arc<dyn VectorIndex> = match settings.vector_store_provider.as_str() {
        "milvus" => Arc::new(milvus::MilvusIndex::new(
            &settings.milvus_address,
            &settings.vector_collection,
            settings.vector_dimensions,
        )?),
        "pgvector" => {
            let uri = settings
                .postgres_uri
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("POSTGRES_URI environment variable is required"))?;
            Arc::new(
                pgvector::PGVectorIndex::new(
                    uri,
                    settings.db_pool_size,
                    &settings.vector_collection,
                    settings.vector_dimensions,
                )
                .await?,
            )
        }
        "memory" => Arc::new(memory::MemoryIndex::new()),
        other => anyhow::bail!("Unknown vector store provider: {other}"),
    };
    index.initialize().await?;
    info!("Vector index ready ({})", index.provider_name());
    Ok(index)
}
