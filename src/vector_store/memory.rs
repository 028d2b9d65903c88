use async_trait::async_trait;
use tokio::sync::RwLock;

use super::utils::{distance_to_score, l2_distance};
use super::VectorIndex;
use crate::models::question::VectorHit;

/// Brute-force in-process index (L2). For development and tests.
#[derive(Default)]
pub struct MemoryIndex {
    entries: RwLock<Vec<(i64, Vec<f32>)>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn insert(&self, id: i64, embedding: &[f32]) -> anyhow::Result<()> {
        let mut entries = self.entries.write().await;
        entries.retain(|(existing, _)| *existing != id);
        entries.push((id, embedding.to_vec()));
        Ok(())
    }

    async fn search(&self, embedding: &[f32], k: usize) -> anyhow::Result<Vec<VectorHit>> {
        let entries = self.entries.read().await;
        let mut scored: Vec<(i64, f32)> = entries
            .iter()
            .map(|(id, v)| (*id, l2_distance(embedding, v)))
            .collect();
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(id, distance)| VectorHit {
                id,
                score: distance_to_score(distance),
            })
            .collect())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        Ok(entries.len() < before)
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_orders_by_distance() {
        let index = MemoryIndex::new();
        index.insert(1, &[0.0, 0.0]).await.unwrap();
        index.insert(2, &[1.0, 1.0]).await.unwrap();
        index.insert(3, &[5.0, 5.0]).await.unwrap();

        let hits = index.search(&[0.9, 0.9], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, 2);
        assert_eq!(hits[1].id, 1);
        assert!(hits[0].score > hits[1].score);
    }

    #[tokio::test]
    async fn test_insert_replaces_and_delete_removes() {
        let index = MemoryIndex::new();
        index.insert(1, &[0.0]).await.unwrap();
        index.insert(1, &[2.0]).await.unwrap();
        assert_eq!(index.len().await, 1);

        assert!(index.delete(1).await.unwrap());
        assert!(!index.delete(1).await.unwrap());
        assert!(index.is_empty().await);
    }
}
