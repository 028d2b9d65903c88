use async_trait::async_trait;
use tokio::sync::RwLock;

use super::QuestionStore;
use crate::models::question::{title_matches, Question};

/// In-process question store, insertion-ordered. For development and tests.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<Question>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl QuestionStore for MemoryStore {
    async fn insert_question(&self, question: &Question) -> anyhow::Result<()> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|q| q.id == question.id) {
            anyhow::bail!("duplicate key value violates unique constraint (id={})", question.id);
        }
        rows.push(question.clone());
        Ok(())
    }

    async fn search_by_title(&self, keyword: &str, limit: usize) -> anyhow::Result<Vec<Question>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|q| title_matches(&q.title, keyword))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_questions(&self, ids: &[i64]) -> anyhow::Result<Vec<Question>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().filter(|q| ids.contains(&q.id)).cloned().collect())
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}
