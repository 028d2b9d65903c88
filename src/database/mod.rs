pub mod memory;
pub mod postgres;
pub mod supabase;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::models::question::Question;

/// Abstract question store: the relational side of the question bank.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Insert a question row under its pre-allocated id.
    async fn insert_question(&self, question: &Question) -> anyhow::Result<()>;

    /// Case-insensitive substring match on title, at most `limit` rows,
    /// in store-default order.
    async fn search_by_title(&self, keyword: &str, limit: usize) -> anyhow::Result<Vec<Question>>;

    /// Fetch rows by id. Order is unspecified; unknown ids are skipped.
    async fn get_questions(&self, ids: &[i64]) -> anyhow::Result<Vec<Question>>;

    /// Create tables if needed.
    async fn initialize(&self) -> anyhow::Result<()>;

    /// Return the provider name for logging.
    fn provider_name(&self) -> &str;
}

/// Build and initialize the configured question store.
pub async fn connect(settings: &Settings) -> anyhow::Result<Arc<dyn QuestionStore>> {
    let store: Arc<dyn QuestionStore> = match settings.database_provider.as_str() {
        "supabase" => {
            let url = settings
                .supabase_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("SUPABASE_URL environment variable is required"))?;
            Arc::new(supabase::SupabaseStore::new(
                url,
                settings.supabase_service_key.as_deref().unwrap_or(""),
                &settings.questions_table,
            )?)
        }
        "postgres" => {
            let uri = settings
                .postgres_uri
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("POSTGRES_URI environment variable is required"))?;
            Arc::new(
                postgres::PostgresStore::new(uri, settings.db_pool_size, &settings.questions_table)
                    .await?,
            )
        }
        "memory" => Arc::new(memory::MemoryStore::new()),
        other => anyhow::bail!("Unknown database provider: {other}"),
    };
    store.initialize().await?;
    info!("Question store ready ({})", store.provider_name());
    Ok(store)
}

/// Escape LIKE metacharacters so the keyword is matched literally.
pub fn escape_like(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Reorder `rows` to follow `ids`, dropping ids without a row.
pub fn order_by_ids(ids: &[i64], rows: Vec<Question>) -> Vec<Question> {
    let mut by_id: std::collections::HashMap<i64, Question> =
        rows.into_iter().map(|q| (q.id, q)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
