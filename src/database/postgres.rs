use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::info;

use super::{escape_like, QuestionStore};
use crate::models::question::Question;

/// PostgreSQL question store.
pub struct PostgresStore {
    pool: PgPool,
    table: String,
}

impl PostgresStore {
    pub async fn new(uri: &str, pool_size: u32, table: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(10))
            .connect(uri)
            .await?;

        info!("Connected to PostgreSQL (pool_size={pool_size})");
        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }
}

fn row_to_question(r: &PgRow) -> Question {
    Question {
        id: r.get("id"),
        title: r.get("title"),
        answer: r.get("answer"),
        image_url: r.get::<Option<String>, _>("image_url").unwrap_or_default(),
    }
}

#[async_trait]
impl QuestionStore for PostgresStore {
    async fn initialize(&self) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGINT PRIMARY KEY,
                title TEXT NOT NULL,
                answer TEXT NOT NULL,
                image_url TEXT,
                created_at TIMESTAMP WITH TIME ZONE DEFAULT CURRENT_TIMESTAMP
            )",
            self.table
        ))
        .execute(&self.pool)
        .await?;

        info!("Table {} initialized", self.table);
        Ok(())
    }

    async fn insert_question(&self, question: &Question) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "INSERT INTO {} (id, title, answer, image_url) VALUES ($1, $2, $3, $4)",
            self.table
        ))
        .bind(question.id)
        .bind(&question.title)
        .bind(&question.answer)
        .bind(&question.image_url)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow::anyhow!("Postgres insert failed: {e}"))?;

        Ok(())
    }

    async fn search_by_title(&self, keyword: &str, limit: usize) -> anyhow::Result<Vec<Question>> {
        let pattern = format!("%{}%", escape_like(keyword));
        let rows = sqlx::query(&format!(
            "SELECT id, title, answer, image_url
             FROM {}
             WHERE title ILIKE $1 ESCAPE '\\'
             LIMIT $2",
            self.table
        ))
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_question).collect())
    }

    async fn get_questions(&self, ids: &[i64]) -> anyhow::Result<Vec<Question>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let rows = sqlx::query(&format!(
            "SELECT id, title, answer, image_url FROM {} WHERE id = ANY($1)",
            self.table
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_question).collect())
    }

    fn provider_name(&self) -> &str {
        "postgres"
    }
}
