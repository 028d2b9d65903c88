use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::models::question::VectorHit;
use crate::vector_store::utils::{distance_to_score, vector_literal};
use crate::vector_store::VectorIndex;

/// PostgreSQL with pgvector implementation of the question vector index.
pub struct PGVectorIndex {
    pool: PgPool,
    table: String,
    dimensions: u32,
}

impl PGVectorIndex {
    pub async fn new(uri: &str, pool_size: u32, table: &str, dimensions: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(10))
            .connect(uri)
            .await?;

        info!("Created PGVector connection pool (size={pool_size})");

        Ok(Self {
            pool,
            table: table.to_string(),
            dimensions,
        })
    }
}

#[async_trait]
impl VectorIndex for PGVectorIndex {
    async fn initialize(&self) -> anyhow::Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = $1)",
        )
        .bind(&self.table)
        .fetch_one(&self.pool)
        .await?;

        if !exists {
            sqlx::query(&format!(
                "CREATE TABLE {} (
                    id BIGINT PRIMARY KEY,
                    embedding vector({}) NOT NULL
                )",
                self.table, self.dimensions
            ))
            .execute(&self.pool)
            .await?;

            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {0}_embedding_idx ON {0}
                 USING ivfflat (embedding vector_l2_ops) WITH (lists = 100)",
                self.table
            ))
            .execute(&self.pool)
            .await?;
            info!("Created {} with vector({})", self.table, self.dimensions);
        } else {
            info!("{} already exists", self.table);
        }

        Ok(())
    }

    async fn insert(&self, id: i64, embedding: &[f32]) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "INSERT INTO {} (id, embedding) VALUES ($1, $2::vector)",
            self.table
        ))
        .bind(id)
        .bind(vector_literal(embedding))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn search(&self, embedding: &[f32], k: usize) -> anyhow::Result<Vec<VectorHit>> {
        let rows = sqlx::query(&format!(
            "SELECT id, (embedding <-> $1::vector)::float8 AS distance
             FROM {}
             ORDER BY distance
             LIMIT $2",
            self.table
        ))
        .bind(vector_literal(embedding))
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let distance: f64 = row.get("distance");
                VectorHit {
                    id: row.get("id"),
                    score: distance_to_score(distance as f32),
                }
            })
            .collect())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.table))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn provider_name(&self) -> &str {
        "pgvector"
    }
}
