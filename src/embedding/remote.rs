use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ImageEmbedder;

/// Image embedding service reached over HTTP at `{base}/api/embed`.
pub struct RemoteImageEmbedder {
    api_base: Option<String>,
    dimensions: u32,
    http_client: reqwest::Client,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    image_base64: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl RemoteImageEmbedder {
    pub fn new(api_base: Option<String>, dimensions: u32, timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            api_base,
            dimensions,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()?,
        })
    }

    fn endpoint(&self) -> anyhow::Result<String> {
        let base = self
            .api_base
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Embedding service failed: VERCEL_URL is not configured"))?;
        Ok(format!("{}/api/embed", with_scheme(base).trim_end_matches('/')))
    }
}

/// Deployment hosts are often given without a scheme.
fn with_scheme(base: &str) -> String {
    if base.starts_with("http://") || base.starts_with("https://") {
        base.to_string()
    } else {
        format!("https://{base}")
    }
}

fn check_dimensions(embedding: &[f32], expected: u32) -> anyhow::Result<()> {
    if expected != 0 && embedding.len() != expected as usize {
        anyhow::bail!(
            "Embedding dimension mismatch: expected {}, got {}",
            expected,
            embedding.len()
        );
    }
    Ok(())
}

#[async_trait]
impl ImageEmbedder for RemoteImageEmbedder {
    async fn embed_image(&self, image_base64: &str) -> anyhow::Result<Vec<f32>> {
        let resp = self
            .http_client
            .post(self.endpoint()?)
            .json(&EmbedRequest { image_base64 })
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Embedding service failed: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Embedding service failed ({status}): {body}");
        }

        let response: EmbedResponse = resp.json().await?;
        check_dimensions(&response.embedding, self.dimensions)?;
        Ok(response.embedding)
    }
}
