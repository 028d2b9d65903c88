use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use tracing::info;

use crate::models::question::VectorHit;
use crate::vector_store::utils::distance_to_score;
use crate::vector_store::VectorIndex;

/// Milvus vector index over the RESTful v2 API.
///
/// Collection layout: `id` INT64 primary key (no auto id), `embedding`
/// FLOAT_VECTOR, IVF_FLAT index with L2 metric.
pub struct MilvusIndex {
    base_url: String,
    collection: String,
    dimensions: u32,
    http_client: reqwest::Client,
}

/// Every v2 response is wrapped as `{code, message?, data?}`; code 0 means success.
#[derive(Debug, Deserialize)]
struct MilvusResponse {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(deserialize_with = "int64_from_string_or_number")]
    id: i64,
    distance: f32,
}

/// INT64 fields come back as JSON strings unless the server honours
/// `Accept-Type-Allow-Int64`.
fn int64_from_string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Int64 {
        Number(i64),
        Text(String),
    }

    match Int64::deserialize(deserializer)? {
        Int64::Number(n) => Ok(n),
        Int64::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

impl MilvusIndex {
    pub fn new(address: &str, collection: &str, dimensions: u32) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("Accept-Type-Allow-Int64", HeaderValue::from_static("true"));

        Ok(Self {
            base_url: base_url(address),
            collection: collection.to_string(),
            dimensions,
            http_client: reqwest::Client::builder()
                .default_headers(headers)
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
        })
    }

    async fn call(&self, path: &str, body: serde_json::Value) -> anyhow::Result<serde_json::Value> {
        let url = format!("{}/v2/vectordb/{path}", self.base_url);
        let resp = self.http_client.post(&url).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Milvus {path} failed ({status}): {text}");
        }

        let parsed: MilvusResponse = resp.json().await?;
        if parsed.code != 0 {
            anyhow::bail!(
                "Milvus {path} failed (code {}): {}",
                parsed.code,
                parsed.message.unwrap_or_default()
            );
        }
        Ok(parsed.data)
    }

    fn create_collection_body(&self) -> serde_json::Value {
        json!({
            "collectionName": self.collection,
            "schema": {
                "autoId": false,
                "enableDynamicField": false,
                "fields": [
                    { "fieldName": "id", "dataType": "Int64", "isPrimary": true },
                    {
                        "fieldName": "embedding",
                        "dataType": "FloatVector",
                        "elementTypeParams": { "dim": self.dimensions.to_string() }
                    }
                ]
            },
            "indexParams": [
                {
                    "fieldName": "embedding",
                    "indexName": "embedding_idx",
                    "metricType": "L2",
                    "indexType": "IVF_FLAT",
                    "params": { "nlist": 1024 }
                }
            ]
        })
    }
}

/// Accept `host:port` as well as a full URL.
fn base_url(address: &str) -> String {
    let trimmed = address.trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

fn parse_hits(data: serde_json::Value) -> anyhow::Result<Vec<VectorHit>> {
    let hits: Vec<SearchHit> = serde_json::from_value(data)?;
    Ok(hits
        .into_iter()
        .map(|h| VectorHit {
            id: h.id,
            score: distance_to_score(h.distance),
        })
        .collect())
}

#[async_trait]
impl VectorIndex for MilvusIndex {
    async fn initialize(&self) -> anyhow::Result<()> {
        let data = self
            .call("collections/has", json!({ "collectionName": self.collection }))
            .await?;
        let exists = data.get("has").and_then(|v| v.as_bool()).unwrap_or(false);

        if exists {
            info!("Milvus collection {} already exists", self.collection);
        } else {
            self.call("collections/create", self.create_collection_body())
                .await?;
            info!(
                "Created Milvus collection {} (dim={}, IVF_FLAT/L2)",
                self.collection, self.dimensions
            );
        }
        Ok(())
    }

    async fn insert(&self, id: i64, embedding: &[f32]) -> anyhow::Result<()> {
        self.call(
            "entities/insert",
            json!({
                "collectionName": self.collection,
                "data": [{ "id": id, "embedding": embedding }]
            }),
        )
        .await?;
        Ok(())
    }

    async fn search(&self, embedding: &[f32], k: usize) -> anyhow::Result<Vec<VectorHit>> {
        let data = self
            .call(
                "entities/search",
                json!({
                    "collectionName": self.collection,
                    "data": [embedding],
                    "annsField": "embedding",
                    "limit": k,
                    "outputFields": ["id"]
                }),
            )
            .await?;
        parse_hits(data)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        self.call(
            "entities/delete",
            json!({
                "collectionName": self.collection,
                "filter": format!("id in [{id}]")
            }),
        )
        .await?;
        Ok(true)
    }

    fn provider_name(&self) -> &str {
        "milvus"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(base_url("localhost:19530"), "http://localhost:19530");
        assert_eq!(base_url("https://milvus.example.com/"), "https://milvus.example.com");
    }

    #[test]
    fn test_create_collection_body() {
        let index = MilvusIndex::new("localhost:19530", "question_vectors", 512).unwrap();
        let body = index.create_collection_body();
        assert_eq!(body["collectionName"], "question_vectors");
        assert_eq!(body["schema"]["fields"][1]["elementTypeParams"]["dim"], "512");
        assert_eq!(body["indexParams"][0]["metricType"], "L2");
    }

    #[test]
    fn test_parse_hits() {
        let data = serde_json::json!([
            {"id": 1717000000000_i64, "distance": 0.0},
            {"id": 1717000000001_i64, "distance": 3.0}
        ]);
        let hits = parse_hits(data).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, 1717000000000);
        assert_eq!(hits[0].score, 1.0);
        assert!(hits[1].score < hits[0].score);
    }

    #[test]
    fn test_parse_hits_accepts_string_ids() {
        let data = serde_json::json!([
            {"id": "1717000000000", "distance": 0.5},
            {"id": 1717000000001_i64, "distance": 1.0}
        ]);
        let hits = parse_hits(data).unwrap();
        assert_eq!(hits[0].id, 1717000000000);
        assert_eq!(hits[1].id, 1717000000001);
    }

    #[test]
    fn test_parse_hits_rejects_non_numeric_id() {
        let data = serde_json::json!([{"id": "abc", "distance": 0.5}]);
        assert!(parse_hits(data).is_err());
    }

    #[test]
    fn test_error_envelope_deserializes() {
        let resp: MilvusResponse =
            serde_json::from_str(r#"{"code":1100,"message":"collection not found"}"#).unwrap();
        assert_eq!(resp.code, 1100);
        assert_eq!(resp.message.as_deref(), Some("collection not found"));
        assert!(resp.data.is_null());
    }
}
