//! "Search by photo": rectify, then OCR and image search side by side, then a
//! keyword fallback on the recognized text.
//!
//! The flow runs against any [`SearchApi`]: the service's own components
//! (`AppState`) or a deployed instance over HTTP ([`HttpSearchApi`]).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::app::AppState;
use crate::models::api::{
    ImageRequest, OcrResponse, RectifyResponse, SearchByImageResponse, SearchRequest,
    SearchResponse,
};
use crate::models::question::Question;

/// The calls the orchestrator makes. Each may fail independently.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchApi: Send + Sync {
    async fn rectify(&self, image_base64: &str) -> anyhow::Result<String>;

    async fn recognize_text(&self, image_base64: &str) -> anyhow::Result<String>;

    async fn search(&self, request: SearchRequest) -> anyhow::Result<Vec<Question>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Image,
    Text,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchSource::Image => "image",
            MatchSource::Text => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found {
        results: Vec<Question>,
        source: MatchSource,
        recognized_text: Option<String>,
    },
    NoMatch {
        recognized_text: Option<String>,
    },
}

impl From<SearchOutcome> for SearchByImageResponse {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Found {
                results,
                source,
                recognized_text,
            } => Self {
                results,
                recognized_text,
                source: source.as_str().to_string(),
            },
            SearchOutcome::NoMatch { recognized_text } => Self {
                results: Vec::new(),
                recognized_text,
                source: "none".to_string(),
            },
        }
    }
}

/// Run the search-by-photo flow.
pub async fn search_by_image<A: SearchApi + ?Sized>(api: &A, image_base64: &str) -> SearchOutcome {
    let image = match api.rectify(image_base64).await {
        Ok(rectified) => rectified,
        Err(e) => {
            warn!("Rectification failed, using original image: {e}");
            image_base64.to_string()
        }
    };

    let (ocr, by_image) = tokio::join!(
        api.recognize_text(&image),
        api.search(SearchRequest::by_image(image.clone())),
    );

    let recognized_text = match ocr {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("OCR failed: {e}");
            None
        }
    };

    let results = match by_image {
        Ok(results) => results,
        Err(e) => {
            warn!("Image search failed: {e}");
            Vec::new()
        }
    };
    if !results.is_empty() {
        return SearchOutcome::Found {
            results,
            source: MatchSource::Image,
            recognized_text,
        };
    }

    if let Some(text) = recognized_text.as_deref().filter(|t| !t.is_empty()) {
        match api.search(SearchRequest::by_keyword(text)).await {
            Ok(results) if !results.is_empty() => {
                info!("Image search empty, matched {} by recognized text", results.len());
                return SearchOutcome::Found {
                    results,
                    source: MatchSource::Text,
                    recognized_text,
                };
            }
            Ok(_) => {}
            Err(e) => warn!("Keyword fallback search failed: {e}"),
        }
    }

    SearchOutcome::NoMatch { recognized_text }
}

#[async_trait]
impl SearchApi for AppState {
    async fn rectify(&self, image_base64: &str) -> anyhow::Result<String> {
        Ok(self.rectifier.rectify(image_base64).await?.image_base64)
    }

    async fn recognize_text(&self, image_base64: &str) -> anyhow::Result<String> {
        self.recognizer.recognize_text(image_base64).await
    }

    async fn search(&self, request: SearchRequest) -> anyhow::Result<Vec<Question>> {
        crate::search::search(self, &request).await
    }
}

/// [`SearchApi`] against a running instance of this service.
pub struct HttpSearchApi {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpSearchApi {
    pub fn new(base_url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()?,
        })
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        let resp = self
            .http_client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body: serde_json::Value = resp.json().await.unwrap_or_default();
            let message = body["error"].as_str().unwrap_or("unknown error");
            anyhow::bail!("{path} failed ({status}): {message}");
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl SearchApi for HttpSearchApi {
    async fn rectify(&self, image_base64: &str) -> anyhow::Result<String> {
        let body = ImageRequest {
            image_base64: Some(image_base64.to_string()),
        };
        let resp: RectifyResponse = self.post("/api/rectify-image", &body).await?;
        if !resp.success {
            anyhow::bail!("Rectification failed: {}", resp.message);
        }
        Ok(resp.rectified_image)
    }

    async fn recognize_text(&self, image_base64: &str) -> anyhow::Result<String> {
        let body = ImageRequest {
            image_base64: Some(image_base64.to_string()),
        };
        let resp: OcrResponse = self.post("/api/ocr", &body).await?;
        if !resp.success {
            anyhow::bail!("OCR failed");
        }
        Ok(resp.text)
    }

    async fn search(&self, request: SearchRequest) -> anyhow::Result<Vec<Question>> {
        let resp: SearchResponse = self.post("/api/image-search", &request).await?;
        Ok(resp.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i64, title: &str) -> Question {
        Question {
            id,
            title: title.to_string(),
            answer: "answer".to_string(),
            image_url: String::new(),
        }
    }

    fn is_image_search(req: &SearchRequest) -> bool {
        req.image_base64.is_some() && req.keyword.is_none()
    }

    #[tokio::test]
    async fn test_image_hits_skip_fallback() {
        let mut api = MockSearchApi::new();
        api.expect_rectify().returning(|_| Ok("rectified".to_string()));
        api.expect_recognize_text()
            .withf(|img| img == "rectified")
            .returning(|_| Ok("二次函数".to_string()));
        api.expect_search()
            .withf(|req| is_image_search(req) && req.image_base64.as_deref() == Some("rectified"))
            .times(1)
            .returning(|_| Ok(vec![question(1, "二次函数求导")]));

        let outcome = search_by_image(&api, "original").await;
        assert_eq!(
            outcome,
            SearchOutcome::Found {
                results: vec![question(1, "二次函数求导")],
                source: MatchSource::Image,
                recognized_text: Some("二次函数".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_empty_image_search_falls_back_to_text() {
        let mut api = MockSearchApi::new();
        api.expect_rectify().returning(|img| Ok(img.to_string()));
        api.expect_recognize_text().returning(|_| Ok("三角函数".to_string()));
        api.expect_search()
            .withf(is_image_search)
            .times(1)
            .returning(|_| Ok(vec![]));
        api.expect_search()
            .withf(|req| req.keyword.as_deref() == Some("三角函数"))
            .times(1)
            .returning(|_| Ok(vec![question(2, "三角函数计算")]));

        match search_by_image(&api, "img").await {
            SearchOutcome::Found { results, source, .. } => {
                assert_eq!(source, MatchSource::Text);
                assert_eq!(results[0].id, 2);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_ocr_text_skips_fallback() {
        let mut api = MockSearchApi::new();
        api.expect_rectify().returning(|img| Ok(img.to_string()));
        api.expect_recognize_text().returning(|_| Ok(String::new()));
        api.expect_search()
            .withf(is_image_search)
            .times(1)
            .returning(|_| Ok(vec![]));

        let outcome = search_by_image(&api, "img").await;
        assert_eq!(
            outcome,
            SearchOutcome::NoMatch {
                recognized_text: Some(String::new())
            }
        );
    }

    #[tokio::test]
    async fn test_failed_ocr_does_not_abort_image_search() {
        let mut api = MockSearchApi::new();
        api.expect_rectify().returning(|img| Ok(img.to_string()));
        api.expect_recognize_text()
            .returning(|_| Err(anyhow::anyhow!("OCR service down")));
        api.expect_search()
            .withf(is_image_search)
            .times(1)
            .returning(|_| Ok(vec![question(3, "几何证明")]));

        match search_by_image(&api, "img").await {
            SearchOutcome::Found {
                results,
                source,
                recognized_text,
            } => {
                assert_eq!(results.len(), 1);
                assert_eq!(source, MatchSource::Image);
                assert!(recognized_text.is_none());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_image_search_still_uses_ocr() {
        let mut api = MockSearchApi::new();
        api.expect_rectify().returning(|img| Ok(img.to_string()));
        api.expect_recognize_text().returning(|_| Ok("概率".to_string()));
        api.expect_search()
            .withf(is_image_search)
            .returning(|_| Err(anyhow::anyhow!("vector index unavailable")));
        api.expect_search()
            .withf(|req| req.keyword.as_deref() == Some("概率"))
            .times(1)
            .returning(|_| Ok(vec![question(4, "概率问题")]));

        let outcome = search_by_image(&api, "img").await;
        assert!(matches!(
            outcome,
            SearchOutcome::Found {
                source: MatchSource::Text,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_failed_rectify_keeps_original_image() {
        let mut api = MockSearchApi::new();
        api.expect_rectify()
            .returning(|_| Err(anyhow::anyhow!("rectifier crashed")));
        api.expect_recognize_text()
            .withf(|img| img == "original")
            .times(1)
            .returning(|_| Ok(String::new()));
        api.expect_search()
            .withf(|req| req.image_base64.as_deref() == Some("original"))
            .times(1)
            .returning(|_| Ok(vec![]));

        let outcome = search_by_image(&api, "original").await;
        assert!(matches!(outcome, SearchOutcome::NoMatch { .. }));
    }

    #[test]
    fn test_outcome_to_response() {
        let resp = SearchByImageResponse::from(SearchOutcome::NoMatch {
            recognized_text: None,
        });
        assert_eq!(resp.source, "none");
        assert!(resp.results.is_empty());

        let resp = SearchByImageResponse::from(SearchOutcome::Found {
            results: vec![question(1, "t")],
            source: MatchSource::Text,
            recognized_text: Some("t".to_string()),
        });
        assert_eq!(resp.source, "text");
        assert_eq!(resp.recognized_text.as_deref(), Some("t"));
    }

    #[test]
    fn test_http_api_trims_base_url() {
        let api = HttpSearchApi::new("http://localhost:3000/", 5).unwrap();
        assert_eq!(api.base_url, "http://localhost:3000");
    }
}
