use tracing::debug;

use crate::app::AppState;
use crate::database::order_by_ids;
use crate::models::api::SearchRequest;
use crate::models::question::{Question, MAX_RESULTS};

/// Case-insensitive title match, at most [`MAX_RESULTS`] rows.
pub async fn keyword_search(state: &AppState, keyword: &str) -> anyhow::Result<Vec<Question>> {
    let store = state.questions.get().await?;
    let results = store.search_by_title(keyword, MAX_RESULTS).await?;
    debug!("Keyword search {keyword:?}: {} results", results.len());
    Ok(results)
}

/// Embed the image, take the nearest ids from the vector index and return
/// their rows in similarity order.
pub async fn image_search(state: &AppState, image_base64: &str) -> anyhow::Result<Vec<Question>> {
    let embedding = state.embedder.embed_image(image_base64).await?;
    let index = state.vector_index.get().await?;
    let hits = index.search(&embedding, MAX_RESULTS).await?;
    if hits.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = hits.iter().map(|h| h.id).collect();
    let store = state.questions.get().await?;
    let rows = store.get_questions(&ids).await?;
    let results = order_by_ids(&ids, rows);
    debug!("Image search: {} hits, {} rows", hits.len(), results.len());
    Ok(results)
}

/// A non-blank keyword wins over an image. Neither present yields no results.
pub async fn search(state: &AppState, request: &SearchRequest) -> anyhow::Result<Vec<Question>> {
    if let Some(keyword) = non_blank(&request.keyword) {
        keyword_search(state, keyword).await
    } else if let Some(image) = non_blank(&request.image_base64) {
        image_search(state, image).await
    } else {
        Ok(Vec::new())
    }
}

pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
