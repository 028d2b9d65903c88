use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;

use crate::app::AppState;
use crate::error::{method_not_allowed, options_ok, upstream, ApiError, ApiResult};
use crate::models::api::{ImageRequest, SearchByImageResponse, SearchRequest, SearchResponse};
use crate::orchestrator;
use crate::search::{self, non_blank};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/image-search",
            post(image_search).options(options_ok).fallback(method_not_allowed),
        )
        .route(
            "/api/search-by-image",
            post(search_by_image).options(options_ok).fallback(method_not_allowed),
        )
}

/// POST /api/image-search - Keyword search, or nearest neighbours of an image.
async fn image_search(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Json(req) = payload?;
    let results = search::search(&state, &req)
        .await
        .map_err(upstream("Search"))?;
    Ok(Json(SearchResponse { results }))
}

/// POST /api/search-by-image - Rectify, OCR and search in one call.
async fn search_by_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> ApiResult<Json<SearchByImageResponse>> {
    let Json(req) = payload?;
    let image = non_blank(&req.image_base64)
        .ok_or_else(|| ApiError::BadRequest("imageBase64 is required".to_string()))?;

    let outcome = orchestrator::search_by_image(&*state, image).await;
    Ok(Json(outcome.into()))
}
