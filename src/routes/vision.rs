use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;

use crate::app::AppState;
use crate::error::{method_not_allowed, options_ok, upstream, ApiError, ApiResult};
use crate::models::api::{ImageRequest, OcrResponse, RectifyResponse};
use crate::search::non_blank;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/ocr", post(ocr).options(options_ok).fallback(method_not_allowed))
        .route(
            "/api/rectify-image",
            post(rectify_image).options(options_ok).fallback(method_not_allowed),
        )
}

fn required_image(req: &ImageRequest) -> ApiResult<&str> {
    non_blank(&req.image_base64)
        .ok_or_else(|| ApiError::BadRequest("imageBase64 is required".to_string()))
}

/// POST /api/ocr
async fn ocr(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> ApiResult<Json<OcrResponse>> {
    let Json(req) = payload?;
    let text = state
        .recognizer
        .recognize_text(required_image(&req)?)
        .await
        .map_err(upstream("OCR"))?;
    Ok(Json(OcrResponse::from_text(text)))
}

/// POST /api/rectify-image
async fn rectify_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> ApiResult<Json<RectifyResponse>> {
    let Json(req) = payload?;
    let rectified = state
        .rectifier
        .rectify(required_image(&req)?)
        .await
        .map_err(upstream("Rectification"))?;
    Ok(Json(RectifyResponse {
        success: true,
        rectified_image: rectified.image_base64,
        message: rectified.message,
    }))
}
