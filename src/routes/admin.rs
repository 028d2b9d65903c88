use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::app::AppState;
use crate::error::{method_not_allowed, upstream, ApiError, ApiResult};
use crate::models::api::{
    AddQuestionRequest, AddQuestionResponse, UploadImageRequest, UploadImageResponse,
};
use crate::models::question::{NewQuestion, Question};
use crate::search::non_blank;
use crate::storage::image_key;
use crate::vision::image::ImagePayload;

pub const MISSING_FIELDS: &str = "title, answer, imageUrl and imageBase64 are required";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/admin/add-question",
            post(add_question).fallback(method_not_allowed),
        )
        .route(
            "/api/admin/upload-image",
            post(upload_image).fallback(method_not_allowed),
        )
}

/// POST /api/admin/add-question - Embed the image, index it and store the row.
async fn add_question(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AddQuestionRequest>, JsonRejection>,
) -> ApiResult<Json<AddQuestionResponse>> {
    let Json(req) = payload?;

    let (Some(title), Some(answer), Some(image_url), Some(image)) = (
        non_blank(&req.title),
        non_blank(&req.answer),
        non_blank(&req.image_url),
        non_blank(&req.image_base64),
    ) else {
        return Err(ApiError::BadRequest(MISSING_FIELDS.to_string()));
    };
    let new_question = NewQuestion {
        title: title.to_string(),
        answer: answer.to_string(),
        image_url: image_url.to_string(),
    };

    // 1. Embed the image.
    let embedding = state
        .embedder
        .embed_image(image)
        .await
        .map_err(upstream("Embedding"))?;

    // 2. Allocate the id shared by the vector and the row.
    let question = new_question.with_id(state.ids.next_id());
    let id = question.id;

    // 3. Index the vector.
    let index = state.vector_index.get().await.map_err(upstream("Vector index"))?;
    index
        .insert(id, &embedding)
        .await
        .map_err(upstream("Vector insert"))?;

    // 4. Store the row; undo the vector if that fails.
    if let Err(e) = insert_row(&state, &question).await {
        error!("Question insert failed for {id}: {e}");
        match index.delete(id).await {
            Ok(removed) => warn!("Removed orphaned vector {id} (removed={removed})"),
            Err(de) => error!("Failed to remove orphaned vector {id}: {de}"),
        }
        return Err(e.into());
    }

    info!("Question {id} added: {}", question.title);
    Ok(Json(AddQuestionResponse {
        success: true,
        message: "题目添加成功！".to_string(),
        id,
    }))
}

async fn insert_row(state: &AppState, question: &Question) -> anyhow::Result<()> {
    let store = state.questions.get().await?;
    store.insert_question(question).await
}

/// POST /api/admin/upload-image - Store an image and return its public URL.
async fn upload_image(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UploadImageRequest>, JsonRejection>,
) -> ApiResult<Json<UploadImageResponse>> {
    let Json(req) = payload?;
    let content = non_blank(&req.image_base64)
        .ok_or_else(|| ApiError::BadRequest("imageBase64 is required".to_string()))?;

    let image = ImagePayload::parse(content)
        .map_err(|e| ApiError::BadRequest(format!("Invalid image data: {e}")))?;
    let key = image_key(req.filename.as_deref(), &image);

    let stored = state
        .storage
        .upload_bytes(&image.bytes, &key)
        .await
        .map_err(|e| {
            error!("Image upload failed: {e}");
            ApiError::Upstream(e.to_string())
        })?;

    info!(
        "Stored {} bytes ({}) at {} via {}",
        image.bytes.len(),
        image.mime,
        stored.key,
        state.storage.provider_name()
    );
    Ok(Json(UploadImageResponse {
        success: true,
        image_url: stored.url,
    }))
}
