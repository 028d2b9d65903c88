pub mod admin;
pub mod health;
pub mod pages;
pub mod search;
pub mod vision;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::app::AppState;

/// Request body cap; photos arrive base64-encoded inside JSON.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build all routes.
///
/// Search and vision routes answer cross-origin requests; admin and health
/// routes do not.
pub fn build_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .merge(search::routes())
        .merge(vision::routes())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    let mut router = Router::new()
        .merge(health::routes())
        .merge(admin::routes())
        .merge(pages::routes())
        .merge(public);

    let uploads_path = state.settings.public_base_url.trim_end_matches('/');
    if uploads_path.starts_with('/') && uploads_path.len() > 1 {
        router = router.nest_service(uploads_path, ServeDir::new(&state.settings.storage_path));
    }

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
