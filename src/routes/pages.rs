use axum::response::Html;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

use crate::app::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");
const ADMIN_HTML: &str = include_str!("../../static/admin.html");

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(|| async { Html(INDEX_HTML) }))
        .route("/admin", get(|| async { Html(ADMIN_HTML) }))
}
