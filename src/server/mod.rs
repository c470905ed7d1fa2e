mod api;
mod error;
mod state;
mod types;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use self::state::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::embed_text_handler,
        api::embed_image_handler,
        api::upload_handler,
        api::index_handler,
        api::search_handler,
        api::albums_handler,
        api::info_handler,
    ),
    components(schemas(types::ImageEmbedForm, types::UploadForm))
)]
pub struct ApiDoc;

/// 构建API服务器
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/embed/text", post(api::embed_text_handler))
        .route("/embed/image", post(api::embed_image_handler))
        .route("/upload", post(api::upload_handler))
        .route("/index", post(api::index_handler))
        .route("/search", post(api::search_handler))
        .route("/albums", get(api::albums_handler))
        .route("/info", get(api::info_handler))
        .route("/metrics", get(api::metrics_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::disable())
        // 上传限制：10M
        .layer(RequestBodyLimitLayer::new(1024 * 1024 * 10))
        .with_state(state)
}
