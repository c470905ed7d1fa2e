use std::path::Path;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum_typed_multipart::TypedMultipart;
use log::info;

use super::error::Result;
use super::state::AppState;
use super::types::*;
use crate::config::parse_tags;
use crate::error::Error;
use crate::metrics;

/// 文本向量化
#[utoipa::path(
    post,
    path = "/embed/text",
    request_body = TextEmbedRequest,
    responses(
        (status = 200, body = EmbedResponse),
    )
)]
pub async fn embed_text_handler(
    State(state): State<Arc<AppState>>,
    Json(data): Json<TextEmbedRequest>,
) -> Result<Json<EmbedResponse>> {
    let vector = state.embedder.embed_text(&data.text).await?;
    Ok(Json(EmbedResponse { vector }))
}

/// 图片向量化
#[utoipa::path(
    post,
    path = "/embed/image",
    request_body(content = ImageEmbedForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = EmbedResponse),
    )
)]
pub async fn embed_image_handler(
    State(state): State<Arc<AppState>>,
    data: TypedMultipart<ImageEmbedRequest>,
) -> Result<Json<EmbedResponse>> {
    let vector = state.embedder.embed_image(&data.file).await?;
    Ok(Json(EmbedResponse { vector }))
}

/// 上传媒体文件，向量化后添加到索引
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = UploadResponse),
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    TypedMultipart(data): TypedMultipart<UploadRequest>,
) -> Result<Json<UploadResponse>> {
    let file_name = media_file_name(&data.media_id, data.file.metadata.file_name.as_deref())?;
    let vector = state.embedder.embed_image(&data.file.contents).await?;
    let tags = data.tags.as_deref().map(parse_tags).unwrap_or_default();

    // 持有写锁直到添加完成，检查通过之后才写入文件
    let mut engine = state.engine.write().await;
    engine.check_add(&data.media_id, &vector)?;

    let media_dir = state.data_dir.media();
    tokio::fs::create_dir_all(&media_dir).await?;
    let file_path = media_dir.join(file_name);
    tokio::fs::write(&file_path, &data.file.contents).await?;
    let path = file_path.to_string_lossy().to_string();

    info!("上传媒体: {} -> {}", data.media_id, path);

    engine.add(&data.media_id, &vector, &data.album, &tags, Some(&path)).await?;

    Ok(Json(UploadResponse { status: "success".into(), path }))
}

/// 添加预先计算好的向量及其元数据
#[utoipa::path(
    post,
    path = "/index",
    request_body = IndexRequest,
    responses(
        (status = 200, body = StatusResponse),
    )
)]
pub async fn index_handler(
    State(state): State<Arc<AppState>>,
    Json(data): Json<IndexRequest>,
) -> Result<Json<StatusResponse>> {
    let meta = data.metadata;
    state
        .engine
        .write()
        .await
        .add(&data.media_id, &data.vector, &meta.album, &meta.tags, meta.path.as_deref())
        .await?;
    Ok(Json(StatusResponse { status: "success".into() }))
}

/// 使用文本搜索媒体
#[utoipa::path(
    post,
    path = "/search",
    request_body = SearchRequest,
    responses(
        (status = 200, body = SearchResponse),
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(data): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    if data.top_k == 0 {
        return Err(Error::Validation("top_k 必须大于等于 1".into()).into());
    }
    let query = state.embedder.embed_text(&data.query).await?;
    // 空字符串等同于不过滤
    let album = data.album.as_deref().filter(|a| !a.is_empty());

    let results = state.engine.read().await.search(&query, data.top_k, album).await?;

    Ok(Json(SearchResponse { results: results.into_iter().map(Into::into).collect() }))
}

/// 列出所有相册
#[utoipa::path(
    get,
    path = "/albums",
    responses(
        (status = 200, body = Vec<AlbumItem>),
    )
)]
pub async fn albums_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<AlbumItem>>> {
    let albums = state.engine.read().await.albums().await?;
    Ok(Json(albums.into_iter().map(Into::into).collect()))
}

/// 获取服务信息
#[utoipa::path(
    get,
    path = "/info",
    responses(
        (status = 200, body = InfoResponse),
    )
)]
pub async fn info_handler(State(state): State<Arc<AppState>>) -> Result<Json<InfoResponse>> {
    let engine = state.engine.read().await;
    Ok(Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        total_media: engine.store().count().await?,
        indexed_vectors: engine.ntotal(),
        dimension: engine.dimension(),
        albums: engine.albums().await?.into_iter().map(Into::into).collect(),
    }))
}

/// 导出 prometheus 指标
pub async fn metrics_handler() -> String {
    metrics::gather_text()
}

/// 生成媒体文件名 `{media_id}.{ext}`，扩展名取自上传的文件名
fn media_file_name(media_id: &str, file_name: Option<&str>) -> Result<String, Error> {
    if media_id.is_empty() || media_id.contains(['/', '\\']) || media_id.starts_with('.') {
        return Err(Error::Validation(format!("无效的 media_id: {:?}", media_id)));
    }
    let ext = file_name
        .and_then(|name| Path::new(name).extension())
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string());
    Ok(format!("{}.{}", media_id, ext))
}
