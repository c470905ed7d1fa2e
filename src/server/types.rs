use axum::body::Bytes;
use axum_typed_multipart::{FieldData, TryFromMultipart};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::AlbumSummary;
use crate::engine::SearchResult;

/// 文本向量化请求
#[derive(Debug, Deserialize, ToSchema)]
pub struct TextEmbedRequest {
    pub text: String,
}

/// 图片向量化请求
#[derive(TryFromMultipart)]
pub struct ImageEmbedRequest {
    pub file: Bytes,
}

/// 图片向量化表单（用于API文档）
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct ImageEmbedForm {
    /// 图片文件
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// 向量化响应
#[derive(Debug, Serialize, ToSchema)]
pub struct EmbedResponse {
    pub vector: Vec<f32>,
}

/// 上传请求
#[derive(TryFromMultipart)]
pub struct UploadRequest {
    pub file: FieldData<Bytes>,
    pub media_id: String,
    pub album: String,
    /// 逗号分隔的标签
    pub tags: Option<String>,
}

/// 上传表单（用于API文档）
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct UploadForm {
    /// 媒体文件
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// 媒体的唯一标识
    pub media_id: String,
    /// 相册名
    pub album: String,
    /// 逗号分隔的标签
    pub tags: Option<String>,
}

/// 上传响应
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub status: String,
    /// 媒体文件的保存路径
    pub path: String,
}

/// 媒体元数据
#[derive(Debug, Deserialize, ToSchema)]
pub struct Metadata {
    pub album: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub path: Option<String>,
}

/// 添加预先计算好的向量
#[derive(Debug, Deserialize, ToSchema)]
pub struct IndexRequest {
    pub media_id: String,
    pub vector: Vec<f32>,
    pub metadata: Metadata,
}

/// 通用的状态响应
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

fn default_top_k() -> usize {
    10
}

/// 文本搜索请求
#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// 查询文本
    pub query: String,
    /// 只返回该相册中的媒体
    pub album: Option<String>,
    /// 返回的结果数量
    #[serde(default = "default_top_k")]
    #[schema(default = 10, minimum = 1)]
    pub top_k: usize,
}

/// 单条搜索结果
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResultItem {
    pub media_id: String,
    pub album: String,
    pub tags: Vec<String>,
    pub path: Option<String>,
    /// 平方欧氏距离，越小越相似
    pub score: f32,
}

impl From<SearchResult> for SearchResultItem {
    fn from(r: SearchResult) -> Self {
        Self { media_id: r.media_id, album: r.album, tags: r.tags, path: r.path, score: r.score }
    }
}

/// 搜索响应
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub results: Vec<SearchResultItem>,
}

/// 相册信息
#[derive(Debug, Serialize, ToSchema)]
pub struct AlbumItem {
    pub name: String,
    pub media_count: i64,
}

impl From<AlbumSummary> for AlbumItem {
    fn from(a: AlbumSummary) -> Self {
        Self { name: a.name, media_count: a.media_count }
    }
}

/// 服务信息
#[derive(Debug, Serialize, ToSchema)]
pub struct InfoResponse {
    pub version: String,
    /// 媒体记录总数
    pub total_media: i64,
    /// 索引中的向量总数，包含重复添加产生的旧向量
    pub indexed_vectors: usize,
    /// 索引维度，尚未添加任何向量时为空
    pub dimension: Option<usize>,
    pub albums: Vec<AlbumItem>,
}
