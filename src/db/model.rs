use serde::Serialize;
use sqlx::FromRow;

/// 媒体记录在数据库中的原始形式
#[derive(FromRow)]
pub struct MediaRow {
    pub id: i64,
    pub media_id: String,
    pub album: String,
    /// JSON 序列化的标签列表
    pub tags: String,
    pub path: Option<String>,
}

/// 媒体记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaRecord {
    /// 内部 ID，同时也是向量索引中的 ID
    pub id: i64,
    /// 调用方提供的媒体 ID
    pub media_id: String,
    /// 所属相册
    pub album: String,
    /// 标签，保持插入顺序
    pub tags: Vec<String>,
    /// 媒体文件路径
    pub path: Option<String>,
}

impl TryFrom<MediaRow> for MediaRecord {
    type Error = serde_json::Error;

    fn try_from(row: MediaRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            media_id: row.media_id,
            album: row.album,
            tags: serde_json::from_str(&row.tags)?,
            path: row.path,
        })
    }
}

/// 相册统计
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct AlbumSummary {
    /// 相册名
    pub name: String,
    /// 相册中的媒体数量
    pub media_count: i64,
}
