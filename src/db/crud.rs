use sqlx::{Executor, Result, Sqlite};

use super::{AlbumSummary, MediaRow};

/// 添加媒体记录，media_id 已存在时原地更新，返回内部 ID
pub async fn upsert_media<'c, E>(
    executor: E,
    media_id: &str,
    album: &str,
    tags: &str,
    path: Option<&str>,
) -> Result<i64>
where
    E: Executor<'c, Database = Sqlite>,
{
    // NOTE: ON CONFLICT 分支不会修改 id，因此已有记录的内部 ID 保持不变
    sqlx::query_scalar(
        r#"
        INSERT INTO media (media_id, album, tags, path)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (media_id) DO UPDATE SET
            album = excluded.album,
            tags = excluded.tags,
            path = excluded.path
        RETURNING id
        "#,
    )
    .bind(media_id)
    .bind(album)
    .bind(tags)
    .bind(path)
    .fetch_one(executor)
    .await
}

/// 根据内部 ID 获取媒体记录
pub async fn get_media<'c, E>(executor: E, id: i64) -> Result<Option<MediaRow>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        r#"
        SELECT id, media_id, album, tags, path FROM media WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// 获取相册中所有媒体的内部 ID
pub async fn get_ids_by_album<'c, E>(executor: E, album: &str) -> Result<Vec<i64>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar(
        r#"
        SELECT id FROM media WHERE album = ?
        "#,
    )
    .bind(album)
    .fetch_all(executor)
    .await
}

/// 统计每个相册的媒体数量
pub async fn get_albums<'c, E>(executor: E) -> Result<Vec<AlbumSummary>>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_as(
        r#"
        SELECT album AS name, COUNT(*) AS media_count
        FROM media GROUP BY album ORDER BY album ASC
        "#,
    )
    .fetch_all(executor)
    .await
}

/// 查询媒体总数
pub async fn count_media<'c, E>(executor: E) -> Result<i64>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar(r#"SELECT COUNT(*) FROM media"#).fetch_one(executor).await
}
