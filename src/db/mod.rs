use std::collections::HashSet;
use std::path::Path;

use log::info;
use sqlx::{SqlitePool, sqlite::*};

pub mod crud;
pub mod model;

pub use model::*;

use crate::error::{Error, Result};

pub type Database = SqlitePool;

pub async fn init_db(filename: impl AsRef<Path>) -> Result<Database> {
    let filename = filename.as_ref();
    info!("初始化数据库连接: {}", filename.display());

    // 每次写入都在返回前提交，FULL 模式保证提交后落盘
    let options = SqliteConnectOptions::new()
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full)
        .filename(filename)
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(options).await?;

    info!("检查数据库迁移");
    sqlx::migrate!().run(&pool).await?;

    Ok(pool)
}

/// 媒体元数据存储
#[derive(Clone)]
pub struct MetadataStore {
    db: Database,
}

impl MetadataStore {
    /// 打开数据库，不存在时自动创建
    pub async fn open(filename: impl AsRef<Path>) -> Result<Self> {
        let db = init_db(filename).await?;
        Ok(Self { db })
    }

    /// 添加或更新媒体记录，返回内部 ID
    ///
    /// media_id 已存在时更新相册、标签和路径，内部 ID 保持不变
    pub async fn upsert(
        &self,
        media_id: &str,
        album: &str,
        tags: &[String],
        path: Option<&str>,
    ) -> Result<i64> {
        let tags = serde_json::to_string(tags).map_err(|e| Error::Validation(e.to_string()))?;
        Ok(crud::upsert_media(&self.db, media_id, album, &tags, path).await?)
    }

    /// 根据内部 ID 获取媒体记录，不存在时返回 None
    pub async fn get(&self, id: i64) -> Result<Option<MediaRecord>> {
        let Some(row) = crud::get_media(&self.db, id).await? else {
            return Ok(None);
        };
        let record = MediaRecord::try_from(row)
            .map_err(|e| Error::Storage(sqlx::Error::Decode(Box::new(e))))?;
        Ok(Some(record))
    }

    /// 获取相册中所有媒体的内部 ID
    pub async fn list_ids_for_album(&self, album: &str) -> Result<HashSet<i64>> {
        let ids = crud::get_ids_by_album(&self.db, album).await?;
        Ok(ids.into_iter().collect())
    }

    /// 列出所有相册及其媒体数量
    pub async fn list_albums(&self) -> Result<Vec<AlbumSummary>> {
        Ok(crud::get_albums(&self.db).await?)
    }

    /// 媒体记录总数
    pub async fn count(&self) -> Result<i64> {
        Ok(crud::count_media(&self.db).await?)
    }

    /// 关闭数据库连接
    pub async fn close(&self) {
        self.db.close().await;
    }
}
