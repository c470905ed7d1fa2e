use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use log::{debug, info};
use serde::Serialize;

use crate::config::DataDir;
use crate::db::{AlbumSummary, MetadataStore};
use crate::error::{Error, Result};
use crate::index::FlatIndex;
use crate::metrics;

/// 按相册过滤时，向索引请求 top_k 的多少倍结果
pub const OVERSAMPLE: usize = 5;

/// 一条搜索结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub media_id: String,
    pub album: String,
    pub tags: Vec<String>,
    pub path: Option<String>,
    /// 与查询向量的平方欧氏距离，越小越相似
    pub score: f32,
}

/// 媒体向量检索引擎
///
/// 元数据库和向量索引通过内部 ID 关联，两者之间没有外键约束，也没有跨存储的事务
pub struct SearchEngine {
    store: MetadataStore,
    /// 尚未添加过任何向量时为 None
    index: Option<FlatIndex>,
    index_file: PathBuf,
}

impl SearchEngine {
    /// 打开数据目录下的元数据库和向量索引
    pub async fn open(data_dir: &DataDir) -> Result<Self> {
        fs::create_dir_all(data_dir.path()).map_err(sqlx::Error::Io)?;

        let store = MetadataStore::open(data_dir.database()).await?;
        let index_file = data_dir.index();
        let index = FlatIndex::read_file(&index_file)?;
        match &index {
            Some(index) => info!(
                "加载向量索引: {} 条向量，维度 {}",
                index.ntotal(),
                index.dimension()
            ),
            None => info!("向量索引不存在，将在第一次添加时创建"),
        }

        Ok(Self { store, index, index_file })
    }

    /// 关闭数据库连接
    pub async fn close(self) {
        self.store.close().await;
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    /// 索引维度，索引尚未创建时返回 None
    pub fn dimension(&self) -> Option<usize> {
        self.index.as_ref().map(FlatIndex::dimension)
    }

    /// 索引中的向量总数，包含同一媒体重复添加产生的旧向量
    pub fn ntotal(&self) -> usize {
        self.index.as_ref().map_or(0, FlatIndex::ntotal)
    }

    /// 添加媒体向量和元数据，返回内部 ID
    ///
    /// 依次写入元数据库、向量索引，最后将整个索引写回磁盘。
    /// 重复添加同一个 media_id 时元数据会被原地更新，但索引中的旧向量不会被删除
    pub async fn add(
        &mut self,
        media_id: &str,
        vector: &[f32],
        album: &str,
        tags: &[String],
        path: Option<&str>,
    ) -> Result<i64> {
        // 在写入数据库之前检查，保证出错时两边都不被修改
        self.check_add(media_id, vector)?;

        let id = self.store.upsert(media_id, album, tags, path).await?;

        let index = self.index.get_or_insert_with(|| {
            info!("创建向量索引，维度 {}", vector.len());
            FlatIndex::new(vector.len())
        });
        index.add_with_id(id, vector)?;
        // NOTE: 此处写入失败时不会回滚，内存中的状态会领先于磁盘，直到下一次写入成功
        index.write_file(&self.index_file)?;

        debug!("添加媒体 {} (id = {})，索引共 {} 条向量", media_id, id, index.ntotal());
        metrics::inc_add_count();
        Ok(id)
    }

    /// 检查 media_id 和向量能否被添加，不修改任何状态
    pub fn check_add(&self, media_id: &str, vector: &[f32]) -> Result<()> {
        if media_id.is_empty() {
            return Err(Error::Validation("media_id 不能为空".into()));
        }
        check_vector(vector)?;
        if let Some(index) = &self.index {
            index.check_dimension(vector)?;
        }
        Ok(())
    }

    /// 搜索与查询向量最接近的 top_k 个媒体，可以按相册过滤
    ///
    /// 按相册过滤时只会扫描前 top_k * OVERSAMPLE 个近邻，
    /// 相册成员在全局近邻中较稀疏时，返回的结果可能少于 top_k
    pub async fn search(
        &self,
        query: &[f32],
        top_k: usize,
        album: Option<&str>,
    ) -> Result<Vec<SearchResult>> {
        if top_k == 0 {
            return Err(Error::Validation("top_k 必须大于 0".into()));
        }
        check_vector(query)?;

        let index = match &self.index {
            Some(index) if !index.is_empty() => index,
            _ => return Ok(vec![]),
        };

        let start = Instant::now();

        let (allowed, k) = match album {
            Some(album) => {
                let allowed = self.store.list_ids_for_album(album).await?;
                (Some(allowed), index.ntotal().min(top_k.saturating_mul(OVERSAMPLE)))
            }
            None => (None, index.ntotal().min(top_k)),
        };
        debug!("向索引请求 {} 个近邻", k);

        let neighbors = index.search(query, k)?;

        let mut results = Vec::with_capacity(k.min(top_k));
        for neighbor in neighbors {
            if neighbor.id < 0 {
                continue;
            }
            if let Some(allowed) = &allowed {
                if !allowed.contains(&neighbor.id) {
                    continue;
                }
            }
            // 索引中存在但数据库中不存在的 ID 直接跳过
            let Some(record) = self.store.get(neighbor.id).await? else {
                debug!("跳过不存在的媒体: {}", neighbor.id);
                continue;
            };
            results.push(SearchResult {
                media_id: record.media_id,
                album: record.album,
                tags: record.tags,
                path: record.path,
                score: neighbor.distance,
            });
            if results.len() >= top_k {
                break;
            }
        }

        let elapsed = start.elapsed().as_secs_f32();
        debug!("搜索耗时: {:.2}ms，返回 {} 条结果", elapsed * 1000., results.len());
        metrics::inc_search(album.is_some(), elapsed, results.len());

        Ok(results)
    }

    /// 列出所有相册及其媒体数量
    pub async fn albums(&self) -> Result<Vec<AlbumSummary>> {
        self.store.list_albums().await
    }
}

/// 检查向量非空且每个分量都是有限值
fn check_vector(vector: &[f32]) -> Result<()> {
    if vector.is_empty() {
        return Err(Error::Validation("向量不能为空".into()));
    }
    if vector.iter().any(|x| !x.is_finite()) {
        return Err(Error::Validation("向量中包含 NaN 或无穷大".into()));
    }
    Ok(())
}
