use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::DataDir;
use crate::embedding::Embedder;
use crate::engine::SearchEngine;

/// 应用状态
pub struct AppState {
    /// 检索引擎，写入时独占，搜索时共享
    pub engine: RwLock<SearchEngine>,
    /// 向量化服务
    pub embedder: Arc<dyn Embedder>,
    /// 数据目录
    pub data_dir: DataDir,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(engine: SearchEngine, embedder: Arc<dyn Embedder>, data_dir: DataDir) -> Arc<Self> {
        Arc::new(AppState { engine: RwLock::new(engine), embedder, data_dir })
    }
}
