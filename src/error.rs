use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 检索核心的错误类型
#[derive(Error, Debug)]
pub enum Error {
    /// 输入参数不合法，尚未触及任何存储
    #[error("参数错误: {0}")]
    Validation(String),
    /// 向量维度与索引不一致
    #[error("向量维度不匹配: 索引维度为 {expected}，输入维度为 {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// 元数据库读写失败
    #[error("数据库错误: {0}")]
    Storage(#[from] sqlx::Error),
    /// 向量索引读写失败，或索引文件损坏
    #[error("索引错误: {0}")]
    Index(String),
    /// 向量化服务调用失败
    #[error("向量化失败: {0}")]
    Embedding(String),
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Storage(err.into())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Self::Index(err.to_string())
    }
}
