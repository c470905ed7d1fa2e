use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::cli::*;

static DATA_DIR: LazyLock<DataDir> = LazyLock::new(|| {
    let proj_dirs =
        ProjectDirs::from("", "mediasearch", "mediasearch").expect("failed to get project dir");
    DataDir { path: proj_dirs.data_dir().to_path_buf() }
});

fn default_data_dir() -> &'static str {
    DATA_DIR.path().to_str().unwrap_or("data")
}

#[derive(Parser, Debug, Clone)]
pub struct EmbeddingOptions {
    /// 向量化服务地址，需兼容 OpenAI Embeddings API
    #[arg(long, value_name = "URL", env = "EMBEDDING_URL", default_value = "https://api.openai.com/v1")]
    pub embedding_url: String,
    /// 文本向量化模型
    #[arg(long, value_name = "MODEL", env = "EMBEDDING_MODEL", default_value = "text-embedding-ada-002")]
    pub text_model: String,
    /// 图片向量化模型
    #[arg(long, value_name = "MODEL", env = "IMAGE_EMBEDDING_MODEL", default_value = "image-embedding-ada-002")]
    pub image_model: String,
    /// 向量化服务的 API key
    #[arg(long, value_name = "KEY", env = "OPENAI_API_KEY", hide_env_values = true, default_value_t = String::new())]
    pub api_key: String,
    /// 向量化请求超时时间，单位为秒
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub embedding_timeout: u64,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "mediasearch", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// 数据目录，保存元数据库、向量索引和上传的媒体文件
    #[arg(short, long, env = "DATA_DIR", default_value = default_data_dir())]
    pub data_dir: DataDir,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 添加媒体向量和元数据
    Add(AddCommand),
    /// 使用向量搜索媒体
    Search(SearchCommand),
    /// 列出所有相册
    Albums(AlbumsCommand),
    /// 启动 HTTP 服务
    Server(ServerCommand),
}

#[derive(Debug, Clone)]
pub struct DataDir {
    path: PathBuf,
}

impl DataDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// 返回元数据库文件的路径
    pub fn database(&self) -> PathBuf {
        self.path.join("metadata.db")
    }

    /// 返回向量索引文件的路径
    pub fn index(&self) -> PathBuf {
        self.path.join("vectors.index")
    }

    /// 返回上传媒体文件的保存目录
    pub fn media(&self) -> PathBuf {
        self.path.join("media")
    }
}

impl FromStr for DataDir {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

/// 解析逗号分隔的标签，去掉首尾空白并丢弃空标签
pub fn parse_tags(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|t| !t.is_empty()).map(String::from).collect()
}
