use anyhow::Result;
use clap::Parser;
use log::info;

use crate::SearchEngine;
use crate::cli::SubCommandExtend;
use crate::config::{Opts, parse_tags};

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// 媒体的唯一标识，已存在时更新元数据
    pub media_id: String,
    /// 逗号分隔的向量，例如 `1,0,0.5`
    #[arg(long, value_name = "VECTOR", value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub vector: Vec<f32>,
    /// 相册名
    #[arg(short, long)]
    pub album: String,
    /// 逗号分隔的标签
    #[arg(short, long, default_value = "")]
    pub tags: String,
    /// 媒体文件路径
    #[arg(short, long)]
    pub path: Option<String>,
}

impl SubCommandExtend for AddCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let mut engine = SearchEngine::open(&opts.data_dir).await?;
        let tags = parse_tags(&self.tags);
        let id = engine
            .add(&self.media_id, &self.vector, &self.album, &tags, self.path.as_deref())
            .await?;
        info!("添加成功: {} (id = {})", self.media_id, id);
        println!("{}\t{}", id, self.media_id);
        engine.close().await;
        Ok(())
    }
}
