use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::cli::SubCommandExtend;
use crate::config::Opts;
use crate::engine::{SearchEngine, SearchResult};

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    /// 逗号分隔的查询向量
    #[arg(long, value_name = "VECTOR", value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub vector: Vec<f32>,
    /// 返回的结果数量
    #[arg(short = 'k', long, value_name = "K", default_value_t = 10)]
    pub top_k: usize,
    /// 只搜索该相册中的媒体
    #[arg(short, long)]
    pub album: Option<String>,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for SearchCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let engine = SearchEngine::open(&opts.data_dir).await?;
        let album = self.album.as_deref().filter(|a| !a.is_empty());
        let result = engine.search(&self.vector, self.top_k, album).await?;
        engine.close().await;
        print_result(&result, self)
    }
}

fn print_result(result: &[SearchResult], opts: &SearchCommand) -> Result<()> {
    match opts.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?)
        }
        OutputFormat::Table => {
            for r in result {
                println!(
                    "{:.4}\t{}\t{}\t{}\t{}",
                    r.score,
                    r.media_id,
                    r.album,
                    r.tags.join(","),
                    r.path.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Table,
}
