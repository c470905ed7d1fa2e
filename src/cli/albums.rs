use anyhow::Result;
use clap::Parser;

use crate::SearchEngine;
use crate::cli::SubCommandExtend;
use crate::config::Opts;

#[derive(Parser, Debug, Clone)]
pub struct AlbumsCommand {}

impl SubCommandExtend for AlbumsCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let engine = SearchEngine::open(&opts.data_dir).await?;
        for album in engine.albums().await? {
            println!("{}\t{}", album.media_count, album.name);
        }
        engine.close().await;
        Ok(())
    }
}
