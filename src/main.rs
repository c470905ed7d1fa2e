use clap::Parser;

use mediasearch::Opts;
use mediasearch::cli::SubCommandExtend;
use mediasearch::config::SubCommand;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let opts = Opts::parse();

    match &opts.subcmd {
        SubCommand::Add(config) => config.run(&opts).await,
        SubCommand::Search(config) => config.run(&opts).await,
        SubCommand::Albums(config) => config.run(&opts).await,
        SubCommand::Server(config) => config.run(&opts).await,
    }
}
