mod cli;
mod platform;

use clap::Parser;
use log::LevelFilter;

use platform::logging::{self, LogDestination};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    let destination = if cli.verbose {
        LogDestination::Both
    } else {
        LogDestination::File
    };
    logging::initialize(destination, LevelFilter::Info);
    platform::app::run(cli).await
}
