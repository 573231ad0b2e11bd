mod api;
mod cli;
mod config;
mod curate;
mod error;
mod ignore;
mod membership;
mod reconcile;
mod report;
mod run;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run::run(cli).await
}
