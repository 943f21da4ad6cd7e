use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = sealvote_cli::cli::Cli::parse();
    cli.run().await
}
