use anyhow::Result;
use calfeed::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
