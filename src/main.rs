use clap::Parser;
use dwd_hexmap::cli::{run, Cli};
use dwd_hexmap::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
