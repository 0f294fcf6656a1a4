use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use unveil::cli::Cli;
use unveil::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let cli = Cli::parse();
    cli.run().await
}
