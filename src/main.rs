//! worldcat-holdings: enrich a spreadsheet of merged OCLC numbers with
//! WorldCat holding counts, writing CSV to stdout.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use worldcat_holdings::cli::{self, Args};
use worldcat_holdings::CatalogConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries the CSV; all logging goes to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = CatalogConfig::from_env()?;

    cli::run(args, config).await?;
    Ok(())
}
