mod config;
mod error;
mod extract;
mod models;
mod output;
mod pipeline;
mod scrapers;
mod upload;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{RemoteConfig, ScrapeArgs, ScrapeConfig, UploadArgs, UploadConfig};
use pipeline::RunOrchestrator;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use upload::{HttpImageSource, Uploader, WordPressClient};

#[derive(Parser, Debug)]
#[command(
    name = "property-scout",
    about = "Scrape UK property listings and publish them to a content site"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl agent sites and write the CSV partitions
    Scrape(ScrapeArgs),
    /// Publish one CSV partition to the remote site
    Upload(UploadArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Scrape(args) => scrape(ScrapeConfig::from(&args)).await,
        Command::Upload(args) => upload(UploadConfig::from(&args)).await,
    }
}

async fn scrape(config: ScrapeConfig) -> Result<()> {
    info!("🏠 Property Scout - UK listings scraper");
    info!("==========================================");
    info!(
        "Sites: {} | site concurrency: {} | detail limit: {} | images: {}",
        config.sites.len(),
        config.site_concurrency,
        config.detail_fetch_limit,
        config.max_images
    );

    let output_dir = config.output_dir.clone();
    let orchestrator = RunOrchestrator::new(config)?;
    let report = orchestrator.run().await;

    output::log_summary(&report);
    output::write_partitions(&output_dir, &report.records)?;

    Ok(())
}

async fn upload(config: UploadConfig) -> Result<()> {
    info!("🚀 Property Scout - uploader ({:?} endpoint)", config.shape);
    info!("==========================================");

    let remote = RemoteConfig::from_env()?;
    let api = Arc::new(WordPressClient::new(remote)?);
    let images = Arc::new(HttpImageSource::new()?);

    Uploader::new(api, images, config).run().await?;
    info!("🏁 Upload complete!");

    Ok(())
}
