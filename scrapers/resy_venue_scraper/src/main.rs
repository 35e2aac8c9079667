use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::{fs, path::PathBuf};
use tracing::info;

use resy_venue_scraper::{
    checkpoint::ScanCheckpoint, config::ScraperConfig, init_tracing, orchestrator,
};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Scrape U.S. venues and their ids from the Resy listing",
    long_about = None
)]
struct Cli {
    /// First listing index to scan
    #[arg(long)]
    start: Option<usize>,

    /// Listing index to stop before
    #[arg(long)]
    end: Option<usize>,

    /// Directory for the per-state workbooks and the checkpoint
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Ignore any saved checkpoint and start at the beginning of the window
    #[arg(long)]
    fresh: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = ScraperConfig::from_env();
    if let Some(start) = cli.start {
        config.window.start = start;
    }
    if let Some(end) = cli.end {
        config.window.end = end;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if cli.headed {
        config.browser.headless = false;
    }
    config.validate()?;

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {:?}", config.output_dir))?;
    if cli.fresh {
        ScanCheckpoint::clear(&config.checkpoint_path())?;
        info!("Discarded saved checkpoint");
    }

    let summary = orchestrator::run(&config).await.context("Scrape failed")?;
    summary.log();

    if summary.data_written() {
        info!("Data successfully written.");
    } else {
        info!("No data written during this session.");
    }
    Ok(())
}
