use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use resy_venue_scraper::{combine::combine_directory, init_tracing};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Merge per-state venue workbooks into one CSV",
    long_about = None
)]
struct Cli {
    /// Directory holding the <STATE>.xlsx workbooks
    #[arg(short, long, default_value = ".")]
    input_dir: PathBuf,

    /// CSV file to write
    #[arg(short, long, default_value = "combined_data.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files ({eta})")?,
    );

    let rows = combine_directory(&cli.input_dir, &cli.output, &pb)
        .with_context(|| format!("Failed to combine workbooks in {:?}", cli.input_dir))?;
    println!("Wrote {} rows to {}", rows, cli.output.display());
    Ok(())
}
