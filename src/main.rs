mod catalog;
mod config;
mod error;
mod extractor;
mod grouper;
mod metadata;
mod processor;
mod thumbnail;
mod walker;

use crate::config::AppConfig;
use crate::thumbnail::JpegThumbnailer;
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

/// Rebuilds the photo catalog: reads geotagged originals, writes thumbnails,
/// groups photos into trips and publishes the JSON catalog.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding `default`, `$RUN_MODE` and `local` config files
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    /// Directory of original images
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory thumbnails are written to
    #[arg(long)]
    thumbs: Option<PathBuf>,

    /// Catalog file to publish
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = AppConfig::load(&args.config_dir).context("loading configuration")?;
    if let Some(input) = args.input {
        config.originals_directory = input;
    }
    if let Some(thumbs) = args.thumbs {
        config.thumbnail_directory = thumbs;
    }
    if let Some(output) = args.output {
        config.output_path = output;
    }

    // Initialize env_logger based on config.log_level
    env_logger::Builder::new()
        .filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    info!("Starting photo-catalog");
    log::debug!("Effective configuration: {:?}", config);

    let thumbnailer = JpegThumbnailer::new(config.thumbnail_width, config.thumbnail_quality);
    let summary = processor::run(&config, &thumbnailer)
        .with_context(|| format!("building catalog {:?}", config.output_path))?;

    info!(
        "photo-catalog finished: {} discovered, {} written, {} without GPS, {} failed",
        summary.discovered, summary.written, summary.skipped_no_gps, summary.failed
    );

    Ok(())
}
