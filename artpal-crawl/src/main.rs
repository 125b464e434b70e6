//! artpal-crawl - one crawl per invocation
//!
//! Visits a random page of the figurative art catalog, picks an artwork not
//! yet recorded, extracts its palette and inserts one row into `art`.

use anyhow::{Context, Result};
use artpal_common::config::{ConfigOverrides, CrawlConfig, DEFAULT_LOG_LEVEL, LOG_LEVEL_ENV};
use artpal_crawl::{logging, Crawler, RandomPicker};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::util::SubscriberInitExt;

/// Command-line arguments for artpal-crawl
#[derive(Parser, Debug)]
#[command(name = "artpal-crawl")]
#[command(about = "Record one random, previously unseen artwork and its colour palette")]
#[command(version)]
struct Args {
    /// Postgres connection string (falls back to POSTGRES_URL)
    #[arg(long)]
    postgres_url: Option<String>,

    /// Staging file for the downloaded image
    #[arg(long, value_name = "FILE")]
    download_path: Option<PathBuf>,

    /// Config file (default: <config dir>/artpal/config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,

    /// Seed for page and entry selection
    #[arg(long)]
    seed: Option<u64>,

    /// Run every stage except the insert
    #[arg(long)]
    dry_run: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Startup level until the config file has been read
    let startup_level = args
        .log_level
        .clone()
        .or_else(|| std::env::var(LOG_LEVEL_ENV).ok())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let (subscriber, filter_handle) = logging::subscriber(&startup_level, std::io::stdout);
    subscriber.init();

    let config = CrawlConfig::resolve(&ConfigOverrides {
        connection_string: args.postgres_url.clone(),
        download_path: args.download_path.clone(),
        log_level: args.log_level.clone(),
        config_file: args.config.clone(),
    })
    .context("Failed to resolve configuration")?;

    logging::apply_level(&filter_handle, &config.log_level)
        .context("Failed to apply log level")?;

    info!(
        "Starting artpal-crawl v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Download path: {}", config.download_path.display());

    let crawler = Crawler::from_config(&config)?.dry_run(args.dry_run);

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut picker = RandomPicker(rng);

    let report = match crawler.run(&mut picker).await {
        Ok(report) => report,
        Err(e) => {
            error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    info!(
        page = report.page,
        last_page = report.last_page,
        title = %report.record.title,
        artist = %report.record.artist,
        colors = report.record.palette.len(),
        "Crawl finished"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
