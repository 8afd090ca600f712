use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auto_favicon::{
    config::FaviconConfig,
    dom::SnapshotDom,
    fetch::{FileImageFetcher, HttpImageFetcher, ImageFetcher},
    generator::FaviconGenerator,
    store::{FileStore, KeyValueStore},
};

#[derive(Parser)]
#[command(name = "auto-favicon")]
#[command(version = "0.1.0")]
#[command(about = "Generate a favicon from a captured page snapshot")]
#[command(long_about = None)]
struct Cli {
    /// Page snapshot JSON file
    snapshot: PathBuf,

    /// Configuration file path
    #[arg(short, long, default_value = "favicon.toml")]
    config: String,

    /// Write the PNG here instead of printing the data URI
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Resolve image URLs against this directory instead of HTTP
    #[arg(long, value_name = "DIR")]
    assets_dir: Option<PathBuf>,

    /// Cache file path (omit to disable caching persistence)
    #[arg(long, value_name = "FILE")]
    cache_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("auto_favicon={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting auto-favicon v{}", env!("CARGO_PKG_VERSION"));

    let config = FaviconConfig::load(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    let snapshot_json = std::fs::read_to_string(&cli.snapshot)
        .with_context(|| format!("reading snapshot {:?}", cli.snapshot))?;
    let dom = Arc::new(
        SnapshotDom::from_json(&snapshot_json)
            .with_context(|| format!("parsing snapshot {:?}", cli.snapshot))?,
    );

    let fetcher: Arc<dyn ImageFetcher> = match cli.assets_dir {
        Some(dir) => Arc::new(FileImageFetcher::new(dir)),
        None => Arc::new(HttpImageFetcher::new()),
    };

    let store: Option<Arc<dyn KeyValueStore>> = cli
        .cache_file
        .map(|path| Arc::new(FileStore::new(path)) as Arc<dyn KeyValueStore>);

    let generator = FaviconGenerator::new(config, dom, fetcher, store);

    match generator.init().await {
        Some(artifact) => {
            if let Some(output) = cli.output {
                std::fs::write(&output, artifact.png_bytes())
                    .with_context(|| format!("writing {:?}", output))?;
                info!("Wrote {}x{} icon to {:?}", artifact.size(), artifact.size(), output);
            } else {
                println!("{}", artifact.as_data_url());
            }
        }
        None => {
            info!("No favicon generated (existing icon respected or generation failed)");
        }
    }

    Ok(())
}
