//! adstats server - ad-hoc reporting over an advertising dataset

use adstats::executor::MemoryBackend;
use adstats::loader::load_sample_data;
use adstats::network::server::Server;
use adstats::service::AdsService;
use adstats::storage::AdStore;
use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use std::path::PathBuf;
use std::sync::Arc;

/// adstats server - query advertising statistics over HTTP
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Host to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// CSV file loaded at startup when the dataset is empty
    #[arg(short, long, default_value = "data/ads.csv")]
    init_file: PathBuf,

    /// Directory for the dataset snapshot; in-memory only when omitted
    #[arg(short = 'D', long)]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Maximum concurrent connections
    #[arg(short = 'c', long, default_value = "100")]
    max_connections: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let store = match &args.data_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).context("Failed to create data directory")?;
            AdStore::open(&dir.join("ads.snapshot")).context("Failed to open dataset snapshot")?
        }
        None => AdStore::new(),
    };

    if store.is_empty() && !args.init_file.exists() {
        log::warn!(
            "Sample data file {} not found, starting with an empty dataset",
            args.init_file.display()
        );
    } else if load_sample_data(&store, &args.init_file)? > 0 {
        store.save().context("Failed to save dataset snapshot")?;
    }
    log::info!("Dataset holds {} records", store.len());

    let backend = MemoryBackend::new(Arc::new(store));
    let server = Server::new(Arc::new(AdsService::new(backend)), args.max_connections);

    let addr = Some(std::net::SocketAddr::from((
        args.host
            .parse::<std::net::IpAddr>()
            .context("Invalid host address")?,
        args.port,
    )));
    log::info!(
        "Serving GET /api/v1/ads (max {} connections)",
        args.max_connections
    );

    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run(addr).await {
            log::error!("Server error: {}", e);
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    log::info!("Shutting down server...");
    server_handle.abort();

    Ok(())
}
