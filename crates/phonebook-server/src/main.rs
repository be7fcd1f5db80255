//! Phonebook REST API server
//!
//! Usage:
//!   phonebook-server --port 5000
//!   phonebook-server --config phonebook.json --database phonebook.db

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use phonebook_core::{AppBuilder, StorageConfig};
use phonebook_server::{AppState, ServerConfig, build_router};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "phonebook-server", version, about = "Phonebook REST API server")]
struct Args {
    /// JSON config file; CLI flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Keep entries in memory only
    #[arg(long, conflicts_with = "database")]
    in_memory: bool,

    /// SQLite database path (selects the durable backend)
    #[arg(long)]
    database: Option<String>,

    /// Verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn into_config(self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)?,
            None => ServerConfig::default(),
        };
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.in_memory {
            config.storage.use_in_memory_database = true;
        }
        if let Some(database) = self.database {
            config.storage = StorageConfig::sqlite(database);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.into_config()?;
    info!("phonebook-server v{} starting...", env!("CARGO_PKG_VERSION"));

    let app = AppBuilder::new()
        .storage(config.storage.clone())
        .build()
        .context("failed to build application")?;
    let router = build_router(AppState::new(app.mediator), config.request_timeout());

    let addr = config.socket_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{addr}/api/PhoneBook");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("server stopped");
    Ok(())
}

fn init_tracing(verbosity: u8) {
    // RUST_LOG wins over -v
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            error!("failed to listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    }
}
