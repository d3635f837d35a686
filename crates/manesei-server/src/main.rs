//! Manesei server
//!
//! Serves the note wiki over HTTP: browse notes as a tree, edit them, and
//! look at earlier revisions.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use manesei_core::{Config, FileStore};

mod app;
mod error;
mod handlers;
mod templates;

use app::{router, AppState};

/// Log filter used when MANESEI_LOG is unset
const DEFAULT_LOG_FILTER: &str = "manesei=info,manesei_core=info,tower_http=info";

#[derive(Parser)]
#[command(name = "manesei")]
#[command(about = "Manesei - a wiki of plain text notes")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/manesei/config.toml)
    #[arg(long, env = "MANESEI_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8000
    #[arg(long)]
    bind: Option<String>,

    /// Directory holding the note files
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    let store = FileStore::open(&config.data_dir)
        .with_context(|| format!("Couldn't init storage at {:?}", config.data_dir))?;

    let bind = config.bind.clone();
    let app = router(AppState::new(Arc::new(store), config));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to listen on {}", bind))?;
    info!("Listening on {}", bind);

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;
    Ok(())
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_env("MANESEI_LOG")
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}
