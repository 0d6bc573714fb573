//! Lexivault server
//!
//! Serves the vocabulary API over HTTP, backed by the dual-store word
//! repository from `lexivault-core`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lexivault_core::{Config, EmbeddedStore, PrimaryStore, WordRepository};
use lexivault_server::routes::{build_router, AppState};

#[derive(Parser)]
#[command(name = "lexivault")]
#[command(about = "Lexivault - vocabulary storage with primary/embedded fallback")]
#[command(version)]
struct Cli {
    /// Listen port (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Path to a config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    let port = cli.port.unwrap_or(config.port);

    let embedded = EmbeddedStore::open(&config).context("Failed to open embedded store")?;

    let primary = PrimaryStore::new(&config);
    if primary.connect().await {
        if let Err(e) = primary.ensure_collection().await {
            warn!("primary store initialization failed: {:#}", e);
        }
    } else {
        warn!(
            "primary store unavailable at startup ({}); serving from the embedded store",
            primary.redacted_target()
        );
    }

    let state = Arc::new(AppState {
        primary_target: primary.redacted_target().to_string(),
        repo: WordRepository::new(primary, embedded),
    });

    let app = build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
