//! tapcard server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), probes the
//! SQLite store exactly once to pick durable or fallback mode, and serves
//! the JSON API plus the public scan endpoint over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tapcard_api::{AppState, ServerConfig};
use tapcard_core::{registry::CardRegistry, scan::ScanLog};
use tapcard_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "tapcard NFC business-card server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration: built-in defaults, then file, then TAPCARD_* env.
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 5001)?
    .set_default("store_path", "tapcard.db")?
    .set_default("public_base_url", "http://localhost:5001")?
    .set_default("admin_email", "admin@tapcard.dev")?
    .set_default("admin_password", "change-me")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("TAPCARD"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Mode decision: open + initial load double as the availability probe.
  // Failure here is recovered locally, never surfaced to API callers.
  let registry = match SqliteStore::open(&server_cfg.store_path).await {
    Ok(store) => CardRegistry::open(store).await,
    Err(e) => {
      tracing::warn!(
        error = %e,
        path = %server_cfg.store_path.display(),
        "could not open durable store; falling back to seed data"
      );
      CardRegistry::fallback()
    }
  };
  tracing::info!(mode = %registry.mode(), "registry ready");

  let state = AppState {
    registry: Arc::new(registry),
    scans:    Arc::new(ScanLog::new()),
    config:   Arc::new(server_cfg.clone()),
  };

  let app = tapcard_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
