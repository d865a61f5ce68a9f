//! Agency Radar — Binary Entrypoint
//! Boots the Axum HTTP server, wiring the snapshot store, the scrape
//! runner, and the daily scheduler.
//!
//! See `README.md` for quickstart.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agency_radar::api::{self, AppState};
use agency_radar::metrics::Metrics;
use agency_radar::runner::Runner;
use agency_radar::scrape::{config::ScrapeConfig, scheduler, sources};
use agency_radar::store::SnapshotStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("agency_radar=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = ScrapeConfig::load()?;
    tracing::info!(?cfg, "starting agency-radar");

    let metrics = Metrics::init();

    let store = SnapshotStore::new(cfg.data_path.clone());
    let runner = Arc::new(Runner::new(
        store.clone(),
        sources::default_sources(),
        Duration::from_secs(cfg.per_source_timeout_secs),
    ));

    scheduler::spawn_daily(runner.clone(), cfg.daily_at);

    let state = AppState { runner, store };
    let app = api::router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
