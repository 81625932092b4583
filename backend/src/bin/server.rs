//! Astrocal HTTP Server Binary
//!
//! Loads the configuration and the ephemeris table, then serves the calendar
//! query API.
//!
//! # Usage
//!
//! ```bash
//! ASTROCAL_EPHEMERIS=data/ephemeris-2024.json \
//!   cargo run --bin astrocal-server
//! ```
//!
//! # Environment Variables
//!
//! - `ASTROCAL_CONFIG`: TOML config file (optional)
//! - `ASTROCAL_EPHEMERIS`: ephemeris table (required unless set in the config file)
//! - `HOST`, `PORT`: bind address (default: 0.0.0.0:8080)
//! - `ASTROCAL_UTC_OFFSET_MINUTES`: civil time zone of the calendar (default: 0)
//! - `RUST_LOG`: Log level (default: info)
//!
//! See [`astrocal::config::AppConfig::load`] for the full list.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use astrocal::config::AppConfig;
use astrocal::ephemeris::TabulatedEphemeris;
use astrocal::http::{create_router, AppState};
use astrocal::services::EventCalendar;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting astrocal HTTP server");

    let config = AppConfig::load().context("Failed to load configuration")?;
    let ephemeris_path = config
        .ephemeris_path
        .clone()
        .context("No ephemeris table configured (set ASTROCAL_EPHEMERIS)")?;

    let ephemeris = TabulatedEphemeris::from_path(&ephemeris_path)?;
    let (from, to) = ephemeris.coverage();
    info!(
        "Ephemeris loaded from {}: {} to {}",
        ephemeris_path.display(),
        from,
        to
    );

    let calendar = Arc::new(EventCalendar::new(Arc::new(ephemeris), config.scan.clone()));
    let state = AppState::new(calendar, config.observer);
    let app = create_router(state);

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address()))?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
