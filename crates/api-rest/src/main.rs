//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want the REST server (with
//! OpenAPI/Swagger UI). It serves the placeholder tip; the workspace's main `otboard-run` binary
//! also runs the tip refresher.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{build_router, AppState};
use otboard_core::{CoreConfig, SharedRecordStore};

/// Main entry point for the OT board REST API server
///
/// # Environment Variables
/// - `OTBOARD_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `OTBOARD_DATA_DIR`: Directory holding the records slot (default: "ot_data")
/// - `OTBOARD_POLL_SECS`: Display poll interval in seconds (default: 10)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid or the data directory cannot be created,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("OTBOARD_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(CoreConfig::from_env_values(
        std::env::var("OTBOARD_DATA_DIR").ok(),
        std::env::var("OTBOARD_POLL_SECS").ok(),
    )?);
    let store = SharedRecordStore::open(&cfg)?;

    tracing::info!("-- Starting OT board REST API on {}", addr);
    tracing::info!("-- Records slot: {}", cfg.records_slot_path().display());

    let app = build_router(AppState::new(cfg, store));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
