use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, build_router};
use otboard_core::constants::TIP_REFRESH_SECS;
use otboard_core::{CoreConfig, SharedRecordStore};
use otboard_tip::{TipConfig, TipService, spawn_refresher};

/// Main entry point for the OT board
///
/// Starts the REST server and the background task that refreshes the ticker tip every
/// 30 seconds. Staff desks and display screens both talk to the REST server.
///
/// # Environment Variables
/// - `OTBOARD_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `OTBOARD_DATA_DIR`: Directory holding the records slot (default: "ot_data")
/// - `OTBOARD_POLL_SECS`: Display poll interval in seconds (default: 10)
/// - `API_KEY`: Key for the tip text-generation service; without it the ticker shows the
///   fallback tip
/// - `OTBOARD_TIP_MODEL`: Tip model name (default: "gemini-3-flash-preview")
/// - `OTBOARD_TIP_BASE_URL`: Tip service base URL
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("otboard_run=info".parse()?)
                .add_directive("otboard_core=info".parse()?)
                .add_directive("otboard_tip=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr: SocketAddr = std::env::var("OTBOARD_REST_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".into())
        .parse()?;

    let cfg = Arc::new(CoreConfig::from_env_values(
        std::env::var("OTBOARD_DATA_DIR").ok(),
        std::env::var("OTBOARD_POLL_SECS").ok(),
    )?);
    let store = SharedRecordStore::open(&cfg)?;

    let tip_config = TipConfig::from_env_values(
        std::env::var("API_KEY").ok(),
        std::env::var("OTBOARD_TIP_MODEL").ok(),
        std::env::var("OTBOARD_TIP_BASE_URL").ok(),
    );
    if !tip_config.has_api_key() {
        tracing::warn!("API_KEY is not set; the ticker will show the fallback tip");
    }

    tracing::info!("++ Starting OT board REST on {}", rest_addr);
    tracing::info!("++ Records slot: {}", cfg.records_slot_path().display());

    let state = AppState::new(cfg, store);
    let tips = spawn_refresher(
        TipService::new(tip_config),
        state.tips.clone(),
        Duration::from_secs(TIP_REFRESH_SECS),
    );

    let listener = tokio::net::TcpListener::bind(rest_addr).await?;
    let served = axum::serve(listener, build_router(state)).await;

    tips.abort();
    served.map_err(anyhow::Error::from)
}
