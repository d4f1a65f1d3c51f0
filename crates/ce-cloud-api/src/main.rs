//! Carbon emission estimate API server.
//!
//! Serves `POST /calculate_emission`: free-text fuel query in, kg CO2e out.

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use ce_cloud_api::config::ApiConfig;
use ce_cloud_api::routes;
use ce_cloud_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "ce-cloud-api starting");

    let config = ApiConfig::from_env();
    let state = AppState::from_config(&config).await?;
    tracing::info!(tier = state.pipeline.generator_tier(), "pipeline ready");

    let app = routes::build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
