//! assetdesk API Server Entry Point
//!
//! Loads configuration and data files, then starts the Axum HTTP server.

use assetdesk_api::telemetry::{init_tracing, TelemetryConfig};
use assetdesk_api::{bootstrap, create_api_router, ApiConfig, ApiError, ApiResult};
use assetdesk_core::SearchDefaults;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::from_env();
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env()?;
    let state = bootstrap(&api_config, SearchDefaults::from_env()?).await?;
    let app = create_api_router(state, &api_config);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting assetdesk API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
