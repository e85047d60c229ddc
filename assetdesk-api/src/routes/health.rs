//! Health Check Endpoint
//!
//! No authentication required for health endpoints.

use std::time::Instant;

use assetdesk_core::CatalogHandle;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    /// Filters in the current catalog, absent when the catalog is unreadable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health - Liveness and catalog availability
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Filter catalog unavailable", body = HealthResponse),
    ),
))]
pub async fn health(
    State(start_time): State<Instant>,
    State(catalog): State<CatalogHandle>,
) -> impl IntoResponse {
    let filters = catalog.snapshot().ok().map(|c| c.len());
    let (status_code, status) = match filters {
        Some(_) => (StatusCode::OK, HealthStatus::Healthy),
        None => (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Degraded),
    };

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: start_time.elapsed().as_secs(),
        filters,
    };
    (status_code, Json(response))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new().route("/", get(health))
}
