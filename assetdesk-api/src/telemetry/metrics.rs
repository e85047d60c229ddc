//! Prometheus Metrics Definitions
//!
//! Defines all assetdesk metrics with appropriate labels and types.
//! Exposes a /metrics endpoint for Prometheus scraping.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram, register_histogram_vec,
    CounterVec, Encoder, Gauge, Histogram, HistogramVec, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

/// HTTP request latency buckets (seconds)
/// Covers: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

/// Query resolution latency buckets (seconds)
const RESOLVER_LATENCY_BUCKETS: &[f64] =
    &[0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5];

/// Global metrics instance - initialized once at startup
pub static METRICS: Lazy<ApiResult<AssetdeskMetrics>> = Lazy::new(AssetdeskMetrics::new);

/// How a list-view search request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results were returned
    Ok,
    /// Invalid criteria, redirected back to the search form
    RedirectForm,
    /// Invalid criteria, redirected to the unfiltered list
    RedirectList,
}

impl SearchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOutcome::Ok => "ok",
            SearchOutcome::RedirectForm => "redirect_form",
            SearchOutcome::RedirectList => "redirect_list",
        }
    }
}

/// Container for all assetdesk metrics.
#[derive(Clone)]
pub struct AssetdeskMetrics {
    /// HTTP request counter - labels: method, path, status
    pub http_requests_total: CounterVec,

    /// HTTP request duration histogram - labels: method, path
    pub http_request_duration_seconds: HistogramVec,

    /// List-view searches - labels: outcome
    pub searches_total: CounterVec,

    /// Time spent in the query resolver
    pub resolver_duration_seconds: Histogram,

    /// Number of filters in the current catalog
    pub catalog_filters: Gauge,
}

impl AssetdeskMetrics {
    /// Create and register all metrics with Prometheus.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "assetdesk_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_requests_total: {}", e)))?,

            http_request_duration_seconds: register_histogram_vec!(
                "assetdesk_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register http_request_duration_seconds: {}", e)))?,

            searches_total: register_counter_vec!(
                "assetdesk_searches_total",
                "Total list-view searches by outcome",
                &["outcome"]
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register searches_total: {}", e)))?,

            resolver_duration_seconds: register_histogram!(
                "assetdesk_resolver_duration_seconds",
                "Query resolution duration in seconds",
                RESOLVER_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register resolver_duration_seconds: {}", e)))?,

            catalog_filters: register_gauge!(
                "assetdesk_catalog_filters",
                "Number of filters in the current catalog"
            )
            .map_err(|e| ApiError::internal_error(format!("Failed to register catalog_filters: {}", e)))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record how a list-view search ended.
    pub fn record_search(&self, outcome: SearchOutcome) {
        self.searches_total
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    pub fn record_resolver_duration(&self, duration_secs: f64) {
        self.resolver_duration_seconds.observe(duration_secs);
    }

    pub fn set_catalog_filters(&self, count: usize) {
        self.catalog_filters.set(count as f64);
    }
}

/// Run `f` against the global metrics, if they registered.
pub fn with_metrics(f: impl FnOnce(&AssetdeskMetrics)) {
    if let Ok(metrics) = METRICS.as_ref() {
        f(metrics);
    }
}

/// Handler for GET /metrics endpoint.
///
/// Returns Prometheus text format metrics.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
))]
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}
