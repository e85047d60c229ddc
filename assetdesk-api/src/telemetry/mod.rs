//! assetdesk Telemetry - Observability Infrastructure
//!
//! Structured logging and Prometheus metrics for the API layer.
//! Works standalone without external collectors.

pub mod metrics;
pub mod middleware;
pub mod tracer;

pub use metrics::{metrics_handler, AssetdeskMetrics, SearchOutcome, METRICS};
pub use middleware::observability_middleware;
pub use tracer::{init_tracing, LogFormat, TelemetryConfig};
