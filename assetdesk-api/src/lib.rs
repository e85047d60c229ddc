//! assetdesk API - REST Layer for Inventory Search
//!
//! Exposes the list-view search protocol, the search form model, dynamic
//! computer groups and the filter catalog over HTTP (Axum). Queries are
//! resolved through the [`assetdesk_core::QueryResolver`] held in
//! [`AppState`].

pub mod config;
pub mod error;
pub mod extractors;
pub mod macros;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use services::{GroupStore, SavedSearchEvaluator};
pub use state::{bootstrap, AppState};
pub use types::*;
