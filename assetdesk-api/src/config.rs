//! API Configuration Module
//!
//! Bind address, CORS, request limits and the data files loaded at startup.
//! Configuration is loaded from environment variables with sensible
//! defaults for development.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Server
    // ========================================================================
    /// Interface to bind.
    pub bind_host: String,

    /// Port to listen on.
    pub port: u16,

    /// Upper bound on requests processed concurrently.
    pub max_concurrent_requests: usize,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    // ========================================================================
    // Data
    // ========================================================================
    /// JSON file with user-defined fields and registry values.
    pub catalog_file: Option<PathBuf>,

    /// JSON file with inventory records served by the in-memory resolver.
    pub inventory_file: Option<PathBuf>,

    /// JSON file with groups to seed the group store with.
    pub groups_file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            max_concurrent_requests: 512,
            cors_origins: Vec::new(), // Empty = allow all
            cors_allow_credentials: false,
            cors_max_age_secs: 86400, // 24 hours
            catalog_file: None,
            inventory_file: None,
            groups_file: None,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `ASSETDESK_API_BIND`: Interface to bind (default: 0.0.0.0)
    /// - `PORT` or `ASSETDESK_API_PORT`: Port (default: 3000)
    /// - `ASSETDESK_MAX_CONCURRENT_REQUESTS`: Concurrency limit (default: 512)
    /// - `ASSETDESK_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `ASSETDESK_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `ASSETDESK_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `ASSETDESK_CATALOG_FILE`: Catalog extensions JSON file (optional)
    /// - `ASSETDESK_INVENTORY_FILE`: Inventory records JSON file (optional)
    /// - `ASSETDESK_GROUPS_FILE`: Groups JSON file (optional)
    ///
    /// Fails only when a port value is present but not a valid port.
    pub fn from_env() -> ApiResult<Self> {
        let defaults = Self::default();

        let bind_host = std::env::var("ASSETDESK_API_BIND")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.bind_host);

        let port = match std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("ASSETDESK_API_PORT").ok())
        {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", raw)))?,
            None => defaults.port,
        };

        let max_concurrent_requests = std::env::var("ASSETDESK_MAX_CONCURRENT_REQUESTS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_concurrent_requests);

        let cors_origins = std::env::var("ASSETDESK_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("ASSETDESK_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = std::env::var("ASSETDESK_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.cors_max_age_secs);

        let path_var = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
        };

        Ok(Self {
            bind_host,
            port,
            max_concurrent_requests,
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
            catalog_file: path_var("ASSETDESK_CATALOG_FILE"),
            inventory_file: path_var("ASSETDESK_INVENTORY_FILE"),
            groups_file: path_var("ASSETDESK_GROUPS_FILE"),
        })
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }
}
