//! Error Types for assetdesk API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use assetdesk_core::{AssetdeskError, ConfigError, SearchError, ValidationError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur during API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    /// Filter key is not in the catalog
    UnknownFilter,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested group does not exist
    GroupNotFound,

    // ========================================================================
    // Server Errors (500, 503)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// The query engine failed to resolve a search
    ResolverError,

    /// Service is temporarily unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::UnknownFilter => StatusCode::BAD_REQUEST,

            ErrorCode::GroupNotFound => StatusCode::NOT_FOUND,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::InternalError | ErrorCode::ResolverError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::UnknownFilter => "Unknown filter",
            ErrorCode::GroupNotFound => "Group not found",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ResolverError => "Search could not be resolved",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
///
/// This type is returned by all API endpoints when an error occurs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (offending request parameter, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    /// Create a ValidationFailed error.
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Create a GroupNotFound error.
    pub fn group_not_found(name: impl fmt::Display) -> Self {
        Self::new(ErrorCode::GroupNotFound, format!("Group {} not found", name))
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a ServiceUnavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

/// Implement IntoResponse for ApiError to enable automatic error handling in Axum.
///
/// ```ignore
/// async fn handler() -> Result<Json<Response>, ApiError> {
///     Err(ApiError::group_not_found("Servers"))
/// }
/// ```
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM DOMAIN ERRORS
// ============================================================================

/// Search errors carry the offending request parameter in `details.field`.
impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        let code = match err {
            SearchError::UnknownFilter { .. } => ErrorCode::UnknownFilter,
            SearchError::Validation(_) => ErrorCode::ValidationFailed,
        };
        let error = ApiError::new(code, err.to_string());
        match err.param() {
            Some(field) => error.with_details(serde_json::json!({ "field": field })),
            None => error,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        SearchError::Validation(err).into()
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::invalid_input(err.to_string())
    }
}

impl From<AssetdeskError> for ApiError {
    fn from(err: AssetdeskError) -> Self {
        match err {
            AssetdeskError::Search(err) => err.into(),
            AssetdeskError::Config(err) => err.into(),
            AssetdeskError::Resolver { reason } => {
                // Log the full reason, return a generic message
                tracing::error!(reason = %reason, "Query resolver failed");
                ApiError::from_code(ErrorCode::ResolverError)
            }
            AssetdeskError::LockPoisoned => {
                tracing::error!("Filter catalog lock poisoned");
                ApiError::service_unavailable("Filter catalog is unavailable")
            }
        }
    }
}

/// Convert from serde_json::Error to ApiError.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use assetdesk_core::{Operator, ValueType};

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::ValidationFailed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::UnknownFilter.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::GroupNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::ResolverError.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ErrorCode::ServiceUnavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_api_error_constructors() {
        let err = ApiError::group_not_found("Servers");
        assert_eq!(err.code, ErrorCode::GroupNotFound);
        assert!(err.message.contains("Servers"));

        let err = ApiError::missing_field("membership");
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(err.message.contains("membership"));
    }

    #[test]
    fn test_search_error_conversion_names_parameter() {
        let err: ApiError = SearchError::UnknownFilter {
            field: "filter2".to_string(),
            key: "DoesNotExist".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::UnknownFilter);
        assert_eq!(err.details, Some(serde_json::json!({ "field": "filter2" })));

        let err: ApiError = ValidationError::OperatorNotAllowed {
            field: "operator".to_string(),
            key: "Name".to_string(),
            operator: Operator::Lt,
            value_type: ValueType::Text,
        }
        .into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.details, Some(serde_json::json!({ "field": "operator" })));
    }

    #[test]
    fn test_resolver_error_hides_reason() {
        let err: ApiError = AssetdeskError::Resolver {
            reason: "connection reset by peer".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::ResolverError);
        assert!(!err.message.contains("connection reset"));
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::validation_failed("Invalid date");
        let json = serde_json::to_string(&err)?;

        assert!(json.contains("VALIDATION_FAILED"));
        assert!(json.contains("Invalid date"));
        assert!(!json.contains("details"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }
}
