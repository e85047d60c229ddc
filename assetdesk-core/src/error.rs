//! Error types for assetdesk operations

use crate::{Operator, ValueType};
use thiserror::Error;

/// Validation errors raised while turning request input into typed values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {value:?} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown operator for {field}: {value:?}")]
    UnknownOperator { field: String, value: String },

    #[error("Operator {operator} is not allowed for {key} ({value_type})")]
    OperatorNotAllowed {
        field: String,
        key: String,
        operator: Operator,
        value_type: ValueType,
    },

    #[error("Unknown column in {field}: {column}")]
    UnknownColumn { field: String, column: String },

    #[error("Invalid encoded field name: {reason}")]
    InvalidEncoding { reason: String },
}

impl ValidationError {
    /// Request parameter the error belongs to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::InvalidValue { field, .. }
            | ValidationError::UnknownOperator { field, .. }
            | ValidationError::OperatorNotAllowed { field, .. }
            | ValidationError::UnknownColumn { field, .. } => Some(field),
            ValidationError::InvalidEncoding { .. } => None,
        }
    }
}

/// Errors produced while parsing a search request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("Unknown filter: {key}")]
    UnknownFilter {
        /// Request parameter that referenced the key (`filter`, `filter2`, ...).
        field: String,
        key: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl SearchError {
    /// Request parameter the error should be reported against.
    pub fn param(&self) -> Option<&str> {
        match self {
            SearchError::UnknownFilter { field, .. } => Some(field),
            SearchError::Validation(err) => err.field(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all assetdesk errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetdeskError {
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Query resolver failed: {reason}")]
    Resolver { reason: String },

    #[error("Filter catalog lock poisoned")]
    LockPoisoned,
}

impl From<ValidationError> for AssetdeskError {
    fn from(err: ValidationError) -> Self {
        AssetdeskError::Search(SearchError::Validation(err))
    }
}

/// Result type alias for assetdesk operations.
pub type AssetdeskResult<T> = Result<T, AssetdeskError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_filter_display() {
        let err = SearchError::UnknownFilter {
            field: "filter".to_string(),
            key: "DoesNotExist".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Unknown filter"));
        assert!(msg.contains("DoesNotExist"));
        assert_eq!(err.param(), Some("filter"));
    }

    #[test]
    fn test_operator_not_allowed_display() {
        let err = ValidationError::OperatorNotAllowed {
            field: "operator1".to_string(),
            key: "CpuType".to_string(),
            operator: Operator::Lt,
            value_type: ValueType::Text,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("lt"));
        assert!(msg.contains("CpuType"));
        assert!(msg.contains("text"));
        assert_eq!(err.field(), Some("operator1"));
    }

    #[test]
    fn test_validation_error_keeps_param_through_search_error() {
        let err = SearchError::from(ValidationError::InvalidValue {
            field: "search2".to_string(),
            value: "abc".to_string(),
            reason: "expected an integer".to_string(),
        });
        assert_eq!(err.param(), Some("search2"));
        assert!(format!("{}", err).contains("abc"));
    }

    #[test]
    fn test_encoding_error_has_no_field() {
        let err = ValidationError::InvalidEncoding {
            reason: "bad".to_string(),
        };
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "ASSETDESK_DEFAULT_ORDER".to_string(),
            value: "Bogus".to_string(),
            reason: "unknown filter key".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("ASSETDESK_DEFAULT_ORDER"));
        assert!(msg.contains("Bogus"));
        assert!(msg.contains("unknown filter key"));
    }

    #[test]
    fn test_assetdesk_error_from_variants() {
        let search = AssetdeskError::from(SearchError::UnknownFilter {
            field: "filter".to_string(),
            key: "x".to_string(),
        });
        assert!(matches!(search, AssetdeskError::Search(_)));

        let validation = AssetdeskError::from(ValidationError::InvalidEncoding {
            reason: "x".to_string(),
        });
        assert!(matches!(
            validation,
            AssetdeskError::Search(SearchError::Validation(_))
        ));

        let config = AssetdeskError::from(ConfigError::MissingRequired {
            field: "columns".to_string(),
        });
        assert!(matches!(config, AssetdeskError::Config(_)));
    }
}
