//! Configuration types

use crate::{ConfigError, FilterCatalog, JumpTarget, SortDirection};
use serde::{Deserialize, Serialize};

/// Defaults applied to list views when the request does not say otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SearchDefaults {
    /// Columns shown before any filter-driven additions
    pub base_columns: Vec<String>,
    /// Sort column
    pub order: String,
    pub direction: SortDirection,
    /// Detail tab opened from a list row
    pub jump_to: JumpTarget,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            base_columns: vec![
                "Name".to_string(),
                "UserName".to_string(),
                "InventoryDate".to_string(),
            ],
            order: "InventoryDate".to_string(),
            direction: SortDirection::Desc,
            jump_to: JumpTarget::General,
        }
    }
}

impl SearchDefaults {
    /// Create from environment variables with fallback to defaults.
    ///
    /// Environment variables:
    /// - `ASSETDESK_DEFAULT_COLUMNS`: Comma-separated column keys (default: Name,UserName,InventoryDate)
    /// - `ASSETDESK_DEFAULT_ORDER`: Sort column (default: InventoryDate)
    /// - `ASSETDESK_DEFAULT_DIRECTION`: "asc" or "desc" (default: desc)
    /// - `ASSETDESK_DEFAULT_JUMPTO`: Detail tab (default: general)
    ///
    /// An unset or blank variable keeps the default; a direction or jump
    /// target that does not parse is a [`ConfigError::InvalidValue`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Same as [`SearchDefaults::from_env`], reading variables through `var`.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let set = |name: &str| {
            var(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let base_columns = set("ASSETDESK_DEFAULT_COLUMNS")
            .map(|s| {
                s.split(',')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|columns| !columns.is_empty())
            .unwrap_or(defaults.base_columns);

        let direction = match set("ASSETDESK_DEFAULT_DIRECTION") {
            Some(raw) => raw.parse::<SortDirection>().map_err(|e| {
                ConfigError::InvalidValue {
                    field: "ASSETDESK_DEFAULT_DIRECTION".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => defaults.direction,
        };

        let jump_to = match set("ASSETDESK_DEFAULT_JUMPTO") {
            Some(raw) => raw.parse::<JumpTarget>().map_err(|e| {
                ConfigError::InvalidValue {
                    field: "ASSETDESK_DEFAULT_JUMPTO".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => defaults.jump_to,
        };

        Ok(Self {
            base_columns,
            order: set("ASSETDESK_DEFAULT_ORDER").unwrap_or(defaults.order),
            direction,
            jump_to,
        })
    }

    /// Validate the defaults against a catalog.
    ///
    /// Validates:
    /// - base_columns is non-empty
    /// - every base column is a catalog key
    /// - order is a catalog key
    pub fn validate(&self, catalog: &FilterCatalog) -> Result<(), ConfigError> {
        if self.base_columns.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "base_columns".to_string(),
            });
        }

        if let Some(column) = self.base_columns.iter().find(|c| !catalog.contains(c)) {
            return Err(ConfigError::InvalidValue {
                field: "base_columns".to_string(),
                value: column.clone(),
                reason: "unknown filter key".to_string(),
            });
        }

        if !catalog.contains(&self.order) {
            return Err(ConfigError::InvalidValue {
                field: "order".to_string(),
                value: self.order.clone(),
                reason: "unknown filter key".to_string(),
            });
        }

        Ok(())
    }
}
