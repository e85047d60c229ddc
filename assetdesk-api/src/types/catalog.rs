//! Catalog-related API types

use assetdesk_core::{encode_field_name, FilterDefinition, Operator, ValueType};
use serde::{Deserialize, Serialize};

/// One searchable filter as presented to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FilterField {
    /// Catalog key, as submitted in `filter`/`filterN`
    pub key: String,
    /// Display label
    pub label: String,
    pub value_type: ValueType,
    /// Operators valid for this filter's value type
    pub operators: Vec<Operator>,
    /// Field name safe for form element ids (URL-safe base64 of the key)
    pub field_id: String,
}

impl From<&FilterDefinition> for FilterField {
    fn from(definition: &FilterDefinition) -> Self {
        Self {
            key: definition.key.clone(),
            label: definition.label.clone(),
            value_type: definition.value_type,
            operators: definition.value_type.allowed_operators().to_vec(),
            field_id: encode_field_name(&definition.key),
        }
    }
}

/// Snapshot of the filter catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CatalogResponse {
    pub filters: Vec<FilterField>,
    pub total: usize,
}

impl FromIterator<FilterField> for CatalogResponse {
    fn from_iter<I: IntoIterator<Item = FilterField>>(iter: I) -> Self {
        let filters: Vec<FilterField> = iter.into_iter().collect();
        Self {
            total: filters.len(),
            filters,
        }
    }
}
