//! Computer list and search form types

use assetdesk_core::{
    FilterCriterion, JumpTarget, ResultRow, SearchError, SearchRequest, SortDirection,
};
use serde::{Deserialize, Serialize};

use super::FilterField;

/// Result of a list-view search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComputerListResponse {
    pub rows: Vec<ResultRow>,
    /// Columns shown, base columns first, then filter-driven additions
    pub columns: Vec<String>,
    pub order: String,
    pub direction: SortDirection,
    pub criteria: Vec<FilterCriterion>,
    pub distinct: bool,
    pub jump_to: JumpTarget,
    pub total: usize,
    /// Canonical query string reproducing this list, for paging and sort links
    pub query: String,
}

impl ComputerListResponse {
    pub fn new(request: SearchRequest, rows: Vec<ResultRow>, query: String) -> Self {
        Self {
            total: rows.len(),
            rows,
            columns: request.columns,
            order: request.order,
            direction: request.direction,
            criteria: request.criteria,
            distinct: request.distinct,
            jump_to: request.jump_to,
            query,
        }
    }
}

/// One submitted request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct QueryParam {
    pub name: String,
    pub value: String,
}

impl From<(&str, &str)> for QueryParam {
    fn from((name, value): (&str, &str)) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Validation message attached to one request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldError {
    /// Offending parameter, e.g. `search2`
    pub field: String,
    pub message: String,
}

impl From<&SearchError> for FieldError {
    fn from(err: &SearchError) -> Self {
        Self {
            field: err.param().unwrap_or("query").to_string(),
            message: err.to_string(),
        }
    }
}

/// Model behind the interactive search form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SearchFormResponse {
    /// Every filter in the current catalog
    pub filters: Vec<FilterField>,
    /// Detail tabs selectable as jump target
    pub jump_targets: Vec<JumpTarget>,
    /// Parameters submitted with this request, in order
    pub params: Vec<QueryParam>,
    /// Field-level validation messages for the submitted parameters
    pub errors: Vec<FieldError>,
    /// The parsed request, when the submitted parameters are valid
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<SearchRequest>,
}
