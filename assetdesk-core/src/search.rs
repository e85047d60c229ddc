//! Search request parsing
//!
//! Turns raw list-view request parameters into a [`SearchRequest`]. Two
//! criteria shapes are accepted:
//!
//! - singular: `filter`, `search`, `operator`, `invert`
//! - indexed: `filter1`, `search1`, `operator1`, `invert1`, `filter2`, ...
//!
//! The singular shape wins when `filter` is non-empty. Indexed parameters are
//! read from 1 upwards until the first absent or empty `filterN`.

use crate::{
    decode_field_name, select_columns, CriterionParams, FilterCatalog, FilterCriterion, JumpTarget, Operator,
    SearchDefaults, SearchError, SortDirection, ValidationError,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// RAW PARAMETERS
// ============================================================================

/// Raw request parameters in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParams {
    pairs: Vec<(String, String)>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// First value submitted for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First value for `key`, treating an empty string as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Presence flag: the key was submitted at all, with any value.
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ============================================================================
// PARSED REQUEST
// ============================================================================

/// A single submitted query, fully validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SearchRequest {
    /// Criteria, implicitly ANDed
    pub criteria: Vec<FilterCriterion>,
    /// Result columns after filter-driven additions, unique and ordered
    pub columns: Vec<String>,
    pub order: String,
    pub direction: SortDirection,
    /// Collapse duplicate entity rows produced by one-to-many matches
    pub distinct: bool,
    /// Submitted from the interactive search form
    pub custom_search: bool,
    pub jump_to: JumpTarget,
}

impl SearchRequest {
    /// Canonical query parameters reproducing this request, for pagination
    /// and sort links. Criteria are always emitted in indexed form.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (index, criterion) in self.criteria.iter().enumerate() {
            let n = index + 1;
            pairs.push((format!("filter{n}"), criterion.filter_key.clone()));
            pairs.push((format!("search{n}"), criterion.raw_value.clone()));
            pairs.push((format!("operator{n}"), criterion.operator.to_string()));
            if criterion.invert {
                pairs.push((format!("invert{n}"), "1".to_string()));
            }
        }
        pairs.push(("columns".to_string(), self.columns.join(",")));
        pairs.push(("order".to_string(), self.order.clone()));
        pairs.push(("direction".to_string(), self.direction.to_string()));
        pairs.push(("jumpto".to_string(), self.jump_to.to_string()));
        if self.distinct {
            pairs.push(("distinct".to_string(), String::new()));
        }
        pairs
    }
}

// ============================================================================
// PARSE MODES
// ============================================================================

/// How an invalid presentation field is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Reject with a validation error
    #[default]
    Strict,
    /// Fall back to the configured default
    BestEffort,
}

/// Per-field parse modes for the presentation parameters.
///
/// Criteria are always parsed strictly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub columns: ParseMode,
    pub order: ParseMode,
    pub jump_to: ParseMode,
}

impl ParseOptions {
    pub fn strict() -> Self {
        Self {
            columns: ParseMode::Strict,
            order: ParseMode::Strict,
            jump_to: ParseMode::Strict,
        }
    }

    pub fn best_effort() -> Self {
        Self {
            columns: ParseMode::BestEffort,
            order: ParseMode::BestEffort,
            jump_to: ParseMode::BestEffort,
        }
    }

    /// Modes for a list-view request. Search-form submissions validate
    /// columns and ordering strictly; an invalid `jumpto` always falls back.
    pub fn for_request(custom_search: bool) -> Self {
        let base = if custom_search {
            Self::strict()
        } else {
            Self::best_effort()
        };
        Self {
            jump_to: ParseMode::BestEffort,
            ..base
        }
    }
}

// ============================================================================
// PARSER
// ============================================================================

/// Parses raw parameters against a catalog snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SearchRequestParser<'a> {
    catalog: &'a FilterCatalog,
    defaults: &'a SearchDefaults,
}

impl<'a> SearchRequestParser<'a> {
    pub fn new(catalog: &'a FilterCatalog, defaults: &'a SearchDefaults) -> Self {
        Self { catalog, defaults }
    }

    /// Parse a full list-view request.
    pub fn parse(
        &self,
        params: &RequestParams,
        options: ParseOptions,
    ) -> Result<SearchRequest, SearchError> {
        let criteria = self.parse_criteria(params)?;
        let base_columns = self.parse_columns(params, options.columns)?;
        let order = self.parse_order(params, options.order)?;
        let direction = self.parse_direction(params, options.order)?;
        let jump_to = self.parse_jump_to(params, options.jump_to)?;

        Ok(SearchRequest {
            columns: select_columns(&base_columns, &criteria),
            criteria,
            order,
            direction,
            distinct: params.contains("distinct"),
            custom_search: params.contains("customSearch"),
            jump_to,
        })
    }

    /// Parse only the criteria. Any error aborts the whole list.
    pub fn parse_criteria(
        &self,
        params: &RequestParams,
    ) -> Result<Vec<FilterCriterion>, SearchError> {
        if let Some(filter) = params.get_non_empty("filter") {
            let criterion = self.parse_criterion(params, filter, "")?;
            return Ok(vec![criterion]);
        }

        let mut criteria = Vec::new();
        for index in 1.. {
            let suffix = index.to_string();
            let Some(filter) = params.get_non_empty(&format!("filter{suffix}")) else {
                break;
            };
            criteria.push(self.parse_criterion(params, filter, &suffix)?);
        }
        Ok(criteria)
    }

    fn parse_criterion(
        &self,
        params: &RequestParams,
        filter: &str,
        suffix: &str,
    ) -> Result<FilterCriterion, SearchError> {
        let filter_param = format!("filter{suffix}");
        let search_param = format!("search{suffix}");
        let operator_param = format!("operator{suffix}");
        let invert_param = format!("invert{suffix}");

        let operator = match params.get_non_empty(&operator_param) {
            None => Operator::default(),
            Some(raw) => raw.parse().map_err(|_| ValidationError::UnknownOperator {
                field: operator_param.clone(),
                value: raw.to_string(),
            })?,
        };
        let invert = parse_flag(params.get(&invert_param), &invert_param)?;
        let search = params.get(&search_param).unwrap_or("");

        FilterCriterion::build(
            self.catalog,
            &self.filter_key(filter),
            operator,
            search,
            invert,
            CriterionParams {
                filter: &filter_param,
                search: &search_param,
                operator: &operator_param,
            },
        )
    }

    /// A `filterN` value is either a catalog key or the form's encoded
    /// `field_id` for one. Raw keys win.
    fn filter_key<'f>(&self, filter: &'f str) -> std::borrow::Cow<'f, str> {
        if self.catalog.contains(filter) {
            return filter.into();
        }
        match decode_field_name(filter) {
            Ok(decoded) if self.catalog.contains(&decoded) => decoded.into(),
            _ => filter.into(),
        }
    }

    fn parse_columns(
        &self,
        params: &RequestParams,
        mode: ParseMode,
    ) -> Result<Vec<String>, SearchError> {
        let Some(raw) = params.get_non_empty("columns") else {
            return Ok(self.defaults.base_columns.clone());
        };

        let mut columns: Vec<String> = Vec::new();
        for column in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            if !self.catalog.contains(column) {
                match mode {
                    ParseMode::Strict => {
                        return Err(ValidationError::UnknownColumn {
                            field: "columns".to_string(),
                            column: column.to_string(),
                        }
                        .into())
                    }
                    ParseMode::BestEffort => continue,
                }
            }
            if !columns.iter().any(|c| c == column) {
                columns.push(column.to_string());
            }
        }

        if columns.is_empty() {
            return match mode {
                ParseMode::Strict => Err(ValidationError::InvalidValue {
                    field: "columns".to_string(),
                    value: raw.to_string(),
                    reason: "no columns selected".to_string(),
                }
                .into()),
                ParseMode::BestEffort => Ok(self.defaults.base_columns.clone()),
            };
        }
        Ok(columns)
    }

    fn parse_order(&self, params: &RequestParams, mode: ParseMode) -> Result<String, SearchError> {
        match params.get_non_empty("order") {
            None => Ok(self.defaults.order.clone()),
            Some(order) if self.catalog.contains(order) => Ok(order.to_string()),
            Some(order) => match mode {
                ParseMode::Strict => Err(ValidationError::UnknownColumn {
                    field: "order".to_string(),
                    column: order.to_string(),
                }
                .into()),
                ParseMode::BestEffort => Ok(self.defaults.order.clone()),
            },
        }
    }

    fn parse_direction(
        &self,
        params: &RequestParams,
        mode: ParseMode,
    ) -> Result<SortDirection, SearchError> {
        let Some(raw) = params.get_non_empty("direction") else {
            return Ok(self.defaults.direction);
        };
        match (raw.parse::<SortDirection>(), mode) {
            (Ok(direction), _) => Ok(direction),
            (Err(_), ParseMode::BestEffort) => Ok(self.defaults.direction),
            (Err(_), ParseMode::Strict) => Err(ValidationError::InvalidValue {
                field: "direction".to_string(),
                value: raw.to_string(),
                reason: "expected asc or desc".to_string(),
            }
            .into()),
        }
    }

    fn parse_jump_to(
        &self,
        params: &RequestParams,
        mode: ParseMode,
    ) -> Result<JumpTarget, SearchError> {
        let Some(raw) = params.get_non_empty("jumpto") else {
            return Ok(self.defaults.jump_to);
        };
        match (raw.parse::<JumpTarget>(), mode) {
            (Ok(target), _) => Ok(target),
            (Err(_), ParseMode::BestEffort) => Ok(self.defaults.jump_to),
            (Err(err), ParseMode::Strict) => Err(ValidationError::InvalidValue {
                field: "jumpto".to_string(),
                value: raw.to_string(),
                reason: err.to_string(),
            }
            .into()),
        }
    }
}

fn parse_flag(raw: Option<&str>, field: &str) -> Result<bool, ValidationError> {
    let Some(raw) = raw else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "" | "0" | "false" | "off" | "no" => Ok(false),
        _ => Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
            reason: "expected a boolean flag".to_string(),
        }),
    }
}
