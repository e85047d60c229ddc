//! Filter criteria for computer searches
//!
//! A [`FilterCriterion`] is one filter key plus operator, typed value and
//! invert flag. Criteria are built per request by the search parser and
//! never persisted.

use crate::value::like_matches;
use crate::{FilterCatalog, Operator, SearchError, TypedValue, ValidationError};
use serde::Serialize;
use std::cmp::Ordering;

/// One search condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FilterCriterion {
    /// Catalog key being filtered on
    pub filter_key: String,
    /// Operator to apply
    pub operator: Operator,
    /// Value as submitted
    pub raw_value: String,
    /// Value parsed according to the filter's value type
    pub typed_value: TypedValue,
    /// Negate the whole predicate
    pub invert: bool,
}

/// Request parameter names a criterion was read from, used for error
/// reporting (`filter`/`search`/`operator` or `filter2`/`search2`/...).
#[derive(Debug, Clone, Copy)]
pub struct CriterionParams<'a> {
    pub filter: &'a str,
    pub search: &'a str,
    pub operator: &'a str,
}

impl Default for CriterionParams<'_> {
    fn default() -> Self {
        Self {
            filter: "filter",
            search: "search",
            operator: "operator",
        }
    }
}

impl FilterCriterion {
    /// Build a criterion, validating the key, operator and value against the
    /// catalog.
    pub fn build(
        catalog: &FilterCatalog,
        filter_key: &str,
        operator: Operator,
        raw_value: &str,
        invert: bool,
        params: CriterionParams<'_>,
    ) -> Result<Self, SearchError> {
        let definition = catalog
            .lookup(filter_key)
            .map_err(|_| SearchError::UnknownFilter {
                field: params.filter.to_string(),
                key: filter_key.to_string(),
            })?;

        if !operator.is_allowed_for(definition.value_type) {
            return Err(ValidationError::OperatorNotAllowed {
                field: params.operator.to_string(),
                key: filter_key.to_string(),
                operator,
                value_type: definition.value_type,
            }
            .into());
        }

        let typed_value = TypedValue::parse(definition.value_type, raw_value, params.search)?;

        Ok(Self {
            filter_key: filter_key.to_string(),
            operator,
            raw_value: raw_value.to_string(),
            typed_value,
            invert,
        })
    }

    /// Does `candidate` satisfy the operator, before inversion?
    pub fn operator_matches(&self, candidate: &TypedValue) -> bool {
        if self.operator == Operator::Like {
            return match (self.typed_value.as_text(), candidate.as_text()) {
                (Some(pattern), Some(text)) => like_matches(pattern, text),
                _ => false,
            };
        }

        let Some(ordering) = candidate.compare(&self.typed_value) else {
            return false;
        };
        match self.operator {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ne => ordering != Ordering::Equal,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Le => ordering != Ordering::Greater,
            Operator::Ge => ordering != Ordering::Less,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Like => false,
        }
    }

    /// Full predicate for a single-valued attribute, including inversion.
    pub fn matches(&self, candidate: &TypedValue) -> bool {
        self.operator_matches(candidate) != self.invert
    }

    /// Should the filtered column be shown in the result list?
    ///
    /// Plain equality implies the value; anything else does not.
    pub fn reveals_column(&self) -> bool {
        self.operator != Operator::Eq || self.invert
    }
}
