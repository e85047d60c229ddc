//! Typed filter values
//!
//! Raw request strings are converted into a [`TypedValue`] according to the
//! filter's [`ValueType`]. Conversion failures are validation errors, never
//! silent defaults.

use crate::{ValidationError, ValueType};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;

/// Wire format for dates (`yyyy-MM-dd`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern is a valid regex")
});

/// A filter value parsed according to its declared type.
///
/// Serialized as a bare JSON scalar. The variant cannot be recovered from
/// that form, so values are only built through [`TypedValue::parse`] and
/// [`TypedValue::from_json`] against a known [`ValueType`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum TypedValue {
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

impl TypedValue {
    /// Parse `raw` as a value of `value_type`.
    ///
    /// `field` names the request parameter for error reporting.
    pub fn parse(value_type: ValueType, raw: &str, field: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        match value_type {
            ValueType::Text => Ok(TypedValue::Text(raw.to_string())),
            ValueType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(TypedValue::Integer)
                .map_err(|_| invalid("expected an integer")),
            ValueType::Float => {
                let value = raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| invalid("expected a number"))?;
                if !value.is_finite() {
                    return Err(invalid("expected a finite number"));
                }
                Ok(TypedValue::Float(value))
            }
            ValueType::Date => {
                let trimmed = raw.trim();
                if !DATE_PATTERN.is_match(trimmed) {
                    return Err(invalid("expected a date in yyyy-MM-dd format"));
                }
                NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                    .map(TypedValue::Date)
                    .map_err(|_| invalid("not a valid calendar date"))
            }
        }
    }

    /// Convert a stored JSON scalar into a typed value.
    ///
    /// Numbers are accepted directly for ordinal types; strings go through
    /// [`TypedValue::parse`]. `null` yields `None`.
    pub fn from_json(
        value_type: ValueType,
        value: &serde_json::Value,
        field: &str,
    ) -> Result<Option<Self>, ValidationError> {
        use serde_json::Value;

        match (value_type, value) {
            (_, Value::Null) => Ok(None),
            (ValueType::Integer, Value::Number(n)) => n
                .as_i64()
                .map(|v| Some(TypedValue::Integer(v)))
                .ok_or_else(|| ValidationError::InvalidValue {
                    field: field.to_string(),
                    value: n.to_string(),
                    reason: "expected an integer".to_string(),
                }),
            (ValueType::Float, Value::Number(n)) => n
                .as_f64()
                .map(|v| Some(TypedValue::Float(v)))
                .ok_or_else(|| ValidationError::InvalidValue {
                    field: field.to_string(),
                    value: n.to_string(),
                    reason: "expected a number".to_string(),
                }),
            (ValueType::Text, Value::Number(n)) => Ok(Some(TypedValue::Text(n.to_string()))),
            (ValueType::Text, Value::Bool(b)) => Ok(Some(TypedValue::Text(b.to_string()))),
            (_, Value::String(s)) => TypedValue::parse(value_type, s, field).map(Some),
            (_, other) => Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: other.to_string(),
                reason: format!("expected a {} scalar", value_type),
            }),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            TypedValue::Text(_) => ValueType::Text,
            TypedValue::Integer(_) => ValueType::Integer,
            TypedValue::Float(_) => ValueType::Float,
            TypedValue::Date(_) => ValueType::Date,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TypedValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Compare two values of the same type. Values of different types are
    /// incomparable.
    pub fn compare(&self, other: &TypedValue) -> Option<Ordering> {
        match (self, other) {
            (TypedValue::Text(a), TypedValue::Text(b)) => Some(a.cmp(b)),
            (TypedValue::Integer(a), TypedValue::Integer(b)) => Some(a.cmp(b)),
            (TypedValue::Float(a), TypedValue::Float(b)) => Some(a.total_cmp(b)),
            (TypedValue::Date(a), TypedValue::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Case-insensitive substring match with `*` (any run) and `?` (one
/// character) wildcards.
pub fn like_matches(pattern: &str, candidate: &str) -> bool {
    // Substring semantics: `*pattern*` must match the whole candidate.
    let mut wrapped: Vec<char> = Vec::with_capacity(pattern.len() + 2);
    wrapped.push('*');
    wrapped.extend(pattern.to_lowercase().chars());
    wrapped.push('*');
    let candidate: Vec<char> = candidate.to_lowercase().chars().collect();

    wildcard_match(&wrapped, &candidate)
}

/// Full wildcard match in O(pattern × text).
///
/// Only the most recent `*` is ever retried: a later star can absorb
/// anything an earlier one could.
fn wildcard_match(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    // (position of the last `*`, text position it currently absorbs up to)
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p).copied() {
            Some('*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(c) if c == '?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                Some((star, absorbed)) => {
                    backtrack = Some((star, absorbed + 1));
                    p = star + 1;
                    t = absorbed + 1;
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}
