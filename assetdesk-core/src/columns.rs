//! Result column selection

use crate::FilterCriterion;

/// Derive the result columns for a search.
///
/// Starts from `base` (deduplicated, first-seen order) and appends the key
/// of every criterion that does not imply its own value, i.e. any operator
/// other than `eq`, or an inverted `eq`. Keys already present are not
/// repeated.
pub fn select_columns<S: AsRef<str>>(base: &[S], criteria: &[FilterCriterion]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::with_capacity(base.len() + criteria.len());

    for column in base {
        push_unique(&mut columns, column.as_ref());
    }
    for criterion in criteria.iter().filter(|c| c.reveals_column()) {
        push_unique(&mut columns, &criterion.filter_key);
    }

    columns
}

fn push_unique(columns: &mut Vec<String>, column: &str) {
    if !columns.iter().any(|existing| existing == column) {
        columns.push(column.to_string());
    }
}
