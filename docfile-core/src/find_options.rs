// docfile-core/src/find_options.rs
// Find query options: sort and limit

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::document::Document;

/// Sort direction. Serialized as `1` / `-1` in configuration and CLI input,
/// like the usual document-database convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl From<i32> for SortDirection {
    /// Negative numbers sort descending, everything else ascending.
    fn from(value: i32) -> Self {
        if value < 0 {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }
}

impl From<SortDirection> for i32 {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

/// Options for find queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Sort: [(field, direction)], compared key by key
    pub sort: Option<Vec<(String, SortDirection)>>,

    /// Limit: maximum number of documents to return, applied after sort.
    /// `Some(0)` is the same as no limit.
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sort(mut self, sort: Vec<(String, SortDirection)>) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Append one more sort key after the existing ones.
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort
            .get_or_insert_with(Vec::new)
            .push((field.into(), direction));
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Limit actually in force, with zero meaning unlimited.
    pub fn effective_limit(&self) -> Option<usize> {
        self.limit.filter(|&n| n > 0)
    }
}

/// Stable multi-key sort. Documents tied on every key keep their relative order.
pub fn apply_sort(docs: &mut [Document], sort: &[(String, SortDirection)]) {
    if sort.is_empty() {
        return;
    }

    docs.sort_by(|a, b| {
        for (field, direction) in sort {
            let cmp = compare_values(a.get(field), b.get(field));

            if cmp != Ordering::Equal {
                return match direction {
                    SortDirection::Ascending => cmp,
                    SortDirection::Descending => cmp.reverse(),
                };
            }
        }
        Ordering::Equal
    });
}

/// Truncate to the limit in force for `options`.
pub fn apply_limit(mut docs: Vec<Document>, options: &FindOptions) -> Vec<Document> {
    if let Some(n) = options.effective_limit() {
        docs.truncate(n);
    }
    docs
}

/// Compare two sort keys. A missing field sorts as the empty string.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(n1)), Some(Value::Number(n2))) => {
            let f1 = n1.as_f64().unwrap_or(0.0);
            let f2 = n2.as_f64().unwrap_or(0.0);
            f1.partial_cmp(&f2).unwrap_or(Ordering::Equal)
        }

        (Some(Value::String(s1)), Some(Value::String(s2))) => s1.cmp(s2),

        (Some(Value::Bool(b1)), Some(Value::Bool(b2))) => b1.cmp(b2),

        _ => type_priority(a).cmp(&type_priority(b)),
    }
}

/// Rank for mixed-type keys:
/// empty < null < number < string < bool < object < array
fn type_priority(val: Option<&Value>) -> u8 {
    match val {
        None => 0,
        Some(Value::String(s)) if s.is_empty() => 0,
        Some(Value::Null) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Bool(_)) => 4,
        Some(Value::Object(_)) => 5,
        Some(Value::Array(_)) => 6,
    }
}
