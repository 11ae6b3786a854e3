// docfile-core/src/query.rs
//! Exact-match filters and merge updates.
//!
//! A query is a set of `field -> value` pairs. A document matches when every
//! field is present and equal by value; there are no range, membership or
//! dotted-path operators. `{}` matches everything.
//!
//! Numbers compare by numeric value, so a stored `1.0` equals a queried `1`.
//! Numbers never equal strings or booleans.

use serde_json::{Map, Number, Value};

use crate::document::Document;
use crate::error::{DocFileError, Result};

/// Reserved key marking the fields of an update to merge.
pub const SET_OPERATOR: &str = "$set";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    conditions: Map<String, Value>,
}

impl Query {
    /// The empty query, matching all documents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a filter from JSON. Only objects are accepted; `null` is
    /// read as the empty query.
    pub fn from_json(json: &Value) -> Result<Self> {
        match json {
            Value::Object(map) => Ok(Query {
                conditions: map.clone(),
            }),
            Value::Null => Ok(Query::new()),
            other => Err(DocFileError::InvalidQuery(format!(
                "filter must be an object, got {}",
                other
            ))),
        }
    }

    /// Builder form: require `field == value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, document: &Document) -> bool {
        matches(document, &self.conditions)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.conditions.clone())
    }
}

impl From<Map<String, Value>> for Query {
    fn from(conditions: Map<String, Value>) -> Self {
        Query { conditions }
    }
}

/// True iff every `(field, value)` of `query` is present in `document` with an
/// equal value.
pub fn matches(document: &Document, query: &Map<String, Value>) -> bool {
    query
        .iter()
        .all(|(field, expected)| {
            document
                .get(field)
                .is_some_and(|actual| values_equal(actual, expected))
        })
}

/// Structural equality where numbers compare by value at every depth.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(key, x)| ym.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Exact for integers, f64 otherwise.
fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// A partial, field-level update.
///
/// `{"$set": {...}}` merges the inner object and ignores other top-level keys.
/// Without the marker the whole mapping is merged. Either way fields not named
/// by the update keep their values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    fields: Map<String, Value>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &Value) -> Result<Self> {
        let map = json.as_object().ok_or_else(|| {
            DocFileError::InvalidUpdate(format!("update must be an object, got {}", json))
        })?;

        match map.get(SET_OPERATOR) {
            Some(Value::Object(inner)) => Ok(Update {
                fields: inner.clone(),
            }),
            Some(other) => Err(DocFileError::InvalidUpdate(format!(
                "{} must be an object, got {}",
                SET_OPERATOR, other
            ))),
            None => Ok(Update {
                fields: map.clone(),
            }),
        }
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub(crate) fn apply(&self, document: &mut Document) {
        document.merge(&self.fields);
    }
}

impl From<Map<String, Value>> for Update {
    fn from(fields: Map<String, Value>) -> Self {
        Update { fields }
    }
}
