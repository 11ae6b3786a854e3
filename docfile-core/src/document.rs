// docfile-core/src/document.rs
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Reserved identifier key.
pub const ID_FIELD: &str = "_id";
/// Stamped on insert when absent.
pub const CREATED_AT_FIELD: &str = "created_at";
/// Stamped on insert when absent, refreshed on every update.
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// One stored record: an ordered JSON object.
///
/// Field order survives decode/encode cycles, so fields the store knows
/// nothing about are written back exactly as they were read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from a JSON value. Fails unless the value is an object.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// The `_id` value, if present and a string.
    pub fn id(&self) -> Option<&str> {
        self.fields.get(ID_FIELD).and_then(Value::as_str)
    }

    /// The raw `_id` value, whatever its type.
    pub fn id_value(&self) -> Option<&Value> {
        self.fields.get(ID_FIELD)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Merge `patch` into this document. Named fields are overwritten or
    /// appended; every other field is left alone.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// Give the document a random string `_id` if it has none.
    pub(crate) fn ensure_id(&mut self) -> Value {
        if let Some(id) = self.fields.get(ID_FIELD) {
            return id.clone();
        }
        let id = Value::String(Uuid::new_v4().to_string());
        self.fields.insert(ID_FIELD.to_string(), id.clone());
        id
    }

    /// Stamp `created_at` and `updated_at` when either is missing.
    pub(crate) fn stamp_created(&mut self, now: &str) {
        if !self.fields.contains_key(CREATED_AT_FIELD) {
            self.fields
                .insert(CREATED_AT_FIELD.to_string(), Value::String(now.to_string()));
        }
        if !self.fields.contains_key(UPDATED_AT_FIELD) {
            self.fields
                .insert(UPDATED_AT_FIELD.to_string(), Value::String(now.to_string()));
        }
    }

    pub(crate) fn touch(&mut self, now: &str) {
        self.fields
            .insert(UPDATED_AT_FIELD.to_string(), Value::String(now.to_string()));
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Document { fields }
    }
}

impl TryFrom<Value> for Document {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> serde_json::Result<Self> {
        Document::from_value(value)
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        doc.into_value()
    }
}

/// Current UTC time, RFC 3339 with microseconds.
///
/// Fixed-width output keeps lexicographic order equal to chronological order,
/// which is what sorting on the timestamp fields relies on.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
