// docfile-core/src/cursor.rs
//! Deferred find.
//!
//! A [`FindCursor`] only records a filter, sort keys and a limit. The store is
//! read when [`FindCursor::to_list`] is called, and re-read on every call.

use crate::collection_core::CollectionCore;
use crate::document::Document;
use crate::error::Result;
use crate::find_options::{FindOptions, SortDirection};
use crate::query::Query;
use crate::storage::Storage;

pub struct FindCursor<S: Storage> {
    collection: CollectionCore<S>,
    query: Query,
    options: FindOptions,
}

impl<S: Storage> FindCursor<S> {
    pub(crate) fn new(collection: CollectionCore<S>, query: Query) -> Self {
        FindCursor {
            collection,
            query,
            options: FindOptions::new(),
        }
    }

    /// Sort by one field, replacing any sort set before.
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.options.sort = Some(vec![(field.into(), direction)]);
        self
    }

    /// Add a secondary sort key that breaks ties left by the earlier ones.
    pub fn then_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.options = self.options.sort_by(field, direction);
        self
    }

    /// Cap the number of results, applied after sorting. 0 means no cap.
    pub fn limit(mut self, limit: usize) -> Self {
        self.options.limit = Some(limit);
        self
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn options(&self) -> &FindOptions {
        &self.options
    }

    /// Run the query. A non-zero `limit_override` replaces the cursor's limit.
    pub fn to_list(&self, limit_override: Option<usize>) -> Result<Vec<Document>> {
        let mut options = self.options.clone();
        let requested = FindOptions::new().with_limit(limit_override.unwrap_or(0));
        if let Some(limit) = requested.effective_limit() {
            options.limit = Some(limit);
        }
        self.collection.find(&self.query, &options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseCore;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    fn seeded() -> DatabaseCore<MemoryStorage> {
        let db = DatabaseCore::in_memory(&["features"]).unwrap();
        let coll = db.collection("features").unwrap();
        for (id, order, active) in [("f3", 3, true), ("f1", 1, true), ("f2", 2, false), ("f4", 4, true)] {
            coll.insert_one(
                Document::from_value(json!({"_id": id, "order": order, "is_active": active})).unwrap(),
            )
            .unwrap();
        }
        db
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.id().unwrap()).collect()
    }

    #[test]
    fn test_cursor_sort_and_filter() {
        let db = seeded();
        let docs = db
            .find_cursor("features", Query::new().eq("is_active", true))
            .unwrap()
            .sort("order", SortDirection::Ascending)
            .to_list(None)
            .unwrap();
        assert_eq!(ids(&docs), vec!["f1", "f3", "f4"]);
    }

    #[test]
    fn test_resort_replaces_previous_sort() {
        let db = DatabaseCore::in_memory(&["content"]).unwrap();
        for (id, a, b) in [("x", 1, 2), ("y", 1, 1), ("z", 0, 3)] {
            db.insert_one("content", Document::from_value(json!({"_id": id, "a": a, "b": b})).unwrap())
                .unwrap();
        }

        let cursor = db
            .find_cursor("content", Query::new())
            .unwrap()
            .sort("a", SortDirection::Ascending)
            .sort("b", SortDirection::Ascending);
        assert_eq!(cursor.options().sort.as_ref().map(Vec::len), Some(1));
        assert_eq!(ids(&cursor.to_list(None).unwrap()), vec!["y", "x", "z"]);
    }

    #[test]
    fn test_then_sort_breaks_ties() {
        let db = DatabaseCore::in_memory(&["content"]).unwrap();
        for (id, a, b) in [("x", 1, 2), ("y", 1, 1), ("z", 0, 3)] {
            db.insert_one("content", Document::from_value(json!({"_id": id, "a": a, "b": b})).unwrap())
                .unwrap();
        }

        let docs = db
            .find_cursor("content", Query::new())
            .unwrap()
            .sort("a", SortDirection::Ascending)
            .then_sort("b", SortDirection::Ascending)
            .to_list(None)
            .unwrap();
        assert_eq!(ids(&docs), vec!["z", "y", "x"]);
    }

    #[test]
    fn test_cursor_limit_and_override() {
        let db = seeded();
        let cursor = db
            .find_cursor("features", Query::new())
            .unwrap()
            .sort("order", SortDirection::Descending)
            .limit(2);

        assert_eq!(ids(&cursor.to_list(None).unwrap()), vec!["f4", "f3"]);
        assert_eq!(ids(&cursor.to_list(Some(3)).unwrap()), vec!["f4", "f3", "f2"]);
        assert_eq!(ids(&cursor.to_list(Some(0)).unwrap()), vec!["f4", "f3"]);
    }

    #[test]
    fn test_cursor_rereads_on_each_materialization() {
        let db = seeded();
        let cursor = db.find_cursor("features", Query::new()).unwrap();
        assert_eq!(cursor.to_list(None).unwrap().len(), 4);

        db.insert_one("features", Document::from_value(json!({"_id": "f5"})).unwrap())
            .unwrap();
        assert_eq!(cursor.to_list(None).unwrap().len(), 5);
    }

    #[test]
    fn test_cursor_is_lazy() {
        let db = seeded();
        let cursor = db.find_cursor("features", Query::new()).unwrap();
        db.close();
        assert!(cursor.to_list(None).is_err());
    }
}
