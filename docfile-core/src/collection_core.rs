// docfile-core/src/collection_core.rs
// Per-collection operations over a whole-file storage backend.
//
// Every operation runs one cycle under the collection's lock:
//   lock → load all documents → match/sort/limit or mutate → (save) → unlock
// No state is cached between cycles; each call sees the stored ground truth.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cursor::FindCursor;
use crate::document::{timestamp_now, Document};
use crate::error::{DocFileError, Result};
use crate::find_options::{apply_limit, apply_sort, FindOptions};
use crate::lock::LockHandle;
use crate::query::{Query, Update};
use crate::storage::Storage;

/// Result of insert_one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertOneResult {
    pub inserted_id: Value,
}

/// Result of insert_many
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertManyResult {
    pub inserted_ids: Vec<Value>,
    pub inserted_count: usize,
}

/// Result of update_one. `modified_count` is 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    pub modified_count: u64,
}

/// Result of delete_one. `deleted_count` is 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// Handle to one named collection.
///
/// Handles are cheap to clone; all clones for a name share the same lock.
pub struct CollectionCore<S: Storage> {
    name: String,
    storage: Arc<S>,
    lock: LockHandle,
    open: Arc<AtomicBool>,
}

impl<S: Storage> Clone for CollectionCore<S> {
    fn clone(&self) -> Self {
        CollectionCore {
            name: self.name.clone(),
            storage: Arc::clone(&self.storage),
            lock: self.lock.clone(),
            open: Arc::clone(&self.open),
        }
    }
}

impl<S: Storage> CollectionCore<S> {
    pub(crate) fn new(
        name: String,
        storage: Arc<S>,
        lock: LockHandle,
        open: Arc<AtomicBool>,
    ) -> Self {
        CollectionCore {
            name,
            storage,
            lock,
            open,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ========== QUERY OPERATIONS ==========

    /// First document in stored order matching `query`.
    pub fn find_one(&self, query: &Query) -> Result<Option<Document>> {
        self.read(|docs| docs.into_iter().find(|doc| query.matches(doc)))
    }

    /// All matches, sorted and limited per `options`.
    pub fn find(&self, query: &Query, options: &FindOptions) -> Result<Vec<Document>> {
        debug!(collection = %self.name, query = %query.to_json(), ?options, "find");

        self.read(|docs| {
            let mut matched: Vec<Document> =
                docs.into_iter().filter(|doc| query.matches(doc)).collect();

            if let Some(ref sort) = options.sort {
                apply_sort(&mut matched, sort);
            }

            apply_limit(matched, options)
        })
    }

    /// Deferred query. Nothing is read until the cursor is materialized.
    pub fn find_cursor(&self, query: Query) -> FindCursor<S> {
        FindCursor::new(self.clone(), query)
    }

    pub fn count_documents(&self, query: &Query) -> Result<u64> {
        self.read(|docs| docs.iter().filter(|doc| query.matches(doc)).count() as u64)
    }

    // ========== CRUD OPERATIONS ==========

    /// Append one document. `_id` collisions are accepted.
    pub fn insert_one(&self, document: Document) -> Result<InsertOneResult> {
        let now = timestamp_now();
        self.modify(|docs| {
            let inserted_id = self.push_document(docs, document, &now);
            Ok((InsertOneResult { inserted_id }, true))
        })
    }

    /// Append several documents with a single rewrite.
    pub fn insert_many(&self, documents: Vec<Document>) -> Result<InsertManyResult> {
        if documents.is_empty() {
            self.ensure_open()?;
            return Ok(InsertManyResult {
                inserted_ids: Vec::new(),
                inserted_count: 0,
            });
        }

        let now = timestamp_now();
        self.modify(|docs| {
            let inserted_ids: Vec<Value> = documents
                .into_iter()
                .map(|document| self.push_document(docs, document, &now))
                .collect();
            let inserted_count = inserted_ids.len();
            Ok((
                InsertManyResult {
                    inserted_ids,
                    inserted_count,
                },
                true,
            ))
        })
    }

    /// Insert `documents` only when the collection holds no documents yet.
    /// Returns the number inserted.
    pub fn seed_if_empty(&self, documents: Vec<Document>) -> Result<usize> {
        let now = timestamp_now();
        self.modify(|docs| {
            if !docs.is_empty() || documents.is_empty() {
                return Ok((0, false));
            }
            let count = documents.len();
            for document in documents {
                self.push_document(docs, document, &now);
            }
            debug!(collection = %self.name, count, "seeded empty collection");
            Ok((count, true))
        })
    }

    /// Merge `update` into the first match and refresh `updated_at`.
    pub fn update_one(&self, query: &Query, update: &Update) -> Result<UpdateResult> {
        let now = timestamp_now();
        self.modify(|docs| {
            let Some(target) = docs.iter_mut().find(|doc| query.matches(doc)) else {
                return Ok((UpdateResult { modified_count: 0 }, false));
            };
            update.apply(target);
            target.touch(&now);
            Ok((UpdateResult { modified_count: 1 }, true))
        })
    }

    /// Remove the first match.
    pub fn delete_one(&self, query: &Query) -> Result<DeleteResult> {
        self.modify(|docs| {
            let Some(index) = docs.iter().position(|doc| query.matches(doc)) else {
                return Ok((DeleteResult { deleted_count: 0 }, false));
            };
            docs.remove(index);
            Ok((DeleteResult { deleted_count: 1 }, true))
        })
    }

    // ========== PRIVATE HELPERS ==========

    fn ensure_open(&self) -> Result<()> {
        if self.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(DocFileError::Closed)
        }
    }

    /// Load under the lock and hand the documents to `f`.
    fn read<T>(&self, f: impl FnOnce(Vec<Document>) -> T) -> Result<T> {
        let _guard = self.lock.lock();
        self.ensure_open()?;
        let docs = self.storage.load(&self.name)?;
        Ok(f(docs))
    }

    /// Load under the lock, let `f` mutate, and write back if `f` reports a
    /// change. The lock is held until the write has completed.
    fn modify<T>(&self, f: impl FnOnce(&mut Vec<Document>) -> Result<(T, bool)>) -> Result<T> {
        let _guard = self.lock.lock();
        self.ensure_open()?;
        let mut docs = self.storage.load(&self.name)?;
        let (result, changed) = f(&mut docs)?;
        if changed {
            self.storage.save(&self.name, &docs)?;
        }
        Ok(result)
    }

    fn push_document(&self, docs: &mut Vec<Document>, mut document: Document, now: &str) -> Value {
        let id = document.ensure_id();
        document.stamp_created(now);

        if docs.iter().any(|existing| existing.id_value() == Some(&id)) {
            warn!(collection = %self.name, id = %id, "inserting document with duplicate _id");
        }

        docs.push(document);
        id
    }
}
