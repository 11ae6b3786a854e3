// docfile-core/src/database.rs
// The store object: registered collections, one storage backend, one lock
// registry. Created at startup, closed at shutdown, passed around explicitly.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::collection_core::{
    CollectionCore, DeleteResult, InsertManyResult, InsertOneResult, UpdateResult,
};
use crate::config::{validate_collection_name, DatabaseConfig};
use crate::cursor::FindCursor;
use crate::document::Document;
use crate::error::{DocFileError, Result};
use crate::find_options::FindOptions;
use crate::lock::LockRegistry;
use crate::query::{Query, Update};
use crate::storage::{FileStorage, MemoryStorage, Storage};

/// Embedded document database over a [`Storage`] backend.
///
/// - `DatabaseCore<FileStorage>` - one JSON file per collection (production)
/// - `DatabaseCore<MemoryStorage>` - in-memory, for tests
///
/// Clones share the backend, the locks and the open/closed state.
pub struct DatabaseCore<S: Storage> {
    storage: Arc<S>,
    locks: LockRegistry,
    collections: Arc<BTreeSet<String>>,
    open: Arc<AtomicBool>,
}

impl<S: Storage> Clone for DatabaseCore<S> {
    fn clone(&self) -> Self {
        DatabaseCore {
            storage: Arc::clone(&self.storage),
            locks: self.locks.clone(),
            collections: Arc::clone(&self.collections),
            open: Arc::clone(&self.open),
        }
    }
}

// ============================================================================
// FILE STORAGE
// ============================================================================

impl DatabaseCore<FileStorage> {
    /// Open the data directory described by `config`.
    ///
    /// The directory is created if needed and, unless disabled, an empty
    /// collection file is written for every registered name that has none.
    /// Existing files are left untouched.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        config.validate()?;
        let storage = FileStorage::open(&config.data_dir, config.durability)?;
        let db = Self::with_storage(
            storage,
            config.collections.iter().cloned(),
            config.create_missing_files,
        )?;
        info!(
            data_dir = %config.data_dir.display(),
            collections = db.collections.len(),
            "database opened"
        );
        Ok(db)
    }

    /// Open `data_dir` with default settings and the given collection names.
    pub fn open_path<P: AsRef<Path>>(data_dir: P, collections: &[&str]) -> Result<Self> {
        let config = DatabaseConfig::default()
            .with_data_dir(data_dir.as_ref())
            .with_collections(collections.iter().copied());
        Self::open(&config)
    }

    pub fn data_dir(&self) -> &Path {
        self.storage.data_dir()
    }
}

// ============================================================================
// MEMORY STORAGE
// ============================================================================

impl DatabaseCore<MemoryStorage> {
    pub fn in_memory(collections: &[&str]) -> Result<Self> {
        Self::with_storage(
            MemoryStorage::new(),
            collections.iter().map(|s| s.to_string()),
            true,
        )
    }
}

// ============================================================================
// GENERIC
// ============================================================================

impl<S: Storage> DatabaseCore<S> {
    /// Build a database over any backend, registering `collections`.
    pub fn with_storage<I>(storage: S, collections: I, create_missing: bool) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut names = BTreeSet::new();
        for name in collections {
            validate_collection_name(&name)?;
            names.insert(name);
        }

        if create_missing {
            for name in &names {
                storage.create_collection(name)?;
            }
        }

        Ok(DatabaseCore {
            storage: Arc::new(storage),
            locks: LockRegistry::new(),
            collections: Arc::new(names),
            open: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Handle to a registered collection.
    pub fn collection(&self, name: &str) -> Result<CollectionCore<S>> {
        if !self.is_open() {
            return Err(DocFileError::Closed);
        }
        if !self.collections.contains(name) {
            return Err(DocFileError::UnknownCollection(name.to_string()));
        }
        Ok(CollectionCore::new(
            name.to_string(),
            Arc::clone(&self.storage),
            self.locks.get_lock(name),
            Arc::clone(&self.open),
        ))
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains(name)
    }

    /// Registered collection names, sorted.
    pub fn list_collections(&self) -> Vec<String> {
        self.collections.iter().cloned().collect()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Stop accepting operations and wait for in-flight ones to finish.
    ///
    /// Every handle and cursor created from this database fails with
    /// [`DocFileError::Closed`] afterwards. Closing twice is a no-op.
    pub fn close(&self) {
        if !self.open.swap(false, Ordering::AcqRel) {
            return;
        }
        for name in self.collections.iter() {
            drop(self.locks.get_lock(name).lock());
        }
        debug!("database closed");
    }

    // ========== BY-NAME OPERATIONS ==========

    pub fn find_one(&self, collection: &str, query: &Query) -> Result<Option<Document>> {
        self.collection(collection)?.find_one(query)
    }

    pub fn find(
        &self,
        collection: &str,
        query: &Query,
        options: &FindOptions,
    ) -> Result<Vec<Document>> {
        self.collection(collection)?.find(query, options)
    }

    pub fn find_cursor(&self, collection: &str, query: Query) -> Result<FindCursor<S>> {
        Ok(self.collection(collection)?.find_cursor(query))
    }

    pub fn count_documents(&self, collection: &str, query: &Query) -> Result<u64> {
        self.collection(collection)?.count_documents(query)
    }

    pub fn insert_one(&self, collection: &str, document: Document) -> Result<InsertOneResult> {
        self.collection(collection)?.insert_one(document)
    }

    pub fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<InsertManyResult> {
        self.collection(collection)?.insert_many(documents)
    }

    pub fn update_one(
        &self,
        collection: &str,
        query: &Query,
        update: &Update,
    ) -> Result<UpdateResult> {
        self.collection(collection)?.update_one(query, update)
    }

    pub fn delete_one(&self, collection: &str, query: &Query) -> Result<DeleteResult> {
        self.collection(collection)?.delete_one(query)
    }

    pub fn seed_if_empty(&self, collection: &str, documents: Vec<Document>) -> Result<usize> {
        self.collection(collection)?.seed_if_empty(documents)
    }
}
