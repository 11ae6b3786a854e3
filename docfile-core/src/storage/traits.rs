// src/storage/traits.rs
//! Storage abstraction for collection files
//!
//! A backend stores each collection as one ordered sequence of documents and
//! moves it in and out of memory as a whole. Locking is not its concern: the
//! collection layer serializes every load/save cycle per collection.
//!
//! ```text
//! Storage trait
//!   ├── FileStorage (production, one JSON file per collection)
//!   └── MemoryStorage (testing, in-memory HashMap)
//! ```

use crate::document::Document;
use crate::error::Result;

pub trait Storage: Send + Sync {
    /// Make sure `name` exists, creating it empty if it does not.
    /// Existing contents are never touched.
    fn create_collection(&self, name: &str) -> Result<()>;

    /// Decode the whole collection in stored order.
    ///
    /// A collection that was never written reads as empty. Contents that do
    /// not decode as a sequence of documents are reported as corruption.
    fn load(&self, name: &str) -> Result<Vec<Document>>;

    /// Replace the whole collection with `documents`.
    fn save(&self, name: &str, documents: &[Document]) -> Result<()>;

    /// Names of the collections currently present in the backend.
    fn list_collections(&self) -> Result<Vec<String>>;
}
