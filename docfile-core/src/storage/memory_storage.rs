// storage/memory_storage.rs
//! Pure in-memory storage implementation for fast testing
//!
//! ```text
//! MemoryStorage (Storage trait implementation)
//!      ↓
//! HashMap<String, Vec<Document>> (collections -> documents)
//! ```
//!
//! Nothing is persisted; data is lost when the storage is dropped.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::document::Document;
use crate::error::Result;
use crate::storage::Storage;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn create_collection(&self, name: &str) -> Result<()> {
        self.collections
            .write()
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Vec<Document>> {
        Ok(self
            .collections
            .read()
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    fn save(&self, name: &str, documents: &[Document]) -> Result<()> {
        self.collections
            .write()
            .insert(name.to_string(), documents.to_vec());
        Ok(())
    }

    fn list_collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_collection() {
        let storage = MemoryStorage::new();
        storage.create_collection("users").unwrap();
        assert_eq!(storage.list_collections().unwrap(), vec!["users"]);
        assert!(storage.load("users").unwrap().is_empty());
    }

    #[test]
    fn test_create_duplicate_collection_keeps_data() {
        let storage = MemoryStorage::new();
        let doc = Document::from_value(json!({"_id": "a"})).unwrap();
        storage.save("users", &[doc]).unwrap();
        storage.create_collection("users").unwrap();
        assert_eq!(storage.load("users").unwrap().len(), 1);
    }

    #[test]
    fn test_load_nonexistent_collection() {
        let storage = MemoryStorage::new();
        assert!(storage.load("nope").unwrap().is_empty());
    }
}
