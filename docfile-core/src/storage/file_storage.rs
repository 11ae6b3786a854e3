// storage/file_storage.rs
//! File-based storage: one pretty-printed JSON array per collection
//!
//! ```text
//! <data_dir>/
//!   ├── faqs.json          [ {..}, {..} ]
//!   ├── features.json
//!   └── .faqs.json.XXXX.tmp   (only while a write is in flight)
//! ```
//!
//! Writes go to a temporary file in the same directory which is then renamed
//! over the target. Rename within one directory is atomic, so the target is
//! always either the previous or the new complete array.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, trace};

use crate::document::Document;
use crate::durability::DurabilityMode;
use crate::error::{DocFileError, Result};
use crate::storage::Storage;

/// File extension of collection files.
pub const COLLECTION_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct FileStorage {
    data_dir: PathBuf,
    durability: DurabilityMode,
}

impl FileStorage {
    /// Open a data directory, creating it (and its parents) if needed.
    pub fn open<P: AsRef<Path>>(data_dir: P, durability: DurabilityMode) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).map_err(|e| DocFileError::io(&data_dir, e))?;
        debug!(data_dir = %data_dir.display(), ?durability, "opened file storage");
        Ok(FileStorage {
            data_dir,
            durability,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn durability(&self) -> DurabilityMode {
        self.durability
    }

    /// Path of the file backing `name`.
    pub fn collection_path(&self, name: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}.{}", name, COLLECTION_EXTENSION))
    }

    fn decode(&self, name: &str, path: &Path, bytes: &[u8]) -> Result<Vec<Document>> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| DocFileError::corrupt(name, path, e.to_string()))?;

        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(DocFileError::corrupt(
                    name,
                    path,
                    format!("expected a JSON array, found {}", json_kind(&other)),
                ))
            }
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Ok(Document::from(map)),
                other => Err(DocFileError::corrupt(
                    name,
                    path,
                    format!("element {} is {}, not an object", index, json_kind(&other)),
                )),
            })
            .collect()
    }

    #[cfg(unix)]
    fn sync_dir(&self) -> Result<()> {
        fs::File::open(&self.data_dir)
            .and_then(|dir| dir.sync_all())
            .map_err(|e| DocFileError::io(&self.data_dir, e))
    }

    #[cfg(not(unix))]
    fn sync_dir(&self) -> Result<()> {
        Ok(())
    }
}

impl Storage for FileStorage {
    fn create_collection(&self, name: &str) -> Result<()> {
        let path = self.collection_path(name);
        if path.exists() {
            return Ok(());
        }
        debug!(collection = name, path = %path.display(), "creating empty collection file");
        self.save(name, &[])
    }

    fn load(&self, name: &str) -> Result<Vec<Document>> {
        let path = self.collection_path(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!(collection = name, "collection file missing, reading as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(DocFileError::io(&path, e)),
        };

        let documents = self.decode(name, &path, &bytes)?;
        trace!(collection = name, count = documents.len(), bytes = bytes.len(), "loaded collection");
        Ok(documents)
    }

    fn save(&self, name: &str, documents: &[Document]) -> Result<()> {
        let path = self.collection_path(name);
        let mut encoded = serde_json::to_vec_pretty(documents)?;
        encoded.push(b'\n');

        let mut tmp = tempfile::Builder::new()
            .prefix(&format!(".{}.{}.", name, COLLECTION_EXTENSION))
            .suffix(".tmp")
            .tempfile_in(&self.data_dir)
            .map_err(|e| DocFileError::io(&self.data_dir, e))?;

        tmp.write_all(&encoded)
            .map_err(|e| DocFileError::io(tmp.path(), e))?;

        if self.durability.sync_on_write() {
            tmp.as_file()
                .sync_all()
                .map_err(|e| DocFileError::io(tmp.path(), e))?;
        }

        tmp.persist(&path)
            .map_err(|e| DocFileError::io(&path, e.error))?;

        if self.durability.sync_on_write() {
            self.sync_dir()?;
        }

        trace!(collection = name, count = documents.len(), bytes = encoded.len(), "wrote collection");
        Ok(())
    }

    fn list_collections(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.data_dir).map_err(|e| DocFileError::io(&self.data_dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DocFileError::io(&self.data_dir, e))?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(COLLECTION_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if !stem.starts_with('.') {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
