// docfile-core/src/lib.rs
//! Embedded document store over flat JSON files.
//!
//! Each collection lives in one `<name>.json` file holding an array of
//! objects. Operations load the whole file under a per-collection lock,
//! filter/sort/limit or mutate in memory, and atomically replace the file.
//!
//! ```no_run
//! use docfile_core::{DatabaseConfig, DatabaseCore, Document, Query, SortDirection, Update};
//! use serde_json::json;
//!
//! # fn main() -> docfile_core::Result<()> {
//! let db = DatabaseCore::open(&DatabaseConfig::load()?)?;
//!
//! let doc = Document::from_value(json!({"_id": "c-1", "user_id": "u", "title": "Hi"}))?;
//! db.insert_one("content", doc)?;
//! db.update_one("content", &Query::new().eq("_id", "c-1"), &Update::new().set("title", "Hello"))?;
//!
//! let latest = db
//!     .find_cursor("content", Query::new().eq("user_id", "u"))?
//!     .sort("created_at", SortDirection::Descending)
//!     .limit(5)
//!     .to_list(None)?;
//! # let _ = latest;
//! db.close();
//! # Ok(())
//! # }
//! ```

pub mod collection_core;
pub mod config;
pub mod cursor;
pub mod database;
pub mod document;
pub mod durability;
pub mod error;
pub mod find_options;
pub mod lock;
pub mod logging;
pub mod query;
pub mod storage;

// Public exports
pub use collection_core::{
    CollectionCore, DeleteResult, InsertManyResult, InsertOneResult, UpdateResult,
};
pub use config::DatabaseConfig;
pub use cursor::FindCursor;
pub use database::DatabaseCore;
pub use document::Document;
pub use durability::DurabilityMode;
pub use error::{DocFileError, Result};
pub use find_options::{FindOptions, SortDirection};
pub use logging::{init_logging, LogLevel};
pub use query::{Query, Update};
pub use storage::{FileStorage, MemoryStorage, Storage};
