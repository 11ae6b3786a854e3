// storage/mod.rs
//! Collection persistence backends.

mod file_storage;
mod memory_storage;
mod traits;

pub use file_storage::{FileStorage, COLLECTION_EXTENSION};
pub use memory_storage::MemoryStorage;
pub use traits::Storage;
