// docfile-core/src/error.rs
//! Error types for the document store.
//!
//! The store raises no business-level errors (duplicate keys, validation).
//! A query that matches nothing is reported through zero counts, not here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocFileError {
    /// File system operation failed on a collection file or the data directory.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collection file exists but does not hold a JSON array of objects.
    #[error("collection '{collection}' is corrupt ({path}): {reason}")]
    Corrupt {
        collection: String,
        path: PathBuf,
        reason: String,
    },

    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    #[error("invalid configuration: {message}")]
    ConfigValidation { message: String },

    #[error("database is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, DocFileError>;

impl From<figment::Error> for DocFileError {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl DocFileError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(
        collection: &str,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Corrupt {
            collection: collection.to_string(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True when the error reports a damaged collection file.
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::Corrupt { .. })
    }
}
