//! Durability modes for collection rewrites
//!
//! Every write serializes the collection into a temporary file in the data
//! directory and renames it over the target, so readers and crash survivors
//! only ever see a complete file. The mode decides whether the temporary file
//! is flushed to stable storage before the rename.

use serde::{Deserialize, Serialize};

/// Durability mode for collection file replacement
///
/// - **Safe**: fsync the temporary file before renaming it into place.
///   Survives power loss with either the old or the new contents.
/// - **Fast**: rename without fsync. A process crash still never leaves a
///   half-written file, but an OS crash may lose the latest write.
///
/// ```rust
/// use docfile_core::DurabilityMode;
///
/// assert_eq!(DurabilityMode::default(), DurabilityMode::Safe);
/// assert!(DurabilityMode::Safe.sync_on_write());
/// assert!(!DurabilityMode::Fast.sync_on_write());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurabilityMode {
    #[default]
    Safe,
    Fast,
}

impl DurabilityMode {
    pub fn sync_on_write(&self) -> bool {
        matches!(self, DurabilityMode::Safe)
    }
}
