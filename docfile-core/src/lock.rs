// docfile-core/src/lock.rs
//! Per-collection mutual exclusion.
//!
//! Each collection name maps to its own mutex, created the first time the name
//! is seen. A read-modify-write cycle on one collection holds that mutex for its
//! whole duration; different names never contend.

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Registry of named collection locks.
///
/// Cloning is cheap and clones share the same locks.
///
/// ```
/// use docfile_core::lock::LockRegistry;
///
/// let locks = LockRegistry::new();
/// let handle = locks.get_lock("faqs");
/// {
///     let _guard = handle.lock();
///     // exclusive access to "faqs"
/// }
/// assert!(locks.contains("faqs"));
/// ```
#[derive(Clone, Default)]
pub struct LockRegistry {
    locks: Arc<DashMap<String, LockHandle>>,
}

/// A shareable handle to one collection's mutex.
#[derive(Clone, Default)]
pub struct LockHandle {
    lock: Arc<Mutex<()>>,
}

impl LockHandle {
    /// Block until the lock is free, then hold it until the guard drops.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock()
    }

    pub fn try_lock(&self) -> Option<MutexGuard<'_, ()>> {
        self.lock.try_lock()
    }
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the lock for `name`, creating it on first use.
    pub fn get_lock(&self, name: &str) -> LockHandle {
        if let Some(handle) = self.locks.get(name) {
            return handle.clone();
        }
        self.locks
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
