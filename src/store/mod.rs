//! Configuration entry storage.
//!
//! # Data Flow
//! ```text
//! operator (admin API / direct file edit)
//!     → Store::put (value becomes non-empty)
//!
//! retry loop (resilience/engine.rs)
//!     → Store::get on every attempt
//!     → "" or absent keeps the loop polling
//! ```
//!
//! # Design Decisions
//! - The empty string is the "not yet provided" sentinel, never a real value
//! - The retry path only reads; writes come from registration or operators
//! - Backends are synchronous: reads are small and infrequent

pub mod file;
pub mod memory;
pub mod registration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use registration::{register_keys, KeySpec};

/// A single configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Unique, immutable key.
    pub key: String,

    /// Current value. Empty means unresolved.
    #[serde(default)]
    pub value: String,

    /// Informational description shown to operators.
    #[serde(default)]
    pub description: String,
}

impl ConfigEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            description: description.into(),
        }
    }

    /// True once an operator has provided a non-empty value.
    pub fn is_resolved(&self) -> bool {
        !self.value.is_empty()
    }
}

/// Errors raised by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not a valid entry document.
    #[error("store format error: {0}")]
    Format(#[from] serde_json::Error),

    /// A writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed persistent map of configuration entries.
pub trait Store: Send + Sync {
    /// Look up the full entry for `key`.
    fn entry(&self, key: &str) -> StoreResult<Option<ConfigEntry>>;

    /// Insert or replace the entry for `key`.
    fn put(&self, key: &str, value: &str, description: &str) -> StoreResult<()>;

    /// All entries, ordered by key.
    fn entries(&self) -> StoreResult<Vec<ConfigEntry>>;

    /// Value for `key`; `None` when the key is unknown, `Some("")` when unresolved.
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entry(key)?.map(|e| e.value))
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.entry(key)?.is_some())
    }
}
