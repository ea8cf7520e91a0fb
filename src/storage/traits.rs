//! Abstract world-state interface for did4dcat.
//!
//! The ledger substrate owns replication, ordering and durability. The
//! contract only sees this narrow keyed view of it:
//! - point reads and writes by string key
//! - ordered range scans over the keyspace
//!
//! No transactions are exposed. The host is responsible for serializing
//! concurrent invocations against the same key.

use thiserror::Error;

/// Errors that can occur during state store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend failure (lock poisoned, peer unreachable, ...).
    #[error("State backend error: {0}")]
    Backend(String),

    /// A value could not be encoded or decoded by the backend.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Snapshot file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One entry returned by a range scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// Store key.
    pub key: String,
    /// Raw stored value.
    pub value: String,
}

impl KeyValue {
    /// Creates an entry.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Keyed world state as seen by a single transaction.
///
/// Implementations must return range scans ordered by key.
pub trait StateStore: Send + Sync {
    /// Read the value at `key`.
    ///
    /// `Ok(None)` and `Ok(Some(""))` both mean the key holds nothing.
    fn get_state(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` at `key`, replacing any previous value.
    fn put_state(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Scan keys in `[start, end)` in ascending key order.
    ///
    /// An empty `start` means "from the lowest key"; an empty `end` means
    /// "through the highest key". `("", "")` scans the whole keyspace.
    fn get_state_by_range(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, StorageError>;
}
