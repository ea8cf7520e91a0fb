//! In-memory state backend.
//!
//! This module provides a thread-safe, key-ordered implementation of
//! [`StateStore`]. It is intended for embedded usage, tests, the CLI, and as
//! a reference implementation of the adapter contract.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use blake3::Hasher;

use crate::storage::traits::{KeyValue, StateStore, StorageError};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::Backend(format!("poisoned lock: {context}"))
}

/// Thread-safe in-memory world state.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    state: RwLock<BTreeMap<String, String>>,
}

impl InMemoryStateStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    #[must_use]
    pub fn from_entries(entries: BTreeMap<String, String>) -> Self {
        Self {
            state: RwLock::new(entries),
        }
    }

    /// Copy of the full keyspace, ordered by key.
    ///
    /// # Errors
    /// `Backend` if the state lock is poisoned.
    pub fn entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("state.entries"))?;
        Ok(state.clone())
    }

    /// Number of stored keys.
    ///
    /// # Errors
    /// `Backend` if the state lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("state.len"))?;
        Ok(state.len())
    }

    /// Returns true if no keys are stored.
    ///
    /// # Errors
    /// `Backend` if the state lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// Hex-encoded BLAKE3 digest of the full world state.
    ///
    /// Two replicas that applied the same transactions must report the same
    /// digest. Keys and values are length-prefixed so distinct states never
    /// hash the same byte stream.
    ///
    /// # Errors
    /// `Backend` if the state lock is poisoned.
    pub fn state_digest(&self) -> Result<String, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("state.digest"))?;
        let mut h = Hasher::new();
        for (key, value) in state.iter() {
            h.update(&(key.len() as u64).to_le_bytes());
            h.update(key.as_bytes());
            h.update(&(value.len() as u64).to_le_bytes());
            h.update(value.as_bytes());
        }
        Ok(h.finalize().to_hex().to_string())
    }
}

impl StateStore for InMemoryStateStore {
    fn get_state(&self, key: &str) -> Result<Option<String>, StorageError> {
        let state = self.state.read().map_err(|_| lock_err("state.get"))?;
        Ok(state.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: String) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::Backend("empty key is not allowed".to_string()));
        }
        let mut state = self.state.write().map_err(|_| lock_err("state.put"))?;
        state.insert(key.to_string(), value);
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> Result<Vec<KeyValue>, StorageError> {
        let lower = if start.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Included(start)
        };
        let upper = if end.is_empty() {
            Bound::Unbounded
        } else {
            Bound::Excluded(end)
        };
        if let (Bound::Included(s), Bound::Excluded(e)) = (lower, upper) {
            if s >= e {
                return Ok(Vec::new());
            }
        }

        let state = self.state.read().map_err(|_| lock_err("state.range"))?;
        Ok(state
            .range::<str, _>((lower, upper))
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect())
    }
}
