//! World-state snapshot files.
//!
//! A snapshot is a single JSON object mapping store keys to raw values,
//! written with keys in ascending order. Used by the CLI to carry state
//! between invocations; it is not a durability layer.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::storage::memory::InMemoryStateStore;
use crate::storage::traits::StorageError;

/// Load a snapshot file into a fresh in-memory store.
///
/// A missing file yields an empty store.
///
/// # Errors
/// - `Io` if the file exists but cannot be read
/// - `Serialization` if it is not a JSON object of string values
pub fn load_snapshot(path: &Path) -> Result<InMemoryStateStore, StorageError> {
    if !path.exists() {
        return Ok(InMemoryStateStore::new());
    }
    let bytes = fs::read(path)?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(InMemoryStateStore::new());
    }
    let entries: BTreeMap<String, String> = serde_json::from_slice(&bytes).map_err(|e| {
        StorageError::Serialization(format!("snapshot {}: {e}", path.display()))
    })?;
    Ok(InMemoryStateStore::from_entries(entries))
}

/// Write the full contents of `store` to `path`.
///
/// The file is written next to its destination and renamed into place, so a
/// crash mid-write leaves the previous snapshot intact.
///
/// # Errors
/// - `Backend` if the state lock is poisoned
/// - `Io` if the write or rename fails
pub fn save_snapshot(store: &InMemoryStateStore, path: &Path) -> Result<(), StorageError> {
    let entries = store.entries()?;
    let mut bytes = serde_json::to_vec_pretty(&entries)
        .map_err(|e| StorageError::Serialization(format!("encode snapshot: {e}")))?;
    bytes.push(b'\n');

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, &bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
