//! World-state adapter for did4dcat.
//!
//! The [`StateStore`] trait is the only view the contract has of the ledger.
//! [`InMemoryStateStore`] is the bundled backend.

mod memory;
mod snapshot;
mod traits;

pub use memory::InMemoryStateStore;
pub use snapshot::{load_snapshot, save_snapshot};
pub use traits::{KeyValue, StateStore, StorageError};
