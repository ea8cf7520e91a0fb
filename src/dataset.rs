//! The dataset record stored on the ledger.
//!
//! A [`Dataset`] binds a DID to its document and to the owner that created
//! it. Its JSON form is the exact byte string written to world state, so it
//! must be identical on every replica that executes the same transaction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ContractError, ContractResult};
use crate::owner::DatasetOwner;

/// A DID document registered on the ledger.
///
/// Equality is structural: two datasets are equal only if key, document and
/// owner all match. Use [`Dataset::same_identity`] to compare keys alone.
///
/// # Examples
///
/// ```
/// use did4dcat::{Dataset, DatasetOwner};
///
/// let owner = DatasetOwner::new("user", "Glass01MSP");
/// let a = Dataset::new("did:dcat:1", r#"{"id":"did:dcat:1"}"#, owner.clone());
/// let b = Dataset::new("did:dcat:1", r#"{"id":"did:dcat:1","v":2}"#, owner);
/// assert!(a.same_identity(&b));
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Store key; equals the document's `id`.
    pub did: String,
    /// The DID document, kept as the raw JSON text.
    pub did_document: String,
    /// Creator of the record.
    pub owner: DatasetOwner,
}

impl Dataset {
    /// Creates a dataset record.
    #[must_use]
    pub fn new(
        did: impl Into<String>,
        did_document: impl Into<String>,
        owner: DatasetOwner,
    ) -> Self {
        Self {
            did: did.into(),
            did_document: did_document.into(),
            owner,
        }
    }

    /// Returns true if both records are stored under the same key.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.did == other.did
    }

    /// Returns true if `owner` created this record.
    #[must_use]
    pub fn is_owned_by(&self, owner: &DatasetOwner) -> bool {
        self.owner == *owner
    }

    /// Canonical JSON: keys `did`, `didDocument`, `owner`, no whitespace.
    ///
    /// # Errors
    /// `MalformedDocument` if encoding fails.
    pub fn to_canonical_json(&self) -> ContractResult<String> {
        serde_json::to_string(self)
            .map_err(|e| ContractError::malformed(format!("encode dataset {}: {e}", self.did)))
    }

    /// Decode a value read from world state at `key`.
    ///
    /// The record is taken as written: its `did` is not compared with `key`.
    ///
    /// # Errors
    /// `CorruptRecord` naming `key` if `value` is not a dataset record.
    pub fn from_state(key: &str, value: &str) -> ContractResult<Self> {
        serde_json::from_str(value).map_err(|e| ContractError::CorruptRecord {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset [did={}, owner={}]", self.did, self.owner)
    }
}

/// Canonical JSON array of datasets, in the given order.
///
/// # Errors
/// `MalformedDocument` if encoding fails.
pub fn datasets_to_json(datasets: &[Dataset]) -> ContractResult<String> {
    serde_json::to_string(datasets)
        .map_err(|e| ContractError::malformed(format!("encode dataset list: {e}")))
}
