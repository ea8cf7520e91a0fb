//! # did4dcat - DID document registry for DCAT datasets
//!
//! did4dcat manages decentralized-identifier documents that describe
//! datasets, stored one record per DID in a ledger's keyed world state.
//!
//! ## Core Concepts
//!
//! - **Dataset**: a DID, its document, and the owner who created it
//! - **DatasetOwner**: the `(user, organization)` pair derived from the caller's certificate
//! - **StateStore**: the ordered key/value view of the ledger the contract runs against
//! - **DatasetContract**: create, update, read and list operations with single-owner writes
//!
//! ## Usage
//!
//! ```rust
//! use did4dcat::{DatasetContract, InMemoryStateStore, StaticIdentity, TransactionContext};
//!
//! let store = InMemoryStateStore::new();
//! let caller = StaticIdentity::new("user", "Glass01MSP");
//! let ctx = TransactionContext::new(&store, &caller);
//!
//! let contract = DatasetContract::new();
//! let doc = r#"{"id":"did:dcat:dataset:1","issued":"2022-09-19T18:05:20.997"}"#;
//! let dataset = contract.create_dataset(&ctx, doc)?;
//! assert_eq!(dataset.did, "did:dcat:dataset:1");
//! assert_eq!(contract.get_my_datasets(&ctx)?.len(), 1);
//! # Ok::<(), did4dcat::ContractError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Records and identity
pub mod dataset;
pub mod document;
pub mod error;
pub mod identity;
pub mod owner;

// Contract surface and state adapter
pub mod config;
pub mod contract;
pub mod dispatch;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use config::{ContractConfig, ScanPolicy};
pub use contract::{DatasetContract, TransactionContext, CONTRACT_NAME, CONTRACT_VERSION};
pub use dataset::{datasets_to_json, Dataset};
pub use dispatch::{invoke, ChaincodeFailure, Intent, Transaction};
pub use document::DidDocument;
pub use error::{ContractError, ContractResult};
pub use identity::{resolve_owner, CertificateIdentity, ClientIdentity, StaticIdentity};
pub use owner::DatasetOwner;
pub use storage::{InMemoryStateStore, KeyValue, StateStore, StorageError};
