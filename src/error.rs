//! Error types for did4dcat.
//!
//! Every failure the contract can surface is a [`ContractError`] variant.
//! Each variant maps to a stable machine-readable code that hosts forward
//! through their error-reporting channel alongside the human-readable message.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by contract operations.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The incoming payload is unparsable or lacks a required field.
    #[error("Malformed DID document: {reason}")]
    MalformedDocument {
        /// What was wrong with the payload.
        reason: String,
    },

    /// A dataset is already stored under this key.
    #[error("Dataset {did} already exist")]
    AlreadyExists {
        /// The conflicting key.
        did: String,
    },

    /// No dataset is stored under this key.
    #[error("Dataset {did} does not exist")]
    NotFound {
        /// The missing key.
        did: String,
    },

    /// The caller does not own the dataset.
    ///
    /// Carries no detail: the message must not reveal which owner field differed.
    #[error("User is not authorized")]
    Unauthorized,

    /// The caller's identity does not yield an owner tuple.
    #[error("Identity error: {reason}")]
    Identity {
        /// Why the identity could not be resolved.
        reason: String,
    },

    /// A stored value does not decode as a dataset.
    #[error("Corrupt record at key {key}: {reason}")]
    CorruptRecord {
        /// Store key holding the bad value.
        key: String,
        /// Decoder message.
        reason: String,
    },

    /// The host invoked a transaction name the contract does not define.
    #[error("Undefined contract method called")]
    UndefinedTransaction {
        /// The name that was invoked.
        name: String,
    },

    /// The contract configuration is unusable.
    #[error("Invalid configuration: {reason}")]
    Config {
        /// Which setting was rejected.
        reason: String,
    },

    /// The state store adapter failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ContractError {
    /// Creates a malformed-document error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            reason: reason.into(),
        }
    }

    /// Creates an identity error.
    #[must_use]
    pub fn identity(reason: impl Into<String>) -> Self {
        Self::Identity {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code for the host's error channel.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MalformedDocument { .. } => "MALFORMED_DOCUMENT",
            Self::AlreadyExists { .. } => "DATASET_ALREADY_EXISTS",
            Self::NotFound { .. } => "DATASET_NOT_FOUND",
            Self::Unauthorized => "USER_NOT_AUTHORIZED",
            Self::Identity { .. } => "IDENTITY_ERROR",
            Self::CorruptRecord { .. } => "CORRUPT_RECORD",
            Self::UndefinedTransaction { .. } => "UNDEFINED_TRANSACTION",
            Self::Config { .. } => "INVALID_CONFIG",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns true if the caller supplied bad input or lacks rights.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedDocument { .. }
                | Self::AlreadyExists { .. }
                | Self::NotFound { .. }
                | Self::Unauthorized
                | Self::UndefinedTransaction { .. }
        )
    }

    /// Returns true if a host-level retry could succeed.
    ///
    /// The contract itself never retries.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(e) => matches!(e, StorageError::Backend(_)),
            _ => false,
        }
    }
}

/// Result type alias for contract operations.
pub type ContractResult<T> = Result<T, ContractError>;
