//! Contract configuration.

use crate::error::{ContractError, ContractResult};

/// Default upper bound on an incoming DID document.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 1024 * 1024; // 1 MiB

/// What a full-keyspace scan does with a value that does not decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanPolicy {
    /// Fail the whole scan with `CORRUPT_RECORD`.
    #[default]
    Abort,
    /// Log the key and leave the entry out of the result.
    Skip,
}

/// Tunables for [`DatasetContract`](crate::DatasetContract).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractConfig {
    /// Handling of undecodable values during scans.
    pub scan_policy: ScanPolicy,
    /// Largest accepted document, in bytes.
    pub max_document_bytes: usize,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            scan_policy: ScanPolicy::Abort,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }
}

impl ContractConfig {
    /// Set the scan policy.
    #[must_use]
    pub fn with_scan_policy(mut self, policy: ScanPolicy) -> Self {
        self.scan_policy = policy;
        self
    }

    /// Set the document size limit.
    #[must_use]
    pub fn with_max_document_bytes(mut self, max: usize) -> Self {
        self.max_document_bytes = max;
        self
    }

    /// Reject settings no contract can run with.
    ///
    /// # Errors
    /// `Config` if `max_document_bytes` is zero.
    pub fn validate(&self) -> ContractResult<()> {
        if self.max_document_bytes == 0 {
            return Err(ContractError::Config {
                reason: "max_document_bytes must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
