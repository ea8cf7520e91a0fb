//! Host-facing transaction dispatch.
//!
//! Hosts invoke the contract by function name with string arguments and
//! expect a string payload back. This module maps those names onto
//! [`DatasetContract`] calls and renders results:
//! - single datasets as canonical JSON objects
//! - listings as JSON arrays in scan order
//! - failures as a stable code plus message

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::contract::{DatasetContract, TransactionContext};
use crate::dataset::datasets_to_json;
use crate::error::{ContractError, ContractResult};

/// Whether a transaction writes world state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Ordered and committed to the ledger.
    Submit,
    /// Read-only query.
    Evaluate,
}

/// A parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// Instantiation hook.
    InitLedger,
    /// Register a DID document.
    CreateDataset {
        /// Raw document text.
        did_document: String,
    },
    /// Replace a DID document.
    UpdateDataset {
        /// Raw document text.
        did_document: String,
    },
    /// Fetch by DID.
    ReadDataset {
        /// Store key.
        did: String,
    },
    /// List the caller's datasets.
    GetMyDatasets,
    /// List every dataset.
    GetAllDatasets,
}

impl Transaction {
    /// Every function name the contract answers to.
    pub const NAMES: [&'static str; 6] = [
        "InitLedger",
        "CreateDataset",
        "UpdateDataset",
        "ReadDataset",
        "GetMyDatasets",
        "GetAllDatasets",
    ];

    /// Parse a function name and its arguments.
    ///
    /// # Errors
    /// - `UndefinedTransaction` for an unknown name
    /// - `MalformedDocument` for a wrong argument count
    pub fn parse(name: &str, args: &[&str]) -> ContractResult<Self> {
        let tx = match name {
            "InitLedger" => {
                expect_args(name, args, 0)?;
                Self::InitLedger
            }
            "CreateDataset" => Self::CreateDataset {
                did_document: single_arg(name, args)?,
            },
            "UpdateDataset" => Self::UpdateDataset {
                did_document: single_arg(name, args)?,
            },
            "ReadDataset" => Self::ReadDataset {
                did: single_arg(name, args)?,
            },
            "GetMyDatasets" => {
                expect_args(name, args, 0)?;
                Self::GetMyDatasets
            }
            "GetAllDatasets" => {
                expect_args(name, args, 0)?;
                Self::GetAllDatasets
            }
            other => {
                return Err(ContractError::UndefinedTransaction {
                    name: other.to_string(),
                })
            }
        };
        Ok(tx)
    }

    /// The host-facing function name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::InitLedger => "InitLedger",
            Self::CreateDataset { .. } => "CreateDataset",
            Self::UpdateDataset { .. } => "UpdateDataset",
            Self::ReadDataset { .. } => "ReadDataset",
            Self::GetMyDatasets => "GetMyDatasets",
            Self::GetAllDatasets => "GetAllDatasets",
        }
    }

    /// Submit or evaluate.
    #[must_use]
    pub const fn intent(&self) -> Intent {
        match self {
            Self::InitLedger | Self::CreateDataset { .. } | Self::UpdateDataset { .. } => {
                Intent::Submit
            }
            Self::ReadDataset { .. } | Self::GetMyDatasets | Self::GetAllDatasets => {
                Intent::Evaluate
            }
        }
    }

    /// Run against `contract` and render the response payload.
    ///
    /// # Errors
    /// Whatever the underlying contract operation returns.
    pub fn execute(
        &self,
        contract: &DatasetContract,
        ctx: &TransactionContext<'_>,
    ) -> ContractResult<String> {
        match self {
            Self::InitLedger => {
                contract.init_ledger(ctx)?;
                Ok(String::new())
            }
            Self::CreateDataset { did_document } => {
                contract.create_dataset(ctx, did_document)?.to_canonical_json()
            }
            Self::UpdateDataset { did_document } => {
                contract.update_dataset(ctx, did_document)?.to_canonical_json()
            }
            Self::ReadDataset { did } => contract.read_dataset(ctx, did)?.to_canonical_json(),
            Self::GetMyDatasets => datasets_to_json(&contract.get_my_datasets(ctx)?),
            Self::GetAllDatasets => datasets_to_json(&contract.get_all_datasets(ctx)?),
        }
    }
}

fn expect_args(name: &str, args: &[&str], expected: usize) -> ContractResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ContractError::malformed(format!(
            "{name} expects {expected} argument(s), got {}",
            args.len()
        )))
    }
}

fn single_arg(name: &str, args: &[&str]) -> ContractResult<String> {
    expect_args(name, args, 1)?;
    Ok(args[0].to_string())
}

/// Failure as reported through the host's error channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChaincodeFailure {
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Human-readable message.
    pub message: String,
}

impl From<&ContractError> for ChaincodeFailure {
    fn from(err: &ContractError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<ContractError> for ChaincodeFailure {
    fn from(err: ContractError) -> Self {
        Self::from(&err)
    }
}

impl fmt::Display for ChaincodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ChaincodeFailure {}

/// Parse and execute one named transaction.
///
/// # Errors
/// A [`ChaincodeFailure`] carrying the code of the parse or execution error.
pub fn invoke(
    contract: &DatasetContract,
    ctx: &TransactionContext<'_>,
    name: &str,
    args: &[&str],
) -> Result<String, ChaincodeFailure> {
    let tx = Transaction::parse(name, args)?;
    debug!(transaction = tx.name(), intent = ?tx.intent(), "invoking transaction");
    Ok(tx.execute(contract, ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_parses_with_the_right_arity() {
        for name in Transaction::NAMES {
            let arity = match name {
                "CreateDataset" | "UpdateDataset" | "ReadDataset" => 1,
                _ => 0,
            };
            let args = vec!["x"; arity];
            let tx = Transaction::parse(name, &args).unwrap();
            assert_eq!(tx.name(), name);
        }
    }

    #[test]
    fn unknown_name_is_undefined_transaction() {
        let err = Transaction::parse("DeleteDataset", &["did:dcat:1"]).unwrap_err();
        assert_eq!(err.to_string(), "Undefined contract method called");
        assert_eq!(err.code(), "UNDEFINED_TRANSACTION");
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let err = Transaction::parse("ReadDataset", &[]).unwrap_err();
        assert_eq!(err.code(), "MALFORMED_DOCUMENT");
        let err = Transaction::parse("GetAllDatasets", &["extra"]).unwrap_err();
        assert_eq!(err.code(), "MALFORMED_DOCUMENT");
    }

    #[test]
    fn intents_split_writes_from_reads() {
        assert_eq!(
            Transaction::parse("CreateDataset", &["{}"]).unwrap().intent(),
            Intent::Submit
        );
        assert_eq!(
            Transaction::parse("GetMyDatasets", &[]).unwrap().intent(),
            Intent::Evaluate
        );
    }

    #[test]
    fn failure_carries_code_and_message() {
        let failure = ChaincodeFailure::from(ContractError::Unauthorized);
        assert_eq!(failure.code, "USER_NOT_AUTHORIZED");
        assert_eq!(failure.message, "User is not authorized");
        assert_eq!(
            serde_json::to_string(&failure).unwrap(),
            r#"{"code":"USER_NOT_AUTHORIZED","message":"User is not authorized"}"#
        );
    }
}
