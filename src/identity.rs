//! Caller identity resolution.
//!
//! The host authenticates the caller before the contract runs. This module
//! only turns that verified identity into a [`DatasetOwner`]:
//! - `user_id` is the certificate subject's common name
//! - `msp_id` is the caller's membership service provider id
//!
//! Signatures and trust chains are never inspected here.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{ContractError, ContractResult};
use crate::owner::DatasetOwner;

/// An already-authenticated caller, as supplied by the host.
pub trait ClientIdentity {
    /// Common name of the certificate subject, if it has one.
    fn common_name(&self) -> Option<&str>;

    /// Membership service provider id the caller is enrolled with.
    fn msp_id(&self) -> &str;
}

/// Derive the owner tuple for `identity`.
///
/// # Errors
/// [`ContractError::Identity`] if either component is missing or blank.
pub fn resolve_owner(identity: &dyn ClientIdentity) -> ContractResult<DatasetOwner> {
    let user_id = identity
        .common_name()
        .ok_or_else(|| ContractError::identity("certificate subject has no common name"))?;
    if user_id.trim().is_empty() {
        return Err(ContractError::identity("certificate common name is empty"));
    }

    let msp_id = identity.msp_id();
    if msp_id.trim().is_empty() {
        return Err(ContractError::identity("MSP id is empty"));
    }

    Ok(DatasetOwner::new(user_id, msp_id))
}

static SUBJECT_CN: OnceLock<Regex> = OnceLock::new();

fn subject_cn_pattern() -> ContractResult<&'static Regex> {
    if let Some(re) = SUBJECT_CN.get() {
        return Ok(re);
    }
    let compiled = Regex::new(r"(?:^|,)\s*CN=([^,]*)")
        .map_err(|e| ContractError::identity(format!("invalid subject pattern: {e}")))?;
    // Another thread may have initialized it while we compiled.
    Ok(SUBJECT_CN.get_or_init(|| compiled))
}

/// Extract the common name from a subject distinguished name.
///
/// Components are separated by a comma and optional whitespace. When the
/// subject carries several `CN=` components the last one wins.
///
/// # Errors
/// `Identity` if the subject pattern fails to compile.
pub fn common_name_from_subject(subject: &str) -> ContractResult<Option<String>> {
    let re = subject_cn_pattern()?;
    Ok(re
        .captures_iter(subject)
        .filter_map(|c| c.get(1))
        .last()
        .map(|m| m.as_str().to_string()))
}

/// Identity backed by a verified X.509 certificate subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateIdentity {
    subject: String,
    msp_id: String,
    common_name: Option<String>,
}

impl CertificateIdentity {
    /// Build from the certificate's subject DN (e.g. `CN=user, OU=client`)
    /// and the MSP id the host attached to the invocation.
    ///
    /// # Errors
    /// `Identity` if the subject pattern fails to compile. A subject without
    /// a common name is accepted here and rejected by [`resolve_owner`].
    pub fn from_subject(subject: impl Into<String>, msp_id: impl Into<String>) -> ContractResult<Self> {
        let subject = subject.into();
        let common_name = common_name_from_subject(&subject)?;
        Ok(Self {
            subject,
            msp_id: msp_id.into(),
            common_name,
        })
    }

    /// The subject DN this identity was built from.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl ClientIdentity for CertificateIdentity {
    fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref()
    }

    fn msp_id(&self) -> &str {
        &self.msp_id
    }
}

/// Identity with explicitly supplied components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIdentity {
    common_name: Option<String>,
    msp_id: String,
}

impl StaticIdentity {
    /// Creates an identity with a common name.
    #[must_use]
    pub fn new(common_name: impl Into<String>, msp_id: impl Into<String>) -> Self {
        Self {
            common_name: Some(common_name.into()),
            msp_id: msp_id.into(),
        }
    }

    /// Creates an identity whose certificate carries no common name.
    #[must_use]
    pub fn without_common_name(msp_id: impl Into<String>) -> Self {
        Self {
            common_name: None,
            msp_id: msp_id.into(),
        }
    }
}

impl ClientIdentity for StaticIdentity {
    fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref()
    }

    fn msp_id(&self) -> &str {
        &self.msp_id
    }
}
