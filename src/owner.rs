//! Dataset ownership.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The `(user, organization)` pair that created a dataset.
///
/// Owners compare equal only when both fields match exactly. Field
/// declaration order fixes the serialized key order (`mspId`, `userId`).
///
/// # Examples
///
/// ```
/// use did4dcat::DatasetOwner;
///
/// let a = DatasetOwner::new("user", "Glass01MSP");
/// let b = DatasetOwner::new("user", "Other01MSP");
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetOwner {
    /// Membership service provider (organization) identifier.
    pub msp_id: String,
    /// Common name of the caller's certificate subject.
    pub user_id: String,
}

impl DatasetOwner {
    /// Creates an owner from a user id and an MSP id.
    #[must_use]
    pub fn new(user_id: impl Into<String>, msp_id: impl Into<String>) -> Self {
        Self {
            msp_id: msp_id.into(),
            user_id: user_id.into(),
        }
    }
}

impl fmt::Display for DatasetOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user_id, self.msp_id)
    }
}
