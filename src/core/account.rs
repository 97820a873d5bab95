use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an account in the transaction network.
///
/// Accounts are opaque to the engine: an identifier can represent a
/// retail customer, a corporate treasury, a merchant terminal, or a
/// mule account — the detectors infer the role from behavior alone.
///
/// # Examples
///
/// ```
/// use forensics_engine::core::account::AccountId;
///
/// let a = AccountId::new("ACC_00042");
/// let b = AccountId::new("ACC_00043");
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new account identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this account ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
