//! Type-safe identity wrapper for social graph participants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A participant in the social graph (a Farcaster FID)
///
/// Always strictly positive. Zero, negative and non-numeric values are
/// rejected at construction, so anything holding an `Identity` can skip
/// re-validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Identity(i64);

impl Identity {
    /// Create an Identity from a raw provider or storage value
    ///
    /// # Returns
    /// `None` when the value is zero or negative
    pub fn new(raw: i64) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    /// Get the underlying integer
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Identity {
    type Error = String;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| format!("identity must be positive, got {}", raw))
    }
}

impl TryFrom<u64> for Identity {
    type Error = String;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        i64::try_from(raw)
            .map_err(|_| format!("identity out of range: {}", raw))
            .and_then(Identity::try_from)
    }
}

impl From<Identity> for i64 {
    fn from(id: Identity) -> Self {
        id.0
    }
}

impl FromStr for Identity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: i64 = s
            .trim()
            .parse()
            .map_err(|_| format!("not a numeric identity: {:?}", s))?;
        Identity::try_from(raw)
    }
}
