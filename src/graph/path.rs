//! Ordered identity paths through the social graph

use super::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered, non-empty chain of identities
///
/// Consecutive entries are adjacent in the graph. A single-element path
/// means source and target are the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConnectionPath(Vec<Identity>);

impl ConnectionPath {
    /// The trivial path from an identity to itself
    pub fn single(identity: Identity) -> Self {
        Self(vec![identity])
    }

    /// Build a path from identities; `None` when empty
    pub fn from_identities(identities: Vec<Identity>) -> Option<Self> {
        (!identities.is_empty()).then_some(Self(identities))
    }

    /// A copy of this path with `next` appended
    pub fn extended(&self, next: Identity) -> Self {
        let mut identities = Vec::with_capacity(self.0.len() + 1);
        identities.extend_from_slice(&self.0);
        identities.push(next);
        Self(identities)
    }

    pub fn identities(&self) -> &[Identity] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Degrees of separation (edges along the path)
    pub fn degree(&self) -> usize {
        self.0.len() - 1
    }

    pub fn source(&self) -> Identity {
        self.0[0]
    }

    pub fn target(&self) -> Identity {
        self.0[self.0.len() - 1]
    }

    pub fn is_self_match(&self) -> bool {
        self.0.len() == 1
    }

    /// Consecutive `(from, to)` pairs along the path
    pub fn hops(&self) -> impl Iterator<Item = (Identity, Identity)> + '_ {
        self.0.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Serialize as a JSON array of integers
    pub fn to_json(&self) -> String {
        let raw: Vec<i64> = self.0.iter().map(|id| id.get()).collect();
        serde_json::Value::from(raw).to_string()
    }

    /// Parse a stored path.
    ///
    /// Accepts a JSON array of integers, or of user objects carrying an
    /// integer `fid`/`identity` field (the shape older rows were written in).
    /// Any entry that does not yield a positive identity rejects the whole path.
    pub fn from_json(json: &str) -> Option<Self> {
        let entries: Vec<StoredHop> = serde_json::from_str(json).ok()?;
        let identities = entries
            .into_iter()
            .map(|hop| Identity::new(hop.raw()))
            .collect::<Option<Vec<_>>>()?;
        Self::from_identities(identities)
    }
}

impl<'de> Deserialize<'de> for ConnectionPath {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let identities = Vec::<Identity>::deserialize(deserializer)?;
        Self::from_identities(identities)
            .ok_or_else(|| serde::de::Error::custom("path must contain at least one identity"))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredHop {
    Bare(i64),
    User {
        #[serde(alias = "identity")]
        fid: i64,
    },
}

impl StoredHop {
    fn raw(&self) -> i64 {
        match self {
            StoredHop::Bare(raw) => *raw,
            StoredHop::User { fid } => *fid,
        }
    }
}

impl fmt::Display for ConnectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}
