//! Offline graph provider backed by a JSON snapshot
//!
//! Snapshot format:
//!
//! ```json
//! {
//!   "follows": [[1, 2], [2, 3]],
//!   "users": [{"identity": 1, "handle": "alice", "display_name": "Alice", "avatar_url": "..."}]
//! }
//! ```
//!
//! Each `[a, b]` pair means "a follows b". Raw values are kept as-is so a
//! snapshot can reproduce provider noise (zeros, negatives, duplicates).

use super::provider::{GraphProvider, ProviderError};
use super::user::normalize_handle;
use super::{Identity, UserProfile};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    follows: Vec<(i64, i64)>,
    #[serde(default)]
    users: Vec<UserProfile>,
}

/// In-memory follow graph with call accounting
#[derive(Debug, Default)]
pub struct SnapshotProvider {
    following: HashMap<i64, Vec<i64>>,
    followers: HashMap<i64, Vec<i64>>,
    users: HashMap<Identity, UserProfile>,
    neighbor_calls: AtomicUsize,
    lookup_calls: AtomicUsize,
}

impl SnapshotProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(follower, followee)` pairs
    pub fn from_follows(follows: impl IntoIterator<Item = (i64, i64)>) -> Self {
        let mut provider = Self::new();
        for (from, to) in follows {
            provider.add_follow(from, to);
        }
        provider
    }

    /// Load a snapshot file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "Loading graph snapshot");

        let content = std::fs::read_to_string(path)?;
        let file: SnapshotFile = serde_json::from_str(&content)?;

        let mut provider = Self::from_follows(file.follows);
        for user in file.users {
            provider.add_user(user);
        }

        tracing::debug!(
            nodes = provider.node_count(),
            users = provider.users.len(),
            "Snapshot loaded"
        );
        Ok(provider)
    }

    /// Record that `from` follows `to`
    pub fn add_follow(&mut self, from: i64, to: i64) {
        self.following.entry(from).or_default().push(to);
        self.followers.entry(to).or_default().push(from);
    }

    pub fn add_user(&mut self, user: UserProfile) {
        self.users.insert(user.identity, user);
    }

    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.add_user(user);
        self
    }

    /// Distinct raw values appearing on either side of a follow
    pub fn node_count(&self) -> usize {
        let mut nodes: Vec<i64> = self
            .following
            .keys()
            .chain(self.followers.keys())
            .copied()
            .collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes.len()
    }

    /// Number of `followers` + `following` calls served
    pub fn neighbor_calls(&self) -> usize {
        self.neighbor_calls.load(Ordering::SeqCst)
    }

    /// Number of user lookups served
    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }

    fn knows(&self, identity: Identity) -> bool {
        self.users.contains_key(&identity)
            || self.following.contains_key(&identity.get())
            || self.followers.contains_key(&identity.get())
    }
}

#[async_trait]
impl GraphProvider for SnapshotProvider {
    async fn followers(&self, identity: Identity) -> std::result::Result<Vec<i64>, ProviderError> {
        self.neighbor_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .followers
            .get(&identity.get())
            .cloned()
            .unwrap_or_default())
    }

    async fn following(&self, identity: Identity) -> std::result::Result<Vec<i64>, ProviderError> {
        self.neighbor_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .following
            .get(&identity.get())
            .cloned()
            .unwrap_or_default())
    }

    async fn user_by_identity(
        &self,
        identity: Identity,
    ) -> std::result::Result<UserProfile, ProviderError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(user) = self.users.get(&identity) {
            return Ok(user.clone());
        }
        if self.knows(identity) {
            return Ok(UserProfile::new(identity, format!("fid{}", identity)));
        }
        Err(ProviderError::NotFound(format!("identity {}", identity)))
    }

    async fn user_by_handle(&self, handle: &str) -> std::result::Result<UserProfile, ProviderError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        let wanted = normalize_handle(handle);
        self.users
            .values()
            .find(|u| u.handle.eq_ignore_ascii_case(wanted))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("@{}", wanted)))
    }
}
