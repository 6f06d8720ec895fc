//! Bounded breadth-first path search over the follow graph
//!
//! Resolution order for `find_path(source, target)`:
//!
//! 1. `source == target` returns `[source]` without any I/O.
//! 2. A stored edge between the two returns `[source, target]`.
//! 3. The most recent logged search for the exact pair is replayed.
//! 4. Otherwise BFS through the provider, writing every discovered edge to
//!    the store as it goes.
//!
//! Steps 2-4 share one wall-clock deadline.
//!
//! The follow relation is treated as undirected: a node's neighbors are its
//! followers plus the accounts it follows, and a stored edge in either
//! direction counts as a direct connection. Stored edges are never
//! re-validated against the live graph.

use crate::cache::{ConnectionStore, SearchFilter};
use crate::config::SearchSettings;
use crate::graph::{ConnectionPath, GraphProvider, Identity};
use crate::{Result, SixDegreesError};
use std::collections::{HashSet, VecDeque};
use std::time::Duration;

/// Dequeued nodes between progress events
const PROGRESS_INTERVAL: usize = 100;

/// Bounds applied to every search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Nodes at this depth are not expanded
    pub max_depth: usize,
    /// Total nodes dequeued before giving up
    pub max_queue_size: usize,
    /// Neighbors handled per store write
    pub batch_size: usize,
    pub timeout: Duration,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::from(&SearchSettings::default())
    }
}

impl From<&SearchSettings> for SearchLimits {
    fn from(settings: &SearchSettings) -> Self {
        Self {
            max_depth: settings.max_depth,
            max_queue_size: settings.max_queue_size,
            batch_size: settings.batch_size.max(1),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

/// Shortest-path search between two identities
pub struct PathFinder<P> {
    provider: P,
    store: ConnectionStore,
    limits: SearchLimits,
}

impl<P: GraphProvider> PathFinder<P> {
    pub fn new(provider: P, store: ConnectionStore) -> Self {
        Self::with_limits(provider, store, SearchLimits::default())
    }

    pub fn with_limits(provider: P, store: ConnectionStore, limits: SearchLimits) -> Self {
        Self {
            provider,
            store,
            limits,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn store(&self) -> &ConnectionStore {
        &self.store
    }

    pub fn limits(&self) -> SearchLimits {
        self.limits
    }

    /// Validate raw identities, then [`find_path`](Self::find_path)
    pub async fn find_path_raw(&self, source: i64, target: i64) -> Result<ConnectionPath> {
        let source = validate(source, "source")?;
        let target = validate(target, "target")?;
        self.find_path(source, target).await
    }

    /// Find the shortest known path from `source` to `target`
    ///
    /// # Errors
    /// - `NotFound` when the bounds are exhausted without reaching `target`
    /// - `Timeout` when the deadline passes first
    /// - `ProviderUnavailable` when neither neighbor listing of `source` can be fetched
    pub async fn find_path(&self, source: Identity, target: Identity) -> Result<ConnectionPath> {
        if source == target {
            tracing::debug!(from = %source, "Self match");
            return Ok(ConnectionPath::single(source));
        }

        let deadline = self.limits.timeout;
        match tokio::time::timeout(deadline, self.resolve(source, target)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    from = %source,
                    to = %target,
                    timeout_secs = deadline.as_secs_f64(),
                    "Path search timed out"
                );
                Err(SixDegreesError::Timeout(deadline))
            }
        }
    }

    async fn resolve(&self, source: Identity, target: Identity) -> Result<ConnectionPath> {
        if let Some(path) = self.direct_connection(source, target).await {
            return Ok(path);
        }
        if let Some(path) = self.replay_cached(source, target).await {
            return Ok(path);
        }
        self.breadth_first(source, target).await
    }

    async fn direct_connection(
        &self,
        source: Identity,
        target: Identity,
    ) -> Option<ConnectionPath> {
        if !self.store.has_edge_between(source, target).await {
            return None;
        }

        tracing::info!(from = %source, to = %target, "Direct connection found in store");
        Some(ConnectionPath::single(source).extended(target))
    }

    async fn replay_cached(&self, source: Identity, target: Identity) -> Option<ConnectionPath> {
        let record = self
            .store
            .recent_searches(SearchFilter::pair(source, target).with_limit(1))
            .await
            .into_iter()
            .next()?;

        match record.path() {
            Some(path) if path.len() >= 2 => {
                tracing::info!(
                    from = %source,
                    to = %target,
                    search_id = record.id,
                    degree = path.degree(),
                    "Replaying cached path"
                );
                Some(path)
            }
            _ => {
                tracing::debug!(
                    search_id = record.id,
                    path_json = %record.path_json,
                    "Cached path unusable, searching live"
                );
                None
            }
        }
    }

    async fn breadth_first(&self, source: Identity, target: Identity) -> Result<ConnectionPath> {
        let limits = self.limits;
        let mut queue: VecDeque<(Identity, ConnectionPath, usize)> = VecDeque::new();
        let mut visited: HashSet<Identity> = HashSet::new();

        queue.push_back((source, ConnectionPath::single(source), 0));
        visited.insert(source);

        let mut explored = 0usize;
        let mut max_depth_reached = 0usize;

        tracing::info!(from = %source, to = %target, max_depth = limits.max_depth, "Starting path search");

        while explored < limits.max_queue_size {
            let Some((current, path, depth)) = queue.pop_front() else {
                break;
            };
            explored += 1;

            if explored % PROGRESS_INTERVAL == 0 {
                tracing::debug!(explored, queue = queue.len(), depth, "Search progress");
            }
            if depth > max_depth_reached {
                max_depth_reached = depth;
                tracing::info!(depth, explored, queue = queue.len(), "Reached new search depth");
            }
            if depth >= limits.max_depth {
                continue;
            }

            let neighbors = self.neighbors(current, current == source, depth, explored).await?;

            for batch in neighbors.chunks(limits.batch_size.max(1)) {
                let edges: Vec<(Identity, Identity)> =
                    batch.iter().map(|neighbor| (current, *neighbor)).collect();
                if let Err(e) = self.store.upsert_edges(&edges).await {
                    tracing::warn!(node = %current, depth, explored, error = %e, "Cache write failed");
                }

                for &neighbor in batch {
                    if neighbor == target {
                        let found = path.extended(target);
                        tracing::info!(
                            from = %source,
                            to = %target,
                            degree = found.degree(),
                            explored,
                            "Path found"
                        );
                        self.persist_path(&found).await;
                        return Ok(found);
                    }
                    if visited.insert(neighbor) {
                        queue.push_back((neighbor, path.extended(neighbor), depth + 1));
                    }
                }
            }
        }

        let node_limit_hit = explored >= limits.max_queue_size && !queue.is_empty();
        if node_limit_hit {
            tracing::warn!(
                from = %source,
                to = %target,
                explored,
                max_depth_reached,
                queue = queue.len(),
                "Node limit reached, aborting search"
            );
        } else {
            tracing::info!(
                from = %source,
                to = %target,
                explored,
                max_depth_reached,
                "Search space exhausted"
            );
        }

        Err(SixDegreesError::NotFound {
            explored,
            max_depth_reached,
            node_limit_hit,
        })
    }

    /// Followers and following of `node`, validated and deduplicated
    ///
    /// A failed listing counts as empty. Only when both listings fail for
    /// the search source is the provider considered unavailable.
    async fn neighbors(
        &self,
        node: Identity,
        is_source: bool,
        depth: usize,
        explored: usize,
    ) -> Result<Vec<Identity>> {
        let (followers, following) =
            tokio::join!(self.provider.followers(node), self.provider.following(node));

        if is_source {
            if let (Err(a), Err(b)) = (&followers, &following) {
                tracing::warn!(node = %node, followers_error = %a, following_error = %b, "Provider unavailable");
                return Err(SixDegreesError::ProviderUnavailable(format!(
                    "could not list neighbors of {}: {}",
                    node, a
                )));
            }
        }

        let mut raw = Vec::new();
        for (listing, result) in [("followers", followers), ("following", following)] {
            match result {
                Ok(ids) => raw.extend(ids),
                Err(e) => {
                    tracing::warn!(node = %node, listing, depth, explored, error = %e, "Node exploration failed");
                }
            }
        }

        let mut seen = HashSet::new();
        Ok(raw
            .into_iter()
            .filter_map(Identity::new)
            .filter(|id| *id != node && seen.insert(*id))
            .collect())
    }

    /// Write every hop of a found path in both directions
    async fn persist_path(&self, path: &ConnectionPath) {
        let edges: Vec<(Identity, Identity)> = path
            .hops()
            .flat_map(|(a, b)| [(a, b), (b, a)])
            .collect();
        if let Err(e) = self.store.upsert_edges(&edges).await {
            tracing::warn!(path = %path, error = %e, "Failed to persist found path");
        }
    }
}

fn validate(raw: i64, role: &str) -> Result<Identity> {
    Identity::new(raw).ok_or_else(|| {
        SixDegreesError::InvalidInput(format!("{} identity must be positive, got {}", role, raw))
    })
}
