//! Orchestration over [`PathFinder`]: input validation, search logging and
//! user-facing outcomes

use super::pathfinder::PathFinder;
use crate::error::{not_connected_message, MSG_SELF, MSG_TIMED_OUT, MSG_UNVERIFIED};
use crate::graph::{normalize_handle, ConnectionPath, GraphProvider, Identity, ProviderError, UserProfile};
use crate::{Result, SixDegreesError};

/// Result of a connection lookup, ready for presentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionOutcome {
    SelfMatch(ConnectionPath),
    Connected(ConnectionPath),
    NotConnected { max_depth: usize },
    TimedOut,
    UnverifiedIdentity,
}

impl ConnectionOutcome {
    /// Degrees of separation; `Some(0)` for a self match
    pub fn degree(&self) -> Option<usize> {
        match self {
            ConnectionOutcome::SelfMatch(path) | ConnectionOutcome::Connected(path) => {
                Some(path.degree())
            }
            _ => None,
        }
    }

    pub fn path(&self) -> Option<&ConnectionPath> {
        match self {
            ConnectionOutcome::SelfMatch(path) | ConnectionOutcome::Connected(path) => Some(path),
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ConnectionOutcome::SelfMatch(_) => MSG_SELF.to_string(),
            ConnectionOutcome::Connected(path) => match path.degree() {
                1 => "Directly connected (1 degree of separation).".to_string(),
                n => format!("Connected through {} degrees of separation.", n),
            },
            ConnectionOutcome::NotConnected { max_depth } => not_connected_message(*max_depth),
            ConnectionOutcome::TimedOut => MSG_TIMED_OUT.to_string(),
            ConnectionOutcome::UnverifiedIdentity => MSG_UNVERIFIED.to_string(),
        }
    }
}

/// Turns identity pairs into path searches and logs what they find
pub struct ConnectionService<P> {
    finder: PathFinder<P>,
}

impl<P: GraphProvider> ConnectionService<P> {
    pub fn new(finder: PathFinder<P>) -> Self {
        Self { finder }
    }

    pub fn finder(&self) -> &PathFinder<P> {
        &self.finder
    }

    /// Find a path between raw identities and log it as searched by `source`
    ///
    /// Self matches are not logged. A failed log write does not fail the call.
    pub async fn resolve(&self, source: i64, target: i64) -> Result<ConnectionPath> {
        let path = self.finder.find_path_raw(source, target).await?;

        if !path.is_self_match() {
            let (from, to) = (path.source(), path.target());
            if let Err(e) = self.finder.store().record_search(from, from, to, &path).await {
                tracing::warn!(from = %from, to = %to, error = %e, "Failed to record search");
            }
        }
        Ok(path)
    }

    /// [`resolve`](Self::resolve), folded into a presentable outcome
    pub async fn connect(&self, source: i64, target: i64) -> ConnectionOutcome {
        let result = self.resolve(source, target).await;
        self.outcome_of(result)
    }

    /// Like [`connect`](Self::connect), with identities given as a number or handle
    pub async fn connect_identifiers(&self, source: &str, target: &str) -> ConnectionOutcome {
        let result = async {
            let source = self.resolve_identifier(source).await?;
            let target = self.resolve_identifier(target).await?;
            self.resolve(source.get(), target.get()).await
        }
        .await;
        self.outcome_of(result)
    }

    fn outcome_of(&self, result: Result<ConnectionPath>) -> ConnectionOutcome {
        match result {
            Ok(path) if path.is_self_match() => ConnectionOutcome::SelfMatch(path),
            Ok(path) => ConnectionOutcome::Connected(path),
            Err(SixDegreesError::NotFound { .. }) => ConnectionOutcome::NotConnected {
                max_depth: self.finder.limits().max_depth,
            },
            Err(SixDegreesError::Timeout(_)) => ConnectionOutcome::TimedOut,
            Err(e) => {
                if !e.is_search_outcome() {
                    tracing::warn!(error = %e, "Connection lookup failed");
                }
                ConnectionOutcome::UnverifiedIdentity
            }
        }
    }

    /// Resolve `"123"` or `"@handle"` to an identity
    ///
    /// Numeric input is only range-checked; handles are looked up through
    /// the provider.
    pub async fn resolve_identifier(&self, input: &str) -> Result<Identity> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SixDegreesError::InvalidInput("empty identifier".to_string()));
        }

        if let Ok(raw) = input.parse::<i64>() {
            return Identity::new(raw).ok_or_else(|| {
                SixDegreesError::InvalidInput(format!("identity must be positive, got {}", raw))
            });
        }

        let handle = normalize_handle(input);
        if handle.is_empty() {
            return Err(SixDegreesError::InvalidInput(format!("invalid handle: {}", input)));
        }

        match self.finder.provider().user_by_handle(handle).await {
            Ok(user) => {
                tracing::debug!(handle, identity = %user.identity, "Handle resolved");
                Ok(user.identity)
            }
            Err(ProviderError::NotFound(_)) => Err(SixDegreesError::InvalidInput(format!(
                "unknown handle @{}",
                handle
            ))),
            Err(e) => Err(SixDegreesError::ProviderUnavailable(e.to_string())),
        }
    }

    /// Profiles for every identity on `path`, in order
    ///
    /// Lookups run concurrently; an identity the provider cannot resolve gets
    /// a placeholder profile.
    pub async fn describe_path(&self, path: &ConnectionPath) -> Vec<UserProfile> {
        let provider = self.finder.provider();
        let lookups = path.identities().iter().map(|identity| async move {
            match provider.user_by_identity(*identity).await {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!(identity = %identity, error = %e, "Profile lookup failed");
                    UserProfile::new(*identity, format!("fid{}", identity))
                }
            }
        });
        futures::future::join_all(lookups).await
    }

    /// Clear the connection store (development only)
    pub async fn reset(&self) -> Result<()> {
        self.finder.store().reset_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ConnectionStore, SearchFilter};
    use crate::config::OperatingMode;
    use crate::graph::SnapshotProvider;
    use std::sync::Arc;

    fn id(raw: i64) -> Identity {
        Identity::new(raw).unwrap()
    }

    async fn service(provider: SnapshotProvider) -> ConnectionService<Arc<SnapshotProvider>> {
        let store = ConnectionStore::in_memory(OperatingMode::Development)
            .await
            .unwrap();
        ConnectionService::new(PathFinder::new(Arc::new(provider), store))
    }

    #[tokio::test]
    async fn test_resolve_records_search() {
        let service = service(SnapshotProvider::from_follows([(1, 2), (2, 3)])).await;
        let path = service.resolve(1, 3).await.unwrap();

        let records = service
            .finder()
            .store()
            .recent_searches(SearchFilter::pair(id(1), id(3)))
            .await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].searcher, id(1));
        assert_eq!(records[0].path(), Some(path));
    }

    #[tokio::test]
    async fn test_self_match_not_recorded() {
        let service = service(SnapshotProvider::new()).await;
        let outcome = service.connect(5, 5).await;

        assert_eq!(outcome.degree(), Some(0));
        assert_eq!(outcome.message(), "That's you!");
        let stats = service.finder().store().stats().await.unwrap();
        assert_eq!(stats.search_count, 0);
    }

    #[tokio::test]
    async fn test_outcome_messages() {
        let service = service(SnapshotProvider::from_follows([(1, 2), (3, 4)])).await;

        let connected = service.connect(1, 2).await;
        assert_eq!(connected.degree(), Some(1));

        let missing = service.connect(1, 4).await;
        assert_eq!(missing, ConnectionOutcome::NotConnected { max_depth: 6 });
        assert_eq!(missing.message(), "No connection found within 6 degrees.");

        let invalid = service.connect(0, 4).await;
        assert_eq!(invalid, ConnectionOutcome::UnverifiedIdentity);
        assert_eq!(invalid.message(), "Could not verify identity.");
    }

    #[tokio::test]
    async fn test_resolve_identifier() {
        let provider = SnapshotProvider::from_follows([(1, 2)])
            .with_user(UserProfile::new(id(2), "bob"));
        let service = service(provider).await;

        assert_eq!(service.resolve_identifier("42").await.unwrap(), id(42));
        assert_eq!(service.resolve_identifier("@bob").await.unwrap(), id(2));
        assert_eq!(service.resolve_identifier(" Bob ").await.unwrap(), id(2));
        assert!(matches!(
            service.resolve_identifier("-1").await,
            Err(SixDegreesError::InvalidInput(_))
        ));
        assert!(matches!(
            service.resolve_identifier("@nobody").await,
            Err(SixDegreesError::InvalidInput(_))
        ));
        assert!(matches!(
            service.resolve_identifier("  ").await,
            Err(SixDegreesError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_identifiers() {
        let provider = SnapshotProvider::from_follows([(1, 2), (2, 3)])
            .with_user(UserProfile::new(id(3), "carol"));
        let service = service(provider).await;

        let outcome = service.connect_identifiers("1", "@carol").await;
        assert_eq!(outcome.degree(), Some(2));
    }

    #[tokio::test]
    async fn test_describe_path() {
        let provider = SnapshotProvider::from_follows([(1, 2)])
            .with_user(UserProfile::new(id(1), "alice").with_display_name("Alice"));
        let service = service(provider).await;

        let path = ConnectionPath::from_identities(vec![id(1), id(2), id(99)]).unwrap();
        let profiles = service.describe_path(&path).await;

        assert_eq!(profiles.len(), 3);
        assert_eq!(profiles[0].display_name, "Alice");
        assert_eq!(profiles[1].handle, "fid2");
        assert_eq!(profiles[2].identity, id(99));
    }

    #[tokio::test]
    async fn test_reset() {
        let service = service(SnapshotProvider::from_follows([(1, 2)])).await;
        service.resolve(1, 2).await.unwrap();
        service.reset().await.unwrap();

        let stats = service.finder().store().stats().await.unwrap();
        assert_eq!(stats.edge_count, 0);
        assert_eq!(stats.search_count, 0);
    }
}
