//! Graph provider abstraction
//!
//! The provider is the remote source of truth for follow relations and
//! identity lookups. Path finding only ever talks to it through this trait,
//! so the Neynar backend, the offline snapshot and test doubles are
//! interchangeable.

use super::{Identity, UserProfile};
use crate::integrations::retry::{RetryDecision, RetryableError};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from a single provider call
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("provider API error: {0}")]
    Api(String),

    #[error("malformed provider response: {0}")]
    Decode(String),
}

impl RetryableError for ProviderError {
    fn retry_decision(&self) -> RetryDecision {
        match self {
            ProviderError::Network(_) => RetryDecision::Retry,
            ProviderError::RateLimited(secs) => {
                RetryDecision::RetryAfter(Duration::from_secs(*secs))
            }
            ProviderError::Api(msg) if msg.starts_with("HTTP 5") => RetryDecision::Retry,
            ProviderError::NotFound(_)
            | ProviderError::Auth(_)
            | ProviderError::Api(_)
            | ProviderError::Decode(_) => RetryDecision::NoRetry,
        }
    }
}

/// Read access to a follow graph
///
/// Neighbor lists are returned raw: they may contain duplicates, zeros or
/// negative values. Callers filter them through [`Identity::new`].
#[async_trait]
pub trait GraphProvider: Send + Sync {
    /// Identities that follow `identity`
    async fn followers(&self, identity: Identity) -> Result<Vec<i64>, ProviderError>;

    /// Identities that `identity` follows
    async fn following(&self, identity: Identity) -> Result<Vec<i64>, ProviderError>;

    /// Resolve an identity to its profile; `NotFound` if unknown
    async fn user_by_identity(&self, identity: Identity) -> Result<UserProfile, ProviderError>;

    /// Resolve a handle (with or without `@`) to its profile; `NotFound` if unknown
    async fn user_by_handle(&self, handle: &str) -> Result<UserProfile, ProviderError>;
}

#[async_trait]
impl<P: GraphProvider + ?Sized> GraphProvider for std::sync::Arc<P> {
    async fn followers(&self, identity: Identity) -> Result<Vec<i64>, ProviderError> {
        (**self).followers(identity).await
    }

    async fn following(&self, identity: Identity) -> Result<Vec<i64>, ProviderError> {
        (**self).following(identity).await
    }

    async fn user_by_identity(&self, identity: Identity) -> Result<UserProfile, ProviderError> {
        (**self).user_by_identity(identity).await
    }

    async fn user_by_handle(&self, handle: &str) -> Result<UserProfile, ProviderError> {
        (**self).user_by_handle(handle).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert_eq!(
            ProviderError::Network("reset".into()).retry_decision(),
            RetryDecision::Retry
        );
        assert_eq!(
            ProviderError::RateLimited(30).retry_decision(),
            RetryDecision::RetryAfter(Duration::from_secs(30))
        );
        assert_eq!(
            ProviderError::Api("HTTP 503: unavailable".into()).retry_decision(),
            RetryDecision::Retry
        );
        assert_eq!(
            ProviderError::Api("HTTP 400: bad fid".into()).retry_decision(),
            RetryDecision::NoRetry
        );
        assert_eq!(
            ProviderError::NotFound("fid 1".into()).retry_decision(),
            RetryDecision::NoRetry
        );
    }
}
