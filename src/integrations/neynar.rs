//! Neynar-backed graph provider
//!
//! Wraps the `neynar` client crate: follow listings are paged up to a
//! configurable number of pages and every call goes through the retry
//! policy.

use super::retry::{with_retry, RetryConfig};
use crate::config::NeynarSettings;
use crate::graph::{GraphProvider, Identity, ProviderError, UserProfile};
use crate::{Result, SixDegreesError};
use async_trait::async_trait;
use neynar::{Direction, FollowPage};
use std::future::Future;
use std::time::Duration;

/// Follow-graph provider talking to the Neynar REST API
#[derive(Debug, Clone)]
pub struct NeynarProvider {
    client: neynar::Client,
    retry: RetryConfig,
    max_pages: usize,
}

impl NeynarProvider {
    pub fn new(client: neynar::Client) -> Self {
        Self {
            client,
            retry: RetryConfig::default(),
            max_pages: 1,
        }
    }

    /// Build from settings, reading the API key from the configured
    /// environment variable
    pub fn from_settings(settings: &NeynarSettings) -> Result<Self> {
        let api_key = std::env::var(&settings.api_key_env).map_err(|_| {
            SixDegreesError::Config(format!(
                "Neynar API key not set (expected in ${})",
                settings.api_key_env
            ))
        })?;

        let client = neynar::Client::with_timeout(
            api_key,
            Duration::from_secs(settings.request_timeout_secs),
        )
        .map_err(|e| SixDegreesError::Config(e.to_string()))?
        .with_base_url(settings.base_url.clone())
        .with_page_size(settings.page_size);

        tracing::debug!(
            base_url = %settings.base_url,
            page_size = settings.page_size,
            max_pages = settings.max_pages,
            "Neynar provider configured"
        );

        Ok(Self::new(client)
            .with_retry(RetryConfig::default().with_max_retries(settings.max_retries))
            .with_max_pages(settings.max_pages))
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Pages fetched per listing; at least one
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    async fn listing(
        &self,
        direction: Direction,
        identity: Identity,
    ) -> std::result::Result<Vec<i64>, ProviderError> {
        let fid = identity.get() as u64;
        let operation = match direction {
            Direction::Followers => "neynar.followers",
            Direction::Following => "neynar.following",
        };

        collect_pages(identity, direction, self.max_pages, move |cursor| {
            with_retry(&self.retry, operation, move || {
                let cursor = cursor.clone();
                async move {
                    self.client
                        .follow_page(direction, fid, cursor.as_deref())
                        .await
                        .map_err(ProviderError::from)
                }
            })
        })
        .await
    }
}

/// Walk follow pages until the cursor runs out or `max_pages` is reached.
///
/// A failed first page is an error. A later failure keeps whatever the
/// earlier pages returned.
async fn collect_pages<F, Fut>(
    identity: Identity,
    direction: Direction,
    max_pages: usize,
    mut fetch: F,
) -> std::result::Result<Vec<i64>, ProviderError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = std::result::Result<FollowPage, ProviderError>>,
{
    let mut fids = Vec::new();
    let mut cursor: Option<String> = None;
    for page_number in 0..max_pages {
        let page = match fetch(cursor.take()).await {
            Ok(page) => page,
            Err(e) if page_number == 0 => return Err(e),
            Err(e) => {
                tracing::warn!(
                    identity = %identity,
                    ?direction,
                    page = page_number,
                    kept = fids.len(),
                    error = %e,
                    "Follow page failed, keeping earlier pages"
                );
                break;
            }
        };

        tracing::trace!(
            identity = %identity,
            ?direction,
            page = page_number,
            count = page.fids.len(),
            "Fetched follow page"
        );
        fids.extend(page.fids);

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    Ok(fids)
}

#[async_trait]
impl GraphProvider for NeynarProvider {
    async fn followers(&self, identity: Identity) -> std::result::Result<Vec<i64>, ProviderError> {
        self.listing(Direction::Followers, identity).await
    }

    async fn following(&self, identity: Identity) -> std::result::Result<Vec<i64>, ProviderError> {
        self.listing(Direction::Following, identity).await
    }

    async fn user_by_identity(
        &self,
        identity: Identity,
    ) -> std::result::Result<UserProfile, ProviderError> {
        let fid = identity.get() as u64;
        let user = with_retry(&self.retry, "neynar.user_by_fid", || async move {
            self.client
                .user_by_fid(fid)
                .await
                .map_err(ProviderError::from)
        })
        .await?;
        profile_from(user)
    }

    async fn user_by_handle(&self, handle: &str) -> std::result::Result<UserProfile, ProviderError> {
        let user = with_retry(&self.retry, "neynar.user_by_username", || async move {
            self.client
                .user_by_username(handle)
                .await
                .map_err(ProviderError::from)
        })
        .await?;
        profile_from(user)
    }
}

impl From<neynar::Error> for ProviderError {
    fn from(err: neynar::Error) -> Self {
        match err {
            neynar::Error::NotFound(what) => ProviderError::NotFound(what),
            neynar::Error::Auth(msg) => ProviderError::Auth(msg),
            neynar::Error::RateLimited(secs) => ProviderError::RateLimited(secs),
            neynar::Error::Api { status, body } => {
                ProviderError::Api(format!("HTTP {}: {}", status, body))
            }
            neynar::Error::Network(e) => ProviderError::Network(e.to_string()),
            neynar::Error::Decode(e) => ProviderError::Decode(e.to_string()),
        }
    }
}

fn profile_from(user: neynar::User) -> std::result::Result<UserProfile, ProviderError> {
    let identity = Identity::try_from(user.fid).map_err(ProviderError::Decode)?;

    Ok(UserProfile::new(identity, user.username.as_str())
        .with_display_name(user.display())
        .with_avatar_url(user.avatar()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::retry::{RetryDecision, RetryableError};

    fn user(fid: u64, username: &str) -> neynar::User {
        neynar::User {
            fid,
            username: username.to_string(),
            display_name: None,
            pfp_url: None,
        }
    }

    #[test]
    fn test_profile_from_user() {
        let mut u = user(3, "dwr.eth");
        u.display_name = Some("Dan Romero".into());
        u.pfp_url = Some("https://example.com/dwr.png".into());

        let profile = profile_from(u).unwrap();
        assert_eq!(profile.identity.get(), 3);
        assert_eq!(profile.handle, "dwr.eth");
        assert_eq!(profile.display_name, "Dan Romero");
        assert_eq!(profile.avatar_url, "https://example.com/dwr.png");
    }

    #[test]
    fn test_profile_fallbacks() {
        let profile = profile_from(user(5, "v")).unwrap();
        assert_eq!(profile.display_name, "v");
        assert!(profile.avatar_url.ends_with("/avatar/5"));
    }

    #[test]
    fn test_profile_rejects_invalid_fid() {
        assert!(matches!(
            profile_from(user(0, "zero")),
            Err(ProviderError::Decode(_))
        ));
        assert!(matches!(
            profile_from(user(u64::MAX, "huge")),
            Err(ProviderError::Decode(_))
        ));
    }

    #[test]
    fn test_error_mapping() {
        let api: ProviderError = neynar::Error::Api {
            status: 503,
            body: "busy".into(),
        }
        .into();
        assert_eq!(api.retry_decision(), RetryDecision::Retry);

        let limited: ProviderError = neynar::Error::RateLimited(7).into();
        assert_eq!(
            limited.retry_decision(),
            RetryDecision::RetryAfter(Duration::from_secs(7))
        );

        let missing: ProviderError = neynar::Error::NotFound("fid 1".into()).into();
        assert!(matches!(missing, ProviderError::NotFound(_)));
    }

    #[test]
    fn test_from_settings_requires_api_key() {
        let settings = NeynarSettings {
            api_key_env: "SIXDEGREES_TEST_UNSET_NEYNAR_KEY".to_string(),
            ..Default::default()
        };
        let result = NeynarProvider::from_settings(&settings);
        assert!(matches!(result, Err(SixDegreesError::Config(_))));
    }

    fn page(fids: &[i64], next: Option<&str>) -> FollowPage {
        FollowPage {
            fids: fids.to_vec(),
            next_cursor: next.map(str::to_string),
        }
    }

    fn identity(raw: i64) -> Identity {
        Identity::new(raw).unwrap()
    }

    #[tokio::test]
    async fn test_collect_pages_follows_cursor() {
        let mut seen = Vec::new();
        let fids = collect_pages(identity(1), Direction::Followers, 5, |cursor| {
            seen.push(cursor.clone());
            let result = match cursor.as_deref() {
                None => Ok(page(&[2, 3], Some("c1"))),
                Some("c1") => Ok(page(&[4], None)),
                Some(other) => Err(ProviderError::Api(format!("unexpected cursor {}", other))),
            };
            async move { result }
        })
        .await
        .unwrap();

        assert_eq!(fids, vec![2, 3, 4]);
        assert_eq!(seen, vec![None, Some("c1".to_string())]);
    }

    #[tokio::test]
    async fn test_collect_pages_stops_at_max_pages() {
        let mut calls = 0;
        let fids = collect_pages(identity(1), Direction::Following, 2, |_| {
            calls += 1;
            async move { Ok(page(&[calls], Some("more"))) }
        })
        .await
        .unwrap();

        assert_eq!(fids, vec![1, 2]);
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_collect_pages_keeps_earlier_pages_on_later_failure() {
        let fids = collect_pages(identity(1), Direction::Followers, 3, |cursor| {
            let result = match cursor {
                None => Ok(page(&[10, 11, 12], Some("c1"))),
                Some(_) => Err(ProviderError::Api("HTTP 500: boom".into())),
            };
            async move { result }
        })
        .await
        .unwrap();

        assert_eq!(fids, vec![10, 11, 12]);
    }

    #[tokio::test]
    async fn test_collect_pages_first_page_failure_is_error() {
        let result = collect_pages(identity(1), Direction::Followers, 3, |_| async {
            Err::<FollowPage, _>(ProviderError::Network("reset".into()))
        })
        .await;

        assert!(matches!(result, Err(ProviderError::Network(_))));
    }

    #[test]
    fn test_max_pages_at_least_one() {
        let client = neynar::Client::new("test-key").unwrap();
        let provider = NeynarProvider::new(client).with_max_pages(0);
        assert_eq!(provider.max_pages, 1);
    }
}
