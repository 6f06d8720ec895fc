//! Neynar (Farcaster) API client for Rust
//!
//! A typed async interface to the subset of the Neynar v2 REST API needed
//! to walk the Farcaster follow graph: follower/following pages and user
//! lookups by FID or username.
//!
//! # Example
//!
//! ```no_run
//! use neynar::Client;
//!
//! # async fn run() -> neynar::Result<()> {
//! let client = Client::new("NEYNAR_API_DOCS")?;
//!
//! // First page of followers for dwr.eth
//! let page = client.followers_page(3, None).await?;
//! println!("{} followers, more: {}", page.fids.len(), page.next_cursor.is_some());
//!
//! // Resolve a username
//! let user = client.user_by_username("@vitalik.eth").await?;
//! println!("{} -> {}", user.username, user.fid);
//! # Ok(())
//! # }
//! ```

use reqwest::{header, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.neynar.com/v2/farcaster";

/// Maximum page size accepted by the follows endpoints
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors that can occur when talking to Neynar
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Neynar API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for Neynar operations
pub type Result<T> = std::result::Result<T, Error>;

/// A Farcaster user as returned by Neynar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub fid: u64,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub pfp_url: Option<String>,
}

impl User {
    /// Display name, falling back to the username
    pub fn display(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }

    /// Avatar URL, falling back to the Warpcast avatar redirect
    pub fn avatar(&self) -> String {
        match self.pfp_url.as_deref() {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!("https://warpcast.com/~/avatar/{}", self.fid),
        }
    }
}

/// One page of a follower or following listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowPage {
    /// Raw FIDs in the order the API returned them (may contain duplicates or zeros)
    pub fids: Vec<i64>,
    /// Cursor for the next page, if any
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FollowResponse {
    #[serde(default)]
    users: Vec<serde_json::Value>,
    #[serde(default)]
    next: Option<NextCursor>,
}

#[derive(Debug, Deserialize)]
struct NextCursor {
    #[serde(default)]
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BulkUsersResponse {
    #[serde(default)]
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    user: Option<User>,
}

/// Which side of the follow relation to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Followers,
    Following,
}

impl Direction {
    fn endpoint(self) -> &'static str {
        match self {
            Direction::Followers => "followers",
            Direction::Following => "following",
        }
    }

    /// Key used by older response shapes to nest the counterpart user
    fn nested_key(self) -> &'static str {
        match self {
            Direction::Followers => "follower",
            Direction::Following => "following",
        }
    }
}

/// Neynar REST client
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    page_size: u32,
}

impl Client {
    /// Create a client authenticated with the given API key
    pub fn new(api_key: impl AsRef<str>) -> Result<Self> {
        Self::with_timeout(api_key, Duration::from_secs(15))
    }

    /// Create a client with a custom per-request timeout
    pub fn with_timeout(api_key: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("sixdegrees/1.0"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let mut key = header::HeaderValue::from_str(api_key.as_ref())
            .map_err(|e| Error::Auth(format!("invalid API key: {}", e)))?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
        })
    }

    /// Point the client at a different API root (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the follows page size (clamped to 1..=100)
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one page of users following `fid`
    pub async fn followers_page(&self, fid: u64, cursor: Option<&str>) -> Result<FollowPage> {
        self.follow_page(Direction::Followers, fid, cursor).await
    }

    /// Fetch one page of users `fid` follows
    pub async fn following_page(&self, fid: u64, cursor: Option<&str>) -> Result<FollowPage> {
        self.follow_page(Direction::Following, fid, cursor).await
    }

    /// Fetch one page of a follow listing in the given direction
    pub async fn follow_page(
        &self,
        direction: Direction,
        fid: u64,
        cursor: Option<&str>,
    ) -> Result<FollowPage> {
        let url = format!("{}/{}", self.base_url, direction.endpoint());
        let mut query = vec![
            ("fid", fid.to_string()),
            ("limit", self.page_size.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let response = self.http.get(&url).query(&query).send().await?;
        let body = check_status(response, || format!("fid {}", fid)).await?;
        let parsed: FollowResponse = serde_json::from_str(&body)?;

        Ok(FollowPage {
            fids: parsed
                .users
                .iter()
                .filter_map(|entry| extract_fid(entry, direction))
                .collect(),
            next_cursor: parsed
                .next
                .and_then(|n| n.cursor)
                .filter(|c| !c.is_empty()),
        })
    }

    /// Look up a single user by FID via the bulk endpoint
    pub async fn user_by_fid(&self, fid: u64) -> Result<User> {
        let url = format!("{}/user/bulk", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("fids", fid.to_string())])
            .send()
            .await?;
        let body = check_status(response, || format!("fid {}", fid)).await?;
        let parsed: BulkUsersResponse = serde_json::from_str(&body)?;

        parsed
            .users
            .into_iter()
            .find(|u| u.fid == fid)
            .ok_or_else(|| Error::NotFound(format!("fid {}", fid)))
    }

    /// Look up a user by username (a leading `@` is ignored)
    pub async fn user_by_username(&self, username: &str) -> Result<User> {
        let clean = username.trim().trim_start_matches('@');
        if clean.is_empty() {
            return Err(Error::NotFound("empty username".to_string()));
        }

        let url = format!("{}/user/by_username", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("username", clean)])
            .send()
            .await?;
        let body = check_status(response, || format!("@{}", clean)).await?;
        let parsed: UserResponse = serde_json::from_str(&body)?;

        parsed
            .user
            .ok_or_else(|| Error::NotFound(format!("@{}", clean)))
    }
}

/// Map non-success statuses onto typed errors, returning the body on success
async fn check_status(
    response: reqwest::Response,
    subject: impl FnOnce() -> String,
) -> Result<String> {
    let status = response.status();
    match status {
        s if s.is_success() => Ok(response.text().await?),
        StatusCode::NOT_FOUND => Err(Error::NotFound(subject())),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(Error::Auth(format!("HTTP {}", status.as_u16())))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(60);
            Err(Error::RateLimited(retry_after))
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Api {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Pull the counterpart FID out of one follow entry.
///
/// Current responses look like `{"object": "follow", "user": {"fid": 1, ...}}`;
/// older ones put `fid` at the top level or nest the user under
/// `follower`/`following`. Entries without a numeric fid yield `None`.
fn extract_fid(entry: &serde_json::Value, direction: Direction) -> Option<i64> {
    let candidates = [
        entry.get("user").and_then(|u| u.get("fid")),
        entry.get("fid"),
        entry
            .get(direction.nested_key())
            .and_then(|u| u.get("fid")),
    ];

    candidates.into_iter().flatten().find_map(as_fid)
}

fn as_fid(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_defaults() {
        let client = Client::new("test-key").unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_with_base_url_trims_slash() {
        let client = Client::new("test-key")
            .unwrap()
            .with_base_url("http://localhost:9000/v2/");
        assert_eq!(client.base_url(), "http://localhost:9000/v2");
    }

    #[test]
    fn test_page_size_clamped() {
        let client = Client::new("k").unwrap().with_page_size(500);
        assert_eq!(client.page_size, 100);
        let client = Client::new("k").unwrap().with_page_size(0);
        assert_eq!(client.page_size, 1);
    }

    #[test]
    fn test_invalid_api_key_rejected() {
        let result = Client::new("bad\nkey");
        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[test]
    fn test_extract_fid_shapes() {
        let current = json!({"object": "follow", "user": {"fid": 42, "username": "a"}});
        let flat = json!({"fid": 7});
        let nested = json!({"follower": {"fid": "19"}});
        let junk = json!({"user": {"fid": "abc"}});
        let empty = json!({"object": "follow"});

        assert_eq!(extract_fid(&current, Direction::Followers), Some(42));
        assert_eq!(extract_fid(&flat, Direction::Following), Some(7));
        assert_eq!(extract_fid(&nested, Direction::Followers), Some(19));
        assert_eq!(extract_fid(&nested, Direction::Following), None);
        assert_eq!(extract_fid(&junk, Direction::Followers), None);
        assert_eq!(extract_fid(&empty, Direction::Followers), None);
    }

    #[test]
    fn test_follow_response_decoding() {
        let body = r#"{
            "users": [
                {"object": "follow", "user": {"fid": 2, "username": "b"}},
                {"object": "follow", "user": {"fid": 3, "username": "c"}},
                {"object": "follow"}
            ],
            "next": {"cursor": "abc"}
        }"#;
        let parsed: FollowResponse = serde_json::from_str(body).unwrap();
        let fids: Vec<i64> = parsed
            .users
            .iter()
            .filter_map(|e| extract_fid(e, Direction::Following))
            .collect();
        assert_eq!(fids, vec![2, 3]);
        assert_eq!(parsed.next.unwrap().cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn test_user_display_fallbacks() {
        let user = User {
            fid: 5650,
            username: "vitalik.eth".to_string(),
            display_name: Some(String::new()),
            pfp_url: None,
        };
        assert_eq!(user.display(), "vitalik.eth");
        assert_eq!(user.avatar(), "https://warpcast.com/~/avatar/5650");
    }

    #[test]
    fn test_direction_endpoints() {
        assert_eq!(Direction::Followers.endpoint(), "followers");
        assert_eq!(Direction::Following.endpoint(), "following");
    }
}
