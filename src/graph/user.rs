//! Human-readable profile for a graph identity

use super::Identity;
use serde::{Deserialize, Serialize};

/// Profile details the provider resolves for an identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub identity: Identity,
    /// Handle without the leading `@`
    pub handle: String,
    pub display_name: String,
    pub avatar_url: String,
}

impl UserProfile {
    pub fn new(identity: Identity, handle: impl Into<String>) -> Self {
        let handle = normalize_handle(&handle.into()).to_string();
        Self {
            identity,
            display_name: handle.clone(),
            avatar_url: format!("https://warpcast.com/~/avatar/{}", identity),
            handle,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = avatar_url.into();
        self
    }

    /// `@handle` form for display
    pub fn at_handle(&self) -> String {
        format!("@{}", self.handle)
    }
}

/// Strip surrounding whitespace and a leading `@`
pub fn normalize_handle(handle: &str) -> &str {
    handle.trim().trim_start_matches('@')
}
