//! Error types for Six Degrees
//!
//! Defines the crate-wide error enum. Only `InvalidInput`,
//! `ProviderUnavailable`, `NotFound` and `Timeout` are expected to surface
//! from a search; the rest are ambient failures (config, storage, I/O).
//! Uses thiserror for ergonomic error handling.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for Six Degrees operations
pub type Result<T> = std::result::Result<T, SixDegreesError>;

/// Comprehensive error type for Six Degrees operations
#[derive(Error, Debug)]
pub enum SixDegreesError {
    /// Missing, zero or negative identity handed to a search
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The graph provider could not be reached for the lookups a search needs up front
    #[error("Graph provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Search space exhausted without reaching the target
    #[error(
        "No path found after exploring {explored} nodes (max depth reached: {max_depth_reached}{})",
        limit_suffix(.node_limit_hit)
    )]
    NotFound {
        explored: usize,
        max_depth_reached: usize,
        node_limit_hit: bool,
    },

    /// Wall-clock budget exceeded
    #[error("Path finding timed out after {} seconds", whole_secs(.0))]
    Timeout(Duration),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Destructive operation refused in the current operating mode
    #[error("Operation not permitted: {0}")]
    Forbidden(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// SQLite database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

fn limit_suffix(hit: &bool) -> &'static str {
    if *hit {
        ", node limit hit"
    } else {
        ""
    }
}

fn whole_secs(duration: &Duration) -> u64 {
    duration.as_secs()
}

/// Shown when the time budget ran out
pub const MSG_TIMED_OUT: &str = "Search timed out, try again.";
/// Shown when an identity could not be validated or looked up
pub const MSG_UNVERIFIED: &str = "Could not verify identity.";
/// Shown for a self-match
pub const MSG_SELF: &str = "That's you!";

/// Shown when no connection exists within the search bounds
pub fn not_connected_message(max_depth: usize) -> String {
    format!("No connection found within {} degrees.", max_depth)
}

impl SixDegreesError {
    /// Whether this is one of the errors a search is allowed to hand back to callers
    pub fn is_search_outcome(&self) -> bool {
        matches!(
            self,
            SixDegreesError::InvalidInput(_)
                | SixDegreesError::ProviderUnavailable(_)
                | SixDegreesError::NotFound { .. }
                | SixDegreesError::Timeout(_)
        )
    }

    /// User-facing text for this error. Never exposes internal detail.
    pub fn user_message(&self, max_depth: usize) -> String {
        match self {
            SixDegreesError::NotFound { .. } => not_connected_message(max_depth),
            SixDegreesError::Timeout(_) => MSG_TIMED_OUT.to_string(),
            _ => MSG_UNVERIFIED.to_string(),
        }
    }
}
