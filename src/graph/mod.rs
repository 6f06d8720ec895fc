//! Core graph data structures
//!
//! Defines Identity, ConnectionPath, UserProfile, and the GraphProvider
//! abstraction over the remote follow graph.

mod ids;
mod path;
pub mod provider;
mod snapshot;
mod user;

pub use ids::Identity;
pub use path::ConnectionPath;
pub use provider::{GraphProvider, ProviderError};
pub use snapshot::SnapshotProvider;
pub use user::{normalize_handle, UserProfile};
