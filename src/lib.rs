//! Six Degrees - shortest follow paths through the Farcaster social graph
//!
//! Finds the shortest chain of follow relationships between two accounts
//! with a bounded breadth-first search over a remote graph provider,
//! caching every edge it sees in SQLite so repeat searches get cheaper.
//!
//! # Architecture
//!
//! - **graph**: Core types (Identity, ConnectionPath, UserProfile) and the GraphProvider trait
//! - **cache**: ConnectionStore, the SQLite edge cache and search log
//! - **search**: PathFinder (bounded BFS) and ConnectionService (orchestration)
//! - **integrations**: Neynar-backed provider and retry policy
//! - **config**: YAML configuration
//!
//! # Example
//!
//! ```no_run
//! use sixdegrees::cache::ConnectionStore;
//! use sixdegrees::config::OperatingMode;
//! use sixdegrees::graph::SnapshotProvider;
//! use sixdegrees::search::{ConnectionService, PathFinder};
//!
//! # async fn run() -> sixdegrees::Result<()> {
//! let provider = SnapshotProvider::load("graph.json")?;
//! let store = ConnectionStore::in_memory(OperatingMode::Development).await?;
//! let service = ConnectionService::new(PathFinder::new(provider, store));
//!
//! let outcome = service.connect(1, 3).await;
//! println!("{}", outcome.message());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod integrations;
pub mod logging;
pub mod search;

pub use error::{Result, SixDegreesError};
