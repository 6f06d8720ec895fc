//! Connection cache
//!
//! SQLite-backed store of observed follow edges and a log of past search
//! results. Used as a warm cache in front of the graph provider; it is
//! advisory, never a source of truth.

mod sqlite;

pub use sqlite::{ConnectionStore, Edge, SearchFilter, SearchRecord, StoreConfig, StoreStats};
