//! Path search
//!
//! [`PathFinder`] runs the bounded BFS; [`ConnectionService`] sits in front
//! of it for callers that need validation and presentable outcomes.

mod connection;
mod pathfinder;

pub use connection::{ConnectionOutcome, ConnectionService};
pub use pathfinder::{PathFinder, SearchLimits};
