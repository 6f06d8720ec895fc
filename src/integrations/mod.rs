//! External integrations
//!
//! The Neynar-backed [`GraphProvider`](crate::graph::GraphProvider) and the
//! retry policy wrapped around its calls.

pub mod neynar;
pub mod retry;

pub use self::neynar::NeynarProvider;
pub use retry::{with_retry, RetryConfig, RetryDecision, RetryableError};
