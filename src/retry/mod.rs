//! Retry and backoff policy.
//!
//! This module encapsulates failure classification (transient vs permanent)
//! and exponential backoff decisions so the client can apply one consistent
//! policy per fetch sequence. The fetch collaborator stays a black box; the
//! engine only requires its failures to arrive as `FetchError`.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_http_status, FailureClass};
pub use error::{FetchError, FetchFailure, StopReason};
pub use policy::{RateLimitMode, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, Sleeper, ThreadSleeper};
