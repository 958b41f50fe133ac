//! Failure descriptor for retry classification.

use std::time::Duration;
use thiserror::Error;

/// Error raised by a single fetch attempt (transport failure, API rejection,
/// or a payload that fails validation). Carries everything the retry policy
/// needs to classify the failure before it is converted to anyhow at the
/// caller boundary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    /// Network-level failure: timeout, connection refused, DNS, reset.
    #[error("network: {0}")]
    Network(String),

    /// Server-side failure (5xx-equivalent).
    #[error("server error: HTTP {0}")]
    Server(u16),

    /// Server asked us to slow down (429-equivalent). May carry a
    /// server-suggested wait.
    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Authentication or authorization rejected. Will not clear on retry.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Unknown resource (e.g. ticker the API has never heard of).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request was malformed before it ever left (empty ticker, bad format).
    #[error("invalid request: {0}")]
    Validation(String),

    /// Transport said success but the payload violates the data contract
    /// (missing, non-numeric, or negative price).
    #[error("bad payload: {0}")]
    DataContract(String),

    /// Anything we could not map. Treated as permanent so an unmapped
    /// condition blocks instead of retrying forever.
    #[error("{0}")]
    Unknown(String),
}

impl FetchError {
    /// Server-suggested wait, present only on rate-limit failures that
    /// carried one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            FetchError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Why a retry sequence stopped without a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A permanent failure; retrying the same request cannot help.
    Permanent,
    /// Rate limit under fail-fast policy; caller should switch strategy.
    RateLimited,
    /// Transient failures all the way to the attempt ceiling.
    Exhausted,
    /// Caller aborted during a backoff wait.
    Cancelled,
}

/// Terminal failure of a full retry sequence: the last classified error,
/// how many attempts were made, and why we stopped. Intermediate transient
/// failures are absorbed; this is all the caller ever sees.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{error} (after {attempts} attempt(s))")]
pub struct FetchFailure {
    /// Descriptor of the last attempt's failure.
    #[source]
    pub error: FetchError,
    /// Total attempts made, including the first.
    pub attempts: u32,
    /// Terminal state the sequence ended in.
    pub reason: StopReason,
    /// Total backoff actually waited across the sequence.
    pub waited: Duration,
}
