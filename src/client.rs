//! Price client: ties a source, a retry policy, and a sleeper into the
//! caller-facing fetch operation.

use std::sync::atomic::AtomicBool;

use crate::retry::{run_with_retry, FetchFailure, RetryPolicy, Sleeper, ThreadSleeper};
use crate::source::PriceSource;

/// Client for fetching prices with automatic retry of transient failures.
///
/// The policy is fixed at construction and shared by every call; each call
/// owns its own attempt counter and wait accumulator, so concurrent callers
/// need no locking.
pub struct PriceClient<S> {
    source: S,
    policy: RetryPolicy,
    sleeper: Box<dyn Sleeper + Send + Sync>,
}

impl<S: PriceSource> PriceClient<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self {
            source,
            policy,
            sleeper: Box::new(ThreadSleeper),
        }
    }

    /// Replace the suspension mechanism (tests inject a fake so no
    /// wall-clock time elapses).
    pub fn with_sleeper(mut self, sleeper: impl Sleeper + Send + Sync + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch the price for `ticker`, retrying transient failures per the
    /// policy. Returns the validated price, or the final classified failure
    /// with an accurate attempt count.
    pub fn get_price(&self, ticker: &str) -> Result<f64, FetchFailure> {
        let abort = AtomicBool::new(false);
        self.get_price_with_abort(ticker, &abort)
    }

    /// Like `get_price`, but checks `abort` at each backoff wait so the
    /// caller can abandon the sequence between attempts.
    pub fn get_price_with_abort(
        &self,
        ticker: &str,
        abort: &AtomicBool,
    ) -> Result<f64, FetchFailure> {
        run_with_retry(&self.policy, &*self.sleeper, abort, || {
            self.source.fetch_quote(ticker)?.validate()
        })
    }
}
