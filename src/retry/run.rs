//! Retry loop: run a fetch closure until success or the policy says stop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::error::{FetchError, FetchFailure, StopReason};
use super::policy::{RetryDecision, RetryPolicy};

/// Suspension mechanism for the waiting state. Separated from the delay
/// computation so tests can observe backoff without real elapsed time.
pub trait Sleeper {
    /// Sleep for `delay`, waking early if `abort` is set. Returns false if
    /// the sleep was cut short by an abort request.
    fn sleep(&self, delay: Duration, abort: &AtomicBool) -> bool;
}

/// Production sleeper: blocks the calling thread, polling the abort token
/// in short slices so a cancel does not wait out a full backoff.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl ThreadSleeper {
    const SLICE: Duration = Duration::from_millis(50);
}

impl Sleeper for ThreadSleeper {
    fn sleep(&self, delay: Duration, abort: &AtomicBool) -> bool {
        let mut remaining = delay;
        while remaining > Duration::ZERO {
            if abort.load(Ordering::Relaxed) {
                return false;
            }
            let slice = remaining.min(Self::SLICE);
            std::thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
        !abort.load(Ordering::Relaxed)
    }
}

/// Runs a fetch closure until it succeeds or the retry policy says to stop.
///
/// Attempts are strictly sequential: each outcome is classified before the
/// next attempt is issued, and the most recent classification alone governs
/// the next transition. Transient failures are absorbed up to the attempt
/// ceiling; the caller only ever sees the final outcome, with the last
/// failure's descriptor and an accurate attempt count.
pub fn run_with_retry<T, F, S>(
    policy: &RetryPolicy,
    sleeper: &S,
    abort: &AtomicBool,
    mut f: F,
) -> Result<T, FetchFailure>
where
    F: FnMut() -> Result<T, FetchError>,
    S: Sleeper + ?Sized,
{
    let mut attempt = 1u32;
    let mut waited = Duration::ZERO;
    loop {
        match f() {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(attempt, "fetch succeeded after retries");
                }
                return Ok(value);
            }
            Err(e) => match policy.decide(attempt, &e, waited) {
                RetryDecision::Stop(reason) => {
                    tracing::warn!(attempt, ?reason, error = %e, "fetch gave up");
                    return Err(FetchFailure {
                        error: e,
                        attempts: attempt,
                        reason,
                        waited,
                    });
                }
                RetryDecision::RetryAfter(delay) => {
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient failure, backing off"
                    );
                    if !sleeper.sleep(delay, abort) {
                        return Err(FetchFailure {
                            error: e,
                            attempts: attempt,
                            reason: StopReason::Cancelled,
                            waited,
                        });
                    }
                    waited += delay;
                    attempt += 1;
                }
            },
        }
    }
}
