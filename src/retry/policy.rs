use std::time::Duration;

use super::classify::{classify, FailureClass};
use super::error::{FetchError, StopReason};

/// How the policy treats rate-limit failures.
///
/// The default is fail-fast: the server is reachable and told us to back
/// off, and in a latency-sensitive caller a long mandated wait is itself a
/// failure mode. The caller switches strategy instead of blocking. `Retry`
/// opts back into ordinary bounded retries for rate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateLimitMode {
    #[default]
    FailFast,
    Retry,
}

/// Decision returned by the retry policy for one classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Stop the sequence; the reason distinguishes the terminal state.
    Stop(StopReason),
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Immutable exponential backoff policy.
///
/// Constructed once per client and shared by every sequence; the driver
/// owns all per-sequence state (attempt ordinal, wait accumulator).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first). Never below 1.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Multiplier applied per additional attempt. Values below 1.0 are
    /// treated as 1.0 so delays never shrink.
    pub growth_factor: f64,
    /// Optional cap on total backoff waited across a sequence.
    pub max_total_wait: Option<Duration>,
    /// Fail-fast (default) or retry on rate limits.
    pub rate_limit: RateLimitMode,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            growth_factor: 2.0,
            max_total_wait: None,
            rate_limit: RateLimitMode::FailFast,
        }
    }
}

impl RetryPolicy {
    /// Exponent cap so a pathological `max_attempts` cannot overflow the
    /// delay computation.
    const MAX_EXPONENT: u32 = 30;

    /// Backoff delay before attempt `attempt` (1-based): the first attempt
    /// waits nothing, attempt n >= 2 waits `base * growth^(n-2)`.
    ///
    /// Pure function of ordinal and policy so it can be tested without any
    /// wall-clock time; the driver decides where the suspension happens.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exp = (attempt - 2).min(Self::MAX_EXPONENT) as i32;
        let secs = self.base_delay.as_secs_f64() * self.growth_factor.max(1.0).powi(exp);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Decide what to do after attempt `attempt` (1-based) failed with
    /// `error`, given that `waited` backoff has already elapsed in this
    /// sequence.
    pub fn decide(&self, attempt: u32, error: &FetchError, waited: Duration) -> RetryDecision {
        if classify(error) == FailureClass::Permanent {
            return RetryDecision::Stop(StopReason::Permanent);
        }

        let rate_limited = matches!(error, FetchError::RateLimited { .. });
        if rate_limited && self.rate_limit == RateLimitMode::FailFast {
            return RetryDecision::Stop(StopReason::RateLimited);
        }

        if attempt >= self.max_attempts {
            return RetryDecision::Stop(StopReason::Exhausted);
        }

        let mut delay = self.backoff_delay(attempt + 1);
        // A server-suggested wait is a floor, not a ceiling.
        if rate_limited {
            if let Some(hint) = error.retry_after() {
                delay = delay.max(hint);
            }
        }
        if let Some(cap) = self.max_total_wait {
            delay = delay.min(cap.saturating_sub(waited));
        }
        RetryDecision::RetryAfter(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transient() -> FetchError {
        FetchError::Network("connection reset".into())
    }

    #[test]
    fn permanent_stops_on_first_attempt() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.decide(1, &FetchError::Auth("bad key".into()), Duration::ZERO),
            RetryDecision::Stop(StopReason::Permanent)
        );
    }

    #[test]
    fn rate_limit_fail_fast_by_default() {
        let p = RetryPolicy {
            max_attempts: 10,
            ..Default::default()
        };
        let e = FetchError::RateLimited {
            message: "slow down".into(),
            retry_after: Some(Duration::from_secs(60)),
        };
        assert_eq!(
            p.decide(1, &e, Duration::ZERO),
            RetryDecision::Stop(StopReason::RateLimited)
        );
    }

    #[test]
    fn rate_limit_retry_mode_honors_hint_as_floor() {
        let p = RetryPolicy {
            rate_limit: RateLimitMode::Retry,
            ..Default::default()
        };
        let e = FetchError::RateLimited {
            message: "slow down".into(),
            retry_after: Some(Duration::from_secs(5)),
        };
        assert_eq!(
            p.decide(1, &e, Duration::ZERO),
            RetryDecision::RetryAfter(Duration::from_secs(5))
        );
    }

    #[test]
    fn backoff_doubles_from_base() {
        let p = RetryPolicy::default();
        assert_eq!(p.backoff_delay(1), Duration::ZERO);
        assert_eq!(p.backoff_delay(2), Duration::from_millis(500));
        assert_eq!(p.backoff_delay(3), Duration::from_secs(1));
        assert_eq!(p.backoff_delay(4), Duration::from_secs(2));
    }

    #[test]
    fn backoff_non_decreasing_for_growth_at_least_one() {
        let p = RetryPolicy {
            max_attempts: 20,
            growth_factor: 1.0,
            ..Default::default()
        };
        let mut prev = Duration::ZERO;
        for attempt in 2..=20 {
            let d = p.backoff_delay(attempt);
            assert!(d >= prev);
            prev = d;
        }
    }

    #[test]
    fn growth_below_one_never_shrinks_delay() {
        let p = RetryPolicy {
            growth_factor: 0.5,
            ..Default::default()
        };
        assert_eq!(p.backoff_delay(3), p.backoff_delay(2));
    }

    #[test]
    fn respects_max_attempts() {
        let p = RetryPolicy {
            max_attempts: 3,
            ..Default::default()
        };
        assert!(matches!(
            p.decide(1, &transient(), Duration::ZERO),
            RetryDecision::RetryAfter(_)
        ));
        assert!(matches!(
            p.decide(2, &transient(), Duration::ZERO),
            RetryDecision::RetryAfter(_)
        ));
        assert_eq!(
            p.decide(3, &transient(), Duration::ZERO),
            RetryDecision::Stop(StopReason::Exhausted)
        );
    }

    #[test]
    fn single_attempt_policy_never_retries_transients() {
        let p = RetryPolicy {
            max_attempts: 1,
            ..Default::default()
        };
        assert_eq!(
            p.decide(1, &transient(), Duration::ZERO),
            RetryDecision::Stop(StopReason::Exhausted)
        );
    }

    #[test]
    fn total_wait_cap_clamps_delay() {
        let p = RetryPolicy {
            max_attempts: 5,
            max_total_wait: Some(Duration::from_millis(600)),
            ..Default::default()
        };
        // 500ms already waited, next doubling would be 1s but only 100ms
        // of budget remain.
        assert_eq!(
            p.decide(2, &transient(), Duration::from_millis(500)),
            RetryDecision::RetryAfter(Duration::from_millis(100))
        );
    }

    #[test]
    fn huge_attempt_ordinal_does_not_overflow() {
        let p = RetryPolicy {
            max_attempts: u32::MAX,
            ..Default::default()
        };
        let d = p.backoff_delay(u32::MAX);
        assert!(d > Duration::ZERO);
    }
}
