//! Bounded retry with backoff for optimistic transactions.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Backoff strategy for retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// Same delay every time.
    Fixed,
    /// Delay doubles every attempt.
    Exponential,
    /// Delay grows by `base_delay` every attempt.
    Linear,
}

/// Retry policy.
///
/// `max_attempts` counts every execution, the first one included, so a value
/// of 1 disables retrying.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub strategy: BackoffStrategy,
    /// Jitter factor (0.0-1.0) spread around the computed delay.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(500),
            strategy: BackoffStrategy::Exponential,
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retry.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    pub fn exponential(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            strategy: BackoffStrategy::Exponential,
            jitter: 0.1,
        }
    }

    /// Backoff before the attempt following the given failed one (1-indexed),
    /// without jitter.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_ms = self.base_delay.as_millis() as f64;
        let max_ms = self.max_delay.as_millis() as f64;

        let delay_ms = match self.strategy {
            BackoffStrategy::Fixed => base_ms,
            BackoffStrategy::Exponential => {
                let exp = 2_f64.powi((attempt - 1) as i32);
                (base_ms * exp).min(max_ms)
            }
            BackoffStrategy::Linear => (base_ms * attempt as f64).min(max_ms),
        };

        Duration::from_millis(delay_ms as u64)
    }

    /// `delay_for_attempt` spread by up to `jitter` in either direction.
    ///
    /// Each caller draws from its own rng, so contenders that failed on the
    /// same attempt wake at different times.
    pub fn jittered_delay<R: Rng>(&self, attempt: u32, rng: &mut R) -> Duration {
        let delay = self.delay_for_attempt(attempt).as_secs_f64();
        let jitter = self.jitter.clamp(0.0, 1.0);
        if jitter == 0.0 || delay == 0.0 {
            return Duration::from_secs_f64(delay);
        }

        let factor = 1.0 + jitter * rng.gen_range(-1.0..=1.0);
        Duration::from_secs_f64((delay * factor).max(0.0))
    }

    /// Whether another attempt may follow the given (1-indexed) failed one.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Errors that may succeed when the whole operation is re-run.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// A result tagged with the number of attempts it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the policy
/// is exhausted. `op` receives the 1-indexed attempt number.
pub async fn retry_transient<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> Result<Attempted<T>, Attempted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + core::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(Attempted { value, attempts: attempt }),
            Err(err) if err.is_retryable() && policy.should_retry(attempt) => {
                let delay = policy.jittered_delay(attempt, &mut rand::thread_rng());
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying after transient failure");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(value) => return Err(Attempted { value, attempts: attempt }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Busy,
        Fatal,
    }

    impl core::fmt::Display for TestError {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            write!(f, "{self:?}")
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, TestError::Busy)
        }
    }

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::exponential(max_attempts, Duration::from_millis(1), Duration::from_millis(2))
    }

    #[test]
    fn exponential_delay_is_capped() {
        let policy = RetryPolicy {
            jitter: 0.0,
            ..RetryPolicy::exponential(10, Duration::from_millis(10), Duration::from_millis(50))
        };
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(10));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(20));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(50));
    }

    #[test]
    fn delays_increase_until_the_cap() {
        let policy = RetryPolicy::default();
        assert!(policy.delay_for_attempt(2) > policy.delay_for_attempt(1));
        assert!(policy.delay_for_attempt(3) > policy.delay_for_attempt(2));
    }

    #[test]
    fn jitter_stays_in_bounds_and_differs_between_callers() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let policy = RetryPolicy {
            jitter: 0.25,
            ..RetryPolicy::exponential(5, Duration::from_millis(40), Duration::from_millis(500))
        };
        let base = policy.delay_for_attempt(1).as_secs_f64();

        let delays: Vec<Duration> = (0..8u64)
            .map(|seed| policy.jittered_delay(1, &mut StdRng::seed_from_u64(seed)))
            .collect();

        for d in &delays {
            let secs = d.as_secs_f64();
            assert!(secs >= base * 0.75 - 1e-9 && secs <= base * 1.25 + 1e-9, "{d:?} out of range");
        }
        assert!(delays.iter().any(|d| *d != delays[0]), "all contenders slept the same: {delays:?}");
    }

    #[test]
    fn zero_jitter_is_exact() {
        let policy = RetryPolicy {
            jitter: 0.0,
            ..RetryPolicy::default()
        };
        let mut rng = rand::thread_rng();
        assert_eq!(policy.jittered_delay(2, &mut rng), policy.delay_for_attempt(2));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let res = retry_transient(&fast(5), |attempt| async move {
            if attempt < 3 { Err(TestError::Busy) } else { Ok(attempt) }
        })
        .await
        .unwrap();
        assert_eq!(res, Attempted { value: 3, attempts: 3 });
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let err = retry_transient(&fast(4), |_| async { Err::<(), _>(TestError::Busy) })
            .await
            .unwrap_err();
        assert_eq!(err, Attempted { value: TestError::Busy, attempts: 4 });
    }

    #[tokio::test]
    async fn fatal_errors_are_not_retried() {
        let err = retry_transient(&fast(4), |_| async { Err::<(), _>(TestError::Fatal) })
            .await
            .unwrap_err();
        assert_eq!(err.attempts, 1);
    }
}
