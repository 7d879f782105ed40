//! Exponential backoff and bounded polling

use std::future::Future;
use std::time::Duration;

use mw_core::config::BackoffConfig;
use tokio::time::Instant;

/// Exponential backoff with jitter between probe attempts
pub struct ExponentialBackoff {
    /// Current delay
    current: Duration,
    /// Maximum delay
    max: Duration,
    /// Multiplier
    multiplier: f64,
    /// Jitter factor (0.0 to 1.0)
    jitter: f64,
}

impl ExponentialBackoff {
    /// Create a new backoff from configuration
    pub fn from_config(config: &BackoffConfig) -> Self {
        Self::new(config.initial, config.max, config.multiplier, config.jitter)
    }

    /// A multiplier below 1.0 (or not a number) degrades to a constant
    /// delay; jitter is clamped to 0.0..=1.0
    pub fn new(initial: Duration, max: Duration, multiplier: f64, jitter: f64) -> Self {
        let multiplier = if multiplier.is_finite() && multiplier >= 1.0 {
            multiplier
        } else {
            1.0
        };
        let jitter = if jitter.is_nan() { 0.0 } else { jitter.clamp(0.0, 1.0) };
        Self {
            current: initial.min(max),
            max,
            multiplier,
            jitter,
        }
    }

    /// Get the next delay and advance the backoff
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;

        let next = Duration::try_from_secs_f64(self.current.as_secs_f64() * self.multiplier)
            .unwrap_or(self.max);
        self.current = std::cmp::min(next, self.max);

        let jitter_amount = delay.as_secs_f64() * self.jitter * rand::random::<f64>();
        delay.saturating_add(Duration::try_from_secs_f64(jitter_amount).unwrap_or_default())
    }
}

/// Re-run `probe` until it reports true or `deadline` elapses.
///
/// The probe always runs at least once, and once more at the deadline, so a
/// zero deadline degenerates to a single check. Sleeps never overshoot the
/// deadline.
pub async fn poll_until<F, Fut>(
    backoff: &mut ExponentialBackoff,
    deadline: Duration,
    mut probe: F,
) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    // A deadline too far out to represent never expires
    let give_up_at = Instant::now().checked_add(deadline);
    loop {
        if probe().await {
            return true;
        }
        let remaining = match give_up_at {
            Some(at) => at.saturating_duration_since(Instant::now()),
            None => Duration::MAX,
        };
        if remaining.is_zero() {
            return false;
        }
        let delay = backoff.next_delay().min(remaining);
        tracing::trace!("Condition not met yet, re-checking in {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn no_jitter(initial_ms: u64, max_ms: u64) -> ExponentialBackoff {
        ExponentialBackoff::new(
            Duration::from_millis(initial_ms),
            Duration::from_millis(max_ms),
            2.0,
            0.0,
        )
    }

    #[test]
    fn test_backoff_increases() {
        let mut backoff = no_jitter(250, 2000);

        assert_eq!(backoff.next_delay(), Duration::from_millis(250));
        assert_eq!(backoff.next_delay(), Duration::from_millis(500));
        assert_eq!(backoff.next_delay(), Duration::from_millis(1000));
    }

    #[test]
    fn test_backoff_max() {
        let mut backoff = no_jitter(1500, 2000);

        assert_eq!(backoff.next_delay(), Duration::from_millis(1500));
        assert_eq!(backoff.next_delay(), Duration::from_millis(2000));
        assert_eq!(backoff.next_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn test_jitter_only_adds() {
        let mut backoff = ExponentialBackoff::new(
            Duration::from_millis(100),
            Duration::from_millis(100),
            1.0,
            0.5,
        );
        for _ in 0..20 {
            let delay = backoff.next_delay();
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(150));
        }
    }

    #[test]
    fn test_unusable_multiplier_keeps_delay_constant() {
        for multiplier in [-1.0, 0.0, f64::NAN, f64::INFINITY] {
            let mut backoff = ExponentialBackoff::new(
                Duration::from_millis(250),
                Duration::from_secs(2),
                multiplier,
                f64::NAN,
            );
            assert_eq!(backoff.next_delay(), Duration::from_millis(250));
            assert_eq!(backoff.next_delay(), Duration::from_millis(250));
        }
    }

    #[test]
    fn test_huge_multiplier_caps_at_max() {
        let mut backoff = ExponentialBackoff::new(
            Duration::from_millis(250),
            Duration::from_secs(2),
            1e300,
            0.0,
        );
        assert_eq!(backoff.next_delay(), Duration::from_millis(250));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_deadline_still_polls() {
        let calls = Cell::new(0);
        let mut backoff = no_jitter(250, 2000);

        let ok = poll_until(&mut backoff, Duration::MAX, || {
            calls.set(calls.get() + 1);
            let ready = calls.get() == 4;
            async move { ready }
        })
        .await;

        assert!(ok);
        assert_eq!(calls.get(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_returns_as_soon_as_condition_holds() {
        let calls = Cell::new(0);
        let started = Instant::now();
        let mut backoff = no_jitter(250, 2000);

        let ok = poll_until(&mut backoff, Duration::from_secs(8), || {
            calls.set(calls.get() + 1);
            let ready = calls.get() == 3;
            async move { ready }
        })
        .await;

        assert!(ok);
        assert_eq!(calls.get(), 3);
        // 250ms + 500ms of sleeping before the third probe
        assert_eq!(started.elapsed(), Duration::from_millis(750));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_stops_at_deadline() {
        let calls = Cell::new(0);
        let started = Instant::now();
        let mut backoff = no_jitter(250, 2000);

        let ok = poll_until(&mut backoff, Duration::from_secs(3), || {
            calls.set(calls.get() + 1);
            async { false }
        })
        .await;

        assert!(!ok);
        assert_eq!(started.elapsed(), Duration::from_secs(3));
        // 0, 250, 750, 1750, 3000 (last sleep clipped to the deadline)
        assert_eq!(calls.get(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_deadline_checks_once() {
        let calls = Cell::new(0);
        let mut backoff = no_jitter(250, 2000);

        let ok = poll_until(&mut backoff, Duration::ZERO, || {
            calls.set(calls.get() + 1);
            async { false }
        })
        .await;

        assert!(!ok);
        assert_eq!(calls.get(), 1);
    }
}
