//! Exponential reconnect backoff with jitter.

use std::time::Duration;

use rand::Rng;

/// Exponential backoff schedule.
///
/// Each delay doubles the previous one up to `max`, then ±25% jitter is
/// applied so that many clients dropped together do not reconnect in lockstep.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
    attempt: u32,
}

impl Default for Backoff {
    /// 1 second initial delay, 60 second cap.
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(60))
    }
}

impl Backoff {
    /// Create a schedule starting at `initial` and capped at `max`.
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        let max = max.max(initial);
        Self {
            initial,
            max,
            current: initial,
            attempt: 0,
        }
    }

    /// Number of delays handed out since the last reset.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Delay to wait before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        let base = self.current;
        self.current = self.current.saturating_mul(2).min(self.max);
        self.attempt = self.attempt.saturating_add(1);

        let jitter = rand::thread_rng().gen_range(-0.25..=0.25);
        base.mul_f64(1.0 + jitter)
    }

    /// Return to the initial delay after a successful connection.
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn within_jitter(delay: Duration, base: Duration) -> bool {
        delay >= base.mul_f64(0.75) && delay <= base.mul_f64(1.25)
    }

    #[test]
    fn test_delays_double_until_cap() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_millis(400));

        assert!(within_jitter(backoff.next_delay(), Duration::from_millis(100)));
        assert!(within_jitter(backoff.next_delay(), Duration::from_millis(200)));
        assert!(within_jitter(backoff.next_delay(), Duration::from_millis(400)));
        assert!(within_jitter(backoff.next_delay(), Duration::from_millis(400)));
        assert_eq!(backoff.attempt(), 4);
    }

    #[test]
    fn test_reset_restarts_schedule() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(10));
        backoff.next_delay();
        backoff.next_delay();

        backoff.reset();

        assert_eq!(backoff.attempt(), 0);
        assert!(within_jitter(backoff.next_delay(), Duration::from_millis(100)));
    }

    #[test]
    fn test_cap_below_initial_is_raised() {
        let mut backoff = Backoff::new(Duration::from_secs(2), Duration::from_secs(1));
        assert!(within_jitter(backoff.next_delay(), Duration::from_secs(2)));
        assert!(within_jitter(backoff.next_delay(), Duration::from_secs(2)));
    }
}
