use time::OffsetDateTime;

/// Countdown over an injected clock. The timer holds no tick task of its
/// own: the session loop polls it at the configured resolution and owns the
/// cancellation of that schedule. `poll_expiry` latches, so drift or late
/// ticks can never fire expiry twice for one `start`.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    total_seconds: u64,
    started_at: Option<OffsetDateTime>,
    expired: bool,
}

impl CountdownTimer {
    /// A total of 0 means "no timer": `start` is a no-op and progress stays
    /// at zero indefinitely.
    pub fn new(total_seconds: u64) -> Self {
        Self { total_seconds, started_at: None, expired: false }
    }

    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn start(&mut self, now: OffsetDateTime) {
        if self.total_seconds == 0 {
            return;
        }
        self.started_at = Some(now);
        self.expired = false;
    }

    /// Idempotent; cancels the countdown. No expiry fires after a reset.
    pub fn reset(&mut self) {
        self.started_at = None;
        self.expired = false;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && !self.expired
    }

    pub fn elapsed_seconds(&self, now: OffsetDateTime) -> u64 {
        let Some(started_at) = self.started_at else {
            return 0;
        };
        let elapsed = (now - started_at).whole_seconds();
        if elapsed < 0 {
            return 0;
        }
        (elapsed as u64).min(self.total_seconds)
    }

    pub fn remaining_seconds(&self, now: OffsetDateTime) -> u64 {
        self.total_seconds - self.elapsed_seconds(now)
    }

    pub fn progress_percent(&self, now: OffsetDateTime) -> f64 {
        if self.total_seconds == 0 || self.started_at.is_none() {
            return 0.0;
        }
        self.elapsed_seconds(now) as f64 * 100.0 / self.total_seconds as f64
    }

    /// Returns `true` exactly once per `start`, when the remaining time
    /// reaches zero.
    pub fn poll_expiry(&mut self, now: OffsetDateTime) -> bool {
        if self.started_at.is_none() || self.expired {
            return false;
        }
        if self.remaining_seconds(now) > 0 {
            return false;
        }
        self.expired = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn epoch() -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH
    }

    #[test]
    fn disabled_timer_never_expires() {
        let mut timer = CountdownTimer::disabled();
        timer.start(epoch());
        assert!(!timer.is_running());
        assert_eq!(timer.progress_percent(epoch() + Duration::hours(5)), 0.0);
        assert!(!timer.poll_expiry(epoch() + Duration::hours(5)));
    }

    #[test]
    fn counts_down_at_one_second_resolution() {
        let mut timer = CountdownTimer::new(60);
        timer.start(epoch());
        let later = epoch() + Duration::seconds(15);
        assert_eq!(timer.elapsed_seconds(later), 15);
        assert_eq!(timer.remaining_seconds(later), 45);
        assert_eq!(timer.progress_percent(later), 25.0);
        assert!(!timer.poll_expiry(later));
    }

    #[test]
    fn expiry_fires_exactly_once() {
        let mut timer = CountdownTimer::new(60);
        timer.start(epoch());
        let past_deadline = epoch() + Duration::seconds(61);
        assert!(timer.poll_expiry(past_deadline));
        assert!(!timer.poll_expiry(past_deadline));
        assert!(!timer.poll_expiry(past_deadline + Duration::seconds(30)));
        assert_eq!(timer.remaining_seconds(past_deadline), 0);
    }

    #[test]
    fn reset_cancels_and_is_idempotent() {
        let mut timer = CountdownTimer::new(60);
        timer.start(epoch());
        timer.reset();
        timer.reset();
        assert!(!timer.is_running());
        assert!(!timer.poll_expiry(epoch() + Duration::hours(1)));
        assert_eq!(timer.elapsed_seconds(epoch() + Duration::hours(1)), 0);
    }

    #[test]
    fn elapsed_clamps_to_total_and_floor() {
        let mut timer = CountdownTimer::new(30);
        timer.start(epoch());
        assert_eq!(timer.elapsed_seconds(epoch() - Duration::seconds(5)), 0);
        assert_eq!(timer.elapsed_seconds(epoch() + Duration::seconds(500)), 30);
        assert_eq!(timer.progress_percent(epoch() + Duration::seconds(500)), 100.0);
    }
}
