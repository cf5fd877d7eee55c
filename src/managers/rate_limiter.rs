use parking_lot::Mutex;
use poise::serenity_prelude::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after: Duration },
}

#[cfg(test)]
impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }
}

/// Last verification attempt per user.
///
/// Keyed by user only, so one clock applies across every guild. Entries are
/// never evicted.
#[derive(Debug, Default)]
pub struct RateLimiter {
    last_attempt: Mutex<HashMap<UserId, Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, user_id: UserId, duration: Duration) -> RateLimitDecision {
        self.check_at(user_id, duration, Instant::now())
    }

    /// Record an attempt at `now` unless the previous one is younger than `duration`
    pub fn check_at(&self, user_id: UserId, duration: Duration, now: Instant) -> RateLimitDecision {
        let mut last_attempt = self.last_attempt.lock();

        if let Some(last) = last_attempt.get(&user_id) {
            let elapsed = now.saturating_duration_since(*last);
            if elapsed < duration {
                return RateLimitDecision::Limited {
                    retry_after: duration - elapsed,
                };
            }
        }

        last_attempt.insert(user_id, now);
        RateLimitDecision::Allowed
    }

    #[cfg(test)]
    pub fn tracked_users(&self) -> usize {
        self.last_attempt.lock().len()
    }
}

/// Shared rate limiter type
pub type SharedRateLimiter = Arc<RateLimiter>;

pub fn create_shared_rate_limiter() -> SharedRateLimiter {
    Arc::new(RateLimiter::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(300);

    #[test]
    fn test_allow_limit_allow() {
        let limiter = RateLimiter::new();
        let user = UserId::new(1);
        let start = Instant::now();

        assert!(limiter.check_at(user, WINDOW, start).is_allowed());

        match limiter.check_at(user, WINDOW, start + Duration::from_secs(60)) {
            RateLimitDecision::Limited { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(240));
            }
            other => panic!("expected limited, got {:?}", other),
        }

        assert!(limiter.check_at(user, WINDOW, start + WINDOW).is_allowed());
    }

    #[test]
    fn test_limited_attempt_does_not_reset_window() {
        let limiter = RateLimiter::new();
        let user = UserId::new(1);
        let start = Instant::now();

        limiter.check_at(user, WINDOW, start);
        limiter.check_at(user, WINDOW, start + Duration::from_secs(200));

        assert!(limiter
            .check_at(user, WINDOW, start + Duration::from_secs(301))
            .is_allowed());
    }

    #[test]
    fn test_users_are_independent() {
        let limiter = RateLimiter::new();
        let start = Instant::now();

        assert!(limiter.check_at(UserId::new(1), WINDOW, start).is_allowed());
        assert!(limiter.check_at(UserId::new(2), WINDOW, start).is_allowed());
        assert!(!limiter.check_at(UserId::new(1), WINDOW, start).is_allowed());
        assert_eq!(limiter.tracked_users(), 2);
    }
}
