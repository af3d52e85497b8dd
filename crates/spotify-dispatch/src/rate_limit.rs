//! Server-driven rate-limit window
//!
//! A 429 response carries `Retry-After` (seconds). Until that window passes
//! every dispatch fails fast with `RateLimited` and never reaches the
//! network. The gate only ever extends the window: a late response with a
//! shorter `Retry-After` cannot reopen it early.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

/// Longest window a single `Retry-After` can open.
pub const MAX_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Default)]
pub struct RateLimitGate {
    blocked_until: Mutex<Option<Instant>>,
}

impl RateLimitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff the window is set and still in the future.
    pub fn is_blocked(&self) -> bool {
        self.remaining().is_some()
    }

    /// Time left in the window, `None` when not blocked.
    pub fn remaining(&self) -> Option<Duration> {
        let now = Instant::now();
        self.blocked_until()
            .and_then(|until| until.checked_duration_since(now))
            .filter(|left| !left.is_zero())
    }

    pub fn blocked_until(&self) -> Option<Instant> {
        *self
            .blocked_until
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Open (or extend) the window to `now + retry_after`, capped at
    /// [`MAX_WINDOW`]. Returns the effective end of the window.
    pub fn record_limit_hit(&self, retry_after: Duration) -> Instant {
        let retry_after = retry_after.min(MAX_WINDOW);
        let now = Instant::now();
        let candidate = now.checked_add(retry_after).unwrap_or(now);
        let mut until = self
            .blocked_until
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let effective = match *until {
            Some(current) if current > candidate => current,
            _ => candidate,
        };
        *until = Some(effective);
        warn!(retry_after_ms = retry_after.as_millis() as u64, "rate limit window opened");
        effective
    }
}
