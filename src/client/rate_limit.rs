//! # Rate Limiter
//!
//! Token bucket with a burst of one: the first request goes out immediately,
//! every following request waits until one full interval has passed since the
//! previous permit was granted.
//!
//! Waiters queue on a fair async mutex, so permits are handed out in arrival
//! order. The next slot is only advanced once a permit is actually granted:
//! dropping a pending [`RateLimiter::acquire`] future (cancellation, timeout)
//! leaves the schedule untouched.
//!
//! ```rust
//! use imgix_source_provider::client::rate_limit::RateLimiter;
//! use std::time::Duration;
//!
//! let limiter = RateLimiter::new(Duration::from_secs(2)); // 1 request every 2 seconds
//! assert_eq!(limiter.interval(), Duration::from_secs(2));
//! ```

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    /// Earliest instant at which the next permit may be granted
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for a permit
    ///
    /// Cancel-safe: if the returned future is dropped before completion no
    /// permit is consumed.
    pub async fn acquire(&self) {
        let mut next_slot = self.next_slot.lock().await;
        if let Some(at) = *next_slot {
            if at > Instant::now() {
                debug!(
                    wait_ms = u64::try_from(at.saturating_duration_since(Instant::now()).as_millis())
                        .unwrap_or(u64::MAX),
                    "waiting for rate-limit permit"
                );
                tokio::time::sleep_until(at).await;
            }
        }
        *next_slot = Some(Instant::now() + self.interval);
    }
}
