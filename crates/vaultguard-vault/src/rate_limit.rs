//! Fixed-interval limiter for outbound breach lookups.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::MIN_BREACH_INTERVAL_MS;

/// Spaces permits at least `interval` apart. The first permit is immediate.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Limiter with the given spacing, raised to the 1.5 s floor if lower.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(MIN_BREACH_INTERVAL_MS)),
            last: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for the next permit.
    ///
    /// Returns `false` without taking a permit if `cancel` fires first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> bool {
        let mut last = self.last.lock().await;

        if let Some(previous) = *last {
            let ready = previous.checked_add(self.interval).unwrap_or(previous);
            tokio::select! {
                biased;
                () = cancel.cancelled() => return false,
                () = tokio::time::sleep_until(ready) => {}
            }
        } else if cancel.is_cancelled() {
            return false;
        }

        *last = Some(Instant::now());
        true
    }
}
