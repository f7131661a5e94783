//! Request pacing for the matchups site.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Spaces consecutive requests at least `min_interval` apart, plus up to
/// `jitter` extra.
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
    jitter: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration, jitter: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
            jitter,
        }
    }

    /// Jitter of half the interval
    pub fn with_interval(min_interval: Duration) -> Self {
        Self::new(min_interval, min_interval / 2)
    }

    /// Wait until the next request may go out.
    ///
    /// The lock is held while sleeping so concurrent callers queue up.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let gap = self.min_interval + self.jitter.mul_f64(fastrand::f64());
            let ready_at = previous + gap;
            let now = Instant::now();
            if ready_at > now {
                tokio::time::sleep(ready_at - now).await;
            }
        }

        *last = Some(Instant::now());
    }
}
