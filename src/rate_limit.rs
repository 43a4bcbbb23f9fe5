//! Token-bucket pacing for outbound provider calls.
//!
//! The bucket holds `tokens` permits per interval. Every grant stays in the
//! bucket until its interval has elapsed, so no window of that length ever
//! sees more than `tokens` permits handed out. Waiters queue on a fair mutex
//! and keep their place while they sleep, which serves them in arrival
//! order.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::trace;

use crate::config::RateLimit;
use crate::error::{PlannerError, Result};

#[derive(Debug, Clone, Copy)]
struct Grant {
    expires_at: Instant,
    weight: u32,
}

#[derive(Debug, Default)]
struct Window {
    grants: Vec<Grant>,
    in_use: u32,
}

impl Window {
    fn expire(&mut self, now: Instant) {
        let mut released = 0;
        self.grants.retain(|grant| {
            let live = grant.expires_at > now;
            if !live {
                released += grant.weight;
            }
            live
        });
        self.in_use -= released;
    }

    fn next_expiry(&self) -> Option<Instant> {
        self.grants.iter().map(|grant| grant.expires_at).min()
    }

    fn record(&mut self, grant: Grant) {
        self.in_use += grant.weight;
        self.grants.push(grant);
    }
}

#[derive(Debug)]
pub struct RateLimiter {
    limit: RateLimit,
    window: Mutex<Window>,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Result<Self> {
        if limit.tokens == 0 || limit.interval_ms == 0 {
            return Err(PlannerError::configuration(
                "rate limiter needs at least one token per non-empty interval",
            ));
        }
        Ok(Self {
            limit,
            window: Mutex::new(Window::default()),
        })
    }

    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Wait until `tokens` permits are available, then take them.
    ///
    /// A request larger than the bucket waits for an empty bucket and then
    /// holds all of it for `ceil(tokens / capacity)` intervals.
    pub async fn acquire(&self, tokens: u32) {
        if tokens == 0 {
            return;
        }
        let capacity = self.limit.tokens;
        let weight = tokens.min(capacity);
        let hold = self.limit.interval() * tokens.div_ceil(capacity);

        let mut window = self.window.lock().await;
        let mut waited = Duration::ZERO;
        loop {
            let now = Instant::now();
            window.expire(now);

            match window.next_expiry() {
                Some(wake) if window.in_use + weight > capacity => {
                    waited += wake - now;
                    sleep_until(wake).await;
                }
                _ => {
                    window.record(Grant {
                        expires_at: now + hold,
                        weight,
                    });
                    trace!(tokens, waited_ms = waited.as_millis() as u64, "rate limiter granted");
                    return;
                }
            }
        }
    }
}
