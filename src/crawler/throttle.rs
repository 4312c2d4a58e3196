//! Per-host request spacing
//!
//! Each network location gets its own clock. A caller reserves the next free
//! slot for the host while holding the lock and then sleeps until that slot
//! outside of it, so concurrent requests to one host queue up one delay
//! apart while other hosts proceed independently.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Enforces a minimum delay between requests to the same host
#[derive(Debug)]
pub struct HostThrottle {
    delay: Duration,
    next_slot: Mutex<HashMap<String, Instant>>,
}

impl HostThrottle {
    /// Creates a throttle with the configured download delay
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until a request to `host` may be sent
    ///
    /// # Arguments
    ///
    /// * `host` - Network location (host plus non-default port)
    /// * `crawl_delay` - Crawl-delay from robots.txt; the longer of it and
    ///   the configured delay wins
    pub async fn wait(&self, host: &str, crawl_delay: Option<Duration>) {
        let slot = self.reserve(host, crawl_delay, Instant::now());
        sleep_until(slot).await;
    }

    /// Reserves the next slot for `host` and returns when it starts
    fn reserve(&self, host: &str, crawl_delay: Option<Duration>, now: Instant) -> Instant {
        let spacing = crawl_delay.map_or(self.delay, |extra| extra.max(self.delay));

        let mut slots = match self.next_slot.lock() {
            Ok(slots) => slots,
            Err(poisoned) => poisoned.into_inner(),
        };

        let slot = slots
            .get(host)
            .map_or(now, |next| (*next).max(now));
        let next = slot
            .checked_add(spacing)
            .or_else(|| slot.checked_add(self.delay))
            .unwrap_or(slot);
        slots.insert(host.to_string(), next);
        slot
    }
}
