//! Per-host request spacing with random jitter.

use std::{
  collections::HashMap,
  sync::{Mutex, PoisonError},
  time::Duration,
};

use rand::Rng;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use crate::config::{THROTTLE_FLOOR_MS, ThrottleConfig};

/// Spaces requests to the same host by a random delay in `[min, max]`.
///
/// Callers reserve the next free slot for a host under a short lock and
/// sleep outside it, so concurrent workers queue up one delay apart.
pub struct HostThrottle {
  min:  Duration,
  max:  Duration,
  last: Mutex<HashMap<String, Instant>>,
}

impl HostThrottle {
  pub fn new(config: &ThrottleConfig) -> Self {
    let (min, max) = config.bounds();
    Self {
      min,
      max,
      last: Mutex::new(HashMap::new()),
    }
  }

  pub fn bounds(&self) -> (Duration, Duration) { (self.min, self.max) }

  fn jitter(&self) -> Duration {
    let lo = self.min.as_millis() as u64;
    let hi = (self.max.as_millis() as u64).max(lo);
    Duration::from_millis(rand::thread_rng().gen_range(lo..=hi).max(THROTTLE_FLOOR_MS))
  }

  /// Wait until `host` may be requested again. The first request to a host
  /// goes out immediately.
  pub async fn wait(&self, host: &str) {
    let slot = {
      let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
      let now = Instant::now();
      let slot = match last.get(host) {
        Some(prev) => (*prev + self.jitter()).max(now),
        None => now,
      };
      last.insert(host.to_string(), slot);
      slot
    };

    let wait = slot.saturating_duration_since(Instant::now());
    if !wait.is_zero() {
      debug!(host, wait_ms = wait.as_millis() as u64, "throttling");
      sleep_until(slot).await;
    }
  }
}
