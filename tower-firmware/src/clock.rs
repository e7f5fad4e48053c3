//! Monotonic clock backed by the embassy time driver

use embassy_time::Instant;
use tower_core::traits::Clock;

/// Milliseconds since boot from the RTC-backed time driver
#[derive(Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
