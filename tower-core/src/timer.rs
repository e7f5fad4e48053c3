//! Elapsed-time arithmetic for the countdown timer
//!
//! All times are milliseconds on the module's real-time clock. The clock
//! may be adjusted underneath a running countdown, so every subtraction
//! saturates instead of wrapping.

use core::fmt::Write;

use heapless::String;

/// Text buffer for `MM:SS`
pub type ClockText = String<8>;

/// A running countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Countdown {
    /// Clock reading when the countdown started
    pub start_ms: u64,
    /// Total length
    pub duration_ms: u64,
}

impl Countdown {
    /// Start a countdown of `minutes` at `now`
    pub fn start(now: u64, minutes: u8) -> Self {
        Self {
            start_ms: now,
            duration_ms: minutes as u64 * 60_000,
        }
    }

    /// Clock reading at which the countdown ends
    pub fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.duration_ms)
    }

    pub fn elapsed_ms(&self, now: u64) -> u64 {
        elapsed_ms(self.start_ms, now)
    }

    pub fn remaining_ms(&self, now: u64) -> u64 {
        remaining_ms(self.duration_ms, self.start_ms, now)
    }

    pub fn progress_permille(&self, now: u64) -> u16 {
        progress_permille(self.duration_ms, self.start_ms, now)
    }

    /// Check whether the countdown has run out
    pub fn is_expired(&self, now: u64) -> bool {
        self.remaining_ms(now) == 0
    }

    /// When the displayed seconds next change
    ///
    /// Ticks fall on whole seconds after the start so the display never
    /// drifts, and the last tick lands exactly on the end.
    pub fn next_tick_ms(&self, now: u64) -> u64 {
        let elapsed = self.elapsed_ms(now);
        let next = self.start_ms + (elapsed / 1000 + 1) * 1000;
        next.min(self.end_ms())
    }
}

/// Time since `start`, zero if the clock reads earlier than `start`
pub fn elapsed_ms(start: u64, now: u64) -> u64 {
    now.saturating_sub(start)
}

/// Time left of `duration`, zero once it has passed
pub fn remaining_ms(duration: u64, start: u64, now: u64) -> u64 {
    duration.saturating_sub(elapsed_ms(start, now))
}

/// Fraction of `duration` elapsed, in thousandths
///
/// A zero-length countdown is complete.
pub fn progress_permille(duration: u64, start: u64, now: u64) -> u16 {
    if duration == 0 {
        return 1000;
    }
    let elapsed = elapsed_ms(start, now).min(duration);
    (elapsed * 1000 / duration) as u16
}

/// Format a remaining time as `MM:SS`
///
/// Partial seconds round up, so `00:00` only appears once time is up.
pub fn format_mm_ss(ms: u64) -> ClockText {
    let total_secs = ms.div_ceil(1000);
    let mut text = String::new();
    let _ = write!(text, "{:02}:{:02}", total_secs / 60, total_secs % 60);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_elapsed_saturates_when_clock_goes_back() {
        assert_eq!(elapsed_ms(10_000, 9_000), 0);
        assert_eq!(elapsed_ms(10_000, 12_500), 2_500);
    }

    #[test]
    fn test_remaining() {
        let cd = Countdown::start(1_000, 1);
        assert_eq!(cd.remaining_ms(1_000), 60_000);
        assert_eq!(cd.remaining_ms(31_000), 30_000);
        assert_eq!(cd.remaining_ms(61_000), 0);
        assert_eq!(cd.remaining_ms(500_000), 0);
        assert!(cd.is_expired(61_000));
        assert!(!cd.is_expired(60_999));
    }

    #[test]
    fn test_progress() {
        let cd = Countdown::start(0, 2);
        assert_eq!(cd.progress_permille(0), 0);
        assert_eq!(cd.progress_permille(60_000), 500);
        assert_eq!(cd.progress_permille(120_000), 1000);
        assert_eq!(cd.progress_permille(999_999), 1000);
        assert_eq!(progress_permille(0, 0, 0), 1000);
    }

    #[test]
    fn test_format_rounds_up() {
        assert_eq!(format_mm_ss(0).as_str(), "00:00");
        assert_eq!(format_mm_ss(1).as_str(), "00:01");
        assert_eq!(format_mm_ss(59_001).as_str(), "01:00");
        assert_eq!(format_mm_ss(300_000).as_str(), "05:00");
        assert_eq!(format_mm_ss(99 * 60_000).as_str(), "99:00");
    }

    #[test]
    fn test_next_tick_on_second_boundaries() {
        let cd = Countdown::start(10_250, 1);
        assert_eq!(cd.next_tick_ms(10_250), 11_250);
        assert_eq!(cd.next_tick_ms(11_249), 11_250);
        assert_eq!(cd.next_tick_ms(11_250), 12_250);
        // Capped at the end
        assert_eq!(cd.next_tick_ms(70_000), cd.end_ms());
    }

    proptest! {
        #[test]
        fn remaining_plus_elapsed_covers_duration(
            start in 0u64..1_000_000_000,
            minutes in 1u8..=99,
            offset in 0u64..10_000_000,
        ) {
            let cd = Countdown::start(start, minutes);
            let now = start + offset;
            let elapsed = cd.elapsed_ms(now).min(cd.duration_ms);
            prop_assert_eq!(elapsed + cd.remaining_ms(now), cd.duration_ms);
            prop_assert!(cd.progress_permille(now) <= 1000);
        }

        #[test]
        fn next_tick_is_in_the_future_until_the_end(
            start in 0u64..1_000_000,
            minutes in 1u8..=10,
            offset in 0u64..600_000,
        ) {
            let cd = Countdown::start(start, minutes);
            let now = start + offset;
            let tick = cd.next_tick_ms(now);
            if now < cd.end_ms() {
                prop_assert!(tick > now);
            }
            prop_assert!(tick <= cd.end_ms());
        }
    }
}
