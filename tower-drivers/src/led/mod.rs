//! Pattern LED
//!
//! Drives an LED on a GPIO pin through the [`LedMode`] patterns. The owner
//! calls [`PatternLed::tick`] with the current time; it updates the pin
//! and reports when the output next changes so the caller can sleep until
//! then.
//!
//! Pins must be infallible, as push-pull GPIO outputs are.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;

use tower_core::traits::{Led, LedMode};

/// Blink timing of a mode: (period, on time), both in ms
const fn pattern(mode: LedMode) -> Option<(u64, u64)> {
    match mode {
        LedMode::Off | LedMode::On => None,
        LedMode::Blink => Some((1000, 500)),
        LedMode::BlinkSlow => Some((2000, 1000)),
        LedMode::BlinkFast => Some((250, 125)),
        LedMode::Flash => Some((1000, 50)),
    }
}

/// LED driven by a pattern generator
pub struct PatternLed<P> {
    pin: P,
    /// If true, LED ON = pin LOW
    inverted: bool,
    mode: LedMode,
    /// Start of the current pattern, set on the first tick after a change
    pattern_start: Option<u64>,
    /// Requested pulse length, not yet started
    pending_pulse: Option<u32>,
    pulse_until: Option<u64>,
    lit: bool,
}

impl<P: OutputPin<Error = Infallible>> PatternLed<P> {
    /// Create a new LED, initially off
    ///
    /// # Arguments
    /// - `pin`: The GPIO pin driving the LED
    /// - `inverted`: If true, the LED is lit when the pin is LOW
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut led = Self {
            pin,
            inverted,
            mode: LedMode::Off,
            pattern_start: None,
            pending_pulse: None,
            pulse_until: None,
            lit: true,
        };
        led.drive(false);
        led
    }

    /// Whether the LED is currently lit
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Update the output for time `now_ms`
    ///
    /// Returns the next time the output changes, or `None` if it stays as
    /// it is until the mode changes.
    pub fn tick(&mut self, now_ms: u64) -> Option<u64> {
        if let Some(duration) = self.pending_pulse.take() {
            self.pulse_until = Some(now_ms + duration as u64);
        }

        if let Some(until) = self.pulse_until {
            if now_ms < until {
                self.drive(true);
                return Some(until);
            }
            self.pulse_until = None;
            // Pattern resumes from the end of the pulse
            self.pattern_start = Some(until);
        }

        let start = *self.pattern_start.get_or_insert(now_ms);

        match pattern(self.mode) {
            None => {
                self.drive(self.mode == LedMode::On);
                None
            }
            Some((period, on)) => {
                let elapsed = now_ms.saturating_sub(start);
                let phase = elapsed % period;
                let cycle_start = now_ms - phase;
                if phase < on {
                    self.drive(true);
                    Some(cycle_start + on)
                } else {
                    self.drive(false);
                    Some(cycle_start + period)
                }
            }
        }
    }

    /// Release the pin
    pub fn release(self) -> P {
        self.pin
    }

    fn drive(&mut self, lit: bool) {
        if lit == self.lit {
            return;
        }
        self.lit = lit;
        // Active-high: lit → high; inverted: lit → low
        let result = if lit != self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(never) = result {
            match never {}
        }
    }
}

impl<P: OutputPin<Error = Infallible>> Led for PatternLed<P> {
    fn set_mode(&mut self, mode: LedMode) {
        if mode != self.mode {
            self.mode = mode;
            self.pattern_start = None;
        }
    }

    fn pulse(&mut self, duration_ms: u32) {
        self.pending_pulse = Some(duration_ms);
    }

    fn mode(&self) -> LedMode {
        self.mode
    }
}
