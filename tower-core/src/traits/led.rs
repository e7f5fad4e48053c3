//! LED trait

/// LED operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedMode {
    #[default]
    Off,
    On,
    /// 1 s period, 50 % duty
    Blink,
    /// 2 s period, 50 % duty
    BlinkSlow,
    /// 250 ms period, 50 % duty
    BlinkFast,
    /// Short flash once per second
    Flash,
}

/// Trait for an indicator LED
pub trait Led {
    /// Switch to a steady mode
    fn set_mode(&mut self, mode: LedMode);

    /// Turn the LED on for `duration_ms`, then return to the current mode
    fn pulse(&mut self, duration_ms: u32);

    /// Current mode
    fn mode(&self) -> LedMode;
}
