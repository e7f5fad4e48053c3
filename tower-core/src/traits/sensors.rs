//! Battery, accelerometer and clock interfaces

/// Events produced by the battery monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryEvent {
    /// A new voltage measurement is available
    Update,
    /// Voltage dropped below the low threshold
    LevelLow,
    /// Voltage dropped below the critical threshold
    LevelCritical,
    /// Measurement failed
    Error,
}

/// Accelerometer wake-up alarm configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelAlarm {
    /// Acceleration on any axis that triggers the alarm, in milli-g
    pub threshold_mg: u16,
    /// How long the threshold must be exceeded, in milliseconds
    pub duration_ms: u16,
}

impl Default for AccelAlarm {
    fn default() -> Self {
        Self {
            threshold_mg: 250,
            duration_ms: 0,
        }
    }
}

/// Trait for a monotonic real-time clock
pub trait Clock {
    /// Milliseconds since an arbitrary fixed epoch
    fn now_ms(&self) -> u64;
}
