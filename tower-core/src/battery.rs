//! Battery status as seen by the applications

use core::fmt::Write;

use heapless::String;

use crate::traits::BatteryEvent;

/// Text buffer large enough for a formatted voltage
pub type VoltageText = String<10>;

/// Battery level classification published to the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryLevel {
    Ok = 0,
    Low = 1,
    Critical = 2,
}

/// Latest battery voltage plus latched low/critical flags
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryStatus {
    /// Last measured voltage, if any
    pub voltage: Option<f32>,
    /// Low level has been reported
    pub low: bool,
    /// Critical level has been reported
    pub critical: bool,
}

impl BatteryStatus {
    /// Create an empty status
    pub const fn new() -> Self {
        Self {
            voltage: None,
            low: false,
            critical: false,
        }
    }

    /// Apply a battery monitor event
    ///
    /// `voltage` is the monitor's current reading and only matters for
    /// [`BatteryEvent::Update`]. The low and critical flags never clear.
    pub fn apply(&mut self, event: BatteryEvent, voltage: Option<f32>) {
        match event {
            BatteryEvent::Update => {
                if voltage.is_some() {
                    self.voltage = voltage;
                }
            }
            BatteryEvent::LevelLow => self.low = true,
            BatteryEvent::LevelCritical => {
                self.low = true;
                self.critical = true;
            }
            BatteryEvent::Error => self.voltage = None,
        }
    }

    /// Current level classification
    pub fn level(&self) -> BatteryLevel {
        if self.critical {
            BatteryLevel::Critical
        } else if self.low {
            BatteryLevel::Low
        } else {
            BatteryLevel::Ok
        }
    }

    /// Voltage with one decimal place, or `--` when unknown
    pub fn format_voltage(&self) -> VoltageText {
        let mut text = String::new();
        match self.voltage {
            Some(v) => {
                let _ = write!(text, "{:.1}", v);
            }
            None => {
                let _ = text.push_str("--");
            }
        }
        text
    }
}
