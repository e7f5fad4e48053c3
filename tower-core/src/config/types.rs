//! Configuration type definitions

use crate::traits::AccelAlarm;

/// Maximum node name / version length accepted by the gateway
pub const MAX_NAME_LEN: usize = tower_protocol::MAX_NAME_LEN;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Node name is empty or too long
    InvalidName,
    /// Firmware version string is empty or too long
    InvalidVersion,
    /// An interval or timeout is zero
    ZeroInterval,
    /// A percentage is above 100
    PercentOutOfRange,
    /// Alarm clear level is not below the raise level
    InvertedHysteresis,
    /// Minute range is empty or the default lies outside it
    InvalidMinuteRange,
    /// Step size is zero
    ZeroStep,
}

/// Node identity and shared settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeConfig {
    /// Name sent in the pairing request
    pub name: &'static str,
    /// Firmware version sent in the pairing request
    pub version: &'static str,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: "lcd-display",
            version: "v1.0.0",
        }
    }
}

impl NodeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() || self.name.len() > MAX_NAME_LEN {
            return Err(ConfigError::InvalidName);
        }
        if self.version.is_empty() || self.version.len() > MAX_NAME_LEN {
            return Err(ConfigError::InvalidVersion);
        }
        Ok(())
    }
}

/// Battery pack fitted to the module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryPack {
    /// 2x AAA
    #[default]
    Mini,
    /// 4x AAA
    Standard,
}

/// Battery monitor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryConfig {
    /// Fitted pack
    pub pack: BatteryPack,
    /// Time between measurements
    pub update_interval_ms: u32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            pack: BatteryPack::Mini,
            update_interval_ms: 60 * 60 * 1000,
        }
    }
}

impl BatteryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

/// Dashboard application settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DashboardConfig {
    /// Length of the LED pulse at boot
    pub boot_pulse_ms: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            boot_pulse_ms: 2000,
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.boot_pulse_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

/// Bucket monitor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BucketConfig {
    /// Raise the alarm at or above this level (%)
    pub alarm_on_pct: u8,
    /// Clear the alarm at or below this level (%)
    pub alarm_off_pct: u8,
    /// Readings older than this are shown as missing
    pub stale_after_ms: u32,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            alarm_on_pct: 90,
            alarm_off_pct: 85,
            stale_after_ms: 10 * 60 * 1000,
        }
    }
}

impl BucketConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alarm_on_pct > 100 || self.alarm_off_pct > 100 {
            return Err(ConfigError::PercentOutOfRange);
        }
        if self.alarm_off_pct >= self.alarm_on_pct {
            return Err(ConfigError::InvertedHysteresis);
        }
        if self.stale_after_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

/// Countdown timer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CountdownConfig {
    /// Minutes shown after boot and after a reset
    pub default_minutes: u8,
    /// Lowest settable duration
    pub min_minutes: u8,
    /// Highest settable duration
    pub max_minutes: u8,
    /// Minutes added/removed per click
    pub step_minutes: u8,
    /// Return to sleep after this long without input while setting
    pub idle_timeout_ms: u32,
    /// Stop ringing and sleep after this long
    pub alarm_timeout_ms: u32,
    /// Alarm screen/LED blink period
    pub blink_period_ms: u32,
    /// Accelerometer alarm that wakes the timer from sleep
    pub wake_alarm: Option<AccelAlarm>,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            default_minutes: 5,
            min_minutes: 1,
            max_minutes: 99,
            step_minutes: 1,
            idle_timeout_ms: 30_000,
            alarm_timeout_ms: 60_000,
            blink_period_ms: 500,
            wake_alarm: Some(AccelAlarm::default()),
        }
    }
}

impl CountdownConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_minutes == 0
            || self.min_minutes > self.max_minutes
            || self.default_minutes < self.min_minutes
            || self.default_minutes > self.max_minutes
        {
            return Err(ConfigError::InvalidMinuteRange);
        }
        if self.step_minutes == 0 {
            return Err(ConfigError::ZeroStep);
        }
        if self.idle_timeout_ms == 0 || self.alarm_timeout_ms == 0 || self.blink_period_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }
}

/// Everything the firmware needs, in one place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppConfig {
    pub node: NodeConfig,
    pub battery: BatteryConfig,
    pub dashboard: DashboardConfig,
    pub bucket: BucketConfig,
    pub countdown: CountdownConfig,
}

impl AppConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.node.validate()?;
        self.battery.validate()?;
        self.dashboard.validate()?;
        self.bucket.validate()?;
        self.countdown.validate()
    }
}
