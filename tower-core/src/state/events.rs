//! Events that trigger state transitions

/// Events that can trigger countdown state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // User / motion events
    /// Button press or accelerometer alarm while asleep
    Wake,
    /// Minutes changed while setting
    Adjust,
    /// User confirmed the duration
    Start,
    /// User abandoned a running countdown
    Cancel,
    /// User silenced the alarm
    Acknowledge,

    // Clock events
    /// No input while setting for the idle timeout
    IdleTimeout,
    /// Countdown reached zero
    Expired,
    /// Alarm rang for its full timeout without acknowledgement
    AlarmTimeout,
}

impl Event {
    /// Check if this event comes from the user or motion rather than the clock
    pub fn is_user_event(&self) -> bool {
        matches!(
            self,
            Event::Wake | Event::Adjust | Event::Start | Event::Cancel | Event::Acknowledge
        )
    }
}
