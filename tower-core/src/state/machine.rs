//! State machine definition

use super::events::Event;

/// Countdown timer states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Display blank, waiting for a button or motion
    #[default]
    Sleep,
    /// User choosing the duration
    TimeSetting,
    /// Counting down
    Countdown,
    /// Time is up, alarm ringing
    Alarm,
}

impl State {
    /// Numeric id published to the gateway
    pub fn id(&self) -> i32 {
        match self {
            State::Sleep => 0,
            State::TimeSetting => 1,
            State::Countdown => 2,
            State::Alarm => 3,
        }
    }

    /// Check if the accelerometer should be able to wake us
    pub fn wakes_on_motion(&self) -> bool {
        matches!(self, State::Sleep)
    }

    /// Check if the alarm indicators should be active
    pub fn is_ringing(&self) -> bool {
        matches!(self, State::Alarm)
    }

    /// Process an event and return the next state
    ///
    /// Events that mean nothing in the current state leave it unchanged.
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            (Sleep, Wake) => TimeSetting,

            (TimeSetting, Adjust) => TimeSetting,
            (TimeSetting, Start) => Countdown,
            (TimeSetting, IdleTimeout) => Sleep,

            (Countdown, Cancel) => TimeSetting,
            (Countdown, Expired) => Alarm,

            (Alarm, Acknowledge) => TimeSetting,
            (Alarm, AlarmTimeout) => Sleep,

            _ => self,
        }
    }
}
