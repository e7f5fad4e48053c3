//! Applications
//!
//! Each firmware variant runs exactly one [`Application`]. The firmware
//! controller feeds it events, carries out the returned [`Actions`],
//! redraws when asked and sleeps until [`Application::next_wake`].

pub mod bucket;
pub mod countdown;
pub mod dashboard;

use heapless::Vec;

use crate::battery::BatteryStatus;
use crate::input::{Button, ButtonEvent};
use crate::traits::{AccelAlarm, BatteryEvent, Lcd, LcdError, LedMode};
use tower_protocol::{NodeMessage, Topic, Value};

pub use bucket::BucketMonitor;
pub use countdown::CountdownTimer;
pub use dashboard::Dashboard;

/// Maximum gateway messages produced by a single event
pub const MAX_MESSAGES: usize = 4;

/// Everything an application can react to
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppEvent {
    /// Button gesture
    Button(Button, ButtonEvent),
    /// Battery monitor event with the monitor's current reading
    Battery(BatteryEvent, Option<f32>),
    /// Accelerometer alarm fired
    AccelAlarm,
    /// Value received from the gateway
    Radio(Topic, Value),
    /// The time returned by [`Application::next_wake`] was reached
    Wake,
}

/// Accelerometer alarm changes requested by an application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelCommand {
    Enable(AccelAlarm),
    Disable,
}

/// Side effects requested by an application
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Actions {
    /// New mode for the module LED
    pub led: Option<LedMode>,
    /// New mode for the red LED on the LCD board
    pub lcd_led: Option<LedMode>,
    /// One-shot pulse on the module LED
    pub led_pulse_ms: Option<u32>,
    /// Accelerometer alarm change
    pub accel: Option<AccelCommand>,
    /// Messages for the gateway
    pub messages: Vec<NodeMessage, MAX_MESSAGES>,
    /// The screen needs a redraw
    pub redraw: bool,
}

impl Actions {
    /// No side effects
    pub fn none() -> Self {
        Self::default()
    }

    /// Only a redraw
    pub fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    /// Queue a publish message
    ///
    /// Returns false if the message did not fit.
    pub fn publish(&mut self, topic: Topic, value: Value) -> bool {
        self.messages
            .push(NodeMessage::publish(topic, value))
            .is_ok()
    }

    /// Check whether nothing needs doing
    pub fn is_empty(&self) -> bool {
        self.led.is_none()
            && self.lcd_led.is_none()
            && self.led_pulse_ms.is_none()
            && self.accel.is_none()
            && self.messages.is_empty()
            && !self.redraw
    }
}

/// A firmware application
pub trait Application {
    /// Boot actions, called once before any event
    fn start(&mut self, now: u64) -> Actions;

    /// React to an event
    fn handle(&mut self, event: AppEvent, now: u64) -> Actions;

    /// Redraw the whole screen
    ///
    /// Does nothing while the panel is still busy with a previous frame.
    fn render<L: Lcd>(&self, lcd: &mut L, now: u64) -> Result<(), LcdError>;

    /// Absolute clock time of the next [`AppEvent::Wake`]
    ///
    /// `None` means there is nothing to do until an external event.
    fn next_wake(&self, now: u64) -> Option<u64>;
}

/// Shared battery event handling: update the status and publish
pub(crate) fn handle_battery(
    status: &mut BatteryStatus,
    event: BatteryEvent,
    voltage: Option<f32>,
    actions: &mut Actions,
) {
    status.apply(event, voltage);
    match event {
        BatteryEvent::Update => {
            if let Some(v) = status.voltage {
                actions.publish(Topic::BatteryVoltage, Value::Float(v));
            }
        }
        BatteryEvent::LevelLow | BatteryEvent::LevelCritical => {
            actions.publish(Topic::BatteryLevel, Value::Int(status.level() as i32));
        }
        BatteryEvent::Error => {}
    }
}
