//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Every input source posts [`AppEvent`]s to one channel drained by the
//! controller; the controller fans its [`Actions`](tower_core::app::Actions)
//! out to the output tasks.

use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicU32, Ordering};

use tower_core::app::{AccelCommand, AppEvent};
use tower_core::traits::LedMode;
use tower_protocol::NodeMessage;

/// Channel capacity for application events
const EVENT_CHANNEL_SIZE: usize = 16;

/// Channel capacity for outgoing gateway messages
const OUTBOX_SIZE: usize = 8;

/// Channel capacity per LED
const LED_CHANNEL_SIZE: usize = 4;

/// Command for an LED task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum LedCommand {
    Mode(LedMode),
    Pulse(u32),
}

pub type LedChannel = Channel<CriticalSectionRawMutex, LedCommand, LED_CHANNEL_SIZE>;

/// Events for the application (buttons, battery, accelerometer, gateway)
pub static EVENTS: Channel<CriticalSectionRawMutex, AppEvent, EVENT_CHANNEL_SIZE> =
    Channel::new();

/// Messages waiting to go out to the gateway
pub static OUTBOX: Channel<CriticalSectionRawMutex, NodeMessage, OUTBOX_SIZE> = Channel::new();

/// Core module LED
pub static LED_CMD: LedChannel = Channel::new();

/// LCD module red LED
pub static LCD_LED_CMD: LedChannel = Channel::new();

/// Accelerometer alarm configuration (latest wins)
pub static ACCEL_CMD: Signal<CriticalSectionRawMutex, AccelCommand> = Signal::new();

/// Events lost because the controller fell behind
pub static DROPPED_EVENTS: AtomicU32 = AtomicU32::new(0);

/// Post an event to the controller, dropping it if the channel is full
pub fn post(event: AppEvent) {
    if EVENTS.try_send(event).is_err() {
        let dropped = DROPPED_EVENTS.fetch_add(1, Ordering::Relaxed) + 1;
        warn!("Event channel full, dropped {:?} ({} total)", event, dropped);
    }
}
