//! Embassy tasks
//!
//! Input tasks post [`AppEvent`](tower_core::app::AppEvent)s, the
//! controller runs the application, and output tasks carry out its actions.

mod accel;
mod battery;
mod button;
mod controller;
mod gateway;
mod led;

pub use accel::accel_task;
pub use battery::battery_task;
pub use button::button_task;
pub use controller::controller_task;
pub use gateway::{gateway_rx_task, gateway_tx_task};
pub use led::led_task;
