//! Peripheral abstraction traits
//!
//! These traits define the interface between the application logic
//! and board-specific implementations.

pub mod lcd;
pub mod led;
pub mod sensors;

pub use lcd::{Color, Font, Lcd, LcdError, LCD_HEIGHT, LCD_WIDTH};
pub use led::{Led, LedMode};
pub use sensors::{AccelAlarm, BatteryEvent, Clock};
