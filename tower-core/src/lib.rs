//! Board-agnostic application logic for the LCD module firmware
//!
//! This crate contains everything that does not touch real hardware:
//!
//! - Peripheral traits (LCD, LED, clock) and the events peripherals produce
//! - Battery status tracking
//! - Configuration types and validation
//! - Rendering helpers (centred text, progress bar, battery icon)
//! - The countdown timer state machine and elapsed-time arithmetic
//! - The three applications: dashboard, bucket monitor, countdown timer
//!
//! Applications are pure: they consume an [`app::AppEvent`], return
//! [`app::Actions`] for the firmware to carry out, redraw on request and
//! report when they next want to be woken.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod app;
pub mod battery;
pub mod config;
pub mod input;
pub mod render;
pub mod state;
pub mod timer;
pub mod traits;

pub use tower_protocol::{NodeMessage, Topic, Value};
