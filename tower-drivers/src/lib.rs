//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in tower-core for the parts fitted to the LCD module:
//!
//! - Sharp LS013B7DH03 memory LCD and an `embedded-graphics` canvas
//! - LIS2DH12 accelerometer (motion wake-up)
//! - Battery gauge (ADC counts to pack voltage and level events)
//! - Pattern LED (blink, flash, pulse)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod accel;
pub mod battery;
pub mod lcd;
pub mod led;
