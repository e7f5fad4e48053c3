//! Accelerometer drivers

mod lis2dh12;

pub use lis2dh12::{Acceleration, AccelError, Lis2dh12, DEFAULT_ADDRESS};
