//! Countdown timer state machine
//!
//! The state machine is explicit, finite, and deterministic. Timing,
//! minute adjustment and side effects live in the countdown application;
//! this module only decides which state follows which.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::State;
