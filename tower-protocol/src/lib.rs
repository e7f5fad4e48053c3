//! Gateway link protocol
//!
//! The LCD module does not own a radio stack. Everything it wants to say to
//! the outside world (pairing, published readings) and everything it hears
//! back (subscribed values) travels as framed messages over a serial link to
//! a gateway, which bridges them onto the radio network.
//!
//! # Frame format
//!
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬──────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD     │ CRC8 │
//! │ 1B    │ 1B     │ 1B   │ 0–64B       │ 1B   │
//! └───────┴────────┴──────┴─────────────┴──────┘
//! ```
//!
//! Payloads are `postcard`-encoded message bodies.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod frame;
pub mod messages;
pub mod topic;

pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use messages::{GatewayMessage, NodeMessage, MAX_NAME_LEN};
pub use topic::{Topic, Value};
