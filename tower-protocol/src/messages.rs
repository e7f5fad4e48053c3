//! Message types for the gateway link
//!
//! Message types are divided into two directions:
//! - Node → Gateway: pairing request, published values
//! - Gateway → Node: subscribed value updates, pairing confirmation

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};
use crate::topic::{Topic, Value};

// Message type IDs: Node → Gateway
pub const MSG_PAIRING_REQUEST: u8 = 0x01;
pub const MSG_PUBLISH: u8 = 0x02;

// Message type IDs: Gateway → Node
pub const MSG_UPDATE: u8 = 0x20;
pub const MSG_PAIRING_ACCEPTED: u8 = 0x21;

/// Maximum length of the node name and firmware version strings
pub const MAX_NAME_LEN: usize = 16;

/// Messages from the module to the gateway
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeMessage {
    /// Announce this node to the gateway
    PairingRequest {
        name: String<MAX_NAME_LEN>,
        version: String<MAX_NAME_LEN>,
    },
    /// Publish a value on a topic
    Publish { topic: Topic, value: Value },
}

/// Messages from the gateway to the module
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GatewayMessage {
    /// A subscribed topic changed
    Update { topic: Topic, value: Value },
    /// The gateway accepted our pairing request
    PairingAccepted,
}

#[derive(Serialize, Deserialize)]
struct PairingBody {
    name: String<MAX_NAME_LEN>,
    version: String<MAX_NAME_LEN>,
}

#[derive(Serialize, Deserialize)]
struct TopicValueBody {
    topic: Topic,
    value: Value,
}

fn encode_body<T: Serialize>(msg_type: u8, body: &T) -> Result<Frame, FrameError> {
    let mut buf = [0u8; MAX_PAYLOAD_SIZE];
    let used = postcard::to_slice(body, &mut buf).map_err(|_| FrameError::PayloadTooLarge)?;
    Frame::new(msg_type, used)
}

impl NodeMessage {
    /// Build a pairing request, truncating over-long strings
    pub fn pairing_request(name: &str, version: &str) -> Self {
        NodeMessage::PairingRequest {
            name: truncated(name),
            version: truncated(version),
        }
    }

    /// Build a publish message
    pub fn publish(topic: Topic, value: Value) -> Self {
        NodeMessage::Publish { topic, value }
    }

    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            NodeMessage::PairingRequest { name, version } => encode_body(
                MSG_PAIRING_REQUEST,
                &PairingBody {
                    name: name.clone(),
                    version: version.clone(),
                },
            ),
            NodeMessage::Publish { topic, value } => encode_body(
                MSG_PUBLISH,
                &TopicValueBody {
                    topic: *topic,
                    value: *value,
                },
            ),
        }
    }

    /// Parse a message from a frame (gateway side, and tests)
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_PAIRING_REQUEST => {
                let body: PairingBody =
                    postcard::from_bytes(&frame.payload).map_err(|_| FrameError::Payload)?;
                Ok(NodeMessage::PairingRequest {
                    name: body.name,
                    version: body.version,
                })
            }
            MSG_PUBLISH => {
                let body: TopicValueBody =
                    postcard::from_bytes(&frame.payload).map_err(|_| FrameError::Payload)?;
                Ok(NodeMessage::Publish {
                    topic: body.topic,
                    value: body.value,
                })
            }
            _ => Err(FrameError::InvalidFrame),
        }
    }
}

impl GatewayMessage {
    /// Parse a message from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_UPDATE => {
                let body: TopicValueBody =
                    postcard::from_bytes(&frame.payload).map_err(|_| FrameError::Payload)?;
                Ok(GatewayMessage::Update {
                    topic: body.topic,
                    value: body.value,
                })
            }
            MSG_PAIRING_ACCEPTED => Ok(GatewayMessage::PairingAccepted),
            _ => Err(FrameError::InvalidFrame),
        }
    }

    /// Encode this message into a frame (gateway side, and tests)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            GatewayMessage::Update { topic, value } => encode_body(
                MSG_UPDATE,
                &TopicValueBody {
                    topic: *topic,
                    value: *value,
                },
            ),
            GatewayMessage::PairingAccepted => Ok(Frame::empty(MSG_PAIRING_ACCEPTED)),
        }
    }
}

fn truncated(text: &str) -> String<MAX_NAME_LEN> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
