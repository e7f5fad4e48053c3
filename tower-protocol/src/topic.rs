//! Published and subscribed topics

use serde::de::{Deserializer, Error as _, Unexpected};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Topics the module publishes to or receives from the gateway
///
/// The numeric id is what travels on the wire; the path is the name the
/// gateway uses on its side of the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Topic {
    /// Battery voltage in volts (float)
    BatteryVoltage = 0x01,
    /// Battery level: 0 = ok, 1 = low, 2 = critical (int)
    BatteryLevel = 0x02,
    /// Remote thermometer reading in °C (float)
    Temperature = 0x10,
    /// Bucket fill level in percent (float or int)
    BucketLevel = 0x20,
    /// Bucket nearly-full alarm (bool)
    BucketAlarm = 0x21,
    /// Countdown timer state id (int)
    CountdownState = 0x30,
    /// Countdown duration in minutes, sent when a countdown starts (int)
    CountdownMinutes = 0x31,
}

impl Topic {
    /// Every topic, in wire-id order
    pub const ALL: [Topic; 7] = [
        Topic::BatteryVoltage,
        Topic::BatteryLevel,
        Topic::Temperature,
        Topic::BucketLevel,
        Topic::BucketAlarm,
        Topic::CountdownState,
        Topic::CountdownMinutes,
    ];

    /// Wire id
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Look up a topic by wire id
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.id() == id)
    }

    /// Gateway-side topic path
    pub fn path(self) -> &'static str {
        match self {
            Topic::BatteryVoltage => "battery/-/voltage",
            Topic::BatteryLevel => "battery/-/level",
            Topic::Temperature => "thermometer/-/temperature",
            Topic::BucketLevel => "bucket/-/level",
            Topic::BucketAlarm => "bucket/-/alarm",
            Topic::CountdownState => "countdown/-/state",
            Topic::CountdownMinutes => "countdown/-/minutes",
        }
    }
}

impl Serialize for Topic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.id())
    }
}

impl<'de> Deserialize<'de> for Topic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = u8::deserialize(deserializer)?;
        Topic::from_id(id)
            .ok_or_else(|| D::Error::invalid_value(Unexpected::Unsigned(id as u64), &"a topic id"))
    }
}

/// A published or received value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Value {
    Float(f32),
    Int(i32),
    Bool(bool),
}

impl Value {
    /// Numeric view of the value; bools map to 0.0/1.0
    pub fn as_f32(self) -> f32 {
        match self {
            Value::Float(v) => v,
            Value::Int(v) => v as f32,
            Value::Bool(v) => {
                if v {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}
