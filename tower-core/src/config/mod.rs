//! Configuration
//!
//! Configuration types shared by the applications. The firmware compiles
//! its values from `node.toml` at build time and re-validates them at boot.

pub mod types;

pub use types::{
    AppConfig, BatteryConfig, BatteryPack, BucketConfig, ConfigError, CountdownConfig,
    DashboardConfig, NodeConfig,
};
