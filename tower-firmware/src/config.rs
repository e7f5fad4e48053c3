//! Node configuration
//!
//! Values come from `node.toml`, validated and compiled into constants by
//! build.rs. They are validated again at boot so a bad build can never run
//! with inconsistent settings.

use defmt::*;

#[allow(unused_imports)]
use tower_core::config::{
    AppConfig, BatteryConfig, BatteryPack, BucketConfig, CountdownConfig, DashboardConfig,
    NodeConfig,
};
#[allow(unused_imports)]
use tower_core::traits::AccelAlarm;

include!(concat!(env!("OUT_DIR"), "/config.rs"));

/// Load the compiled configuration, falling back to defaults if invalid
pub fn load() -> AppConfig {
    match NODE_CONFIG.validate() {
        Ok(()) => {
            info!(
                "Config: node={} version={}",
                NODE_CONFIG.node.name, NODE_CONFIG.node.version
            );
            NODE_CONFIG
        }
        Err(e) => {
            error!("Invalid configuration ({:?}), using defaults", e);
            AppConfig::default()
        }
    }
}
