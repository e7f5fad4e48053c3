//! Application variant selected by cargo feature

use tower_core::config::AppConfig;

#[cfg(feature = "dashboard")]
pub type App = tower_core::app::Dashboard;

#[cfg(feature = "bucket")]
pub type App = tower_core::app::BucketMonitor;

#[cfg(feature = "countdown")]
pub type App = tower_core::app::CountdownTimer;

#[cfg(feature = "dashboard")]
pub const VARIANT: &str = "dashboard";

#[cfg(feature = "bucket")]
pub const VARIANT: &str = "bucket";

#[cfg(feature = "countdown")]
pub const VARIANT: &str = "countdown";

/// Build the application from the node configuration
#[cfg(feature = "dashboard")]
pub fn build(config: &AppConfig) -> App {
    App::new(config.node, config.dashboard)
}

#[cfg(feature = "bucket")]
pub fn build(config: &AppConfig) -> App {
    App::new(config.bucket)
}

#[cfg(feature = "countdown")]
pub fn build(config: &AppConfig) -> App {
    App::new(config.countdown)
}
