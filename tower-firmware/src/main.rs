//! Tower LCD - firmware for the battery-powered 128x128 LCD module
//!
//! Runs one of three applications on the STM32L083 core module, chosen at
//! build time with a cargo feature:
//!
//! - `dashboard` (default): temperature from the gateway plus battery voltage
//! - `bucket`: remote bucket fill level with a full alarm
//! - `countdown`: kitchen-style countdown timer that sleeps until nudged
//!
//! The application itself lives in `tower-core` and is pure; the tasks in
//! this crate feed it events and carry out the actions it returns.

#![no_std]
#![no_main]

#[cfg(not(any(feature = "dashboard", feature = "bucket", feature = "countdown")))]
compile_error!("enable one application variant: dashboard, bucket or countdown");

#[cfg(any(
    all(feature = "dashboard", feature = "bucket"),
    all(feature = "dashboard", feature = "countdown"),
    all(feature = "bucket", feature = "countdown"),
))]
compile_error!(
    "only one application variant may be enabled; use --no-default-features --features <variant>"
);

use defmt::*;
use embassy_executor::Spawner;
use tower_core::input::{Button, ButtonTiming};
use tower_drivers::battery::BatteryGauge;
use {defmt_rtt as _, panic_probe as _};

use crate::board::Board;
use crate::channels::{LCD_LED_CMD, LED_CMD};

mod app;
mod board;
mod channels;
mod clock;
mod config;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Tower LCD firmware starting ({})", app::VARIANT);

    let p = embassy_stm32::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();

    let board = unwrap!(Board::init(p));

    let timing = ButtonTiming::default();
    let gauge = BatteryGauge::new(config.battery.pack);
    let (gateway_tx, gateway_rx) = board.gateway.split();

    // Spawn tasks
    spawner.spawn(tasks::led_task(board.led, &LED_CMD)).unwrap();
    spawner.spawn(tasks::led_task(board.lcd_led, &LCD_LED_CMD)).unwrap();
    spawner.spawn(tasks::button_task(board.left, Button::Left, timing)).unwrap();
    spawner.spawn(tasks::button_task(board.right, Button::Right, timing)).unwrap();
    spawner.spawn(tasks::accel_task(board.accel, board.accel_int)).unwrap();
    spawner
        .spawn(tasks::battery_task(
            board.adc,
            board.vref,
            board.battery_sense,
            gauge,
            config.battery.update_interval_ms,
        ))
        .unwrap();
    spawner.spawn(tasks::gateway_rx_task(gateway_rx)).unwrap();
    spawner.spawn(tasks::gateway_tx_task(gateway_tx)).unwrap();
    spawner
        .spawn(tasks::controller_task(app::build(&config), board.display))
        .unwrap();

    info!("All tasks spawned");
}
