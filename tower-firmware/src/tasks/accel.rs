//! Accelerometer task
//!
//! Applies alarm commands from the controller and turns INT1 edges into
//! [`AppEvent::AccelAlarm`].

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_stm32::exti::ExtiInput;
use embassy_time::{Duration, Timer};

use tower_core::app::{AccelCommand, AppEvent};

use crate::board::Accel;
use crate::channels::{post, ACCEL_CMD};

/// Pause after a bus error before touching the sensor again
const ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Accelerometer task
#[embassy_executor::task]
pub async fn accel_task(mut accel: Accel, mut int: ExtiInput<'static>) {
    info!("Accelerometer task started");

    if let Err(e) = accel.init() {
        error!("Accelerometer init failed: {:?}", Debug2Format(&e));
        // Keep the signal drained so the controller never waits on us
        loop {
            let command = ACCEL_CMD.wait().await;
            warn!("Accelerometer unavailable, ignoring {:?}", command);
        }
    }

    loop {
        match select(ACCEL_CMD.wait(), int.wait_for_high()).await {
            Either::First(command) => {
                let result = match command {
                    AccelCommand::Enable(alarm) => accel.enable_alarm(alarm),
                    AccelCommand::Disable => accel.disable_alarm(),
                };
                match result {
                    Ok(()) => debug!("Accelerometer {:?}", command),
                    Err(e) => {
                        warn!("Accelerometer command failed: {:?}", Debug2Format(&e));
                        Timer::after(ERROR_BACKOFF).await;
                    }
                }
            }
            Either::Second(()) => match accel.clear_interrupt() {
                Ok(true) => {
                    debug!("Accelerometer alarm");
                    post(AppEvent::AccelAlarm);
                }
                Ok(false) => {
                    // Latched line without a source, wait for it to drop
                    int.wait_for_low().await;
                }
                Err(e) => {
                    warn!("Accelerometer read failed: {:?}", Debug2Format(&e));
                    Timer::after(ERROR_BACKOFF).await;
                }
            },
        }
    }
}
