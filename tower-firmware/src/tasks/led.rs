//! LED pattern task
//!
//! Owns one [`PatternLed`] and sleeps until its next edge or a new command.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Instant, Timer};

use tower_core::traits::Led;

use crate::board::BoardLed;
use crate::channels::{LedChannel, LedCommand};

/// LED task - one per LED
#[embassy_executor::task(pool_size = 2)]
pub async fn led_task(mut led: BoardLed, commands: &'static LedChannel) {
    info!("LED task started");

    loop {
        let next = led.tick(Instant::now().as_millis());

        let command = match next {
            Some(at) => match select(commands.receive(), Timer::at(Instant::from_millis(at))).await {
                Either::First(command) => Some(command),
                Either::Second(()) => None,
            },
            None => Some(commands.receive().await),
        };

        match command {
            Some(LedCommand::Mode(mode)) => {
                trace!("LED mode {:?}", mode);
                led.set_mode(mode);
            }
            Some(LedCommand::Pulse(ms)) => {
                trace!("LED pulse {} ms", ms);
                led.pulse(ms);
            }
            None => {}
        }
    }
}
