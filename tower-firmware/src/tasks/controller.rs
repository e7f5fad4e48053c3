//! Main controller task
//!
//! Runs the application: feeds it events and wake-ups, fans the returned
//! actions out to the output tasks and redraws the screen on request.

use defmt::*;
use embassy_futures::select::{select3, Either3};
use embassy_time::{Duration, Instant, Ticker, Timer};
use portable_atomic::Ordering;

use tower_core::app::{Actions, AppEvent, Application};
use tower_core::traits::Clock;

use crate::app::App;
use crate::board::Display;
use crate::channels::{
    LedChannel, LedCommand, ACCEL_CMD, DROPPED_EVENTS, EVENTS, LCD_LED_CMD, LED_CMD, OUTBOX,
};
use crate::clock::EmbassyClock;

/// The panel needs its VCOM inverted at least once a second
const VCOM_PERIOD: Duration = Duration::from_secs(1);

/// Controller task - main coordination loop
#[embassy_executor::task]
pub async fn controller_task(mut app: App, mut display: Display) {
    info!("Controller task started");

    let clock = EmbassyClock;

    if let Err(e) = display.target_mut().clear_display() {
        warn!("LCD clear failed: {:?}", Debug2Format(&e));
    }

    let actions = app.start(clock.now_ms());
    apply(&app, &mut display, actions, clock.now_ms());

    let mut vcom = Ticker::every(VCOM_PERIOD);
    let mut dropped_seen = 0;

    loop {
        let now = clock.now_ms();
        let wake = app.next_wake(now);

        let event = match select3(
            EVENTS.receive(),
            wait_until(wake),
            vcom.next(),
        )
        .await
        {
            Either3::First(event) => Some(event),
            Either3::Second(()) => Some(AppEvent::Wake),
            Either3::Third(()) => {
                if let Err(e) = display.target_mut().toggle_vcom() {
                    warn!("VCOM toggle failed: {:?}", Debug2Format(&e));
                }
                None
            }
        };

        let dropped = DROPPED_EVENTS.load(Ordering::Relaxed);
        if dropped != dropped_seen {
            warn!("{} events dropped so far", dropped);
            dropped_seen = dropped;
        }

        if let Some(event) = event {
            trace!("Event: {:?}", event);
            let now = clock.now_ms();
            let actions = app.handle(event, now);
            apply(&app, &mut display, actions, now);
        }
    }
}

/// Sleep until an absolute clock time, forever if there is none
async fn wait_until(at: Option<u64>) {
    match at {
        Some(ms) => Timer::at(Instant::from_millis(ms)).await,
        None => core::future::pending().await,
    }
}

/// Carry out the side effects requested by the application
fn apply(app: &App, display: &mut Display, actions: Actions, now: u64) {
    if actions.is_empty() {
        return;
    }

    if let Some(mode) = actions.led {
        send_led(&LED_CMD, LedCommand::Mode(mode));
    }
    if let Some(ms) = actions.led_pulse_ms {
        send_led(&LED_CMD, LedCommand::Pulse(ms));
    }
    if let Some(mode) = actions.lcd_led {
        send_led(&LCD_LED_CMD, LedCommand::Mode(mode));
    }
    if let Some(command) = actions.accel {
        ACCEL_CMD.signal(command);
    }

    for message in actions.messages {
        if OUTBOX.try_send(message).is_err() {
            warn!("Gateway outbox full, dropping message");
        }
    }

    if actions.redraw {
        if let Err(e) = app.render(display, now) {
            warn!("Render failed: {:?}", e);
        }
    }
}

fn send_led(channel: &'static LedChannel, command: LedCommand) {
    if channel.try_send(command).is_err() {
        warn!("LED channel full, dropping {:?}", command);
    }
}
