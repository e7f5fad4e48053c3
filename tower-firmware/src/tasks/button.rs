//! Button task
//!
//! One instance per button. Measures how long the button is held and posts
//! a click or hold gesture.

use defmt::*;
use embassy_stm32::exti::ExtiInput;
use embassy_time::{with_timeout, Duration, Instant, Timer};

use tower_core::app::AppEvent;
use tower_core::input::{Button, ButtonEvent, ButtonTiming};

use crate::channels::post;

/// Button gesture task
#[embassy_executor::task(pool_size = 2)]
pub async fn button_task(mut btn: ExtiInput<'static>, button: Button, timing: ButtonTiming) {
    info!("Button task started ({:?})", button);

    let debounce = Duration::from_millis(timing.debounce_ms as u64);
    let hold = Duration::from_millis(timing.hold_ms as u64);

    loop {
        btn.wait_for_falling_edge().await;
        let press_start = Instant::now();

        Timer::after(debounce).await;
        if btn.is_high() {
            // Bounce
            continue;
        }

        // Hold fires while the button is still down
        let remaining = hold.checked_sub(press_start.elapsed()).unwrap_or(Duration::MIN);
        match with_timeout(remaining, btn.wait_for_rising_edge()).await {
            Ok(()) => {
                let pressed_ms = press_start.elapsed().as_millis() as u32;
                if let Some(event) = timing.classify(pressed_ms) {
                    debug!("Button {:?}: {:?} ({} ms)", button, event, pressed_ms);
                    post(AppEvent::Button(button, event));
                }
            }
            Err(_) => {
                debug!("Button {:?}: Hold", button);
                post(AppEvent::Button(button, ButtonEvent::Hold));
                btn.wait_for_rising_edge().await;
            }
        }

        // Debounce after release
        Timer::after(debounce).await;
    }
}
