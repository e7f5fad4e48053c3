//! Countdown timer with alarm
//!
//! Sleeps with a blank screen until a button press or a nudge of the
//! module wakes it. The user dials in a number of minutes, starts the
//! countdown, and the module rings when time is up.
//!
//! Controls:
//! - Time setting: left click / right click change the minutes, left hold
//!   restores the default, right hold starts the countdown
//! - Countdown: hold either button to cancel
//! - Alarm: any button or a shake silences it

use core::fmt::Write;

use heapless::String;

use super::{handle_battery, AccelCommand, Actions, AppEvent, Application};
use crate::battery::BatteryStatus;
use crate::config::CountdownConfig;
use crate::input::{Button, ButtonEvent};
use crate::render::{draw_battery_icon, draw_centered, draw_progress_bar};
use crate::state::{Event, State};
use crate::timer::{format_mm_ss, Countdown};
use crate::traits::{Color, Font, Lcd, LcdError, LedMode, LCD_HEIGHT, LCD_WIDTH};
use tower_protocol::{Topic, Value};

// Progress bar geometry
const BAR_X: u16 = 10;
const BAR_Y: u16 = 100;
const BAR_W: u16 = 108;
const BAR_H: u16 = 10;

/// Countdown timer application state
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    config: CountdownConfig,
    state: State,
    battery: BatteryStatus,
    /// Duration being set, kept across runs
    minutes: u8,
    countdown: Option<Countdown>,
    last_input_ms: u64,
    alarm_started_ms: u64,
}

impl CountdownTimer {
    pub fn new(config: CountdownConfig) -> Self {
        Self {
            config,
            state: State::Sleep,
            battery: BatteryStatus::new(),
            minutes: config.default_minutes,
            countdown: None,
            last_input_ms: 0,
            alarm_started_ms: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn countdown(&self) -> Option<&Countdown> {
        self.countdown.as_ref()
    }

    fn adjust_minutes(&mut self, up: bool) {
        let step = self.config.step_minutes;
        self.minutes = if up {
            self.minutes.saturating_add(step).min(self.config.max_minutes)
        } else {
            self.minutes.saturating_sub(step).max(self.config.min_minutes)
        };
    }

    /// Translate an application event into a state machine event
    ///
    /// Returns `None` when the event only needs a redraw or nothing at all.
    fn map_event(&mut self, event: AppEvent, now: u64) -> Option<Event> {
        match (self.state, event) {
            (State::Sleep, AppEvent::Button(..) | AppEvent::AccelAlarm) => Some(Event::Wake),

            (State::TimeSetting, AppEvent::Button(Button::Left, ButtonEvent::Click)) => {
                self.adjust_minutes(false);
                Some(Event::Adjust)
            }
            (State::TimeSetting, AppEvent::Button(Button::Right, ButtonEvent::Click)) => {
                self.adjust_minutes(true);
                Some(Event::Adjust)
            }
            (State::TimeSetting, AppEvent::Button(Button::Left, ButtonEvent::Hold)) => {
                self.minutes = self.config.default_minutes;
                Some(Event::Adjust)
            }
            (State::TimeSetting, AppEvent::Button(Button::Right, ButtonEvent::Hold)) => {
                Some(Event::Start)
            }
            (State::TimeSetting, AppEvent::Wake)
                if now >= self.last_input_ms + self.config.idle_timeout_ms as u64 =>
            {
                Some(Event::IdleTimeout)
            }

            (State::Countdown, AppEvent::Button(_, ButtonEvent::Hold)) => Some(Event::Cancel),
            (State::Countdown, AppEvent::Wake)
                if self.countdown.map_or(true, |cd| cd.is_expired(now)) =>
            {
                Some(Event::Expired)
            }

            (State::Alarm, AppEvent::Button(..) | AppEvent::AccelAlarm) => {
                Some(Event::Acknowledge)
            }
            (State::Alarm, AppEvent::Wake) if now >= self.alarm_deadline() => {
                Some(Event::AlarmTimeout)
            }

            _ => None,
        }
    }

    fn alarm_deadline(&self) -> u64 {
        self.alarm_started_ms + self.config.alarm_timeout_ms as u64
    }

    /// Run a state machine event and collect the side effects
    fn apply(&mut self, event: Event, now: u64) -> Actions {
        let previous = self.state;
        let next = previous.transition(event);
        let mut actions = Actions::redraw();

        if event.is_user_event() {
            self.last_input_ms = now;
        }

        if next == previous {
            return actions;
        }

        if let Some(alarm) = self.config.wake_alarm {
            if next.wakes_on_motion() != previous.wakes_on_motion() {
                actions.accel = Some(if next.wakes_on_motion() {
                    AccelCommand::Enable(alarm)
                } else {
                    AccelCommand::Disable
                });
            }
        }

        if next.is_ringing() != previous.is_ringing() {
            let (led, lcd_led) = if next.is_ringing() {
                self.alarm_started_ms = now;
                (LedMode::BlinkFast, LedMode::Blink)
            } else {
                (LedMode::Off, LedMode::Off)
            };
            actions.led = Some(led);
            actions.lcd_led = Some(lcd_led);
        }

        match next {
            State::TimeSetting => {
                self.last_input_ms = now;
                self.countdown = None;
            }
            State::Countdown => {
                self.countdown = Some(Countdown::start(now, self.minutes));
                actions.publish(Topic::CountdownMinutes, Value::Int(self.minutes as i32));
            }
            State::Sleep | State::Alarm => self.countdown = None,
        }

        self.state = next;
        actions.publish(Topic::CountdownState, Value::Int(next.id()));
        actions
    }

    /// Alarm screen is inverted on odd blink phases
    fn alarm_inverted(&self, now: u64) -> bool {
        let phase = now.saturating_sub(self.alarm_started_ms) / self.config.blink_period_ms as u64;
        phase % 2 == 1
    }

    fn render_setting<L: Lcd>(&self, lcd: &mut L) -> Result<(), LcdError> {
        draw_centered(lcd, Font::Medium, 8, "SET TIME", Color::Black)?;
        draw_battery_icon(lcd, 108, 2, &self.battery)?;

        let mut text: String<8> = String::new();
        let _ = write!(text, "{:02}:00", self.minutes);
        draw_centered(lcd, Font::Large, 50, &text, Color::Black)?;

        lcd.set_font(Font::Large);
        lcd.draw_string(4, 100, "-", Color::Black)?;
        lcd.draw_string(LCD_WIDTH - 14, 100, "+", Color::Black)?;
        Ok(())
    }

    fn render_countdown<L: Lcd>(&self, lcd: &mut L, now: u64) -> Result<(), LcdError> {
        draw_centered(lcd, Font::Medium, 8, "COUNTDOWN", Color::Black)?;

        let (remaining, progress) = match self.countdown {
            Some(cd) => (cd.remaining_ms(now), cd.progress_permille(now)),
            None => (0, 1000),
        };
        draw_centered(lcd, Font::Large, 50, &format_mm_ss(remaining), Color::Black)?;
        draw_progress_bar(lcd, BAR_X, BAR_Y, BAR_W, BAR_H, progress)
    }

    fn render_alarm<L: Lcd>(&self, lcd: &mut L, now: u64) -> Result<(), LcdError> {
        let mut fg = Color::Black;
        if self.alarm_inverted(now) {
            lcd.fill_rect(0, 0, LCD_WIDTH, LCD_HEIGHT, fg)?;
            fg = fg.inverse();
        }
        draw_centered(lcd, Font::Large, 54, "TIME UP!", fg)?;
        Ok(())
    }
}

impl Application for CountdownTimer {
    fn start(&mut self, now: u64) -> Actions {
        self.state = State::Sleep;
        self.last_input_ms = now;

        let mut actions = Actions::redraw();
        actions.led = Some(LedMode::Off);
        actions.lcd_led = Some(LedMode::Off);
        if let Some(alarm) = self.config.wake_alarm {
            actions.accel = Some(AccelCommand::Enable(alarm));
        }
        actions
    }

    fn handle(&mut self, event: AppEvent, now: u64) -> Actions {
        if let AppEvent::Battery(battery_event, voltage) = event {
            let mut actions = Actions::none();
            handle_battery(&mut self.battery, battery_event, voltage, &mut actions);
            actions.redraw = self.state != State::Sleep;
            return actions;
        }

        match self.map_event(event, now) {
            Some(ev) => self.apply(ev, now),
            // Countdown ticks and alarm blinks
            None if event == AppEvent::Wake && self.state != State::Sleep => Actions::redraw(),
            None => Actions::none(),
        }
    }

    fn render<L: Lcd>(&self, lcd: &mut L, now: u64) -> Result<(), LcdError> {
        if !lcd.is_ready() {
            return Ok(());
        }

        lcd.clear()?;
        match self.state {
            State::Sleep => {}
            State::TimeSetting => self.render_setting(lcd)?,
            State::Countdown => self.render_countdown(lcd, now)?,
            State::Alarm => self.render_alarm(lcd, now)?,
        }
        lcd.update()
    }

    fn next_wake(&self, now: u64) -> Option<u64> {
        match self.state {
            State::Sleep => None,
            State::TimeSetting => Some(self.last_input_ms + self.config.idle_timeout_ms as u64),
            State::Countdown => self.countdown.map(|cd| cd.next_tick_ms(now)),
            State::Alarm => {
                let blink = self.config.blink_period_ms as u64;
                let elapsed = now.saturating_sub(self.alarm_started_ms);
                let next_blink = self.alarm_started_ms + (elapsed / blink + 1) * blink;
                Some(next_blink.min(self.alarm_deadline()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::RecordingLcd;
    use crate::traits::{AccelAlarm, BatteryEvent};
    use tower_protocol::NodeMessage;

    fn config() -> CountdownConfig {
        CountdownConfig {
            default_minutes: 5,
            min_minutes: 1,
            max_minutes: 10,
            step_minutes: 1,
            idle_timeout_ms: 30_000,
            alarm_timeout_ms: 60_000,
            blink_period_ms: 500,
            wake_alarm: Some(AccelAlarm::default()),
        }
    }

    fn click(button: Button) -> AppEvent {
        AppEvent::Button(button, ButtonEvent::Click)
    }

    fn hold(button: Button) -> AppEvent {
        AppEvent::Button(button, ButtonEvent::Hold)
    }

    /// Timer already woken into time setting at t = 0
    fn awake() -> CountdownTimer {
        let mut timer = CountdownTimer::new(config());
        timer.start(0);
        timer.handle(click(Button::Left), 0);
        timer
    }

    #[test]
    fn test_boot_sleeps_with_motion_wake() {
        let mut timer = CountdownTimer::new(config());
        let actions = timer.start(0);

        assert_eq!(timer.state(), State::Sleep);
        assert_eq!(
            actions.accel,
            Some(AccelCommand::Enable(AccelAlarm::default()))
        );
        assert_eq!(timer.next_wake(0), None);
    }

    #[test]
    fn test_wake_by_button_keeps_minutes() {
        let mut timer = CountdownTimer::new(config());
        timer.start(0);
        let actions = timer.handle(click(Button::Right), 100);

        assert_eq!(timer.state(), State::TimeSetting);
        // The waking click does not change the duration
        assert_eq!(timer.minutes(), 5);
        assert_eq!(actions.accel, Some(AccelCommand::Disable));
        assert!(actions
            .messages
            .contains(&NodeMessage::publish(Topic::CountdownState, Value::Int(1))));
    }

    #[test]
    fn test_wake_by_motion() {
        let mut timer = CountdownTimer::new(config());
        timer.start(0);
        timer.handle(AppEvent::AccelAlarm, 10);
        assert_eq!(timer.state(), State::TimeSetting);
    }

    #[test]
    fn test_motion_ignored_while_setting() {
        let mut timer = awake();
        let actions = timer.handle(AppEvent::AccelAlarm, 10);
        assert!(actions.is_empty());
        assert_eq!(timer.state(), State::TimeSetting);
    }

    #[test]
    fn test_adjust_minutes_clamped() {
        let mut timer = awake();

        for _ in 0..20 {
            timer.handle(click(Button::Right), 1);
        }
        assert_eq!(timer.minutes(), 10);

        for _ in 0..20 {
            timer.handle(click(Button::Left), 2);
        }
        assert_eq!(timer.minutes(), 1);

        timer.handle(hold(Button::Left), 3);
        assert_eq!(timer.minutes(), 5);
        assert_eq!(timer.state(), State::TimeSetting);
    }

    #[test]
    fn test_idle_timeout_returns_to_sleep() {
        let mut timer = awake();
        timer.handle(click(Button::Right), 10_000);
        assert_eq!(timer.next_wake(10_000), Some(40_000));

        // Early wake does nothing but redraw
        let actions = timer.handle(AppEvent::Wake, 39_999);
        assert_eq!(timer.state(), State::TimeSetting);
        assert!(actions.messages.is_empty());

        let actions = timer.handle(AppEvent::Wake, 40_000);
        assert_eq!(timer.state(), State::Sleep);
        assert_eq!(
            actions.accel,
            Some(AccelCommand::Enable(AccelAlarm::default()))
        );
    }

    #[test]
    fn test_start_countdown() {
        let mut timer = awake();
        let actions = timer.handle(hold(Button::Right), 1_000);

        assert_eq!(timer.state(), State::Countdown);
        let cd = timer.countdown().copied().unwrap();
        assert_eq!(cd.start_ms, 1_000);
        assert_eq!(cd.duration_ms, 5 * 60_000);
        assert!(actions
            .messages
            .contains(&NodeMessage::publish(Topic::CountdownMinutes, Value::Int(5))));
        assert_eq!(timer.next_wake(1_000), Some(2_000));
    }

    #[test]
    fn test_clicks_ignored_during_countdown() {
        let mut timer = awake();
        timer.handle(hold(Button::Right), 0);
        let actions = timer.handle(click(Button::Right), 500);
        assert!(actions.is_empty());
        assert_eq!(timer.minutes(), 5);
    }

    #[test]
    fn test_cancel_countdown() {
        let mut timer = awake();
        timer.handle(hold(Button::Right), 0);
        timer.handle(hold(Button::Left), 5_000);

        assert_eq!(timer.state(), State::TimeSetting);
        assert!(timer.countdown().is_none());
        assert_eq!(timer.next_wake(5_000), Some(35_000));
    }

    #[test]
    fn test_countdown_expires_into_alarm() {
        let mut timer = awake();
        timer.handle(hold(Button::Right), 0);

        // Tick before the end only redraws
        let actions = timer.handle(AppEvent::Wake, 299_000);
        assert_eq!(timer.state(), State::Countdown);
        assert!(actions.redraw);
        assert_eq!(timer.next_wake(299_000), Some(300_000));

        let actions = timer.handle(AppEvent::Wake, 300_000);
        assert_eq!(timer.state(), State::Alarm);
        assert_eq!(actions.led, Some(LedMode::BlinkFast));
        assert_eq!(actions.lcd_led, Some(LedMode::Blink));
    }

    #[test]
    fn test_acknowledge_alarm() {
        let mut timer = awake();
        timer.handle(hold(Button::Right), 0);
        timer.handle(AppEvent::Wake, 300_000);

        let actions = timer.handle(AppEvent::AccelAlarm, 301_000);
        assert_eq!(timer.state(), State::TimeSetting);
        assert_eq!(actions.led, Some(LedMode::Off));
        assert_eq!(actions.lcd_led, Some(LedMode::Off));
        // Last duration is remembered
        assert_eq!(timer.minutes(), 5);
    }

    #[test]
    fn test_alarm_blinks_then_times_out() {
        let mut timer = awake();
        timer.handle(hold(Button::Right), 0);
        timer.handle(AppEvent::Wake, 300_000);

        assert_eq!(timer.next_wake(300_000), Some(300_500));
        assert_eq!(timer.next_wake(300_700), Some(301_000));
        assert_eq!(timer.next_wake(359_900), Some(360_000));

        timer.handle(AppEvent::Wake, 300_500);
        assert_eq!(timer.state(), State::Alarm);

        let actions = timer.handle(AppEvent::Wake, 360_000);
        assert_eq!(timer.state(), State::Sleep);
        assert_eq!(actions.led, Some(LedMode::Off));
        assert_eq!(actions.lcd_led, Some(LedMode::Off));
        assert_eq!(
            actions.accel,
            Some(AccelCommand::Enable(AccelAlarm::default()))
        );
        assert!(timer.countdown().is_none());
    }

    #[test]
    fn test_battery_while_asleep_does_not_redraw() {
        let mut timer = CountdownTimer::new(config());
        timer.start(0);
        let actions = timer.handle(AppEvent::Battery(BatteryEvent::Update, Some(2.9)), 0);
        assert!(!actions.redraw);
        assert_eq!(actions.messages.len(), 1);
    }

    #[test]
    fn test_render_sleep_is_blank() {
        let mut timer = CountdownTimer::new(config());
        timer.start(0);
        let mut lcd = RecordingLcd::new();
        timer.render(&mut lcd, 0).unwrap();
        assert_eq!(lcd.ops.len(), 2);
    }

    #[test]
    fn test_render_setting() {
        let timer = awake();
        let mut lcd = RecordingLcd::new();
        timer.render(&mut lcd, 0).unwrap();
        assert!(lcd.has_text("SET TIME"));
        assert!(lcd.has_text("05:00"));
    }

    #[test]
    fn test_render_countdown_progress() {
        let mut timer = awake();
        timer.handle(hold(Button::Right), 0);

        let mut lcd = RecordingLcd::new();
        timer.render(&mut lcd, 150_000).unwrap();
        assert!(lcd.has_text("02:30"));
        // Half of the 106 px bar interior
        assert!(lcd
            .fills()
            .contains(&(BAR_X + 1, BAR_Y + 1, 53, BAR_H - 2, Color::Black)));
    }

    #[test]
    fn test_render_alarm_inverts_on_odd_phase() {
        let mut timer = awake();
        timer.handle(hold(Button::Right), 0);
        timer.handle(AppEvent::Wake, 300_000);

        let mut lcd = RecordingLcd::new();
        timer.render(&mut lcd, 300_100).unwrap();
        assert!(lcd.fills().is_empty());

        let mut lcd = RecordingLcd::new();
        timer.render(&mut lcd, 300_600).unwrap();
        assert_eq!(lcd.fills()[0], (0, 0, LCD_WIDTH, LCD_HEIGHT, Color::Black));
        assert!(lcd.has_text("TIME UP!"));
    }

    #[test]
    fn test_clock_going_backwards_does_not_expire() {
        let mut timer = awake();
        timer.handle(hold(Button::Right), 10_000);
        timer.handle(AppEvent::Wake, 5_000);
        assert_eq!(timer.state(), State::Countdown);
        assert_eq!(timer.countdown().unwrap().remaining_ms(5_000), 300_000);
    }

    #[test]
    fn test_without_wake_alarm_accelerometer_untouched() {
        let mut timer = CountdownTimer::new(CountdownConfig {
            wake_alarm: None,
            ..config()
        });
        let actions = timer.start(0);
        assert_eq!(actions.accel, None);
        let actions = timer.handle(click(Button::Left), 0);
        assert_eq!(actions.accel, None);
    }
}
