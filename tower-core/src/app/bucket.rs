//! Bucket level monitor
//!
//! A remote sensor node measures how full a bucket is and the gateway
//! forwards the level here. The monitor draws a bucket, raises an alarm
//! with hysteresis when it is nearly full, and blanks out readings that
//! have not been refreshed for a while.

use core::fmt::Write;

use heapless::String;

use super::{handle_battery, Actions, AppEvent, Application};
use crate::battery::BatteryStatus;
use crate::config::BucketConfig;
use crate::input::{Button, ButtonEvent};
use crate::render::{draw_battery_icon, draw_centered};
use crate::traits::{Color, Font, Lcd, LcdError, LedMode};
use tower_protocol::{Topic, Value};

// Bucket drawing geometry
const BUCKET_X: u16 = 14;
const BUCKET_Y: u16 = 26;
const BUCKET_W: u16 = 40;
const BUCKET_H: u16 = 76;

// Readout to the right of the bucket
const READOUT_X: u16 = 64;
const READOUT_Y: u16 = 54;
const SEGMENTS: u16 = 10;
const SEGMENT_PITCH: u16 = 6;

/// How the level is shown next to the bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Readout {
    #[default]
    Percent,
    Segments,
}

/// Most recent level report
#[derive(Debug, Clone, Copy, PartialEq)]
struct Reading {
    percent: f32,
    received_ms: u64,
}

/// Bucket monitor application state
#[derive(Debug, Clone)]
pub struct BucketMonitor {
    config: BucketConfig,
    battery: BatteryStatus,
    reading: Option<Reading>,
    alarm: bool,
    muted: bool,
    readout: Readout,
}

impl BucketMonitor {
    pub fn new(config: BucketConfig) -> Self {
        Self {
            config,
            battery: BatteryStatus::new(),
            reading: None,
            alarm: false,
            muted: false,
            readout: Readout::Percent,
        }
    }

    /// Check whether the nearly-full alarm is raised
    pub fn alarm_active(&self) -> bool {
        self.alarm
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn readout(&self) -> Readout {
        self.readout
    }

    /// Level to show at `now`, `None` if missing or stale
    pub fn level(&self, now: u64) -> Option<f32> {
        self.reading
            .filter(|r| now.saturating_sub(r.received_ms) < self.config.stale_after_ms as u64)
            .map(|r| r.percent)
    }

    fn on_level(&mut self, value: Value, now: u64) -> Actions {
        let percent = value.as_f32().clamp(0.0, 100.0);
        self.reading = Some(Reading {
            percent,
            received_ms: now,
        });

        let mut actions = Actions::redraw();
        if !self.alarm && percent >= self.config.alarm_on_pct as f32 {
            self.alarm = true;
            self.muted = false;
            actions.led = Some(LedMode::BlinkFast);
            actions.lcd_led = Some(LedMode::Blink);
            actions.publish(Topic::BucketAlarm, Value::Bool(true));
        } else if self.alarm && percent <= self.config.alarm_off_pct as f32 {
            self.alarm = false;
            self.muted = false;
            actions.led = Some(LedMode::Off);
            actions.lcd_led = Some(LedMode::Off);
            actions.publish(Topic::BucketAlarm, Value::Bool(false));
        }
        actions
    }

    fn status_text(&self, now: u64) -> &'static str {
        if self.level(now).is_none() {
            "No data"
        } else if self.alarm && self.muted {
            "FULL (muted)"
        } else if self.alarm {
            "FULL!"
        } else {
            "OK"
        }
    }

    fn draw_bucket<L: Lcd>(&self, lcd: &mut L, level: Option<f32>) -> Result<(), LcdError> {
        lcd.draw_rect(BUCKET_X, BUCKET_Y, BUCKET_W, BUCKET_H, Color::Black)?;
        // Rim
        lcd.draw_line_h(BUCKET_X - 4, BUCKET_Y, BUCKET_W + 8, Color::Black)?;

        if let Some(percent) = level {
            let inner = BUCKET_H - 2;
            let fill = (inner as f32 * percent / 100.0) as u16;
            if fill > 0 {
                lcd.fill_rect(
                    BUCKET_X + 1,
                    BUCKET_Y + 1 + inner - fill,
                    BUCKET_W - 2,
                    fill,
                    Color::Black,
                )?;
            }
        }
        Ok(())
    }

    fn draw_readout<L: Lcd>(&self, lcd: &mut L, level: Option<f32>) -> Result<(), LcdError> {
        let Some(percent) = level else {
            lcd.set_font(Font::Large);
            lcd.draw_string(READOUT_X, READOUT_Y, "--", Color::Black)?;
            return Ok(());
        };

        match self.readout {
            Readout::Percent => {
                let mut text: String<8> = String::new();
                let _ = write!(text, "{:.0}%", percent);
                lcd.set_font(Font::Large);
                lcd.draw_string(READOUT_X, READOUT_Y, &text, Color::Black)?;
            }
            Readout::Segments => {
                let lit = ((percent + 5.0) / 10.0) as u16;
                for i in 0..SEGMENTS {
                    let x = READOUT_X + i * SEGMENT_PITCH;
                    lcd.draw_rect(x, READOUT_Y, SEGMENT_PITCH - 1, 12, Color::Black)?;
                    if i < lit {
                        lcd.fill_rect(x, READOUT_Y, SEGMENT_PITCH - 1, 12, Color::Black)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl Application for BucketMonitor {
    fn start(&mut self, _now: u64) -> Actions {
        let mut actions = Actions::redraw();
        actions.led = Some(LedMode::Off);
        actions.lcd_led = Some(LedMode::Off);
        actions
    }

    fn handle(&mut self, event: AppEvent, now: u64) -> Actions {
        match event {
            AppEvent::Radio(Topic::BucketLevel, value) => self.on_level(value, now),
            AppEvent::Button(Button::Right, ButtonEvent::Click) if self.alarm && !self.muted => {
                self.muted = true;
                let mut actions = Actions::redraw();
                actions.led = Some(LedMode::Off);
                actions.lcd_led = Some(LedMode::Off);
                actions
            }
            AppEvent::Button(Button::Left, ButtonEvent::Click) => {
                self.readout = match self.readout {
                    Readout::Percent => Readout::Segments,
                    Readout::Segments => Readout::Percent,
                };
                Actions::redraw()
            }
            AppEvent::Battery(event, voltage) => {
                let mut actions = Actions::redraw();
                handle_battery(&mut self.battery, event, voltage, &mut actions);
                actions
            }
            AppEvent::Wake => Actions::redraw(),
            _ => Actions::none(),
        }
    }

    fn render<L: Lcd>(&self, lcd: &mut L, now: u64) -> Result<(), LcdError> {
        if !lcd.is_ready() {
            return Ok(());
        }

        let level = self.level(now);

        lcd.clear()?;
        draw_centered(lcd, Font::Medium, 4, "Bucket", Color::Black)?;
        draw_battery_icon(lcd, 108, 2, &self.battery)?;

        self.draw_bucket(lcd, level)?;
        self.draw_readout(lcd, level)?;

        draw_centered(lcd, Font::Small, 112, self.status_text(now), Color::Black)?;

        lcd.update()
    }

    fn next_wake(&self, now: u64) -> Option<u64> {
        // Redraw once the reading goes stale
        self.reading
            .map(|r| r.received_ms + self.config.stale_after_ms as u64)
            .filter(|&deadline| deadline > now)
    }
}
