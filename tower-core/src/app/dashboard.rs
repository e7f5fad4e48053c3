//! LCD dashboard
//!
//! Shows the temperature received from the gateway and the module's own
//! battery voltage. Boots by pulsing the LED and asking the gateway to pair.

use core::fmt::Write;

use heapless::String;

use super::{handle_battery, Actions, AppEvent, Application};
use crate::battery::BatteryStatus;
use crate::config::{DashboardConfig, NodeConfig};
use crate::traits::{BatteryEvent, Color, Font, Lcd, LcdError, LedMode};
use tower_protocol::{NodeMessage, Topic};

/// Readout range; values outside are pinned to the nearest end
const TEMPERATURE_MIN: f32 = -99.9;
const TEMPERATURE_MAX: f32 = 999.9;

/// Dashboard application state
#[derive(Debug, Clone)]
pub struct Dashboard {
    node: NodeConfig,
    config: DashboardConfig,
    battery: BatteryStatus,
    temperature: Option<f32>,
}

impl Dashboard {
    pub fn new(node: NodeConfig, config: DashboardConfig) -> Self {
        Self {
            node,
            config,
            battery: BatteryStatus::new(),
            temperature: None,
        }
    }

    pub fn battery(&self) -> &BatteryStatus {
        &self.battery
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    /// Longest text is `-99.9°C`, 8 bytes
    fn temperature_text(&self) -> String<12> {
        let mut text = String::new();
        match self.temperature.filter(|t| t.is_finite()) {
            Some(t) => {
                let t = t.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
                let _ = write!(text, "{:.1}\u{b0}C", t);
            }
            None => {
                let _ = text.push_str("--.-\u{b0}C");
            }
        }
        text
    }
}

impl Application for Dashboard {
    fn start(&mut self, _now: u64) -> Actions {
        let mut actions = Actions::redraw();
        actions.led = Some(LedMode::Off);
        actions.lcd_led = Some(LedMode::Off);
        actions.led_pulse_ms = Some(self.config.boot_pulse_ms);
        let _ = actions
            .messages
            .push(NodeMessage::pairing_request(self.node.name, self.node.version));
        actions
    }

    fn handle(&mut self, event: AppEvent, _now: u64) -> Actions {
        match event {
            AppEvent::Battery(event, voltage) => {
                let mut actions = Actions::redraw();
                handle_battery(&mut self.battery, event, voltage, &mut actions);
                if event == BatteryEvent::LevelCritical {
                    actions.lcd_led = Some(LedMode::On);
                }
                actions
            }
            AppEvent::Radio(Topic::Temperature, value) => {
                self.temperature = Some(value.as_f32());
                Actions::redraw()
            }
            _ => Actions::none(),
        }
    }

    fn render<L: Lcd>(&self, lcd: &mut L, _now: u64) -> Result<(), LcdError> {
        if !lcd.is_ready() {
            return Ok(());
        }

        lcd.clear()?;

        lcd.set_font(Font::Large);
        lcd.draw_string(20, 25, &self.temperature_text(), Color::Black)?;

        lcd.set_font(Font::Small);
        lcd.draw_string(10, 80, "Battery", Color::Black)?;
        lcd.draw_string(40, 100, &self.battery.format_voltage(), Color::Black)?;

        if self.battery.critical {
            lcd.draw_string(80, 100, "CRIT", Color::Black)?;
        } else if self.battery.low {
            lcd.draw_string(80, 100, "LOW", Color::Black)?;
        }

        lcd.update()
    }

    fn next_wake(&self, _now: u64) -> Option<u64> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::{Op, RecordingLcd};
    use tower_protocol::Value;

    fn dashboard() -> Dashboard {
        Dashboard::new(NodeConfig::default(), DashboardConfig::default())
    }

    #[test]
    fn test_boot_pulses_and_pairs() {
        let mut app = dashboard();
        let actions = app.start(0);

        assert_eq!(actions.led_pulse_ms, Some(2000));
        assert_eq!(actions.led, Some(LedMode::Off));
        assert!(actions.redraw);
        assert_eq!(
            actions.messages[0],
            NodeMessage::pairing_request("lcd-display", "v1.0.0")
        );
    }

    #[test]
    fn test_layout_without_data() {
        let app = dashboard();
        let mut lcd = RecordingLcd::new();
        app.render(&mut lcd, 0).unwrap();

        assert_eq!(lcd.ops.first(), Some(&Op::Clear));
        assert_eq!(lcd.ops.last(), Some(&Op::Update));
        assert!(lcd.ops.contains(&Op::Text {
            x: 20,
            y: 25,
            text: "--.-°C".into(),
            color: Color::Black
        }));
        assert!(lcd.ops.contains(&Op::Text {
            x: 10,
            y: 80,
            text: "Battery".into(),
            color: Color::Black
        }));
        assert!(lcd.ops.contains(&Op::Text {
            x: 40,
            y: 100,
            text: "--".into(),
            color: Color::Black
        }));
    }

    #[test]
    fn test_battery_update_redraws_and_publishes() {
        let mut app = dashboard();
        let actions = app.handle(AppEvent::Battery(BatteryEvent::Update, Some(2.94)), 10);

        assert!(actions.redraw);
        assert_eq!(
            actions.messages[0],
            NodeMessage::publish(Topic::BatteryVoltage, Value::Float(2.94))
        );

        let mut lcd = RecordingLcd::new();
        app.render(&mut lcd, 10).unwrap();
        assert!(lcd.has_text("2.9"));
    }

    #[test]
    fn test_temperature_from_gateway() {
        let mut app = dashboard();
        let actions = app.handle(AppEvent::Radio(Topic::Temperature, Value::Float(21.46)), 0);
        assert!(actions.redraw);
        assert_eq!(app.temperature(), Some(21.46));

        let mut lcd = RecordingLcd::new();
        app.render(&mut lcd, 0).unwrap();
        assert!(lcd.has_text("21.5°C"));
    }

    #[test]
    fn test_critical_battery_marker_and_led() {
        let mut app = dashboard();
        let actions = app.handle(AppEvent::Battery(BatteryEvent::LevelCritical, None), 0);
        assert_eq!(actions.lcd_led, Some(LedMode::On));

        let mut lcd = RecordingLcd::new();
        app.render(&mut lcd, 0).unwrap();
        assert!(lcd.has_text("CRIT"));
        assert!(!lcd.has_text("LOW"));
    }

    #[test]
    fn test_out_of_range_temperature_pinned() {
        let mut app = dashboard();
        app.handle(AppEvent::Radio(Topic::Temperature, Value::Float(1.0e9)), 0);
        let mut lcd = RecordingLcd::new();
        app.render(&mut lcd, 0).unwrap();
        assert!(lcd.has_text("999.9°C"));

        app.handle(AppEvent::Radio(Topic::Temperature, Value::Int(-40_000)), 0);
        let mut lcd = RecordingLcd::new();
        app.render(&mut lcd, 0).unwrap();
        assert!(lcd.has_text("-99.9°C"));

        app.handle(AppEvent::Radio(Topic::Temperature, Value::Float(f32::NAN)), 0);
        let mut lcd = RecordingLcd::new();
        app.render(&mut lcd, 0).unwrap();
        assert!(lcd.has_text("--.-°C"));
    }

    #[test]
    fn test_low_battery_marker() {
        let mut app = dashboard();
        let actions = app.handle(AppEvent::Battery(BatteryEvent::LevelLow, None), 0);
        assert_eq!(actions.lcd_led, None);

        let mut lcd = RecordingLcd::new();
        app.render(&mut lcd, 0).unwrap();
        assert!(lcd.has_text("LOW"));
        assert!(!lcd.has_text("CRIT"));
    }

    #[test]
    fn test_other_topics_ignored() {
        let mut app = dashboard();
        let actions = app.handle(AppEvent::Radio(Topic::BucketLevel, Value::Int(50)), 0);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_busy_panel_skips_frame() {
        let app = dashboard();
        let mut lcd = RecordingLcd::new();
        lcd.ready = false;
        app.render(&mut lcd, 0).unwrap();
        assert!(lcd.ops.is_empty());
    }

    #[test]
    fn test_never_schedules_wake() {
        assert_eq!(dashboard().next_wake(0), None);
    }
}
