//! Rendering helpers shared by the applications

use crate::battery::{BatteryLevel, BatteryStatus};
use crate::traits::{Color, Font, Lcd, LcdError, LCD_WIDTH};

/// Width of `text` in pixels when drawn with `font`
pub fn text_width(font: Font, text: &str) -> u16 {
    text.chars().count() as u16 * font.char_width()
}

/// Draw `text` horizontally centred on the panel
///
/// Text wider than the panel starts at the left edge.
pub fn draw_centered<L: Lcd>(
    lcd: &mut L,
    font: Font,
    y: u16,
    text: &str,
    color: Color,
) -> Result<u16, LcdError> {
    lcd.set_font(font);
    let x = LCD_WIDTH.saturating_sub(text_width(font, text)) / 2;
    lcd.draw_string(x, y, text, color)
}

/// Draw a progress bar: outline plus a fill proportional to `permille`
pub fn draw_progress_bar<L: Lcd>(
    lcd: &mut L,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    permille: u16,
) -> Result<(), LcdError> {
    lcd.draw_rect(x, y, width, height, Color::Black)?;

    let inner_width = width.saturating_sub(2);
    let inner_height = height.saturating_sub(2);
    let fill = (inner_width as u32 * permille.min(1000) as u32 / 1000) as u16;
    if fill > 0 && inner_height > 0 {
        lcd.fill_rect(x + 1, y + 1, fill, inner_height, Color::Black)?;
    }
    Ok(())
}

/// Battery icon body width, terminal excluded
pub const BATTERY_ICON_WIDTH: u16 = 14;

/// Battery icon height
pub const BATTERY_ICON_HEIGHT: u16 = 7;

/// Draw a small battery icon whose fill reflects the battery level
///
/// Nothing inside the outline means no measurement yet.
pub fn draw_battery_icon<L: Lcd>(
    lcd: &mut L,
    x: u16,
    y: u16,
    status: &BatteryStatus,
) -> Result<(), LcdError> {
    lcd.draw_rect(x, y, BATTERY_ICON_WIDTH, BATTERY_ICON_HEIGHT, Color::Black)?;
    lcd.fill_rect(x + BATTERY_ICON_WIDTH, y + 2, 2, BATTERY_ICON_HEIGHT - 4, Color::Black)?;

    if status.voltage.is_none() && !status.low {
        return Ok(());
    }

    let inner = BATTERY_ICON_WIDTH - 4;
    let fill = match status.level() {
        BatteryLevel::Ok => inner,
        BatteryLevel::Low => inner / 2,
        BatteryLevel::Critical => 2,
    };
    lcd.fill_rect(x + 2, y + 2, fill, BATTERY_ICON_HEIGHT - 4, Color::Black)
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording LCD used by the application tests

    use std::string::String;
    use std::vec::Vec;

    use super::*;

    /// One recorded drawing call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Op {
        Clear,
        Font(Font),
        Text { x: u16, y: u16, text: String, color: Color },
        HLine { x: u16, y: u16, length: u16 },
        Rect { x: u16, y: u16, w: u16, h: u16 },
        Fill { x: u16, y: u16, w: u16, h: u16, color: Color },
        Update,
    }

    /// LCD that records every call
    pub struct RecordingLcd {
        pub ops: Vec<Op>,
        pub ready: bool,
        font: Font,
    }

    impl RecordingLcd {
        pub fn new() -> Self {
            Self {
                ops: Vec::new(),
                ready: true,
                font: Font::Small,
            }
        }

        /// All strings drawn, in order
        pub fn texts(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Text { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }

        /// Check whether `needle` was drawn anywhere
        pub fn has_text(&self, needle: &str) -> bool {
            self.texts().iter().any(|t| *t == needle)
        }

        /// Fill operations, in order
        pub fn fills(&self) -> Vec<(u16, u16, u16, u16, Color)> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Fill { x, y, w, h, color } => Some((*x, *y, *w, *h, *color)),
                    _ => None,
                })
                .collect()
        }
    }

    impl Lcd for RecordingLcd {
        fn is_ready(&self) -> bool {
            self.ready
        }

        fn clear(&mut self) -> Result<(), LcdError> {
            self.ops.push(Op::Clear);
            Ok(())
        }

        fn set_font(&mut self, font: Font) {
            self.font = font;
            self.ops.push(Op::Font(font));
        }

        fn draw_string(&mut self, x: u16, y: u16, text: &str, color: Color) -> Result<u16, LcdError> {
            self.ops.push(Op::Text {
                x,
                y,
                text: String::from(text),
                color,
            });
            Ok(x + text_width(self.font, text))
        }

        fn draw_line_h(&mut self, x: u16, y: u16, length: u16, _color: Color) -> Result<(), LcdError> {
            self.ops.push(Op::HLine { x, y, length });
            Ok(())
        }

        fn draw_rect(&mut self, x: u16, y: u16, w: u16, h: u16, _color: Color) -> Result<(), LcdError> {
            self.ops.push(Op::Rect { x, y, w, h });
            Ok(())
        }

        fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: Color) -> Result<(), LcdError> {
            self.ops.push(Op::Fill { x, y, w, h, color });
            Ok(())
        }

        fn update(&mut self) -> Result<(), LcdError> {
            self.ops.push(Op::Update);
            Ok(())
        }
    }
}
