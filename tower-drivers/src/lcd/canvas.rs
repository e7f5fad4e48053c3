//! Core `Lcd` on top of an `embedded-graphics` draw target

use embedded_graphics::mono_font::iso_8859_1::{FONT_10X20, FONT_6X10, FONT_9X15};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use super::Flush;
use tower_core::traits::{Color, Font, Lcd, LcdError};

/// Text and primitive drawing in panel coordinates
///
/// Black maps to `BinaryColor::On`. Coordinates are the top-left corner of
/// the text cell or shape. Shapes may run off the right or bottom edge and
/// are clipped; a start point outside the panel is an error.
pub struct Canvas<D> {
    target: D,
    font: Font,
}

impl<D> Canvas<D>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions + Flush,
{
    pub fn new(target: D) -> Self {
        Self {
            target,
            font: Font::Small,
        }
    }

    /// Access the underlying panel
    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    fn check_origin(&self, x: u16, y: u16) -> Result<Point, LcdError> {
        let size = self.target.size();
        if x as u32 >= size.width || y as u32 >= size.height {
            return Err(LcdError::OutOfBounds);
        }
        Ok(Point::new(x as i32, y as i32))
    }
}

fn mono_font(font: Font) -> &'static MonoFont<'static> {
    match font {
        Font::Small => &FONT_6X10,
        Font::Medium => &FONT_9X15,
        Font::Large => &FONT_10X20,
    }
}

fn binary(color: Color) -> BinaryColor {
    match color {
        Color::Black => BinaryColor::On,
        Color::White => BinaryColor::Off,
    }
}

impl<D> Lcd for Canvas<D>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions + Flush,
{
    /// Transfers are blocking, so the panel is free whenever we get here
    fn is_ready(&self) -> bool {
        true
    }

    fn clear(&mut self) -> Result<(), LcdError> {
        self.target
            .clear(BinaryColor::Off)
            .map_err(|_| LcdError::Communication)
    }

    fn set_font(&mut self, font: Font) {
        self.font = font;
    }

    fn draw_string(&mut self, x: u16, y: u16, text: &str, color: Color) -> Result<u16, LcdError> {
        let origin = self.check_origin(x, y)?;
        let style = MonoTextStyle::new(mono_font(self.font), binary(color));
        let next = Text::with_baseline(text, origin, style, Baseline::Top)
            .draw(&mut self.target)
            .map_err(|_| LcdError::Communication)?;
        Ok(next.x.clamp(0, u16::MAX as i32) as u16)
    }

    fn draw_line_h(&mut self, x: u16, y: u16, length: u16, color: Color) -> Result<(), LcdError> {
        let start = self.check_origin(x, y)?;
        if length == 0 {
            return Ok(());
        }
        let end = start + Point::new(length as i32 - 1, 0);
        Line::new(start, end)
            .into_styled(PrimitiveStyle::with_stroke(binary(color), 1))
            .draw(&mut self.target)
            .map_err(|_| LcdError::Communication)
    }

    fn draw_rect(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        color: Color,
    ) -> Result<(), LcdError> {
        let origin = self.check_origin(x, y)?;
        Rectangle::new(origin, Size::new(width as u32, height as u32))
            .into_styled(PrimitiveStyle::with_stroke(binary(color), 1))
            .draw(&mut self.target)
            .map_err(|_| LcdError::Communication)
    }

    fn fill_rect(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        color: Color,
    ) -> Result<(), LcdError> {
        let origin = self.check_origin(x, y)?;
        let area = Rectangle::new(origin, Size::new(width as u32, height as u32));
        self.target
            .fill_solid(&area, binary(color))
            .map_err(|_| LcdError::Communication)
    }

    fn update(&mut self) -> Result<(), LcdError> {
        self.target.flush().map_err(|_| LcdError::Communication)
    }
}
