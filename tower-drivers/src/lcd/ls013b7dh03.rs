//! Sharp LS013B7DH03 memory LCD driver
//!
//! 128x128 monochrome reflective panel on SPI. The panel holds its image
//! without refresh, so a flush only sends lines that differ from what the
//! panel already shows. Chip select is active high.
//!
//! Write transfer layout:
//! ```text
//! CMD | ADDR(line 1) | 16 data bytes | 0x00 | ADDR(line 2) | ... | 0x00
//! ```
//! Line addresses start at 1 and go out LSB first. In the data bytes the
//! first pixel is the MSB and a set bit is white.

use core::convert::Infallible;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::Pixel;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use super::Flush;

/// Display dimensions
const WIDTH: usize = 128;
const HEIGHT: usize = 128;
const LINE_BYTES: usize = WIDTH / 8;

/// Command bits
mod cmd {
    pub const WRITE_LINE: u8 = 0x80;
    pub const VCOM: u8 = 0x40;
    pub const CLEAR: u8 = 0x20;
    /// Display mode, no data
    pub const NOP: u8 = 0x00;
}

/// Byte value of an all-white run of pixels
const WHITE: u8 = 0xFF;

/// Bus error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<S, P> {
    Spi(S),
    Pin(P),
}

/// LS013B7DH03 driver
pub struct Ls013b7dh03<SPI, CS> {
    spi: SPI,
    cs: CS,
    /// Frame buffer, one bit per pixel, row-major
    buffer: [[u8; LINE_BYTES]; HEIGHT],
    /// Image the panel currently shows
    shown: [[u8; LINE_BYTES]; HEIGHT],
    /// One bit per line touched since the last flush
    dirty: u128,
    /// Current VCOM polarity, alternated on every transfer
    vcom: bool,
}

impl<SPI, CS> Ls013b7dh03<SPI, CS> {
    /// Create a new driver with a white frame buffer
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self {
            spi,
            cs,
            buffer: [[WHITE; LINE_BYTES]; HEIGHT],
            shown: [[WHITE; LINE_BYTES]; HEIGHT],
            dirty: 0,
            vcom: false,
        }
    }

    /// Check whether a flush would send anything
    pub fn is_dirty(&self) -> bool {
        self.changed_lines() != 0
    }

    /// Touched lines whose content differs from the panel
    fn changed_lines(&self) -> u128 {
        (0..HEIGHT)
            .filter(|&line| self.dirty & (1u128 << line) != 0)
            .filter(|&line| self.buffer[line] != self.shown[line])
            .fold(0, |mask, line| mask | 1u128 << line)
    }

    /// Read back a pixel from the frame buffer (true = black)
    pub fn is_black(&self, x: usize, y: usize) -> Option<bool> {
        if x >= WIDTH || y >= HEIGHT {
            return None;
        }
        Some(self.buffer[y][x / 8] & bit(x) == 0)
    }

    /// Release the bus and the chip select pin
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }

    fn set_pixel(&mut self, x: i32, y: i32, black: bool) {
        if x < 0 || y < 0 || x as usize >= WIDTH || y as usize >= HEIGHT {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let byte = &mut self.buffer[y][x / 8];
        let before = *byte;
        if black {
            *byte &= !bit(x);
        } else {
            *byte |= bit(x);
        }
        if *byte != before {
            self.dirty |= 1u128 << y;
        }
    }

    fn command_byte(&mut self, command: u8) -> u8 {
        let byte = if self.vcom { command | cmd::VCOM } else { command };
        self.vcom = !self.vcom;
        byte
    }
}

impl<SPI, CS> Ls013b7dh03<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    /// Blank the panel with the clear command and reset the frame buffer
    pub fn clear_display(&mut self) -> Result<(), Error<SPI::Error, CS::Error>> {
        let command = self.command_byte(cmd::CLEAR);
        self.transaction(|spi, _| spi.write(&[command, 0x00]))?;
        self.buffer = [[WHITE; LINE_BYTES]; HEIGHT];
        self.shown = self.buffer;
        self.dirty = 0;
        Ok(())
    }

    /// Alternate VCOM without touching the image
    ///
    /// The panel needs this at least once a second when it is not being
    /// written to, or the liquid crystal takes a DC bias.
    pub fn toggle_vcom(&mut self) -> Result<(), Error<SPI::Error, CS::Error>> {
        let command = self.command_byte(cmd::NOP);
        self.transaction(|spi, _| spi.write(&[command, 0x00]))
    }

    fn transaction<F>(&mut self, f: F) -> Result<(), Error<SPI::Error, CS::Error>>
    where
        F: FnOnce(&mut SPI, &[[u8; LINE_BYTES]; HEIGHT]) -> Result<(), SPI::Error>,
    {
        self.cs.set_high().map_err(Error::Pin)?;
        let result = f(&mut self.spi, &self.buffer).and_then(|_| self.spi.flush());
        // Deselect even if the transfer failed
        let release = self.cs.set_low().map_err(Error::Pin);
        result.map_err(Error::Spi)?;
        release
    }
}

impl<SPI, CS> Flush for Ls013b7dh03<SPI, CS>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    type Error = Error<SPI::Error, CS::Error>;

    fn flush(&mut self) -> Result<(), Self::Error> {
        let changed = self.changed_lines();
        if changed == 0 {
            self.dirty = 0;
            return Ok(());
        }

        let command = self.command_byte(cmd::WRITE_LINE);
        self.transaction(|spi, buffer| {
            spi.write(&[command])?;
            for (line, data) in buffer.iter().enumerate() {
                if changed & (1u128 << line) == 0 {
                    continue;
                }
                spi.write(&[line_address(line)])?;
                spi.write(data)?;
                spi.write(&[0x00])?;
            }
            spi.write(&[0x00])
        })?;

        self.shown = self.buffer;
        self.dirty = 0;
        Ok(())
    }
}

impl<SPI, CS> OriginDimensions for Ls013b7dh03<SPI, CS> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<SPI, CS> DrawTarget for Ls013b7dh03<SPI, CS> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = if color.is_on() { 0x00 } else { WHITE };
        for (y, line) in self.buffer.iter_mut().enumerate() {
            if line.iter().any(|&b| b != fill) {
                line.fill(fill);
                self.dirty |= 1u128 << y;
            }
        }
        Ok(())
    }
}

/// Mask of pixel `x` within its byte, first pixel in the MSB
fn bit(x: usize) -> u8 {
    0x80 >> (x % 8)
}

/// Gate line address as sent on the wire
fn line_address(line: usize) -> u8 {
    (line as u8 + 1).reverse_bits()
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;
    use std::vec::Vec;

    /// Mock SPI bus recording every byte written
    #[derive(Default)]
    struct MockSpi {
        written: Vec<u8>,
    }

    impl embedded_hal::spi::ErrorType for MockSpi {
        type Error = Infallible;
    }

    impl SpiBus for MockSpi {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            words.fill(0);
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
            self.written.extend_from_slice(words);
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
            self.written.extend_from_slice(write);
            read.fill(0);
            Ok(())
        }

        fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
            self.written.extend_from_slice(words);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    /// Mock chip select recording its level history
    #[derive(Default)]
    struct MockPin {
        history: Vec<bool>,
    }

    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.history.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.history.push(true);
            Ok(())
        }
    }

    fn lcd() -> Ls013b7dh03<MockSpi, MockPin> {
        Ls013b7dh03::new(MockSpi::default(), MockPin::default())
    }

    #[test]
    fn test_starts_white_and_clean() {
        let mut lcd = lcd();
        assert_eq!(lcd.is_black(0, 0), Some(false));
        assert!(!lcd.is_dirty());

        lcd.flush().unwrap();
        assert!(lcd.spi.written.is_empty());
        assert!(lcd.cs.history.is_empty());
    }

    #[test]
    fn test_line_address_is_lsb_first() {
        assert_eq!(line_address(0), 0x80);
        assert_eq!(line_address(1), 0x40);
        assert_eq!(line_address(127), 0x01);
    }

    #[test]
    fn test_flush_single_line() {
        let mut lcd = lcd();
        Pixel(Point::new(0, 0), BinaryColor::On).draw(&mut lcd).unwrap();
        assert!(lcd.is_dirty());
        assert_eq!(lcd.is_black(0, 0), Some(true));

        lcd.flush().unwrap();

        let written = &lcd.spi.written;
        assert_eq!(written.len(), 1 + 1 + LINE_BYTES + 1 + 1);
        assert_eq!(written[0], cmd::WRITE_LINE);
        assert_eq!(written[1], 0x80);
        assert_eq!(written[2], 0x7F);
        assert!(written[3..2 + LINE_BYTES].iter().all(|&b| b == WHITE));
        assert_eq!(&written[2 + LINE_BYTES..], &[0x00, 0x00]);

        // Chip select pulsed high for the transfer
        assert_eq!(lcd.cs.history, vec![true, false]);
        assert!(!lcd.is_dirty());
    }

    #[test]
    fn test_vcom_alternates() {
        let mut lcd = lcd();
        Pixel(Point::new(5, 3), BinaryColor::On).draw(&mut lcd).unwrap();
        lcd.flush().unwrap();
        Pixel(Point::new(5, 3), BinaryColor::Off).draw(&mut lcd).unwrap();
        lcd.spi.written.clear();
        lcd.flush().unwrap();

        assert_eq!(lcd.spi.written[0], cmd::WRITE_LINE | cmd::VCOM);
        assert_eq!(lcd.spi.written[1], line_address(3));
    }

    #[test]
    fn test_only_changed_lines_sent() {
        let mut lcd = lcd();
        Pixel(Point::new(10, 7), BinaryColor::On).draw(&mut lcd).unwrap();
        Pixel(Point::new(10, 2), BinaryColor::On).draw(&mut lcd).unwrap();
        // Already white: no change
        Pixel(Point::new(0, 50), BinaryColor::Off).draw(&mut lcd).unwrap();
        lcd.flush().unwrap();

        let per_line = 1 + LINE_BYTES + 1;
        let written = &lcd.spi.written;
        assert_eq!(written.len(), 1 + 2 * per_line + 1);
        // Lines go out in ascending order
        assert_eq!(written[1], line_address(2));
        assert_eq!(written[1 + per_line], line_address(7));
        assert_eq!(written[1 + per_line + 1 + 1], 0xDF);
    }

    #[test]
    fn test_pixels_outside_panel_ignored() {
        let mut lcd = lcd();
        Pixel(Point::new(-1, 0), BinaryColor::On).draw(&mut lcd).unwrap();
        Pixel(Point::new(128, 0), BinaryColor::On).draw(&mut lcd).unwrap();
        Pixel(Point::new(0, 128), BinaryColor::On).draw(&mut lcd).unwrap();
        assert!(!lcd.is_dirty());
        assert_eq!(lcd.is_black(128, 0), None);
    }

    #[test]
    fn test_clear_to_black_sends_every_line() {
        let mut lcd = lcd();
        DrawTarget::clear(&mut lcd, BinaryColor::On).unwrap();
        assert_eq!(lcd.is_black(127, 127), Some(true));

        lcd.flush().unwrap();
        assert_eq!(lcd.spi.written.len(), 1 + HEIGHT * (1 + LINE_BYTES + 1) + 1);
    }

    #[test]
    fn test_clear_skips_lines_already_filled() {
        let mut lcd = lcd();
        Pixel(Point::new(3, 9), BinaryColor::On).draw(&mut lcd).unwrap();
        lcd.flush().unwrap();
        lcd.spi.written.clear();

        DrawTarget::clear(&mut lcd, BinaryColor::Off).unwrap();
        lcd.flush().unwrap();
        assert_eq!(lcd.spi.written.len(), 1 + (1 + LINE_BYTES + 1) + 1);
        assert_eq!(lcd.spi.written[1], line_address(9));
    }

    #[test]
    fn test_redrawn_line_matching_panel_not_sent() {
        let mut lcd = lcd();
        Pixel(Point::new(20, 40), BinaryColor::On).draw(&mut lcd).unwrap();
        lcd.flush().unwrap();
        lcd.spi.written.clear();

        // Erase and draw the same pixel again before the next flush
        Pixel(Point::new(20, 40), BinaryColor::Off).draw(&mut lcd).unwrap();
        Pixel(Point::new(20, 40), BinaryColor::On).draw(&mut lcd).unwrap();
        assert!(!lcd.is_dirty());
        lcd.flush().unwrap();
        assert!(lcd.spi.written.is_empty());
    }

    #[test]
    fn test_identical_canvas_frame_sends_nothing() {
        use crate::lcd::Canvas;
        use tower_core::traits::{Color, Font, Lcd};

        fn frame(canvas: &mut Canvas<Ls013b7dh03<MockSpi, MockPin>>) {
            canvas.clear().unwrap();
            canvas.set_font(Font::Large);
            canvas.draw_string(30, 50, "12:34", Color::Black).unwrap();
            canvas.update().unwrap();
        }

        let mut canvas = Canvas::new(lcd());
        frame(&mut canvas);
        assert!(!canvas.target().spi.written.is_empty());

        canvas.target_mut().spi.written.clear();
        canvas.target_mut().cs.history.clear();
        frame(&mut canvas);
        assert!(canvas.target().spi.written.is_empty());
        assert!(canvas.target().cs.history.is_empty());
    }

    #[test]
    fn test_clear_display_command() {
        let mut lcd = lcd();
        Pixel(Point::new(1, 1), BinaryColor::On).draw(&mut lcd).unwrap();
        lcd.clear_display().unwrap();

        assert_eq!(lcd.spi.written, vec![cmd::CLEAR, 0x00]);
        assert_eq!(lcd.is_black(1, 1), Some(false));
        assert!(!lcd.is_dirty());
    }

    #[test]
    fn test_toggle_vcom() {
        let mut lcd = lcd();
        lcd.toggle_vcom().unwrap();
        lcd.toggle_vcom().unwrap();
        assert_eq!(lcd.spi.written, vec![0x00, 0x00, cmd::VCOM, 0x00]);
    }
}
