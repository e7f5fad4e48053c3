//! LCD trait for the 128x128 monochrome memory display

/// Display width in pixels
pub const LCD_WIDTH: u16 = 128;

/// Display height in pixels
pub const LCD_HEIGHT: u16 = 128;

/// Errors reported by an LCD implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LcdError {
    /// Bus transfer to the panel failed
    Communication,
    /// A previous frame is still being transferred
    Busy,
    /// Drawing outside the panel
    OutOfBounds,
}

/// Pixel colour
///
/// The panel is reflective: "black" sets a pixel, "white" clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    #[default]
    Black,
    White,
}

impl Color {
    /// The other colour
    pub fn inverse(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

/// Monospace font sizes
///
/// Glyph cells are fixed so layout code can measure text without touching
/// the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    /// 6x10 cells
    #[default]
    Small,
    /// 9x15 cells
    Medium,
    /// 10x20 cells
    Large,
}

impl Font {
    /// Glyph advance in pixels
    pub const fn char_width(self) -> u16 {
        match self {
            Font::Small => 6,
            Font::Medium => 9,
            Font::Large => 10,
        }
    }

    /// Glyph cell height in pixels
    pub const fn char_height(self) -> u16 {
        match self {
            Font::Small => 10,
            Font::Medium => 15,
            Font::Large => 20,
        }
    }
}

/// Trait for the module LCD
///
/// Drawing goes to an off-screen frame; nothing reaches the panel until
/// [`Lcd::update`] is called.
pub trait Lcd {
    /// Check whether the panel can accept a new frame
    fn is_ready(&self) -> bool;

    /// Clear the frame to white
    fn clear(&mut self) -> Result<(), LcdError>;

    /// Select the font used by subsequent [`Lcd::draw_string`] calls
    fn set_font(&mut self, font: Font);

    /// Draw a string with its top-left corner at (`x`, `y`)
    ///
    /// Returns the x coordinate just past the last glyph.
    fn draw_string(&mut self, x: u16, y: u16, text: &str, color: Color) -> Result<u16, LcdError>;

    /// Draw a horizontal line of `length` pixels
    fn draw_line_h(&mut self, x: u16, y: u16, length: u16, color: Color) -> Result<(), LcdError>;

    /// Draw a one-pixel rectangle outline
    fn draw_rect(&mut self, x: u16, y: u16, width: u16, height: u16, color: Color)
        -> Result<(), LcdError>;

    /// Fill a rectangle
    fn fill_rect(&mut self, x: u16, y: u16, width: u16, height: u16, color: Color)
        -> Result<(), LcdError>;

    /// Push the frame to the panel
    fn update(&mut self) -> Result<(), LcdError>;
}
