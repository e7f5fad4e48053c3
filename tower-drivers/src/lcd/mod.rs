//! LCD drivers
//!
//! The panel driver keeps a framebuffer and implements `embedded-graphics`
//! [`DrawTarget`](embedded_graphics::draw_target::DrawTarget). [`Canvas`]
//! adapts any such target to the core [`Lcd`](tower_core::traits::Lcd)
//! trait used by the applications.

mod canvas;
mod ls013b7dh03;

pub use canvas::Canvas;
pub use ls013b7dh03::{Error, Ls013b7dh03};

/// Push the framebuffer to the panel
pub trait Flush {
    type Error;

    /// Send every changed line to the panel
    fn flush(&mut self) -> Result<(), Self::Error>;
}
