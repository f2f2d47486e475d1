//! Canvas trait
//!
//! A canvas is one demo hosted in its own window: it builds immediate-mode UI
//! and renders into its window surface. The session owns every open canvas
//! and calls it once per render tick.

use crate::platform::Platform;
use crate::session::Session;
use crate::ui::UiBackend;

/// Framebuffer area a canvas renders into, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Framebuffer width
    pub width: u32,
    /// Framebuffer height
    pub height: u32,
}

impl Viewport {
    /// Create a viewport
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height, or 1.0 for an empty framebuffer
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// True when nothing can be drawn (minimized window)
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pluggable unit of UI and rendering hosted by a [`Session`]
pub trait Canvas<P: Platform, U: UiBackend<P>> {
    /// Window title used when the canvas is opened
    fn title(&self) -> &str {
        "Canvas"
    }

    /// Emit this frame's UI
    ///
    /// The session is fully usable here: opening and closing other canvases
    /// (or this one) is deferred to the next loop iteration.
    fn build_ui(&mut self, ui: &mut U::Frame, session: &mut Session<P, U>);

    /// Draw into the window surface
    ///
    /// The graphics context is current on this canvas's window.
    fn render(&mut self, gfx: &P::Graphics, viewport: Viewport);

    /// Free GPU objects before the canvas is dropped
    ///
    /// Called once during teardown with this canvas's window current.
    fn release(&mut self, _gfx: &P::Graphics) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_aspect() {
        approx::assert_relative_eq!(Viewport::new(1280, 720).aspect(), 1280.0 / 720.0);
        approx::assert_relative_eq!(Viewport::new(10, 0).aspect(), 1.0);
    }

    #[test]
    fn test_viewport_empty() {
        assert!(Viewport::new(0, 720).is_empty());
        assert!(Viewport::default().is_empty());
        assert!(!Viewport::new(1, 1).is_empty());
    }
}
