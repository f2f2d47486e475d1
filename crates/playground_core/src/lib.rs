//! # Playground Core
//!
//! Multi-window session manager for a graphics playground: every open
//! [`Canvas`] gets its own platform window and immediate-mode UI context,
//! while a single OpenGL context and font atlas are shared between them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use playground_core::prelude::*;
//!
//! struct Blank;
//!
//! impl Canvas<GlfwPlatform, ImguiBackend> for Blank {
//!     fn build_ui(&mut self, ui: &mut imgui::Ui, _session: &mut PlaygroundSession) {
//!         ui.text("hello");
//!     }
//!
//!     fn render(&mut self, _gl: &glow::Context, _viewport: Viewport) {}
//! }
//!
//! fn main() -> Result<(), SessionError> {
//!     let config = SessionConfig::default();
//!     let platform = GlfwPlatform::init(&config.platform)?;
//!     let mut session = Session::new(config, platform, ImguiBackend::new())?;
//!     let _ = session.open_window(Box::new(Blank));
//!     session.exec();
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod canvas;
pub mod config;
pub mod foundation;
pub mod gl;
pub mod platform;
pub mod session;
pub mod ui;

pub use canvas::{Canvas, Viewport};
pub use session::{CanvasId, LoopState, OpenError, Session, SessionError};

/// Session type used by the desktop application
pub type PlaygroundSession = Session<platform::glfw::GlfwPlatform, ui::imgui::ImguiBackend>;

/// Common imports for canvas implementations
pub mod prelude {
    pub use crate::{
        canvas::{Canvas, Viewport},
        config::{Config, PlatformConfig, SessionConfig, UiConfig, WindowConfig, WindowFlags},
        platform::{glfw::GlfwPlatform, Platform},
        session::{CanvasId, LoopState, OpenError, Session, SessionError},
        ui::{imgui::ImguiBackend, UiBackend},
        PlaygroundSession,
    };
}
