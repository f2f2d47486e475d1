//! Immediate-mode UI backend interface
//!
//! One UI context exists per window. Contexts share a single font atlas and a
//! single renderer owned by the backend; only one context is current at a time.

pub mod imgui;
mod input;
mod renderer;

use crate::config::UiConfig;
use crate::gl::ShaderError;
use crate::platform::Platform;
use std::path::Path;
use thiserror::Error;

/// UI backend errors
#[derive(Error, Debug)]
pub enum UiError {
    /// Backend used before `init`
    #[error("UI backend is not initialized")]
    NotInitialized,

    /// Per-window context could not be created
    #[error("UI context creation failed: {0}")]
    ContextCreationFailed(String),

    /// Context could not become current
    #[error("UI context activation failed: {0}")]
    ContextActivationFailed(String),

    /// Renderer shader program failed to build
    #[error("UI shader error: {0}")]
    Shader(#[from] ShaderError),

    /// Renderer resource or draw failure
    #[error("UI renderer error: {0}")]
    Renderer(String),
}

/// Per-window immediate-mode UI provider
pub trait UiBackend<P: Platform>: Sized + 'static {
    /// Per-window UI context
    type Context;
    /// Frame handle canvases build UI with
    type Frame;
    /// Finalized draw data of one frame
    type DrawData<'a>
    where
        Self: 'a;

    /// Build the shared font atlas and renderer
    fn init(&mut self, gfx: &P::Graphics, config: &UiConfig) -> Result<(), UiError>;

    /// Destroy the shared renderer; all contexts must already be destroyed
    fn shutdown(&mut self, gfx: &P::Graphics);

    /// Create a context for a window, sharing the font atlas
    ///
    /// `settings_path` is where the context persists its layout; `None`
    /// disables persistence.
    fn create_context(
        &mut self,
        window: &P::Window,
        platform: &P,
        settings_path: Option<&Path>,
    ) -> Result<Self::Context, UiError>;

    /// Destroy a context
    fn destroy_context(&mut self, context: Self::Context);

    /// Translate an event into input for a context
    ///
    /// Events addressed to other windows are ignored.
    fn process_event(
        &mut self,
        context: &mut Self::Context,
        platform: &P,
        window: &P::Window,
        event: &P::Event,
    );

    /// Make the context current and begin a frame
    fn new_frame<'a>(
        &mut self,
        context: &'a mut Self::Context,
        platform: &P,
        window: &P::Window,
    ) -> Result<&'a mut Self::Frame, UiError>;

    /// Finalize the frame into draw data
    fn end_frame<'a>(
        &mut self,
        context: &'a mut Self::Context,
    ) -> Result<Self::DrawData<'a>, UiError>;

    /// Draw finalized UI into the current window surface
    fn submit(&mut self, gfx: &P::Graphics, draw_data: Self::DrawData<'_>) -> Result<(), UiError>;

    /// Release current status of a context
    fn suspend(&mut self, context: &mut Self::Context);

    /// Rebuild the font atlas and style for a new scale
    ///
    /// Called between frames with the shared context current and no UI
    /// context current. Contexts pick up the new style on their next frame.
    fn rescale(&mut self, gfx: &P::Graphics, scale: f32) -> Result<(), UiError>;
}
