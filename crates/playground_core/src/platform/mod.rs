//! Platform windowing interface
//!
//! Keeps the session independent of the windowing library. A platform
//! creates native windows and the shared graphics context, makes a
//! (window, context) pair current, presents, and exposes a polled event queue.

pub mod glfw;

use crate::config::WindowConfig;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Platform errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Windowing library could not be initialized
    #[error("Platform initialization failed: {0}")]
    InitializationFailed(String),

    /// Native window creation failed
    #[error("Window creation failed: {0}")]
    WindowCreationFailed(String),

    /// Graphics context creation failed
    #[error("Graphics context creation failed: {0}")]
    ContextCreationFailed(String),

    /// Binding a context to a window failed
    #[error("Failed to make context current: {0}")]
    MakeCurrentFailed(String),

    /// Graphics function table could not be loaded
    #[error("Failed to load graphics functions: {0}")]
    FunctionTableLoadFailed(String),
}

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Stable identifier of a native window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// What the session needs to know about a platform event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Application should terminate
    Quit,
    /// User asked to close one window
    CloseRequested(WindowId),
    /// Anything else (input, resize, focus)
    Other,
}

/// Windowing and graphics-context provider
pub trait Platform: Sized + 'static {
    /// Native window
    type Window;
    /// Shared graphics context
    type Context;
    /// Polled event
    type Event;
    /// Loaded graphics function table canvases draw with
    type Graphics;

    /// Create the hidden window that keeps the shared context alive
    fn create_backing_window(&mut self, config: &WindowConfig) -> PlatformResult<Self::Window>;

    /// Create a visible window whose surface can use the shared context
    fn create_window(
        &mut self,
        config: &WindowConfig,
        backing: &Self::Window,
    ) -> PlatformResult<Self::Window>;

    /// Destroy a window; it must not be current
    fn destroy_window(&mut self, window: Self::Window);

    /// Create the shared graphics context against the backing window
    fn create_context(&mut self, backing: &Self::Window) -> PlatformResult<Self::Context>;

    /// Destroy the shared context; it must not be current
    fn destroy_context(&mut self, context: Self::Context);

    /// Bind the context to a window surface, or unbind with `None`
    fn make_current(
        &mut self,
        target: Option<(&Self::Window, &Self::Context)>,
    ) -> PlatformResult<()>;

    /// Load the graphics function table from the current context
    fn load_graphics(&mut self, window: &Self::Window) -> PlatformResult<Self::Graphics>;

    /// Set the swap interval of the current context
    fn set_swap_interval(&mut self, interval: u32) -> PlatformResult<()>;

    /// Present a window's back buffer
    fn swap_window(&mut self, window: &mut Self::Window);

    /// Collect every pending event without blocking
    fn poll_events(&mut self) -> Vec<Self::Event>;

    /// Classify an event for the session loop
    fn classify(&self, event: &Self::Event) -> EventKind;

    /// Identifier of a window
    fn window_id(&self, window: &Self::Window) -> WindowId;

    /// Framebuffer size of a window in pixels
    fn framebuffer_size(&self, window: &Self::Window) -> (u32, u32);

    /// Monotonic time since platform initialization
    fn ticks(&self) -> Duration;
}
