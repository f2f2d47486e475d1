//! # Session
//!
//! Owns every open canvas together with its platform window and UI context,
//! the shared graphics context, and the main loop.
//!
//! Opening and closing is deferred: `open_window` queues the new window and
//! `close_window` queues the old one, and both queues are drained at the top
//! of the next [`Session::step`]. Canvases may therefore open and close other
//! canvases (or themselves) from inside `build_ui`. UI rescale requests are
//! deferred the same way.

mod window;

#[cfg(test)]
mod tests;

use crate::canvas::{Canvas, Viewport};
use crate::config::{ConfigError, SessionConfig};
use crate::foundation::time::FrameGate;
use crate::platform::{EventKind, Platform, PlatformError, WindowId};
use crate::ui::{UiBackend, UiError};
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use thiserror::Error;
use window::{Shared, WindowInfo};

new_key_type! {
    /// Stable handle to an opened canvas
    ///
    /// `CanvasId::default()` is the null handle and never refers to a canvas.
    pub struct CanvasId;
}

/// Main loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Loop keeps iterating
    Running,
    /// Loop exits after the current iteration
    Terminating,
}

/// Why a canvas could not be opened
#[derive(Error, Debug)]
pub enum OpenError {
    /// Platform window creation failed
    #[error("Canvas window could not be created: {0}")]
    Window(#[source] PlatformError),

    /// UI context creation failed (the window was destroyed again)
    #[error("Canvas UI context could not be created: {0}")]
    UiContext(#[source] UiError),
}

/// Fatal session errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// Platform failure
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// UI backend failure
    #[error("UI error: {0}")]
    Ui(#[from] UiError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

type CanvasBox<P, U> = Box<dyn Canvas<P, U>>;

/// Multi-window canvas session
pub struct Session<P: Platform, U: UiBackend<P>> {
    config: SessionConfig,
    platform: P,
    ui: U,
    shared: Shared<P>,
    /// Slot is `None` while the canvas is lent to its own callback
    canvases: SlotMap<CanvasId, Option<CanvasBox<P, U>>>,
    live: SecondaryMap<CanvasId, WindowInfo<P, U>>,
    pending_create: Vec<WindowInfo<P, U>>,
    pending_destroy: Vec<WindowInfo<P, U>>,
    pending_scale: Option<f32>,
    gate: FrameGate,
    state: LoopState,
}

impl<P: Platform, U: UiBackend<P>> Session<P, U> {
    /// Create the shared context and initialize the UI backend
    pub fn new(config: SessionConfig, mut platform: P, mut ui: U) -> Result<Self, SessionError> {
        config.validate()?;

        let shared = window::create_shared(&mut platform, &config)?;

        if let Err(e) = platform.set_swap_interval(config.swap_interval) {
            log::warn!("Swap interval {} not applied: {e}", config.swap_interval);
        }

        if let Err(e) = ui.init(&shared.graphics, &config.ui) {
            log::error!("UI backend initialization failed: {e}");
            window::destroy_shared(&mut platform, shared);
            return Err(e.into());
        }

        let gate = FrameGate::new(platform.ticks(), config.frame_interval());
        log::info!(
            "Session initialized (frame interval {:?}, swap interval {})",
            gate.interval(),
            config.swap_interval
        );

        Ok(Self {
            config,
            platform,
            ui,
            shared,
            canvases: SlotMap::with_key(),
            live: SecondaryMap::new(),
            pending_create: Vec::new(),
            pending_destroy: Vec::new(),
            pending_scale: None,
            gate,
            state: LoopState::Running,
        })
    }

    /// Open a canvas in a new window
    ///
    /// The window becomes live at the start of the next [`Session::step`]. On
    /// failure nothing is queued and the canvas is dropped.
    pub fn open_window(&mut self, canvas: Box<dyn Canvas<P, U>>) -> Result<CanvasId, OpenError> {
        let title = canvas.title().to_owned();
        let window_config = self.config.window.clone().with_title(title.as_str());
        let settings_path = self.config.ui.settings_path(&title);

        let (window, ui_context) = window::create_canvas_window(
            &mut self.platform,
            &mut self.ui,
            &self.shared.backing,
            &window_config,
            settings_path.as_deref(),
        )?;

        let id = self.canvases.insert(Some(canvas));
        self.pending_create.push(WindowInfo {
            canvas: id,
            window,
            ui_context: Some(ui_context),
        });
        log::info!("Opened canvas '{title}' as {id:?}");
        Ok(id)
    }

    /// True once the canvas is live (from the step after `open_window`)
    pub fn is_opened(&self, id: CanvasId) -> bool {
        self.live.contains_key(id)
    }

    /// Close a live canvas
    ///
    /// It stops being opened immediately and is torn down at the start of the
    /// next step. Returns false for the null id, unknown ids, canvases still
    /// waiting to open, and canvases already closing.
    pub fn close_window(&mut self, id: CanvasId) -> bool {
        match self.live.remove(id) {
            Some(info) => {
                log::info!("Closing canvas {id:?}");
                self.pending_destroy.push(info);
                true
            }
            None => {
                log::debug!("Ignoring close of canvas {id:?}, not opened");
                false
            }
        }
    }

    /// Tear down every canvas right now, whether live or queued
    pub fn close_all_windows(&mut self) {
        let mut entries: Vec<WindowInfo<P, U>> = self.pending_create.drain(..).collect();
        entries.append(&mut self.pending_destroy);
        entries.extend(self.live.drain().map(|(_, info)| info));

        if !entries.is_empty() {
            log::info!("Closing all {} canvas windows", entries.len());
        }
        for info in entries {
            self.teardown(info);
        }
    }

    /// Number of live canvas windows
    pub fn window_count(&self) -> usize {
        self.live.len()
    }

    /// Number of windows waiting to be opened or torn down
    pub fn pending_count(&self) -> usize {
        self.pending_create.len() + self.pending_destroy.len()
    }

    /// Current loop state
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Stop the loop after the current iteration
    pub fn request_quit(&mut self) {
        if self.state == LoopState::Running {
            log::info!("Quit requested");
        }
        self.state = LoopState::Terminating;
    }

    /// Scale the UI is currently rendered at
    pub fn ui_scale(&self) -> f32 {
        self.config.ui.scale
    }

    /// Rescale fonts and style of every UI context
    ///
    /// Applied at the start of the next step, between frames. A later request
    /// replaces an earlier one. Returns false, and queues nothing, unless the
    /// scale is finite and positive.
    pub fn request_ui_scale(&mut self, scale: f32) -> bool {
        if !(scale.is_finite() && scale > 0.0) {
            log::warn!("Ignoring UI scale {scale}");
            return false;
        }
        log::debug!("UI scale {scale} requested");
        self.pending_scale = Some(scale);
        true
    }

    /// Shared graphics function table
    pub fn graphics(&self) -> &P::Graphics {
        &self.shared.graphics
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Platform backing this session
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Run one loop iteration
    pub fn step(&mut self) -> LoopState {
        self.drain_create_queue();
        self.drain_destroy_queue();
        self.apply_pending_scale();
        self.dispatch_events();

        if self.state == LoopState::Running && self.gate.tick(self.platform.ticks()) {
            self.render_tick();
        }
        self.state
    }

    /// Step until the loop is terminating
    pub fn run(&mut self) {
        log::info!("Entering main loop");
        while self.step() == LoopState::Running {}
        log::info!("Main loop finished");
    }

    /// Release every window, the UI backend and the shared context
    pub fn shutdown(mut self) {
        log::info!("Shutting down session");
        self.close_all_windows();

        if let Err(e) = self
            .platform
            .make_current(Some((&self.shared.backing, &self.shared.context)))
        {
            log::error!("Failed to bind shared context for UI shutdown: {e}");
        }
        self.ui.shutdown(&self.shared.graphics);

        window::destroy_shared(&mut self.platform, self.shared);
        log::info!("Session shut down");
    }

    /// Run the loop, then shut down
    pub fn exec(mut self) {
        self.run();
        self.shutdown();
    }

    fn drain_create_queue(&mut self) {
        if self.pending_create.is_empty() {
            return;
        }
        log::debug!("Activating {} new windows", self.pending_create.len());
        for info in std::mem::take(&mut self.pending_create) {
            self.live.insert(info.canvas, info);
        }
    }

    fn drain_destroy_queue(&mut self) {
        if self.pending_destroy.is_empty() {
            return;
        }
        log::debug!("Destroying {} closed windows", self.pending_destroy.len());
        for info in std::mem::take(&mut self.pending_destroy) {
            self.teardown(info);
        }
    }

    fn apply_pending_scale(&mut self) {
        let Some(scale) = self.pending_scale.take() else {
            return;
        };
        if let Err(e) = self
            .platform
            .make_current(Some((&self.shared.backing, &self.shared.context)))
        {
            log::error!("Failed to bind shared context for UI rescale: {e}");
            return;
        }
        match self.ui.rescale(&self.shared.graphics, scale) {
            Ok(()) => {
                log::info!("UI scale changed from {} to {scale}", self.config.ui.scale);
                self.config.ui.scale = scale;
            }
            Err(e) => log::error!("UI rescale to {scale} failed: {e}"),
        }
        if let Err(e) = self.platform.make_current(None) {
            log::error!("Failed to unbind context: {e}");
        }
    }

    fn teardown(&mut self, info: WindowInfo<P, U>) {
        let canvas = self.canvases.remove(info.canvas).flatten();
        window::destroy_canvas_window(&mut self.platform, &mut self.ui, &self.shared, info, canvas);
    }

    fn dispatch_events(&mut self) {
        for event in self.platform.poll_events() {
            for info in self.live.values_mut() {
                if let Some(context) = info.ui_context.as_mut() {
                    self.ui
                        .process_event(context, &self.platform, &info.window, &event);
                }
            }

            match self.platform.classify(&event) {
                EventKind::Quit => self.request_quit(),
                EventKind::CloseRequested(window) => match self.canvas_of(window) {
                    Some(id) => {
                        self.close_window(id);
                    }
                    None => log::debug!("Close requested for {window} without a live canvas"),
                },
                EventKind::Other => {}
            }
        }

        if self.config.quit_when_last_window_closes
            && self.state == LoopState::Running
            && self.live.is_empty()
            && self.pending_create.is_empty()
        {
            log::info!("Last canvas window closed");
            self.state = LoopState::Terminating;
        }
    }

    fn canvas_of(&self, window: WindowId) -> Option<CanvasId> {
        self.live
            .iter()
            .find(|(_, info)| self.platform.window_id(&info.window) == window)
            .map(|(id, _)| id)
    }

    fn render_tick(&mut self) {
        let ids: Vec<CanvasId> = self.live.keys().collect();
        log::trace!("Render tick over {} windows", ids.len());

        for id in ids {
            // An earlier canvas may have closed this one during the tick
            if !self.live.contains_key(id) {
                continue;
            }
            let Some(mut canvas) = self.canvases.get_mut(id).and_then(Option::take) else {
                continue;
            };
            let Some(mut context) = self.live.get_mut(id).and_then(|info| info.ui_context.take())
            else {
                self.return_canvas(id, canvas);
                continue;
            };

            if let Err(e) = self.render_canvas(id, canvas.as_mut(), &mut context) {
                log::error!("Frame of canvas {id:?} failed: {e}");
            }
            self.ui.suspend(&mut context);

            self.return_lent(id, canvas, context);
        }
    }

    fn render_canvas(
        &mut self,
        id: CanvasId,
        canvas: &mut dyn Canvas<P, U>,
        context: &mut U::Context,
    ) -> Result<(), SessionError> {
        let Some(info) = self.live.get(id) else {
            return Ok(());
        };
        let frame = self.ui.new_frame(context, &self.platform, &info.window)?;
        canvas.build_ui(frame, self);
        let draw_data = self.ui.end_frame(context)?;

        // build_ui may have closed this canvas
        let Some(info) = self.live.get_mut(id) else {
            return Ok(());
        };
        self.platform
            .make_current(Some((&info.window, &self.shared.context)))?;
        let (width, height) = self.platform.framebuffer_size(&info.window);
        canvas.render(&self.shared.graphics, Viewport::new(width, height));
        if let Err(e) = self.ui.submit(&self.shared.graphics, draw_data) {
            log::error!("UI of canvas {id:?} not drawn: {e}");
        }
        self.platform.swap_window(&mut info.window);
        Ok(())
    }

    fn return_canvas(&mut self, id: CanvasId, canvas: CanvasBox<P, U>) {
        if let Some(slot) = self.canvases.get_mut(id) {
            *slot = Some(canvas);
        }
    }

    /// Put a lent canvas and UI context back wherever the entry now lives
    fn return_lent(&mut self, id: CanvasId, mut canvas: CanvasBox<P, U>, context: U::Context) {
        let entry = match self.live.get_mut(id) {
            Some(info) => Some(info),
            None => self.pending_destroy.iter_mut().find(|info| info.canvas == id),
        };

        if let Some(info) = entry {
            info.ui_context = Some(context);
            self.return_canvas(id, canvas);
            return;
        }

        // The window was torn down while lent (close_all_windows from build_ui)
        log::warn!("Canvas {id:?} was torn down during its own frame");
        self.ui.destroy_context(context);
        match self
            .platform
            .make_current(Some((&self.shared.backing, &self.shared.context)))
        {
            Ok(()) => canvas.release(&self.shared.graphics),
            Err(e) => log::error!("Skipping GPU release of canvas {id:?}: {e}"),
        }
        if let Err(e) = self.platform.make_current(None) {
            log::error!("Failed to unbind context: {e}");
        }
    }
}
