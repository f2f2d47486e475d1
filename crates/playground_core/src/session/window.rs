//! Window and context helpers
//!
//! Each create helper cleans up whatever it already acquired when a later
//! step fails. Each destroy helper unbinds the current context before the
//! resource goes away. Failures are logged here and handed back to the caller.

use super::{CanvasId, OpenError};
use crate::canvas::Canvas;
use crate::config::{SessionConfig, WindowConfig};
use crate::platform::{Platform, PlatformResult};
use crate::ui::UiBackend;
use std::path::Path;

/// Objects shared by every canvas window
pub(crate) struct Shared<P: Platform> {
    pub(crate) backing: P::Window,
    pub(crate) context: P::Context,
    pub(crate) graphics: P::Graphics,
}

/// Platform window, UI context and owning canvas of one open canvas
pub(crate) struct WindowInfo<P: Platform, U: UiBackend<P>> {
    pub(crate) canvas: CanvasId,
    pub(crate) window: P::Window,
    /// Empty only while lent to the render tick
    pub(crate) ui_context: Option<U::Context>,
}

/// Create the backing window and shared context, then load graphics from it
pub(crate) fn create_shared<P: Platform>(
    platform: &mut P,
    config: &SessionConfig,
) -> PlatformResult<Shared<P>> {
    let backing = platform.create_backing_window(&config.backing_window()).map_err(|e| {
        log::error!("Failed to create backing window: {e}");
        e
    })?;

    let context = match platform.create_context(&backing) {
        Ok(context) => context,
        Err(e) => {
            log::error!("Failed to create shared context: {e}");
            platform.destroy_window(backing);
            return Err(e);
        }
    };

    let graphics = platform
        .make_current(Some((&backing, &context)))
        .and_then(|()| platform.load_graphics(&backing));
    match graphics {
        Ok(graphics) => Ok(Shared {
            backing,
            context,
            graphics,
        }),
        Err(e) => {
            log::error!("Failed to prepare shared context: {e}");
            unbind(platform);
            platform.destroy_context(context);
            platform.destroy_window(backing);
            Err(e)
        }
    }
}

/// Destroy the shared context and its backing window
pub(crate) fn destroy_shared<P: Platform>(platform: &mut P, shared: Shared<P>) {
    let Shared {
        backing,
        context,
        graphics,
    } = shared;
    unbind(platform);
    drop(graphics);
    platform.destroy_context(context);
    platform.destroy_window(backing);
}

/// Create a canvas window and its UI context
///
/// The window is destroyed again if the UI context cannot be created.
pub(crate) fn create_canvas_window<P: Platform, U: UiBackend<P>>(
    platform: &mut P,
    ui: &mut U,
    backing: &P::Window,
    config: &WindowConfig,
    settings_path: Option<&Path>,
) -> Result<(P::Window, U::Context), OpenError> {
    let window = platform.create_window(config, backing).map_err(|e| {
        log::error!("Failed to create window '{}': {e}", config.title);
        OpenError::Window(e)
    })?;

    match ui.create_context(&window, platform, settings_path) {
        Ok(context) => Ok((window, context)),
        Err(e) => {
            log::error!("Failed to create UI context for '{}': {e}", config.title);
            platform.destroy_window(window);
            Err(OpenError::UiContext(e))
        }
    }
}

/// Tear down one canvas window
///
/// Releases the canvas with its window current, then destroys the UI context,
/// unbinds and destroys the window.
pub(crate) fn destroy_canvas_window<P: Platform, U: UiBackend<P>>(
    platform: &mut P,
    ui: &mut U,
    shared: &Shared<P>,
    info: WindowInfo<P, U>,
    canvas: Option<Box<dyn Canvas<P, U>>>,
) {
    let WindowInfo {
        canvas: id,
        window,
        ui_context,
    } = info;
    log::debug!("Tearing down canvas {id:?}");

    if let Some(mut canvas) = canvas {
        match platform.make_current(Some((&window, &shared.context))) {
            Ok(()) => canvas.release(&shared.graphics),
            Err(e) => log::error!("Skipping GPU release of canvas {id:?}: {e}"),
        }
        drop(canvas);
    }

    if let Some(context) = ui_context {
        ui.destroy_context(context);
    }

    unbind(platform);
    platform.destroy_window(window);
}

fn unbind<P: Platform>(platform: &mut P) {
    if let Err(e) = platform.make_current(None) {
        log::error!("Failed to unbind context: {e}");
    }
}
