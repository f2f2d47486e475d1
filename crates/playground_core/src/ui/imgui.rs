//! Dear ImGui backend for GLFW windows
//!
//! Every window gets its own `imgui` context. All contexts are created from a
//! single shared font atlas, and one [`UiRenderer`] draws for all of them
//! through the shared GL context.

use super::input;
use super::renderer::UiRenderer;
use super::{UiBackend, UiError};
use crate::config::UiConfig;
use crate::platform::glfw::{GlfwEvent, GlfwPlatform, GlfwWindow};
use crate::platform::{Platform, WindowId};
use ::imgui::{BackendFlags, ConfigFlags, FontAtlas, FontConfig, FontSource, SharedFontAtlas, Style};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

/// Per-window imgui context
///
/// Suspended except while an event is translated or a frame is built.
pub struct ImguiContext {
    window: WindowId,
    active: Option<::imgui::Context>,
    suspended: Option<::imgui::SuspendedContext>,
    settings_path: Option<PathBuf>,
    /// Style before scaling, captured on first activation
    base_style: Option<Style>,
    styled_scale: Option<f32>,
    last_frame: Instant,
}

impl ImguiContext {
    /// Window this context belongs to
    pub fn window(&self) -> WindowId {
        self.window
    }

    fn activate(&mut self, config: &UiConfig) -> Result<&mut ::imgui::Context, UiError> {
        let mut context = match self.active.take() {
            Some(context) => context,
            None => {
                let suspended = self.suspended.take().ok_or_else(|| {
                    UiError::ContextActivationFailed(format!("UI context of {} is gone", self.window))
                })?;
                match suspended.activate() {
                    Ok(context) => context,
                    Err(suspended) => {
                        self.suspended = Some(suspended);
                        return Err(UiError::ContextActivationFailed(format!(
                            "another UI context is current while activating {}",
                            self.window
                        )));
                    }
                }
            }
        };

        // Contexts may be created while another one is mid-frame, so setup
        // waits for the first activation
        if self.base_style.is_none() {
            configure(&mut context, self.settings_path.clone());
            self.base_style = Some(context.style().clone());
        }
        if self.styled_scale != Some(config.scale) {
            if let Some(base) = &self.base_style {
                *context.style_mut() = base.clone();
            }
            apply_style(context.style_mut(), config.scale);
            self.styled_scale = Some(config.scale);
        }

        Ok(self.active.insert(context))
    }

    fn suspend(&mut self) {
        if let Some(context) = self.active.take() {
            self.suspended = Some(context.suspend());
        }
    }
}

fn configure(context: &mut ::imgui::Context, settings_path: Option<PathBuf>) {
    context.set_ini_filename(settings_path);
    context.set_platform_name(Some(format!("playground-glfw {}", env!("CARGO_PKG_VERSION"))));
    context.set_renderer_name(Some(format!("playground-glow {}", env!("CARGO_PKG_VERSION"))));

    let io = context.io_mut();
    io.config_flags.insert(ConfigFlags::NAV_ENABLE_KEYBOARD);
    io.backend_flags.insert(BackendFlags::RENDERER_HAS_VTX_OFFSET);
}

fn add_default_font(atlas: &mut FontAtlas, config: &UiConfig) {
    atlas.add_font(&[FontSource::DefaultFontData {
        config: Some(FontConfig {
            size_pixels: config.scaled_font_size(),
            ..FontConfig::default()
        }),
    }]);
}

/// Flat look with thin borders, scaled for high-density displays
pub(crate) fn apply_style(style: &mut Style, scale: f32) {
    style.use_dark_colors();
    style.window_border_size = 1.0;
    style.child_border_size = 1.0;
    style.popup_border_size = 1.0;
    style.frame_border_size = 1.0;
    style.tab_border_size = 1.0;
    style.window_rounding = 0.0;
    style.child_rounding = 0.0;
    style.popup_rounding = 0.0;
    style.frame_rounding = 0.0;
    style.scrollbar_rounding = 0.0;
    style.grab_rounding = 0.0;
    style.tab_rounding = 0.0;
    style.scale_all_sizes(scale);
}

/// [`UiBackend`] built on `imgui`
pub struct ImguiBackend {
    atlas: Option<Rc<RefCell<SharedFontAtlas>>>,
    renderer: Option<UiRenderer>,
    config: UiConfig,
}

impl ImguiBackend {
    /// Create an uninitialized backend; the session calls `init`
    pub fn new() -> Self {
        Self {
            atlas: None,
            renderer: None,
            config: UiConfig::default(),
        }
    }

    fn renderer(&self) -> Result<&UiRenderer, UiError> {
        self.renderer.as_ref().ok_or(UiError::NotInitialized)
    }
}

impl Default for ImguiBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl UiBackend<GlfwPlatform> for ImguiBackend {
    type Context = ImguiContext;
    type Frame = ::imgui::Ui;
    type DrawData<'a> = &'a ::imgui::DrawData where Self: 'a;

    fn init(&mut self, gfx: &glow::Context, config: &UiConfig) -> Result<(), UiError> {
        let atlas = Rc::new(RefCell::new(SharedFontAtlas::create()));
        let renderer = {
            let mut fonts = atlas.borrow_mut();
            add_default_font(&mut fonts, config);
            UiRenderer::new(gfx, &mut fonts)?
        };

        log::info!(
            "UI backend ready (font {:.1}px, scale {:.2})",
            config.scaled_font_size(),
            config.scale
        );
        self.atlas = Some(atlas);
        self.renderer = Some(renderer);
        self.config = config.clone();
        Ok(())
    }

    fn shutdown(&mut self, gfx: &glow::Context) {
        if let Some(renderer) = self.renderer.take() {
            renderer.destroy(gfx);
        }
        self.atlas = None;
        log::debug!("UI backend shut down");
    }

    fn create_context(
        &mut self,
        window: &GlfwWindow,
        _platform: &GlfwPlatform,
        settings_path: Option<&Path>,
    ) -> Result<ImguiContext, UiError> {
        let atlas = self.atlas.clone().ok_or(UiError::NotInitialized)?;
        let suspended = ::imgui::SuspendedContext::create_with_shared_font_atlas(atlas);
        log::debug!("Created UI context for {}", window.id());

        Ok(ImguiContext {
            window: window.id(),
            active: None,
            suspended: Some(suspended),
            settings_path: settings_path.map(Path::to_path_buf),
            base_style: None,
            styled_scale: None,
            last_frame: Instant::now(),
        })
    }

    fn destroy_context(&mut self, context: ImguiContext) {
        log::debug!("Destroying UI context for {}", context.window);
        drop(context);
    }

    fn process_event(
        &mut self,
        context: &mut ImguiContext,
        _platform: &GlfwPlatform,
        window: &GlfwWindow,
        event: &GlfwEvent,
    ) {
        if event.window != window.id() {
            return;
        }
        match context.activate(&self.config) {
            Ok(imgui) => input::translate(imgui.io_mut(), &event.event),
            Err(e) => log::warn!("Dropping input for {}: {e}", window.id()),
        }
        context.suspend();
    }

    fn new_frame<'a>(
        &mut self,
        context: &'a mut ImguiContext,
        platform: &GlfwPlatform,
        window: &GlfwWindow,
    ) -> Result<&'a mut ::imgui::Ui, UiError> {
        self.renderer()?;

        let now = Instant::now();
        let delta = now - context.last_frame;
        context.last_frame = now;

        let (width, height) = window.size();
        let (fb_width, fb_height) = platform.framebuffer_size(window);

        let imgui = context.activate(&self.config)?;
        let io = imgui.io_mut();
        io.display_size = [width as f32, height as f32];
        if width > 0 && height > 0 {
            io.display_framebuffer_scale =
                [fb_width as f32 / width as f32, fb_height as f32 / height as f32];
        }
        io.update_delta_time(delta);

        Ok(imgui.new_frame())
    }

    fn end_frame<'a>(
        &mut self,
        context: &'a mut ImguiContext,
    ) -> Result<&'a ::imgui::DrawData, UiError> {
        let window = context.window;
        match context.active.as_mut() {
            Some(imgui) => Ok(imgui.render()),
            None => Err(UiError::ContextActivationFailed(format!(
                "frame ended on inactive UI context of {window}"
            ))),
        }
    }

    fn submit(&mut self, gfx: &glow::Context, draw_data: &::imgui::DrawData) -> Result<(), UiError> {
        self.renderer()?.render(gfx, draw_data)
    }

    fn suspend(&mut self, context: &mut ImguiContext) {
        context.suspend();
    }

    fn rescale(&mut self, gfx: &glow::Context, scale: f32) -> Result<(), UiError> {
        let atlas = self.atlas.as_ref().ok_or(UiError::NotInitialized)?;
        let renderer = self.renderer.as_mut().ok_or(UiError::NotInitialized)?;
        let config = UiConfig {
            scale,
            ..self.config.clone()
        };

        {
            let mut fonts = atlas
                .try_borrow_mut()
                .map_err(|_| UiError::Renderer("font atlas is in use by a frame".to_string()))?;
            fonts.clear();
            add_default_font(&mut fonts, &config);
            renderer.reload_font_atlas(gfx, &mut fonts)?;
        }

        log::info!(
            "UI rescaled (font {:.1}px, scale {:.2})",
            config.scaled_font_size(),
            config.scale
        );
        self.config = config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // The only test in the crate that creates an imgui context
    #[test]
    fn test_style_is_flat_and_scaled() {
        let mut context = ::imgui::Context::create();
        context.set_ini_filename(None);
        let unscaled = context.style().clone();

        apply_style(context.style_mut(), 2.0);
        let style = context.style();
        assert_relative_eq!(style.window_rounding, 0.0);
        assert_relative_eq!(style.frame_rounding, 0.0);
        assert_relative_eq!(style.frame_border_size, 1.0);
        assert_relative_eq!(style.window_padding[0], unscaled.window_padding[0] * 2.0);

        // Rescaling restores the unscaled style first, so factors do not compound
        *context.style_mut() = unscaled.clone();
        apply_style(context.style_mut(), 1.5);
        let style = context.style();
        assert_relative_eq!(style.window_padding[0], unscaled.window_padding[0] * 1.5);
        assert_relative_eq!(style.scrollbar_size, unscaled.scrollbar_size * 1.5);
    }
}
