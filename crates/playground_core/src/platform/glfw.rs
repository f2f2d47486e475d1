//! GLFW platform
//!
//! Every canvas window is created with `create_shared` against a hidden
//! backing window, so buffers, textures and programs created in any window
//! are visible in all of them. Container objects (vertex arrays, framebuffers)
//! are per-window and must be created while that window is current.

use super::{EventKind, Platform, PlatformError, PlatformResult, WindowId};
use crate::config::{PlatformConfig, WindowConfig, WindowFlags};
use ::glfw::{Context as _, GlfwReceiver, WindowEvent};
use std::time::Duration;

/// GLFW window with its event id
pub struct GlfwWindow {
    id: WindowId,
    handle: ::glfw::PWindow,
}

impl GlfwWindow {
    /// Window identifier
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Underlying GLFW window
    pub fn handle(&self) -> &::glfw::Window {
        &self.handle
    }

    /// Window size in screen coordinates
    pub fn size(&self) -> (u32, u32) {
        let (width, height) = self.handle.get_size();
        (width.max(0) as u32, height.max(0) as u32)
    }
}

/// Handle to the shared context
///
/// GLFW creates a context together with each window; the shared one belongs
/// to the backing window and dies with it.
#[derive(Debug)]
pub struct GlfwContext {
    owner: WindowId,
}

/// Window event tagged with the window it was delivered to
#[derive(Debug, Clone)]
pub struct GlfwEvent {
    /// Receiving window
    pub window: WindowId,
    /// GLFW event payload
    pub event: WindowEvent,
}

/// GLFW-backed [`Platform`]
pub struct GlfwPlatform {
    glfw: ::glfw::Glfw,
    receivers: Vec<(WindowId, GlfwReceiver<(f64, WindowEvent)>)>,
    next_id: u32,
}

impl GlfwPlatform {
    /// Initialize GLFW and set the context hints shared by every window
    pub fn init(config: &PlatformConfig) -> PlatformResult<Self> {
        let mut glfw = ::glfw::init(::glfw::log_errors)
            .map_err(|e| PlatformError::InitializationFailed(format!("{e:?}")))?;

        glfw.window_hint(::glfw::WindowHint::ClientApi(::glfw::ClientApiHint::OpenGl));
        glfw.window_hint(::glfw::WindowHint::ContextVersion(
            config.context_major,
            config.context_minor,
        ));
        glfw.window_hint(::glfw::WindowHint::OpenGlProfile(
            ::glfw::OpenGlProfileHint::Core,
        ));
        #[cfg(target_os = "macos")]
        glfw.window_hint(::glfw::WindowHint::OpenGlForwardCompat(true));
        glfw.window_hint(::glfw::WindowHint::DoubleBuffer(true));
        glfw.window_hint(::glfw::WindowHint::DepthBits(Some(config.depth_bits)));
        glfw.window_hint(::glfw::WindowHint::StencilBits(Some(config.stencil_bits)));

        log::info!(
            "GLFW initialized, requesting OpenGL {}.{} core",
            config.context_major,
            config.context_minor
        );

        Ok(Self {
            glfw,
            receivers: Vec::new(),
            next_id: 0,
        })
    }

    fn apply_window_hints(&mut self, config: &WindowConfig) {
        let flags = config.flags;
        self.glfw
            .window_hint(::glfw::WindowHint::Visible(!flags.contains(WindowFlags::HIDDEN)));
        self.glfw
            .window_hint(::glfw::WindowHint::Resizable(flags.contains(WindowFlags::RESIZABLE)));
        self.glfw.window_hint(::glfw::WindowHint::ScaleToMonitor(
            flags.contains(WindowFlags::HIGH_PIXEL_DENSITY),
        ));
    }

    fn register(
        &mut self,
        created: Option<(::glfw::PWindow, GlfwReceiver<(f64, WindowEvent)>)>,
        config: &WindowConfig,
    ) -> PlatformResult<GlfwWindow> {
        let (mut handle, events) = created.ok_or_else(|| {
            PlatformError::WindowCreationFailed(format!(
                "'{}' ({}x{})",
                config.title, config.width, config.height
            ))
        })?;
        handle.set_all_polling(true);

        let id = WindowId(self.next_id);
        self.next_id += 1;
        self.receivers.push((id, events));
        log::debug!("Created {id} '{}'", config.title);

        Ok(GlfwWindow { id, handle })
    }
}

impl Platform for GlfwPlatform {
    type Window = GlfwWindow;
    type Context = GlfwContext;
    type Event = GlfwEvent;
    type Graphics = glow::Context;

    fn create_backing_window(&mut self, config: &WindowConfig) -> PlatformResult<GlfwWindow> {
        self.apply_window_hints(config);
        let created = self.glfw.create_window(
            config.width,
            config.height,
            &config.title,
            ::glfw::WindowMode::Windowed,
        );
        self.register(created, config)
    }

    fn create_window(
        &mut self,
        config: &WindowConfig,
        backing: &GlfwWindow,
    ) -> PlatformResult<GlfwWindow> {
        self.apply_window_hints(config);
        let created = backing.handle.create_shared(
            config.width,
            config.height,
            &config.title,
            ::glfw::WindowMode::Windowed,
        );
        self.register(created, config)
    }

    fn destroy_window(&mut self, window: GlfwWindow) {
        self.receivers.retain(|(id, _)| *id != window.id);
        log::debug!("Destroying {}", window.id);
        drop(window);
    }

    fn create_context(&mut self, backing: &GlfwWindow) -> PlatformResult<GlfwContext> {
        // A window only exists if its context was created with it
        ::glfw::make_context_current(Some(&*backing.handle as &dyn ::glfw::Context));
        if !backing.handle.is_current() {
            return Err(PlatformError::ContextCreationFailed(format!(
                "context of {} could not be bound",
                backing.id
            )));
        }
        Ok(GlfwContext { owner: backing.id })
    }

    fn destroy_context(&mut self, context: GlfwContext) {
        log::debug!("Releasing shared context owned by {}", context.owner);
    }

    fn make_current(&mut self, target: Option<(&GlfwWindow, &GlfwContext)>) -> PlatformResult<()> {
        match target {
            Some((window, _context)) => {
                ::glfw::make_context_current(Some(&*window.handle as &dyn ::glfw::Context));
                if window.handle.is_current() {
                    Ok(())
                } else {
                    Err(PlatformError::MakeCurrentFailed(window.id.to_string()))
                }
            }
            None => {
                ::glfw::make_context_current(None);
                Ok(())
            }
        }
    }

    fn load_graphics(&mut self, window: &GlfwWindow) -> PlatformResult<glow::Context> {
        if self.glfw.get_proc_address_raw("glGetString").is_null() {
            return Err(PlatformError::FunctionTableLoadFailed(format!(
                "glGetString unavailable for {}",
                window.id
            )));
        }

        // SAFETY: the shared context is current on this thread and the loader
        // returns entry points for it.
        let gl = unsafe {
            glow::Context::from_loader_function(|name| {
                self.glfw.get_proc_address_raw(name) as *const _
            })
        };

        let version = glow::HasContext::version(&gl);
        log::info!(
            "Loaded OpenGL {}.{} ({})",
            version.major,
            version.minor,
            version.vendor_info
        );
        Ok(gl)
    }

    fn set_swap_interval(&mut self, interval: u32) -> PlatformResult<()> {
        let interval = if interval == 0 {
            ::glfw::SwapInterval::None
        } else {
            ::glfw::SwapInterval::Sync(interval)
        };
        self.glfw.set_swap_interval(interval);
        Ok(())
    }

    fn swap_window(&mut self, window: &mut GlfwWindow) {
        window.handle.swap_buffers();
    }

    fn poll_events(&mut self) -> Vec<GlfwEvent> {
        self.glfw.poll_events();

        let mut events = Vec::new();
        for (id, receiver) in &self.receivers {
            events.extend(
                ::glfw::flush_messages(receiver).map(|(_, event)| GlfwEvent { window: *id, event }),
            );
        }
        events
    }

    fn classify(&self, event: &GlfwEvent) -> EventKind {
        match event.event {
            WindowEvent::Close => EventKind::CloseRequested(event.window),
            _ => EventKind::Other,
        }
    }

    fn window_id(&self, window: &GlfwWindow) -> WindowId {
        window.id
    }

    fn framebuffer_size(&self, window: &GlfwWindow) -> (u32, u32) {
        let (width, height) = window.handle.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    fn ticks(&self) -> Duration {
        Duration::from_secs_f64(self.glfw.get_time().max(0.0))
    }
}
