//! # Session Configuration
//!
//! Settings for the window/context lifecycle, frame pacing and the per-window
//! UI contexts. Everything has a default so an absent config file is fine.

use super::{Config, ConfigError};
use crate::foundation::time::DEFAULT_FRAME_INTERVAL;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

bitflags! {
    /// Creation flags for platform windows
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct WindowFlags: u32 {
        /// User can resize the window
        const RESIZABLE = 1 << 0;
        /// Window starts hidden
        const HIDDEN = 1 << 1;
        /// Request a framebuffer at native pixel density
        const HIGH_PIXEL_DENSITY = 1 << 2;
    }
}

/// Window creation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in screen coordinates
    pub width: u32,
    /// Window height in screen coordinates
    pub height: u32,
    /// Creation flags
    pub flags: WindowFlags,
}

impl WindowConfig {
    /// Create a window configuration with default flags
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            flags: WindowFlags::RESIZABLE | WindowFlags::HIGH_PIXEL_DENSITY,
        }
    }

    /// Replace the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Replace the creation flags
    pub fn with_flags(mut self, flags: WindowFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new("Graphics playground", 1280, 720)
    }
}

/// Graphics context parameters handed to the platform at initialization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Requested OpenGL major version
    pub context_major: u32,
    /// Requested OpenGL minor version
    pub context_minor: u32,
    /// Depth buffer bits
    pub depth_bits: u32,
    /// Stencil buffer bits
    pub stencil_bits: u32,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            context_major: 4,
            context_minor: 6,
            depth_bits: 24,
            stencil_bits: 8,
        }
    }
}

/// Per-window UI context parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Base font size in pixels before scaling
    pub font_size: f32,
    /// Scale applied to style sizes and the font
    pub scale: f32,
    /// Directory for per-window layout files; `None` disables persistence
    pub settings_dir: Option<PathBuf>,
}

impl UiConfig {
    /// Layout file for a window with the given title
    pub fn settings_path(&self, title: &str) -> Option<PathBuf> {
        let dir = self.settings_dir.as_deref()?;
        let stem: String = title
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        Some(dir.join(format!("{stem}.ini")))
    }

    /// Font size after scaling
    pub fn scaled_font_size(&self) -> f32 {
        self.font_size * self.scale
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            font_size: 13.0,
            scale: 1.25,
            settings_dir: None,
        }
    }
}

/// Top-level session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Defaults for canvas windows (the title is replaced by the canvas title)
    pub window: WindowConfig,
    /// Graphics context parameters
    pub platform: PlatformConfig,
    /// UI context parameters
    pub ui: UiConfig,
    /// Render cadence in milliseconds
    pub frame_interval_ms: u64,
    /// Swap interval for the shared context (1 = vsync)
    pub swap_interval: u32,
    /// Stop the loop once no window is open or about to open
    pub quit_when_last_window_closes: bool,
}

impl SessionConfig {
    /// Render cadence as a duration
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Parameters for the hidden window holding the shared context
    pub fn backing_window(&self) -> WindowConfig {
        WindowConfig::new(self.window.title.clone(), 1, 1).with_flags(WindowFlags::HIDDEN)
    }

    /// Check that values are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid("frame interval must be at least 1 ms".to_string()));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} is empty",
                self.window.width, self.window.height
            )));
        }
        let usable = |value: f32| value.is_finite() && value > 0.0;
        if !usable(self.ui.scale) || !usable(self.ui.font_size) {
            return Err(ConfigError::Invalid(format!(
                "UI scale {} and font size {} must be finite and positive",
                self.ui.scale, self.ui.font_size
            )));
        }
        Ok(())
    }

    /// Load and validate a config file, using defaults when it is absent
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::load_or_default(path)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            platform: PlatformConfig::default(),
            ui: UiConfig::default(),
            frame_interval_ms: DEFAULT_FRAME_INTERVAL.as_millis() as u64,
            swap_interval: 1,
            quit_when_last_window_closes: true,
        }
    }
}

impl Config for SessionConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_interval(), Duration::from_millis(16));
        assert!(config.window.flags.contains(WindowFlags::RESIZABLE));
    }

    #[test]
    fn test_backing_window_is_hidden() {
        let config = SessionConfig::default();
        assert!(config.backing_window().flags.contains(WindowFlags::HIDDEN));
    }

    #[test]
    fn test_non_finite_ui_sizes_rejected() {
        for (scale, font_size) in [(f32::NAN, 13.0), (1.0, f32::NAN), (f32::INFINITY, 13.0), (0.0, 13.0)] {
            let mut config = SessionConfig::default();
            config.ui.scale = scale;
            config.ui.font_size = font_size;
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "scale {scale} font size {font_size} accepted"
            );
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = SessionConfig {
            frame_interval_ms: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SessionConfig = toml::from_str(
            "frame_interval_ms = 33\n[ui]\nscale = 2.0\n",
        )
        .unwrap();
        assert_eq!(config.frame_interval_ms, 33);
        approx::assert_relative_eq!(config.ui.scale, 2.0);
        approx::assert_relative_eq!(config.ui.font_size, 13.0);
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn test_settings_path_disabled_by_default() {
        let ui = UiConfig::default();
        assert!(ui.settings_path("Hello triangle").is_none());
    }

    #[test]
    fn test_settings_path_sanitizes_title() {
        let ui = UiConfig {
            settings_dir: Some(PathBuf::from("layouts")),
            ..UiConfig::default()
        };
        assert_eq!(
            ui.settings_path("Hello triangle #1"),
            Some(PathBuf::from("layouts").join("hello_triangle__1.ini"))
        );
    }
}
