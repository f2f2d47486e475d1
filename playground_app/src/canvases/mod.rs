//! Demo canvases
//!
//! Canvases create their GL objects lazily in `render`, where their window's
//! context is current, and delete them in `release`.

mod draw_commands;
mod dsa_buffers;
mod gallery;
mod hello_triangle;
mod mesh_editor;
mod texture_compression;

pub use draw_commands::DrawCommands;
pub use dsa_buffers::DsaBuffers;
pub use gallery::Gallery;
pub use hello_triangle::HelloTriangle;
pub use mesh_editor::MeshEditor;
pub use texture_compression::TextureCompression;

use playground_core::gl::{create_program, ShaderError};
use playground_core::prelude::*;

/// Canvas as hosted by the desktop session
pub type BoxedCanvas = Box<dyn Canvas<GlfwPlatform, ImguiBackend>>;

/// Constructor listed in the gallery
pub type CanvasFactory = fn() -> BoxedCanvas;

/// Every demo the gallery can open, in display order
pub fn catalog() -> Vec<(&'static str, CanvasFactory)> {
    let entries: [(&'static str, CanvasFactory); 5] = [
        ("Hello triangle", || Box::new(HelloTriangle::new())),
        ("Draw commands", || Box::new(DrawCommands::new())),
        ("DSA buffers", || Box::new(DsaBuffers::new())),
        ("Mesh editor", || Box::new(MeshEditor::new())),
        ("Texture compression", || Box::new(TextureCompression::new())),
    ];
    entries.to_vec()
}

/// GL state that is built on first render and may fail once
pub(crate) enum Lazy<T> {
    Pending,
    Ready(T),
    Failed,
}

impl<T> Lazy<T> {
    /// Build on first call; a failure is logged once and never retried
    pub(crate) fn get_or_init<E: std::fmt::Display>(
        &mut self,
        label: &str,
        init: impl FnOnce() -> Result<T, E>,
    ) -> Option<&mut T> {
        if matches!(self, Self::Pending) {
            *self = match init() {
                Ok(value) => Self::Ready(value),
                Err(e) => {
                    log::error!("{label}: {e}");
                    Self::Failed
                }
            };
        }
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending | Self::Failed => None,
        }
    }

    pub(crate) fn take(&mut self) -> Option<T> {
        match std::mem::replace(self, Self::Pending) {
            Self::Ready(value) => Some(value),
            Self::Pending | Self::Failed => None,
        }
    }
}

/// Failure while creating canvas GL objects
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("Failed to create {0}: {1}")]
    Create(&'static str, String),
}

/// Compile a program for a canvas
///
/// # Safety
/// The canvas window's context must be current.
pub(crate) unsafe fn program(
    gl: &glow::Context,
    vertex: &str,
    fragment: &str,
) -> Result<glow::Program, GpuError> {
    unsafe { Ok(create_program(gl, vertex, fragment)?) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_titles_are_unique() {
        let titles: HashSet<_> = catalog().iter().map(|(title, _)| *title).collect();
        assert_eq!(titles.len(), catalog().len());
    }

    #[test]
    fn test_lazy_failure_is_not_retried() {
        let mut lazy: Lazy<u32> = Lazy::Pending;
        assert!(lazy.get_or_init("test", || Err("boom")).is_none());

        let mut called = false;
        assert!(lazy
            .get_or_init("test", || {
                called = true;
                Ok::<_, &str>(1)
            })
            .is_none());
        assert!(!called);
    }

    #[test]
    fn test_lazy_take_resets() {
        let mut lazy: Lazy<u32> = Lazy::Pending;
        assert_eq!(lazy.get_or_init("test", || Ok::<_, &str>(7)).copied(), Some(7));
        assert_eq!(lazy.take(), Some(7));
        assert!(matches!(lazy, Lazy::Pending));
    }
}
