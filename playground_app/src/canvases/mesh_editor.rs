use crate::palette::{Color, BLUE_GREY};
use imgui::MouseButton;
use playground_core::prelude::*;

/// Editing mode receiving clicks the UI did not capture
trait Mode {
    fn name(&self) -> &'static str;

    /// Handle this frame's clicks; returns true if the click was consumed
    fn on_mouse_click(&mut self, pos: [f32; 2], buttons: &[bool; 5]) -> bool;
}

struct SelectionMode;

impl Mode for SelectionMode {
    fn name(&self) -> &'static str {
        "Selection"
    }

    fn on_mouse_click(&mut self, pos: [f32; 2], buttons: &[bool; 5]) -> bool {
        if !buttons[MouseButton::Left as usize] {
            return false;
        }
        log::trace!("selection click at {pos:?}");
        true
    }
}

struct PolygonMode;

impl Mode for PolygonMode {
    fn name(&self) -> &'static str {
        "Polygon"
    }

    fn on_mouse_click(&mut self, pos: [f32; 2], buttons: &[bool; 5]) -> bool {
        if !buttons[MouseButton::Left as usize] {
            return false;
        }
        log::trace!("polygon click at {pos:?}");
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModeTag {
    Selection,
    Polygon,
}

impl ModeTag {
    const ALL: [Self; 2] = [Self::Selection, Self::Polygon];
}

pub struct MeshEditor {
    background: Color,
    active: ModeTag,
    modes: [Box<dyn Mode>; 2],
}

impl MeshEditor {
    pub fn new() -> Self {
        Self {
            background: Color::from_u32(BLUE_GREY),
            active: ModeTag::Selection,
            modes: [Box::new(SelectionMode), Box::new(PolygonMode)],
        }
    }

    fn active_mode(&mut self) -> &mut dyn Mode {
        self.modes[self.active as usize].as_mut()
    }
}

impl Canvas<GlfwPlatform, ImguiBackend> for MeshEditor {
    fn title(&self) -> &str {
        "Mesh editor"
    }

    fn build_ui(&mut self, ui: &mut imgui::Ui, _session: &mut PlaygroundSession) {
        if let Some(_bar) = ui.begin_main_menu_bar() {
            for tag in ModeTag::ALL {
                let label = self.modes[tag as usize].name();
                ui.radio_button(label, &mut self.active, tag);
            }
        }

        let io = ui.io();
        if io.want_capture_mouse {
            return;
        }
        let pos = io.mouse_pos;
        let buttons = MouseButton::VARIANTS.map(|button| ui.is_mouse_clicked(button));
        self.active_mode().on_mouse_click(pos, &buttons);
    }

    fn render(&mut self, gl: &glow::Context, viewport: Viewport) {
        use glow::HasContext;
        // SAFETY: the session made this window current.
        unsafe {
            gl.viewport(0, 0, viewport.width as i32, viewport.height as i32);
        }
        self.background.clear(gl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEFT: [bool; 5] = [true, false, false, false, false];
    const RIGHT: [bool; 5] = [false, true, false, false, false];

    #[test]
    fn test_modes_consume_left_clicks_only() {
        let mut modes: [Box<dyn Mode>; 2] = [Box::new(SelectionMode), Box::new(PolygonMode)];
        for mode in &mut modes {
            assert!(mode.on_mouse_click([10.0, 20.0], &LEFT));
            assert!(!mode.on_mouse_click([10.0, 20.0], &RIGHT));
            assert!(!mode.on_mouse_click([10.0, 20.0], &[false; 5]));
        }
    }

    #[test]
    fn test_tags_index_matching_modes() {
        let mut editor = MeshEditor::new();
        for tag in ModeTag::ALL {
            editor.active = tag;
            assert_eq!(editor.active_mode().name(), format!("{tag:?}"));
        }
    }
}
