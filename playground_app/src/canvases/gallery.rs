//! Gallery: the table every other canvas is opened from

use super::{catalog, CanvasFactory};
use crate::palette::Color;
use imgui::{Condition, StyleColor, TableColumnFlags, TableColumnSetup, TableFlags, WindowFlags};
use playground_core::prelude::*;

struct Entry {
    title: &'static str,
    factory: CanvasFactory,
    id: CanvasId,
}

pub struct Gallery {
    entries: Vec<Entry>,
    background: Color,
    /// Slider value; applied only on request
    scale: Option<f32>,
}

impl Gallery {
    pub fn new() -> Self {
        let entries = catalog()
            .into_iter()
            .map(|(title, factory)| Entry {
                title,
                factory,
                id: CanvasId::default(),
            })
            .collect();
        Self {
            entries,
            background: Color::default(),
            scale: None,
        }
    }
}

fn toggle(entry: &mut Entry, shown: bool, session: &mut PlaygroundSession) {
    if shown {
        session.close_window(entry.id);
        entry.id = CanvasId::default();
        return;
    }
    match session.open_window((entry.factory)()) {
        Ok(id) => entry.id = id,
        Err(e) => log::error!("Could not open '{}': {e}", entry.title),
    }
}

impl Canvas<GlfwPlatform, ImguiBackend> for Gallery {
    fn title(&self) -> &str {
        "Graphics playground"
    }

    fn build_ui(&mut self, ui: &mut imgui::Ui, session: &mut PlaygroundSession) {
        self.background = Color::from_array(ui.style_color(StyleColor::WindowBg));

        let table_flags = TableFlags::BORDERS_INNER
            | TableFlags::SCROLL_Y
            | TableFlags::ROW_BG
            | TableFlags::RESIZABLE
            | TableFlags::SIZING_FIXED_FIT;

        ui.window("Main Canvas")
            .position([0.0, 0.0], Condition::Always)
            .size(ui.io().display_size, Condition::Always)
            .flags(WindowFlags::NO_DECORATION | WindowFlags::NO_BRING_TO_FRONT_ON_FOCUS)
            .build(|| {
                let Some(_table) = ui.begin_table_with_flags("Examples##table", 3, table_flags)
                else {
                    return;
                };
                ui.table_setup_column_with(TableColumnSetup {
                    flags: TableColumnFlags::NO_RESIZE,
                    ..TableColumnSetup::new("№")
                });
                ui.table_setup_column_with(TableColumnSetup {
                    flags: TableColumnFlags::WIDTH_STRETCH,
                    ..TableColumnSetup::new("Title")
                });
                ui.table_setup_column_with(TableColumnSetup {
                    flags: TableColumnFlags::NO_RESIZE,
                    ..TableColumnSetup::new("Open")
                });

                for (index, entry) in self.entries.iter_mut().enumerate() {
                    let _row = ui.push_id_usize(index);
                    ui.table_next_column();
                    ui.text(index.to_string());
                    ui.table_next_column();
                    ui.text(entry.title);
                    ui.table_next_column();

                    let shown = session.is_opened(entry.id);
                    if ui.button(if shown { "Close" } else { "Open " }) {
                        toggle(entry, shown, session);
                    }
                }
            });

        let scale = self.scale.get_or_insert_with(|| session.ui_scale());
        ui.window("DPI scale")
            .always_auto_resize(true)
            .build(|| {
                ui.slider("##dpi", 0.5, 3.0, scale);
                ui.same_line();
                if ui.button("Apply") {
                    session.request_ui_scale(*scale);
                }
            });
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
