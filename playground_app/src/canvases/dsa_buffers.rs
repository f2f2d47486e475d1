//! Bind-to-edit versus direct state access buffer setup

use super::{program, GpuError, Lazy};
use crate::palette::{Color, BLUE_GREY};
use glow::HasContext;
use playground_core::prelude::*;

const VERTEX: &str = r#"#version 450 core
layout (location = 0) in vec2 vPos;
layout (location = 1) in vec3 vColor;
out vec3 fColor;
void main()
{
    fColor = vColor;
    gl_Position = vec4(vPos, 0.0, 1.0);
}
"#;

const FRAGMENT: &str = r#"#version 450 core
in vec3 fColor;
out vec4 color;
void main()
{
    color = vec4(fColor, 1.0);
}
"#;

// Interleaved xy + rgb
#[rustfmt::skip]
const VERTICES: [f32; 20] = [
    -0.4, -0.4, 1.0, 0.0, 0.0,
     0.4, -0.4, 0.0, 1.0, 0.0,
    -0.4,  0.4, 0.0, 0.0, 1.0,
     0.4,  0.4, 1.0, 1.0, 0.0,
];

const INDICES: [u8; 6] = [0, 1, 2, 1, 2, 3];

const STRIDE: i32 = 5 * std::mem::size_of::<f32>() as i32;
const COLOR_OFFSET: i32 = 2 * std::mem::size_of::<f32>() as i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Request {
    Create { dsa: bool },
    Destroy,
}

struct Buffers {
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    vao: glow::VertexArray,
}

impl Buffers {
    unsafe fn create_dsa(gl: &glow::Context) -> Result<Self, GpuError> {
        unsafe {
            let vbo = gl
                .create_named_buffer()
                .map_err(|e| GpuError::Create("vertex buffer", e))?;
            gl.named_buffer_data_u8_slice(vbo, bytemuck::cast_slice(&VERTICES), glow::STATIC_DRAW);

            let ebo = gl
                .create_named_buffer()
                .map_err(|e| GpuError::Create("index buffer", e))?;
            gl.named_buffer_data_u8_slice(ebo, &INDICES, glow::STATIC_DRAW);

            let vao = gl
                .create_named_vertex_array()
                .map_err(|e| GpuError::Create("vertex array", e))?;
            gl.vertex_array_vertex_buffer(vao, 0, Some(vbo), 0, STRIDE);
            gl.vertex_array_element_buffer(vao, Some(ebo));

            gl.enable_vertex_array_attrib(vao, 0);
            gl.enable_vertex_array_attrib(vao, 1);
            gl.vertex_array_attrib_format_f32(vao, 0, 2, glow::FLOAT, false, 0);
            gl.vertex_array_attrib_format_f32(vao, 1, 3, glow::FLOAT, false, COLOR_OFFSET as u32);
            gl.vertex_array_attrib_binding_f32(vao, 0, 0);
            gl.vertex_array_attrib_binding_f32(vao, 1, 0);

            Ok(Self { vbo, ebo, vao })
        }
    }

    unsafe fn create_bound(gl: &glow::Context) -> Result<Self, GpuError> {
        unsafe {
            let vbo = gl
                .create_buffer()
                .map_err(|e| GpuError::Create("vertex buffer", e))?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&VERTICES),
                glow::STATIC_DRAW,
            );

            let ebo = gl
                .create_buffer()
                .map_err(|e| GpuError::Create("index buffer", e))?;
            let vao = gl
                .create_vertex_array()
                .map_err(|e| GpuError::Create("vertex array", e))?;

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, &INDICES, glow::STATIC_DRAW);
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, STRIDE, 0);
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, STRIDE, COLOR_OFFSET);
            gl.enable_vertex_attrib_array(1);

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            Ok(Self { vbo, ebo, vao })
        }
    }

    unsafe fn delete(self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.ebo);
            gl.delete_buffer(self.vbo);
        }
    }
}

pub struct DsaBuffers {
    program: Lazy<glow::Program>,
    buffers: Option<Buffers>,
    use_dsa: bool,
    request: Option<Request>,
    background: Color,
}

impl DsaBuffers {
    pub fn new() -> Self {
        Self {
            program: Lazy::Pending,
            buffers: None,
            use_dsa: true,
            request: None,
            background: Color::from_u32(BLUE_GREY),
        }
    }

    unsafe fn apply(&mut self, gl: &glow::Context, request: Request) {
        unsafe {
            if let Some(buffers) = self.buffers.take() {
                buffers.delete(gl);
            }
            let Request::Create { dsa } = request else {
                log::debug!("Buffers destroyed");
                return;
            };
            let created = if dsa {
                Buffers::create_dsa(gl)
            } else {
                Buffers::create_bound(gl)
            };
            match created {
                Ok(buffers) => {
                    log::debug!("Buffers created ({})", if dsa { "DSA" } else { "bind-to-edit" });
                    self.buffers = Some(buffers);
                }
                Err(e) => log::error!("Failed to create buffers: {e}"),
            }
        }
    }
}

impl Canvas<GlfwPlatform, ImguiBackend> for DsaBuffers {
    fn title(&self) -> &str {
        "DSA buffers"
    }

    fn build_ui(&mut self, ui: &mut imgui::Ui, _session: &mut PlaygroundSession) {
        ui.window("settings").build(|| {
            if ui.button("Create buffers") {
                self.request = Some(Request::Create { dsa: self.use_dsa });
            }
            ui.same_line();
            ui.checkbox("Use DSA", &mut self.use_dsa);
            if ui.button("Destroy buffers") {
                self.request = Some(Request::Destroy);
            }
        });
    }

    fn render(&mut self, gl: &glow::Context, viewport: Viewport) {
        // SAFETY: the session made this window current.
        unsafe {
            gl.viewport(0, 0, viewport.width as i32, viewport.height as i32);
            self.background.clear(gl);

            if let Some(request) = self.request.take() {
                self.apply(gl, request);
            }

            let Some(buffers) = self.buffers.as_ref() else {
                return;
            };
            let Some(&mut shader) =
                self.program.get_or_init("DSA buffers", || program(gl, VERTEX, FRAGMENT))
            else {
                return;
            };
            gl.bind_vertex_array(Some(buffers.vao));
            gl.use_program(Some(shader));
            gl.draw_elements(glow::TRIANGLES, INDICES.len() as i32, glow::UNSIGNED_BYTE, 0);
            gl.use_program(None);
            gl.bind_vertex_array(None);
        }
    }

    fn release(&mut self, gl: &glow::Context) {
        // SAFETY: release runs with this window current.
        unsafe {
            if let Some(buffers) = self.buffers.take() {
                buffers.delete(gl);
            }
            if let Some(program) = self.program.take() {
                gl.delete_program(program);
            }
        }
    }
}
