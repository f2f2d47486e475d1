//! The four basic draw calls side by side
//!
//! One quad's worth of vertices is drawn as `draw_arrays`, `draw_elements`,
//! `draw_elements_base_vertex` and `draw_arrays_instanced`, each in its own
//! quadrant. Matrices are kept row-major and uploaded transposed.

use super::{program, GpuError, Lazy};
use crate::palette::{Color, BLUE_GREY};
use glow::HasContext;
use imgui::SliderFlags;
use nalgebra::Matrix4;
use playground_core::prelude::*;

const VERTEX: &str = r#"#version 410 core
layout (location = 0) in vec4 vPos;
layout (location = 1) in vec4 vColor;
out vec4 fColor;
uniform mat4 model;
uniform mat4 projection;
void main()
{
    fColor = vColor;
    gl_Position = projection * (model * vPos);
}
"#;

const FRAGMENT: &str = r#"#version 410 core
in vec4 fColor;
out vec4 color;
void main()
{
    color = fColor;
}
"#;

#[rustfmt::skip]
const POSITIONS: [f32; 16] = [
    -0.4, -0.4, 0.0, 1.0,
     0.4, -0.4, 0.0, 1.0,
    -0.4,  0.4, 0.0, 1.0,
     0.4,  0.4, 0.0, 1.0,
];

#[rustfmt::skip]
const COLORS: [f32; 16] = [
    1.0, 0.0, 0.0, 1.0,
    0.0, 1.0, 0.0, 1.0,
    0.0, 0.0, 1.0, 1.0,
    1.0, 1.0, 0.0, 1.0,
];

const INDICES: [u32; 6] = [0, 1, 2, 1, 2, 3];

/// Row-major orthographic projection for a viewport shifted right by `offset_x`
pub fn ortho_projection(width: f32, height: f32, offset_x: f32, near: f32, far: f32) -> [f32; 16] {
    let aspect = if height > 0.0 && width > offset_x {
        (width - offset_x) / height
    } else {
        1.0
    };
    let far = if far > near { far } else { near + 1.0 };
    let matrix = Matrix4::new_orthographic(-aspect, aspect, -1.0, 1.0, near, far);
    let mut rows = [0.0; 16];
    rows.copy_from_slice(matrix.transpose().as_slice());
    rows
}

/// Row-major translation used to place each draw in its quadrant
pub fn model_matrix(x: f32, y: f32, z: f32) -> [f32; 16] {
    #[rustfmt::skip]
    let model = [
        1.0, 0.0, 0.0, x,
        0.0, 1.0, 0.0, y,
        0.0, 0.0, 1.0, z,
        0.0, 0.0, 0.0, 1.0,
    ];
    model
}

struct Gpu {
    program: glow::Program,
    model: Option<glow::UniformLocation>,
    projection: Option<glow::UniformLocation>,
    positions: glow::Buffer,
    colors: glow::Buffer,
    indices: glow::Buffer,
    vao: glow::VertexArray,
}

impl Gpu {
    unsafe fn new(gl: &glow::Context) -> Result<Self, GpuError> {
        unsafe {
            let program = program(gl, VERTEX, FRAGMENT)?;
            let model = gl.get_uniform_location(program, "model");
            let projection = gl.get_uniform_location(program, "projection");

            let create = |label| gl.create_buffer().map_err(|e| GpuError::Create(label, e));
            let positions = create("position buffer")?;
            let colors = create("colour buffer")?;
            let indices = create("index buffer")?;
            let vao = gl
                .create_vertex_array()
                .map_err(|e| GpuError::Create("vertex array", e))?;

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(positions));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&POSITIONS),
                glow::STATIC_DRAW,
            );
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(colors));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&COLORS),
                glow::STATIC_DRAW,
            );

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(indices));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(&INDICES),
                glow::STATIC_DRAW,
            );
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(positions));
            gl.vertex_attrib_pointer_f32(0, 4, glow::FLOAT, false, 16, 0);
            gl.enable_vertex_attrib_array(0);
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(colors));
            gl.vertex_attrib_pointer_f32(1, 4, glow::FLOAT, false, 0, 0);
            gl.enable_vertex_attrib_array(1);

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            Ok(Self {
                program,
                model,
                projection,
                positions,
                colors,
                indices,
                vao,
            })
        }
    }

    unsafe fn delete(self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.indices);
            gl.delete_buffer(self.colors);
            gl.delete_buffer(self.positions);
            gl.delete_program(self.program);
        }
    }
}

pub struct DrawCommands {
    gpu: Lazy<Gpu>,
    background: Color,
    offset_x: f32,
    base_vertex: i32,
    model_z: f32,
    near: f32,
    far: f32,
    auto_projection: bool,
    projection: [f32; 16],
}

impl DrawCommands {
    pub fn new() -> Self {
        Self {
            gpu: Lazy::Pending,
            background: Color::from_u32(BLUE_GREY),
            offset_x: 0.0,
            base_vertex: 0,
            model_z: -1.0,
            near: 0.001,
            far: 100.0,
            auto_projection: true,
            projection: [0.0; 16],
        }
    }
}

impl Canvas<GlfwPlatform, ImguiBackend> for DrawCommands {
    fn title(&self) -> &str {
        "Draw commands"
    }

    fn build_ui(&mut self, ui: &mut imgui::Ui, _session: &mut PlaygroundSession) {
        let [width, height] = ui.io().display_size;
        let [scale_x, scale_y] = ui.io().display_framebuffer_scale;
        let (fb_width, fb_height) = (width * scale_x, height * scale_y);
        let max_offset = fb_width / 2.0;

        ui.window("settings").build(|| {
            ui.slider("left offset", 0.0, max_offset, &mut self.offset_x);
            ui.slider("base vertex", 0, 1, &mut self.base_vertex);
            ui.slider_config("model z", -10.0, 10.0)
                .display_format("%.3f")
                .build(&mut self.model_z);
            ui.slider_config("near", 0.001, 1.0)
                .display_format("%.3f")
                .flags(SliderFlags::LOGARITHMIC)
                .build(&mut self.near);
            ui.slider_config("far", 1.0, 1000.0)
                .display_format("%.1f")
                .flags(SliderFlags::LOGARITHMIC)
                .build(&mut self.far);
            ui.checkbox("calculate projection automatically", &mut self.auto_projection);

            if self.auto_projection {
                self.projection =
                    ortho_projection(fb_width, fb_height, self.offset_x, self.near, self.far);
            }

            let _disabled = ui.begin_disabled(self.auto_projection);
            for (row, values) in self.projection.chunks_mut(4).enumerate() {
                let label = if row == 0 {
                    "projection##0".to_string()
                } else {
                    format!("##projection {row}")
                };
                ui.slider_config(label, -5.0, 5.0)
                    .display_format("%.5f")
                    .build_array(values);
            }
        });

        self.offset_x = self.offset_x.min(max_offset);
    }

    fn render(&mut self, gl: &glow::Context, viewport: Viewport) {
        let offset = self.offset_x as i32;
        // SAFETY: the session made this window current.
        unsafe {
            gl.viewport(offset, 0, viewport.width as i32 - offset, viewport.height as i32);
        }
        self.background.clear(gl);

        // SAFETY: as above.
        unsafe {
            let Some(gpu) = self.gpu.get_or_init("Draw commands", || Gpu::new(gl)) else {
                return;
            };
            gl.bind_vertex_array(Some(gpu.vao));
            gl.use_program(Some(gpu.program));
            gl.uniform_matrix_4_f32_slice(gpu.projection.as_ref(), true, &self.projection);

            let z = self.model_z;
            gl.uniform_matrix_4_f32_slice(gpu.model.as_ref(), true, &model_matrix(-0.5, 0.5, z));
            gl.draw_arrays(glow::TRIANGLES, 0, 3);

            gl.uniform_matrix_4_f32_slice(gpu.model.as_ref(), true, &model_matrix(0.5, 0.5, z));
            gl.draw_elements(glow::TRIANGLES, 3, glow::UNSIGNED_INT, 0);

            gl.uniform_matrix_4_f32_slice(gpu.model.as_ref(), true, &model_matrix(-0.5, -0.5, z));
            gl.draw_elements_base_vertex(glow::TRIANGLES, 3, glow::UNSIGNED_INT, 0, self.base_vertex);

            gl.uniform_matrix_4_f32_slice(gpu.model.as_ref(), true, &model_matrix(0.5, -0.5, z));
            gl.draw_arrays_instanced(glow::TRIANGLES, 0, 3, 1);

            gl.use_program(None);
            gl.bind_vertex_array(None);
        }
    }

    fn release(&mut self, gl: &glow::Context) {
        if let Some(gpu) = self.gpu.take() {
            // SAFETY: release runs with this window current.
            unsafe { gpu.delete(gl) };
        }
    }
}
