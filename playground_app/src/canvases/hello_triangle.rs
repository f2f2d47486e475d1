use super::{program, GpuError, Lazy};
use glow::HasContext;
use playground_core::prelude::*;

const VERTEX: &str = r#"#version 410 core
void main()
{
    vec2 points[3] = vec2[3](
        vec2(-0.7, -0.7),
        vec2(0.0, 0.7),
        vec2(0.7, -0.7)
    );
    gl_Position = vec4(points[gl_VertexID], 0.0, 1.0);
}
"#;

const FRAGMENT: &str = r#"#version 410 core
out vec4 color;
void main()
{
    color = vec4(1.0, 0.0, 0.0, 1.0);
}
"#;

struct Gpu {
    program: glow::Program,
    // Core profile refuses to draw without a bound vertex array
    vao: glow::VertexArray,
}

impl Gpu {
    unsafe fn new(gl: &glow::Context) -> Result<Self, GpuError> {
        unsafe {
            let program = program(gl, VERTEX, FRAGMENT)?;
            let vao = gl
                .create_vertex_array()
                .map_err(|e| GpuError::Create("vertex array", e))?;
            Ok(Self { program, vao })
        }
    }

    unsafe fn delete(self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_program(self.program);
        }
    }
}

pub struct HelloTriangle {
    gpu: Lazy<Gpu>,
    value: i32,
}

impl HelloTriangle {
    pub fn new() -> Self {
        Self {
            gpu: Lazy::Pending,
            value: 0,
        }
    }
}

impl Canvas<GlfwPlatform, ImguiBackend> for HelloTriangle {
    fn title(&self) -> &str {
        "Hello triangle"
    }

    fn build_ui(&mut self, ui: &mut imgui::Ui, _session: &mut PlaygroundSession) {
        ui.window("Hello window").build(|| {
            ui.text("hello pretty ui");
            imgui::Drag::new("int").build(ui, &mut self.value);
        });
    }

    fn render(&mut self, gl: &glow::Context, viewport: Viewport) {
        // SAFETY: the session made this window current.
        unsafe {
            gl.viewport(0, 0, viewport.width as i32, viewport.height as i32);
            gl.clear_color(0.7, 0.2, 0.5, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT);

            let Some(gpu) = self.gpu.get_or_init("Hello triangle", || Gpu::new(gl)) else {
                return;
            };
            gl.use_program(Some(gpu.program));
            gl.bind_vertex_array(Some(gpu.vao));
            gl.draw_arrays(glow::TRIANGLES, 0, 3);
            gl.bind_vertex_array(None);
            gl.use_program(None);
        }
    }

    fn release(&mut self, gl: &glow::Context) {
        if let Some(gpu) = self.gpu.take() {
            // SAFETY: release runs with this window current.
            unsafe { gpu.delete(gl) };
        }
    }
}
