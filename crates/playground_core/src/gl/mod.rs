//! OpenGL helpers shared by the UI renderer and canvases

use glow::HasContext;
use thiserror::Error;

/// Shader program build errors
#[derive(Error, Debug)]
pub enum ShaderError {
    /// Object allocation failed
    #[error("Failed to create {0}: {1}")]
    Create(&'static str, String),

    /// A stage failed to compile
    #[error("Failed to compile {stage}: {log}")]
    Compile {
        /// Stage description
        stage: &'static str,
        /// Driver info log
        log: String,
    },

    /// Linking failed
    #[error("Failed to link shader program: {0}")]
    Link(String),
}

unsafe fn compile_stage(
    gl: &glow::Context,
    kind: u32,
    source: &str,
    stage: &'static str,
) -> Result<glow::Shader, ShaderError> {
    unsafe {
        let shader = gl
            .create_shader(kind)
            .map_err(|e| ShaderError::Create(stage, e))?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if gl.get_shader_compile_status(shader) {
            Ok(shader)
        } else {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            Err(ShaderError::Compile { stage, log })
        }
    }
}

/// Compile and link a vertex + fragment program
///
/// # Safety
/// A context sharing objects with `gl` must be current.
pub unsafe fn create_program(
    gl: &glow::Context,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<glow::Program, ShaderError> {
    unsafe {
        let vertex = compile_stage(gl, glow::VERTEX_SHADER, vertex_source, "vertex shader")?;
        let fragment =
            match compile_stage(gl, glow::FRAGMENT_SHADER, fragment_source, "fragment shader") {
                Ok(fragment) => fragment,
                Err(e) => {
                    gl.delete_shader(vertex);
                    return Err(e);
                }
            };

        let program = match gl.create_program() {
            Ok(program) => program,
            Err(e) => {
                gl.delete_shader(vertex);
                gl.delete_shader(fragment);
                return Err(ShaderError::Create("shader program", e));
            }
        };
        gl.attach_shader(program, vertex);
        gl.attach_shader(program, fragment);
        gl.link_program(program);
        let linked = gl.get_program_link_status(program);

        gl.detach_shader(program, vertex);
        gl.detach_shader(program, fragment);
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);

        if linked {
            Ok(program)
        } else {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            Err(ShaderError::Link(log))
        }
    }
}

/// Log every pending GL error, tagged with the call site label
///
/// Returns true if any error was pending.
pub fn drain_errors(gl: &glow::Context, label: &str) -> bool {
    let mut any = false;
    loop {
        // SAFETY: glGetError has no preconditions beyond a current context.
        let error = unsafe { gl.get_error() };
        if error == glow::NO_ERROR {
            return any;
        }
        any = true;
        log::error!("GL error 0x{error:04X} after '{label}'");
    }
}
