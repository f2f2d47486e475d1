//! imgui draw-data renderer on glow
//!
//! Program, buffers and font texture live in the shared context and are
//! created once. Vertex arrays are not shared between contexts, so one is
//! created per submit in whichever window is current.

use super::UiError;
use crate::gl;
use ::imgui::{DrawCmd, DrawCmdParams, DrawData, DrawIdx, DrawVert, FontAtlas, TextureId};
use glow::{HasContext, PixelUnpackData};
use std::mem::size_of;

const VERTEX_SHADER: &str = r#"#version 330 core
layout (location = 0) in vec2 Position;
layout (location = 1) in vec2 UV;
layout (location = 2) in vec4 Color;
uniform mat4 ProjMtx;
out vec2 Frag_UV;
out vec4 Frag_Color;
void main()
{
    Frag_UV = UV;
    Frag_Color = Color;
    gl_Position = ProjMtx * vec4(Position.xy, 0.0, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 330 core
in vec2 Frag_UV;
in vec4 Frag_Color;
uniform sampler2D Texture;
layout (location = 0) out vec4 Out_Color;
void main()
{
    Out_Color = Frag_Color * texture(Texture, Frag_UV.st);
}
"#;

/// Slot of the font atlas in `UiRenderer::textures`
const FONT_TEXTURE: usize = 0;

// pos and uv are two f32 each, col is four u8; 20 bytes leaves no padding
const _: () = assert!(size_of::<DrawVert>() == 20);

fn vertex_bytes(vertices: &[DrawVert]) -> &[u8] {
    // SAFETY: `DrawVert` is `repr(C)` without padding (asserted above), so
    // every byte of the slice is initialized.
    unsafe {
        std::slice::from_raw_parts(vertices.as_ptr().cast::<u8>(), std::mem::size_of_val(vertices))
    }
}

fn index_bytes(indices: &[DrawIdx]) -> &[u8] {
    bytemuck::cast_slice(indices)
}

/// Run `release` when `result` is an error, then pass the result on
fn release_on_err<T, E>(result: Result<T, E>, release: impl FnOnce()) -> Result<T, E> {
    if result.is_err() {
        release();
    }
    result
}

unsafe fn create_font_texture(
    gl: &glow::Context,
    atlas: &mut FontAtlas,
) -> Result<glow::Texture, UiError> {
    let texture = atlas.build_rgba32_texture();
    unsafe {
        let handle = gl.create_texture().map_err(UiError::Renderer)?;
        gl.bind_texture(glow::TEXTURE_2D, Some(handle));
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        gl.pixel_store_i32(glow::UNPACK_ROW_LENGTH, 0);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA8 as i32,
            texture.width as i32,
            texture.height as i32,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            PixelUnpackData::Slice(Some(texture.data)),
        );
        gl.bind_texture(glow::TEXTURE_2D, None);
        log::debug!("Uploaded font atlas {}x{}", texture.width, texture.height);
        Ok(handle)
    }
}

/// Orthographic projection covering the draw data's display rectangle
pub(crate) fn projection(draw_data: &DrawData) -> [f32; 16] {
    let [l, t] = draw_data.display_pos;
    let r = l + draw_data.display_size[0];
    let b = t + draw_data.display_size[1];
    [
        2.0 / (r - l), 0.0, 0.0, 0.0,
        0.0, 2.0 / (t - b), 0.0, 0.0,
        0.0, 0.0, -1.0, 0.0,
        (r + l) / (l - r), (t + b) / (b - t), 0.0, 1.0,
    ]
}

/// Shared UI renderer
pub(crate) struct UiRenderer {
    program: glow::Program,
    texture_uniform: glow::UniformLocation,
    projection_uniform: glow::UniformLocation,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    textures: Vec<glow::Texture>,
}

impl UiRenderer {
    /// Build the program and upload the font atlas
    pub(crate) fn new(gl: &glow::Context, atlas: &mut FontAtlas) -> Result<Self, UiError> {
        // SAFETY: the shared context is current during backend init.
        unsafe {
            let program = gl::create_program(gl, VERTEX_SHADER, FRAGMENT_SHADER)?;
            let uniforms = match (
                gl.get_uniform_location(program, "Texture"),
                gl.get_uniform_location(program, "ProjMtx"),
            ) {
                (Some(texture), Some(projection)) => Ok((texture, projection)),
                _ => Err(UiError::Renderer("missing UI shader uniforms".to_string())),
            };
            let (texture_uniform, projection_uniform) =
                release_on_err(uniforms, || gl.delete_program(program))?;

            let vbo = release_on_err(gl.create_buffer().map_err(UiError::Renderer), || {
                gl.delete_program(program);
            })?;
            let ebo = release_on_err(gl.create_buffer().map_err(UiError::Renderer), || {
                gl.delete_buffer(vbo);
                gl.delete_program(program);
            })?;
            let font = release_on_err(create_font_texture(gl, atlas), || {
                gl.delete_buffer(ebo);
                gl.delete_buffer(vbo);
                gl.delete_program(program);
            })?;
            atlas.tex_id = TextureId::new(FONT_TEXTURE);

            Ok(Self {
                program,
                texture_uniform,
                projection_uniform,
                vbo,
                ebo,
                textures: vec![font],
            })
        }
    }

    /// Replace the font texture with a fresh upload of a rebuilt atlas
    ///
    /// The old texture survives if the upload fails.
    pub(crate) fn reload_font_atlas(
        &mut self,
        gl: &glow::Context,
        atlas: &mut FontAtlas,
    ) -> Result<(), UiError> {
        // SAFETY: the session binds the shared context before a rescale.
        unsafe {
            let font = create_font_texture(gl, atlas)?;
            match self.textures.get_mut(FONT_TEXTURE) {
                Some(slot) => gl.delete_texture(std::mem::replace(slot, font)),
                None => self.textures.push(font),
            }
        }
        atlas.tex_id = TextureId::new(FONT_TEXTURE);
        Ok(())
    }

    unsafe fn setup_render_state(
        &self,
        gl: &glow::Context,
        draw_data: &DrawData,
        fb_width: i32,
        fb_height: i32,
        vao: glow::VertexArray,
    ) {
        unsafe {
            gl.enable(glow::BLEND);
            gl.blend_equation(glow::FUNC_ADD);
            gl.blend_func_separate(
                glow::SRC_ALPHA,
                glow::ONE_MINUS_SRC_ALPHA,
                glow::ONE,
                glow::ONE_MINUS_SRC_ALPHA,
            );
            gl.disable(glow::CULL_FACE);
            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::STENCIL_TEST);
            gl.enable(glow::SCISSOR_TEST);

            gl.viewport(0, 0, fb_width, fb_height);
            gl.use_program(Some(self.program));
            gl.uniform_1_i32(Some(&self.texture_uniform), 0);
            gl.uniform_matrix_4_f32_slice(
                Some(&self.projection_uniform),
                false,
                &projection(draw_data),
            );

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.ebo));

            let stride = size_of::<DrawVert>() as i32;
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, stride, 8);
            gl.enable_vertex_attrib_array(2);
            gl.vertex_attrib_pointer_f32(2, 4, glow::UNSIGNED_BYTE, true, stride, 16);
        }
    }

    /// Draw one frame of UI into the current surface
    pub(crate) fn render(&self, gl: &glow::Context, draw_data: &DrawData) -> Result<(), UiError> {
        let [scale_x, scale_y] = draw_data.framebuffer_scale;
        let fb_width = (draw_data.display_size[0] * scale_x) as i32;
        let fb_height = (draw_data.display_size[1] * scale_y) as i32;
        if fb_width <= 0 || fb_height <= 0 {
            return Ok(());
        }

        let clip_offset = draw_data.display_pos;

        // SAFETY: the session made this window's context current before submit.
        unsafe {
            let vao = gl.create_vertex_array().map_err(UiError::Renderer)?;
            self.setup_render_state(gl, draw_data, fb_width, fb_height, vao);

            for draw_list in draw_data.draw_lists() {
                gl.buffer_data_u8_slice(
                    glow::ARRAY_BUFFER,
                    vertex_bytes(draw_list.vtx_buffer()),
                    glow::STREAM_DRAW,
                );
                gl.buffer_data_u8_slice(
                    glow::ELEMENT_ARRAY_BUFFER,
                    index_bytes(draw_list.idx_buffer()),
                    glow::STREAM_DRAW,
                );

                for command in draw_list.commands() {
                    match command {
                        DrawCmd::Elements {
                            count,
                            cmd_params:
                                DrawCmdParams {
                                    clip_rect,
                                    texture_id,
                                    vtx_offset,
                                    idx_offset,
                                },
                        } => {
                            let min_x = (clip_rect[0] - clip_offset[0]) * scale_x;
                            let min_y = (clip_rect[1] - clip_offset[1]) * scale_y;
                            let max_x = (clip_rect[2] - clip_offset[0]) * scale_x;
                            let max_y = (clip_rect[3] - clip_offset[1]) * scale_y;
                            if max_x <= min_x || max_y <= min_y {
                                continue;
                            }

                            let Some(texture) = self.textures.get(texture_id.id()) else {
                                log::warn!("Skipping UI draw with unknown texture {}", texture_id.id());
                                continue;
                            };

                            gl.scissor(
                                min_x as i32,
                                fb_height - max_y as i32,
                                (max_x - min_x) as i32,
                                (max_y - min_y) as i32,
                            );
                            gl.active_texture(glow::TEXTURE0);
                            gl.bind_texture(glow::TEXTURE_2D, Some(*texture));
                            gl.draw_elements_base_vertex(
                                glow::TRIANGLES,
                                count as i32,
                                glow::UNSIGNED_SHORT,
                                (idx_offset * size_of::<DrawIdx>()) as i32,
                                vtx_offset as i32,
                            );
                        }
                        DrawCmd::ResetRenderState => {
                            self.setup_render_state(gl, draw_data, fb_width, fb_height, vao);
                        }
                        DrawCmd::RawCallback { .. } => {
                            log::trace!("Ignoring raw UI draw callback");
                        }
                    }
                }
            }

            gl.bind_vertex_array(None);
            gl.delete_vertex_array(vao);
            gl.use_program(None);
            gl.disable(glow::SCISSOR_TEST);
        }

        if gl::drain_errors(gl, "UI render") {
            return Err(UiError::Renderer("GL error during UI render".to_string()));
        }
        Ok(())
    }

    /// Delete GPU objects; the shared context must be current
    pub(crate) fn destroy(self, gl: &glow::Context) {
        // SAFETY: called at shutdown with the shared context current.
        unsafe {
            for texture in self.textures {
                gl.delete_texture(texture);
            }
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
            gl.delete_program(self.program);
        }
    }
}
