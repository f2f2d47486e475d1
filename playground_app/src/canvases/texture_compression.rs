//! Side-by-side comparison of driver texture compression formats
//!
//! The same image is uploaded twice, each copy with its own internal format,
//! and drawn as one quad split at a movable edge.

use super::{program, GpuError, Lazy};
use crate::palette::{next_color, Color};
use glow::{HasContext, PixelUnpackData};
use image::RgbaImage;
use imgui::SliderFlags;
use playground_core::prelude::*;
use std::borrow::Cow;
use std::path::Path;

const VERTEX: &str = r#"#version 410 core
out vec2 texcoord;
void main()
{
    vec2 points[4] = vec2[](
        vec2(-1.0, -1.0),
        vec2(-1.0,  1.0),
        vec2( 1.0,  1.0),
        vec2( 1.0, -1.0)
    );
    gl_Position = vec4(points[gl_VertexID], 0.0, 1.0);
    texcoord = (points[gl_VertexID] + 1.0) / 2.0;
}
"#;

// `edge` is in window pixels; the one pixel wide seam is drawn black
const FRAGMENT: &str = r#"#version 410 core
in vec2 texcoord;
out vec4 color;
uniform float edge;
uniform sampler2D tex0;
uniform sampler2D tex1;
void main()
{
    float x = gl_FragCoord.x;
    float c = step(edge, x);
    vec4 color0 = texture(tex0, texcoord);
    vec4 color1 = texture(tex1, texcoord);
    float seam = step(edge - 0.5, x) * step(x, edge + 0.49);
    color = mix(color0 * (1.0 - c) + color1 * c, vec4(0.0, 0.0, 0.0, 1.0), seam);
}
"#;

const DEFAULT_IMAGE: &str = "./assets/Lenna_512x512.png";

// Left margin kept free for the options window
const PANEL_WIDTH: f32 = 250.0;

const UNCOMPRESSED: u32 = 0;

const NAMES: &[(u32, &str)] = &[
    (UNCOMPRESSED, "GL_NONE"),
    (0x84E9, "GL_COMPRESSED_ALPHA"),
    (0x84EA, "GL_COMPRESSED_LUMINANCE"),
    (0x84EB, "GL_COMPRESSED_LUMINANCE_ALPHA"),
    (0x84EC, "GL_COMPRESSED_INTENSITY"),
    (0x84ED, "GL_COMPRESSED_RGB"),
    (0x84EE, "GL_COMPRESSED_RGBA"),
    (0x8C48, "GL_COMPRESSED_SRGB"),
    (0x8C49, "GL_COMPRESSED_SRGB_ALPHA"),
    (0x8C4A, "GL_COMPRESSED_SLUMINANCE"),
    (0x8C4B, "GL_COMPRESSED_SLUMINANCE_ALPHA"),
    (0x8225, "GL_COMPRESSED_RED"),
    (0x8226, "GL_COMPRESSED_RG"),
    (0x8DBB, "GL_COMPRESSED_RED_RGTC1"),
    (0x8DBC, "GL_COMPRESSED_SIGNED_RED_RGTC1"),
    (0x8DBD, "GL_COMPRESSED_RG_RGTC2"),
    (0x8DBE, "GL_COMPRESSED_SIGNED_RG_RGTC2"),
    (0x8E8C, "GL_COMPRESSED_RGBA_BPTC_UNORM"),
    (0x8E8D, "GL_COMPRESSED_SRGB_ALPHA_BPTC_UNORM"),
    (0x8E8E, "GL_COMPRESSED_RGB_BPTC_SIGNED_FLOAT"),
    (0x8E8F, "GL_COMPRESSED_RGB_BPTC_UNSIGNED_FLOAT"),
    (0x9270, "GL_COMPRESSED_R11_EAC"),
    (0x9271, "GL_COMPRESSED_SIGNED_R11_EAC"),
    (0x9272, "GL_COMPRESSED_RG11_EAC"),
    (0x9273, "GL_COMPRESSED_SIGNED_RG11_EAC"),
    (0x9274, "GL_COMPRESSED_RGB8_ETC2"),
    (0x9275, "GL_COMPRESSED_SRGB8_ETC2"),
    (0x9276, "GL_COMPRESSED_RGB8_PUNCHTHROUGH_ALPHA1_ETC2"),
    (0x9277, "GL_COMPRESSED_SRGB8_PUNCHTHROUGH_ALPHA1_ETC2"),
    (0x9278, "GL_COMPRESSED_RGBA8_ETC2_EAC"),
    (0x9279, "GL_COMPRESSED_SRGB8_ALPHA8_ETC2_EAC"),
    (0x86B0, "GL_COMPRESSED_RGB_FXT1_3DFX"),
    (0x86B1, "GL_COMPRESSED_RGBA_FXT1_3DFX"),
    (0x8C70, "GL_COMPRESSED_LUMINANCE_LATC1_EXT"),
    (0x8C71, "GL_COMPRESSED_SIGNED_LUMINANCE_LATC1_EXT"),
    (0x8C72, "GL_COMPRESSED_LUMINANCE_ALPHA_LATC2_EXT"),
    (0x8C73, "GL_COMPRESSED_SIGNED_LUMINANCE_ALPHA_LATC2_EXT"),
    (0x83F0, "GL_COMPRESSED_RGB_S3TC_DXT1_EXT"),
    (0x83F1, "GL_COMPRESSED_RGBA_S3TC_DXT1_EXT"),
    (0x83F2, "GL_COMPRESSED_RGBA_S3TC_DXT3_EXT"),
    (0x83F3, "GL_COMPRESSED_RGBA_S3TC_DXT5_EXT"),
    (0x8C4C, "GL_COMPRESSED_SRGB_S3TC_DXT1_EXT"),
    (0x8C4D, "GL_COMPRESSED_SRGB_ALPHA_S3TC_DXT1_EXT"),
    (0x8C4E, "GL_COMPRESSED_SRGB_ALPHA_S3TC_DXT3_EXT"),
    (0x8C4F, "GL_COMPRESSED_SRGB_ALPHA_S3TC_DXT5_EXT"),
    (0x93B0, "GL_COMPRESSED_RGBA_ASTC_4x4_KHR"),
    (0x93B1, "GL_COMPRESSED_RGBA_ASTC_5x4_KHR"),
    (0x93B2, "GL_COMPRESSED_RGBA_ASTC_5x5_KHR"),
    (0x93B3, "GL_COMPRESSED_RGBA_ASTC_6x5_KHR"),
    (0x93B4, "GL_COMPRESSED_RGBA_ASTC_6x6_KHR"),
    (0x93B5, "GL_COMPRESSED_RGBA_ASTC_8x5_KHR"),
    (0x93B6, "GL_COMPRESSED_RGBA_ASTC_8x6_KHR"),
    (0x93B7, "GL_COMPRESSED_RGBA_ASTC_8x8_KHR"),
    (0x93B8, "GL_COMPRESSED_RGBA_ASTC_10x5_KHR"),
    (0x93B9, "GL_COMPRESSED_RGBA_ASTC_10x6_KHR"),
    (0x93BA, "GL_COMPRESSED_RGBA_ASTC_10x8_KHR"),
    (0x93BB, "GL_COMPRESSED_RGBA_ASTC_10x10_KHR"),
    (0x93BC, "GL_COMPRESSED_RGBA_ASTC_12x10_KHR"),
    (0x93BD, "GL_COMPRESSED_RGBA_ASTC_12x12_KHR"),
    (0x93D0, "GL_COMPRESSED_SRGB8_ALPHA8_ASTC_4x4_KHR"),
    (0x93D1, "GL_COMPRESSED_SRGB8_ALPHA8_ASTC_5x4_KHR"),
    (0x93D2, "GL_COMPRESSED_SRGB8_ALPHA8_ASTC_5x5_KHR"),
    (0x93D3, "GL_COMPRESSED_SRGB8_ALPHA8_ASTC_6x5_KHR"),
    (0x93D4, "GL_COMPRESSED_SRGB8_ALPHA8_ASTC_6x6_KHR"),
    (0x93D5, "GL_COMPRESSED_SRGB8_ALPHA8_ASTC_8x5_KHR"),
    (0x93D6, "GL_COMPRESSED_SRGB8_ALPHA8_ASTC_8x6_KHR"),
    (0x93D7, "GL_COMPRESSED_SRGB8_ALPHA8_ASTC_8x8_KHR"),
    (0x93D8, "GL_COMPRESSED_SRGB8_ALPHA8_ASTC_10x5_KHR"),
    (0x93D9, "GL_COMPRESSED_SRGB8_ALPHA8_ASTC_10x6_KHR"),
    (0x93DA, "GL_COMPRESSED_SRGB8_ALPHA8_ASTC_10x8_KHR"),
    (0x93DB, "GL_COMPRESSED_SRGB8_ALPHA8_ASTC_10x10_KHR"),
    (0x93DC, "GL_COMPRESSED_SRGB8_ALPHA8_ASTC_12x10_KHR"),
    (0x93DD, "GL_COMPRESSED_SRGB8_ALPHA8_ASTC_12x12_KHR"),
];

/// Display name of an internal format, prefixed with its hex value
pub fn compression_name(format: u32) -> String {
    let name = NAMES
        .iter()
        .find(|(id, _)| *id == format)
        .map_or("UNKNOWN COMPRESSION", |(_, name)| *name);
    format!("{format:x} {name}")
}

/// Decode an image file bottom-up, as GL expects
pub fn decode(path: &Path) -> Result<RgbaImage, image::ImageError> {
    Ok(image::open(path)?.flipv().to_rgba8())
}

/// Where the image lands inside a `width` wide framebuffer, in pixels
///
/// Returns `(x, y, w, h)`; the image is centred right of the options panel.
pub fn image_rect(width: f32, height: f32, image: [f32; 2], zoom: f32) -> (f32, f32, f32, f32) {
    let (w, h) = (image[0] * zoom, image[1] * zoom);
    (PANEL_WIDTH + (width - w) / 2.0, (height - h) / 2.0, w, h)
}

/// Internal formats the driver lists, with the uncompressed entry first
///
/// # Safety
/// A context must be current.
unsafe fn supported_formats(gl: &glow::Context) -> Vec<u32> {
    let mut formats = vec![UNCOMPRESSED];
    unsafe {
        let count = gl.get_parameter_i32(glow::NUM_COMPRESSED_TEXTURE_FORMATS);
        if count <= 0 {
            log::error!("No compressed texture formats supported");
            return formats;
        }
        let mut listed = vec![0; count as usize];
        gl.get_parameter_i32_slice(glow::COMPRESSED_TEXTURE_FORMATS, &mut listed);
        formats.extend(listed.into_iter().map(|f| f as u32));
    }
    log::debug!("{} compressed texture formats available", formats.len() - 1);
    formats
}

unsafe fn upload(
    gl: &glow::Context,
    image: &RgbaImage,
    format: u32,
) -> Result<glow::Texture, GpuError> {
    let internal = if format == UNCOMPRESSED {
        glow::RGBA8
    } else {
        format
    };
    unsafe {
        let texture = gl
            .create_texture()
            .map_err(|e| GpuError::Create("texture", e))?;
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            internal as i32,
            image.width() as i32,
            image.height() as i32,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            PixelUnpackData::Slice(Some(image.as_raw())),
        );
        gl.bind_texture(glow::TEXTURE_2D, None);
        playground_core::gl::drain_errors(gl, "texture upload");
        Ok(texture)
    }
}

struct Gpu {
    program: glow::Program,
    vao: glow::VertexArray,
    edge: Option<glow::UniformLocation>,
    samplers: [Option<glow::UniformLocation>; 2],
}

impl Gpu {
    unsafe fn new(gl: &glow::Context) -> Result<Self, GpuError> {
        unsafe {
            let program = program(gl, VERTEX, FRAGMENT)?;
            let vao = gl
                .create_vertex_array()
                .map_err(|e| GpuError::Create("vertex array", e))?;
            Ok(Self {
                edge: gl.get_uniform_location(program, "edge"),
                samplers: [
                    gl.get_uniform_location(program, "tex0"),
                    gl.get_uniform_location(program, "tex1"),
                ],
                program,
                vao,
            })
        }
    }

    unsafe fn delete(self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_program(self.program);
        }
    }
}

pub struct TextureCompression {
    gpu: Lazy<Gpu>,
    image_path: String,
    image: Option<RgbaImage>,
    reload: bool,
    formats: Option<Vec<u32>>,
    /// Index into `formats` per texture
    selected: [usize; 2],
    textures: [Option<glow::Texture>; 2],
    stale: [bool; 2],
    background: Color,
    edge: f32,
    zoom: f32,
}

impl TextureCompression {
    pub fn new() -> Self {
        Self {
            gpu: Lazy::Pending,
            image_path: DEFAULT_IMAGE.to_string(),
            image: None,
            reload: true,
            formats: None,
            selected: [0; 2],
            textures: [None; 2],
            stale: [false; 2],
            background: next_color(),
            edge: 0.5,
            zoom: 1.0,
        }
    }

    fn image_size(&self) -> [f32; 2] {
        self.image
            .as_ref()
            .map_or([0.0; 2], |image| [image.width() as f32, image.height() as f32])
    }

    fn format_of(&self, slot: usize) -> u32 {
        self.formats
            .as_ref()
            .and_then(|formats| formats.get(self.selected[slot]).copied())
            .unwrap_or(UNCOMPRESSED)
    }

    fn load_image(&mut self) {
        self.image = match decode(Path::new(&self.image_path)) {
            Ok(image) => {
                log::debug!(
                    "Loaded '{}' ({}x{})",
                    self.image_path,
                    image.width(),
                    image.height()
                );
                Some(image)
            }
            Err(e) => {
                log::error!("Failed to load texture '{}': {e}", self.image_path);
                None
            }
        };
        self.selected = [0; 2];
        self.stale = [true; 2];
    }

    unsafe fn refresh_textures(&mut self, gl: &glow::Context) {
        for slot in 0..self.textures.len() {
            if !std::mem::take(&mut self.stale[slot]) {
                continue;
            }
            unsafe {
                if let Some(texture) = self.textures[slot].take() {
                    gl.delete_texture(texture);
                }
                let Some(image) = self.image.as_ref() else {
                    continue;
                };
                let format = self.format_of(slot);
                match upload(gl, image, format) {
                    Ok(texture) => {
                        log::debug!("texture {slot}: {}", compression_name(format));
                        self.textures[slot] = Some(texture);
                    }
                    Err(e) => log::error!("texture {slot}: {e}"),
                }
            }
        }
    }
}

impl Canvas<GlfwPlatform, ImguiBackend> for TextureCompression {
    fn title(&self) -> &str {
        "Texture compression"
    }

    fn build_ui(&mut self, ui: &mut imgui::Ui, _session: &mut PlaygroundSession) {
        ui.window("Texture options").build(|| {
            ui.input_text("##image", &mut self.image_path).build();
            ui.same_line();
            if ui.small_button("open") {
                self.reload = true;
            }

            let none = [UNCOMPRESSED];
            let formats = self.formats.as_deref().unwrap_or(&none);
            for slot in 0..self.selected.len() {
                ui.text(format!("texture {slot} compression"));
                let label = format!("##texture {slot} compression");
                if ui.combo(label, &mut self.selected[slot], formats, |format| {
                    Cow::Owned(compression_name(*format))
                }) {
                    self.stale[slot] = true;
                }
            }

            ui.slider("edge", 0.001, 1.0, &mut self.edge);
            ui.slider_config("zoom", 0.001, 10.0)
                .display_format("%.3f")
                .flags(SliderFlags::LOGARITHMIC)
                .build(&mut self.zoom);
        });
    }

    fn render(&mut self, gl: &glow::Context, viewport: Viewport) {
        if std::mem::take(&mut self.reload) {
            self.load_image();
        }

        // SAFETY: the session made this window current.
        unsafe {
            if self.formats.is_none() {
                self.formats = Some(supported_formats(gl));
            }
            self.refresh_textures(gl);

            let size = self.image_size();
            let (x, y, w, h) =
                image_rect(viewport.width as f32, viewport.height as f32, size, self.zoom);
            gl.viewport(x as i32, y as i32, w as i32, h as i32);
            self.background.clear(gl);

            let Some(gpu) = self.gpu.get_or_init("Texture compression", || Gpu::new(gl)) else {
                return;
            };
            gl.use_program(Some(gpu.program));
            for (unit, (texture, sampler)) in self.textures.iter().zip(&gpu.samplers).enumerate() {
                gl.active_texture(glow::TEXTURE0 + unit as u32);
                gl.bind_texture(glow::TEXTURE_2D, *texture);
                gl.uniform_1_i32(sampler.as_ref(), unit as i32);
            }
            gl.uniform_1_f32(gpu.edge.as_ref(), x + self.edge * w);

            gl.bind_vertex_array(Some(gpu.vao));
            gl.draw_arrays(glow::TRIANGLE_FAN, 0, 4);
            gl.bind_vertex_array(None);

            gl.use_program(None);
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    fn release(&mut self, gl: &glow::Context) {
        // SAFETY: release runs with this window current.
        unsafe {
            for texture in self.textures.iter_mut().filter_map(Option::take) {
                gl.delete_texture(texture);
            }
            if let Some(gpu) = self.gpu.take() {
                gpu.delete(gl);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashSet;

    #[test]
    fn test_known_formats_are_named_with_hex_prefix() {
        assert_eq!(compression_name(UNCOMPRESSED), "0 GL_NONE");
        assert_eq!(compression_name(0x83F0), "83f0 GL_COMPRESSED_RGB_S3TC_DXT1_EXT");
        assert_eq!(compression_name(0x93DD), "93dd GL_COMPRESSED_SRGB8_ALPHA8_ASTC_12x12_KHR");
    }

    #[test]
    fn test_unknown_format() {
        assert_eq!(compression_name(0x1234), "1234 UNKNOWN COMPRESSION");
    }

    #[test]
    fn test_name_table_has_no_duplicate_ids() {
        let ids: HashSet<_> = NAMES.iter().map(|(id, _)| id).collect();
        assert_eq!(ids.len(), NAMES.len());
    }

    #[test]
    fn test_image_is_centred_right_of_panel() {
        let (x, y, w, h) = image_rect(1000.0, 600.0, [400.0, 200.0], 0.5);
        assert_relative_eq!(w, 200.0);
        assert_relative_eq!(h, 100.0);
        assert_relative_eq!(x, PANEL_WIDTH + 400.0);
        assert_relative_eq!(y, 250.0);
    }

    #[test]
    fn test_decode_missing_file_fails() {
        assert!(decode(Path::new("./does/not/exist.png")).is_err());
    }

    #[test]
    fn test_format_defaults_to_uncompressed_before_query() {
        let canvas = TextureCompression::new();
        assert_eq!(canvas.format_of(0), UNCOMPRESSED);
        assert_eq!(canvas.format_of(1), UNCOMPRESSED);
    }
}
