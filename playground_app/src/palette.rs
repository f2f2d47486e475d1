//! Background colours

use std::sync::atomic::{AtomicUsize, Ordering};

/// Linear RGBA colour with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Unpack `0xRRGGBBAA`
    pub fn from_u32(rgba: u32) -> Self {
        let channel = |shift: u32| ((rgba >> shift) & 0xFF) as f32 / 255.0;
        Self {
            r: channel(24),
            g: channel(16),
            b: channel(8),
            a: channel(0),
        }
    }

    pub fn from_array([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }

    /// Clear the current framebuffer to this colour
    pub fn clear(self, gl: &glow::Context) {
        use glow::HasContext;
        // SAFETY: callers render with their window's context current.
        unsafe {
            gl.clear_color(self.r, self.g, self.b, self.a);
            gl.clear(glow::COLOR_BUFFER_BIT);
        }
    }
}

/// Blue grey 200, the default canvas background
pub const BLUE_GREY: u32 = 0xB0BE_C5FF;

// Material 500, A200 and A400 swatches
const PALETTE: [u32; 50] = [
    0xF443_36FF, 0xE91E_63FF, 0x9C27_B0FF, 0x673A_B7FF, 0x3F51_B5FF, 0x2196_F3FF,
    0x03A9_F4FF, 0x00BC_D4FF, 0x0096_88FF, 0x4CAF_50FF, 0x8BC3_4AFF, 0xCDDC_39FF,
    0xFFEB_3BFF, 0xFFC1_07FF, 0xFF98_00FF, 0x7955_48FF, 0x9E9E_9EFF, 0x607D_8BFF,
    0xFF52_52FF, 0xFF40_81FF, 0xE040_FBFF, 0x7C4D_FFFF, 0x536D_FEFF, 0x448A_FFFF,
    0x40C4_FFFF, 0x18FF_FFFF, 0x64FF_DAFF, 0x69F0_AEFF, 0xB2FF_59FF, 0xEEFF_41FF,
    0xFFFF_00FF, 0xFFD7_40FF, 0xFFAB_40FF, 0xFF6E_40FF,
    0xFF17_44FF, 0xF500_57FF, 0xD500_F9FF, 0x651F_FFFF, 0x3D5A_FEFF, 0x2979_FFFF,
    0x00B0_FFFF, 0x00E5_FFFF, 0x1DE9_B6FF, 0x00E6_76FF, 0x76FF_03FF, 0xC6FF_00FF,
    0xFFEA_00FF, 0xFFC4_00FF, 0xFF91_00FF, 0xFF3D_00FF,
];

const PALETTE_LEN: usize = PALETTE.len();

static CURSOR: AtomicUsize = AtomicUsize::new(0);

/// Palette entry after `index`, wrapping around
fn swatch_after(index: usize) -> u32 {
    PALETTE[(index + 1) % PALETTE_LEN]
}

/// Next colour of the shared palette cycle
pub fn next_color() -> Color {
    Color::from_u32(swatch_after(CURSOR.fetch_add(1, Ordering::Relaxed)))
}
