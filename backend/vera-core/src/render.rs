//! Compositors that turn VRAM contents into RGBA pixel buffers.

mod region;
mod sprite;
mod tilemap;

#[cfg(test)]
mod tests;

use crate::palette::PaletteTable;
use vdbg_common::color::Color;

pub use region::{
    MAX_REGION_COLUMNS, MAX_REGION_TILE_SIZE, MAX_REGION_WIDTH, RegionGeometry, RegionLayout,
    render_region, render_wrapped_region,
};
pub use sprite::render_sprite;
pub use tilemap::{MapEntry, render_layer, render_layer_viewport};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl PixelBuffer {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let mut buffer = Self::default();
        buffer.resize(width, height);
        buffer
    }

    /// Resize to `width` x `height` and clear every pixel to transparent. The existing allocation
    /// is reused when it is large enough.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize((width * height) as usize, Color::TRANSPARENT);
    }

    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }

        self.pixels.get((y * self.width + x) as usize).copied()
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Pixels as tightly packed RGBA8 bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Mirror the buffer in place.
    pub fn flip(&mut self, horizontal: bool, vertical: bool) {
        if self.width == 0 {
            return;
        }

        // Reversing the whole buffer mirrors both axes
        let mut mirror_rows = horizontal;
        if vertical {
            self.pixels.reverse();
            mirror_rows = !mirror_rows;
        }

        if mirror_rows {
            self.pixels.chunks_exact_mut(self.width as usize).for_each(<[Color]>::reverse);
        }
    }
}

/// Render the palette as a 16x16 swatch, one pixel per entry.
pub fn render_palette(palette: &PaletteTable, out: &mut PixelBuffer) {
    out.resize(16, 16);
    out.pixels.copy_from_slice(palette);
}
