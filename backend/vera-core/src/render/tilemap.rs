use crate::bitplane;
use crate::memory::{self, AddressSpace};
use crate::palette::{self, PaletteTable};
use crate::registers::LayerProperties;
use crate::render::PixelBuffer;
use vdbg_common::color::Color;
use vdbg_common::num::GetBit;
use vera_config::BitsPerPixel;

/// A decoded 2-byte tile map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEntry {
    /// 1bpp cell; set pixels use the foreground color and clear pixels the background color
    Text { tile_index: u16, foreground: u8, background: u8 },
    Tile { tile_index: u16, h_flip: bool, v_flip: bool, palette_offset: u8 },
}

impl MapEntry {
    #[must_use]
    pub fn decode(bytes: [u8; 2], bpp: BitsPerPixel, text_256_color: bool) -> Self {
        let [low, high] = bytes;
        match bpp {
            BitsPerPixel::One if text_256_color => {
                Self::Text { tile_index: low.into(), foreground: high, background: 0 }
            }
            BitsPerPixel::One => Self::Text {
                tile_index: low.into(),
                foreground: high.bits(0..=3),
                background: high.bits(4..=7),
            },
            _ => Self::Tile {
                tile_index: u16::from_le_bytes([low, high.bits(0..=1)]),
                h_flip: high.bit(2),
                v_flip: high.bit(3),
                palette_offset: high.bits(4..=7),
            },
        }
    }

    #[must_use]
    pub fn tile_index(self) -> u16 {
        match self {
            Self::Text { tile_index, .. } | Self::Tile { tile_index, .. } => tile_index,
        }
    }

    fn flips(self) -> (bool, bool) {
        match self {
            Self::Text { .. } => (false, false),
            Self::Tile { h_flip, v_flip, .. } => (h_flip, v_flip),
        }
    }

    fn palette_index(self, pixel: u8) -> u8 {
        match self {
            Self::Text { foreground, background, .. } => {
                if pixel != 0 {
                    foreground
                } else {
                    background
                }
            }
            Self::Tile { palette_offset, .. } => {
                palette::layer_palette_index(pixel, palette_offset)
            }
        }
    }
}

/// Render a whole layer: the full tile map in tile mode, or `bitmap_height` rows of the bitmap
/// in bitmap mode.
pub fn render_layer<S: AddressSpace + ?Sized>(
    vram: &S,
    palette: &PaletteTable,
    props: &LayerProperties,
    bitmap_height: u32,
    out: &mut PixelBuffer,
) {
    if props.bitmap_mode {
        render_bitmap(vram, palette, props, bitmap_height, out);
    } else {
        render_tile_map(vram, palette, props, out);
    }
}

/// Render a `width` x `height` window of the layer as the chip would display it, applying the
/// scroll registers with wraparound at the tile map edges. Bitmap layers ignore scrolling.
///
/// Only the map cells and tile rows inside the window are read.
pub fn render_layer_viewport<S: AddressSpace + ?Sized>(
    vram: &S,
    palette: &PaletteTable,
    props: &LayerProperties,
    width: u32,
    height: u32,
    out: &mut PixelBuffer,
) {
    if props.bitmap_mode {
        let mut bitmap = PixelBuffer::default();
        render_bitmap(vram, palette, props, height, &mut bitmap);

        out.resize(width, height);
        for y in 0..height.min(bitmap.height) {
            for x in 0..width.min(bitmap.width) {
                out.set(x, y, bitmap.get(x, y).unwrap_or(Color::TRANSPARENT));
            }
        }
        return;
    }

    out.resize(width, height);

    let bpp = props.bits_per_pixel();
    let tile_width = props.tile_width();
    let tile_height = props.tile_height();
    let map_width = props.map_width();
    let layer_width = map_width * tile_width;
    let layer_height = props.map_height() * tile_height;

    let tile_size = props.tile_size_bytes() as usize;
    let row_bytes = bpp.bytes_for_pixels(tile_width) as usize;
    let mut row_data = vec![0; row_bytes];

    let h_scroll = u32::from(props.h_scroll & 0xFFF);
    let v_scroll = u32::from(props.v_scroll & 0xFFF);
    for y in 0..height {
        let layer_y = (y + v_scroll) % layer_height;
        let map_row = layer_y / tile_height;
        let tile_row = layer_y % tile_height;

        // Map column and entry of the cell whose tile row is currently in `row_data`
        let mut current: Option<(u32, MapEntry)> = None;
        for x in 0..width {
            let layer_x = (x + h_scroll) % layer_width;
            let map_col = layer_x / tile_width;

            let entry = match current {
                Some((col, entry)) if col == map_col => entry,
                _ => {
                    let cell_addr =
                        props.map_base as usize + 2 * (map_row * map_width + map_col) as usize;
                    let mut cell = [0; 2];
                    memory::read_range(vram, cell_addr, &mut cell);
                    let entry = MapEntry::decode(cell, bpp, props.text_mode_256_color);

                    let (_, v_flip) = entry.flips();
                    let src_row = if v_flip { tile_height - 1 - tile_row } else { tile_row };
                    let row_addr = props.tile_base as usize
                        + usize::from(entry.tile_index()) * tile_size
                        + src_row as usize * row_bytes;
                    memory::read_range(vram, row_addr, &mut row_data);

                    current = Some((map_col, entry));
                    entry
                }
            };

            let (h_flip, _) = entry.flips();
            let tile_col = layer_x % tile_width;
            let src_col = if h_flip { tile_width - 1 - tile_col } else { tile_col };
            let pixel = bitplane::pixel_at(&row_data, bpp, src_col as usize);
            out.set(x, y, palette[entry.palette_index(pixel) as usize]);
        }
    }
}

fn render_bitmap<S: AddressSpace + ?Sized>(
    vram: &S,
    palette: &PaletteTable,
    props: &LayerProperties,
    height: u32,
    out: &mut PixelBuffer,
) {
    let width = props.bitmap_width();
    let bpp = props.bits_per_pixel();
    out.resize(width, height);

    let data = memory::read_range_vec(
        vram,
        props.tile_base as usize,
        bpp.bytes_for_pixels(width * height) as usize,
    );
    let mut indices = vec![0; out.pixels.len()];
    bitplane::unpack(&data, bpp, &mut indices);

    let palette_offset = props.bitmap_palette_offset();
    for (pixel, &index) in out.pixels.iter_mut().zip(&indices) {
        *pixel = palette[palette::layer_palette_index(index, palette_offset) as usize];
    }
}

fn render_tile_map<S: AddressSpace + ?Sized>(
    vram: &S,
    palette: &PaletteTable,
    props: &LayerProperties,
    out: &mut PixelBuffer,
) {
    let bpp = props.bits_per_pixel();
    let tile_width = props.tile_width();
    let tile_height = props.tile_height();
    let map_width = props.map_width();
    let map_height = props.map_height();
    out.resize(map_width * tile_width, map_height * tile_height);

    let map = memory::read_range_vec(
        vram,
        props.map_base as usize,
        (2 * map_width * map_height) as usize,
    );

    let tile_size = props.tile_size_bytes() as usize;
    let mut tile_data = vec![0; tile_size];
    let mut tile_pixels = vec![0; (tile_width * tile_height) as usize];

    for (cell_idx, cell) in map.chunks_exact(2).enumerate() {
        let entry = MapEntry::decode([cell[0], cell[1]], bpp, props.text_mode_256_color);

        let tile_addr = props.tile_base as usize + usize::from(entry.tile_index()) * tile_size;
        memory::read_range(vram, tile_addr, &mut tile_data);
        bitplane::unpack(&tile_data, bpp, &mut tile_pixels);

        let map_col = cell_idx as u32 % map_width;
        let map_row = cell_idx as u32 / map_width;
        blit_tile(
            out,
            &tile_pixels,
            entry,
            palette,
            (map_col * tile_width, map_row * tile_height),
            (tile_width, tile_height),
        );
    }
}

fn blit_tile(
    out: &mut PixelBuffer,
    tile_pixels: &[u8],
    entry: MapEntry,
    palette: &PaletteTable,
    (x, y): (u32, u32),
    (tile_width, tile_height): (u32, u32),
) {
    let (h_flip, v_flip) = entry.flips();

    for tile_row in 0..tile_height {
        let src_row = if v_flip { tile_height - 1 - tile_row } else { tile_row };
        for tile_col in 0..tile_width {
            let src_col = if h_flip { tile_width - 1 - tile_col } else { tile_col };

            let pixel = tile_pixels[(src_row * tile_width + src_col) as usize];
            let color = palette[entry.palette_index(pixel) as usize];
            out.set(x + tile_col, y + tile_row, color);
        }
    }
}
