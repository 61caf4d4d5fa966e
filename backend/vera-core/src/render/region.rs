use crate::bitplane;
use crate::memory::{self, AddressSpace};
use crate::palette::{self, PaletteTable};
use crate::render::PixelBuffer;
use vera_config::BitsPerPixel;

pub const MAX_REGION_WIDTH: u32 = 1024;
pub const MAX_REGION_TILE_SIZE: u32 = 64;
pub const MAX_REGION_COLUMNS: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionLayout {
    /// Pixels run left to right, wrapping to the next row every `width` pixels
    Linear { width: u32 },
    /// Consecutive tiles of `tile_width` x `tile_height` pixels, laid out `columns` tiles per row
    Tiled { tile_width: u32, tile_height: u32, columns: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionGeometry {
    pub bpp: BitsPerPixel,
    pub layout: RegionLayout,
    /// Added to every index, wrapping within the palette
    pub palette_offset: u8,
}

impl RegionGeometry {
    #[must_use]
    pub fn clamped(&self) -> Self {
        let layout = match self.layout {
            RegionLayout::Linear { width } => {
                RegionLayout::Linear { width: clamp_dimension(width, MAX_REGION_WIDTH, "width") }
            }
            RegionLayout::Tiled { tile_width, tile_height, columns } => RegionLayout::Tiled {
                tile_width: clamp_dimension(tile_width, MAX_REGION_TILE_SIZE, "tile width"),
                tile_height: clamp_dimension(tile_height, MAX_REGION_TILE_SIZE, "tile height"),
                columns: clamp_dimension(columns, MAX_REGION_COLUMNS, "columns"),
            },
        };

        Self { layout, ..*self }
    }
}

impl RegionLayout {
    /// Buffer dimensions needed to hold `pixel_count` pixels.
    #[must_use]
    pub fn buffer_size(self, pixel_count: u32) -> (u32, u32) {
        match self {
            Self::Linear { width } => (width, pixel_count.div_ceil(width)),
            Self::Tiled { tile_width, tile_height, columns } => {
                let tiles = pixel_count.div_ceil(tile_width * tile_height);
                (columns * tile_width, tiles.div_ceil(columns) * tile_height)
            }
        }
    }

    /// Buffer coordinates of the `i`-th pixel of the data.
    #[must_use]
    pub fn pixel_position(self, i: u32) -> (u32, u32) {
        match self {
            Self::Linear { width } => (i % width, i / width),
            Self::Tiled { tile_width, tile_height, columns } => {
                let tile_pixels = tile_width * tile_height;
                let tile = i / tile_pixels;
                let within = i % tile_pixels;
                (
                    (tile % columns) * tile_width + within % tile_width,
                    (tile / columns) * tile_height + within / tile_width,
                )
            }
        }
    }
}

fn clamp_dimension(value: u32, max: u32, name: &str) -> u32 {
    let clamped = value.clamp(1, max);
    if clamped != value {
        log::trace!("Clamped region {name} from {value} to {clamped}");
    }
    clamped
}

/// Render `size` bytes of `source` starting at `address` (wrapping at the end of the source)
/// using the given geometry. `size` is capped at the length of the source. Pixels past the end of
/// the data in the last row or tile row are left transparent.
pub fn render_region<S: AddressSpace + ?Sized>(
    source: &S,
    address: usize,
    size: usize,
    geometry: &RegionGeometry,
    palette: &PaletteTable,
    out: &mut PixelBuffer,
) {
    render_wrapped_region(source, address, size.min(source.len()), geometry, palette, out);
}

/// Same as [`render_region`] but without the size cap: reads past the end of the source keep
/// wrapping, so the same bytes may appear more than once.
pub fn render_wrapped_region<S: AddressSpace + ?Sized>(
    source: &S,
    address: usize,
    size: usize,
    geometry: &RegionGeometry,
    palette: &PaletteTable,
    out: &mut PixelBuffer,
) {
    let geometry = geometry.clamped();

    let pixel_count = size * geometry.bpp.pixels_per_byte() as usize;

    let data = memory::read_range_vec(source, address, size);
    let indices = bitplane::unpack_vec(&data, geometry.bpp, pixel_count);

    let (width, height) = geometry.layout.buffer_size(pixel_count as u32);
    out.resize(width, height);

    for (i, &index) in indices.iter().enumerate() {
        let (x, y) = geometry.layout.pixel_position(i as u32);
        let color = palette[palette::offset_palette_index(index, geometry.palette_offset) as usize];
        out.set(x, y, color);
    }
}
