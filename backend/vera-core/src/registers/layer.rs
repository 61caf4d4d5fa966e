use crate::registers::{RegisterWrites, clamp_log2, push_write};
use bincode::{Decode, Encode};
use vdbg_common::num::{GetBit, SetBits};
use vdbg_proc_macros::{EnumAll, EnumDisplay};
use vera_config::BitsPerPixel;

pub const LAYER_REGISTERS_LEN: usize = 7;

// Register byte offsets
const CONFIG: usize = 0;
const MAP_BASE: usize = 1;
const TILE_BASE: usize = 2;
const H_SCROLL_L: usize = 3;
const H_SCROLL_H: usize = 4;
const V_SCROLL_L: usize = 5;
const V_SCROLL_H: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumDisplay, EnumAll)]
pub enum LayerField {
    ColorDepth,
    BitmapMode,
    TextMode256Color,
    MapWidth,
    MapHeight,
    MapBase,
    TileBase,
    TileWidth,
    TileHeight,
    HScroll,
    VScroll,
}

impl LayerField {
    /// Register bytes that hold (part of) this field.
    #[must_use]
    pub fn offsets(self) -> &'static [usize] {
        match self {
            Self::ColorDepth
            | Self::BitmapMode
            | Self::TextMode256Color
            | Self::MapWidth
            | Self::MapHeight => &[CONFIG],
            Self::MapBase => &[MAP_BASE],
            Self::TileBase | Self::TileWidth | Self::TileHeight => &[TILE_BASE],
            Self::HScroll => &[H_SCROLL_L, H_SCROLL_H],
            Self::VScroll => &[V_SCROLL_L, V_SCROLL_H],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct LayerProperties {
    pub color_depth: BitsPerPixel,
    pub bitmap_mode: bool,
    pub text_mode_256_color: bool,
    // 512-byte aligned
    pub map_base: u32,
    pub map_width_log2: u8,
    pub map_height_log2: u8,
    // 2KB aligned
    pub tile_base: u32,
    pub tile_width_log2: u8,
    pub tile_height_log2: u8,
    // 12-bit
    pub h_scroll: u16,
    pub v_scroll: u16,
}

impl LayerProperties {
    #[must_use]
    pub fn decode(bytes: &[u8; LAYER_REGISTERS_LEN]) -> Self {
        let config = bytes[CONFIG];
        let tile_base = bytes[TILE_BASE];

        Self {
            color_depth: BitsPerPixel::from_depth_code(config.bits(0..=1)),
            bitmap_mode: config.bit(2),
            text_mode_256_color: config.bit(3),
            map_width_log2: 5 + config.bits(4..=5),
            map_height_log2: 5 + config.bits(6..=7),
            map_base: u32::from(bytes[MAP_BASE]) << 9,
            tile_base: u32::from(tile_base.bits(2..=7)) << 11,
            tile_width_log2: 3 + u8::from(tile_base.bit(0)),
            tile_height_log2: 3 + u8::from(tile_base.bit(1)),
            h_scroll: u16::from_le_bytes([bytes[H_SCROLL_L], bytes[H_SCROLL_H] & 0x0F]),
            v_scroll: u16::from_le_bytes([bytes[V_SCROLL_L], bytes[V_SCROLL_H] & 0x0F]),
        }
    }

    /// Encode a single field against the current register bytes.
    #[must_use]
    pub fn encode_field(
        &self,
        field: LayerField,
        current: &[u8; LAYER_REGISTERS_LEN],
    ) -> RegisterWrites {
        let mut writes = RegisterWrites::new();

        let config = current[CONFIG];
        let tile_base = current[TILE_BASE];
        match field {
            LayerField::ColorDepth => {
                let value = config.with_bits(0..=1, self.color_depth.depth_code());
                push_write(&mut writes, current, CONFIG, value);
            }
            LayerField::BitmapMode => {
                push_write(&mut writes, current, CONFIG, config.with_bit(2, self.bitmap_mode));
            }
            LayerField::TextMode256Color => {
                let value = config.with_bit(3, self.text_mode_256_color);
                push_write(&mut writes, current, CONFIG, value);
            }
            LayerField::MapWidth => {
                let log2 = clamp_log2(self.map_width_log2, 5, 8, "map width");
                push_write(&mut writes, current, CONFIG, config.with_bits(4..=5, log2 - 5));
            }
            LayerField::MapHeight => {
                let log2 = clamp_log2(self.map_height_log2, 5, 8, "map height");
                push_write(&mut writes, current, CONFIG, config.with_bits(6..=7, log2 - 5));
            }
            LayerField::MapBase => {
                push_write(&mut writes, current, MAP_BASE, (self.map_base >> 9) as u8);
            }
            LayerField::TileBase => {
                let value = tile_base.with_bits(2..=7, (self.tile_base >> 11) as u8);
                push_write(&mut writes, current, TILE_BASE, value);
            }
            LayerField::TileWidth => {
                let log2 = clamp_log2(self.tile_width_log2, 3, 4, "tile width");
                push_write(&mut writes, current, TILE_BASE, tile_base.with_bit(0, log2 == 4));
            }
            LayerField::TileHeight => {
                let log2 = clamp_log2(self.tile_height_log2, 3, 4, "tile height");
                push_write(&mut writes, current, TILE_BASE, tile_base.with_bit(1, log2 == 4));
            }
            LayerField::HScroll => {
                encode_scroll(&mut writes, current, H_SCROLL_L, self.h_scroll);
            }
            LayerField::VScroll => {
                encode_scroll(&mut writes, current, V_SCROLL_L, self.v_scroll);
            }
        }

        writes
    }

    /// Encode every field on top of `current`.
    #[must_use]
    pub fn encode(&self, current: &[u8; LAYER_REGISTERS_LEN]) -> [u8; LAYER_REGISTERS_LEN] {
        let mut bytes = *current;
        for field in LayerField::ALL {
            let writes = self.encode_field(field, &bytes);
            super::apply_writes(&mut bytes, &writes);
        }
        bytes
    }

    #[inline]
    #[must_use]
    pub fn bits_per_pixel(&self) -> BitsPerPixel {
        self.color_depth
    }

    #[inline]
    #[must_use]
    pub fn map_width(&self) -> u32 {
        1 << self.map_width_log2.clamp(5, 8)
    }

    #[inline]
    #[must_use]
    pub fn map_height(&self) -> u32 {
        1 << self.map_height_log2.clamp(5, 8)
    }

    #[inline]
    #[must_use]
    pub fn tile_width(&self) -> u32 {
        1 << self.tile_width_log2.clamp(3, 4)
    }

    #[inline]
    #[must_use]
    pub fn tile_height(&self) -> u32 {
        1 << self.tile_height_log2.clamp(3, 4)
    }

    /// Bytes occupied by one tile's pixel data.
    #[inline]
    #[must_use]
    pub fn tile_size_bytes(&self) -> u32 {
        self.color_depth.bytes_for_pixels(self.tile_width() * self.tile_height())
    }

    /// Bitmap mode width; the tile width bit selects 640 pixels instead of 320.
    #[inline]
    #[must_use]
    pub fn bitmap_width(&self) -> u32 {
        if self.tile_width_log2 >= 4 { 640 } else { 320 }
    }

    /// In bitmap mode, bits 11-8 of the horizontal scroll register select the palette bank.
    #[inline]
    #[must_use]
    pub fn bitmap_palette_offset(&self) -> u8 {
        self.h_scroll.bits(8..=11) as u8
    }

    pub fn set_bitmap_palette_offset(&mut self, palette_offset: u8) {
        self.h_scroll = self.h_scroll.with_bits(8..=11, palette_offset.into());
    }
}

fn encode_scroll(writes: &mut RegisterWrites, current: &[u8], low_offset: usize, scroll: u16) {
    let [lsb, msb] = scroll.to_le_bytes();
    push_write(writes, current, low_offset, lsb);
    push_write(writes, current, low_offset + 1, current[low_offset + 1].with_bits(0..=3, msb));
}
