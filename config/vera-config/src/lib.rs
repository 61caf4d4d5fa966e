use bincode::{Decode, Encode};
use std::fmt::{Display, Formatter};
use vdbg_proc_macros::{EnumAll, EnumDisplay, EnumFromStr};

pub const DEFAULT_BITMAP_PREVIEW_HEIGHT: u32 = 128;
pub const MAX_BITMAP_PREVIEW_HEIGHT: u32 = 480;

pub const DEFAULT_TILE_SHEET_COLUMNS: u32 = 16;
pub const MAX_TILE_SHEET_COLUMNS: u32 = 256;

pub const DEFAULT_VIEWPORT_WIDTH: u32 = 640;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 480;
pub const MAX_VIEWPORT_WIDTH: u32 = 640;
pub const MAX_VIEWPORT_HEIGHT: u32 = 480;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Encode,
    Decode,
    EnumDisplay,
    EnumFromStr,
    EnumAll,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "clap", derive(vdbg_proc_macros::CustomValueEnum))]
pub enum BitsPerPixel {
    #[default]
    One,
    Two,
    Four,
    Eight,
}

impl BitsPerPixel {
    /// Decode a 2-bit color depth field (0-3 => 1/2/4/8 bpp). Only the lowest 2 bits are used.
    #[inline]
    #[must_use]
    pub fn from_depth_code(code: u8) -> Self {
        match code & 3 {
            0 => Self::One,
            1 => Self::Two,
            2 => Self::Four,
            3 => Self::Eight,
            _ => unreachable!("value & 3 is always <= 3"),
        }
    }

    #[inline]
    #[must_use]
    pub fn depth_code(self) -> u8 {
        match self {
            Self::One => 0,
            Self::Two => 1,
            Self::Four => 2,
            Self::Eight => 3,
        }
    }

    #[inline]
    #[must_use]
    pub fn bits(self) -> u32 {
        1 << self.depth_code()
    }

    #[inline]
    #[must_use]
    pub fn pixels_per_byte(self) -> u32 {
        8 / self.bits()
    }

    /// Mask applied to each unpacked palette index.
    #[inline]
    #[must_use]
    pub fn index_mask(self) -> u8 {
        ((1_u16 << self.bits()) - 1) as u8
    }

    /// Number of bytes needed to hold `pixels` pixels at this depth, rounded up.
    #[inline]
    #[must_use]
    pub fn bytes_for_pixels(self, pixels: u32) -> u32 {
        pixels.div_ceil(self.pixels_per_byte())
    }
}

/// Options for the debug previews. Every numeric field is clamped to its valid range when used,
/// so any value deserialized from a config file is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VeraDebugConfig {
    /// Number of rows shown when previewing a bitmap-mode layer
    #[cfg_attr(feature = "serde", serde(default = "default_bitmap_preview_height"))]
    pub bitmap_preview_height: u32,
    /// Tiles per row in the tile sheet preview
    #[cfg_attr(feature = "serde", serde(default = "default_tile_sheet_columns"))]
    pub tile_sheet_columns: u32,
    /// Palette offset added to every tile sheet pixel
    #[cfg_attr(feature = "serde", serde(default))]
    pub tile_sheet_palette_offset: u8,
    #[cfg_attr(feature = "serde", serde(default = "default_viewport_width"))]
    pub viewport_width: u32,
    #[cfg_attr(feature = "serde", serde(default = "default_viewport_height"))]
    pub viewport_height: u32,
}

#[cfg(feature = "serde")]
fn default_bitmap_preview_height() -> u32 {
    DEFAULT_BITMAP_PREVIEW_HEIGHT
}

#[cfg(feature = "serde")]
fn default_tile_sheet_columns() -> u32 {
    DEFAULT_TILE_SHEET_COLUMNS
}

#[cfg(feature = "serde")]
fn default_viewport_width() -> u32 {
    DEFAULT_VIEWPORT_WIDTH
}

#[cfg(feature = "serde")]
fn default_viewport_height() -> u32 {
    DEFAULT_VIEWPORT_HEIGHT
}

impl Default for VeraDebugConfig {
    fn default() -> Self {
        Self {
            bitmap_preview_height: DEFAULT_BITMAP_PREVIEW_HEIGHT,
            tile_sheet_columns: DEFAULT_TILE_SHEET_COLUMNS,
            tile_sheet_palette_offset: 0,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl Display for VeraDebugConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "bitmap_preview_height: {}", self.bitmap_preview_height)?;
        writeln!(f, "tile_sheet_columns: {}", self.tile_sheet_columns)?;
        writeln!(f, "tile_sheet_palette_offset: {}", self.tile_sheet_palette_offset)?;
        write!(f, "viewport: {}x{}", self.viewport_width, self.viewport_height)
    }
}
