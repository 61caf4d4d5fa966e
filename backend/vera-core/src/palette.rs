//! Conversion between 12-bit palette cells (`0x0RGB`) and 8-bit-per-channel colors.

use vdbg_common::color::Color;
use vdbg_common::num::GetBit;

pub const PALETTE_LEN: usize = 256;

pub type PaletteTable = [Color; PALETTE_LEN];

/// Palette RAM location in VRAM; 256 little-endian 16-bit cells.
pub const PALETTE_ADDR: usize = 0x1FA00;
pub const PALETTE_END: usize = PALETTE_ADDR + 2 * PALETTE_LEN;

#[inline]
fn expand_nibble(nibble: u16) -> u8 {
    let nibble = nibble as u8;
    nibble | (nibble << 4)
}

#[inline]
#[must_use]
pub fn expand(cell: u16) -> Color {
    Color::rgb(
        expand_nibble(cell.bits(8..=11)),
        expand_nibble(cell.bits(4..=7)),
        expand_nibble(cell.bits(0..=3)),
    )
}

/// Lossy; keeps the high nibble of each channel. Alpha is ignored.
#[inline]
#[must_use]
pub fn quantize(color: Color) -> u16 {
    (u16::from(color.r >> 4) << 8) | (u16::from(color.g >> 4) << 4) | u16::from(color.b >> 4)
}

#[must_use]
pub fn expand_table(cells: &[u16; PALETTE_LEN]) -> PaletteTable {
    cells.map(expand)
}

/// Apply a layer's 4-bit palette selector. Only indices 1-15 are shifted into the selected
/// 16-color bank; index 0 and indices 16 and up are used as-is.
#[inline]
#[must_use]
pub fn layer_palette_index(index: u8, palette_offset: u8) -> u8 {
    if (1..16).contains(&index) { index | ((palette_offset & 0xF) << 4) } else { index }
}

/// Add `offset` to every index, wrapping within the 256-entry palette.
#[inline]
#[must_use]
pub fn offset_palette_index(index: u8, offset: u8) -> u8 {
    index.wrapping_add(offset)
}
