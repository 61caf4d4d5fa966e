//! Packed register codecs.
//!
//! Each register block decodes into a properties struct. Edits are encoded one logical field at a
//! time as read-modify-write updates of the current register bytes: only the bits owned by the
//! field change, so fields that share a byte with it are never disturbed.

mod composer;
mod layer;
mod sprite;


use tinyvec::ArrayVec;
use vdbg_proc_macros::{EnumAll, EnumDisplay};

pub use composer::{COMPOSER_REGISTERS_LEN, ComposerField, ComposerProperties, OutputMode};
pub use layer::{LAYER_REGISTERS_LEN, LayerField, LayerProperties};
pub use sprite::{
    NUM_SPRITES, SPRITE_ATTRIBUTES_ADDR, SPRITE_REGISTERS_LEN, SpriteColorMode, SpriteField,
    SpriteProperties,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumDisplay, EnumAll)]
pub enum Layer {
    #[default]
    Zero,
    One,
}

impl Layer {
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// A single byte update within a register block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegisterWrite {
    pub offset: usize,
    pub value: u8,
}

/// Writes produced by encoding one field; a field never spans more than two bytes.
pub type RegisterWrites = ArrayVec<[RegisterWrite; 2]>;

/// Queue a write of `value` at `offset` unless the byte already holds it.
fn push_write(writes: &mut RegisterWrites, current: &[u8], offset: usize, value: u8) {
    if current[offset] != value {
        writes.push(RegisterWrite { offset, value });
    }
}

pub fn apply_writes(bytes: &mut [u8], writes: &[RegisterWrite]) {
    for write in writes {
        bytes[write.offset] = write.value;
    }
}

/// Clamp a log2 size field into its encodable range.
fn clamp_log2(value: u8, min: u8, max: u8, name: &str) -> u8 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        log::trace!("Clamped {name} log2 from {value} to {clamped}");
    }
    clamped
}
