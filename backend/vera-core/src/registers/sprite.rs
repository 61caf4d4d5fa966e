use crate::registers::{RegisterWrites, clamp_log2, push_write};
use bincode::{Decode, Encode};
use vdbg_common::define_bit_enum;
use vdbg_common::num::{GetBit, SetBits, sign_extend};
use vdbg_proc_macros::{EnumAll, EnumDisplay};
use vera_config::BitsPerPixel;

pub const NUM_SPRITES: usize = 128;
pub const SPRITE_REGISTERS_LEN: usize = 8;

/// Sprite attribute table location in VRAM; 8 bytes per sprite.
pub const SPRITE_ATTRIBUTES_ADDR: usize = 0x1FC00;

// Register byte offsets
const ADDRESS_L: usize = 0;
const ADDRESS_H: usize = 1;
const X_L: usize = 2;
const X_H: usize = 3;
const Y_L: usize = 4;
const Y_H: usize = 5;
const FLAGS: usize = 6;
const SIZE_PALETTE: usize = 7;

define_bit_enum!(SpriteColorMode, [FourBpp, EightBpp]);

impl SpriteColorMode {
    #[must_use]
    pub fn bits_per_pixel(self) -> BitsPerPixel {
        match self {
            Self::FourBpp => BitsPerPixel::Four,
            Self::EightBpp => BitsPerPixel::Eight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumDisplay, EnumAll)]
pub enum SpriteField {
    Address,
    ColorMode,
    X,
    Y,
    HFlip,
    VFlip,
    ZDepth,
    CollisionMask,
    PaletteOffset,
    Width,
    Height,
}

impl SpriteField {
    /// Register bytes that hold (part of) this field.
    #[must_use]
    pub fn offsets(self) -> &'static [usize] {
        match self {
            Self::Address => &[ADDRESS_L, ADDRESS_H],
            Self::ColorMode => &[ADDRESS_H],
            Self::X => &[X_L, X_H],
            Self::Y => &[Y_L, Y_H],
            Self::HFlip | Self::VFlip | Self::ZDepth | Self::CollisionMask => &[FLAGS],
            Self::PaletteOffset | Self::Width | Self::Height => &[SIZE_PALETTE],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct SpriteProperties {
    // 17-bit, 32-byte aligned
    pub address: u32,
    pub color_mode: SpriteColorMode,
    // 10-bit
    pub x: u16,
    pub y: u16,
    pub h_flip: bool,
    pub v_flip: bool,
    pub z_depth: u8,
    pub collision_mask: u8,
    // Stored pre-shifted: one of 0x00, 0x10, ..., 0xF0
    pub palette_offset: u8,
    pub width_log2: u8,
    pub height_log2: u8,
}

impl SpriteProperties {
    #[must_use]
    pub fn decode(bytes: &[u8; SPRITE_REGISTERS_LEN]) -> Self {
        let address_h = bytes[ADDRESS_H];
        let flags = bytes[FLAGS];
        let size_palette = bytes[SIZE_PALETTE];

        Self {
            address: (u32::from(bytes[ADDRESS_L]) << 5) | (u32::from(address_h.bits(0..=3)) << 13),
            color_mode: SpriteColorMode::from_bit(address_h.bit(7)),
            x: u16::from_le_bytes([bytes[X_L], bytes[X_H].bits(0..=1)]),
            y: u16::from_le_bytes([bytes[Y_L], bytes[Y_H].bits(0..=1)]),
            h_flip: flags.bit(0),
            v_flip: flags.bit(1),
            z_depth: flags.bits(2..=3),
            collision_mask: flags.bits(4..=7),
            palette_offset: size_palette.bits(0..=3) << 4,
            width_log2: 3 + size_palette.bits(4..=5),
            height_log2: 3 + size_palette.bits(6..=7),
        }
    }

    /// Encode a single field against the current register bytes.
    #[must_use]
    pub fn encode_field(
        &self,
        field: SpriteField,
        current: &[u8; SPRITE_REGISTERS_LEN],
    ) -> RegisterWrites {
        let mut writes = RegisterWrites::new();

        let flags = current[FLAGS];
        let size_palette = current[SIZE_PALETTE];
        match field {
            SpriteField::Address => {
                push_write(&mut writes, current, ADDRESS_L, (self.address >> 5) as u8);
                let high = current[ADDRESS_H].with_bits(0..=3, (self.address >> 13) as u8);
                push_write(&mut writes, current, ADDRESS_H, high);
            }
            SpriteField::ColorMode => {
                let value = current[ADDRESS_H].with_bit(7, self.color_mode.to_bit());
                push_write(&mut writes, current, ADDRESS_H, value);
            }
            SpriteField::X => encode_coordinate(&mut writes, current, X_L, self.x),
            SpriteField::Y => encode_coordinate(&mut writes, current, Y_L, self.y),
            SpriteField::HFlip => {
                push_write(&mut writes, current, FLAGS, flags.with_bit(0, self.h_flip));
            }
            SpriteField::VFlip => {
                push_write(&mut writes, current, FLAGS, flags.with_bit(1, self.v_flip));
            }
            SpriteField::ZDepth => {
                push_write(&mut writes, current, FLAGS, flags.with_bits(2..=3, self.z_depth));
            }
            SpriteField::CollisionMask => {
                let value = flags.with_bits(4..=7, self.collision_mask);
                push_write(&mut writes, current, FLAGS, value);
            }
            SpriteField::PaletteOffset => {
                let value = size_palette.with_bits(0..=3, self.palette_offset >> 4);
                push_write(&mut writes, current, SIZE_PALETTE, value);
            }
            SpriteField::Width => {
                let log2 = clamp_log2(self.width_log2, 3, 6, "sprite width");
                let value = size_palette.with_bits(4..=5, log2 - 3);
                push_write(&mut writes, current, SIZE_PALETTE, value);
            }
            SpriteField::Height => {
                let log2 = clamp_log2(self.height_log2, 3, 6, "sprite height");
                let value = size_palette.with_bits(6..=7, log2 - 3);
                push_write(&mut writes, current, SIZE_PALETTE, value);
            }
        }

        writes
    }

    /// Encode every field on top of `current`.
    #[must_use]
    pub fn encode(&self, current: &[u8; SPRITE_REGISTERS_LEN]) -> [u8; SPRITE_REGISTERS_LEN] {
        let mut bytes = *current;
        for field in SpriteField::ALL {
            let writes = self.encode_field(field, &bytes);
            super::apply_writes(&mut bytes, &writes);
        }
        bytes
    }

    #[inline]
    #[must_use]
    pub fn bits_per_pixel(&self) -> BitsPerPixel {
        self.color_mode.bits_per_pixel()
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> u32 {
        1 << self.width_log2.clamp(3, 6)
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> u32 {
        1 << self.height_log2.clamp(3, 6)
    }

    /// X coordinate interpreted as a 10-bit two's complement value.
    #[inline]
    #[must_use]
    pub fn signed_x(&self) -> i16 {
        sign_extend(self.x & 0x3FF, 10)
    }

    #[inline]
    #[must_use]
    pub fn signed_y(&self) -> i16 {
        sign_extend(self.y & 0x3FF, 10)
    }
}

fn encode_coordinate(writes: &mut RegisterWrites, current: &[u8], low_offset: usize, value: u16) {
    let [lsb, msb] = value.to_le_bytes();
    push_write(writes, current, low_offset, lsb);
    push_write(writes, current, low_offset + 1, current[low_offset + 1].with_bits(0..=1, msb));
}
