use crate::registers::{RegisterWrites, push_write};
use bincode::{Decode, Encode};
use vdbg_common::num::{GetBit, SetBits};
use vdbg_proc_macros::{EnumAll, EnumDisplay};

pub const COMPOSER_REGISTERS_LEN: usize = 8;

// Register byte offsets
const VIDEO: usize = 0;
const H_SCALE: usize = 1;
const V_SCALE: usize = 2;
const BORDER: usize = 3;
const H_START: usize = 4;
const H_STOP: usize = 5;
const V_START: usize = 6;
const V_STOP: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Encode, Decode, EnumDisplay, EnumAll)]
pub enum OutputMode {
    #[default]
    Disabled,
    Vga,
    Ntsc,
    RgbInterlaced,
}

impl OutputMode {
    fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => Self::Disabled,
            1 => Self::Vga,
            2 => Self::Ntsc,
            3 => Self::RgbInterlaced,
            _ => unreachable!("value & 3 is always <= 3"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumDisplay, EnumAll)]
pub enum ComposerField {
    OutputMode,
    ChromaDisable,
    Layer0Enabled,
    Layer1Enabled,
    SpritesEnabled,
    HScale,
    VScale,
    BorderColor,
    HStart,
    HStop,
    VStart,
    VStop,
}

impl ComposerField {
    /// Register bytes that hold this field.
    #[must_use]
    pub fn offsets(self) -> &'static [usize] {
        match self {
            Self::OutputMode
            | Self::ChromaDisable
            | Self::Layer0Enabled
            | Self::Layer1Enabled
            | Self::SpritesEnabled => &[VIDEO],
            Self::HScale => &[H_SCALE],
            Self::VScale => &[V_SCALE],
            Self::BorderColor => &[BORDER],
            Self::HStart => &[H_START],
            Self::HStop => &[H_STOP],
            Self::VStart => &[V_START],
            Self::VStop => &[V_STOP],
        }
    }
}

/// Display composer state. Active area bounds are stored in pixels; horizontal bounds have a
/// granularity of 4 and vertical bounds a granularity of 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub struct ComposerProperties {
    pub output_mode: OutputMode,
    pub chroma_disable: bool,
    pub layer0_enabled: bool,
    pub layer1_enabled: bool,
    pub sprites_enabled: bool,
    // 128 = 1 output pixel per layer pixel
    pub h_scale: u8,
    pub v_scale: u8,
    pub border_color: u8,
    pub h_start: u16,
    pub h_stop: u16,
    pub v_start: u16,
    pub v_stop: u16,
}

impl ComposerProperties {
    #[must_use]
    pub fn decode(bytes: &[u8; COMPOSER_REGISTERS_LEN]) -> Self {
        let video = bytes[VIDEO];

        Self {
            output_mode: OutputMode::from_bits(video.bits(0..=1)),
            chroma_disable: video.bit(2),
            layer0_enabled: video.bit(4),
            layer1_enabled: video.bit(5),
            sprites_enabled: video.bit(6),
            h_scale: bytes[H_SCALE],
            v_scale: bytes[V_SCALE],
            border_color: bytes[BORDER],
            h_start: u16::from(bytes[H_START]) << 2,
            h_stop: u16::from(bytes[H_STOP]) << 2,
            v_start: u16::from(bytes[V_START]) << 1,
            v_stop: u16::from(bytes[V_STOP]) << 1,
        }
    }

    /// Encode a single field against the current register bytes.
    #[must_use]
    pub fn encode_field(
        &self,
        field: ComposerField,
        current: &[u8; COMPOSER_REGISTERS_LEN],
    ) -> RegisterWrites {
        let mut writes = RegisterWrites::new();

        let video = current[VIDEO];
        let (offset, value) = match field {
            ComposerField::OutputMode => (VIDEO, video.with_bits(0..=1, self.output_mode as u8)),
            ComposerField::ChromaDisable => (VIDEO, video.with_bit(2, self.chroma_disable)),
            ComposerField::Layer0Enabled => (VIDEO, video.with_bit(4, self.layer0_enabled)),
            ComposerField::Layer1Enabled => (VIDEO, video.with_bit(5, self.layer1_enabled)),
            ComposerField::SpritesEnabled => (VIDEO, video.with_bit(6, self.sprites_enabled)),
            ComposerField::HScale => (H_SCALE, self.h_scale),
            ComposerField::VScale => (V_SCALE, self.v_scale),
            ComposerField::BorderColor => (BORDER, self.border_color),
            ComposerField::HStart => (H_START, (self.h_start >> 2) as u8),
            ComposerField::HStop => (H_STOP, (self.h_stop >> 2) as u8),
            ComposerField::VStart => (V_START, (self.v_start >> 1) as u8),
            ComposerField::VStop => (V_STOP, (self.v_stop >> 1) as u8),
        };
        push_write(&mut writes, current, offset, value);

        writes
    }

    /// Encode every field on top of `current`.
    #[must_use]
    pub fn encode(&self, current: &[u8; COMPOSER_REGISTERS_LEN]) -> [u8; COMPOSER_REGISTERS_LEN] {
        let mut bytes = *current;
        for field in ComposerField::ALL {
            let writes = self.encode_field(field, &bytes);
            super::apply_writes(&mut bytes, &writes);
        }
        bytes
    }
}
