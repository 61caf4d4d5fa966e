//! In-memory VERA state, usable standalone (e.g. from a VRAM dump) or as a reference
//! implementation of [`VeraInterface`].

use crate::api::{RegisterBlock, VeraDebugView, VeraInterface};
use crate::memory::{AddressSpace, VRAM_LEN};
use crate::palette::{self, PALETTE_ADDR, PALETTE_END, PALETTE_LEN, PaletteTable};
use crate::registers::{
    COMPOSER_REGISTERS_LEN, LAYER_REGISTERS_LEN, Layer, SPRITE_ATTRIBUTES_ADDR,
    SPRITE_REGISTERS_LEN,
};
use bincode::{Decode, Encode};
use thiserror::Error;
use vdbg_common::boxedarray::BoxedByteArray;
use vdbg_common::color::Color;
use vera_config::VeraDebugConfig;

#[derive(Debug, Error)]
pub enum VeraLoadError {
    #[error("VRAM dump must be exactly {expected} bytes, was {actual} bytes")]
    InvalidVramLength { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Vera {
    vram: BoxedByteArray<VRAM_LEN>,
    // Expanded copy of the palette cells in VRAM
    palette: PaletteTable,
    layer_registers: [[u8; LAYER_REGISTERS_LEN]; 2],
    composer_registers: [u8; COMPOSER_REGISTERS_LEN],
}

impl Vera {
    #[must_use]
    pub fn new() -> Self {
        Self {
            vram: BoxedByteArray::new(),
            palette: [Color::BLACK; PALETTE_LEN],
            layer_registers: [[0; LAYER_REGISTERS_LEN]; 2],
            composer_registers: [0; COMPOSER_REGISTERS_LEN],
        }
    }

    /// Load a 128 KiB VRAM dump. Register blocks start zeroed.
    ///
    /// # Errors
    ///
    /// Returns an error if `vram` is not exactly 128 KiB.
    pub fn from_vram(vram: &[u8]) -> Result<Self, VeraLoadError> {
        let vram = BoxedByteArray::from_slice(vram).ok_or(VeraLoadError::InvalidVramLength {
            expected: VRAM_LEN,
            actual: vram.len(),
        })?;

        let mut vera = Self { vram, ..Self::new() };
        vera.refresh_palette();
        Ok(vera)
    }

    #[must_use]
    pub fn vram_bytes(&self) -> &[u8] {
        self.vram.as_slice()
    }

    pub fn set_layer_registers(&mut self, layer: Layer, registers: [u8; LAYER_REGISTERS_LEN]) {
        self.layer_registers[layer.index()] = registers;
    }

    pub fn set_composer_registers(&mut self, registers: [u8; COMPOSER_REGISTERS_LEN]) {
        self.composer_registers = registers;
    }

    #[must_use]
    pub fn palette_cell(&self, index: u8) -> u16 {
        let addr = PALETTE_ADDR + 2 * usize::from(index);
        u16::from_le_bytes([self.vram[addr], self.vram[addr + 1]])
    }

    #[must_use]
    pub fn debug(&mut self, config: &VeraDebugConfig) -> VeraDebugView<'_, Self> {
        VeraDebugView::new(self, config)
    }

    fn refresh_palette(&mut self) {
        for index in 0..=u8::MAX {
            self.refresh_palette_cell(index);
        }
    }

    fn refresh_palette_cell(&mut self, index: u8) {
        self.palette[usize::from(index)] = palette::expand(self.palette_cell(index));
    }

    fn sprite_register_addr(sprite: u8, offset: usize) -> usize {
        SPRITE_ATTRIBUTES_ADDR + SPRITE_REGISTERS_LEN * usize::from(sprite & 0x7F) + offset
    }
}

impl Default for Vera {
    fn default() -> Self {
        Self::new()
    }
}

impl VeraInterface for Vera {
    fn vram(&self) -> &dyn AddressSpace {
        &**self.vram
    }

    fn write_vram(&mut self, address: usize, value: u8) {
        let address = address % VRAM_LEN;
        self.vram[address] = value;

        if (PALETTE_ADDR..PALETTE_END).contains(&address) {
            self.refresh_palette_cell(((address - PALETTE_ADDR) / 2) as u8);
        }
    }

    fn read_register(&self, block: RegisterBlock, offset: usize) -> u8 {
        if offset >= block.size() {
            return 0;
        }

        match block {
            RegisterBlock::Layer(layer) => self.layer_registers[layer.index()][offset],
            RegisterBlock::Sprite(sprite) => self.vram[Self::sprite_register_addr(sprite, offset)],
            RegisterBlock::Composer => self.composer_registers[offset],
        }
    }

    fn write_register(&mut self, block: RegisterBlock, offset: usize, value: u8) {
        if offset >= block.size() {
            return;
        }

        match block {
            RegisterBlock::Layer(layer) => self.layer_registers[layer.index()][offset] = value,
            RegisterBlock::Sprite(sprite) => {
                self.write_vram(Self::sprite_register_addr(sprite, offset), value);
            }
            RegisterBlock::Composer => self.composer_registers[offset] = value,
        }
    }

    fn palette(&self) -> &PaletteTable {
        &self.palette
    }

    fn set_palette_cell(&mut self, index: u8, cell: u16) {
        let [low, high] = (cell & 0x0FFF).to_le_bytes();
        let addr = PALETTE_ADDR + 2 * usize::from(index);
        self.vram[addr] = low;
        self.vram[addr + 1] = high;
        self.refresh_palette_cell(index);
    }
}
