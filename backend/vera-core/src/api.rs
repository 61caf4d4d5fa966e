//! Public debugger API: the chip state interface consumed by the engine and the debug view built
//! on top of it.

use crate::memory::{self, AddressSpace, VRAM_LEN};
use crate::palette::{self, PaletteTable};
use crate::registers::{
    COMPOSER_REGISTERS_LEN, ComposerField, ComposerProperties, LAYER_REGISTERS_LEN, Layer,
    LayerField, LayerProperties, NUM_SPRITES, RegisterWrite, SPRITE_REGISTERS_LEN, SpriteField,
    SpriteProperties,
};
use crate::render::{self, PixelBuffer, RegionGeometry, RegionLayout};
use std::fmt::{Display, Formatter};
use vdbg_common::color::Color;
use vera_config::{
    MAX_BITMAP_PREVIEW_HEIGHT, MAX_TILE_SHEET_COLUMNS, MAX_VIEWPORT_HEIGHT, MAX_VIEWPORT_WIDTH,
    VeraDebugConfig,
};

/// Number of tiles shown in the tile sheet preview.
pub const TILE_SHEET_TILES: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterBlock {
    Layer(Layer),
    Sprite(u8),
    Composer,
}

impl RegisterBlock {
    /// Number of bytes in the block.
    #[must_use]
    pub fn size(self) -> usize {
        match self {
            Self::Layer(_) => LAYER_REGISTERS_LEN,
            Self::Sprite(_) => SPRITE_REGISTERS_LEN,
            Self::Composer => COMPOSER_REGISTERS_LEN,
        }
    }
}

impl Display for RegisterBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Layer(layer) => write!(f, "layer {}", layer.index()),
            Self::Sprite(sprite) => write!(f, "sprite {sprite}"),
            Self::Composer => write!(f, "composer"),
        }
    }
}

/// Chip state owned by the emulator core.
pub trait VeraInterface {
    /// The 128 KiB video address space.
    fn vram(&self) -> &dyn AddressSpace;

    fn write_vram(&mut self, address: usize, value: u8);

    /// Read one byte of a register block. Offsets past the end of the block read as 0.
    fn read_register(&self, block: RegisterBlock, offset: usize) -> u8;

    /// Write one byte of a register block. Offsets past the end of the block are ignored.
    fn write_register(&mut self, block: RegisterBlock, offset: usize, value: u8);

    /// Expanded palette snapshot.
    fn palette(&self) -> &PaletteTable;

    fn set_palette_cell(&mut self, index: u8, cell: u16);
}

pub struct VeraDebugView<'vera, V: ?Sized> {
    vera: &'vera mut V,
    config: VeraDebugConfig,
}

impl<'vera, V: VeraInterface + ?Sized> VeraDebugView<'vera, V> {
    pub fn new(vera: &'vera mut V, config: &VeraDebugConfig) -> Self {
        Self { vera, config: *config }
    }

    #[must_use]
    pub fn config(&self) -> &VeraDebugConfig {
        &self.config
    }

    fn read_block<const LEN: usize>(&self, block: RegisterBlock) -> [u8; LEN] {
        std::array::from_fn(|offset| self.vera.read_register(block, offset))
    }

    fn apply_writes(&mut self, block: RegisterBlock, writes: &[RegisterWrite]) {
        for write in writes {
            log::debug!("Writing {block} register {}: {:02X}", write.offset, write.value);
            self.vera.write_register(block, write.offset, write.value);
        }
    }

    /// Write back only the bytes that differ between `current` and `updated`.
    fn write_changed_bytes(&mut self, block: RegisterBlock, current: &[u8], updated: &[u8]) {
        for (offset, (&old, &new)) in current.iter().zip(updated).enumerate() {
            if old != new {
                self.apply_writes(block, &[RegisterWrite { offset, value: new }]);
            }
        }
    }

    #[must_use]
    pub fn layer_registers(&self, layer: Layer) -> [u8; LAYER_REGISTERS_LEN] {
        self.read_block(RegisterBlock::Layer(layer))
    }

    #[must_use]
    pub fn sprite_registers(&self, sprite: u8) -> [u8; SPRITE_REGISTERS_LEN] {
        self.read_block(sprite_block(sprite))
    }

    #[must_use]
    pub fn composer_registers(&self) -> [u8; COMPOSER_REGISTERS_LEN] {
        self.read_block(RegisterBlock::Composer)
    }

    /// Raw register byte write, for hex editing.
    pub fn write_register(&mut self, block: RegisterBlock, offset: usize, value: u8) {
        let block = match block {
            RegisterBlock::Sprite(sprite) => sprite_block(sprite),
            _ => block,
        };

        if offset >= block.size() {
            log::trace!("Ignoring write to {block} register {offset}, past end of block");
            return;
        }

        self.apply_writes(block, &[RegisterWrite { offset, value }]);
    }

    #[must_use]
    pub fn decode_layer(&self, layer: Layer) -> LayerProperties {
        LayerProperties::decode(&self.layer_registers(layer))
    }

    /// Write `field` from `props` into the layer's registers, leaving every other field as is.
    pub fn encode_layer_field(&mut self, layer: Layer, field: LayerField, props: &LayerProperties) {
        let writes = props.encode_field(field, &self.layer_registers(layer));
        self.apply_writes(RegisterBlock::Layer(layer), &writes);
    }

    /// Write every field of `props` that differs from the layer's current state.
    pub fn update_layer(&mut self, layer: Layer, props: &LayerProperties) {
        let current = self.layer_registers(layer);
        let updated = props.encode(&current);
        self.write_changed_bytes(RegisterBlock::Layer(layer), &current, &updated);
    }

    #[must_use]
    pub fn decode_sprite(&self, sprite: u8) -> SpriteProperties {
        SpriteProperties::decode(&self.sprite_registers(sprite))
    }

    pub fn encode_sprite_field(
        &mut self,
        sprite: u8,
        field: SpriteField,
        props: &SpriteProperties,
    ) {
        let block = sprite_block(sprite);
        let writes = props.encode_field(field, &self.read_block(block));
        self.apply_writes(block, &writes);
    }

    pub fn update_sprite(&mut self, sprite: u8, props: &SpriteProperties) {
        let block = sprite_block(sprite);
        let current = self.read_block::<SPRITE_REGISTERS_LEN>(block);
        let updated = props.encode(&current);
        self.write_changed_bytes(block, &current, &updated);
    }

    #[must_use]
    pub fn decode_composer(&self) -> ComposerProperties {
        ComposerProperties::decode(&self.composer_registers())
    }

    pub fn encode_composer_field(&mut self, field: ComposerField, props: &ComposerProperties) {
        let writes = props.encode_field(field, &self.composer_registers());
        self.apply_writes(RegisterBlock::Composer, &writes);
    }

    pub fn update_composer(&mut self, props: &ComposerProperties) {
        let current = self.composer_registers();
        let updated = props.encode(&current);
        self.write_changed_bytes(RegisterBlock::Composer, &current, &updated);
    }

    #[must_use]
    pub fn render_layer(&self, layer: Layer) -> PixelBuffer {
        let mut buffer = PixelBuffer::default();
        self.render_layer_into(layer, &mut buffer);
        buffer
    }

    /// Render a whole layer into an existing buffer, reusing its allocation.
    pub fn render_layer_into(&self, layer: Layer, out: &mut PixelBuffer) {
        let props = self.decode_layer(layer);
        let bitmap_height = clamp_config_value(
            self.config.bitmap_preview_height,
            MAX_BITMAP_PREVIEW_HEIGHT,
            "bitmap preview height",
        );
        render::render_layer(self.vera.vram(), self.vera.palette(), &props, bitmap_height, out);
    }

    /// Render the part of a layer that the chip would display in a `width` x `height` screen.
    #[must_use]
    pub fn render_layer_viewport(&self, layer: Layer, width: u32, height: u32) -> PixelBuffer {
        let width = clamp_config_value(width, MAX_VIEWPORT_WIDTH, "viewport width");
        let height = clamp_config_value(height, MAX_VIEWPORT_HEIGHT, "viewport height");

        let props = self.decode_layer(layer);
        let mut buffer = PixelBuffer::default();
        render::render_layer_viewport(
            self.vera.vram(),
            self.vera.palette(),
            &props,
            width,
            height,
            &mut buffer,
        );
        buffer
    }

    /// Render the first 1024 tiles starting at the layer's tile base, using the layer's depth and
    /// tile size and the configured preview palette offset.
    #[must_use]
    pub fn render_tile_sheet(&self, layer: Layer) -> PixelBuffer {
        let props = self.decode_layer(layer);
        let geometry = RegionGeometry {
            bpp: props.bits_per_pixel(),
            layout: RegionLayout::Tiled {
                tile_width: props.tile_width(),
                tile_height: props.tile_height(),
                columns: clamp_config_value(
                    self.config.tile_sheet_columns,
                    MAX_TILE_SHEET_COLUMNS,
                    "tile sheet columns",
                ),
            },
            palette_offset: self.config.tile_sheet_palette_offset,
        };
        // 1024 tiles of 16x16 at 8bpp cover twice the VRAM size
        let size = (TILE_SHEET_TILES * props.tile_size_bytes()) as usize;

        let mut buffer = PixelBuffer::default();
        render::render_wrapped_region(
            self.vera.vram(),
            props.tile_base as usize,
            size,
            &geometry,
            self.vera.palette(),
            &mut buffer,
        );
        buffer
    }

    #[must_use]
    pub fn render_sprite(&self, sprite: u8) -> PixelBuffer {
        let mut buffer = PixelBuffer::default();
        self.render_sprite_into(sprite, &mut buffer);
        buffer
    }

    pub fn render_sprite_into(&self, sprite: u8, out: &mut PixelBuffer) {
        let props = self.decode_sprite(sprite);
        render::render_sprite(self.vera.vram(), self.vera.palette(), &props, out);
    }

    /// Render an arbitrary memory region (VRAM, CPU memory, high RAM, ...) through the palette.
    #[must_use]
    pub fn render_region<S: AddressSpace + ?Sized>(
        &self,
        source: &S,
        address: usize,
        size: usize,
        geometry: &RegionGeometry,
    ) -> PixelBuffer {
        let mut buffer = PixelBuffer::default();
        render::render_region(source, address, size, geometry, self.vera.palette(), &mut buffer);
        buffer
    }

    #[must_use]
    pub fn render_vram_region(
        &self,
        address: usize,
        size: usize,
        geometry: &RegionGeometry,
    ) -> PixelBuffer {
        self.render_region(self.vera.vram(), address, size, geometry)
    }

    #[must_use]
    pub fn render_palette(&self) -> PixelBuffer {
        let mut buffer = PixelBuffer::default();
        render::render_palette(self.vera.palette(), &mut buffer);
        buffer
    }

    #[must_use]
    pub fn palette_color(&self, index: u8) -> Color {
        self.vera.palette()[index as usize]
    }

    /// Store a color in the palette. The color is quantized to 4 bits per channel, so reading it
    /// back may return a slightly different color.
    pub fn set_palette_color(&mut self, index: u8, color: Color) {
        let cell = palette::quantize(color);
        log::debug!("Writing palette cell {index}: {cell:03X}");
        self.vera.set_palette_cell(index, cell);
    }

    #[must_use]
    pub fn read_vram_range(&self, address: usize, len: usize) -> Vec<u8> {
        memory::read_range_vec(self.vera.vram(), address, len)
    }

    pub fn write_vram(&mut self, address: usize, value: u8) {
        self.vera.write_vram(address % VRAM_LEN, value);
    }
}

fn sprite_block(sprite: u8) -> RegisterBlock {
    let clamped = sprite & (NUM_SPRITES - 1) as u8;
    if clamped != sprite {
        log::trace!("Sprite id {sprite} wrapped to {clamped}");
    }
    RegisterBlock::Sprite(clamped)
}

fn clamp_config_value(value: u32, max: u32, name: &str) -> u32 {
    let clamped = value.clamp(1, max);
    if clamped != value {
        log::trace!("Clamped {name} from {value} to {clamped}");
    }
    clamped
}
