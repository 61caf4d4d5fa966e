use crate::bitplane;
use crate::memory::{self, AddressSpace};
use crate::palette::{self, PaletteTable};
use crate::registers::SpriteProperties;
use crate::render::PixelBuffer;

/// Render a sprite's pixel data unflipped. Unlike layers, the sprite's palette offset is added to
/// every index, including 0.
pub fn render_sprite<S: AddressSpace + ?Sized>(
    vram: &S,
    palette: &PaletteTable,
    props: &SpriteProperties,
    out: &mut PixelBuffer,
) {
    let width = props.width();
    let height = props.height();
    let bpp = props.bits_per_pixel();
    out.resize(width, height);

    let data = memory::read_range_vec(
        vram,
        props.address as usize,
        bpp.bytes_for_pixels(width * height) as usize,
    );
    let mut indices = vec![0; out.pixels.len()];
    bitplane::unpack(&data, bpp, &mut indices);

    for (pixel, &index) in out.pixels.iter_mut().zip(&indices) {
        *pixel = palette[palette::offset_palette_index(index, props.palette_offset) as usize];
    }
}
