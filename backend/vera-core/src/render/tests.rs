use super::*;
use crate::memory::VRAM_LEN;
use crate::palette::PALETTE_LEN;
use crate::registers::{LayerProperties, SpriteColorMode, SpriteProperties};
use test_log::test;
use vera_config::BitsPerPixel;

// Every entry is distinct so rendered colors identify the palette index used
fn test_palette() -> PaletteTable {
    std::array::from_fn(|i| Color::rgb(i as u8, !(i as u8), 0x80))
}

fn color(index: u8) -> Color {
    test_palette()[index as usize]
}

fn tile_layer(bpp: BitsPerPixel, map_base: u32, tile_base: u32) -> LayerProperties {
    LayerProperties {
        color_depth: bpp,
        map_base,
        map_width_log2: 5,
        map_height_log2: 5,
        tile_base,
        tile_width_log2: 3,
        tile_height_log2: 3,
        ..LayerProperties::default()
    }
}

#[test]
fn tile_scenario() {
    let mut vram = vec![0; VRAM_LEN];
    let map_base = 0x0000;
    let tile_base = 0x4000;

    // Map cell (0, 0): tile 1, no flip, palette 2
    vram[map_base] = 0x01;
    vram[map_base + 1] = 0x20;
    // Tile 1: every pixel is index 3
    vram[tile_base + 32..tile_base + 64].fill(0x33);

    let props = tile_layer(BitsPerPixel::Four, map_base as u32, tile_base as u32);
    let mut buffer = PixelBuffer::default();
    render_layer(&vram, &test_palette(), &props, 128, &mut buffer);

    assert_eq!((buffer.width, buffer.height), (256, 256));
    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(buffer.get(x, y), Some(color(2 * 16 + 3)), "({x}, {y})");
        }
    }

    // Every other cell is tile 0 (all zeroes) with palette 0
    assert_eq!(buffer.get(8, 0), Some(color(0)));
    assert_eq!(buffer.get(0, 8), Some(color(0)));
    assert_eq!(buffer.get(255, 255), Some(color(0)));
}

#[test]
fn tile_flips() {
    let mut vram = vec![0; VRAM_LEN];
    let tile_base = 0x8000;

    // 8bpp tile 2 where each pixel's index is its position within the tile
    for (i, byte) in vram[tile_base + 128..tile_base + 192].iter_mut().enumerate() {
        *byte = i as u8;
    }

    // Cells 0-3: tile 2 with every flip combination
    for (cell, flip_bits) in [0x00_u8, 0x04, 0x08, 0x0C].into_iter().enumerate() {
        vram[2 * cell] = 2;
        vram[2 * cell + 1] = flip_bits;
    }

    let props = tile_layer(BitsPerPixel::Eight, 0, tile_base as u32);
    let mut buffer = PixelBuffer::default();
    render_layer(&vram, &test_palette(), &props, 128, &mut buffer);

    for y in 0..8_u32 {
        for x in 0..8_u32 {
            let index = |col: u32, row: u32| (row * 8 + col) as u8;
            assert_eq!(buffer.get(x, y), Some(color(index(x, y))));
            assert_eq!(buffer.get(8 + x, y), Some(color(index(7 - x, y))));
            assert_eq!(buffer.get(16 + x, y), Some(color(index(x, 7 - y))));
            assert_eq!(buffer.get(24 + x, y), Some(color(index(7 - x, 7 - y))));
        }
    }
}

#[test]
fn tile_palette_offset_only_shifts_low_indices() {
    let mut vram = vec![0; VRAM_LEN];
    let tile_base = 0x2000;

    // 8bpp tile 0, first row: 0, 1, 15, 16, 17, 255, ...
    vram[tile_base..tile_base + 6].copy_from_slice(&[0, 1, 15, 16, 17, 255]);
    // Cell 0: tile 0, palette 5
    vram[1] = 0x50;

    let props = tile_layer(BitsPerPixel::Eight, 0, tile_base as u32);
    let mut buffer = PixelBuffer::default();
    render_layer(&vram, &test_palette(), &props, 128, &mut buffer);

    let row: Vec<_> = (0..6).map(|x| buffer.get(x, 0).unwrap()).collect();
    assert_eq!(row, [color(0), color(0x51), color(0x5F), color(16), color(17), color(255)]);
}

#[test]
fn text_mode_colors() {
    let mut vram = vec![0; VRAM_LEN];
    let tile_base = 0x1000;

    // 1bpp tile 0x41: first row alternates set/clear pixels
    vram[tile_base + 0x41 * 8] = 0b1010_1010;
    vram[0] = 0x41;
    vram[1] = 0x4B;

    let props = tile_layer(BitsPerPixel::One, 0, tile_base as u32);
    let mut buffer = PixelBuffer::default();
    render_layer(&vram, &test_palette(), &props, 128, &mut buffer);

    // Foreground 0xB, background 0x4
    assert_eq!(buffer.get(0, 0), Some(color(0xB)));
    assert_eq!(buffer.get(1, 0), Some(color(0x4)));
    assert_eq!(buffer.get(0, 1), Some(color(0x4)));

    let props = LayerProperties { text_mode_256_color: true, ..props };
    vram[1] = 0x9C;
    render_layer(&vram, &test_palette(), &props, 128, &mut buffer);

    // Foreground 0x9C, background always 0
    assert_eq!(buffer.get(0, 0), Some(color(0x9C)));
    assert_eq!(buffer.get(1, 0), Some(color(0)));
}

#[test]
fn map_entry_decoding() {
    assert_eq!(
        MapEntry::decode([0x41, 0x4B], BitsPerPixel::One, false),
        MapEntry::Text { tile_index: 0x41, foreground: 0xB, background: 0x4 }
    );
    assert_eq!(
        MapEntry::decode([0x41, 0x4B], BitsPerPixel::One, true),
        MapEntry::Text { tile_index: 0x41, foreground: 0x4B, background: 0 }
    );
    assert_eq!(
        MapEntry::decode([0x34, 0x7E], BitsPerPixel::Two, false),
        MapEntry::Tile { tile_index: 0x234, h_flip: true, v_flip: true, palette_offset: 7 }
    );
    assert_eq!(MapEntry::decode([0xFF, 0x03], BitsPerPixel::Four, true).tile_index(), 0x3FF);
}

#[test]
fn bitmap_palette_quirk() {
    let mut vram = vec![0; VRAM_LEN];
    let bitmap_base = 0x10000;
    vram[bitmap_base..bitmap_base + 5].copy_from_slice(&[0, 16, 1, 15, 255]);

    let mut props = LayerProperties {
        color_depth: BitsPerPixel::Eight,
        bitmap_mode: true,
        tile_base: bitmap_base as u32,
        ..LayerProperties::default()
    };
    props.set_bitmap_palette_offset(5);

    let mut buffer = PixelBuffer::default();
    render_layer(&vram, &test_palette(), &props, 4, &mut buffer);

    assert_eq!((buffer.width, buffer.height), (320, 4));
    let row: Vec<_> = (0..5).map(|x| buffer.get(x, 0).unwrap()).collect();
    assert_eq!(row, [color(0), color(16), color(0x51), color(0x5F), color(255)]);
}

#[test]
fn one_bpp_bitmap_applies_offset() {
    let mut vram = vec![0; VRAM_LEN];
    vram[0] = 0b1000_0000;

    let mut props = LayerProperties {
        color_depth: BitsPerPixel::One,
        bitmap_mode: true,
        tile_width_log2: 4,
        ..LayerProperties::default()
    };
    props.set_bitmap_palette_offset(3);

    let mut buffer = PixelBuffer::default();
    render_layer(&vram, &test_palette(), &props, 1, &mut buffer);

    assert_eq!((buffer.width, buffer.height), (640, 1));
    assert_eq!(buffer.get(0, 0), Some(color(0x31)));
    assert_eq!(buffer.get(1, 0), Some(color(0)));
}

#[test]
fn viewport_applies_scroll_with_wraparound() {
    let mut vram = vec![0; VRAM_LEN];
    let tile_base = 0x4000;

    // 8bpp tile 1 is solid index 0x42, placed at map cell (1, 0)
    vram[tile_base + 64..tile_base + 128].fill(0x42);
    vram[2] = 1;

    let mut props = tile_layer(BitsPerPixel::Eight, 0, tile_base as u32);
    props.h_scroll = 8;

    let mut buffer = PixelBuffer::default();
    render_layer_viewport(&vram, &test_palette(), &props, 16, 16, &mut buffer);
    assert_eq!((buffer.width, buffer.height), (16, 16));
    assert_eq!(buffer.get(0, 0), Some(color(0x42)));
    assert_eq!(buffer.get(8, 0), Some(color(0)));

    // Scrolling left past the map edge wraps back around
    props.h_scroll = 256 - 4;
    props.v_scroll = 256 + 2;
    render_layer_viewport(&vram, &test_palette(), &props, 16, 16, &mut buffer);
    assert_eq!(buffer.get(3, 0), Some(color(0)));
    assert_eq!(buffer.get(12, 0), Some(color(0x42)));
    assert_eq!(buffer.get(12, 5), Some(color(0x42)));
    assert_eq!(buffer.get(12, 6), Some(color(0)));
}

#[test]
fn viewport_matches_full_layer_render() {
    let vram: Vec<u8> =
        (0..VRAM_LEN).map(|i| (i.wrapping_mul(0x9E37) ^ (i >> 7)) as u8).collect();

    // 4bpp 16x8 tiles with arbitrary map entries, so flips and palette offsets vary per cell
    let mut props = tile_layer(BitsPerPixel::Four, 0, 0x1000);
    props.tile_width_log2 = 4;
    props.h_scroll = 300;
    props.v_scroll = 200;

    let palette = test_palette();
    let mut layer = PixelBuffer::default();
    render_layer(&vram, &palette, &props, 0, &mut layer);
    assert_eq!((layer.width, layer.height), (512, 256));

    let mut viewport = PixelBuffer::default();
    render_layer_viewport(&vram, &palette, &props, 640, 480, &mut viewport);
    assert_eq!((viewport.width, viewport.height), (640, 480));

    for y in 0..480 {
        for x in 0..640 {
            let expected = layer.get((x + 300) % 512, (y + 200) % 256);
            assert_eq!(viewport.get(x, y), expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn text_mode_viewport_matches_full_layer_render() {
    let vram: Vec<u8> = (0..VRAM_LEN).map(|i| (i.wrapping_mul(0x2F1) >> 3) as u8).collect();

    let mut props = tile_layer(BitsPerPixel::One, 0x800, 0x8000);
    props.v_scroll = 0xFFF;

    let palette = test_palette();
    let mut layer = PixelBuffer::default();
    render_layer(&vram, &palette, &props, 0, &mut layer);

    let mut viewport = PixelBuffer::default();
    render_layer_viewport(&vram, &palette, &props, 64, 32, &mut viewport);

    for y in 0..32 {
        for x in 0..64 {
            assert_eq!(viewport.get(x, y), layer.get(x, (y + 0xFFF) % 256), "pixel ({x}, {y})");
        }
    }
}

#[test]
fn sprite_offset_applies_to_every_index() {
    let mut vram = vec![0; VRAM_LEN];
    let address = 0x3000;
    // 4bpp 8x8: first byte holds pixels 0 and 15
    vram[address] = 0x0F;

    let props = SpriteProperties {
        address: address as u32,
        color_mode: SpriteColorMode::FourBpp,
        palette_offset: 0xF0,
        width_log2: 3,
        height_log2: 3,
        ..SpriteProperties::default()
    };

    let mut buffer = PixelBuffer::default();
    render_sprite(&vram, &test_palette(), &props, &mut buffer);

    assert_eq!((buffer.width, buffer.height), (8, 8));
    assert_eq!(buffer.get(0, 0), Some(color(0xF0)));
    assert_eq!(buffer.get(1, 0), Some(color(0xFF)));
    assert_eq!(buffer.get(7, 7), Some(color(0xF0)));
}

#[test]
fn sprite_index_wraps_within_palette() {
    let mut vram = vec![0; VRAM_LEN];
    vram[0] = 0x20;

    let props = SpriteProperties {
        color_mode: SpriteColorMode::EightBpp,
        palette_offset: 0xF0,
        width_log2: 4,
        height_log2: 5,
        ..SpriteProperties::default()
    };

    let mut buffer = PixelBuffer::default();
    render_sprite(&vram, &test_palette(), &props, &mut buffer);

    assert_eq!((buffer.width, buffer.height), (16, 32));
    assert_eq!(buffer.get(0, 0), Some(color(0x10)));
}

#[test]
fn sprite_data_wraps_at_top_of_vram() {
    let mut vram = vec![0; VRAM_LEN];
    vram[VRAM_LEN - 32..].fill(0x01);
    vram[..32].fill(0x02);

    let props = SpriteProperties {
        address: (VRAM_LEN - 32) as u32,
        color_mode: SpriteColorMode::EightBpp,
        width_log2: 3,
        height_log2: 3,
        ..SpriteProperties::default()
    };

    let mut buffer = PixelBuffer::default();
    render_sprite(&vram, &test_palette(), &props, &mut buffer);

    assert_eq!(buffer.get(7, 3), Some(color(1)));
    assert_eq!(buffer.get(0, 4), Some(color(2)));
    assert_eq!(buffer.get(7, 7), Some(color(2)));
}

#[test]
fn linear_region() {
    let source = [0x12_u8, 0x34, 0x56];
    let geometry = RegionGeometry {
        bpp: BitsPerPixel::Four,
        layout: RegionLayout::Linear { width: 4 },
        palette_offset: 0x10,
    };

    let mut buffer = PixelBuffer::default();
    render_region(source.as_slice(), 0, 3, &geometry, &test_palette(), &mut buffer);

    assert_eq!((buffer.width, buffer.height), (4, 2));
    assert_eq!(buffer.get(0, 0), Some(color(0x11)));
    assert_eq!(buffer.get(3, 0), Some(color(0x14)));
    assert_eq!(buffer.get(1, 1), Some(color(0x16)));
    // Past the end of the data
    assert_eq!(buffer.get(2, 1), Some(Color::TRANSPARENT));
}

#[test]
fn tiled_region() {
    // Two 2x2 8bpp tiles laid out side by side
    let source = [1_u8, 2, 3, 4, 5, 6, 7, 8];
    let geometry = RegionGeometry {
        bpp: BitsPerPixel::Eight,
        layout: RegionLayout::Tiled { tile_width: 2, tile_height: 2, columns: 2 },
        palette_offset: 0,
    };

    let mut buffer = PixelBuffer::default();
    render_region(source.as_slice(), 0, source.len(), &geometry, &test_palette(), &mut buffer);

    assert_eq!((buffer.width, buffer.height), (4, 2));
    assert_eq!(buffer.pixels, [1, 2, 5, 6, 3, 4, 7, 8].map(color).to_vec());
}

#[test]
fn region_geometry_is_clamped_before_sizing() {
    let source = vec![0xFF_u8; 64];

    let geometry = RegionGeometry {
        bpp: BitsPerPixel::Eight,
        layout: RegionLayout::Linear { width: 0 },
        palette_offset: 0,
    };
    let mut buffer = PixelBuffer::default();
    render_region(&source, 0, 64, &geometry, &test_palette(), &mut buffer);
    assert_eq!((buffer.width, buffer.height), (1, 64));

    let geometry = RegionGeometry {
        bpp: BitsPerPixel::Eight,
        layout: RegionLayout::Tiled { tile_width: 500, tile_height: 0, columns: 0 },
        palette_offset: 0,
    };
    render_region(&source, 0, 64, &geometry, &test_palette(), &mut buffer);
    assert_eq!((buffer.width, buffer.height), (MAX_REGION_TILE_SIZE, 1));
    assert_eq!(buffer.pixels.len(), (buffer.width * buffer.height) as usize);

    // Size larger than the source is capped to the source length
    let geometry = RegionGeometry {
        bpp: BitsPerPixel::Eight,
        layout: RegionLayout::Linear { width: 8 },
        palette_offset: 0,
    };
    render_region(&source, 0, 1 << 20, &geometry, &test_palette(), &mut buffer);
    assert_eq!((buffer.width, buffer.height), (8, 8));
}

#[test]
fn region_wraps_within_source() {
    let source = [1_u8, 2, 3, 4];
    let geometry = RegionGeometry {
        bpp: BitsPerPixel::Eight,
        layout: RegionLayout::Linear { width: 4 },
        palette_offset: 0,
    };

    let mut buffer = PixelBuffer::default();
    render_region(source.as_slice(), 2, 4, &geometry, &test_palette(), &mut buffer);

    assert_eq!(buffer.pixels, [3, 4, 1, 2].map(color).to_vec());
}

#[test]
fn wrapped_region_is_not_capped() {
    let source = [1_u8, 2, 3];
    let geometry = RegionGeometry {
        bpp: BitsPerPixel::Eight,
        layout: RegionLayout::Linear { width: 4 },
        palette_offset: 0,
    };

    let mut buffer = PixelBuffer::default();
    render_wrapped_region(source.as_slice(), 1, 8, &geometry, &test_palette(), &mut buffer);
    assert_eq!(buffer.pixels, [2, 3, 1, 2, 3, 1, 2, 3].map(color).to_vec());

    render_region(source.as_slice(), 1, 8, &geometry, &test_palette(), &mut buffer);
    assert_eq!((buffer.width, buffer.height), (4, 1));
    assert_eq!(buffer.get(2, 0), Some(color(1)));
    assert_eq!(buffer.get(3, 0), Some(Color::TRANSPARENT));
}

#[test]
fn palette_swatch() {
    let mut buffer = PixelBuffer::default();
    render_palette(&test_palette(), &mut buffer);

    assert_eq!((buffer.width, buffer.height), (16, 16));
    assert_eq!(buffer.get(0, 0), Some(color(0)));
    assert_eq!(buffer.get(15, 0), Some(color(15)));
    assert_eq!(buffer.get(3, 2), Some(color(0x23)));
    assert_eq!(buffer.pixels.len(), PALETTE_LEN);
}

#[test]
fn pixel_buffer_flip() {
    let a = Color::rgb(1, 0, 0);
    let b = Color::rgb(2, 0, 0);
    let c = Color::rgb(3, 0, 0);
    let d = Color::rgb(4, 0, 0);
    let e = Color::rgb(5, 0, 0);
    let f = Color::rgb(6, 0, 0);

    let original = PixelBuffer { width: 3, height: 2, pixels: vec![a, b, c, d, e, f] };

    let mut buffer = original.clone();
    buffer.flip(true, false);
    assert_eq!(buffer.pixels, [c, b, a, f, e, d]);

    let mut buffer = original.clone();
    buffer.flip(false, true);
    assert_eq!(buffer.pixels, [d, e, f, a, b, c]);

    let mut buffer = original.clone();
    buffer.flip(true, true);
    assert_eq!(buffer.pixels, [f, e, d, c, b, a]);

    let mut buffer = original.clone();
    buffer.flip(false, false);
    assert_eq!(buffer, original);
}

#[test]
fn pixel_buffer_access() {
    let mut buffer = PixelBuffer::new(2, 2);
    assert_eq!(buffer.pixels, vec![Color::TRANSPARENT; 4]);

    buffer.set(1, 1, Color::rgb(0x10, 0x20, 0x30));
    buffer.set(5, 5, Color::BLACK);
    assert_eq!(buffer.get(1, 1), Some(Color::rgb(0x10, 0x20, 0x30)));
    assert_eq!(buffer.get(2, 0), None);
    assert_eq!(&buffer.as_bytes()[12..], &[0x10, 0x20, 0x30, 0xFF]);

    buffer.resize(3, 1);
    assert_eq!(buffer.pixels, vec![Color::TRANSPARENT; 3]);
}
