//! Unpacking of packed 1/2/4/8 bpp pixel data into one palette index per byte.
//!
//! Pixels are packed most-significant-bits first: at 4bpp the byte `0xA5` holds pixel `0xA`
//! followed by pixel `0x5`.

use vera_config::BitsPerPixel;

/// Read the pixel at `pixel` from packed data. Pixels past the end of `src` read as 0.
#[inline]
#[must_use]
pub fn pixel_at(src: &[u8], bpp: BitsPerPixel, pixel: usize) -> u8 {
    let pixels_per_byte = bpp.pixels_per_byte() as usize;
    let Some(&byte) = src.get(pixel / pixels_per_byte) else { return 0 };

    let bits = bpp.bits();
    let shift = 8 - bits * (pixel % pixels_per_byte + 1) as u32;
    (byte >> shift) & bpp.index_mask()
}

/// Unpack pixels from `src` into `out`, one index per output byte.
///
/// Unpacking stops early if `src` runs out; returns the number of pixels written.
pub fn unpack(src: &[u8], bpp: BitsPerPixel, out: &mut [u8]) -> usize {
    if bpp == BitsPerPixel::Eight {
        let len = src.len().min(out.len());
        out[..len].copy_from_slice(&src[..len]);
        return len;
    }

    let pixels_per_byte = bpp.pixels_per_byte() as usize;
    let bits = bpp.bits();
    let mask = bpp.index_mask();

    let mut written = 0;
    for (&byte, out_chunk) in src.iter().zip(out.chunks_mut(pixels_per_byte)) {
        for (i, pixel) in out_chunk.iter_mut().enumerate() {
            let shift = 8 - bits * (i as u32 + 1);
            *pixel = (byte >> shift) & mask;
        }
        written += out_chunk.len();
    }

    written
}

#[must_use]
pub fn unpack_vec(src: &[u8], bpp: BitsPerPixel, pixel_count: usize) -> Vec<u8> {
    let mut out = vec![0; pixel_count];
    let written = unpack(src, bpp, &mut out);
    out.truncate(written);
    out
}
