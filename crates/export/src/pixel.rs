//! Pixel buffer conversions shared by the raster encoders.

use halftone_core::Surface;

/// Straight-alpha RGBA of `surface`, or a single pixel of `fallback` when
/// the surface is empty. Returns `(width, height, buffer)`.
pub fn rgba_or_single(surface: &Surface, fallback: [u8; 4]) -> (u32, u32, Vec<u8>) {
    if surface.is_empty() {
        (1, 1, fallback.to_vec())
    } else {
        (surface.width(), surface.height(), surface.to_rgba8())
    }
}

/// Composites a straight-alpha RGBA buffer over an opaque background,
/// dropping alpha. The result has three bytes per pixel.
pub fn flatten_onto(rgba: &[u8], background: [u8; 3]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| {
            let a = u16::from(px[3]);
            let blend = |c: u8, bg: u8| ((u16::from(c) * a + u16::from(bg) * (255 - a) + 127) / 255) as u8;
            [
                blend(px[0], background[0]),
                blend(px[1], background[1]),
                blend(px[2], background[2]),
            ]
        })
        .collect()
}
