//! Source image access.
//!
//! The source is decoded once into an RGBA buffer by the caller. A render
//! borrows it through a [`Sampler`], whose lookups clamp to the image edge
//! and never allocate.

use glam::DVec2;
use image::{Rgba, RgbaImage};

use crate::color::{luma8, Srgb};
use crate::error::HalftoneError;

/// A decoded, straight-alpha RGBA source image. May be empty.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
}

impl SourceImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// A 0x0 image. Rendering it yields an empty surface.
    pub fn empty() -> Self {
        Self {
            pixels: RgbaImage::new(0, 0),
        }
    }

    /// Wraps a row-major RGBA buffer.
    ///
    /// Returns `HalftoneError::InvalidDimensions` when `data` is not exactly
    /// `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, HalftoneError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(HalftoneError::InvalidDimensions);
        }
        RgbaImage::from_raw(width, height, data)
            .map(Self::new)
            .ok_or(HalftoneError::InvalidDimensions)
    }

    /// A uniformly colored opaque image.
    pub fn solid(width: u32, height: u32, color: Srgb) -> Self {
        let [r, g, b] = color.to_rgb8();
        Self::new(RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.width() == 0 || self.pixels.height() == 0
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn sampler(&self) -> Sampler<'_> {
        Sampler { image: &self.pixels }
    }
}

impl From<RgbaImage> for SourceImage {
    fn from(pixels: RgbaImage) -> Self {
        Self::new(pixels)
    }
}

/// Clamped pixel lookups into a borrowed source image.
#[derive(Debug, Clone, Copy)]
pub struct Sampler<'a> {
    image: &'a RgbaImage,
}

impl Sampler<'_> {
    /// RGBA of the pixel under `position` (image units), clamped to the
    /// nearest edge pixel. `None` only for an empty image.
    pub fn sample(&self, position: DVec2) -> Option<[u8; 4]> {
        let (w, h) = self.image.dimensions();
        if w == 0 || h == 0 {
            return None;
        }
        let x = clamp_index(position.x, w);
        let y = clamp_index(position.y, h);
        Some(self.image.get_pixel(x, y).0)
    }

    /// RGB of the pixel under `position` as a color.
    pub fn color(&self, position: DVec2) -> Option<Srgb> {
        self.sample(position).map(|[r, g, b, _]| Srgb::from_rgb8([r, g, b]))
    }

    /// Luma of the pixel under `position`, in [0, 1]. Alpha is ignored; an
    /// empty image reads as black.
    pub fn brightness(&self, position: DVec2) -> f64 {
        self.sample(position)
            .map_or(0.0, |[r, g, b, _]| luma8([r, g, b]))
    }
}

fn clamp_index(coordinate: f64, extent: u32) -> u32 {
    if coordinate.is_nan() {
        return 0;
    }
    // Saturating float-to-int cast handles +/- infinity.
    let index = coordinate.floor() as i64;
    index.clamp(0, i64::from(extent) - 1) as u32
}
