//! Lossless PNG backend.

use halftone_core::{HalftoneError, Settings, SourceImage};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::pixel::rgba_or_single;
use crate::{render_surface, ExportFormat, ExportOptions, Exporter};

/// Encodes the composited surface as RGBA PNG.
///
/// With `options.transparent`, the background fill and gradient are left
/// out and uncovered pixels keep zero alpha. An empty source image encodes
/// as a single transparent pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PngExporter;

impl Exporter for PngExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Png
    }

    fn export(
        &self,
        image: &SourceImage,
        settings: &Settings,
        options: &ExportOptions,
    ) -> Result<Vec<u8>, HalftoneError> {
        let (surface, _) = render_surface(image, settings, options.target(options.transparent))?;
        let (width, height, rgba) = rgba_or_single(&surface, [0, 0, 0, 0]);
        encode_png(&rgba, width, height)
    }
}

/// Encodes a straight-alpha RGBA buffer.
pub fn encode_png(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>, HalftoneError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(rgba, width, height, ExtendedColorType::Rgba8)
        .map_err(|e| HalftoneError::Encode(e.to_string()))?;
    Ok(bytes)
}
