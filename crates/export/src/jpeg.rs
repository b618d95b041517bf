//! Lossy JPEG backend.

use halftone_core::{HalftoneError, Settings, SourceImage};
use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::pixel::{flatten_onto, rgba_or_single};
use crate::{render_surface, ExportFormat, ExportOptions, Exporter};

const WHITE: [u8; 3] = [255, 255, 255];

/// Encodes the composited surface as baseline JPEG.
///
/// JPEG has no alpha: the transparent flag is ignored and any remaining
/// transparency is flattened onto white. Quality comes from
/// [`ExportOptions::effective_quality`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JpegExporter;

impl Exporter for JpegExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Jpeg
    }

    fn export(
        &self,
        image: &SourceImage,
        settings: &Settings,
        options: &ExportOptions,
    ) -> Result<Vec<u8>, HalftoneError> {
        let (surface, _) = render_surface(image, settings, options.target(false))?;
        let (width, height, rgba) = rgba_or_single(&surface, [255, 255, 255, 255]);
        let rgb = flatten_onto(&rgba, WHITE);
        encode_jpeg(&rgb, width, height, quality_percent(options.effective_quality()))
    }
}

/// Maps a quality in [0, 1] to the encoder's 1..=100 scale.
pub fn quality_percent(quality: f64) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
}

/// Encodes an RGB buffer.
pub fn encode_jpeg(rgb: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, HalftoneError> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .write_image(rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| HalftoneError::Encode(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use halftone_core::{ColorMode, Srgb};
    use image::{Rgba, RgbaImage};

    fn decode(bytes: &[u8]) -> image::RgbImage {
        image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg)
            .unwrap()
            .to_rgb8()
    }

    fn options(quality: Option<f64>) -> ExportOptions {
        ExportOptions {
            quality,
            ..ExportOptions::new(ExportFormat::Jpeg)
        }
    }

    fn busy_image() -> SourceImage {
        let mut img = RgbaImage::new(64, 64);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = Rgba([(x * 37 % 256) as u8, (y * 53 % 256) as u8, ((x ^ y) * 9 % 256) as u8, 255]);
        }
        SourceImage::new(img)
    }

    #[test]
    fn quality_percent_scale() {
        assert_eq!(quality_percent(0.9), 90);
        assert_eq!(quality_percent(0.1), 10);
        assert_eq!(quality_percent(1.0), 100);
        assert_eq!(quality_percent(0.0), 1);
    }

    #[test]
    fn negative_quality_still_produces_a_valid_jpeg() {
        let image = SourceImage::solid(40, 30, Srgb::WHITE);
        let bytes = JpegExporter
            .export(&image, &Settings::default(), &options(Some(-1.0)))
            .unwrap();
        let decoded = decode(&bytes);
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
    }

    #[test]
    fn higher_quality_keeps_more_detail() {
        let image = busy_image();
        let settings = Settings {
            color_mode: ColorMode::Channels,
            ..Settings::default()
        };
        let low = JpegExporter.export(&image, &settings, &options(Some(0.1))).unwrap();
        let high = JpegExporter.export(&image, &settings, &options(Some(1.0))).unwrap();
        assert!(high.len() > low.len());
    }

    #[test]
    fn resolution_scales_dimensions() {
        let image = SourceImage::solid(20, 10, Srgb::WHITE);
        let opts = ExportOptions {
            resolution: 3,
            ..options(None)
        };
        let decoded = decode(&JpegExporter.export(&image, &Settings::default(), &opts).unwrap());
        assert_eq!((decoded.width(), decoded.height()), (60, 30));
    }

    #[test]
    fn transparency_flattens_onto_white() {
        let image = SourceImage::solid(16, 16, Srgb::BLACK);
        let settings = Settings {
            draw_source: false,
            size_max: 0.0,
            size_min: 0.0,
            ..Settings::default()
        };
        let opts = ExportOptions {
            transparent: true,
            ..options(Some(1.0))
        };
        let decoded = decode(&JpegExporter.export(&image, &settings, &opts).unwrap());
        assert!(decoded.pixels().all(|p| p.0.iter().all(|&c| c > 245)));
    }

    #[test]
    fn empty_image_encodes_one_white_pixel() {
        let bytes = JpegExporter
            .export(&SourceImage::empty(), &Settings::default(), &options(None))
            .unwrap();
        let decoded = decode(&bytes);
        assert_eq!((decoded.width(), decoded.height()), (1, 1));
        assert!(decoded.get_pixel(0, 0).0.iter().all(|&c| c > 245));
    }
}
