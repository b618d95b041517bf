#![deny(unsafe_code)]
//! Export backends: renders a halftone at a resolution multiplier and
//! serializes it as PNG, JPEG or an approximated SVG.
//!
//! [`ExportKind`] maps format names to backends the same way for the CLI and
//! any other caller. Every backend tolerates an empty source image and then
//! produces a minimal valid file of its format.

pub mod jpeg;
pub mod pixel;
pub mod png;
pub mod svg;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use halftone_core::compositor::MAX_RESOLUTION;
use halftone_core::{
    HalftoneError, RenderSummary, RenderTarget, Settings, SourceImage, Surface,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

pub use jpeg::JpegExporter;
pub use png::PngExporter;
pub use svg::SvgExporter;

/// JPEG quality used when none (or NaN) is given.
pub const DEFAULT_JPEG_QUALITY: f64 = 0.9;
/// Lowest JPEG quality; lower requests clamp here.
pub const MIN_JPEG_QUALITY: f64 = 0.1;

/// All recognized format names.
const FORMAT_NAMES: &[&str] = &["png", "jpg", "jpeg", "svg"];

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Svg,
}

impl ExportFormat {
    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Svg => "svg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Svg => "image/svg+xml",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = HalftoneError;

    /// Parses `png`, `jpg`, `jpeg` or `svg`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "svg" => Ok(ExportFormat::Svg),
            _ => Err(HalftoneError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl Serialize for ExportFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.extension())
    }
}

impl<'de> Deserialize<'de> for ExportFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How an export is rendered and encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Resolution multiplier, 1 to 3.
    pub resolution: u32,
    /// Leave uncovered pixels transparent (PNG and SVG).
    pub transparent: bool,
    /// JPEG quality in [0, 1].
    pub quality: Option<f64>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            resolution: 1,
            transparent: false,
            quality: None,
        }
    }
}

impl ExportOptions {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Deserializes a (possibly partial) JSON options object.
    ///
    /// An unrecognized `format` string yields `UnsupportedFormat` naming it.
    pub fn from_json(value: &Value) -> Result<Self, HalftoneError> {
        if let Some(name) = value.get("format").and_then(Value::as_str) {
            name.parse::<ExportFormat>()?;
        }
        ExportOptions::deserialize(value).map_err(|e| HalftoneError::InvalidSettings(e.to_string()))
    }

    /// Resolution clamped to 1..=3.
    pub fn effective_resolution(&self) -> u32 {
        let r = self.resolution.clamp(1, MAX_RESOLUTION);
        if r != self.resolution {
            warn!(requested = self.resolution, effective = r, "resolution out of range");
        }
        r
    }

    /// JPEG quality in [0.1, 1]; unset or NaN gives the default.
    pub fn effective_quality(&self) -> f64 {
        match self.quality {
            Some(q) if !q.is_nan() => {
                let clamped = q.clamp(MIN_JPEG_QUALITY, 1.0);
                if clamped != q {
                    warn!(requested = q, effective = clamped, "jpeg quality out of range");
                }
                clamped
            }
            _ => DEFAULT_JPEG_QUALITY,
        }
    }

    fn target(&self, transparent: bool) -> RenderTarget {
        RenderTarget::Export {
            resolution: self.effective_resolution(),
            transparent,
        }
    }
}

/// A backend that turns an image and settings into an encoded file.
pub trait Exporter {
    fn format(&self) -> ExportFormat;

    /// Renders at `options.resolution` and encodes.
    ///
    /// `options.format` is not consulted; the backend decides the format.
    fn export(
        &self,
        image: &SourceImage,
        settings: &Settings,
        options: &ExportOptions,
    ) -> Result<Vec<u8>, HalftoneError>;
}

/// Enumeration of all export backends.
///
/// Use [`ExportKind::from_name`] for string-based construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Png(PngExporter),
    Jpeg(JpegExporter),
    Svg(SvgExporter),
}

impl ExportKind {
    /// Constructs a backend by format name.
    ///
    /// Returns `HalftoneError::UnsupportedFormat` naming the value if it is
    /// not recognized.
    pub fn from_name(name: &str) -> Result<Self, HalftoneError> {
        name.parse().map(Self::from_format)
    }

    pub fn from_format(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Png => ExportKind::Png(PngExporter),
            ExportFormat::Jpeg => ExportKind::Jpeg(JpegExporter),
            ExportFormat::Svg => ExportKind::Svg(SvgExporter),
        }
    }

    /// Returns a slice of all recognized format names.
    pub fn list_formats() -> &'static [&'static str] {
        FORMAT_NAMES
    }
}

impl Exporter for ExportKind {
    fn format(&self) -> ExportFormat {
        match self {
            ExportKind::Png(e) => e.format(),
            ExportKind::Jpeg(e) => e.format(),
            ExportKind::Svg(e) => e.format(),
        }
    }

    fn export(
        &self,
        image: &SourceImage,
        settings: &Settings,
        options: &ExportOptions,
    ) -> Result<Vec<u8>, HalftoneError> {
        match self {
            ExportKind::Png(e) => e.export(image, settings, options),
            ExportKind::Jpeg(e) => e.export(image, settings, options),
            ExportKind::Svg(e) => e.export(image, settings, options),
        }
    }
}

/// Exports with the backend named by `options.format`.
pub fn export(
    image: &SourceImage,
    settings: &Settings,
    options: &ExportOptions,
) -> Result<Vec<u8>, HalftoneError> {
    ExportKind::from_format(options.format).export(image, settings, options)
}

/// Conventional download name: `halftone-<UTC timestamp>.<ext>`.
///
/// The timestamp is ISO 8601 to the second with `:` replaced by `-`, e.g.
/// `halftone-2024-05-01T09-30-00Z.png`.
pub fn export_filename(format: ExportFormat, at: DateTime<Utc>) -> String {
    let stamp = at.to_rfc3339_opts(SecondsFormat::Secs, true).replace(':', "-");
    format!("halftone-{stamp}.{}", format.extension())
}

/// Writes encoded bytes to `path`.
///
/// Returns `HalftoneError::Io` on write failure.
pub fn write_export(path: &Path, bytes: &[u8]) -> Result<(), HalftoneError> {
    std::fs::write(path, bytes).map_err(|e| HalftoneError::Io(format!("{}: {e}", path.display())))
}

/// Renders the export surface shared by every backend.
fn render_surface(
    image: &SourceImage,
    settings: &Settings,
    target: RenderTarget,
) -> Result<(Surface, RenderSummary), HalftoneError> {
    let mut surface = Surface::empty();
    let summary = halftone_core::render(image, settings, &mut surface, target)?;
    Ok((surface, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use halftone_core::Srgb;
    use serde_json::json;

    fn white(w: u32, h: u32) -> SourceImage {
        SourceImage::solid(w, h, Srgb::WHITE)
    }

    #[test]
    fn format_parsing_ignores_case() {
        assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("jpg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!("JPEG".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!(" svg ".parse::<ExportFormat>().unwrap(), ExportFormat::Svg);
    }

    #[test]
    fn unsupported_format_names_the_value() {
        let err = "gif".parse::<ExportFormat>().unwrap_err();
        assert!(matches!(&err, HalftoneError::UnsupportedFormat(v) if v == "gif"));
        assert!(err.to_string().contains("gif"));
    }

    #[test]
    fn from_name_builds_each_backend() {
        assert_eq!(ExportKind::from_name("png").unwrap().format(), ExportFormat::Png);
        assert_eq!(ExportKind::from_name("jpeg").unwrap().format(), ExportFormat::Jpeg);
        assert_eq!(ExportKind::from_name("svg").unwrap().format(), ExportFormat::Svg);
        assert!(matches!(
            ExportKind::from_name("tiff"),
            Err(HalftoneError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn list_formats_parses_back() {
        for name in ExportKind::list_formats() {
            assert!(ExportKind::from_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn object_safety() {
        let boxed: Box<dyn Exporter> = Box::new(ExportKind::from_name("png").unwrap());
        let bytes = boxed
            .export(&white(4, 4), &Settings::default(), &ExportOptions::default())
            .unwrap();
        assert!(image::load_from_memory(&bytes).is_ok());
    }

    #[test]
    fn options_fill_missing_keys_with_defaults() {
        let opts = ExportOptions::from_json(&json!({"format": "JPG", "quality": 0.5})).unwrap();
        assert_eq!(opts.format, ExportFormat::Jpeg);
        assert_eq!(opts.resolution, 1);
        assert!(!opts.transparent);
        assert_eq!(opts.quality, Some(0.5));
    }

    #[test]
    fn options_reject_unknown_format_by_name() {
        let err = ExportOptions::from_json(&json!({"format": "bmp"})).unwrap_err();
        assert!(matches!(&err, HalftoneError::UnsupportedFormat(v) if v == "bmp"));
    }

    #[test]
    fn options_serialize_format_as_extension() {
        let value = serde_json::to_value(ExportOptions::new(ExportFormat::Jpeg)).unwrap();
        assert_eq!(value["format"], "jpg");
    }

    #[test]
    fn resolution_is_clamped() {
        let opts = |resolution| ExportOptions {
            resolution,
            ..ExportOptions::default()
        };
        assert_eq!(opts(0).effective_resolution(), 1);
        assert_eq!(opts(2).effective_resolution(), 2);
        assert_eq!(opts(7).effective_resolution(), 3);
    }

    #[test]
    fn quality_defaults_and_clamps() {
        let opts = |quality| ExportOptions {
            quality,
            ..ExportOptions::default()
        };
        assert_eq!(opts(None).effective_quality(), DEFAULT_JPEG_QUALITY);
        assert_eq!(opts(Some(f64::NAN)).effective_quality(), DEFAULT_JPEG_QUALITY);
        assert_eq!(opts(Some(-1.0)).effective_quality(), MIN_JPEG_QUALITY);
        assert_eq!(opts(Some(4.0)).effective_quality(), 1.0);
        assert_eq!(opts(Some(0.42)).effective_quality(), 0.42);
    }

    #[test]
    fn export_dispatches_on_format() {
        let image = white(10, 6);
        let settings = Settings::default();
        let png = export(&image, &settings, &ExportOptions::new(ExportFormat::Png)).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), image::ImageFormat::Png);
        let jpg = export(&image, &settings, &ExportOptions::new(ExportFormat::Jpeg)).unwrap();
        assert_eq!(image::guess_format(&jpg).unwrap(), image::ImageFormat::Jpeg);
        let svg = export(&image, &settings, &ExportOptions::new(ExportFormat::Svg)).unwrap();
        assert!(String::from_utf8(svg).unwrap().contains("<svg"));
    }

    #[test]
    fn filename_uses_a_filesystem_safe_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(
            export_filename(ExportFormat::Png, at),
            "halftone-2024-05-01T09-30-00Z.png"
        );
        assert_eq!(
            export_filename(ExportFormat::Jpeg, at),
            "halftone-2024-05-01T09-30-00Z.jpg"
        );
        assert!(!export_filename(ExportFormat::Svg, Utc::now()).contains(':'));
    }

    #[test]
    fn write_export_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let bytes = export(&white(8, 8), &Settings::default(), &ExportOptions::default()).unwrap();
        write_export(&path, &bytes).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!((img.width(), img.height()), (8, 8));
    }

    #[test]
    fn write_export_reports_io_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        assert!(matches!(
            write_export(&path, b"x"),
            Err(HalftoneError::Io(_))
        ));
    }
}
