//! Approximate vector backend.
//!
//! The SVG is traced from the rendered raster, not from the grid: the export
//! surface is cut into square blocks one lattice spacing wide (scaled to the
//! export resolution), and each block whose top-left pixel is visible becomes
//! one primitive of the configured mark shape, centered in the block and
//! colored by that pixel. Rotation and jitter are not reproduced.

use glam::DVec2;
use halftone_core::raster::{outline, Outline};
use halftone_core::{
    HalftoneError, MarkShape, RenderSummary, Settings, SourceImage, Srgb, Surface, ValueMapper,
};
use simple_xml_builder::XMLElement;
use tracing::debug;

use crate::{render_surface, ExportFormat, ExportOptions, Exporter};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
/// Blocks whose top-left alpha is at or below this are skipped.
pub const ALPHA_CUTOFF: f64 = 0.1;

/// Traces the composited surface into SVG primitives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SvgExporter;

impl Exporter for SvgExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Svg
    }

    fn export(
        &self,
        image: &SourceImage,
        settings: &Settings,
        options: &ExportOptions,
    ) -> Result<Vec<u8>, HalftoneError> {
        let (surface, summary) = render_surface(image, settings, options.target(options.transparent))?;
        if surface.is_empty() {
            return Ok(document(0, 0).to_string().into_bytes());
        }

        let settings = settings.sanitized();
        let canvas = DVec2::new(f64::from(image.width()), f64::from(image.height()));
        let mapper = ValueMapper::new(&settings, image.sampler(), canvas);
        let root = trace(&surface, &summary, &mapper, settings.mark_shape);
        Ok(root.to_string().into_bytes())
    }
}

fn document(width: u32, height: u32) -> XMLElement {
    let mut root = XMLElement::new("svg");
    root.add_attribute("xmlns", SVG_NAMESPACE);
    root.add_attribute("width", &width.to_string());
    root.add_attribute("height", &height.to_string());
    root.add_attribute("viewBox", &format!("0 0 {width} {height}"));
    root
}

fn trace(
    surface: &Surface,
    summary: &RenderSummary,
    mapper: &ValueMapper<'_>,
    shape: MarkShape,
) -> XMLElement {
    let (width, height) = (surface.width(), surface.height());
    let mut root = document(width, height);
    let block = (summary.spacing * summary.scale).max(1.0);
    let cols = (f64::from(width) / block).ceil() as u32;
    let rows = (f64::from(height) / block).ceil() as u32;

    let mut emitted = 0usize;
    for row in 0..rows {
        for col in 0..cols {
            let corner = DVec2::new(f64::from(col), f64::from(row)) * block;
            let Some([r, g, b, a]) = surface.pixel(corner.x as u32, corner.y as u32) else {
                continue;
            };
            let alpha = f64::from(a) / 255.0;
            if alpha <= ALPHA_CUTOFF {
                continue;
            }
            let center = corner + DVec2::splat(block * 0.5);
            let size = mapper.size_at(center / summary.scale) * summary.scale;
            if !(size > 0.0) {
                continue;
            }
            let fill = Srgb::from_rgb8([r, g, b]).to_hex();
            root.add_child(primitive(shape, center, size, summary.scale, &fill, alpha));
            emitted += 1;
        }
    }
    debug!(width, height, block, emitted, "traced svg");
    root
}

fn primitive(shape: MarkShape, center: DVec2, size: f64, scale: f64, fill: &str, alpha: f64) -> XMLElement {
    let mut el = match outline(shape, center, size, 0.0) {
        Outline::Circle { center, radius } => {
            let mut el = XMLElement::new("circle");
            el.add_attribute("cx", &num(center.x));
            el.add_attribute("cy", &num(center.y));
            el.add_attribute("r", &num(radius));
            el
        }
        Outline::Polygon(_) if shape == MarkShape::Square => {
            let half = size * 0.5;
            let mut el = XMLElement::new("rect");
            el.add_attribute("x", &num(center.x - half));
            el.add_attribute("y", &num(center.y - half));
            el.add_attribute("width", &num(size));
            el.add_attribute("height", &num(size));
            el
        }
        Outline::Polygon(points) => {
            let points: Vec<String> = points
                .iter()
                .map(|p| format!("{},{}", num(p.x), num(p.y)))
                .collect();
            let mut el = XMLElement::new("polygon");
            el.add_attribute("points", &points.join(" "));
            el
        }
        Outline::Segment { from, to, width } => {
            let mut el = XMLElement::new("line");
            el.add_attribute("x1", &num(from.x));
            el.add_attribute("y1", &num(from.y));
            el.add_attribute("x2", &num(to.x));
            el.add_attribute("y2", &num(to.y));
            el.add_attribute("stroke", fill);
            el.add_attribute("stroke-width", &num(width * scale));
            if alpha < 1.0 {
                el.add_attribute("stroke-opacity", &num(alpha));
            }
            return el;
        }
    };
    el.add_attribute("fill", fill);
    if alpha < 1.0 {
        el.add_attribute("fill-opacity", &num(alpha));
    }
    el
}

/// Two decimals, no trailing zeros, never `-0`.
fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halftone_core::{ColorMode, RenderTarget};

    fn export_svg(image: &SourceImage, settings: &Settings, resolution: u32, transparent: bool) -> String {
        let opts = ExportOptions {
            resolution,
            transparent,
            ..ExportOptions::new(ExportFormat::Svg)
        };
        String::from_utf8(SvgExporter.export(image, settings, &opts).unwrap()).unwrap()
    }

    fn dots(frequency: f64, size: f64) -> Settings {
        Settings {
            frequency,
            size_min: size,
            size_max: size,
            ..Settings::default()
        }
    }

    fn elements<'a>(doc: &'a roxmltree::Document<'a>) -> Vec<roxmltree::Node<'a, 'a>> {
        doc.root_element().children().filter(|n| n.is_element()).collect()
    }

    #[test]
    fn root_dimensions_follow_resolution() {
        let image = SourceImage::solid(84, 64, Srgb::WHITE);
        let text = export_svg(&image, &dots(50.0, 4.0), 2, false);
        let doc = roxmltree::Document::parse(&text).unwrap();
        let root = doc.root_element();
        assert_eq!(root.tag_name().name(), "svg");
        assert_eq!(root.tag_name().namespace(), Some(SVG_NAMESPACE));
        assert_eq!(root.attribute("width"), Some("168"));
        assert_eq!(root.attribute("height"), Some("128"));
        assert_eq!(root.attribute("viewBox"), Some("0 0 168 128"));
    }

    #[test]
    fn one_primitive_per_visible_block() {
        let image = SourceImage::solid(100, 60, Srgb::WHITE);
        for resolution in [1, 2, 3] {
            let text = export_svg(&image, &dots(50.0, 4.0), resolution, false);
            let doc = roxmltree::Document::parse(&text).unwrap();
            assert_eq!(elements(&doc).len(), 5 * 3, "resolution {resolution}");
        }
    }

    #[test]
    fn primitive_sits_in_block_center_with_scaled_size() {
        let image = SourceImage::solid(40, 40, Srgb::WHITE);
        let text = export_svg(&image, &dots(50.0, 4.0), 2, false);
        let doc = roxmltree::Document::parse(&text).unwrap();
        let first = elements(&doc)[0];
        assert_eq!(first.tag_name().name(), "circle");
        assert_eq!(first.attribute("cx"), Some("20"));
        assert_eq!(first.attribute("cy"), Some("20"));
        assert_eq!(first.attribute("r"), Some("4"));
    }

    #[test]
    fn fill_comes_from_the_block_top_left_pixel() {
        let image = SourceImage::solid(60, 60, Srgb::from_rgb8([30, 140, 220]));
        let settings = Settings {
            color_mode: ColorMode::Channels,
            ..dots(50.0, 6.0)
        };
        let mut surface = Surface::empty();
        halftone_core::render(
            &image,
            &settings,
            &mut surface,
            RenderTarget::Export {
                resolution: 1,
                transparent: false,
            },
        )
        .unwrap();
        let [r, g, b, _] = surface.pixel(20, 0).unwrap();

        let text = export_svg(&image, &settings, 1, false);
        let doc = roxmltree::Document::parse(&text).unwrap();
        let second = elements(&doc)[1];
        assert_eq!(
            second.attribute("fill"),
            Some(Srgb::from_rgb8([r, g, b]).to_hex().as_str())
        );
    }

    #[test]
    fn mark_shape_selects_the_element() {
        let image = SourceImage::solid(40, 40, Srgb::WHITE);
        for (shape, name) in [
            (MarkShape::Circle, "circle"),
            (MarkShape::Custom, "circle"),
            (MarkShape::Square, "rect"),
            (MarkShape::Diamond, "polygon"),
            (MarkShape::Hexagon, "polygon"),
            (MarkShape::Line, "line"),
        ] {
            let settings = Settings {
                mark_shape: shape,
                ..dots(50.0, 6.0)
            };
            let text = export_svg(&image, &settings, 1, false);
            let doc = roxmltree::Document::parse(&text).unwrap();
            let els = elements(&doc);
            assert!(!els.is_empty());
            assert!(els.iter().all(|n| n.tag_name().name() == name), "{shape:?}");
        }
    }

    #[test]
    fn transparent_blocks_are_skipped() {
        let image = SourceImage::solid(60, 60, Srgb::WHITE);
        let settings = Settings {
            draw_source: false,
            ..dots(50.0, 0.0)
        };
        let text = export_svg(&image, &settings, 1, true);
        let doc = roxmltree::Document::parse(&text).unwrap();
        assert!(elements(&doc).is_empty());
    }

    #[test]
    fn empty_image_gives_an_empty_document() {
        let text = export_svg(&SourceImage::empty(), &Settings::default(), 3, false);
        let doc = roxmltree::Document::parse(&text).unwrap();
        let root = doc.root_element();
        assert_eq!(root.attribute("width"), Some("0"));
        assert_eq!(root.attribute("height"), Some("0"));
        assert!(elements(&doc).is_empty());
    }

    #[test]
    fn num_trims_and_rounds() {
        assert_eq!(num(20.0), "20");
        assert_eq!(num(1.23456), "1.23");
        assert_eq!(num(-0.001), "0");
    }
}
