//! Mark rasterization.
//!
//! [`outline`] turns a mark into resolution-independent geometry, which the
//! raster path fills with tiny-skia and the SVG exporter writes as vector
//! elements. Coordinates are in image units; [`draw`] scales them to surface
//! pixels.

use std::f64::consts::{FRAC_PI_3, FRAC_PI_4};

use glam::DVec2;
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Stroke, Transform};

use crate::color::Srgb;
use crate::settings::MarkShape;
use crate::surface::{BlendMode, Surface};

/// Stroke width of line marks, in image units.
pub const LINE_WIDTH: f64 = 2.0;
/// Fixed orientation of line marks.
pub const LINE_ANGLE: f64 = FRAC_PI_4;

/// One fully resolved mark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mark {
    pub position: DVec2,
    /// Diameter, side, or length depending on the shape.
    pub size: f64,
    /// Rotation in radians; ignored by circles and lines.
    pub angle: f64,
    pub shape: MarkShape,
    pub color: Srgb,
    pub opacity: f64,
    pub blend_mode: BlendMode,
}

/// Geometry of a mark.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Circle { center: DVec2, radius: f64 },
    Polygon(Vec<DVec2>),
    Segment { from: DVec2, to: DVec2, width: f64 },
}

/// Geometry for `shape` centered on `center`.
///
/// `custom` has no geometry of its own and is drawn as a circle.
pub fn outline(shape: MarkShape, center: DVec2, size: f64, angle: f64) -> Outline {
    let half = size * 0.5;
    let rotation = DVec2::from_angle(angle);
    let place = |p: DVec2| center + rotation.rotate(p);
    match shape {
        MarkShape::Circle | MarkShape::Custom => Outline::Circle {
            center,
            radius: half,
        },
        MarkShape::Square => Outline::Polygon(
            [(-half, -half), (half, -half), (half, half), (-half, half)]
                .into_iter()
                .map(|(x, y)| place(DVec2::new(x, y)))
                .collect(),
        ),
        MarkShape::Diamond => Outline::Polygon(
            [(0.0, -half), (half, 0.0), (0.0, half), (-half, 0.0)]
                .into_iter()
                .map(|(x, y)| place(DVec2::new(x, y)))
                .collect(),
        ),
        MarkShape::Hexagon => Outline::Polygon(
            (0..6)
                .map(|k| place(DVec2::from_angle(k as f64 * FRAC_PI_3) * half))
                .collect(),
        ),
        MarkShape::Line => {
            let reach = DVec2::from_angle(LINE_ANGLE) * half;
            Outline::Segment {
                from: center - reach,
                to: center + reach,
                width: LINE_WIDTH,
            }
        }
    }
}

fn polygon_path(points: &[DVec2]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.close();
    pb.finish()
}

/// Draws one mark onto `surface`, with image units multiplied by `scale`.
///
/// Marks with a non-positive size or a non-finite position draw nothing.
/// Paint state is built per call, so no mark affects the next.
pub fn draw(surface: &mut Surface, mark: &Mark, scale: f64) {
    if !(mark.size > 0.0) || !mark.position.is_finite() || !mark.size.is_finite() {
        return;
    }
    let Some(pixmap) = surface.pixmap_mut() else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color(mark.color.to_skia(mark.opacity));
    paint.anti_alias = true;
    paint.blend_mode = mark.blend_mode.to_skia();
    let transform = Transform::from_scale(scale as f32, scale as f32);

    match outline(mark.shape, mark.position, mark.size, mark.angle) {
        Outline::Circle { center, radius } => {
            if let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32) {
                pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
            }
        }
        Outline::Polygon(points) => {
            if let Some(path) = polygon_path(&points) {
                pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
            }
        }
        Outline::Segment { from, to, width } => {
            let mut pb = PathBuilder::new();
            pb.move_to(from.x as f32, from.y as f32);
            pb.line_to(to.x as f32, to.y as f32);
            if let Some(path) = pb.finish() {
                let stroke = Stroke {
                    width: width as f32,
                    ..Stroke::default()
                };
                pixmap.stroke_path(&path, &paint, &stroke, transform, None);
            }
        }
    }
}
