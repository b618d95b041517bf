//! Full-frame rendering.
//!
//! A render always works in image units: the grid, the directional field and
//! pixel sampling all see the source image's own dimensions. Only the final
//! rasterization is scaled to the surface, so a preview and a 3x export place
//! every mark (including its jitter) at the same relative position.
//!
//! Layer order: background or source image, optional gradient tint, marks.

use glam::DVec2;
use image::RgbaImage;
use tiny_skia::{
    FilterQuality, GradientStop, IntSize, LinearGradient, Paint, Pixmap, PixmapPaint, Point,
    RadialGradient, Rect, SpreadMode, Transform,
};
use tracing::debug;

use crate::error::HalftoneError;
use crate::grid::GridGenerator;
use crate::mapping::{Pass, ValueMapper};
use crate::raster::{self, Mark};
use crate::sampler::SourceImage;
use crate::settings::{Gradient, GradientKind, Settings};
use crate::surface::Surface;

/// Longest side of a preview surface.
pub const PREVIEW_MAX_SIDE: u32 = 1280;
/// Largest export resolution multiplier.
pub const MAX_RESOLUTION: u32 = 3;

/// What a render is for, which decides the surface size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    /// Bounded to [`PREVIEW_MAX_SIDE`], aspect ratio preserved.
    Preview,
    /// Image size times `resolution` (clamped to 1..=3). A transparent
    /// export leaves out the background fill and the gradient.
    Export { resolution: u32, transparent: bool },
}

impl RenderTarget {
    /// Surface size for a `width` x `height` source image.
    pub fn dimensions(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            RenderTarget::Preview => preview_dimensions(width, height),
            RenderTarget::Export { resolution, .. } => {
                let r = resolution.clamp(1, MAX_RESOLUTION);
                (width.saturating_mul(r), height.saturating_mul(r))
            }
        }
    }

    fn transparent(self) -> bool {
        matches!(
            self,
            RenderTarget::Export {
                transparent: true,
                ..
            }
        )
    }
}

/// Fits `width` x `height` inside [`PREVIEW_MAX_SIDE`], never upscaling.
pub fn preview_dimensions(width: u32, height: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= PREVIEW_MAX_SIDE {
        return (width, height);
    }
    let scale = f64::from(PREVIEW_MAX_SIDE) / f64::from(longest);
    let fit = |side: u32| ((f64::from(side) * scale).round() as u32).max(1);
    (fit(width), fit(height))
}

/// What one render produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSummary {
    pub width: u32,
    pub height: u32,
    /// Surface pixels per image unit.
    pub scale: f64,
    /// Lattice spacing in image units.
    pub spacing: f64,
    /// Grid points visited, including marks that drew nothing.
    pub marks: usize,
}

/// Renders `image` with `settings` into `surface`.
///
/// The surface is resized and cleared first. An empty image leaves it
/// empty. Identical inputs produce byte-identical pixels.
pub fn render(
    image: &SourceImage,
    settings: &Settings,
    surface: &mut Surface,
    target: RenderTarget,
) -> Result<RenderSummary, HalftoneError> {
    let settings = settings.sanitized();
    let spacing = settings.spacing();

    if image.is_empty() {
        surface.reset(0, 0)?;
        debug!("empty source image, nothing to render");
        return Ok(RenderSummary {
            width: 0,
            height: 0,
            scale: 1.0,
            spacing,
            marks: 0,
        });
    }

    let (width, height) = target.dimensions(image.width(), image.height());
    surface.reset(width, height)?;
    let scale = f64::from(width) / f64::from(image.width());
    let transparent = target.transparent();

    if settings.draw_source {
        draw_source(surface, image.as_rgba(), width, height)?;
    } else if !transparent {
        surface.fill(settings.background);
    }

    if let Some(gradient) = settings.active_gradient().filter(|_| !transparent) {
        draw_gradient(surface, gradient, width, height);
    }

    let canvas = DVec2::new(f64::from(image.width()), f64::from(image.height()));
    let grid = GridGenerator::new(canvas.x, canvas.y, &settings);
    let mapper = ValueMapper::new(&settings, image.sampler(), canvas);
    let pass = if settings.draw_source {
        Pass::Effect
    } else {
        Pass::Base
    };

    let mut marks = 0;
    for point in grid.iter() {
        let mark = Mark {
            position: point.position,
            size: mapper.size_at(point.position),
            angle: point.angle,
            shape: settings.mark_shape,
            color: mapper.color_at(point.position, pass),
            opacity: settings.opacity,
            blend_mode: settings.blend_mode,
        };
        raster::draw(surface, &mark, scale);
        marks += 1;
    }

    debug!(width, height, scale, spacing, marks, "rendered halftone");
    Ok(RenderSummary {
        width,
        height,
        scale,
        spacing,
        marks,
    })
}

/// Premultiplies a straight-alpha image into a pixmap.
fn source_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())?;
    let mut data = Vec::with_capacity(image.as_raw().len());
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let premultiply = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
        data.extend_from_slice(&[premultiply(r), premultiply(g), premultiply(b), a]);
    }
    Pixmap::from_vec(data, size)
}

fn draw_source(
    surface: &mut Surface,
    image: &RgbaImage,
    width: u32,
    height: u32,
) -> Result<(), HalftoneError> {
    let source = source_pixmap(image).ok_or(HalftoneError::InvalidDimensions)?;
    let Some(pixmap) = surface.pixmap_mut() else {
        return Ok(());
    };
    let sx = width as f32 / image.width() as f32;
    let sy = height as f32 / image.height() as f32;
    let mut paint = PixmapPaint::default();
    // Nearest keeps a 1:1 copy exact.
    paint.quality = if width == image.width() && height == image.height() {
        FilterQuality::Nearest
    } else {
        FilterQuality::Bilinear
    };
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, Transform::from_scale(sx, sy), None);
    Ok(())
}

fn draw_gradient(surface: &mut Surface, gradient: &Gradient, width: u32, height: u32) {
    let Some(pixmap) = surface.pixmap_mut() else {
        return;
    };
    let stops: Vec<GradientStop> = gradient
        .stops
        .iter()
        .map(|s| GradientStop::new(s.offset as f32, s.color.to_skia(gradient.opacity)))
        .collect();
    if stops.is_empty() {
        return;
    }

    let w = width as f32;
    let h = height as f32;
    let center = Point::from_xy(w * 0.5, h * 0.5);
    let shader = match gradient.kind {
        GradientKind::Linear => {
            let (sin, cos) = (gradient.angle as f32).to_radians().sin_cos();
            let reach = (cos.abs() * w + sin.abs() * h) * 0.5;
            LinearGradient::new(
                Point::from_xy(center.x - cos * reach, center.y - sin * reach),
                Point::from_xy(center.x + cos * reach, center.y + sin * reach),
                stops,
                SpreadMode::Pad,
                Transform::identity(),
            )
        }
        GradientKind::Radial => RadialGradient::new(
            center,
            center,
            (w * w + h * h).sqrt() * 0.5,
            stops,
            SpreadMode::Pad,
            Transform::identity(),
        ),
    };
    let (Some(shader), Some(rect)) = (shader, Rect::from_xywh(0.0, 0.0, w, h)) else {
        return;
    };

    let mut paint = Paint::default();
    paint.shader = shader;
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}

/// Owns an output surface across renders.
#[derive(Debug, Default)]
pub struct Compositor {
    surface: Surface,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders into the owned surface, reusing its allocation when the size
    /// is unchanged.
    pub fn render(
        &mut self,
        image: &SourceImage,
        settings: &Settings,
        target: RenderTarget,
    ) -> Result<RenderSummary, HalftoneError> {
        render(image, settings, &mut self.surface, target)
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn into_surface(self) -> Surface {
        self.surface
    }
}
