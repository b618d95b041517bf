//! Output surface and blend modes.
//!
//! A [`Surface`] owns the RGBA pixel buffer a render writes into. It may be
//! empty (zero-sized), which is how a render of a missing image ends up.
//! Pixels are stored premultiplied (tiny-skia's layout); [`Surface::to_rgba8`]
//! hands out straight alpha for encoders.

use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;

use crate::color::Srgb;
use crate::error::HalftoneError;

/// Raster composite operation used when drawing a mark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
}

impl BlendMode {
    pub const ALL: [BlendMode; 13] = [
        BlendMode::Normal,
        BlendMode::Additive,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::ColorDodge,
        BlendMode::ColorBurn,
        BlendMode::HardLight,
        BlendMode::SoftLight,
        BlendMode::Difference,
        BlendMode::Exclusion,
    ];

    /// The equivalent tiny-skia blend mode.
    pub fn to_skia(self) -> tiny_skia::BlendMode {
        match self {
            BlendMode::Normal => tiny_skia::BlendMode::SourceOver,
            BlendMode::Additive => tiny_skia::BlendMode::Plus,
            BlendMode::Multiply => tiny_skia::BlendMode::Multiply,
            BlendMode::Screen => tiny_skia::BlendMode::Screen,
            BlendMode::Overlay => tiny_skia::BlendMode::Overlay,
            BlendMode::Darken => tiny_skia::BlendMode::Darken,
            BlendMode::Lighten => tiny_skia::BlendMode::Lighten,
            BlendMode::ColorDodge => tiny_skia::BlendMode::ColorDodge,
            BlendMode::ColorBurn => tiny_skia::BlendMode::ColorBurn,
            BlendMode::HardLight => tiny_skia::BlendMode::HardLight,
            BlendMode::SoftLight => tiny_skia::BlendMode::SoftLight,
            BlendMode::Difference => tiny_skia::BlendMode::Difference,
            BlendMode::Exclusion => tiny_skia::BlendMode::Exclusion,
        }
    }
}

/// A compositing surface, possibly empty.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    pixmap: Option<Pixmap>,
}

impl Surface {
    /// Creates a transparent surface of the given size.
    ///
    /// Returns `HalftoneError::InvalidDimensions` if width or height is zero
    /// or the pixel count overflows.
    pub fn new(width: u32, height: u32) -> Result<Self, HalftoneError> {
        if width == 0 || height == 0 {
            return Err(HalftoneError::InvalidDimensions);
        }
        let pixmap = Pixmap::new(width, height).ok_or(HalftoneError::InvalidDimensions)?;
        Ok(Self {
            pixmap: Some(pixmap),
        })
    }

    /// A zero-sized surface.
    pub fn empty() -> Self {
        Self { pixmap: None }
    }

    /// Resizes to `width` x `height` and clears to transparent.
    ///
    /// A zero dimension leaves the surface empty.
    pub fn reset(&mut self, width: u32, height: u32) -> Result<(), HalftoneError> {
        if width == 0 || height == 0 {
            self.pixmap = None;
            return Ok(());
        }
        let same_size = self
            .pixmap
            .as_ref()
            .is_some_and(|p| p.width() == width && p.height() == height);
        if same_size {
            self.clear();
        } else {
            self.pixmap = Some(Pixmap::new(width, height).ok_or(HalftoneError::InvalidDimensions)?);
        }
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.pixmap.as_ref().map_or(0, Pixmap::width)
    }

    pub fn height(&self) -> u32 {
        self.pixmap.as_ref().map_or(0, Pixmap::height)
    }

    pub fn is_empty(&self) -> bool {
        self.pixmap.is_none()
    }

    /// Clears every pixel to transparent.
    pub fn clear(&mut self) {
        if let Some(p) = self.pixmap.as_mut() {
            p.fill(tiny_skia::Color::TRANSPARENT);
        }
    }

    /// Fills every pixel with an opaque color.
    pub fn fill(&mut self, color: Srgb) {
        if let Some(p) = self.pixmap.as_mut() {
            p.fill(color.to_skia(1.0));
        }
    }

    /// Raw premultiplied RGBA bytes, row-major. Empty for an empty surface.
    pub fn data(&self) -> &[u8] {
        self.pixmap.as_ref().map(|p| p.data()).unwrap_or(&[])
    }

    /// Straight-alpha RGBA of one pixel, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.as_ref()?.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Straight-alpha RGBA buffer of length `width * height * 4`.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let Some(p) = self.pixmap.as_ref() else {
            return Vec::new();
        };
        p.pixels()
            .iter()
            .flat_map(|px| {
                let c = px.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    pub(crate) fn pixmap_mut(&mut self) -> Option<&mut Pixmap> {
        self.pixmap.as_mut()
    }
}
