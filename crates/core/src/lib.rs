#![deny(unsafe_code)]
//! Core of the halftone pipeline.
//!
//! Overlays a grid of geometric marks on a raster image. Each mark's size
//! follows either a directional field over the canvas or the brightness of
//! the pixel beneath it; its color is a fixed color, a palette entry, or the
//! pixel itself. Provides `Settings`, the seeded jitter source, global-shape
//! and directional predicates, the lazy `GridGenerator`, `Sampler`,
//! `ValueMapper`, mark rasterization and the `Compositor`.

pub mod color;
pub mod compositor;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod mapping;
pub mod prng;
pub mod raster;
pub mod sampler;
pub mod settings;
pub mod surface;

pub use color::Srgb;
pub use compositor::{render, Compositor, RenderSummary, RenderTarget};
pub use error::HalftoneError;
pub use grid::{GridGenerator, GridPoint};
pub use mapping::{Pass, ValueMapper};
pub use raster::{Mark, Outline};
pub use sampler::{Sampler, SourceImage};
pub use settings::{
    ColorMode, Direction, EffectPosition, GlobalShape, Gradient, GradientKind, GradientStop,
    Mapping, MarkShape, Settings, SizeSource,
};
pub use surface::{BlendMode, Surface};
