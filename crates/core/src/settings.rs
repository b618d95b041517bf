//! Immutable render settings.
//!
//! A [`Settings`] value fully describes one halftone render. It deserializes
//! from a partial JSON object (missing keys take their defaults) and is never
//! rejected for out-of-range numbers: [`Settings::sanitized`] clamps every
//! field into its documented domain instead.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::color::Srgb;
use crate::error::HalftoneError;
use crate::surface::BlendMode;

/// Lowest accepted frequency. Non-positive or non-finite input falls back to it.
pub const MIN_FREQUENCY: f64 = 1.0;
/// Highest accepted frequency (one mark per canvas unit).
pub const MAX_FREQUENCY: f64 = 1000.0;
/// Lattice spacing at frequency 1.
pub const SPACING_SCALE: f64 = 1000.0;
/// Smallest gamma exponent; zero or negative gammas clamp here.
pub const MIN_GAMMA: f64 = 0.01;
/// Effect position bounds, in percent of the canvas, per axis.
pub const EFFECT_POSITION_MIN: f64 = -100.0;
pub const EFFECT_POSITION_MAX: f64 = 200.0;

/// Geometry of a single mark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkShape {
    #[default]
    Circle,
    Square,
    Diamond,
    Hexagon,
    Line,
    /// Drawn as a circle.
    Custom,
}

impl MarkShape {
    pub const ALL: [MarkShape; 6] = [
        MarkShape::Circle,
        MarkShape::Square,
        MarkShape::Diamond,
        MarkShape::Hexagon,
        MarkShape::Line,
        MarkShape::Custom,
    ];
}

/// Silhouette the whole grid is clipped to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlobalShape {
    Circle,
    Square,
    Diamond,
    Hexagon,
    Triangle,
    Star,
    Heart,
    /// No clipping: the full canvas.
    #[default]
    Custom,
}

impl GlobalShape {
    pub const ALL: [GlobalShape; 8] = [
        GlobalShape::Circle,
        GlobalShape::Square,
        GlobalShape::Diamond,
        GlobalShape::Hexagon,
        GlobalShape::Triangle,
        GlobalShape::Star,
        GlobalShape::Heart,
        GlobalShape::Custom,
    ];
}

/// Directional field that varies mark size across the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,
    #[default]
    Center,
    Radial,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Top,
        Direction::Bottom,
        Direction::Left,
        Direction::Right,
        Direction::Center,
        Direction::Radial,
    ];
}

/// Response curve applied to a normalized value before it becomes a size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mapping {
    #[default]
    Linear,
    Gamma,
    Logarithmic,
    Exponential,
}

impl Mapping {
    pub const ALL: [Mapping; 4] = [
        Mapping::Linear,
        Mapping::Gamma,
        Mapping::Logarithmic,
        Mapping::Exponential,
    ];
}

/// How a mark's color is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Every mark uses `colors[0]`.
    #[default]
    Monochrome,
    /// The sampled pixel's RGB (complemented over the source underlay).
    Channels,
    /// `colors` indexed by sampled brightness.
    Palette,
}

impl ColorMode {
    pub const ALL: [ColorMode; 3] = [
        ColorMode::Monochrome,
        ColorMode::Channels,
        ColorMode::Palette,
    ];
}

/// Which scalar drives mark size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeSource {
    /// Directional influence of the mark's position.
    #[default]
    Position,
    /// Luma of the source pixel under the mark.
    Brightness,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientKind {
    #[default]
    Linear,
    Radial,
}

/// Percentage coordinates of the directional field's focal point.
///
/// `(0, 0)` is the top-left corner and `(100, 100)` the bottom-right; values
/// down to -100 and up to 200 place the focus off-canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectPosition {
    pub x: f64,
    pub y: f64,
}

impl Default for EffectPosition {
    fn default() -> Self {
        Self { x: 50.0, y: 50.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Srgb,
}

/// Background tint composited over the source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gradient {
    pub enabled: bool,
    pub kind: GradientKind,
    /// Direction of a linear gradient in degrees; 0 runs left to right.
    pub angle: f64,
    pub opacity: f64,
    pub stops: Vec<GradientStop>,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            enabled: true,
            kind: GradientKind::Linear,
            angle: 0.0,
            opacity: 0.5,
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: Srgb::BLACK,
                },
                GradientStop {
                    offset: 1.0,
                    color: Srgb::WHITE,
                },
            ],
        }
    }
}

/// Everything one render call needs besides the source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mark_shape: MarkShape,
    pub global_shape: GlobalShape,
    pub direction: Direction,
    pub effect_position: EffectPosition,
    /// Grid rotation in degrees, [0, 180).
    pub angle: f64,
    /// Marks per 1000 canvas units along an axis.
    pub frequency: f64,
    pub size_min: f64,
    pub size_max: f64,
    pub mapping: Mapping,
    /// Exponent used when `mapping` is `gamma`.
    pub gamma: f64,
    pub color_mode: ColorMode,
    pub colors: Vec<Srgb>,
    pub opacity: f64,
    pub blend_mode: BlendMode,
    /// Fraction of the lattice spacing used as positional noise amplitude.
    pub jitter: f64,
    pub seed: i64,
    pub gradient: Option<Gradient>,
    pub size_source: SizeSource,
    /// Flip the raw value (`v -> 1 - v`) before the response curve.
    pub invert: bool,
    /// Draw the source image beneath the marks.
    pub draw_source: bool,
    /// Fill used under the marks when the source is not drawn.
    pub background: Srgb,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mark_shape: MarkShape::Circle,
            global_shape: GlobalShape::Custom,
            direction: Direction::Center,
            effect_position: EffectPosition::default(),
            angle: 0.0,
            frequency: 40.0,
            size_min: 1.0,
            size_max: 12.0,
            mapping: Mapping::Linear,
            gamma: 2.2,
            color_mode: ColorMode::Monochrome,
            colors: vec![Srgb::BLACK],
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            jitter: 0.0,
            seed: 0,
            gradient: None,
            size_source: SizeSource::Position,
            invert: false,
            draw_source: true,
            background: Srgb::WHITE,
        }
    }
}

impl Settings {
    /// Deserializes a (possibly partial) JSON settings object.
    pub fn from_json(value: &Value) -> Result<Self, HalftoneError> {
        Settings::deserialize(value).map_err(|e| HalftoneError::InvalidSettings(e.to_string()))
    }

    /// Frequency clamped to [`MIN_FREQUENCY`, `MAX_FREQUENCY`].
    pub fn effective_frequency(&self) -> f64 {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            MIN_FREQUENCY
        } else {
            self.frequency.clamp(MIN_FREQUENCY, MAX_FREQUENCY)
        }
    }

    /// Lattice spacing in canvas units: `1000 / frequency`.
    pub fn spacing(&self) -> f64 {
        SPACING_SCALE / self.effective_frequency()
    }

    /// Returns a copy with every field inside its documented domain.
    ///
    /// Never fails. Each correction is reported with a `warn!` event.
    pub fn sanitized(&self) -> Settings {
        let mut s = self.clone();

        let frequency = self.effective_frequency();
        if frequency != self.frequency {
            warn!(
                requested = self.frequency,
                effective = frequency,
                "frequency out of range"
            );
        }
        s.frequency = frequency;

        s.size_min = finite_or(self.size_min, 0.0).max(0.0);
        s.size_max = finite_or(self.size_max, 0.0).max(0.0);
        if s.size_min > s.size_max {
            warn!(
                size_min = s.size_min,
                size_max = s.size_max,
                "size_min exceeds size_max, using a constant size"
            );
            s.size_max = s.size_min;
        }

        s.gamma = finite_or(self.gamma, 1.0).max(MIN_GAMMA);
        s.angle = normalize_angle(self.angle);
        s.opacity = finite_or(self.opacity, 1.0).clamp(0.0, 1.0);
        s.jitter = finite_or(self.jitter, 0.0).clamp(0.0, 1.0);
        s.effect_position = EffectPosition {
            x: clamp_effect(self.effect_position.x),
            y: clamp_effect(self.effect_position.y),
        };

        if s.colors.is_empty() {
            warn!("empty color list, falling back to black");
            s.colors = vec![Srgb::BLACK];
        }

        if let Some(gradient) = s.gradient.as_mut() {
            gradient.opacity = finite_or(gradient.opacity, 1.0).clamp(0.0, 1.0);
            gradient.angle = finite_or(gradient.angle, 0.0);
            for stop in &mut gradient.stops {
                stop.offset = finite_or(stop.offset, 0.0).clamp(0.0, 1.0);
            }
            gradient.stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        }

        s
    }

    /// The first configured color, or black when the list is empty.
    pub fn primary_color(&self) -> Srgb {
        self.colors.first().copied().unwrap_or(Srgb::BLACK)
    }

    /// The gradient descriptor when present and enabled.
    pub fn active_gradient(&self) -> Option<&Gradient> {
        self.gradient.as_ref().filter(|g| g.enabled)
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = finite_or(degrees, 0.0).rem_euclid(180.0);
    // rem_euclid rounds tiny negatives up to exactly 180
    if wrapped >= 180.0 {
        0.0
    } else {
        wrapped
    }
}

fn clamp_effect(value: f64) -> f64 {
    finite_or(value, 50.0).clamp(EFFECT_POSITION_MIN, EFFECT_POSITION_MAX)
}
