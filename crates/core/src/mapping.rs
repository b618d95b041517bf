//! Value mapping: raw scalars to mark sizes and colors.
//!
//! A raw value in [0, 1] comes either from the directional field at the
//! mark's position or from the brightness of the source pixel under it
//! ([`SizeSource`]). It passes through a response curve and is then
//! interpolated into `[size_min, size_max]`.

use glam::DVec2;

use crate::color::Srgb;
use crate::geometry::directional_influence;
use crate::sampler::Sampler;
use crate::settings::{ColorMode, Mapping, Settings, SizeSource, MIN_GAMMA};

/// Which drawing pass a color is resolved for.
///
/// Channel colors are complemented in the effect pass so marks contrast
/// with the source image drawn underneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Base,
    Effect,
}

/// Applies a response curve to `value`, clamped to [0, 1] first.
///
/// `gamma` is only read by [`Mapping::Gamma`]; values below [`MIN_GAMMA`]
/// are raised to it.
pub fn apply_curve(value: f64, mapping: Mapping, gamma: f64) -> f64 {
    let v = if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    };
    match mapping {
        Mapping::Linear => v,
        Mapping::Gamma => v.powf(gamma.max(MIN_GAMMA)),
        Mapping::Logarithmic => (1.0 + 9.0 * v).log10(),
        Mapping::Exponential => v * v,
    }
}

/// Maps a raw value to a mark size in canvas units.
///
/// Total for any settings: negative bounds read as zero and a reversed
/// range collapses to `size_min`.
pub fn map_size(raw: f64, settings: &Settings) -> f64 {
    let lo = non_negative(settings.size_min);
    let hi = non_negative(settings.size_max).max(lo);
    let t = apply_curve(raw, settings.mapping, settings.gamma);
    lo + (hi - lo) * t
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Index into a palette of `len` colors for a brightness in [0, 1].
pub fn palette_index(brightness: f64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let b = if brightness.is_nan() {
        0.0
    } else {
        brightness.clamp(0.0, 1.0)
    };
    ((b * (len - 1) as f64).floor() as usize).min(len - 1)
}

/// Resolves a mark color from the settings and the pixel under the mark.
///
/// `sampled` is `None` when there is no source pixel, in which case the
/// channel mode falls back to the primary color.
pub fn resolve_color(settings: &Settings, sampled: Option<Srgb>, pass: Pass) -> Srgb {
    match settings.color_mode {
        ColorMode::Monochrome => settings.primary_color(),
        ColorMode::Channels => match (sampled, pass) {
            (Some(c), Pass::Base) => c,
            (Some(c), Pass::Effect) => c.complement(),
            (None, _) => settings.primary_color(),
        },
        ColorMode::Palette => {
            let brightness = sampled.map_or(0.0, Srgb::luma);
            settings
                .colors
                .get(palette_index(brightness, settings.colors.len()))
                .copied()
                .unwrap_or(Srgb::BLACK)
        }
    }
}

/// Size and color lookups for one render, in image units.
#[derive(Debug, Clone, Copy)]
pub struct ValueMapper<'a> {
    settings: &'a Settings,
    sampler: Sampler<'a>,
    canvas: DVec2,
}

impl<'a> ValueMapper<'a> {
    pub fn new(settings: &'a Settings, sampler: Sampler<'a>, canvas: DVec2) -> Self {
        Self {
            settings,
            sampler,
            canvas,
        }
    }

    /// Raw value at `position` per [`SizeSource`], inverted if requested.
    pub fn raw_value(&self, position: DVec2) -> f64 {
        let raw = match self.settings.size_source {
            SizeSource::Position => directional_influence(
                position,
                self.canvas,
                self.settings.direction,
                self.settings.effect_position,
            ),
            SizeSource::Brightness => self.sampler.brightness(position),
        };
        if self.settings.invert {
            1.0 - raw
        } else {
            raw
        }
    }

    /// Mark size at `position`.
    pub fn size_at(&self, position: DVec2) -> f64 {
        map_size(self.raw_value(position), self.settings)
    }

    /// Mark color at `position`.
    pub fn color_at(&self, position: DVec2, pass: Pass) -> Srgb {
        resolve_color(self.settings, self.sampler.color(position), pass)
    }
}
