//! Color type used by settings, palettes and gradient stops.
//!
//! Components are `f64` in [0, 1]. Hex strings are the serialized form, so a
//! settings document can say `"colors": ["#000000", "#ff0044"]`.

use crate::error::HalftoneError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Rec. 601 luma weights.
const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

/// sRGB color with components in [0, 1].
///
/// Serializes as a hex string `"#rrggbb"`. The hex round-trip has 8-bit
/// quantization, which is acceptable since hex colors are inherently 8-bit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Srgb {
    pub const BLACK: Srgb = Srgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const WHITE: Srgb = Srgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Parses a hex color string like "#ff00aa" or "ff00aa" (case insensitive).
    ///
    /// Returns `HalftoneError::InvalidColor` if the input is not a valid 6-digit hex color.
    pub fn from_hex(hex: &str) -> Result<Srgb, HalftoneError> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(HalftoneError::InvalidColor(format!(
                "expected 6 hex digits, got {:?}",
                hex
            )));
        }
        let r = u8::from_str_radix(&hex[0..2], 16)
            .map_err(|e| HalftoneError::InvalidColor(format!("invalid red component: {e}")))?;
        let g = u8::from_str_radix(&hex[2..4], 16)
            .map_err(|e| HalftoneError::InvalidColor(format!("invalid green component: {e}")))?;
        let b = u8::from_str_radix(&hex[4..6], 16)
            .map_err(|e| HalftoneError::InvalidColor(format!("invalid blue component: {e}")))?;
        Ok(Srgb::from_rgb8([r, g, b]))
    }

    /// Converts the color to a hex string like `"#rrggbb"`.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Builds a color from 8-bit channels.
    pub fn from_rgb8([r, g, b]: [u8; 3]) -> Srgb {
        Srgb {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        }
    }

    /// Quantizes to 8-bit channels with rounding.
    pub fn to_rgb8(self) -> [u8; 3] {
        [
            (self.r.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.g.clamp(0.0, 1.0) * 255.0).round() as u8,
            (self.b.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    /// Weighted brightness `0.299R + 0.587G + 0.114B`, in [0, 1].
    pub fn luma(self) -> f64 {
        (LUMA_R * self.r + LUMA_G * self.g + LUMA_B * self.b).clamp(0.0, 1.0)
    }

    /// The 255-complement of every channel.
    pub fn complement(self) -> Srgb {
        let [r, g, b] = self.to_rgb8();
        Srgb::from_rgb8([255 - r, 255 - g, 255 - b])
    }

    /// Converts to a tiny-skia paint color with the given alpha in [0, 1].
    pub fn to_skia(self, alpha: f64) -> tiny_skia::Color {
        let [r, g, b] = self.to_rgb8();
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        tiny_skia::Color::from_rgba8(r, g, b, a)
    }
}

/// Luma of an 8-bit RGB triple, normalized to [0, 1].
pub fn luma8([r, g, b]: [u8; 3]) -> f64 {
    Srgb::from_rgb8([r, g, b]).luma()
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
