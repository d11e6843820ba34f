//! Intensity → size / opacity / blur.
//!
//! Size follows a quartic response so the full range spans roughly 16× between
//! half and full intensity. Blur only exists below a fixed threshold.

use serde::{Deserialize, Serialize};

use crate::record::Intensity;

pub const BLUR_THRESHOLD: f32 = 0.7;
/// At or above this, an entity is rendered fully solid.
pub const FULLY_SOLID: f32 = 0.99;
pub const MAX_BLUR: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingParams {
    pub min_size: f32,
    pub max_size: f32,
    pub satellite_size_ratio: f32,
    pub satellite_opacity: f32,
    pub satellite_lighten: f32,
}

impl Default for EncodingParams {
    fn default() -> Self {
        Self {
            min_size: 0.02,
            max_size: 0.40,
            satellite_size_ratio: 0.45,
            satellite_opacity: 0.55,
            satellite_lighten: 0.65,
        }
    }
}

impl EncodingParams {
    pub fn resolve_size(&self, intensity: f32) -> f32 {
        let w = clamp_unit(intensity).powi(4);
        // lerp form keeps both endpoints exact
        self.min_size * (1.0 - w) + self.max_size * w
    }

    pub fn encode(&self, intensity: Intensity) -> Visual {
        let i = intensity.get();
        let size = self.resolve_size(i);
        let opacity = resolve_opacity(i);
        let blur = resolve_blur(i);

        let solid = i >= FULLY_SOLID;
        let blurred = !solid && i < BLUR_THRESHOLD;
        let spread = blur / MAX_BLUR;

        let rendered_size = if blurred {
            size * (1.0 + spread * 1.5)
        } else {
            size
        };
        let rendered_opacity = if solid {
            1.0
        } else if blurred {
            opacity * (0.5 + spread * 0.5)
        } else {
            opacity
        };

        Visual {
            size,
            opacity,
            blur,
            rendered_size,
            rendered_opacity,
        }
    }
}

/// Encoded appearance of one primary entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    pub size: f32,
    pub opacity: f32,
    pub blur: f32,
    /// Size after the blur spread is applied; this is what gets drawn and hit-tested.
    pub rendered_size: f32,
    pub rendered_opacity: f32,
}

pub fn resolve_size(intensity: f32) -> f32 {
    EncodingParams::default().resolve_size(intensity)
}

pub fn resolve_opacity(intensity: f32) -> f32 {
    clamp_unit(intensity)
}

pub fn resolve_blur(intensity: f32) -> f32 {
    let i = clamp_unit(intensity);
    if i >= FULLY_SOLID || i >= BLUR_THRESHOLD {
        return 0.0;
    }
    (BLUR_THRESHOLD - i) / BLUR_THRESHOLD * MAX_BLUR
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
