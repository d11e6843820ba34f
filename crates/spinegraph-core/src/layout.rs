use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::f32::consts::PI;
use thiserror::Error;

use crate::color::{resolve_color, Color};
use crate::encoding::{EncodingParams, Visual};
use crate::record::{Ordinal, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Helix,
    GoldenAngle,
}

impl StrategyKind {
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "helix" => Some(Self::Helix),
            "golden" | "golden_angle" | "golden-angle" => Some(Self::GoldenAngle),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Helix => "helix",
            Self::GoldenAngle => "golden_angle",
        }
    }
}

/// Which way entities progress along the primary axis as the ordinal grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisDirection {
    Ascending,
    Descending,
}

impl AxisDirection {
    /// True when `next` does not step backwards relative to `prev`.
    pub fn is_monotone(self, prev: f32, next: f32) -> bool {
        match self {
            Self::Ascending => prev <= next,
            Self::Descending => prev >= next,
        }
    }
}

/// Supporting geometry the helix wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub center: Vec3,
    pub height: f32,
    /// Uniform scale a renderer applies to the guide model.
    pub scale: f32,
    /// Translation a renderer applies to the scaled model.
    pub model_offset: Vec3,
}

impl Guide {
    pub const REFERENCE_HEIGHT: f32 = 2.5;
    const DROP: f32 = 0.05;

    /// Fits a model's bounding box to `target_height`, centered on the origin.
    pub fn fit(min: Vec3, max: Vec3, target_height: f32) -> Result<Self, GuideError> {
        let size = max - min;
        if !size.is_finite() || size.y <= f32::EPSILON {
            return Err(GuideError::Degenerate { height: size.y });
        }
        if !(target_height.is_finite() && target_height > 0.0) {
            return Err(GuideError::BadTarget(target_height));
        }
        let scale = target_height / size.y;
        let center = (min + max) * 0.5;
        let mut model_offset = -center * scale;
        model_offset.y -= Self::DROP;
        Ok(Self {
            center: Vec3::ZERO,
            height: target_height,
            scale,
            model_offset,
        })
    }

    fn height_ratio(&self) -> f32 {
        if self.height.is_finite() && self.height > 0.0 {
            self.height / Self::REFERENCE_HEIGHT
        } else {
            1.0
        }
    }
}

impl Default for Guide {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            height: Self::REFERENCE_HEIGHT,
            scale: 1.0,
            model_offset: Vec3::new(0.0, -Self::DROP, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GuideError {
    #[error("guide bounding box has no usable height ({height})")]
    Degenerate { height: f32 },
    #[error("guide target height must be positive, got {0}")]
    BadTarget(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelixParams {
    pub angle_step: f32,
    pub radial_base: f32,
    pub radial_jitter: f32,
    pub jitter_freq: f32,
    /// Distance of the top and bottom anchors from the guide center.
    pub half_span: f32,
    pub satellite_ring: f32,
    pub satellite_offset: f32,
    pub satellite_sweep: f32,
    pub satellite_wobble: f32,
}

impl Default for HelixParams {
    fn default() -> Self {
        Self {
            angle_step: PI * 0.38,
            radial_base: 1.3,
            radial_jitter: 0.25,
            jitter_freq: 0.75,
            half_span: 1.4,
            satellite_ring: 1.8,
            satellite_offset: PI * 0.25,
            satellite_sweep: PI * 1.6,
            satellite_wobble: 0.08,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoldenParams {
    pub angle_deg: f32,
    pub top_frac: f32,
    pub bottom_frac: f32,
    pub center_frac: f32,
    pub base_frac: f32,
    pub jitter_frac: f32,
    pub jitter_freq: f32,
    /// World sizes are multiplied by this to get pixel radii.
    pub size_scale: f32,
    pub satellite_ring: f32,
    pub satellite_offset: f32,
    pub satellite_sweep: f32,
}

impl Default for GoldenParams {
    fn default() -> Self {
        Self {
            angle_deg: 137.508,
            top_frac: 0.08,
            bottom_frac: 0.92,
            center_frac: 0.5,
            base_frac: 0.07,
            jitter_frac: 0.04,
            jitter_freq: 0.7,
            size_scale: 60.0,
            satellite_ring: 1.4,
            satellite_offset: 0.4,
            satellite_sweep: PI * 1.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 1400.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub strategy: StrategyKind,
    pub helix: HelixParams,
    pub golden: GoldenParams,
    pub viewport: Viewport,
    pub encoding: EncodingParams,
}

impl LayoutParams {
    pub fn strategy(&self, guide: &Guide) -> Box<dyn LayoutStrategy> {
        match self.strategy {
            StrategyKind::Helix => Box::new(Helix {
                params: self.helix,
                guide: *guide,
            }),
            StrategyKind::GoldenAngle => Box::new(GoldenAngle {
                params: self.golden,
                viewport: self.viewport,
            }),
        }
    }
}

/// Primary placement of one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub position: Vec3,
    pub angle: f32,
}

/// A curve convention: deterministic position from index, monotone along
/// the primary axis, angular spread around it.
pub trait LayoutStrategy {
    fn kind(&self) -> StrategyKind;

    fn axis(&self) -> AxisDirection;

    /// Primary-axis component of a position.
    fn axis_coord(&self, p: Vec3) -> f32 {
        p.y
    }

    /// Factor from encoded sizes to this strategy's units.
    fn size_scale(&self) -> f32 {
        1.0
    }

    fn place(&self, idx: usize, count: usize, ordinal: Ordinal) -> Anchor;

    /// Position of satellite `i` of `count` around `anchor`. `size` is
    /// already in strategy units.
    fn satellite(&self, anchor: &Anchor, size: f32, i: usize, count: usize) -> Vec3;
}

/// Normalized progress along the curve; 0 for a single record.
pub fn curve_t(idx: usize, count: usize) -> f32 {
    if count <= 1 {
        0.0
    } else {
        idx as f32 / (count - 1) as f32
    }
}

/// Golden-angle positions are already viewport pixels, so projecting one
/// to the screen drops the depth.
pub fn viewport_projection(position: Vec3) -> Option<Vec2> {
    position.is_finite().then(|| position.truncate())
}

fn fan_angle(base: f32, offset: f32, sweep: f32, i: usize, count: usize) -> f32 {
    base + offset + (i as f32 / count.max(1) as f32) * sweep
}

/// Helical wrap around a vertical guide, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Helix {
    pub params: HelixParams,
    pub guide: Guide,
}

impl LayoutStrategy for Helix {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Helix
    }

    fn axis(&self) -> AxisDirection {
        AxisDirection::Descending
    }

    fn place(&self, idx: usize, count: usize, _ordinal: Ordinal) -> Anchor {
        let p = &self.params;
        let ratio = self.guide.height_ratio();
        let half = p.half_span * ratio;
        let top = self.guide.center.y + half;
        let bottom = self.guide.center.y - half;

        let t = curve_t(idx, count);
        let y = top - t * (top - bottom);
        let angle = p.angle_step * idx as f32;
        let radius = (p.radial_base + (idx as f32 * p.jitter_freq).sin() * p.radial_jitter) * ratio;

        Anchor {
            position: Vec3::new(
                self.guide.center.x + angle.cos() * radius,
                y,
                self.guide.center.z + angle.sin() * radius,
            ),
            angle,
        }
    }

    fn satellite(&self, anchor: &Anchor, size: f32, i: usize, count: usize) -> Vec3 {
        let p = &self.params;
        let theta = fan_angle(anchor.angle, p.satellite_offset, p.satellite_sweep, i, count);
        let ring = size * p.satellite_ring;
        anchor.position
            + Vec3::new(
                theta.cos() * ring,
                theta.sin() * ring,
                (theta * 0.8).sin() * p.satellite_wobble,
            )
    }
}

/// Golden-angle scatter around a vertical line in viewport space
/// (y grows downward, z is always 0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoldenAngle {
    pub params: GoldenParams,
    pub viewport: Viewport,
}

impl LayoutStrategy for GoldenAngle {
    fn kind(&self) -> StrategyKind {
        StrategyKind::GoldenAngle
    }

    fn axis(&self) -> AxisDirection {
        AxisDirection::Ascending
    }

    fn size_scale(&self) -> f32 {
        self.params.size_scale
    }

    fn place(&self, idx: usize, count: usize, ordinal: Ordinal) -> Anchor {
        let p = &self.params;
        let (w, h) = (self.viewport.width, self.viewport.height);
        let short = w.min(h);
        let top = h * p.top_frac;
        let bottom = h * p.bottom_frac;

        let t = curve_t(idx, count);
        let y = top + t * (bottom - top);
        // f64 keeps the modulo exact for large ordinals
        let degrees = (f64::from(ordinal.0) * f64::from(p.angle_deg)) % 360.0;
        let angle = degrees.to_radians() as f32;
        let offset = short * p.base_frac + short * p.jitter_frac * (idx as f32 * p.jitter_freq).sin();

        Anchor {
            position: Vec3::new(w * p.center_frac + angle.cos() * offset, y, 0.0),
            angle,
        }
    }

    fn satellite(&self, anchor: &Anchor, size: f32, i: usize, count: usize) -> Vec3 {
        let p = &self.params;
        let theta = fan_angle(anchor.angle, p.satellite_offset, p.satellite_sweep, i, count);
        let ring = size * p.satellite_ring;
        anchor.position + Vec3::new(theta.cos() * ring, theta.sin() * ring, 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Satellite {
    pub label: String,
    pub position: Vec3,
    pub size: f32,
    pub opacity: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedEntity {
    pub ordinal: Ordinal,
    pub position: Vec3,
    pub angle: f32,
    pub visual: Visual,
    pub color: Color,
    pub satellites: SmallVec<[Satellite; 4]>,
}

pub fn layout(records: &[Record], params: &LayoutParams, guide: &Guide) -> Vec<PositionedEntity> {
    let strategy = params.strategy(guide);
    layout_with(strategy.as_ref(), records, &params.encoding)
}

/// Places `records` in the order given; callers pass them sorted by ordinal.
pub fn layout_with(
    strategy: &dyn LayoutStrategy,
    records: &[Record],
    encoding: &EncodingParams,
) -> Vec<PositionedEntity> {
    let count = records.len();
    let scale = strategy.size_scale();

    records
        .iter()
        .enumerate()
        .map(|(idx, rec)| {
            let anchor = strategy.place(idx, count, rec.ordinal);
            let mut visual = encoding.encode(rec.intensity);
            visual.size *= scale;
            visual.rendered_size *= scale;

            let color = resolve_color(&rec.category);
            let sat_color = color.lighten(encoding.satellite_lighten);
            let sat_size = visual.size * encoding.satellite_size_ratio;
            let n = rec.secondary.len();
            let satellites = rec
                .secondary
                .iter()
                .enumerate()
                .map(|(i, label)| Satellite {
                    label: label.clone(),
                    position: strategy.satellite(&anchor, visual.size, i, n),
                    size: sat_size,
                    opacity: encoding.satellite_opacity,
                    color: sat_color,
                })
                .collect();

            PositionedEntity {
                ordinal: rec.ordinal,
                position: anchor.position,
                angle: anchor.angle,
                visual,
                color,
                satellites,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Intensity;

    fn records(n: u32) -> Vec<Record> {
        (1..=n)
            .map(|i| {
                Record::new(i, "grief", Intensity::new(i as f32 / n as f32))
                    .with_secondary(["tension", "dread", "suspense"])
            })
            .collect()
    }

    fn params(kind: StrategyKind) -> LayoutParams {
        LayoutParams {
            strategy: kind,
            ..LayoutParams::default()
        }
    }

    #[test]
    fn one_entity_per_record_and_monotone_axis() {
        for kind in [StrategyKind::Helix, StrategyKind::GoldenAngle] {
            let p = params(kind);
            let guide = Guide::default();
            let strategy = p.strategy(&guide);
            for n in [1, 2, 7, 33] {
                let recs = records(n);
                let out = layout(&recs, &p, &guide);
                assert_eq!(out.len(), n as usize);
                for pair in out.windows(2) {
                    let a = strategy.axis_coord(pair[0].position);
                    let b = strategy.axis_coord(pair[1].position);
                    assert!(strategy.axis().is_monotone(a, b), "{kind:?}: {a} -> {b}");
                }
            }
        }
    }

    #[test]
    fn helix_endpoints_match_anchors() {
        let p = params(StrategyKind::Helix);
        let out = layout(&records(33), &p, &Guide::default());
        assert!((out[0].position.y - 1.4).abs() < 1e-5);
        assert!((out[32].position.y + 1.4).abs() < 1e-5);
        // idx 0: angle 0, radius = radial_base
        assert!((out[0].position.x - 1.3).abs() < 1e-5);
        assert!(out[0].position.z.abs() < 1e-5);
    }

    #[test]
    fn single_record_sits_at_top() {
        let p = params(StrategyKind::Helix);
        let out = layout(&records(1), &p, &Guide::default());
        assert_eq!(out.len(), 1);
        assert!((out[0].position.y - 1.4).abs() < 1e-5);
        assert!(out[0].position.is_finite());
    }

    #[test]
    fn layout_is_deterministic() {
        for kind in [StrategyKind::Helix, StrategyKind::GoldenAngle] {
            let p = params(kind);
            let recs = records(33);
            let a = layout(&recs, &p, &Guide::default());
            let b = layout(&recs, &p, &Guide::default());
            assert_eq!(a, b);
        }
    }

    #[test]
    fn empty_input_yields_nothing() {
        let out = layout(&[], &LayoutParams::default(), &Guide::default());
        assert!(out.is_empty());
    }

    #[test]
    fn satellites_fan_out_without_overlap() {
        let p = params(StrategyKind::Helix);
        let out = layout(&records(5), &p, &Guide::default());
        let e = &out[4];
        assert_eq!(e.satellites.len(), 3);
        assert_eq!(e.satellites[0].color, e.color.lighten(0.65));
        for s in &e.satellites {
            assert!((s.size - e.visual.size * 0.45).abs() < 1e-6);
        }
        for i in 0..e.satellites.len() {
            for j in (i + 1)..e.satellites.len() {
                let d = e.satellites[i].position.distance(e.satellites[j].position);
                assert!(d > 1e-3, "satellites {i} and {j} overlap");
            }
        }
        // first satellite sits at the fixed start offset from the entity angle
        let theta = e.angle + PI * 0.25;
        let ring = e.visual.size * 1.8;
        let expected = e.position + Vec3::new(theta.cos() * ring, theta.sin() * ring, (theta * 0.8).sin() * 0.08);
        assert!(e.satellites[0].position.distance(expected) < 1e-5);
    }

    #[test]
    fn golden_angle_uses_viewport_and_pixel_sizes() {
        let mut p = params(StrategyKind::GoldenAngle);
        p.viewport = Viewport {
            width: 1000.0,
            height: 2000.0,
        };
        let out = layout(&records(10), &p, &Guide::default());
        assert!((out[0].position.y - 160.0).abs() < 1e-3);
        assert!((out[9].position.y - 1840.0).abs() < 1e-3);
        assert!(out.iter().all(|e| e.position.z == 0.0));
        // full intensity maps to the 24px maximum radius
        assert!((out[9].visual.size - 24.0).abs() < 1e-3);
    }

    #[test]
    fn guide_fit_scales_and_centers() {
        let g = Guide::fit(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 10.0, 1.0), 2.5).unwrap();
        assert!((g.scale - 0.25).abs() < 1e-6);
        assert!((g.model_offset.y - (-1.25 - 0.05)).abs() < 1e-6);
        assert_eq!(g.center, Vec3::ZERO);

        let flat = Guide::fit(Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0), 2.5);
        assert!(matches!(flat, Err(GuideError::Degenerate { .. })));
    }

    #[test]
    fn taller_guide_stretches_helix() {
        let p = params(StrategyKind::Helix);
        let guide = Guide {
            height: 5.0,
            ..Guide::default()
        };
        let out = layout(&records(3), &p, &guide);
        assert!((out[0].position.y - 2.8).abs() < 1e-5);
    }
}
