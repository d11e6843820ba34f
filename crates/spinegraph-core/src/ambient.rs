//! Background particle shell and distance fog.
//!
//! Everything here is a pure function of its inputs: particles are seeded
//! from their index, so two fields built with the same params are equal.
//! The agent only ships `AmbientParams` (`Msg::Ambient`); renderers call
//! `AmbientField::generate` on their side to rebuild the same field.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::color::{Color, Emotion};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientParams {
    pub count: usize,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub point_size: f32,
    pub opacity: f32,
}

impl Default for AmbientParams {
    fn default() -> Self {
        Self {
            count: 1800,
            inner_radius: 7.0,
            outer_radius: 10.5,
            point_size: 0.05,
            opacity: 0.32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub base: Vec3,
    pub color: Color,
    pub phase: [f32; 3],
}

impl Particle {
    pub fn drift(&self, elapsed: f32) -> Vec3 {
        let [s0, s1, s2] = self.phase;
        self.base
            + Vec3::new(
                (elapsed * 0.18 + s0).sin() * 0.18,
                (elapsed * 0.2 + s1).cos() * 0.22,
                (elapsed * 0.16 + s2).sin() * 0.18,
            )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientField {
    pub params: AmbientParams,
    pub particles: Vec<Particle>,
}

impl AmbientField {
    pub fn generate(params: AmbientParams) -> Self {
        let palette: Vec<Color> = Emotion::ALL
            .iter()
            .filter(|e| **e != Emotion::Other)
            .map(|e| e.color())
            .collect();
        let span = (params.outer_radius - params.inner_radius).max(0.0);

        let particles = (0..params.count)
            .map(|i| {
                let mut rng = SplitMix::new(i as u64);
                let radius = params.inner_radius + rng.unit() * span;
                // uniform on the sphere
                let theta = (2.0 * rng.unit() - 1.0).clamp(-1.0, 1.0).acos();
                let phi = rng.unit() * TAU;
                let base = Vec3::new(
                    radius * theta.sin() * phi.cos(),
                    radius * theta.cos(),
                    radius * theta.sin() * phi.sin(),
                );
                let pick = (rng.unit() * palette.len() as f32) as usize;
                let color = palette.get(pick).copied().unwrap_or(Color::WHITE);
                let phase = [rng.unit() * 10.0, rng.unit() * 10.0, rng.unit() * 10.0];
                Particle { base, color, phase }
            })
            .collect();

        Self { params, particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn positions(&self, elapsed: f32) -> Vec<Vec3> {
        self.particles.iter().map(|p| p.drift(elapsed)).collect()
    }
}

impl Default for AmbientField {
    fn default() -> Self {
        Self::generate(AmbientParams::default())
    }
}

/// splitmix64; one stream per particle index.
struct SplitMix(u64);

impl SplitMix {
    fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(0x9e37_79b9_7f4a_7c15) ^ 0x5851_f42d_4c95_7f2d)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1).
    fn unit(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fog {
    pub near: f32,
    pub far: f32,
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            near: 12.0,
            far: 45.0,
        }
    }
}

pub const FOG_EPSILON: f32 = 0.1;

pub fn fog_for_distance(distance: f32) -> Fog {
    let d = if distance.is_finite() { distance.max(0.0) } else { 0.0 };
    Fog {
        near: (d * 0.3).max(0.5),
        far: d * 3.5,
    }
}

/// Tracks the applied fog and only reports meaningful changes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FogTracker {
    current: Fog,
}

impl FogTracker {
    pub fn new(initial: Fog) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> Fog {
        self.current
    }

    pub fn update(&mut self, distance: f32) -> Option<Fog> {
        let next = fog_for_distance(distance);
        let moved = (self.current.near - next.near).abs() > FOG_EPSILON
            || (self.current.far - next.far).abs() > FOG_EPSILON;
        if !moved {
            return None;
        }
        self.current = next;
        Some(next)
    }
}

/// Camera distance to `target`, used to drive the fog.
pub fn camera_distance(eye: Vec3, target: Vec3) -> f32 {
    eye.distance(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_is_deterministic_and_inside_the_shell() {
        let a = AmbientField::default();
        let b = AmbientField::default();
        assert_eq!(a, b);
        assert_eq!(a.len(), 1800);
        for p in &a.particles {
            let r = p.base.length();
            assert!((6.999..10.501).contains(&r), "radius {r}");
            assert!(p.phase.iter().all(|s| (0.0..10.0).contains(s)));
            assert_ne!(p.color, Color::NEUTRAL);
        }
    }

    #[test]
    fn drift_stays_bounded() {
        let field = AmbientField::generate(AmbientParams {
            count: 50,
            ..AmbientParams::default()
        });
        for t in [0.0, 1.0, 37.5, 1000.0] {
            for (p, pos) in field.particles.iter().zip(field.positions(t)) {
                let d = pos - p.base;
                assert!(d.x.abs() <= 0.18 + 1e-4);
                assert!(d.y.abs() <= 0.22 + 1e-4);
                assert!(d.z.abs() <= 0.18 + 1e-4);
            }
        }
    }

    #[test]
    fn fog_scales_with_distance() {
        let fog = fog_for_distance(10.0);
        assert!((fog.near - 3.0).abs() < 1e-5);
        assert!((fog.far - 35.0).abs() < 1e-5);
        assert_eq!(fog_for_distance(1.0).near, 0.5);
        assert_eq!(fog_for_distance(f32::NAN), Fog { near: 0.5, far: 0.0 });
    }

    #[test]
    fn small_fog_changes_are_suppressed() {
        let mut fog = FogTracker::new(fog_for_distance(10.0));
        assert_eq!(fog.update(10.02), None);
        let next = fog.update(12.0).unwrap();
        assert_eq!(next, fog_for_distance(12.0));
        assert_eq!(fog.current(), next);
    }
}
