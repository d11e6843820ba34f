use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::layout::PositionedEntity;
use crate::record::Ordinal;

/// World-space pick tolerance, matching a point raycast threshold.
pub const DEFAULT_TOLERANCE: f32 = 0.18;
/// Screen-space pick tolerance in pixels.
pub const DEFAULT_SCREEN_TOLERANCE: f32 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    /// Returns `None` for a zero or non-finite direction.
    pub fn new(origin: Vec3, dir: Vec3) -> Option<Self> {
        let dir = dir.try_normalize()?;
        origin.is_finite().then_some(Self { origin, dir })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Distance along the ray to the closest approach, and the
    /// perpendicular distance there. Points behind the origin yield `None`.
    fn closest_approach(&self, p: Vec3) -> Option<(f32, f32)> {
        let t = (p - self.origin).dot(self.dir);
        if t < 0.0 {
            return None;
        }
        Some((t, self.at(t).distance(p)))
    }

    /// Slab test against an axis-aligned box.
    fn hits_box(&self, min: Vec3, max: Vec3) -> bool {
        let mut t_min = 0.0f32;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let o = self.origin[axis];
            let d = self.dir[axis];
            if d.abs() < f32::EPSILON {
                if o < min[axis] || o > max[axis] {
                    return false;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (min[axis] - o) * inv;
            let mut t1 = (max[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    ordinal: Ordinal,
    position: Vec3,
    reach: f32,
}

/// Hit-test index over primary entities. Satellites are not pickable.
///
/// Built once per layout; queries never mutate it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialIndex {
    entries: Vec<Entry>,
    bounds: Option<(Vec3, Vec3)>,
    tolerance: f32,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::build(&[], DEFAULT_TOLERANCE)
    }
}

impl SpatialIndex {
    pub fn build(entities: &[PositionedEntity], tolerance: f32) -> Self {
        let tolerance = tolerance.max(0.0);
        let mut entries: Vec<Entry> = entities
            .iter()
            .filter(|e| e.position.is_finite())
            .map(|e| Entry {
                ordinal: e.ordinal,
                position: e.position,
                reach: tolerance + e.visual.rendered_size.max(0.0) * 0.5,
            })
            .collect();
        entries.sort_by_key(|e| e.ordinal);

        let bounds = entries.iter().fold(None, |acc: Option<(Vec3, Vec3)>, e| {
            let r = Vec3::splat(e.reach);
            let (lo, hi) = (e.position - r, e.position + r);
            Some(match acc {
                Some((min, max)) => (min.min(lo), max.max(hi)),
                None => (lo, hi),
            })
        });

        Self {
            entries,
            bounds,
            tolerance,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn position_of(&self, o: Ordinal) -> Option<Vec3> {
        self.entries
            .binary_search_by_key(&o, |e| e.ordinal)
            .ok()
            .map(|i| self.entries[i].position)
    }

    /// Entity nearest along the ray among those within reach of it.
    /// Equal distances resolve to the lowest ordinal.
    pub fn nearest(&self, ray: &Ray) -> Option<Ordinal> {
        let (min, max) = self.bounds?;
        if !ray.hits_box(min, max) {
            return None;
        }

        let mut best: Option<(f32, Ordinal)> = None;
        for e in &self.entries {
            let Some((t, d)) = ray.closest_approach(e.position) else {
                continue;
            };
            if d > e.reach {
                continue;
            }
            if best.map(|(bt, _)| t < bt).unwrap_or(true) {
                best = Some((t, e.ordinal));
            }
        }
        best.map(|(_, o)| o)
    }

    /// Screen-space variant: `project` maps a world position to viewport
    /// pixels (or `None` when off screen).
    pub fn nearest_screen<F>(&self, cursor: Vec2, tolerance_px: f32, project: F) -> Option<Ordinal>
    where
        F: Fn(Vec3) -> Option<Vec2>,
    {
        let mut best: Option<(f32, Ordinal)> = None;
        for e in &self.entries {
            let Some(screen) = project(e.position) else {
                continue;
            };
            let d = screen.distance(cursor);
            if d < tolerance_px && best.map(|(bd, _)| d < bd).unwrap_or(true) {
                best = Some((d, e.ordinal));
            }
        }
        best.map(|(_, o)| o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Visual;
    use smallvec::SmallVec;

    fn entity(o: u32, position: Vec3) -> PositionedEntity {
        PositionedEntity {
            ordinal: Ordinal(o),
            position,
            angle: 0.0,
            visual: Visual {
                size: 0.0,
                opacity: 1.0,
                blur: 0.0,
                rendered_size: 0.0,
                rendered_opacity: 1.0,
            },
            color: crate::color::Color::NEUTRAL,
            satellites: SmallVec::new(),
        }
    }

    fn down_z(x: f32, y: f32) -> Ray {
        Ray::new(Vec3::new(x, y, 10.0), Vec3::new(0.0, 0.0, -1.0)).unwrap()
    }

    #[test]
    fn empty_index_never_hits() {
        let idx = SpatialIndex::build(&[], DEFAULT_TOLERANCE);
        assert!(idx.is_empty());
        assert_eq!(idx.nearest(&down_z(0.0, 0.0)), None);
    }

    #[test]
    fn hit_within_tolerance_miss_outside() {
        let idx = SpatialIndex::build(&[entity(1, Vec3::ZERO)], 0.18);
        assert_eq!(idx.nearest(&down_z(0.1, 0.0)), Some(Ordinal(1)));
        assert_eq!(idx.nearest(&down_z(0.5, 0.0)), None);
    }

    #[test]
    fn closest_along_ray_wins() {
        let idx = SpatialIndex::build(
            &[entity(1, Vec3::new(0.0, 0.0, -2.0)), entity(2, Vec3::new(0.0, 0.0, 2.0))],
            0.18,
        );
        assert_eq!(idx.nearest(&down_z(0.0, 0.0)), Some(Ordinal(2)));
    }

    #[test]
    fn ties_go_to_lowest_ordinal() {
        // same depth, mirrored around the ray
        let idx = SpatialIndex::build(
            &[entity(7, Vec3::new(0.05, 0.0, 0.0)), entity(3, Vec3::new(-0.05, 0.0, 0.0))],
            0.18,
        );
        assert_eq!(idx.nearest(&down_z(0.0, 0.0)), Some(Ordinal(3)));
    }

    #[test]
    fn points_behind_origin_are_ignored() {
        let idx = SpatialIndex::build(&[entity(1, Vec3::new(0.0, 0.0, 20.0))], 0.18);
        assert_eq!(idx.nearest(&down_z(0.0, 0.0)), None);
    }

    #[test]
    fn rendered_size_widens_reach() {
        let mut big = entity(1, Vec3::ZERO);
        big.visual.rendered_size = 0.6;
        let idx = SpatialIndex::build(&[big], 0.18);
        assert_eq!(idx.nearest(&down_z(0.4, 0.0)), Some(Ordinal(1)));
    }

    #[test]
    fn degenerate_rays_are_rejected() {
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO).is_none());
        assert!(Ray::new(Vec3::splat(f32::NAN), Vec3::X).is_none());
    }

    #[test]
    fn screen_query_uses_projection() {
        let idx = SpatialIndex::build(
            &[entity(1, Vec3::new(0.0, 0.0, 0.0)), entity(2, Vec3::new(1.0, 0.0, 0.0))],
            0.18,
        );
        let project = |p: Vec3| Some(Vec2::new(p.x * 100.0, p.y * 100.0));
        assert_eq!(idx.nearest_screen(Vec2::new(95.0, 0.0), 18.0, project), Some(Ordinal(2)));
        assert_eq!(idx.nearest_screen(Vec2::new(50.0, 0.0), 18.0, project), None);
        assert_eq!(idx.position_of(Ordinal(2)), Some(Vec3::X));
    }
}
