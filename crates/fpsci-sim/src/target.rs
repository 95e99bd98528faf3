//! Trial targets and nearest-hit selection.

use crate::config::TargetConfig;
use crate::entity::Spatial;
use fpsci_common::{EntityId, Frame, HitInfo, Intersect, LineSegment, Ray, Sphere};
use glam::Vec3;

/// Something a shot can hit.
pub trait Hittable {
    /// Entity identifier, used for exclusion.
    fn id(&self) -> EntityId;

    /// Whether the entity currently accepts hits.
    fn is_hittable(&self) -> bool {
        true
    }

    /// Nearest intersection along `ray` within `max_distance`.
    fn intersect_ray(&self, ray: &Ray, max_distance: f32) -> Option<HitInfo>;

    /// Nearest intersection along a swept segment.
    fn intersect_segment(&self, segment: &LineSegment) -> Option<HitInfo>;
}

/// Picks the nearest hit among `candidates`, skipping excluded and
/// non-hittable entries. Ties keep the earlier index.
pub fn nearest_hit<T, F>(
    candidates: &[T],
    exclude: &[EntityId],
    mut intersect: F,
) -> Option<(usize, HitInfo)>
where
    T: Hittable,
    F: FnMut(&T) -> Option<HitInfo>,
{
    let mut best: Option<(usize, HitInfo)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        if !candidate.is_hittable() || exclude.contains(&candidate.id()) {
            continue;
        }
        if let Some(info) = intersect(candidate) {
            if best.map_or(true, |(_, b)| info.distance < b.distance) {
                best = Some((index, info));
            }
        }
    }
    best
}

/// Result of applying damage to a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Target survived with the given health.
    Damaged {
        /// Remaining health (0..=1)
        health: f32,
    },
    /// Target was destroyed by this hit.
    Destroyed,
    /// Target was already destroyed.
    Ignored,
}

/// A spherical target with normalized health.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    id: EntityId,
    sphere: Sphere,
    health: f32,
}

impl Target {
    /// Create a full-health target.
    #[must_use]
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            id: EntityId::new(),
            sphere: Sphere::new(position, radius),
            health: 1.0,
        }
    }

    /// Create a target from its scene placement.
    #[must_use]
    pub fn from_config(config: &TargetConfig) -> Self {
        Self::new(config.position, config.radius)
    }

    /// Set identifier.
    #[must_use]
    pub const fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    /// Remaining health (0..=1).
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Collision radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.sphere.radius
    }

    /// Whether the target still stands.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Apply damage.
    pub fn damage(&mut self, amount: f32) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::Ignored;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        if self.is_alive() {
            DamageOutcome::Damaged {
                health: self.health,
            }
        } else {
            DamageOutcome::Destroyed
        }
    }

    /// Index into a material table of `table_size` colors for the current health.
    #[must_use]
    pub fn color_level(&self, table_size: usize) -> usize {
        if table_size == 0 {
            return 0;
        }
        let top = table_size - 1;
        ((self.health.clamp(0.0, 1.0) * top as f32).floor() as usize).min(top)
    }
}

impl Spatial for Target {
    fn frame(&self) -> Frame {
        Frame::from_translation(self.sphere.center)
    }
}

impl Hittable for Target {
    fn id(&self) -> EntityId {
        self.id
    }

    fn is_hittable(&self) -> bool {
        self.is_alive()
    }

    fn intersect_ray(&self, ray: &Ray, max_distance: f32) -> Option<HitInfo> {
        self.sphere.intersect_ray(ray, max_distance)
    }

    fn intersect_segment(&self, segment: &LineSegment) -> Option<HitInfo> {
        self.sphere.intersect_segment(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aim() -> Ray {
        Ray::from_origin_and_direction(Vec3::ZERO, Vec3::NEG_Z)
    }

    #[test]
    fn test_nearest_hit_ignores_enumeration_order() {
        let far = Target::new(Vec3::new(0.0, 0.0, -10.0), 0.5);
        let near = Target::new(Vec3::new(0.0, 0.0, -5.0), 0.5);
        let targets = vec![far, near];

        let (index, info) =
            nearest_hit(&targets, &[], |t| t.intersect_ray(&aim(), 100.0)).expect("hit");
        assert_eq!(index, 1);
        assert!((info.distance - 4.5).abs() < 1e-4);
    }

    #[test]
    fn test_nearest_hit_exclusion() {
        let near = Target::new(Vec3::new(0.0, 0.0, -5.0), 0.5);
        let far = Target::new(Vec3::new(0.0, 0.0, -10.0), 0.5);
        let exclude = [near.id()];
        let targets = vec![near, far];

        let (index, _) =
            nearest_hit(&targets, &exclude, |t| t.intersect_ray(&aim(), 100.0)).expect("hit");
        assert_eq!(index, 1);
    }

    #[test]
    fn test_destroyed_target_is_not_hittable() {
        let mut target = Target::new(Vec3::new(0.0, 0.0, -5.0), 0.5);
        assert_eq!(target.damage(1.0), DamageOutcome::Destroyed);
        assert_eq!(target.damage(1.0), DamageOutcome::Ignored);

        let targets = vec![target];
        assert!(nearest_hit(&targets, &[], |t| t.intersect_ray(&aim(), 100.0)).is_none());
    }

    #[test]
    fn test_damage_and_color_level() {
        let mut target = Target::new(Vec3::ZERO, 1.0);
        assert_eq!(target.color_level(10), 9);

        assert_eq!(target.damage(0.25), DamageOutcome::Damaged { health: 0.75 });
        assert_eq!(target.color_level(10), 6);

        target.damage(0.75);
        assert_eq!(target.color_level(10), 0);
        assert_eq!(target.color_level(0), 0);
    }
}
