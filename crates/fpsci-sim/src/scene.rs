//! Static scene geometry that blocks shots.

use crate::config::SceneConfig;
use fpsci_common::{Aabb, HitInfo, Intersect, LineSegment, Ray};
use glam::Vec3;
use tracing::debug;

/// Walls and other solid boxes of a trial scene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    name: String,
    spawn: Vec3,
    solids: Vec<Aabb>,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build a scene from its config.
    #[must_use]
    pub fn from_config(name: impl Into<String>, config: &SceneConfig) -> Self {
        let scene = Self {
            name: name.into(),
            spawn: config.spawn,
            solids: config
                .walls
                .iter()
                .map(|w| Aabb::from_center_size(w.center, w.size))
                .collect(),
        };
        debug!("Built scene {} with {} solids", scene.name, scene.solids.len());
        scene
    }

    /// Add a solid box.
    #[must_use]
    pub fn with_solid(mut self, solid: Aabb) -> Self {
        self.solids.push(solid);
        self
    }

    /// Scene name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Player spawn position.
    #[must_use]
    pub const fn spawn(&self) -> Vec3 {
        self.spawn
    }

    /// Solid boxes.
    #[must_use]
    pub fn solids(&self) -> &[Aabb] {
        &self.solids
    }

    /// Nearest solid surface along a ray.
    #[must_use]
    pub fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<HitInfo> {
        Self::nearest(self.solids.iter().filter_map(|s| s.intersect_ray(ray, max_distance)))
    }

    /// Nearest solid surface along a swept segment.
    #[must_use]
    pub fn intersect_segment(&self, segment: &LineSegment) -> Option<HitInfo> {
        Self::nearest(self.solids.iter().filter_map(|s| s.intersect_segment(segment)))
    }

    fn nearest(hits: impl Iterator<Item = HitInfo>) -> Option<HitInfo> {
        hits.min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    #[test]
    fn test_raycast_picks_nearest_wall() {
        let scene = Scene::new("test")
            .with_solid(Aabb::from_center_size(Vec3::new(0.0, 0.0, -30.0), Vec3::ONE))
            .with_solid(Aabb::from_center_size(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE));
        let ray = Ray::from_origin_and_direction(Vec3::ZERO, Vec3::NEG_Z);

        let hit = scene.raycast(&ray, 100.0).expect("hit");
        assert!((hit.distance - 9.5).abs() < 1e-4);
        assert!(scene.raycast(&ray, 5.0).is_none());
    }

    #[test]
    fn test_default_hallway_has_back_wall() {
        let scene = Scene::from_config("FPSci Simple Hallway", &SceneConfig::default());
        assert_eq!(scene.solids().len(), 3);
        assert_eq!(scene.name(), "FPSci Simple Hallway");

        let ray = Ray::from_origin_and_direction(scene.spawn(), Vec3::NEG_Z);
        let hit = scene.raycast(&ray, 1000.0).expect("back wall");
        assert!((hit.distance - 59.5).abs() < 1e-3);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
    }
}
