//! Geometry primitives for aiming, projectile collision and decal placement.
//!
//! Directions are unit vectors or exactly [`Vec3::ZERO`]. A zero direction
//! marks a degenerate query (for example a projectile that did not move this
//! tick) and callers skip any intersection test that depends on it.

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// World up axis.
pub const UP: Vec3 = Vec3::Y;

/// Smallest direction component treated as non-zero by the slab test.
const SLAB_EPSILON: f32 = 1e-6;

/// Position and orientation of an entity. Looks down `-Z` in local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// World-space position
    pub translation: Vec3,
    /// World-space orientation
    pub rotation: Quat,
}

impl Default for Frame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Frame {
    /// Frame at the origin looking down `-Z`.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Creates a frame from a translation and rotation.
    #[must_use]
    pub const fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Creates an unrotated frame at a position.
    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self::new(translation, Quat::IDENTITY)
    }

    /// Creates a frame at `translation` whose look vector is `direction`,
    /// with no roll.
    ///
    /// A zero direction keeps the identity orientation.
    #[must_use]
    pub fn looking_along(translation: Vec3, direction: Vec3) -> Self {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return Self::from_translation(translation);
        }
        let yaw = (-dir.x).atan2(-dir.z);
        let pitch = dir.y.clamp(-1.0, 1.0).asin();
        Self::from_yaw_pitch(translation, yaw, pitch)
    }

    /// Creates a frame from yaw (about `+Y`) and pitch (about local `+X`),
    /// both in radians.
    #[must_use]
    pub fn from_yaw_pitch(translation: Vec3, yaw: f32, pitch: f32) -> Self {
        Self::new(translation, Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0))
    }

    /// Unit vector the frame is facing.
    #[must_use]
    pub fn look_vector(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Ray from the frame origin along the look vector.
    #[must_use]
    pub fn look_ray(&self) -> Ray {
        Ray::from_origin_and_direction(self.translation, self.look_vector())
    }

    /// Returns this frame moved by `offset`, keeping its orientation.
    #[must_use]
    pub fn translated(self, offset: Vec3) -> Self {
        Self::new(self.translation + offset, self.rotation)
    }
}

/// Half-line with a unit (or zero) direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point
    pub origin: Vec3,
    /// Unit direction, or zero for a degenerate ray
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing `direction`. A zero-length direction stays zero.
    #[must_use]
    pub fn from_origin_and_direction(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Creates a ray starting at `from` pointing toward `to`.
    #[must_use]
    pub fn toward(from: Vec3, to: Vec3) -> Self {
        Self::from_origin_and_direction(from, to - from)
    }

    /// Whether the ray has a direction and can be used for intersection tests.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        self.direction != Vec3::ZERO
    }

    /// Point at distance `t` along the ray.
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Finite segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// First endpoint
    pub start: Vec3,
    /// Second endpoint
    pub end: Vec3,
}

impl LineSegment {
    /// Creates a segment between two points.
    #[must_use]
    pub const fn from_two_points(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Segment length.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Unit direction from start to end, zero when the endpoints coincide.
    #[must_use]
    pub fn direction(&self) -> Vec3 {
        (self.end - self.start).normalize_or_zero()
    }

    /// True when both endpoints coincide.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.direction() == Vec3::ZERO
    }

    /// Ray covering this segment.
    #[must_use]
    pub fn to_ray(&self) -> Ray {
        Ray::toward(self.start, self.end)
    }
}

/// Surface data at an intersection, used to place and orient decals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitInfo {
    /// World-space hit point
    pub position: Vec3,
    /// Outward surface normal at the hit point
    pub normal: Vec3,
    /// Distance from the query origin
    pub distance: f32,
}

/// Anything a ray can be intersected against.
pub trait Intersect {
    /// Nearest non-negative intersection along `ray` no farther than `max_distance`.
    fn intersect_ray(&self, ray: &Ray, max_distance: f32) -> Option<HitInfo>;

    /// Nearest intersection along a segment, measured from its start.
    fn intersect_segment(&self, segment: &LineSegment) -> Option<HitInfo> {
        if segment.is_degenerate() {
            return None;
        }
        self.intersect_ray(&segment.to_ray(), segment.length())
    }
}

/// Sphere collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// Center
    pub center: Vec3,
    /// Radius
    pub radius: f32,
}

impl Sphere {
    /// Creates a sphere.
    #[must_use]
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

impl Intersect for Sphere {
    fn intersect_ray(&self, ray: &Ray, max_distance: f32) -> Option<HitInfo> {
        if !ray.is_actionable() {
            return None;
        }
        let oc = ray.origin - self.center;
        let b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let near = -b - sqrt_d;
        // Origin inside the sphere reports the exit point
        let t = if near >= 0.0 { near } else { -b + sqrt_d };
        if t < 0.0 || t > max_distance {
            return None;
        }

        let position = ray.point_at(t);
        Some(HitInfo {
            position,
            normal: (position - self.center).normalize_or_zero(),
            distance: t,
        })
    }
}

/// Axis-aligned box collider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box from its corners.
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates a box from its center and full size.
    #[must_use]
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self::new(center - half, center + half)
    }

    /// Whether a point lies inside or on the box.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

impl Intersect for Aabb {
    fn intersect_ray(&self, ray: &Ray, max_distance: f32) -> Option<HitInfo> {
        if !ray.is_actionable() {
            return None;
        }
        let dir = ray.direction.to_array();
        let origin = ray.origin.to_array();
        let min = self.min.to_array();
        let max = self.max.to_array();

        // Slab method
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        let mut near_axis = 0;
        for axis in 0..3 {
            let inv = if dir[axis].abs() > SLAB_EPSILON {
                1.0 / dir[axis]
            } else {
                f32::MAX
            };
            let t1 = (min[axis] - origin[axis]) * inv;
            let t2 = (max[axis] - origin[axis]) * inv;
            let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
            if lo > t_near {
                t_near = lo;
                near_axis = axis;
            }
            t_far = t_far.min(hi);
        }

        if t_far < 0.0 || t_near > t_far {
            return None;
        }

        let (t, inside) = if t_near >= 0.0 {
            (t_near, false)
        } else {
            (t_far, true)
        };
        if t > max_distance {
            return None;
        }

        let mut normal = [0.0; 3];
        normal[near_axis] = if dir[near_axis] > 0.0 { -1.0 } else { 1.0 };
        let mut normal = Vec3::from_array(normal);
        if inside {
            normal = -ray.direction;
        }

        Some(HitInfo {
            position: ray.point_at(t),
            normal,
            distance: t,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_frame_look_vector_default() {
        assert!(approx(Frame::IDENTITY.look_vector(), Vec3::NEG_Z));
    }

    #[test]
    fn test_frame_looking_along() {
        let frame = Frame::looking_along(Vec3::ONE, Vec3::new(3.0, 0.0, 0.0));
        assert!(approx(frame.look_vector(), Vec3::X));
        assert_eq!(frame.translation, Vec3::ONE);

        let back = Frame::looking_along(Vec3::ZERO, Vec3::Z);
        assert!(approx(back.look_vector(), Vec3::Z));

        let degenerate = Frame::looking_along(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(degenerate.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_frame_yaw_turns_left() {
        let frame = Frame::from_yaw_pitch(Vec3::ZERO, std::f32::consts::FRAC_PI_2, 0.0);
        assert!(approx(frame.look_vector(), Vec3::NEG_X));
    }

    #[test]
    fn test_zero_direction_ray_is_not_actionable() {
        let ray = Ray::toward(Vec3::ONE, Vec3::ONE);
        assert_eq!(ray.direction, Vec3::ZERO);
        assert!(!ray.is_actionable());
        assert!(!ray.direction.is_nan());
    }

    #[test]
    fn test_segment_degenerate() {
        let seg = LineSegment::from_two_points(Vec3::X, Vec3::X);
        assert!(seg.is_degenerate());
        assert_eq!(seg.length(), 0.0);
        let sphere = Sphere::new(Vec3::X, 1.0);
        assert!(sphere.intersect_segment(&seg).is_none());
    }

    #[test]
    fn test_sphere_hit_front() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0);
        let ray = Ray::from_origin_and_direction(Vec3::ZERO, Vec3::NEG_Z);
        let hit = sphere.intersect_ray(&ray, 100.0).expect("should hit");
        assert!((hit.distance - 9.0).abs() < 1e-4);
        assert!(approx(hit.normal, Vec3::Z));
    }

    #[test]
    fn test_sphere_miss_and_range() {
        let sphere = Sphere::new(Vec3::new(5.0, 0.0, -10.0), 1.0);
        let ray = Ray::from_origin_and_direction(Vec3::ZERO, Vec3::NEG_Z);
        assert!(sphere.intersect_ray(&ray, 100.0).is_none());

        let ahead = Sphere::new(Vec3::new(0.0, 0.0, -10.0), 1.0);
        assert!(ahead.intersect_ray(&ray, 5.0).is_none());
    }

    #[test]
    fn test_sphere_behind_origin_is_ignored() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 10.0), 1.0);
        let ray = Ray::from_origin_and_direction(Vec3::ZERO, Vec3::NEG_Z);
        assert!(sphere.intersect_ray(&ray, 100.0).is_none());
    }

    #[test]
    fn test_segment_hits_thin_target_between_endpoints() {
        // Both endpoints are outside the sphere; only the swept segment touches it.
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -5.0), 0.1);
        let seg = LineSegment::from_two_points(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0));
        let hit = sphere.intersect_segment(&seg).expect("swept hit");
        assert!((hit.distance - 4.9).abs() < 1e-4);

        let short = LineSegment::from_two_points(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        assert!(sphere.intersect_segment(&short).is_none());
    }

    #[test]
    fn test_aabb_hit_normal() {
        let wall = Aabb::from_center_size(Vec3::new(0.0, 0.0, -20.0), Vec3::new(10.0, 10.0, 1.0));
        let ray = Ray::from_origin_and_direction(Vec3::ZERO, Vec3::NEG_Z);
        let hit = wall.intersect_ray(&ray, 100.0).expect("should hit wall");
        assert!((hit.distance - 19.5).abs() < 1e-4);
        assert!(approx(hit.normal, Vec3::Z));
    }

    #[test]
    fn test_aabb_axis_parallel_miss() {
        let wall = Aabb::new(Vec3::new(1.0, -1.0, -30.0), Vec3::new(2.0, 1.0, -10.0));
        let ray = Ray::from_origin_and_direction(Vec3::ZERO, Vec3::NEG_Z);
        assert!(wall.intersect_ray(&ray, 100.0).is_none());
        assert!(wall.contains(Vec3::new(1.5, 0.0, -20.0)));
    }

    proptest! {
        #[test]
        fn prop_ray_direction_is_unit_or_zero(
            x in -100.0f32..100.0,
            y in -100.0f32..100.0,
            z in -100.0f32..100.0,
        ) {
            let ray = Ray::toward(Vec3::ZERO, Vec3::new(x, y, z));
            let len = ray.direction.length();
            prop_assert!(!ray.direction.is_nan());
            prop_assert!(len == 0.0 || (len - 1.0).abs() < 1e-4);
        }

        #[test]
        fn prop_sphere_hit_lies_on_surface(
            offset_x in -0.9f32..0.9,
            offset_y in -0.9f32..0.9,
            depth in 2.0f32..50.0,
        ) {
            let sphere = Sphere::new(Vec3::new(0.0, 0.0, -depth), 1.0);
            let origin = Vec3::new(offset_x, offset_y, 0.0);
            let ray = Ray::from_origin_and_direction(origin, Vec3::NEG_Z);
            if let Some(hit) = sphere.intersect_ray(&ray, 100.0) {
                prop_assert!(((hit.position - sphere.center).length() - 1.0).abs() < 1e-3);
                prop_assert!(hit.distance <= depth);
            }
        }
    }
}
