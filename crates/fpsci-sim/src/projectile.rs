//! Projectile kinematics for fired shots.
//!
//! A projectile flies along its facing direction at a constant speed while a
//! separate downward velocity builds up under gravity until it reaches a cap.
//! Each tick keeps the previous position so collision can be tested against
//! the swept segment instead of a single point, which keeps fast shots from
//! passing through thin targets between frames.
//!
//! # Example
//!
//! ```
//! use fpsci_sim::projectile::Projectile;
//! use fpsci_common::Frame;
//! use glam::Vec3;
//!
//! let frame = Frame::looking_along(Vec3::ZERO, Vec3::NEG_Z);
//! let mut bullet = Projectile::new(frame, 100.0).with_gravity(0.0);
//!
//! bullet.advance(0.1);
//! let segment = bullet.collision_segment();
//! assert_eq!(segment.start, Vec3::ZERO);
//! assert!((segment.end.z + 10.0).abs() < 1e-4);
//! ```

use crate::entity::{Simulatable, Spatial};
use fpsci_common::{BulletId, Frame, LineSegment, Ray, UP};
use glam::Vec3;
use parking_lot::Mutex;
use std::sync::Arc;

/// Default time a projectile stays alive (seconds).
pub const DEFAULT_LIFETIME: f32 = 5.0;

/// Default gravitational acceleration (m/s^2).
pub const DEFAULT_GRAVITY: f32 = 10.0;

/// Default cap on accumulated downward velocity (m/s).
pub const DEFAULT_MAX_FALL_SPEED: f32 = 100.0;

/// Projectile collection shared by the weapon that spawns into it and the
/// frame loop that advances it. Both hold the handle for their whole life.
pub type SharedProjectiles = Arc<Mutex<Vec<Projectile>>>;

/// Creates an empty shared projectile collection.
#[must_use]
pub fn shared_projectiles() -> SharedProjectiles {
    Arc::new(Mutex::new(Vec::new()))
}

/// A single fired shot.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    /// Bullet identifier assigned by the weapon
    pub id: Option<BulletId>,
    frame: Frame,
    last_position: Vec3,
    speed: f32,
    gravity: f32,
    gravity_velocity: f32,
    max_fall_speed: f32,
    remaining: f32,
    collision: bool,
}

impl Projectile {
    /// Create a projectile at `frame` moving along its look vector at `speed`.
    #[must_use]
    pub fn new(frame: Frame, speed: f32) -> Self {
        Self {
            id: None,
            frame,
            last_position: frame.translation,
            speed,
            gravity: DEFAULT_GRAVITY,
            gravity_velocity: 0.0,
            max_fall_speed: DEFAULT_MAX_FALL_SPEED,
            remaining: DEFAULT_LIFETIME,
            collision: false,
        }
    }

    /// Set gravitational acceleration.
    #[must_use]
    pub const fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the cap on accumulated downward velocity.
    #[must_use]
    pub const fn with_max_fall_speed(mut self, max: f32) -> Self {
        self.max_fall_speed = max;
        self
    }

    /// Set remaining lifetime.
    #[must_use]
    pub const fn with_lifetime(mut self, seconds: f32) -> Self {
        self.remaining = seconds;
        self
    }

    /// Enable or disable collision testing.
    #[must_use]
    pub const fn with_collision(mut self, enabled: bool) -> Self {
        self.collision = enabled;
        self
    }

    /// Set bullet identifier.
    #[must_use]
    pub const fn with_id(mut self, id: BulletId) -> Self {
        self.id = Some(id);
        self
    }

    /// Advance by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.remaining -= dt;

        self.gravity_velocity =
            (self.gravity_velocity + self.gravity * dt).min(self.max_fall_speed);

        self.last_position = self.frame.translation;
        let travel = self.frame.look_vector() * self.speed * dt;
        let fall = UP * self.gravity_velocity * dt;
        self.frame = self.frame.translated(travel - fall);
    }

    /// Segment swept during the last tick, from the previous to the current position.
    #[must_use]
    pub fn collision_segment(&self) -> LineSegment {
        LineSegment::from_two_points(self.last_position, self.frame.translation)
    }

    /// Ray from the previous position toward the current one.
    ///
    /// After a tick without movement the direction is zero and the ray is
    /// not actionable.
    #[must_use]
    pub fn collision_ray(&self) -> Ray {
        Ray::toward(self.last_position, self.frame.translation)
    }

    /// Ray from the current position back toward the previous one, used to
    /// orient an impact decal against the surface that was hit.
    #[must_use]
    pub fn decal_ray(&self) -> Ray {
        Ray::toward(self.frame.translation, self.last_position)
    }

    /// Previous and current positions.
    #[must_use]
    pub fn last_two_points(&self) -> (Vec3, Vec3) {
        (self.last_position, self.frame.translation)
    }

    /// Seconds until the projectile expires. May be negative.
    #[must_use]
    pub const fn remaining_time(&self) -> f32 {
        self.remaining
    }

    /// Expire the projectile immediately.
    pub fn clear_remaining_time(&mut self) {
        self.remaining = 0.0;
    }

    /// Whether the projectile has outlived its lifetime.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Whether this projectile takes part in collision testing.
    #[must_use]
    pub const fn collision_enabled(&self) -> bool {
        self.collision
    }

    /// Current accumulated downward velocity.
    #[must_use]
    pub const fn gravity_velocity(&self) -> f32 {
        self.gravity_velocity
    }
}

impl Spatial for Projectile {
    fn frame(&self) -> Frame {
        self.frame
    }
}

impl Simulatable for Projectile {
    fn on_simulation(&mut self, dt: f32) {
        self.advance(dt);
    }
}
