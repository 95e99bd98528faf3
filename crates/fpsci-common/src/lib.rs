//! # FPSci Common
//!
//! Common types and shared abstractions for the FPSci simulation core.
//!
//! This crate provides foundational types used by the simulation and the app:
//! - Geometry primitives (frames, rays, segments, spheres, boxes)
//! - Hit info records for ray intersection
//! - ID types for entities
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod geometry;
pub mod ids;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::*;
    pub use crate::geometry::*;
    pub use crate::ids::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_entity_id_generation() {
        let id1 = EntityId::new();
        let id2 = EntityId::new();
        assert_ne!(id1, id2);
        assert!(id2.raw() > id1.raw());
    }

    #[test]
    fn test_prelude_exports_geometry() {
        let ray = Ray::from_origin_and_direction(Vec3::ZERO, Vec3::X);
        assert!(ray.is_actionable());
        assert_eq!(ray.point_at(2.0), Vec3::new(2.0, 0.0, 0.0));
    }
}
