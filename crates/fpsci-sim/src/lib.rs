//! # FPSci Sim
//!
//! Weapon and hit-feedback simulation for first-person aiming trials.
//!
//! This crate provides:
//! - Projectile kinematics with swept-segment collision
//! - Weapon fire control against targets and scene geometry
//! - Floating combat text, decals and explosions
//! - Camera, audio and asset seams for the host
//! - The per-frame trial loop
//! - TOML configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod assets;
pub mod audio;
pub mod camera;
pub mod config;
pub mod decals;
pub mod effects;
pub mod entity;
pub mod frame_loop;
pub mod projectile;
pub mod scene;
pub mod target;
pub mod timing;
pub mod weapon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::assets::*;
    pub use crate::audio::*;
    pub use crate::camera::*;
    pub use crate::config::*;
    pub use crate::decals::*;
    pub use crate::effects::*;
    pub use crate::entity::*;
    pub use crate::frame_loop::*;
    pub use crate::projectile::*;
    pub use crate::scene::*;
    pub use crate::target::*;
    pub use crate::timing::*;
    pub use crate::weapon::*;
}

pub use prelude::*;
