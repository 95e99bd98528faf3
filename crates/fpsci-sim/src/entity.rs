//! Capability traits implemented by simulated objects.
//!
//! The host engine poses, simulates and queries entities through these
//! traits. Simulation types stay plain data and implement only the
//! capabilities they actually have.

use crate::assets::Model;
use fpsci_common::Frame;
use glam::Vec3;
use std::sync::Arc;

/// Has a position and orientation in the world.
pub trait Spatial {
    /// Current frame.
    fn frame(&self) -> Frame;

    /// Current position.
    fn position(&self) -> Vec3 {
        self.frame().translation
    }
}

/// Advanced once per simulation tick.
pub trait Simulatable {
    /// Advances by `dt` seconds.
    fn on_simulation(&mut self, dt: f32);
}

/// Produces surfaces for the renderer.
pub trait Posable {
    /// Appends this object's surfaces to `surfaces`.
    fn on_pose(&self, surfaces: &mut Vec<Surface>);
}

/// A model placed in the world for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    /// Model to draw
    pub model: Arc<Model>,
    /// Where to draw it
    pub frame: Frame,
}
