//! Camera abstraction used for aiming and screen-space feedback.

use fpsci_common::{Frame, UP};
use glam::{Mat4, Vec2, Vec3};
use parking_lot::RwLock;
use std::sync::Arc;

/// Camera shared between the weapon, the frame loop and the host.
pub type SharedCamera = Arc<RwLock<Camera>>;

/// Screen rectangle in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width (pixels)
    pub width: f32,
    /// Height (pixels)
    pub height: f32,
}

impl Viewport {
    /// Creates a viewport.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height.
    #[must_use]
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Center pixel.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// What feedback drawing needs from a camera.
pub trait CameraView {
    /// Current view frame.
    fn frame(&self) -> Frame;

    /// Projects a world point into the viewport.
    ///
    /// Returns `(x, y, depth)` in pixels, or `None` when the point is outside
    /// the view frustum.
    fn project(&self, point: Vec3, viewport: Viewport) -> Option<Vec3>;

    /// Whether `point` lies in the half-space the camera is facing.
    fn is_facing(&self, point: Vec3) -> bool {
        let frame = self.frame();
        frame.look_vector().dot(point - frame.translation) >= 0.0
    }
}

/// Perspective camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Position and orientation
    pub frame: Frame,
    /// Vertical field of view (radians)
    pub fov_y: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            frame: Frame::IDENTITY,
            fov_y: 60f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Camera {
    /// Creates a camera at `frame` with default optics.
    #[must_use]
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            ..Default::default()
        }
    }

    /// Wraps the camera in a shared handle.
    #[must_use]
    pub fn shared(self) -> SharedCamera {
        Arc::new(RwLock::new(self))
    }

    /// Points the camera at a world position.
    pub fn look_at(&mut self, target: Vec3) {
        self.frame = Frame::looking_along(self.frame.translation, target - self.frame.translation);
    }

    /// World-to-clip transform for a viewport.
    #[must_use]
    pub fn view_projection(&self, viewport: Viewport) -> Mat4 {
        let projection = Mat4::perspective_rh(self.fov_y, viewport.aspect(), self.near, self.far);
        let up = self.frame.rotation * UP;
        let view = Mat4::look_to_rh(self.frame.translation, self.frame.look_vector(), up);
        projection * view
    }
}

impl CameraView for Camera {
    fn frame(&self) -> Frame {
        self.frame
    }

    fn project(&self, point: Vec3, viewport: Viewport) -> Option<Vec3> {
        let clip = self.view_projection(viewport) * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || !(0.0..=1.0).contains(&ndc.z) {
            return None;
        }
        Some(Vec3::new(
            (ndc.x + 1.0) * 0.5 * viewport.width,
            (1.0 - ndc.y) * 0.5 * viewport.height,
            ndc.z,
        ))
    }
}
