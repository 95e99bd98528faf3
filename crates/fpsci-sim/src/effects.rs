//! Timed screen-space feedback.
//!
//! Floating combat text is anchored at a world position, drifts in screen
//! space over its lifetime and fades by a constant factor every frame it is
//! drawn. Whether an effect is still alive is decided by its timer alone; an
//! effect that is off screen or behind the camera stays alive without drawing.

use crate::camera::{CameraView, Viewport};
use crate::config::CombatTextConfig;
use glam::{Vec2, Vec3};

/// Creation time and lifetime of a timed effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectTimer {
    /// Creation time (seconds)
    pub created: f64,
    /// Lifetime (seconds)
    pub timeout: f32,
}

impl EffectTimer {
    /// Create a timer started at `created`.
    #[must_use]
    pub const fn new(created: f64, timeout: f32) -> Self {
        Self { created, timeout }
    }

    /// Seconds since creation.
    #[must_use]
    pub fn elapsed(&self, now: f64) -> f32 {
        (now - self.created) as f32
    }

    /// Whether more than `timeout` seconds have passed.
    #[must_use]
    pub fn is_expired(&self, now: f64) -> bool {
        now - self.created > f64::from(self.timeout)
    }
}

/// 2D text drawing surface.
pub trait TextCanvas {
    /// Draw `text` with its top-left corner at `position` (pixels).
    fn draw_text(
        &mut self,
        text: &str,
        position: Vec2,
        size: f32,
        color: [f32; 4],
        outline: [f32; 4],
    );
}

/// Damage text floating over a hit.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingCombatText {
    text: String,
    position: Vec3,
    timer: EffectTimer,
    size: f32,
    color: [f32; 4],
    outline: [f32; 4],
    offset: Vec3,
    velocity: Vec3,
    fade: f32,
    alpha: f32,
}

impl FloatingCombatText {
    /// Create text at a world position using `style`.
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        position: Vec3,
        style: &CombatTextConfig,
        created: f64,
    ) -> Self {
        Self {
            text: text.into(),
            position,
            timer: EffectTimer::new(created, style.timeout_s),
            size: style.size,
            color: style.color,
            outline: style.outline,
            offset: style.offset,
            velocity: style.velocity,
            fade: style.fade,
            alpha: 1.0,
        }
    }

    /// Draw the text. Returns whether it should be kept.
    pub fn draw(
        &mut self,
        now: f64,
        camera: &dyn CameraView,
        viewport: Viewport,
        canvas: &mut dyn TextCanvas,
    ) -> bool {
        if self.timer.is_expired(now) {
            return false;
        }

        if !camera.is_facing(self.position) {
            return true;
        }

        let Some(screen) = camera.project(self.position, viewport) else {
            return true;
        };

        self.alpha *= self.fade;
        let drift = self.offset + self.velocity * self.timer.elapsed(now);
        let at = screen.truncate() + drift.truncate();

        let mut color = self.color;
        color[3] *= self.alpha;
        let mut outline = self.outline;
        outline[3] *= self.alpha;

        canvas.draw_text(&self.text, at, self.size, color, outline);
        true
    }

    /// Displayed text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// World anchor.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Accumulated fade multiplier.
    #[must_use]
    pub const fn alpha(&self) -> f32 {
        self.alpha
    }
}
