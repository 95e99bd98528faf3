//! Identifiers for targets and bullets.
//!
//! Targets draw process-unique ids from a shared counter so a fire query can
//! exclude them by id. Bullets are numbered by the weapon that fires them.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ENTITY: AtomicU64 = AtomicU64::new(1);

/// Identifier of a target or other hittable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Allocates the next unused id.
    #[must_use]
    pub fn new() -> Self {
        Self(NEXT_ENTITY.fetch_add(1, Ordering::Relaxed))
    }

    /// Counter value, increasing in allocation order.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Bullet number, counted per weapon starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BulletId(u32);

impl BulletId {
    /// Wraps a weapon's bullet counter.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The counter value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}
