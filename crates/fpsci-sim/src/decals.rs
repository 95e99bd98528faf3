//! Impact decals and target explosions.

use glam::Vec3;
use std::collections::VecDeque;
use tracing::trace;

/// A mark left where a shot struck.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decal {
    /// World position
    pub position: Vec3,
    /// Surface normal the decal faces along
    pub normal: Vec3,
    /// Whether the shot hit a target
    pub hit: bool,
}

/// Live hit and miss decals.
///
/// Only one hit decal exists at a time and it disappears after a short
/// duration. Miss decals persist but only the most recent few are kept.
#[derive(Debug, Clone)]
pub struct DecalSet {
    hit: Option<(Decal, f32)>,
    misses: VecDeque<Decal>,
    hit_duration: f32,
    max_misses: usize,
}

impl DecalSet {
    /// Create an empty set.
    #[must_use]
    pub fn new(hit_duration: f32, max_misses: usize) -> Self {
        Self {
            hit: None,
            misses: VecDeque::with_capacity(max_misses),
            hit_duration,
            max_misses,
        }
    }

    /// Place a decal, replacing the hit decal or evicting the oldest miss.
    pub fn place(&mut self, position: Vec3, normal: Vec3, hit: bool) {
        let decal = Decal { position, normal, hit };
        if hit {
            self.hit = Some((decal, self.hit_duration));
            return;
        }
        if self.max_misses == 0 {
            return;
        }
        while self.misses.len() >= self.max_misses {
            self.misses.pop_front();
        }
        self.misses.push_back(decal);
    }

    /// Age the hit decal by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let expired = match &mut self.hit {
            Some((_, remaining)) => {
                *remaining -= dt;
                *remaining <= 0.0
            },
            None => false,
        };
        if expired {
            trace!("Hit decal expired");
            self.hit = None;
        }
    }

    /// Current hit decal.
    #[must_use]
    pub fn hit_decal(&self) -> Option<&Decal> {
        self.hit.as_ref().map(|(decal, _)| decal)
    }

    /// Miss decals, oldest first.
    pub fn miss_decals(&self) -> impl Iterator<Item = &Decal> {
        self.misses.iter()
    }

    /// Number of live decals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.misses.len() + usize::from(self.hit.is_some())
    }

    /// Whether no decals are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An explosion playing where a target was destroyed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Explosion {
    /// World position
    pub position: Vec3,
    /// Size relative to the destroyed target
    pub scale: f32,
    /// Seconds left to play
    pub remaining: f32,
}

/// Fixed ring of explosion slots. Spawning past capacity overwrites the
/// oldest slot.
#[derive(Debug, Clone)]
pub struct ExplosionPool {
    slots: Vec<Option<Explosion>>,
    next: usize,
    duration: f32,
}

impl ExplosionPool {
    /// Create a pool of `capacity` slots.
    #[must_use]
    pub fn new(capacity: usize, duration: f32) -> Self {
        Self {
            slots: vec![None; capacity],
            next: 0,
            duration,
        }
    }

    /// Start an explosion. Returns the slot used, or `None` for an empty pool.
    pub fn spawn(&mut self, position: Vec3, scale: f32) -> Option<usize> {
        if self.slots.is_empty() {
            return None;
        }
        let slot = self.next;
        self.slots[slot] = Some(Explosion {
            position,
            scale,
            remaining: self.duration,
        });
        self.next = (self.next + 1) % self.slots.len();
        Some(slot)
    }

    /// Age every explosion by `dt` seconds, freeing finished slots.
    pub fn tick(&mut self, dt: f32) {
        for slot in &mut self.slots {
            let finished = match slot {
                Some(explosion) => {
                    explosion.remaining -= dt;
                    explosion.remaining <= 0.0
                },
                None => false,
            };
            if finished {
                *slot = None;
            }
        }
    }

    /// Playing explosions.
    pub fn active(&self) -> impl Iterator<Item = &Explosion> {
        self.slots.iter().flatten()
    }

    /// Number of playing explosions.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Total slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
