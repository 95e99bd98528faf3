//! Per-frame orchestration of a trial.
//!
//! The host drives a [`FrameLoop`] through three callbacks:
//! - [`FrameLoop::on_simulation`] once per frame with the real frame delta
//! - [`FrameLoop::on_trigger_pressed`] / [`FrameLoop::on_trigger_released`]
//!   from user input
//! - [`FrameLoop::on_graphics_2d`] while drawing the 2D overlay
//!
//! Every object advanced during a tick sees the same [`TickSnapshot`].

use crate::assets::AssetLoader;
use crate::audio::{AudioDevice, Sound};
use crate::camera::{Camera, CameraView, SharedCamera, Viewport};
use crate::config::SimConfig;
use crate::decals::{DecalSet, ExplosionPool};
use crate::effects::{FloatingCombatText, TextCanvas};
use crate::entity::Spatial;
use crate::projectile::{shared_projectiles, SharedProjectiles};
use crate::scene::Scene;
use crate::target::{nearest_hit, DamageOutcome, Hittable, Target};
use crate::timing::{FrameHistory, SimClock, TickSnapshot};
use crate::weapon::{FireOutcome, Weapon};
use fpsci_common::{Frame, HitInfo, SimResult};
use glam::Vec3;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Running totals for a trial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrialStats {
    /// Shots fired
    pub shots: u32,
    /// Shots or bullets that struck a target
    pub hits: u32,
    /// Shots or bullets that struck scene geometry or nothing at all
    pub misses: u32,
    /// Targets destroyed
    pub destroyed: u32,
    /// Bullets spawned
    pub bullets: u32,
    /// Total damage applied
    pub damage_dealt: f32,
}

impl TrialStats {
    /// Fraction of shots that hit.
    #[must_use]
    pub fn accuracy(&self) -> f32 {
        if self.shots == 0 {
            0.0
        } else {
            self.hits as f32 / self.shots as f32
        }
    }
}

enum Impact {
    Target(usize, HitInfo),
    Surface(HitInfo),
}

/// A running trial: weapon, targets, bullets and hit feedback.
pub struct FrameLoop {
    config: SimConfig,
    clock: SimClock,
    history: FrameHistory,
    last_dt: f32,
    weapon: Weapon,
    projectiles: SharedProjectiles,
    targets: Vec<Target>,
    combat_text: Vec<FloatingCombatText>,
    decals: DecalSet,
    explosions: ExplosionPool,
    destroy_sound: Option<Arc<dyn Sound>>,
    stats: TrialStats,
}

impl std::fmt::Debug for FrameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameLoop")
            .field("now", &self.clock.now())
            .field("weapon", &self.weapon)
            .field("targets", &self.targets.len())
            .field("destroy_sound", &self.destroy_sound.is_some())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl FrameLoop {
    /// Build a trial from config: scene, camera at the spawn point, weapon and targets.
    ///
    /// `config` is clamped with [`SimConfig::validate`] first.
    pub fn from_config(
        mut config: SimConfig,
        assets: &dyn AssetLoader,
        audio: &dyn AudioDevice,
    ) -> SimResult<Self> {
        config.validate();
        let destroy_sound = if config.destroy_sound.is_empty() {
            None
        } else {
            let asset = assets.load_sound(&config.destroy_sound)?;
            Some(audio.create_sound(&asset, false)?)
        };

        let scene = Arc::new(Scene::from_config(config.default_scene_name.clone(), &config.scene));
        let camera = Camera::new(Frame::from_translation(scene.spawn())).shared();
        let weapon = Weapon::new(
            config.weapon.clone(),
            assets,
            audio,
            camera,
            scene,
            shared_projectiles(),
        )?;
        let targets = config.scene.targets.iter().map(Target::from_config).collect();
        let trial = Self::new(config, weapon, targets);
        Ok(match destroy_sound {
            Some(sound) => trial.with_destroy_sound(sound),
            None => trial,
        })
    }

    /// Create a loop around an existing weapon. Bullets are advanced in the
    /// weapon's projectile collection. No destroy sound is played.
    #[must_use]
    pub fn new(mut config: SimConfig, weapon: Weapon, targets: Vec<Target>) -> Self {
        config.validate();
        let projectiles = Arc::clone(weapon.projectiles());
        info!(
            "Starting trial in {} with {} targets",
            weapon.scene().name(),
            targets.len()
        );
        Self {
            clock: SimClock::new(),
            history: FrameHistory::new(config.max_history_frames),
            last_dt: 0.0,
            weapon,
            projectiles,
            targets,
            combat_text: Vec::new(),
            decals: DecalSet::new(config.hit_decal_duration_s, config.miss_decal_count),
            explosions: ExplosionPool::new(config.max_explosions, config.explosion_duration_s),
            destroy_sound: None,
            stats: TrialStats::default(),
            config,
        }
    }

    /// Play `sound` whenever a target is destroyed.
    #[must_use]
    pub fn with_destroy_sound(mut self, sound: Arc<dyn Sound>) -> Self {
        self.destroy_sound = Some(sound);
        self
    }

    /// Advance the trial by one frame of `rdt` seconds.
    pub fn on_simulation(&mut self, rdt: f32) -> TickSnapshot {
        let tick = self.clock.tick(rdt);
        self.last_dt = tick.dt;

        let (impacts, unresolved) = self.advance_projectiles(tick);
        self.stats.misses += unresolved;
        let damage = self.weapon.damage(tick.dt);
        for impact in impacts {
            match impact {
                Impact::Target(index, info) => {
                    self.decals.place(info.position, info.normal, true);
                    self.hit_target(index, info, damage);
                },
                Impact::Surface(info) => {
                    self.stats.misses += 1;
                    self.decals.place(info.position, info.normal, false);
                },
            }
        }

        if self.weapon.firing() && self.weapon.config().auto_fire {
            self.on_trigger(tick.now);
        }

        self.decals.tick(tick.dt);
        self.explosions.tick(tick.dt);
        self.history.push(tick.dt);
        tick
    }

    /// Move every bullet, collect what collision-enabled bullets struck and
    /// count those that ran out of time without striking anything.
    fn advance_projectiles(&self, tick: TickSnapshot) -> (Vec<Impact>, u32) {
        let scene = self.weapon.scene();
        let mut impacts = Vec::new();
        let mut unresolved = 0;
        let mut projectiles = self.projectiles.lock();

        for projectile in projectiles.iter_mut() {
            projectile.advance(tick.dt);
            if !projectile.collision_enabled() {
                continue;
            }

            let segment = projectile.collision_segment();
            let impact = if segment.is_degenerate() {
                None
            } else {
                let target = nearest_hit(&self.targets, &[], |t| t.intersect_segment(&segment));
                match (target, scene.intersect_segment(&segment)) {
                    (Some((index, info)), surface)
                        if surface.map_or(true, |s| info.distance <= s.distance) =>
                    {
                        Some(Impact::Target(index, info))
                    },
                    (_, Some(mut info)) => {
                        if info.normal == Vec3::ZERO {
                            info.normal = projectile.decal_ray().direction;
                        }
                        Some(Impact::Surface(info))
                    },
                    _ => None,
                }
            };

            match impact {
                Some(impact) => {
                    impacts.push(impact);
                    projectile.clear_remaining_time();
                },
                None if projectile.is_expired() => unresolved += 1,
                None => {},
            }
        }

        let before = projectiles.len();
        projectiles.retain(|p| !p.is_expired());
        let removed = before - projectiles.len();
        if removed > 0 {
            debug!("Removed {removed} expired projectiles");
        }
        (impacts, unresolved)
    }

    /// Trigger pressed. Non-laser weapons fire immediately; auto-fire
    /// weapons keep firing every tick until release.
    pub fn on_trigger_pressed(&mut self) -> Option<FireOutcome> {
        self.weapon.set_firing(true);
        if self.weapon.config().is_laser() {
            None
        } else {
            self.on_trigger(self.clock.now())
        }
    }

    /// Trigger released.
    pub fn on_trigger_released(&mut self) {
        self.weapon.set_firing(false);
    }

    /// Fire one shot at `now` if the fire period allows it.
    ///
    /// Hit-scan shots are resolved immediately. Other weapons only spawn a
    /// bullet, which is resolved as it flies.
    pub fn on_trigger(&mut self, now: f64) -> Option<FireOutcome> {
        if !self.weapon.ready_to_fire(now) {
            return None;
        }
        self.weapon.record_fire(now);
        self.stats.shots += 1;

        let outcome = self.weapon.fire(&self.targets, &[]);
        if self.weapon.spawn_bullet(&outcome).is_some() {
            self.stats.bullets += 1;
        } else if !self.weapon.config().hit_scan {
            debug!("Shot fired without a bullet, counting a miss");
            self.stats.misses += 1;
        }

        if self.weapon.config().hit_scan {
            match outcome {
                FireOutcome::Hit(hit) => {
                    self.decals.place(hit.info.position, hit.info.normal, true);
                    let damage = self.weapon.damage(self.last_dt);
                    self.hit_target(hit.index, hit.info, damage);
                },
                FireOutcome::Miss { surface } => {
                    self.stats.misses += 1;
                    if let Some(info) = surface {
                        self.decals.place(info.position, info.normal, false);
                    }
                },
            }
        }
        Some(outcome)
    }

    /// Apply `damage` to the target at `index`, spawning combat text and,
    /// when it is destroyed, an explosion and the destroy sound.
    pub fn hit_target(&mut self, index: usize, info: HitInfo, damage: f32) -> DamageOutcome {
        let Some(target) = self.targets.get_mut(index) else {
            return DamageOutcome::Ignored;
        };
        let outcome = target.damage(damage);
        match outcome {
            DamageOutcome::Damaged { health } => {
                info!("Hit target {} ({:.0}% health left)", target.id(), health * 100.0);
            },
            DamageOutcome::Destroyed => {
                info!("Destroyed target {}", target.id());
                self.explosions.spawn(target.position(), target.radius());
                if let Some(sound) = &self.destroy_sound {
                    sound.play();
                }
                self.stats.destroyed += 1;
            },
            DamageOutcome::Ignored => return outcome,
        }

        self.stats.hits += 1;
        self.stats.damage_dealt += damage;
        self.combat_text.push(FloatingCombatText::new(
            format!("{:.0}", damage * 100.0),
            info.position,
            &self.config.combat_text,
            self.clock.now(),
        ));
        outcome
    }

    /// Draw combat text, dropping entries that have expired.
    pub fn on_graphics_2d(
        &mut self,
        now: f64,
        camera: &dyn CameraView,
        viewport: Viewport,
        canvas: &mut dyn TextCanvas,
    ) {
        self.combat_text
            .retain_mut(|text| text.draw(now, camera, viewport, canvas));
    }

    /// Material table index for the target at `index`.
    #[must_use]
    pub fn target_color_level(&self, index: usize) -> Option<usize> {
        self.targets
            .get(index)
            .map(|t| t.color_level(self.config.mat_table_size))
    }

    /// Whether every target has been destroyed.
    #[must_use]
    pub fn all_destroyed(&self) -> bool {
        self.targets.iter().all(|t| !t.is_alive())
    }

    /// Current simulation time.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Camera the weapon aims with.
    #[must_use]
    pub fn camera(&self) -> SharedCamera {
        Arc::clone(self.weapon.camera())
    }

    /// The weapon.
    #[must_use]
    pub fn weapon(&self) -> &Weapon {
        &self.weapon
    }

    /// The weapon, mutably.
    pub fn weapon_mut(&mut self) -> &mut Weapon {
        &mut self.weapon
    }

    /// Targets.
    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Number of live projectiles.
    #[must_use]
    pub fn projectile_count(&self) -> usize {
        self.projectiles.lock().len()
    }

    /// Live combat text.
    #[must_use]
    pub fn combat_text(&self) -> &[FloatingCombatText] {
        &self.combat_text
    }

    /// Decals.
    #[must_use]
    pub fn decals(&self) -> &DecalSet {
        &self.decals
    }

    /// Explosions.
    #[must_use]
    pub fn explosions(&self) -> &ExplosionPool {
        &self.explosions
    }

    /// Frame duration history.
    #[must_use]
    pub fn history(&self) -> &FrameHistory {
        &self.history
    }

    /// Trial totals.
    #[must_use]
    pub fn stats(&self) -> TrialStats {
        self.stats
    }

    /// Config the trial was built from.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
