//! Weapon fire control.
//!
//! This module provides:
//! - Aim-ray fire resolution against targets and scene geometry
//! - Bullet spawning into the shared projectile collection
//! - Fire period and damage scaling
//! - Firing/scoped state with edge-triggered fire audio

use crate::assets::{AssetLoader, Model, DEFAULT_VIEW_MODEL};
use crate::audio::{AudioChannel, AudioDevice, Sound};
use crate::camera::{CameraView, SharedCamera};
use crate::config::{UserConfig, WeaponConfig};
use crate::entity::{Posable, Spatial, Surface};
use crate::projectile::{Projectile, SharedProjectiles};
use crate::scene::Scene;
use crate::target::{nearest_hit, Hittable};
use fpsci_common::{BulletId, EntityId, Frame, HitInfo, SimResult};
use glam::Vec2;
use std::sync::Arc;
use tracing::{debug, info};

/// A target struck by a shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetHit {
    /// Index into the target slice passed to [`Weapon::fire`]
    pub index: usize,
    /// Target identifier
    pub id: EntityId,
    /// Surface data at the hit point
    pub info: HitInfo,
}

impl TargetHit {
    /// Distance from the camera to the hit point.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.info.distance
    }
}

/// Result of resolving a shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireOutcome {
    /// A target was the nearest thing along the aim ray.
    Hit(TargetHit),
    /// No target was hit. `surface` is the scene geometry struck instead, if any.
    Miss {
        /// Scene surface for the miss decal
        surface: Option<HitInfo>,
    },
}

impl FireOutcome {
    /// Whether a target was hit.
    #[must_use]
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// The hit target, if any.
    #[must_use]
    pub fn target(&self) -> Option<&TargetHit> {
        match self {
            Self::Hit(hit) => Some(hit),
            Self::Miss { .. } => None,
        }
    }

    /// Surface data of whatever stopped the shot.
    #[must_use]
    pub fn hit_info(&self) -> Option<HitInfo> {
        match self {
            Self::Hit(hit) => Some(hit.info),
            Self::Miss { surface } => *surface,
        }
    }

    /// Distance to whatever stopped the shot.
    #[must_use]
    pub fn distance(&self) -> Option<f32> {
        self.hit_info().map(|info| info.distance)
    }
}

/// Models and sounds a weapon needs, resolved at load time.
#[derive(Clone)]
pub struct WeaponResources {
    /// View model drawn at the camera
    pub view_model: Arc<Model>,
    /// Model drawn for each bullet
    pub bullet_model: Arc<Model>,
    /// Fire sound
    pub fire_sound: Arc<dyn Sound>,
}

impl std::fmt::Debug for WeaponResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeaponResources")
            .field("view_model", &self.view_model)
            .field("bullet_model", &self.bullet_model)
            .finish_non_exhaustive()
    }
}

impl WeaponResources {
    /// Load every resource named by `config`. Missing assets are fatal.
    pub fn load(
        config: &WeaponConfig,
        assets: &dyn AssetLoader,
        audio: &dyn AudioDevice,
    ) -> SimResult<Self> {
        let model_name = if config.model.is_empty() {
            DEFAULT_VIEW_MODEL
        } else {
            config.model.as_str()
        };
        let view_model = assets.load_model(model_name)?;

        let bullet_model = Arc::new(
            Model::from_asset(view_model.source.clone())
                .with_scale(config.bullet_scale)
                .with_emissive(config.bullet_color),
        );

        let sound = assets.load_sound(&config.fire_sound)?;
        let fire_sound = audio.create_sound(&sound, config.is_laser())?;

        info!("Loaded weapon resources ({model_name}, {})", config.fire_sound);
        Ok(Self {
            view_model,
            bullet_model,
            fire_sound,
        })
    }
}

/// A player weapon.
pub struct Weapon {
    config: Arc<WeaponConfig>,
    resources: WeaponResources,
    fire_audio: Option<Box<dyn AudioChannel>>,
    last_bullet_id: u32,
    last_fire_time: Option<f64>,
    scoped: bool,
    firing: bool,
    camera: SharedCamera,
    scene: Arc<Scene>,
    projectiles: SharedProjectiles,
}

impl std::fmt::Debug for Weapon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Weapon")
            .field("config", &self.config)
            .field("last_bullet_id", &self.last_bullet_id)
            .field("scoped", &self.scoped)
            .field("firing", &self.firing)
            .field("scene", &self.scene.name())
            .finish_non_exhaustive()
    }
}

impl Weapon {
    /// Create a weapon, loading its models and sounds.
    ///
    /// `projectiles` is the collection bullets are spawned into; the caller
    /// keeps its own handle and advances it every tick.
    pub fn new(
        config: WeaponConfig,
        assets: &dyn AssetLoader,
        audio: &dyn AudioDevice,
        camera: SharedCamera,
        scene: Arc<Scene>,
        projectiles: SharedProjectiles,
    ) -> SimResult<Self> {
        let resources = WeaponResources::load(&config, assets, audio)?;
        Ok(Self::with_resources(config, resources, camera, scene, projectiles))
    }

    /// Create a weapon from already loaded resources. `config` is clamped
    /// with [`WeaponConfig::validate`].
    #[must_use]
    pub fn with_resources(
        mut config: WeaponConfig,
        resources: WeaponResources,
        camera: SharedCamera,
        scene: Arc<Scene>,
        projectiles: SharedProjectiles,
    ) -> Self {
        config.validate();
        Self {
            config: Arc::new(config),
            resources,
            fire_audio: None,
            last_bullet_id: 0,
            last_fire_time: None,
            scoped: false,
            firing: false,
            camera,
            scene,
            projectiles,
        }
    }

    /// Resolve a shot along the current aim ray.
    ///
    /// The nearest hit wins, whether it is a target or scene geometry.
    /// Targets in `exclude` are ignored.
    pub fn fire<T: Hittable>(&self, targets: &[T], exclude: &[EntityId]) -> FireOutcome {
        let ray = self.camera.read().frame().look_ray();
        let range = self.config.max_range;

        let target = nearest_hit(targets, exclude, |t| t.intersect_ray(&ray, range));
        let surface = self.scene.raycast(&ray, range);

        match (target, surface) {
            (Some((index, info)), surface)
                if surface.map_or(true, |s| info.distance <= s.distance) =>
            {
                FireOutcome::Hit(TargetHit {
                    index,
                    id: targets[index].id(),
                    info,
                })
            },
            (_, surface) => FireOutcome::Miss { surface },
        }
    }

    /// Spawn a bullet for a resolved shot.
    ///
    /// Hit-scan bullets are cosmetic and expire when they reach the point the
    /// shot resolved to. Other bullets fly to full range with collision
    /// enabled and are resolved by the frame loop.
    pub fn spawn_bullet(&mut self, outcome: &FireOutcome) -> Option<BulletId> {
        if self.config.hit_scan && !self.config.render_bullets {
            return None;
        }

        let speed = self.config.bullet_speed;
        let travel = if self.config.hit_scan {
            outcome.distance().unwrap_or(self.config.max_range)
        } else {
            self.config.max_range
        };
        let lifetime = travel / speed;
        if speed <= 0.0 || !lifetime.is_finite() {
            debug!("Bullet speed {speed} cannot cover {travel}m, not spawning");
            return None;
        }

        let aim = self.camera.read().frame();
        self.last_bullet_id += 1;
        let id = BulletId::new(self.last_bullet_id);
        let frame = Frame::looking_along(aim.translation, aim.look_vector());
        let bullet = Projectile::new(frame, speed)
            .with_id(id)
            .with_gravity(self.config.bullet_gravity)
            .with_max_fall_speed(self.config.bullet_max_fall_speed)
            .with_lifetime(lifetime)
            .with_collision(!self.config.hit_scan);
        self.projectiles.lock().push(bullet);

        debug!("Spawned bullet {} (travel {travel:.1}m)", id.raw());
        Some(id)
    }

    /// Whether the fire period has elapsed since the last shot.
    #[must_use]
    pub fn ready_to_fire(&self, now: f64) -> bool {
        self.last_fire_time
            .map_or(true, |last| now - last >= f64::from(self.config.fire_period))
    }

    /// Record a shot at `now`.
    pub fn record_fire(&mut self, now: f64) {
        self.last_fire_time = Some(now);
    }

    /// Damage dealt by one shot, or by one frame of `dt` seconds for a laser.
    #[must_use]
    pub fn damage(&self, dt: f32) -> f32 {
        if self.config.is_laser() {
            self.config.damage_per_second * dt
        } else {
            self.config.damage_per_second * self.config.fire_period
        }
    }

    /// Set the trigger state. Fire audio starts on the press edge and stops
    /// on the release edge; repeating the current state does nothing.
    pub fn set_firing(&mut self, firing: bool) {
        if firing && !self.firing {
            self.fire_audio = Some(self.resources.fire_sound.play());
            debug!("Fire started");
        } else if self.firing && !firing {
            if let Some(mut channel) = self.fire_audio.take() {
                channel.stop();
            }
            debug!("Fire stopped");
        }
        self.firing = firing;
    }

    /// Set the scoped state.
    pub fn set_scoped(&mut self, scoped: bool) {
        self.scoped = scoped;
    }

    /// Whether the trigger is held.
    #[must_use]
    pub const fn firing(&self) -> bool {
        self.firing
    }

    /// Whether the weapon is scoped.
    #[must_use]
    pub const fn scoped(&self) -> bool {
        self.scoped
    }

    /// Turn scale for `user`, reduced while scoped.
    #[must_use]
    pub fn turn_scale(&self, user: &UserConfig) -> Vec2 {
        if self.scoped {
            user.turn_scale * user.scope_turn_scale
        } else {
            user.turn_scale
        }
    }

    /// Replace the config and reload resources. Any playing fire audio is
    /// stopped first.
    pub fn set_config(
        &mut self,
        mut config: WeaponConfig,
        assets: &dyn AssetLoader,
        audio: &dyn AudioDevice,
    ) -> SimResult<()> {
        if let Some(mut channel) = self.fire_audio.take() {
            channel.stop();
        }
        self.firing = false;
        config.validate();
        self.resources = WeaponResources::load(&config, assets, audio)?;
        self.config = Arc::new(config);
        Ok(())
    }

    /// Posed surfaces for the view model and every live bullet.
    #[must_use]
    pub fn pose(&self) -> Vec<Surface> {
        let mut surfaces = Vec::new();
        self.on_pose(&mut surfaces);
        surfaces
    }

    /// Current config.
    #[must_use]
    pub fn config(&self) -> &WeaponConfig {
        &self.config
    }

    /// Set the camera handle.
    pub fn set_camera(&mut self, camera: SharedCamera) {
        self.camera = camera;
    }

    /// Camera handle.
    #[must_use]
    pub fn camera(&self) -> &SharedCamera {
        &self.camera
    }

    /// Set the scene.
    pub fn set_scene(&mut self, scene: Arc<Scene>) {
        self.scene = scene;
    }

    /// Scene the weapon fires into.
    #[must_use]
    pub fn scene(&self) -> &Arc<Scene> {
        &self.scene
    }

    /// Set the projectile collection.
    pub fn set_projectiles(&mut self, projectiles: SharedProjectiles) {
        self.projectiles = projectiles;
    }

    /// Projectile collection handle.
    #[must_use]
    pub fn projectiles(&self) -> &SharedProjectiles {
        &self.projectiles
    }
}

impl Posable for Weapon {
    fn on_pose(&self, surfaces: &mut Vec<Surface>) {
        surfaces.push(Surface {
            model: Arc::clone(&self.resources.view_model),
            frame: self.camera.read().frame(),
        });
        if self.config.render_bullets {
            surfaces.extend(self.projectiles.lock().iter().map(|p| Surface {
                model: Arc::clone(&self.resources.bullet_model),
                frame: p.frame(),
            }));
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::assets::{AssetRef, ManifestAssets};
    use crate::camera::Camera;
    use crate::projectile::shared_projectiles;
    use crate::target::Target;
    use fpsci_common::{Aabb, AssetError, SimError};
    use glam::Vec3;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts play/stop calls across all instances of a sound.
    #[derive(Debug, Default)]
    pub(crate) struct CountingSound {
        pub(crate) plays: Arc<AtomicUsize>,
        pub(crate) stops: Arc<AtomicUsize>,
    }

    struct CountingChannel(Arc<AtomicUsize>);

    impl AudioChannel for CountingChannel {
        fn stop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Sound for CountingSound {
        fn play(&self) -> Box<dyn AudioChannel> {
            self.plays.fetch_add(1, Ordering::SeqCst);
            Box::new(CountingChannel(Arc::clone(&self.stops)))
        }
    }

    pub(crate) fn test_resources(sound: Arc<CountingSound>) -> WeaponResources {
        let model = Arc::new(Model::from_asset(AssetRef {
            name: "model/test.obj".to_string(),
            path: None,
        }));
        WeaponResources {
            view_model: Arc::clone(&model),
            bullet_model: model,
            fire_sound: sound,
        }
    }

    pub(crate) fn test_weapon(
        config: WeaponConfig,
        scene: Scene,
    ) -> (Weapon, Arc<CountingSound>) {
        let sound = Arc::new(CountingSound::default());
        let weapon = Weapon::with_resources(
            config,
            test_resources(Arc::clone(&sound)),
            Camera::default().shared(),
            Arc::new(scene),
            shared_projectiles(),
        );
        (weapon, sound)
    }

    fn target_at(z: f32) -> Target {
        Target::new(Vec3::new(0.0, 0.0, z), 0.5)
    }

    #[test]
    fn test_fire_picks_nearest_target() {
        let (weapon, _) = test_weapon(WeaponConfig::default(), Scene::new("empty"));
        // Targets at distance 5 and 10, farther one enumerated first
        let targets = vec![target_at(-10.5), target_at(-5.5)];

        let outcome = weapon.fire(&targets, &[]);
        let hit = outcome.target().expect("should hit");
        assert_eq!(hit.index, 1);
        assert_eq!(hit.id, targets[1].id());
        assert!((hit.distance() - 5.0).abs() < 1e-4);
        assert!((hit.info.normal - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn test_fire_empty_target_set_is_miss_without_side_effects() {
        let (weapon, sound) = test_weapon(WeaponConfig::default(), Scene::new("empty"));
        let targets: Vec<Target> = Vec::new();

        let outcome = weapon.fire(&targets, &[]);
        assert_eq!(outcome, FireOutcome::Miss { surface: None });
        assert!(!outcome.is_hit());
        assert!(weapon.projectiles().lock().is_empty());
        assert_eq!(sound.plays.load(Ordering::SeqCst), 0);
        assert!(!weapon.firing());
    }

    #[test]
    fn test_fire_wall_blocks_target() {
        let wall = Aabb::from_center_size(Vec3::new(0.0, 0.0, -3.0), Vec3::new(4.0, 4.0, 1.0));
        let scene = Scene::new("walled").with_solid(wall);
        let (weapon, _) = test_weapon(WeaponConfig::default(), scene);
        let targets = vec![target_at(-10.0)];

        let outcome = weapon.fire(&targets, &[]);
        match outcome {
            FireOutcome::Miss { surface: Some(info) } => {
                assert!((info.distance - 2.5).abs() < 1e-4);
            },
            other => panic!("expected wall miss, got {other:?}"),
        }
    }

    #[test]
    fn test_fire_respects_exclusion_and_range() {
        let mut config = WeaponConfig::default();
        config.max_range = 8.0;
        let (weapon, _) = test_weapon(config, Scene::new("empty"));
        let targets = vec![target_at(-5.5), target_at(-10.5)];

        let outcome = weapon.fire(&targets, &[targets[0].id()]);
        assert!(!outcome.is_hit());
    }

    #[test]
    fn test_set_firing_is_edge_triggered() {
        let (mut weapon, sound) = test_weapon(WeaponConfig::default(), Scene::new("empty"));

        weapon.set_firing(true);
        weapon.set_firing(true);
        assert_eq!(sound.plays.load(Ordering::SeqCst), 1);
        assert_eq!(sound.stops.load(Ordering::SeqCst), 0);

        weapon.set_firing(false);
        weapon.set_firing(false);
        assert_eq!(sound.stops.load(Ordering::SeqCst), 1);

        weapon.set_firing(true);
        assert_eq!(sound.plays.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_scope_turn_scale() {
        let (mut weapon, _) = test_weapon(WeaponConfig::default(), Scene::new("empty"));
        let user = UserConfig::default();

        assert_eq!(weapon.turn_scale(&user), Vec2::ONE);
        weapon.set_scoped(true);
        assert!(weapon.scoped());
        assert_eq!(weapon.turn_scale(&user), Vec2::splat(0.5));
    }

    #[test]
    fn test_spawn_hitscan_bullet_lifetime() {
        let (mut weapon, _) = test_weapon(WeaponConfig::default(), Scene::new("empty"));
        let targets = vec![target_at(-50.5)];

        let outcome = weapon.fire(&targets, &[]);
        let id = weapon.spawn_bullet(&outcome).expect("bullets rendered");
        assert_eq!(id.raw(), 1);

        let bullets = weapon.projectiles().lock();
        assert_eq!(bullets.len(), 1);
        // 50m at 100m/s
        assert!((bullets[0].remaining_time() - 0.5).abs() < 1e-4);
        assert!(!bullets[0].collision_enabled());
    }

    #[test]
    fn test_spawn_projectile_weapon_enables_collision() {
        let mut config = WeaponConfig::default();
        config.hit_scan = false;
        config.render_bullets = false;
        let (mut weapon, _) = test_weapon(config, Scene::new("empty"));

        let outcome = FireOutcome::Miss { surface: None };
        assert!(weapon.spawn_bullet(&outcome).is_some());
        assert!(weapon.projectiles().lock()[0].collision_enabled());
    }

    #[test]
    fn test_no_bullets_for_invisible_hitscan() {
        let mut config = WeaponConfig::default();
        config.render_bullets = false;
        let (mut weapon, _) = test_weapon(config, Scene::new("empty"));
        assert!(weapon.spawn_bullet(&FireOutcome::Miss { surface: None }).is_none());
    }

    #[test]
    fn test_fire_period_and_damage() {
        let (mut weapon, _) = test_weapon(WeaponConfig::default(), Scene::new("empty"));
        assert!(weapon.ready_to_fire(0.0));
        weapon.record_fire(1.0);
        assert!(!weapon.ready_to_fire(1.25));
        assert!(weapon.ready_to_fire(1.5));
        assert!((weapon.damage(1.0 / 60.0) - 1.0).abs() < 1e-6);

        let mut laser = WeaponConfig::default();
        laser.fire_period = 0.0;
        laser.auto_fire = true;
        let (weapon, _) = test_weapon(laser, Scene::new("empty"));
        assert!((weapon.damage(0.5) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_create_fails_on_missing_sound() {
        let assets = ManifestAssets::new([DEFAULT_VIEW_MODEL]);
        let result = Weapon::new(
            WeaponConfig::default(),
            &assets,
            &crate::audio::SilentAudio,
            Camera::default().shared(),
            Arc::new(Scene::new("empty")),
            shared_projectiles(),
        );
        assert!(matches!(
            result,
            Err(SimError::Asset(AssetError::SoundNotFound(_)))
        ));
    }

    #[test]
    fn test_zero_speed_spawns_no_bullet() {
        let mut config = WeaponConfig::default();
        config.bullet_speed = 0.0;
        let (mut weapon, _) = test_weapon(config.clone(), Scene::new("empty"));
        let targets = vec![target_at(-10.5)];

        let outcome = weapon.fire(&targets, &[]);
        assert!(outcome.is_hit());
        assert!(weapon.spawn_bullet(&outcome).is_none());

        config.hit_scan = false;
        config.max_range = 0.0;
        let (mut weapon, _) = test_weapon(config, Scene::new("empty"));
        assert!(weapon.spawn_bullet(&FireOutcome::Miss { surface: None }).is_none());
        assert!(weapon.projectiles().lock().is_empty());
    }

    #[test]
    fn test_config_is_clamped_on_construction() {
        let mut config = WeaponConfig::default();
        config.bullet_speed = -50.0;
        config.fire_period = -1.0;
        let (weapon, _) = test_weapon(config, Scene::new("empty"));
        assert_eq!(weapon.config().bullet_speed, 0.0);
        assert_eq!(weapon.config().fire_period, 0.0);
    }

    #[test]
    fn test_set_config_stops_fire_audio_once() {
        let (mut weapon, sound) = test_weapon(WeaponConfig::default(), Scene::new("empty"));
        let assets = ManifestAssets::new([DEFAULT_VIEW_MODEL, "sound/laser.wav"]);
        weapon.set_firing(true);

        let mut laser = WeaponConfig::default();
        laser.fire_period = 0.0;
        laser.auto_fire = true;
        laser.fire_sound = "sound/laser.wav".to_string();
        weapon
            .set_config(laser, &assets, &crate::audio::SilentAudio)
            .expect("laser assets declared");

        assert_eq!(sound.stops.load(Ordering::SeqCst), 1);
        assert!(!weapon.firing());
        assert!(weapon.config().is_laser());

        // Releasing after the reload does not stop the old channel again
        weapon.set_firing(false);
        assert_eq!(sound.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_set_config_reports_missing_assets() {
        let (mut weapon, _) = test_weapon(WeaponConfig::default(), Scene::new("empty"));
        let assets = ManifestAssets::new([DEFAULT_VIEW_MODEL]);

        let result =
            weapon.set_config(WeaponConfig::default(), &assets, &crate::audio::SilentAudio);
        assert!(matches!(
            result,
            Err(SimError::Asset(AssetError::SoundNotFound(_)))
        ));
        assert_eq!(weapon.pose().len(), 1);
    }

    #[test]
    fn test_pose_includes_bullets() {
        let (mut weapon, _) = test_weapon(WeaponConfig::default(), Scene::new("empty"));
        weapon.spawn_bullet(&FireOutcome::Miss { surface: None });

        assert_eq!(weapon.pose().len(), 2);
    }
}
