//! Simulation configuration.
//!
//! Provides the trial-level constants (history length, explosion pool size,
//! material table size, decal limits), the weapon description, combat text
//! styling and per-user turn scaling. Configuration can be loaded from and
//! saved to a TOML file.

use fpsci_common::{ConfigError, SimResult};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "fpsci.toml";

/// Scene loaded when no session names one.
pub const DEFAULT_SCENE_NAME: &str = "FPSci Simple Hallway";

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Scene ===
    /// Scene to load when a session does not name one
    pub default_scene_name: String,
    /// Root directory for asset files (None = use the asset manifest)
    pub data_dir: Option<PathBuf>,
    /// Asset names available when no data directory is configured
    pub asset_manifest: Vec<String>,

    // === Timing ===
    /// Length of the frame duration history
    pub max_history_frames: usize,

    // === Feedback ===
    /// Maximum number of simultaneous explosions
    pub max_explosions: usize,
    /// How long an explosion stays up (seconds)
    pub explosion_duration_s: f32,
    /// How long the hit decal stays up (seconds)
    pub hit_decal_duration_s: f32,
    /// Maximum number of miss decals kept in the scene
    pub miss_decal_count: usize,
    /// Number of color "levels" used to show target health
    pub mat_table_size: usize,
    /// Floating combat text styling
    pub combat_text: CombatTextConfig,
    /// Sound played when a target is destroyed (empty = none)
    pub destroy_sound: String,

    // === Player ===
    /// Per-user settings
    pub user: UserConfig,
    /// Weapon description
    pub weapon: WeaponConfig,
    /// Static geometry and targets of the trial scene
    pub scene: SceneConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        let weapon = WeaponConfig::default();
        let destroy_sound = "sound/explosion.wav".to_string();
        Self {
            default_scene_name: DEFAULT_SCENE_NAME.to_string(),
            data_dir: None,
            asset_manifest: vec![
                weapon.model.clone(),
                weapon.fire_sound.clone(),
                destroy_sound.clone(),
            ],

            max_history_frames: 360,

            max_explosions: 20,
            explosion_duration_s: 0.5,
            hit_decal_duration_s: 0.1,
            miss_decal_count: 2,
            mat_table_size: 10,
            combat_text: CombatTextConfig::default(),
            destroy_sound,

            user: UserConfig::default(),
            weapon,
            scene: SceneConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load configuration from `fpsci.toml` in the working directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Self {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific path.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{e}, using defaults");
                Self::default()
            },
        }
    }

    /// Load configuration from a specific path, reporting any failure.
    pub fn try_load_from<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate();
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> SimResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, contents)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.max_history_frames = self.max_history_frames.clamp(1, 10_000);
        self.max_explosions = self.max_explosions.clamp(1, 256);
        self.mat_table_size = self.mat_table_size.clamp(2, 256);
        self.miss_decal_count = self.miss_decal_count.min(1_000);
        self.explosion_duration_s = self.explosion_duration_s.max(0.0);
        self.hit_decal_duration_s = self.hit_decal_duration_s.max(0.0);

        self.combat_text.fade = self.combat_text.fade.clamp(0.0, 1.0);
        self.combat_text.timeout_s = self.combat_text.timeout_s.max(0.0);
        self.combat_text.size = self.combat_text.size.max(1.0);

        self.weapon.validate();
    }
}

/// Weapon description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Name of the view model asset
    pub model: String,
    /// Name of the fire sound asset
    pub fire_sound: String,
    /// Minimum time between shots (seconds, 0 = continuous)
    pub fire_period: f32,
    /// Keep firing while the trigger is held
    pub auto_fire: bool,
    /// Damage dealt per second of fire
    pub damage_per_second: f32,
    /// Resolve hits instantly along the aim ray
    pub hit_scan: bool,
    /// Spawn visible bullets
    pub render_bullets: bool,
    /// Bullet speed (m/s)
    pub bullet_speed: f32,
    /// Bullet gravity (m/s^2)
    pub bullet_gravity: f32,
    /// Cap on the accumulated downward bullet velocity (m/s)
    pub bullet_max_fall_speed: f32,
    /// Bullet model scale
    pub bullet_scale: Vec3,
    /// Bullet emissive color
    pub bullet_color: [f32; 3],
    /// Farthest distance a shot travels (m)
    pub max_range: f32,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            model: "model/sniper/sniper.obj".to_string(),
            fire_sound: "sound/fire.wav".to_string(),
            fire_period: 0.5,
            auto_fire: false,
            damage_per_second: 2.0,
            hit_scan: true,
            render_bullets: true,
            bullet_speed: 100.0,
            bullet_gravity: 0.0,
            bullet_max_fall_speed: 100.0,
            bullet_scale: Vec3::new(0.05, 0.05, 2.0),
            bullet_color: [5.0, 4.0, 0.0],
            max_range: 1000.0,
        }
    }
}

impl WeaponConfig {
    /// Continuous-beam weapon: fires every frame while the trigger is held.
    #[must_use]
    pub fn is_laser(&self) -> bool {
        self.fire_period == 0.0 && self.auto_fire
    }

    /// Clamp values into usable ranges. A zero bullet speed spawns no bullets.
    pub fn validate(&mut self) {
        self.fire_period = self.fire_period.max(0.0);
        self.damage_per_second = self.damage_per_second.max(0.0);
        self.bullet_speed = self.bullet_speed.max(0.0);
        self.bullet_max_fall_speed = self.bullet_max_fall_speed.max(0.0);
        self.max_range = self.max_range.max(0.0);
    }
}

/// Floating combat text styling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTextConfig {
    /// Font size (pixels)
    pub size: f32,
    /// Text color (RGBA)
    pub color: [f32; 4],
    /// Outline color (RGBA)
    pub outline: [f32; 4],
    /// Initial screen-space offset (pixels)
    pub offset: Vec3,
    /// Screen-space drift (pixels per second)
    pub velocity: Vec3,
    /// Alpha multiplier applied every drawn frame
    pub fade: f32,
    /// Lifetime (seconds)
    pub timeout_s: f32,
}

impl Default for CombatTextConfig {
    fn default() -> Self {
        Self {
            size: 16.0,
            color: [1.0, 0.0, 0.0, 1.0],
            outline: [0.0, 0.0, 0.0, 1.0],
            offset: Vec3::new(0.0, -10.0, 0.0),
            velocity: Vec3::new(0.0, -100.0, 0.0),
            fade: 0.98,
            timeout_s: 0.5,
        }
    }
}

/// Per-user aiming settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// User identifier
    pub id: String,
    /// Base turn scale (x = yaw, y = pitch)
    pub turn_scale: Vec2,
    /// Extra turn scale while scoped
    pub scope_turn_scale: Vec2,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: "anonymous".to_string(),
            turn_scale: Vec2::ONE,
            scope_turn_scale: Vec2::splat(0.5),
        }
    }
}

/// Static scene contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Player spawn position
    pub spawn: Vec3,
    /// Solid boxes
    pub walls: Vec<WallConfig>,
    /// Spherical targets
    pub targets: Vec<TargetConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        // A straight hallway down -Z with a back wall at z = -60
        Self {
            spawn: Vec3::new(0.0, 1.5, 0.0),
            walls: vec![
                WallConfig {
                    center: Vec3::new(-4.0, 2.0, -30.0),
                    size: Vec3::new(1.0, 4.0, 60.0),
                },
                WallConfig {
                    center: Vec3::new(4.0, 2.0, -30.0),
                    size: Vec3::new(1.0, 4.0, 60.0),
                },
                WallConfig {
                    center: Vec3::new(0.0, 2.0, -60.0),
                    size: Vec3::new(9.0, 4.0, 1.0),
                },
            ],
            targets: vec![
                TargetConfig {
                    position: Vec3::new(0.0, 1.5, -20.0),
                    radius: 0.5,
                },
                TargetConfig {
                    position: Vec3::new(1.5, 2.0, -35.0),
                    radius: 0.5,
                },
            ],
        }
    }
}

/// Solid box in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallConfig {
    /// Box center
    pub center: Vec3,
    /// Full box size
    pub size: Vec3,
}

/// Target placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Target center
    pub position: Vec3,
    /// Target radius
    pub radius: f32,
}
