//! Asset resolution for weapon models and sounds.
//!
//! Loading is the only place a missing file is an error. Once a weapon is
//! constructed every model and sound it needs is already resolved, so firing
//! never touches the asset system.

use fpsci_common::AssetError;
use glam::Vec3;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// View model used when a weapon config leaves `model` empty.
pub const DEFAULT_VIEW_MODEL: &str = "model/sniper/sniper.obj";

/// A resolved asset reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRef {
    /// Name as written in the config
    pub name: String,
    /// File on disk, if resolved against a data directory
    pub path: Option<PathBuf>,
}

/// A renderable model, shared by the weapon and the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Source asset
    pub source: AssetRef,
    /// Scale applied to the source geometry
    pub scale: Vec3,
    /// Emissive color (RGB)
    pub emissive: [f32; 3],
}

impl Model {
    /// Creates a model from an asset with unit scale and no emission.
    #[must_use]
    pub fn from_asset(source: AssetRef) -> Self {
        Self {
            source,
            scale: Vec3::ONE,
            emissive: [0.0; 3],
        }
    }

    /// Set scale.
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Set emissive color.
    #[must_use]
    pub fn with_emissive(mut self, emissive: [f32; 3]) -> Self {
        self.emissive = emissive;
        self
    }
}

/// Resolves asset names to references.
pub trait AssetLoader {
    /// Looks up an asset by name.
    fn resolve(&self, name: &str) -> Result<Option<AssetRef>, AssetError>;

    /// Loads a model, failing if it does not exist.
    fn load_model(&self, name: &str) -> Result<Arc<Model>, AssetError> {
        let source = self
            .resolve(name)?
            .ok_or_else(|| AssetError::ModelNotFound(name.to_string()))?;
        debug!("Loaded model {name}");
        Ok(Arc::new(Model::from_asset(source)))
    }

    /// Resolves a sound, failing if it does not exist.
    fn load_sound(&self, name: &str) -> Result<AssetRef, AssetError> {
        self.resolve(name)?
            .ok_or_else(|| AssetError::SoundNotFound(name.to_string()))
    }
}

/// Assets declared up front by name, no file system access.
#[derive(Debug, Clone, Default)]
pub struct ManifestAssets {
    names: HashSet<String>,
}

impl ManifestAssets {
    /// Creates a manifest from a list of asset names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of declared assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the manifest is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl AssetLoader for ManifestAssets {
    fn resolve(&self, name: &str) -> Result<Option<AssetRef>, AssetError> {
        Ok(self.names.contains(name).then(|| AssetRef {
            name: name.to_string(),
            path: None,
        }))
    }
}

/// Assets found under a data directory.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
}

impl DirectoryAssets {
    /// Creates a loader rooted at `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl AssetLoader for DirectoryAssets {
    fn resolve(&self, name: &str) -> Result<Option<AssetRef>, AssetError> {
        let path = self.root.join(name);
        if !path.is_file() {
            return Ok(None);
        }
        // Surface permission problems now rather than at first playback
        fs::File::open(&path).map_err(|source| AssetError::Unreadable {
            path: path.clone(),
            source,
        })?;
        Ok(Some(AssetRef {
            name: name.to_string(),
            path: Some(path),
        }))
    }
}
