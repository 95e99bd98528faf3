//! # FPSci
//!
//! Headless runner for FPSci aiming trials.
//!
//! Loads the trial config, resolves weapon assets, runs a scripted trial and
//! prints a JSON summary to stdout.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod trial;

use anyhow::{Context, Result};
use fpsci_sim::{
    AssetLoader, DirectoryAssets, FrameLoop, ManifestAssets, SilentAudio, SimConfig,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable overriding the config path.
const CONFIG_ENV: &str = "FPSCI_CONFIG";

/// Simulated seconds before the scripted trial gives up.
const TRIAL_SECONDS: f32 = 30.0;

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("fpsci=info".parse()?))
        .init();

    info!("FPSci starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => SimConfig::load_from(PathBuf::from(path)),
        None => SimConfig::load(),
    };

    let assets: Box<dyn AssetLoader> = match &config.data_dir {
        Some(dir) => {
            info!("Resolving assets from {}", dir.display());
            Box::new(DirectoryAssets::new(dir))
        },
        None => Box::new(ManifestAssets::new(config.asset_manifest.clone())),
    };

    let scene = config.default_scene_name.clone();
    let mut trial = FrameLoop::from_config(config, assets.as_ref(), &SilentAudio)
        .with_context(|| format!("failed to set up trial in {scene}"))?;

    let summary = trial::run_scripted(&mut trial, TRIAL_SECONDS);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    info!("FPSci shutdown complete");
    Ok(())
}
