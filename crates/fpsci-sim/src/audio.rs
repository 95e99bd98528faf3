//! Audio seam for weapon fire sounds.
//!
//! The simulation only needs to start a sound and later stop that one
//! playing instance. Device setup and mixing belong to the host.

use crate::assets::AssetRef;
use fpsci_common::AssetError;
use std::sync::Arc;
use tracing::debug;

/// A playing sound instance.
pub trait AudioChannel: Send {
    /// Stops playback of this instance.
    fn stop(&mut self);
}

/// A loaded sound that can be played any number of times.
pub trait Sound: Send + Sync {
    /// Starts a new playing instance.
    fn play(&self) -> Box<dyn AudioChannel>;
}

/// Creates sounds from resolved assets.
pub trait AudioDevice {
    /// Creates a sound. `looping` sounds repeat until stopped.
    fn create_sound(&self, asset: &AssetRef, looping: bool) -> Result<Arc<dyn Sound>, AssetError>;
}

/// Audio device that plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl AudioDevice for SilentAudio {
    fn create_sound(&self, asset: &AssetRef, looping: bool) -> Result<Arc<dyn Sound>, AssetError> {
        Ok(Arc::new(SilentSound {
            name: asset.name.clone(),
            looping,
        }))
    }
}

#[derive(Debug)]
struct SilentSound {
    name: String,
    looping: bool,
}

impl Sound for SilentSound {
    fn play(&self) -> Box<dyn AudioChannel> {
        debug!("play {} (looping: {})", self.name, self.looping);
        Box::new(SilentChannel)
    }
}

#[derive(Debug)]
struct SilentChannel;

impl AudioChannel for SilentChannel {
    fn stop(&mut self) {}
}
