//! Error types for the FPSci simulation core.
//!
//! Only resource and configuration problems are errors. A shot that hits
//! nothing or an effect that has expired is an ordinary value.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for simulation setup.
#[derive(Debug, Error)]
pub enum SimError {
    /// Asset loading errors
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Asset loading errors. These are fatal at load time and never retried.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Model not available
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Sound not available
    #[error("Sound not found: {0}")]
    SoundNotFound(String),

    /// Asset file exists but could not be read
    #[error("Failed to read asset {path}: {source}")]
    Unreadable {
        /// Resolved file path
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse the config document
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// Failed to serialize the config document
    #[error("Failed to serialize config: {0}")]
    Serialize(String),
}

/// Result type alias for simulation setup.
pub type SimResult<T> = Result<T, SimError>;
