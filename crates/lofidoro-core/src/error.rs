//! Core error types for lofidoro-core.
//!
//! Only configuration and validation errors are meant to reach the process
//! exit path. Audio, display and ignore-list failures are caught at the
//! component boundary, logged, and the session carries on.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for lofidoro-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Audio output or decoding errors
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Music folder and break sound lookup errors
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Errors raised by an [`AudioPlayer`](crate::playback::AudioPlayer).
#[derive(Error, Debug)]
pub enum AudioError {
    /// No output device or stream could be opened
    #[error("Audio output unavailable: {0}")]
    OutputUnavailable(String),

    /// The track could not be opened or decoded
    #[error("Couldn't load {track}: {message}")]
    LoadFailed { track: PathBuf, message: String },

    /// `play` was called without a successful `load`
    #[error("No track loaded")]
    NothingLoaded,

    /// The player refused to start playback
    #[error("Playback failed: {0}")]
    PlayFailed(String),
}

/// Errors raised while scanning the music library.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// Music folder does not exist or is not a directory
    #[error("Music folder not found: {0}")]
    FolderNotFound(PathBuf),

    /// Folder exists but holds no supported audio files
    #[error("No audio files in: {0}")]
    NoTracks(PathBuf),

    /// Break sound name is neither a preset nor an audio file path
    #[error("Unknown break sound '{0}'")]
    UnknownBreakSound(String),

    /// Reading the folder failed
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by display and alert collaborators.
#[derive(Error, Debug)]
pub enum DisplayError {
    /// Terminal write failed
    #[error("Display error: {0}")]
    Io(#[from] std::io::Error),

    /// The display is not available (e.g. detached terminal)
    #[error("Display unavailable: {0}")]
    Unavailable(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Volume outside 0.0..=1.0
    #[error("Volume must be between 0.0 and 1.0, got {0}")]
    VolumeOutOfRange(f32),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
