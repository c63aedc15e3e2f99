use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AudioError, ValidationError};

/// How many times a loaded track plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Once,
    Forever,
}

/// Output volume in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Volume(f32);

impl Volume {
    pub const MAX: Volume = Volume(1.0);
    pub const MUTE: Volume = Volume(0.0);

    pub fn new(value: f32) -> Result<Self, ValidationError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::VolumeOutOfRange(value))
        }
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<f32> for Volume {
    type Error = ValidationError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Volume> for f32 {
    fn from(volume: Volume) -> Self {
        volume.0
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Audio output collaborator.
///
/// One handle is shared by the session and the playback loop it spawns;
/// implementations synchronise internally.
pub trait AudioPlayer: Send + Sync {
    /// Open and decode `track`, replacing any previously loaded track.
    fn load(&self, track: &Path) -> Result<(), AudioError>;

    /// Start the loaded track, stopping whatever was playing.
    fn play(&self, repeat: Repeat) -> Result<(), AudioError>;

    fn stop(&self);

    fn pause(&self);

    fn unpause(&self);

    /// `false` once the track ended, was stopped, or is paused.
    fn is_playing(&self) -> bool;

    fn set_volume(&self, volume: Volume);
}

/// Player used when no audio output is available. Never plays anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPlayer;

impl AudioPlayer for SilentPlayer {
    fn load(&self, _track: &Path) -> Result<(), AudioError> {
        Err(AudioError::OutputUnavailable("audio is disabled".into()))
    }

    fn play(&self, _repeat: Repeat) -> Result<(), AudioError> {
        Err(AudioError::NothingLoaded)
    }

    fn stop(&self) {}

    fn pause(&self) {}

    fn unpause(&self) {}

    fn is_playing(&self) -> bool {
        false
    }

    fn set_volume(&self, _volume: Volume) {}
}
