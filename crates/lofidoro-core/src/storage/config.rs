//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Phase durations and cycle count
//! - Volume, music folder and break sound
//! - Polling intervals for the timer, playback loop and key listener
//!
//! Configuration is stored at `~/.config/lofidoro/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::{self, ConfigError, LibraryError, ValidationError};
use crate::library::{default_break_sounds_dir, default_playlist_dir, BreakSound};
use crate::playback::{PlaybackTiming, Volume};
use crate::timer::SessionPlan;

pub const CONFIG_FILE: &str = "config.toml";

/// Phase durations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimerConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u64,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u64,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u64,
    /// Work/break pairs before the long break. Zero runs the long break only.
    #[serde(default = "default_cycles")]
    pub cycles: u32,
}

/// Audio configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AudioConfig {
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_true")]
    pub work_music: bool,
    #[serde(default = "default_true")]
    pub break_sound_enabled: bool,
    /// Preset name, `random`, or an audio file path.
    #[serde(default = "default_break_sound")]
    pub break_sound: String,
    /// Defaults to `<data dir>/default-playlist`.
    #[serde(default)]
    pub music_folder: Option<PathBuf>,
    /// Defaults to `<data dir>/break-sounds`.
    #[serde(default)]
    pub break_sounds_dir: Option<PathBuf>,
}

/// Polling intervals, in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControlsConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,
    #[serde(default = "default_key_poll_ms")]
    pub key_poll_ms: u64,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/lofidoro/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
}

// Default functions
fn default_work_minutes() -> u64 {
    25
}
fn default_short_break_minutes() -> u64 {
    5
}
fn default_long_break_minutes() -> u64 {
    15
}
fn default_cycles() -> u32 {
    4
}
fn default_volume() -> f32 {
    1.0
}
fn default_true() -> bool {
    true
}
fn default_break_sound() -> String {
    "random".into()
}
fn default_tick_ms() -> u64 {
    1000
}
fn default_poll_ms() -> u64 {
    200
}
fn default_key_poll_ms() -> u64 {
    100
}
fn default_retry_delay_ms() -> u64 {
    1000
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            cycles: default_cycles(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            work_music: true,
            break_sound_enabled: true,
            break_sound: default_break_sound(),
            music_folder: None,
            break_sounds_dir: None,
        }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            poll_ms: default_poll_ms(),
            key_poll_ms: default_key_poll_ms(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        let mut current = root;
        while let Some(part) = parts.next() {
            if part.is_empty() {
                return Err(unknown());
            }
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else if let Ok(n) = value.parse::<f64>() {
                        serde_json::Number::from_f64(n)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    } else {
                        return Err(invalid(format!("cannot parse '{value}' as number")));
                    }
                }
                // Unset optional paths; an empty value keeps them unset.
                serde_json::Value::Null if value.is_empty() => serde_json::Value::Null,
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// `<data dir>/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from(CONFIG_FILE),
            message: e.to_string(),
        })?;
        Ok(dir.join(CONFIG_FILE))
    }

    /// Load from disk, writing the defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Same as [`Config::load`] for an explicit file.
    ///
    /// # Errors
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(path)?;
            return Ok(cfg);
        }
        let load_failed = |message: String| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| load_failed(e.to_string()))?;
        toml::from_str(&content).map_err(|e| load_failed(e.to_string()))
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// # Errors
    /// See [`Config::save`].
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => Some(String::new()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Every leaf key with its value, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let Ok(serde_json::Value::Object(sections)) = serde_json::to_value(self) else {
            return out;
        };
        for (section, fields) in &sections {
            if let serde_json::Value::Object(fields) = fields {
                for name in fields.keys() {
                    let key = format!("{section}.{name}");
                    if let Some(value) = self.get(&key) {
                        out.push((key, value));
                    }
                }
            }
        }
        out
    }

    /// Set a config value by key in memory, then validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting configuration is invalid. `self` is left untouched
    /// on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    /// See [`Config::apply`] and [`Config::save`].
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// # Errors
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.volume()?;
        for (field, ms) in [
            ("controls.tick_ms", self.controls.tick_ms),
            ("controls.poll_ms", self.controls.poll_ms),
            ("controls.key_poll_ms", self.controls.key_poll_ms),
        ] {
            if ms == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    /// # Errors
    /// Fails when `audio.volume` is outside `0.0..=1.0`.
    pub fn volume(&self) -> Result<Volume, ValidationError> {
        Volume::new(self.audio.volume)
    }

    pub fn session_plan(&self) -> SessionPlan {
        SessionPlan::from_minutes(
            self.timer.work_minutes,
            self.timer.short_break_minutes,
            self.timer.long_break_minutes,
            self.timer.cycles,
        )
    }

    /// Everything that must hold before a session starts: [`Config::validate`]
    /// plus a recognisable break sound.
    pub fn check(&self) -> error::Result<()> {
        self.validate()?;
        self.break_sound()?;
        Ok(())
    }

    /// The break sound to loop, `None` when break sounds are disabled.
    pub fn break_sound(&self) -> Result<Option<BreakSound>, LibraryError> {
        if !self.audio.break_sound_enabled {
            return Ok(None);
        }
        self.audio.break_sound.parse().map(Some)
    }

    pub fn music_folder(&self) -> std::io::Result<PathBuf> {
        match &self.audio.music_folder {
            Some(folder) => Ok(folder.clone()),
            None => default_playlist_dir(),
        }
    }

    pub fn break_sounds_dir(&self) -> std::io::Result<PathBuf> {
        match &self.audio.break_sounds_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_break_sounds_dir(),
        }
    }

    pub fn playback_timing(&self) -> PlaybackTiming {
        PlaybackTiming {
            poll: Duration::from_millis(self.controls.poll_ms),
            retry_delay: Duration::from_millis(self.controls.retry_delay_ms),
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.controls.tick_ms)
    }

    pub fn key_poll(&self) -> Duration {
        Duration::from_millis(self.controls.key_poll_ms)
    }
}
