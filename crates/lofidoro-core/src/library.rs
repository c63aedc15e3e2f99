//! Music folders, playlists and break sounds.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::LibraryError;
use crate::storage::{data_dir, IgnoreStore};

pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| ext.eq_ignore_ascii_case(s)))
        .unwrap_or(false)
}

/// Deduplicated set of tracks, kept in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    tracks: BTreeSet<PathBuf>,
}

impl Playlist {
    pub fn new<I, P>(tracks: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            tracks: tracks.into_iter().map(Into::into).collect(),
        }
    }

    pub fn single(track: impl Into<PathBuf>) -> Self {
        Self::new([track.into()])
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn contains(&self, track: &Path) -> bool {
        self.tracks.contains(track)
    }

    pub fn tracks(&self) -> impl Iterator<Item = &PathBuf> {
        self.tracks.iter()
    }

    /// Drop every track listed in `ignore`.
    pub fn without_ignored(self, ignore: &IgnoreStore) -> Self {
        Self {
            tracks: self.tracks.into_iter().filter(|t| !ignore.contains(t)).collect(),
        }
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for Playlist {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Supported audio files directly inside `folder`, sorted.
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>, LibraryError> {
    if !folder.is_dir() {
        return Err(LibraryError::FolderNotFound(folder.to_path_buf()));
    }
    let io_err = |source: io::Error| LibraryError::Io {
        path: folder.to_path_buf(),
        source,
    };

    let mut tracks = Vec::new();
    for entry in fs::read_dir(folder).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && is_supported(&path) {
            tracks.push(path);
        }
    }
    if tracks.is_empty() {
        return Err(LibraryError::NoTracks(folder.to_path_buf()));
    }
    tracks.sort();
    Ok(tracks)
}

/// Result of loading a music folder against the ignore list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPlaylist {
    pub playlist: Playlist,
    pub found: usize,
    pub ignored: usize,
}

pub fn load_playlist(folder: &Path, ignore: &IgnoreStore) -> Result<LoadedPlaylist, LibraryError> {
    let found = scan_folder(folder)?;
    let total = found.len();
    let playlist = Playlist::new(found).without_ignored(ignore);
    let ignored = total - playlist.len();
    info!(folder = %folder.display(), total, ignored, "music folder loaded");
    Ok(LoadedPlaylist {
        playlist,
        found: total,
        ignored,
    })
}

/// `<data dir>/default-playlist`.
pub fn default_playlist_dir() -> io::Result<PathBuf> {
    Ok(data_dir()?.join("default-playlist"))
}

/// `<data dir>/break-sounds`.
pub fn default_break_sounds_dir() -> io::Result<PathBuf> {
    Ok(data_dir()?.join("break-sounds"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakPreset {
    Rain,
    Fireplace,
    Wind,
    SoftWind,
}

impl BreakPreset {
    pub const ALL: [BreakPreset; 4] = [
        BreakPreset::Rain,
        BreakPreset::Fireplace,
        BreakPreset::Wind,
        BreakPreset::SoftWind,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BreakPreset::Rain => "rain",
            BreakPreset::Fireplace => "fireplace",
            BreakPreset::Wind => "wind",
            BreakPreset::SoftWind => "soft-wind",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.mp3", self.name())
    }
}

impl fmt::Display for BreakPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Break sound choice as written on the command line or in the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakSound {
    Preset(BreakPreset),
    /// Any preset whose file exists.
    Random,
    /// Absolute path, or a file name inside the break-sounds directory.
    Custom(PathBuf),
}

impl FromStr for BreakSound {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("random") {
            return Ok(BreakSound::Random);
        }
        if let Some(preset) = BreakPreset::ALL.iter().find(|p| p.name().eq_ignore_ascii_case(s)) {
            return Ok(BreakSound::Preset(*preset));
        }
        if is_supported(Path::new(s)) {
            return Ok(BreakSound::Custom(PathBuf::from(s)));
        }
        Err(LibraryError::UnknownBreakSound(s.to_string()))
    }
}

impl BreakSound {
    /// The file to loop during breaks, or `None` if it does not exist.
    pub fn resolve<R: Rng + ?Sized>(&self, sounds_dir: &Path, rng: &mut R) -> Option<PathBuf> {
        let candidate = match self {
            BreakSound::Preset(preset) => sounds_dir.join(preset.file_name()),
            BreakSound::Custom(path) if path.is_absolute() => path.clone(),
            BreakSound::Custom(path) => sounds_dir.join(path),
            BreakSound::Random => {
                let available: Vec<PathBuf> = BreakPreset::ALL
                    .iter()
                    .map(|p| sounds_dir.join(p.file_name()))
                    .filter(|p| p.is_file())
                    .collect();
                return match available.choose(rng) {
                    Some(path) => Some(path.clone()),
                    None => {
                        warn!(dir = %sounds_dir.display(), "no break sound presets found");
                        None
                    }
                };
            }
        };
        if candidate.is_file() {
            Some(candidate)
        } else {
            warn!(path = %candidate.display(), "break sound not found");
            None
        }
    }
}
