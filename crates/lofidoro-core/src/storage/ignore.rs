//! Durable ignore list.
//!
//! A flat text file, one track path per line. Entries are only ever
//! appended; resetting deletes the file. A missing file is an empty list.
//! The in-memory set also covers entries whose append failed, so an ignored
//! track stays out of rotation for the rest of the process either way.

use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use super::data_dir;

pub const IGNORE_FILE: &str = "ignored_tracks";

#[derive(Debug)]
pub struct IgnoreStore {
    path: PathBuf,
    entries: Mutex<BTreeSet<PathBuf>>,
}

impl IgnoreStore {
    /// `<data dir>/ignored_tracks`.
    pub fn default_path() -> io::Result<PathBuf> {
        Ok(data_dir()?.join(IGNORE_FILE))
    }

    /// Read the list at `path`. Unreadable files are logged and treated as
    /// empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(PathBuf::from)
                .collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => {
                warn!("couldn't read ignore list {}: {e}", path.display());
                BTreeSet::new()
            }
        };
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, track: &Path) -> bool {
        self.entries().contains(track)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Sorted snapshot of the list.
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.entries().iter().cloned().collect()
    }

    /// Add `track` and append it to the file.
    ///
    /// Returns `Ok(false)` when the track was already listed; nothing is
    /// written in that case.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or written. The track
    /// is still excluded for the rest of the process.
    pub fn append(&self, track: &Path) -> io::Result<bool> {
        if !self.entries().insert(track.to_path_buf()) {
            return Ok(false);
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(format!("{}\n", track.display()).as_bytes())?;
        info!("track ignored: {}", track.display());
        Ok(true)
    }

    /// Delete the list at `path`. Returns `Ok(false)` if there was none.
    pub fn reset(path: &Path) -> io::Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn entries(&self) -> MutexGuard<'_, BTreeSet<PathBuf>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
