//! Recording fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lofidoro_core::playback::{AudioPlayer, Repeat, Volume};
use lofidoro_core::{Alert, AudioError, DisplayError, KeyInput, KeySource, PhaseDisplay};
use tokio::time::Instant;

// ============================================================================
// Player
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCall {
    Load(PathBuf),
    Play(Repeat),
    Stop,
    Pause,
    Unpause,
    SetVolume(Volume),
}

#[derive(Default)]
struct PlayerState {
    loaded: Option<PathBuf>,
    /// `None` while a `Repeat::Forever` track plays.
    ends_at: Option<Instant>,
    playing: bool,
    paused_remaining: Option<Duration>,
    calls: Vec<(Instant, PlayerCall)>,
    polls: usize,
}

/// In-memory player whose tracks last `track_len` of tokio time.
pub struct RecordingPlayer {
    track_len: Duration,
    failing: HashSet<PathBuf>,
    state: Mutex<PlayerState>,
}

impl RecordingPlayer {
    pub fn new(track_len: Duration) -> Arc<Self> {
        Self::failing_on(track_len, [])
    }

    /// `load` fails for every path in `failing`.
    pub fn failing_on<I: IntoIterator<Item = PathBuf>>(track_len: Duration, failing: I) -> Arc<Self> {
        Arc::new(Self {
            track_len,
            failing: failing.into_iter().collect(),
            state: Mutex::new(PlayerState::default()),
        })
    }

    pub fn calls(&self) -> Vec<PlayerCall> {
        self.state.lock().unwrap().calls.iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn timed_calls(&self) -> Vec<(Instant, PlayerCall)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &PlayerCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn loads(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PlayerCall::Load(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    /// Number of `is_playing` checks.
    pub fn polls(&self) -> usize {
        self.state.lock().unwrap().polls
    }

    fn record(state: &mut PlayerState, call: PlayerCall) {
        state.calls.push((Instant::now(), call));
    }
}

impl AudioPlayer for RecordingPlayer {
    fn load(&self, track: &Path) -> Result<(), AudioError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, PlayerCall::Load(track.to_path_buf()));
        if self.failing.contains(track) {
            state.loaded = None;
            return Err(AudioError::LoadFailed {
                track: track.to_path_buf(),
                message: "corrupt file".into(),
            });
        }
        state.loaded = Some(track.to_path_buf());
        Ok(())
    }

    fn play(&self, repeat: Repeat) -> Result<(), AudioError> {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, PlayerCall::Play(repeat));
        if state.loaded.take().is_none() {
            return Err(AudioError::NothingLoaded);
        }
        state.playing = true;
        state.paused_remaining = None;
        state.ends_at = match repeat {
            Repeat::Once => Some(Instant::now() + self.track_len),
            Repeat::Forever => None,
        };
        Ok(())
    }

    fn stop(&self) {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, PlayerCall::Stop);
        state.playing = false;
        state.paused_remaining = None;
    }

    fn pause(&self) {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, PlayerCall::Pause);
        if state.playing && state.paused_remaining.is_none() {
            let remaining = state
                .ends_at
                .map(|end| end.saturating_duration_since(Instant::now()))
                .unwrap_or(Duration::MAX);
            state.paused_remaining = Some(remaining);
        }
    }

    fn unpause(&self) {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, PlayerCall::Unpause);
        if let Some(remaining) = state.paused_remaining.take() {
            if state.ends_at.is_some() {
                state.ends_at = Some(Instant::now() + remaining);
            }
        }
    }

    fn is_playing(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        state.polls += 1;
        if !state.playing || state.paused_remaining.is_some() {
            return false;
        }
        match state.ends_at {
            Some(end) if Instant::now() >= end => {
                state.playing = false;
                false
            }
            _ => true,
        }
    }

    fn set_volume(&self, volume: Volume) {
        let mut state = self.state.lock().unwrap();
        Self::record(&mut state, PlayerCall::SetVolume(volume));
    }
}

// ============================================================================
// Display and alert
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Render {
    pub label: String,
    pub elapsed: u64,
    pub total: u64,
}

#[derive(Default)]
pub struct RecordingDisplay {
    renders: Mutex<Vec<Render>>,
    announcements: Mutex<Vec<String>>,
    fail_renders: bool,
}

impl RecordingDisplay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Records renders but reports each one as failed.
    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            fail_renders: true,
            ..Self::default()
        })
    }

    pub fn renders(&self) -> Vec<Render> {
        self.renders.lock().unwrap().clone()
    }

    pub fn renders_for(&self, label: &str) -> Vec<Render> {
        self.renders().into_iter().filter(|r| r.label == label).collect()
    }

    pub fn announcements(&self) -> Vec<String> {
        self.announcements.lock().unwrap().clone()
    }
}

impl PhaseDisplay for RecordingDisplay {
    fn render_phase(&self, label: &str, elapsed_secs: u64, total_secs: u64) -> Result<(), DisplayError> {
        self.renders.lock().unwrap().push(Render {
            label: label.to_string(),
            elapsed: elapsed_secs,
            total: total_secs,
        });
        if self.fail_renders {
            return Err(DisplayError::Unavailable("detached".into()));
        }
        Ok(())
    }

    fn announce(&self, message: &str) -> Result<(), DisplayError> {
        self.announcements.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingAlert {
    count: AtomicUsize,
}

impl CountingAlert {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Alert for CountingAlert {
    fn signal_phase_change(&self) -> Result<(), DisplayError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Keys
// ============================================================================

/// Replays a fixed key sequence, then reports silence (or an error).
pub struct ScriptedKeySource {
    keys: VecDeque<KeyInput>,
    fail_when_empty: bool,
}

impl ScriptedKeySource {
    pub fn new<I: IntoIterator<Item = KeyInput>>(keys: I) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            fail_when_empty: false,
        }
    }

    pub fn chars(keys: &str) -> Self {
        Self::new(keys.chars().map(KeyInput::Char))
    }

    pub fn failing_after<I: IntoIterator<Item = KeyInput>>(keys: I) -> Self {
        Self {
            fail_when_empty: true,
            ..Self::new(keys)
        }
    }
}

impl KeySource for ScriptedKeySource {
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<KeyInput>> {
        if let Some(key) = self.keys.pop_front() {
            return Ok(Some(key));
        }
        if self.fail_when_empty {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
        }
        std::thread::sleep(timeout.min(Duration::from_millis(10)));
        Ok(None)
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn tracks(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(|n| PathBuf::from(format!("/music/{n}"))).collect()
}
