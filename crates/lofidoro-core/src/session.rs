//! Cycle orchestrator.
//!
//! Runs `cycles` x (Work, Break) followed by one Long Break. Work phases
//! stream the playlist, breaks loop the break sound, the long break is
//! silent. Each phase ends when its timer ends; the audio started for it is
//! then cancelled and the player stopped before the next phase begins.
//!
//! ```text
//! Work(1) -> Break(1) -> ... -> Work(n) -> Break(n) -> LongBreak
//!   |           |
//!   music       break sound
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::control::{CommandBus, CommandReceiver, ListenerHandle};
use crate::display::{self, Alert, PhaseDisplay};
use crate::error;
use crate::library::{load_playlist, Playlist};
use crate::playback::{AudioPlayer, PlaybackLoop, PlaybackSummary, PlaybackTiming, SelectionStrategy};
use crate::storage::{Config, IgnoreStore};
use crate::timer::{Phase, PhaseKind, PhaseOutcome, PhaseTimer, SessionPlan, DEFAULT_TICK};

/// Collaborators owned by one session.
#[derive(Clone)]
pub struct SessionIo {
    pub player: Arc<dyn AudioPlayer>,
    pub display: Arc<dyn PhaseDisplay>,
    pub alert: Arc<dyn Alert>,
}

/// What to play. An empty playlist or a missing break sound mutes that
/// channel.
#[derive(Debug, Clone, Default)]
pub struct SessionAudio {
    pub playlist: Playlist,
    pub break_sound: Option<PathBuf>,
}

impl SessionAudio {
    /// Resolve the playlist and break sound `config` asks for.
    ///
    /// A missing or empty music folder mutes work music, a missing break
    /// sound file mutes breaks. An unrecognised break sound name is an error.
    pub fn from_config<R: Rng + ?Sized>(config: &Config, ignore: &IgnoreStore, rng: &mut R) -> error::Result<Self> {
        let break_sound = match config.break_sound()? {
            Some(sound) => sound.resolve(&config.break_sounds_dir()?, rng),
            None => None,
        };

        let playlist = if config.audio.work_music {
            let folder = config.music_folder()?;
            match load_playlist(&folder, ignore) {
                Ok(loaded) => loaded.playlist,
                Err(e) => {
                    warn!("{e}; work music muted");
                    Playlist::default()
                }
            }
        } else {
            Playlist::default()
        };

        Ok(Self { playlist, break_sound })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Phases whose timer ran to the end, in order.
    pub completed: Vec<Phase>,
    pub cancelled: bool,
    /// Tracks that started playing during work phases.
    pub tracks_played: usize,
}

impl SessionReport {
    pub fn work_phases(&self) -> usize {
        self.completed.iter().filter(|p| p.kind == PhaseKind::Work).count()
    }

    pub fn focus_secs(&self) -> u64 {
        self.completed
            .iter()
            .filter(|p| p.kind == PhaseKind::Work)
            .map(|p| p.duration_secs)
            .sum()
    }
}

pub struct Session {
    plan: SessionPlan,
    io: SessionIo,
    bus: CommandBus,
    cancel: CancellationToken,
    ignore: Option<Arc<IgnoreStore>>,
    selection: SelectionStrategy,
    tick: Duration,
    timing: PlaybackTiming,
}

impl Session {
    pub fn new(plan: SessionPlan, io: SessionIo) -> Self {
        Self {
            plan,
            io,
            bus: CommandBus::new(),
            cancel: CancellationToken::new(),
            ignore: None,
            selection: SelectionStrategy::default(),
            tick: DEFAULT_TICK,
            timing: PlaybackTiming::default(),
        }
    }

    pub fn with_ignore_store(mut self, store: Arc<IgnoreStore>) -> Self {
        self.ignore = Some(store);
        self
    }

    pub fn with_selection(mut self, selection: SelectionStrategy) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_playback_timing(mut self, timing: PlaybackTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_bus(mut self, bus: CommandBus) -> Self {
        self.bus = bus;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn plan(&self) -> &SessionPlan {
        &self.plan
    }

    /// Publish here to control the running session.
    pub fn bus(&self) -> &CommandBus {
        &self.bus
    }

    /// Cancelling this token ends the session within one poll interval.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run every phase of the plan, then stop `listener`.
    pub async fn run(&self, audio: SessionAudio, listener: Option<ListenerHandle>) -> SessionReport {
        let started_at = Utc::now();
        let mut completed = Vec::new();
        let mut tracks_played = 0;
        let mut cancelled = false;
        let timer = PhaseTimer::new(self.io.display.clone(), self.cancel.clone()).with_tick(self.tick);

        // Both receivers exist before the next phase starts, so keys pressed
        // while audio winds down or the alert fires reach that phase.
        let mut timer_commands = self.bus.subscribe();
        let mut audio_commands = self.bus.subscribe();

        for phase in self.plan.phases() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            self.announce_phase(&phase);

            let playback = self.start_audio(&phase, &audio, audio_commands);
            let outcome = timer.run(phase.label(), phase.duration_secs, &mut timer_commands).await;
            audio_commands = self.bus.subscribe();

            if let Some(playback) = playback {
                if let Some(summary) = playback.finish(self.io.player.as_ref(), self.grace()).await {
                    debug!(?summary, "phase audio finished");
                    if phase.kind == PhaseKind::Work {
                        tracks_played += summary.played.len();
                    }
                }
            }

            if outcome == PhaseOutcome::Cancelled {
                cancelled = true;
                break;
            }
            info!(phase = phase.label(), cycle = phase.cycle, "phase finished");
            completed.push(phase);
            self.signal_phase_change();
        }

        if let Some(listener) = listener {
            listener.shutdown().await;
        }

        let closing = if cancelled { "Session stopped." } else { "Session complete!" };
        display::announce(self.io.display.as_ref(), closing);

        SessionReport {
            started_at,
            finished_at: Utc::now(),
            completed,
            cancelled,
            tracks_played,
        }
    }

    fn announce_phase(&self, phase: &Phase) {
        let length = describe(phase.duration_secs);
        let message = match phase.kind {
            PhaseKind::Work => format!(
                "Cycle {}/{}: focus for {length}. [s] skip  [p] pause  [i] ignore track",
                phase.cycle, self.plan.cycles
            ),
            PhaseKind::Break => format!("Break time! Relax for {length}. [p] pause"),
            PhaseKind::LongBreak => format!("Long break! Enjoy {length}."),
        };
        display::announce(self.io.display.as_ref(), &message);
    }

    fn start_audio(&self, phase: &Phase, audio: &SessionAudio, commands: CommandReceiver) -> Option<PlaybackTask> {
        let (playlist, playback) = match phase.kind {
            PhaseKind::Work if !audio.playlist.is_empty() => {
                let selector = self.selection.build(u64::from(phase.cycle));
                let mut playback = PlaybackLoop::music(self.io.player.clone(), selector)
                    .with_display(self.io.display.clone());
                if let Some(store) = &self.ignore {
                    playback = playback.with_ignore_store(store.clone());
                }
                (audio.playlist.clone(), playback)
            }
            PhaseKind::Break => {
                let sound = audio.break_sound.as_ref()?;
                (Playlist::single(sound.clone()), PlaybackLoop::ambient(self.io.player.clone()))
            }
            _ => return None,
        };

        let cancel = self.cancel.child_token();
        let loop_cancel = cancel.clone();
        let join = tokio::spawn(
            playback
                .with_timing(self.timing)
                .run(playlist, commands, true, loop_cancel),
        );
        Some(PlaybackTask { cancel, join })
    }

    fn signal_phase_change(&self) {
        if let Err(e) = self.io.alert.signal_phase_change() {
            debug!("alert failed, falling back to bell: {e}");
            display::bell();
        }
    }

    fn grace(&self) -> Duration {
        self.timing.poll * 2
    }
}

/// A playback loop running for the current phase.
struct PlaybackTask {
    cancel: CancellationToken,
    join: JoinHandle<PlaybackSummary>,
}

impl PlaybackTask {
    /// Cancel the loop, give it `grace` to wind down, then silence the
    /// player. A loop still running after `grace` is aborted.
    async fn finish(mut self, player: &dyn AudioPlayer, grace: Duration) -> Option<PlaybackSummary> {
        self.cancel.cancel();
        let summary = match tokio::time::timeout(grace, &mut self.join).await {
            Ok(Ok(summary)) => Some(summary),
            Ok(Err(e)) => {
                warn!("playback task failed: {e}");
                None
            }
            Err(_) => {
                warn!("playback did not stop within {grace:?}, aborting");
                self.join.abort();
                None
            }
        };
        player.stop();
        summary
    }
}

fn describe(secs: u64) -> String {
    match (secs / 60, secs % 60) {
        (1, 0) => "1 minute".to_string(),
        (m, 0) => format!("{m} minutes"),
        (0, 1) => "1 second".to_string(),
        _ => format!("{secs} seconds"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, LibraryError};
    use rand::rngs::mock::StepRng;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.audio.music_folder = Some(dir.path().join("music"));
        config.audio.break_sounds_dir = Some(dir.path().join("sounds"));
        config.audio.break_sound = "rain".into();
        config
    }

    #[test]
    fn audio_from_config_loads_playlist_and_break_sound() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("music")).unwrap();
        std::fs::create_dir_all(dir.path().join("sounds")).unwrap();
        for name in ["a.mp3", "b.ogg", "notes.txt"] {
            std::fs::write(dir.path().join("music").join(name), b"").unwrap();
        }
        std::fs::write(dir.path().join("sounds/rain.mp3"), b"").unwrap();
        let ignore = IgnoreStore::load(dir.path().join("ignored_tracks"));
        ignore.append(&dir.path().join("music/b.ogg")).unwrap();

        let audio = SessionAudio::from_config(&config_in(&dir), &ignore, &mut StepRng::new(0, 1)).unwrap();

        assert_eq!(audio.playlist.len(), 1);
        assert_eq!(audio.break_sound, Some(dir.path().join("sounds/rain.mp3")));
    }

    #[test]
    fn audio_from_config_mutes_missing_sources() {
        let dir = TempDir::new().unwrap();
        let ignore = IgnoreStore::load(dir.path().join("ignored_tracks"));

        let audio = SessionAudio::from_config(&config_in(&dir), &ignore, &mut StepRng::new(0, 1)).unwrap();

        assert!(audio.playlist.is_empty());
        assert_eq!(audio.break_sound, None);
    }

    #[test]
    fn audio_from_config_rejects_unknown_break_sound() {
        let dir = TempDir::new().unwrap();
        let ignore = IgnoreStore::load(dir.path().join("ignored_tracks"));
        let mut config = config_in(&dir);
        config.audio.break_sound = "thunder".into();

        let result = SessionAudio::from_config(&config, &ignore, &mut StepRng::new(0, 1));
        assert!(matches!(result, Err(CoreError::Library(LibraryError::UnknownBreakSound(_)))));
    }

    #[test]
    fn durations_read_naturally() {
        assert_eq!(describe(1500), "25 minutes");
        assert_eq!(describe(60), "1 minute");
        assert_eq!(describe(1), "1 second");
        assert_eq!(describe(90), "90 seconds");
        assert_eq!(describe(0), "0 minutes");
    }

    #[test]
    fn report_totals_work_time() {
        let plan = SessionPlan::from_minutes(25, 5, 15, 2).with_resume_minutes(Some(10));
        let report = SessionReport {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            completed: plan.phases(),
            cancelled: false,
            tracks_played: 0,
        };
        assert_eq!(report.work_phases(), 2);
        assert_eq!(report.focus_secs(), (10 + 25) * 60);
    }
}
