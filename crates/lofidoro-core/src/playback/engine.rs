//! Playback loop.
//!
//! Walks a playlist without repeats until every track of the pass has been
//! played, reacting to commands between polls of the player. A track that
//! fails to load costs one retry delay and the loop moves on; it never
//! aborts the session.
//!
//! ## Pass
//!
//! ```text
//! select (playlist - played - ignored) -> load -> play -> poll until
//!   ended | Skip | Ignore | cancelled
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::player::{AudioPlayer, Repeat};
use super::selector::{SequentialSelector, TrackSelector};
use crate::control::{sleep_or_cancel, Command, CommandReceiver, Ticker};
use crate::display::{self, PhaseDisplay};
use crate::library::Playlist;
use crate::storage::IgnoreStore;

/// What the loop is playing for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlaybackRole {
    /// Work music: every command applies.
    Music,
    /// A single looping break sound: only pause applies.
    Ambient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTiming {
    /// How often the player and the command queue are checked.
    pub poll: Duration,
    /// Pause after a track fails to load or play.
    pub retry_delay: Duration,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            poll: Duration::from_millis(200),
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Counters for one run of the loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSummary {
    /// Tracks that started playing, in order.
    pub played: Vec<PathBuf>,
    pub skipped: usize,
    pub ignored: usize,
    pub failed: usize,
    /// Completed passes over the playlist.
    pub passes: usize,
}

enum TrackEnd {
    Finished,
    Skipped,
    Ignored,
    Cancelled,
}

pub struct PlaybackLoop {
    player: Arc<dyn AudioPlayer>,
    selector: Box<dyn TrackSelector>,
    role: PlaybackRole,
    ignore: Option<Arc<IgnoreStore>>,
    display: Option<Arc<dyn PhaseDisplay>>,
    timing: PlaybackTiming,
}

impl PlaybackLoop {
    pub fn music(player: Arc<dyn AudioPlayer>, selector: Box<dyn TrackSelector>) -> Self {
        Self {
            player,
            selector,
            role: PlaybackRole::Music,
            ignore: None,
            display: None,
            timing: PlaybackTiming::default(),
        }
    }

    pub fn ambient(player: Arc<dyn AudioPlayer>) -> Self {
        Self {
            role: PlaybackRole::Ambient,
            ..Self::music(player, Box::new(SequentialSelector))
        }
    }

    /// Where `Ignore` records tracks. Without a store, `Ignore` only skips.
    pub fn with_ignore_store(mut self, store: Arc<IgnoreStore>) -> Self {
        self.ignore = Some(store);
        self
    }

    /// Receives "now playing" announcements.
    pub fn with_display(mut self, display: Arc<dyn PhaseDisplay>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn with_timing(mut self, timing: PlaybackTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Play until the playlist is exhausted (unless `loop_forever`) or
    /// `cancel` fires.
    ///
    /// The loop never stops the player on cancellation; whoever cancels owns
    /// the stop call.
    pub async fn run(
        mut self,
        playlist: Playlist,
        mut commands: CommandReceiver,
        loop_forever: bool,
        cancel: CancellationToken,
    ) -> PlaybackSummary {
        let mut summary = PlaybackSummary::default();
        let mut played: HashSet<PathBuf> = HashSet::new();

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let candidates: Vec<PathBuf> = playlist
                .tracks()
                .filter(|t| !played.contains(*t) && !self.is_ignored(t))
                .cloned()
                .collect();

            if candidates.is_empty() {
                if played.is_empty() {
                    debug!("nothing left to play");
                    break;
                }
                summary.passes += 1;
                if !loop_forever {
                    break;
                }
                played.clear();
                info!("playlist finished, starting over");
                continue;
            }

            let pick = self.selector.select(&candidates).min(candidates.len() - 1);
            let track = candidates[pick].clone();
            played.insert(track.clone());

            if let Err(e) = self.start(&track) {
                warn!("{e}");
                summary.failed += 1;
                if !sleep_or_cancel(self.timing.retry_delay, &cancel).await {
                    break;
                }
                continue;
            }
            if cancel.is_cancelled() {
                break;
            }
            summary.played.push(track.clone());
            self.announce_track(&track);

            match self.await_track(&track, &mut commands, &cancel).await {
                TrackEnd::Finished => debug!(track = %track.display(), "track finished"),
                TrackEnd::Skipped => summary.skipped += 1,
                TrackEnd::Ignored => summary.ignored += 1,
                TrackEnd::Cancelled => break,
            }
        }

        summary
    }

    fn start(&self, track: &Path) -> Result<(), crate::error::AudioError> {
        let repeat = match self.role {
            PlaybackRole::Music => Repeat::Once,
            PlaybackRole::Ambient => Repeat::Forever,
        };
        self.player.load(track)?;
        self.player.play(repeat)
    }

    async fn await_track(
        &self,
        track: &Path,
        commands: &mut CommandReceiver,
        cancel: &CancellationToken,
    ) -> TrackEnd {
        let mut ticker = Ticker::new(self.timing.poll, cancel.clone());
        let mut paused = false;

        loop {
            if ticker.tick().await.is_none() {
                return TrackEnd::Cancelled;
            }

            while let Some(command) = commands.try_next() {
                match (command, self.role) {
                    (Command::TogglePause, _) => {
                        if paused {
                            self.player.unpause();
                        } else {
                            self.player.pause();
                        }
                        paused = !paused;
                        debug!(paused, "playback pause toggled");
                    }
                    (Command::Skip, PlaybackRole::Music) => {
                        info!(track = %track.display(), "track skipped");
                        self.player.stop();
                        return TrackEnd::Skipped;
                    }
                    (Command::Ignore, PlaybackRole::Music) => {
                        self.ignore_track(track);
                        self.player.stop();
                        return TrackEnd::Ignored;
                    }
                    (command, PlaybackRole::Ambient) => {
                        debug!(?command, "command not applicable to break sound");
                    }
                }
            }

            if !paused && !self.player.is_playing() {
                return TrackEnd::Finished;
            }
        }
    }

    fn is_ignored(&self, track: &Path) -> bool {
        self.ignore.as_ref().is_some_and(|store| store.contains(track))
    }

    fn ignore_track(&self, track: &Path) {
        match &self.ignore {
            Some(store) => {
                if let Err(e) = store.append(track) {
                    warn!("couldn't write to ignore list {}: {e}", store.path().display());
                }
                if let Some(display) = &self.display {
                    display::announce(display.as_ref(), &format!("Track ignored: {}", file_label(track)));
                }
            }
            None => warn!(track = %track.display(), "no ignore list configured, skipping only"),
        }
    }

    fn announce_track(&self, track: &Path) {
        info!(track = %track.display(), "now playing");
        if self.role == PlaybackRole::Music {
            if let Some(display) = &self.display {
                display::announce(display.as_ref(), &format!("Now playing: {}", file_label(track)));
            }
        }
    }
}

fn file_label(track: &Path) -> String {
    track
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| track.display().to_string())
}
