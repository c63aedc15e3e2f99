//! Pause-aware elapsed time.
//!
//! Effective elapsed time is always recomputed from timestamps:
//! `wall_elapsed - total_paused`. It never drifts with tick jitter, grows
//! while running and stays frozen while paused.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauseAccounting {
    started_at: Instant,
    pause_started_at: Option<Instant>,
    total_paused: Duration,
}

impl PauseAccounting {
    pub fn start(now: Instant) -> Self {
        Self {
            started_at: now,
            pause_started_at: None,
            total_paused: Duration::ZERO,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.pause_started_at.is_some()
    }

    /// Flip between paused and running. Returns the new paused state.
    pub fn toggle(&mut self, now: Instant) -> bool {
        if self.is_paused() {
            self.resume(now);
        } else {
            self.pause(now);
        }
        self.is_paused()
    }

    pub fn pause(&mut self, now: Instant) {
        if self.pause_started_at.is_none() {
            self.pause_started_at = Some(now);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(since) = self.pause_started_at.take() {
            self.total_paused += now.saturating_duration_since(since);
        }
    }

    /// Paused time so far, including a pause still in progress.
    pub fn total_paused(&self, now: Instant) -> Duration {
        match self.pause_started_at {
            Some(since) => self.total_paused + now.saturating_duration_since(since),
            None => self.total_paused,
        }
    }

    pub fn effective_elapsed(&self, now: Instant) -> Duration {
        let reference = self.pause_started_at.unwrap_or(now);
        reference
            .saturating_duration_since(self.started_at)
            .saturating_sub(self.total_paused)
    }

    /// The instant `total` of effective time is reached, assuming no further
    /// pause. `None` while paused.
    pub fn deadline(&self, total: Duration) -> Option<Instant> {
        match self.pause_started_at {
            Some(_) => None,
            None => Some(self.started_at + self.total_paused + total),
        }
    }
}
