//! Phase timer.
//!
//! Counts one phase down against the monotonic clock. Pause toggles are
//! applied at the instant they are delivered, so paused time is excluded
//! exactly rather than rounded to tick boundaries.
//!
//! ## Tick
//!
//! ```text
//! drain commands -> recompute effective elapsed -> render -> done?
//! ```
//!
//! While running, the phase also ends at its deadline even between ticks,
//! so a pause that ends mid-tick never stretches the phase.
//!
//! ## Usage
//!
//! ```ignore
//! let timer = PhaseTimer::new(display, cancel);
//! let outcome = timer.run("Work", 25 * 60, &mut bus.subscribe()).await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::pause::PauseAccounting;
use crate::control::{Command, CommandReceiver, Ticker};
use crate::display::{self, PhaseDisplay};

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseOutcome {
    Completed,
    Cancelled,
}

pub struct PhaseTimer {
    display: Arc<dyn PhaseDisplay>,
    cancel: CancellationToken,
    tick: Duration,
}

impl PhaseTimer {
    pub fn new(display: Arc<dyn PhaseDisplay>, cancel: CancellationToken) -> Self {
        Self {
            display,
            cancel,
            tick: DEFAULT_TICK,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Block until `total_secs` of unpaused time have elapsed.
    ///
    /// `Skip` and `Ignore` arriving on `commands` are discarded.
    pub async fn run(&self, label: &str, total_secs: u64, commands: &mut CommandReceiver) -> PhaseOutcome {
        if total_secs == 0 {
            return PhaseOutcome::Completed;
        }

        let total = Duration::from_secs(total_secs);
        let mut pause = PauseAccounting::start(Instant::now());
        let mut ticker = Ticker::new(self.tick, self.cancel.clone());
        let mut commands_open = true;
        info!(label, total_secs, "phase started");

        loop {
            let deadline = pause.deadline(total);
            tokio::select! {
                biased;
                tick = ticker.tick() => {
                    if tick.is_none() {
                        info!(label, "phase cancelled");
                        return PhaseOutcome::Cancelled;
                    }
                    while let Some(command) = commands.try_next() {
                        apply(label, command, &mut pause);
                    }
                    let elapsed = pause.effective_elapsed(Instant::now());
                    self.render(label, elapsed.as_secs(), total_secs);
                    if elapsed >= total {
                        info!(label, "phase completed");
                        return PhaseOutcome::Completed;
                    }
                }
                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    while let Some(command) = commands.try_next() {
                        apply(label, command, &mut pause);
                    }
                    let elapsed = pause.effective_elapsed(Instant::now());
                    if elapsed >= total {
                        self.render(label, elapsed.as_secs(), total_secs);
                        info!(label, "phase completed between ticks");
                        return PhaseOutcome::Completed;
                    }
                }
                command = commands.next(), if commands_open => match command {
                    Some(command) => apply(label, command, &mut pause),
                    None => commands_open = false,
                },
            }
        }
    }

    fn render(&self, label: &str, elapsed_secs: u64, total_secs: u64) {
        if let Err(e) = self.display.render_phase(label, elapsed_secs, total_secs) {
            debug!("progress display failed: {e}");
            display::bell();
        }
    }
}

fn apply(label: &str, command: Command, pause: &mut PauseAccounting) {
    match command {
        Command::TogglePause => {
            let now = Instant::now();
            let paused = pause.toggle(now);
            info!(label, paused, elapsed_ms = pause.effective_elapsed(now).as_millis() as u64, "timer pause toggled");
        }
        Command::Skip | Command::Ignore => {
            debug!(label, ?command, "command not handled by timer");
        }
    }
}
