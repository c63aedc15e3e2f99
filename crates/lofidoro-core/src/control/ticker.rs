//! Cancellable periodic tick source.
//!
//! Every polling loop in the crate suspends on a [`Ticker`], which resolves
//! either at the next tick or as soon as the cancellation token fires.

use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct Ticker {
    interval: Interval,
    cancel: CancellationToken,
}

impl Ticker {
    /// The first tick fires one `period` after construction. Late wake-ups
    /// push later ticks back instead of bursting to catch up.
    pub fn new(period: Duration, cancel: CancellationToken) -> Self {
        let period = period.max(Duration::from_millis(1));
        let mut interval = time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval, cancel }
    }

    /// Wait for the next tick. `None` once cancelled.
    pub async fn tick(&mut self) -> Option<Instant> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            at = self.interval.tick() => Some(at),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Sleep for `duration`. Returns `false` if `cancel` fired first.
pub async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = time::sleep(duration) => true,
    }
}
