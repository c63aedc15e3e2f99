//! Keystroke listener.
//!
//! Reads single keys from a [`KeySource`] on a blocking worker and publishes
//! the recognised ones on the [`CommandBus`]. The source is polled with a
//! bounded timeout so the stop signal is honoured within one poll.

use std::io;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::bus::{Command, CommandBus};

pub const DEFAULT_KEY_POLL: Duration = Duration::from_millis(100);

/// A key as seen by the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    /// Ctrl-C. In raw terminal mode it no longer raises SIGINT.
    Interrupt,
}

/// Platform input handling.
pub trait KeySource: Send + 'static {
    /// Wait at most `timeout` for one key. `Ok(None)` when nothing arrived.
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<KeyInput>>;
}

pub struct KeyListener {
    bus: CommandBus,
    interrupt: CancellationToken,
    poll: Duration,
}

impl KeyListener {
    /// `interrupt` is cancelled when the user presses Ctrl-C.
    pub fn new(bus: CommandBus, interrupt: CancellationToken) -> Self {
        Self {
            bus,
            interrupt,
            poll: DEFAULT_KEY_POLL,
        }
    }

    pub fn with_poll(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }

    /// Start listening on a blocking worker.
    ///
    /// The listener also stops when the interrupt token is cancelled.
    pub fn spawn<S: KeySource>(self, source: S) -> ListenerHandle {
        let stop = self.interrupt.child_token();
        let worker_stop = stop.clone();
        let join = tokio::task::spawn_blocking(move || self.listen(source, worker_stop));
        ListenerHandle { stop, join }
    }

    fn listen<S: KeySource>(self, mut source: S, stop: CancellationToken) {
        debug!("key listener started");
        while !stop.is_cancelled() {
            match source.poll_key(self.poll) {
                Ok(Some(KeyInput::Char(key))) => match Command::from_key(key) {
                    Some(command) => {
                        self.bus.publish(command);
                    }
                    None => debug!(?key, "unbound key"),
                },
                Ok(Some(KeyInput::Interrupt)) => {
                    info!("interrupt received, ending session");
                    self.interrupt.cancel();
                    break;
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("key input unavailable, controls disabled: {e}");
                    break;
                }
            }
        }
        debug!("key listener stopped");
        // `source` drops here, restoring the terminal mode it changed.
    }
}

/// Owner of a running listener.
#[derive(Debug)]
pub struct ListenerHandle {
    stop: CancellationToken,
    join: JoinHandle<()>,
}

impl ListenerHandle {
    /// Signal the listener to stop without waiting.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Signal the listener and wait for its worker to exit.
    pub async fn shutdown(self) {
        self.stop.cancel();
        if let Err(e) = self.join.await {
            warn!("key listener ended abnormally: {e}");
        }
    }
}
