//! Command fan-out.
//!
//! Every loop that reacts to the keyboard holds its own [`CommandReceiver`].
//! A published command is queued once per receiver, so the phase timer and
//! the playback loop each observe every keystroke; neither can consume a
//! command out from under the other.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};

const DEFAULT_CAPACITY: usize = 64;

/// A discrete control signal triggered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Stop the current track and move to the next one.
    Skip,
    /// Pause or resume both the countdown and the music.
    TogglePause,
    /// Skip the current track and never select it again.
    Ignore,
}

impl Command {
    /// Case-insensitive key binding: `s`, `p`, `i`.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            's' => Some(Command::Skip),
            'p' => Some(Command::TogglePause),
            'i' => Some(Command::Ignore),
            _ => None,
        }
    }
}

/// Multi-producer, multi-consumer command channel.
///
/// Cloning the bus clones the sending side. Receivers only see commands
/// published after they subscribed.
#[derive(Debug, Clone)]
pub struct CommandBus {
    tx: broadcast::Sender<Command>,
}

impl CommandBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// `capacity` bounds how far a receiver may fall behind before it starts
    /// losing its oldest commands.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> CommandReceiver {
        CommandReceiver {
            rx: self.tx.subscribe(),
        }
    }

    /// Deliver `command` to every current subscriber.
    ///
    /// Returns how many subscribers will see it.
    pub fn publish(&self, command: Command) -> usize {
        match self.tx.send(command) {
            Ok(receivers) => {
                debug!(?command, receivers, "command published");
                receivers
            }
            Err(_) => {
                debug!(?command, "command dropped, no subscribers");
                0
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

/// One subscriber's private command queue.
#[derive(Debug)]
pub struct CommandReceiver {
    rx: broadcast::Receiver<Command>,
}

impl CommandReceiver {
    /// Next pending command without waiting.
    pub fn try_next(&mut self) -> Option<Command> {
        loop {
            match self.rx.try_recv() {
                Ok(command) => return Some(command),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "command subscriber fell behind");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Every pending command, oldest first.
    pub fn drain(&mut self) -> Vec<Command> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Wait for the next command. `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<Command> {
        loop {
            match self.rx.recv().await {
                Ok(command) => return Some(command),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "command subscriber fell behind");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
