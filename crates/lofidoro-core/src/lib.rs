//! # Lofidoro Core Library
//!
//! Core logic for the Lofidoro terminal Pomodoro timer: work and break phases
//! counted down against the monotonic clock while background audio streams,
//! with single-key controls (skip, pause, ignore) delivered to every running
//! loop.
//!
//! ## Architecture
//!
//! - **Control**: the command bus (one queue per subscriber), the keystroke
//!   listener and the cancellable tick source every loop suspends on
//! - **Timer**: pause-aware phase countdown and the session plan
//! - **Playback**: the playback loop over an [`AudioPlayer`] collaborator
//! - **Session**: the cycle orchestrator tying timer and playback together
//! - **Storage**: TOML configuration and the append-only ignore list
//!
//! ## Key Components
//!
//! - [`PhaseTimer`]: counts one phase down, honouring pause toggles
//! - [`PlaybackLoop`]: non-repeating traversal of a [`Playlist`]
//! - [`Session`]: runs N work/break cycles followed by a long break
//! - [`CommandBus`]: fan-out of [`Command`]s from the keyboard

pub mod control;
pub mod display;
pub mod error;
pub mod library;
pub mod playback;
pub mod session;
pub mod storage;
pub mod terminal;
pub mod timer;

pub use control::{Command, CommandBus, CommandReceiver, KeyInput, KeyListener, KeySource, ListenerHandle, Ticker};
pub use display::{Alert, PhaseDisplay, TerminalBell};
pub use error::{AudioError, ConfigError, CoreError, DisplayError, LibraryError, ValidationError};
pub use library::{BreakPreset, BreakSound, Playlist};
pub use playback::{AudioPlayer, PlaybackLoop, PlaybackSummary, Repeat, SelectionStrategy, TrackSelector, Volume};
pub use session::{Session, SessionAudio, SessionIo, SessionReport};
pub use storage::{Config, IgnoreStore};
pub use timer::{Phase, PhaseKind, PhaseOutcome, PhaseTimer, SessionPlan};
