//! Terminal collaborators built on `crossterm`.
//!
//! Raw mode disables output post-processing, so everything written while a
//! [`CrosstermKeySource`] is alive ends lines with `\r\n`.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::queue;

use crate::control::{KeyInput, KeySource};
use crate::display::PhaseDisplay;
use crate::error::DisplayError;

const BAR_WIDTH: usize = 30;

/// `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_clock(secs: u64) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// `Work       [#########---------------------] 17:30 left of 25:00`
pub fn progress_line(label: &str, elapsed_secs: u64, total_secs: u64) -> String {
    let elapsed = elapsed_secs.min(total_secs);
    let filled = if total_secs == 0 {
        BAR_WIDTH
    } else {
        (elapsed as u128 * BAR_WIDTH as u128 / total_secs as u128) as usize
    };
    format!(
        "{label:<10} [{}{}] {} left of {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        format_clock(total_secs - elapsed),
        format_clock(total_secs),
    )
}

/// Single-line progress bar redrawn in place each tick.
#[derive(Debug, Default)]
pub struct TerminalDisplay {
    bar_visible: AtomicBool,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PhaseDisplay for TerminalDisplay {
    fn render_phase(&self, label: &str, elapsed_secs: u64, total_secs: u64) -> Result<(), DisplayError> {
        let mut out = io::stdout().lock();
        queue!(
            out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(progress_line(label, elapsed_secs, total_secs)),
        )?;
        out.flush()?;
        self.bar_visible.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn announce(&self, message: &str) -> Result<(), DisplayError> {
        let mut out = io::stdout().lock();
        // Keep the last progress bar on its own line.
        if self.bar_visible.swap(false, Ordering::Relaxed) {
            queue!(out, Print("\r\n"))?;
        }
        queue!(
            out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(message),
            Print("\r\n"),
        )?;
        out.flush()?;
        Ok(())
    }
}

/// Key source reading single keys in raw mode.
///
/// Raw mode is enabled on construction and restored on drop.
#[derive(Debug)]
pub struct CrosstermKeySource {
    _raw: RawModeGuard,
}

impl CrosstermKeySource {
    /// # Errors
    /// Fails when stdin is not a terminal.
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self { _raw: RawModeGuard })
    }
}

impl KeySource for CrosstermKeySource {
    fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<KeyInput>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        Ok(match event::read()? {
            Event::Key(key) => translate(key),
            _ => None,
        })
    }
}

fn translate(key: KeyEvent) -> Option<KeyInput> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(KeyInput::Interrupt),
        KeyCode::Char(c) => Some(KeyInput::Char(c)),
        _ => None,
    }
}

#[derive(Debug)]
struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
