//! Display and alert collaborators.
//!
//! The timer and the orchestrator only talk to these traits; failures are
//! never allowed to stop a countdown; callers fall back to [`bell`].

use std::io::{self, Write};

use crate::error::DisplayError;

/// Progress output for the running phase.
pub trait PhaseDisplay: Send + Sync {
    /// Called once per timer tick with the effective elapsed time.
    fn render_phase(&self, label: &str, elapsed_secs: u64, total_secs: u64) -> Result<(), DisplayError>;

    /// Session narration: cycle headers, now playing, phase transitions.
    fn announce(&self, _message: &str) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// Audible or visible notice that a phase has ended.
pub trait Alert: Send + Sync {
    fn signal_phase_change(&self) -> Result<(), DisplayError>;
}

/// Terminal bell alert.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl Alert for TerminalBell {
    fn signal_phase_change(&self) -> Result<(), DisplayError> {
        let mut out = io::stdout().lock();
        out.write_all(b"\x07")?;
        out.flush()?;
        Ok(())
    }
}

/// Last-resort alert. Errors are ignored.
pub fn bell() {
    let _ = TerminalBell.signal_phase_change();
}

/// Announce through `display`, logging instead of failing.
pub(crate) fn announce(display: &dyn PhaseDisplay, message: &str) {
    if let Err(e) = display.announce(message) {
        tracing::debug!("announcement dropped: {e}");
    }
}
