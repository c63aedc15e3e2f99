mod engine;
mod pause;
mod schedule;

pub use engine::{PhaseOutcome, PhaseTimer, DEFAULT_TICK};
pub use pause::PauseAccounting;
pub use schedule::{Phase, PhaseKind, SessionPlan};
