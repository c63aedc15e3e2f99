//! Track selection policies.
//!
//! The playback loop hands a selector the tracks still unplayed in the
//! current pass; the selector only picks among them.

use std::path::PathBuf;

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

pub trait TrackSelector: Send + Sync {
    /// Index into `candidates`, which is never empty.
    fn select(&mut self, candidates: &[PathBuf]) -> usize;
}

/// Uniform random choice.
pub struct RandomSelector {
    rng: Mcg128Xsl64,
}

impl RandomSelector {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mcg128Xsl64::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mcg128Xsl64::seed_from_u64(seed),
        }
    }
}

impl TrackSelector for RandomSelector {
    fn select(&mut self, candidates: &[PathBuf]) -> usize {
        self.rng.gen_range(0..candidates.len())
    }
}

/// Always the first candidate. Candidates arrive in playlist order, so
/// this walks the playlist front to back.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialSelector;

impl TrackSelector for SequentialSelector {
    fn select(&mut self, _candidates: &[PathBuf]) -> usize {
        0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    #[default]
    Random,
    Seeded(u64),
    Sequential,
}

impl SelectionStrategy {
    /// A fresh selector. `stream` decorrelates seeded selectors built for
    /// different phases of the same session.
    pub fn build(&self, stream: u64) -> Box<dyn TrackSelector> {
        match *self {
            SelectionStrategy::Random => Box::new(RandomSelector::from_entropy()),
            SelectionStrategy::Seeded(seed) => Box::new(RandomSelector::seeded(seed.wrapping_add(stream))),
            SelectionStrategy::Sequential => Box::new(SequentialSelector),
        }
    }
}
