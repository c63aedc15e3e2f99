mod engine;
mod player;
mod rodio_player;
mod selector;

pub use engine::{PlaybackLoop, PlaybackSummary, PlaybackTiming};
pub use player::{AudioPlayer, Repeat, SilentPlayer, Volume};
pub use rodio_player::RodioPlayer;
pub use selector::{RandomSelector, SelectionStrategy, SequentialSelector, TrackSelector};
