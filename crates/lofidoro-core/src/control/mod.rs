mod bus;
mod listener;
mod ticker;

pub use bus::{Command, CommandBus, CommandReceiver};
pub use listener::{KeyInput, KeyListener, KeySource, ListenerHandle, DEFAULT_KEY_POLL};
pub use ticker::{sleep_or_cancel, Ticker};
