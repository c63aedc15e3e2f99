mod config;
mod ignore;

pub use config::{AudioConfig, Config, ControlsConfig, TimerConfig, CONFIG_FILE};
pub use ignore::{IgnoreStore, IGNORE_FILE};

use std::path::PathBuf;

/// Returns `~/.config/lofidoro[-dev]/` based on LOFIDORO_ENV.
///
/// Set LOFIDORO_ENV=dev to use development data directory, or
/// LOFIDORO_HOME to use an explicit directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("LOFIDORO_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("LOFIDORO_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("lofidoro-dev")
            } else {
                base_dir.join("lofidoro")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
