use std::path::PathBuf;

use clap::Args;
use lofidoro_core::library::load_playlist;
use lofidoro_core::{BreakPreset, Config, IgnoreStore};

#[derive(Args, Debug)]
pub struct SoundsArgs {
    /// Folder to inspect instead of the configured one
    #[arg(short, long)]
    pub music_folder: Option<PathBuf>,
}

pub fn run(args: SoundsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    let folder = match args.music_folder {
        Some(folder) => folder,
        None => config.music_folder()?,
    };
    let ignore = IgnoreStore::load(IgnoreStore::default_path()?);
    match load_playlist(&folder, &ignore) {
        Ok(loaded) => println!(
            "Music: {} ({} track(s), {} ignored)",
            folder.display(),
            loaded.found,
            loaded.ignored
        ),
        Err(e) => println!("Music: {e}"),
    }

    let sounds_dir = config.break_sounds_dir()?;
    println!("Break sounds: {}", sounds_dir.display());
    for preset in BreakPreset::ALL {
        let status = if sounds_dir.join(preset.file_name()).is_file() {
            "ok"
        } else {
            "missing"
        };
        println!("  {:<10} {status}", preset.name());
    }
    Ok(())
}
