use clap::Subcommand;
use lofidoro_core::IgnoreStore;

#[derive(Subcommand)]
pub enum IgnoredAction {
    /// List ignored tracks
    List {
        /// Output as JSON array
        #[arg(long)]
        json: bool,
    },
    /// Forget every ignored track
    Reset,
}

pub fn run(action: IgnoredAction) -> Result<(), Box<dyn std::error::Error>> {
    let path = IgnoreStore::default_path()?;
    match action {
        IgnoredAction::List { json } => {
            let store = IgnoreStore::load(&path);
            let tracks = store.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&tracks)?);
            } else if tracks.is_empty() {
                println!("No ignored tracks.");
            } else {
                for track in &tracks {
                    println!("{}", track.display());
                }
                println!("{} ignored track(s)", tracks.len());
            }
        }
        IgnoredAction::Reset => {
            if IgnoreStore::reset(&path)? {
                println!("Ignore list cleared.");
            } else {
                println!("Ignore list was already empty.");
            }
        }
    }
    Ok(())
}
