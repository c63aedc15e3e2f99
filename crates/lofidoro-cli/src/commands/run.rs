use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use lofidoro_core::playback::{RodioPlayer, SilentPlayer};
use lofidoro_core::terminal::{format_clock, CrosstermKeySource, TerminalDisplay};
use lofidoro_core::{
    AudioPlayer, Config, IgnoreStore, KeyListener, SelectionStrategy, Session, SessionAudio, SessionIo,
    SessionReport, TerminalBell,
};
use tracing::warn;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Work phase length in minutes
    #[arg(short, long)]
    pub work: Option<u64>,
    /// Short break length in minutes
    #[arg(short = 's', long)]
    pub short_break: Option<u64>,
    /// Long break length in minutes
    #[arg(short = 'l', long)]
    pub long_break: Option<u64>,
    /// Work/break cycles before the long break
    #[arg(short, long)]
    pub cycles: Option<u32>,
    /// Folder with .mp3/.wav/.ogg files for work phases
    #[arg(short, long)]
    pub music_folder: Option<PathBuf>,
    /// rain, fireplace, wind, soft-wind, random, or an audio file
    #[arg(short, long)]
    pub break_sound: Option<String>,
    /// Output volume, 0.0 to 1.0
    #[arg(short, long)]
    pub volume: Option<f32>,
    /// Minutes left in an interrupted work phase; replaces the first one
    #[arg(short, long)]
    pub resume: Option<u64>,
    /// Work in silence
    #[arg(long)]
    pub no_music: bool,
    /// Breaks in silence
    #[arg(long)]
    pub no_break_sound: bool,
    /// Clear the ignore list before starting
    #[arg(long)]
    pub reset_ignored: bool,
    /// Play the folder in name order instead of shuffling
    #[arg(long, conflicts_with = "seed")]
    pub sequential: bool,
    /// Reproducible shuffle
    #[arg(long)]
    pub seed: Option<u64>,
}

impl RunArgs {
    /// Overlay flags on the loaded configuration for this run only.
    fn apply_to(&self, config: &mut Config) {
        if let Some(work) = self.work {
            config.timer.work_minutes = work;
        }
        if let Some(short_break) = self.short_break {
            config.timer.short_break_minutes = short_break;
        }
        if let Some(long_break) = self.long_break {
            config.timer.long_break_minutes = long_break;
        }
        if let Some(cycles) = self.cycles {
            config.timer.cycles = cycles;
        }
        if let Some(folder) = &self.music_folder {
            config.audio.music_folder = Some(folder.clone());
        }
        if let Some(sound) = &self.break_sound {
            config.audio.break_sound = sound.clone();
        }
        if let Some(volume) = self.volume {
            config.audio.volume = volume;
        }
        if self.no_music {
            config.audio.work_music = false;
        }
        if self.no_break_sound {
            config.audio.break_sound_enabled = false;
        }
    }

    fn selection(&self) -> SelectionStrategy {
        match (self.sequential, self.seed) {
            (true, _) => SelectionStrategy::Sequential,
            (false, Some(seed)) => SelectionStrategy::Seeded(seed),
            (false, None) => SelectionStrategy::Random,
        }
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    args.apply_to(&mut config);
    config.check()?;
    let volume = config.volume()?;
    let plan = config.session_plan().with_resume_minutes(args.resume);

    let ignore_path = IgnoreStore::default_path()?;
    if args.reset_ignored && IgnoreStore::reset(&ignore_path)? {
        println!("Ignore list cleared.");
    }
    let ignore = Arc::new(IgnoreStore::load(&ignore_path));

    let (player, audio): (Arc<dyn AudioPlayer>, SessionAudio) = match RodioPlayer::new(volume) {
        Ok(player) => {
            let audio = SessionAudio::from_config(&config, &ignore, &mut rand::thread_rng())?;
            if !audio.playlist.is_empty() {
                println!(
                    "Loaded {} track(s) from {}",
                    audio.playlist.len(),
                    config.music_folder()?.display()
                );
            }
            (Arc::new(player), audio)
        }
        Err(e) => {
            warn!("{e}; running without sound");
            (Arc::new(SilentPlayer), SessionAudio::default())
        }
    };

    let io = SessionIo {
        player,
        display: Arc::new(TerminalDisplay::new()),
        alert: Arc::new(TerminalBell),
    };
    let session = Session::new(plan, io)
        .with_ignore_store(ignore)
        .with_selection(args.selection())
        .with_tick(config.tick())
        .with_playback_timing(config.playback_timing());

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let report = runtime.block_on(async {
        // Covers the case where raw mode is unavailable and Ctrl-C still
        // arrives as a signal.
        let cancel = session.cancel_token().clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });

        let listener = match CrosstermKeySource::new() {
            Ok(source) => Some(
                KeyListener::new(session.bus().clone(), session.cancel_token().clone())
                    .with_poll(config.key_poll())
                    .spawn(source),
            ),
            Err(e) => {
                warn!("keyboard controls unavailable: {e}");
                None
            }
        };

        session.run(audio, listener).await
    });
    runtime.shutdown_timeout(Duration::from_millis(500));

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &SessionReport) {
    let focus = format_clock(report.focus_secs());
    let wall = (report.finished_at - report.started_at).num_seconds().max(0) as u64;
    if report.cancelled {
        println!(
            "Stopped after {} work phase(s): {focus} focused in {}.",
            report.work_phases(),
            format_clock(wall)
        );
    } else {
        println!(
            "Done! {} work phase(s), {focus} focused, {} track(s) played.",
            report.work_phases(),
            report.tracks_played
        );
    }
}
