use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "lofidoro", version, about = "Lofi Pomodoro timer for the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a Pomodoro session
    Run(commands::run::RunArgs),
    /// Tracks excluded from the work playlist
    Ignored {
        #[command(subcommand)]
        action: commands::ignored::IgnoredAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Show the music folder and available break sounds
    Sounds(commands::sounds::SoundsArgs),
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("LOFIDORO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Ignored { action } => commands::ignored::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Sounds(args) => commands::sounds::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
