//! Memory Puzzle: flip cards two at a time and find every pair before the
//! clock runs out.

mod ui;

use std::path::PathBuf;

use clap::Parser;
use gtk4::glib;
use tracing_subscriber::EnvFilter;

use memory_puzzle::config::{Config, Overrides};
use memory_puzzle::game::Difficulty;

use ui::state::Launch;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Player name; asked for at startup when neither this nor the config has one
    #[arg(short, long)]
    player: Option<String>,

    /// Theme to start with (Emoji, Food, Animal, Classic or a custom theme)
    #[arg(short, long)]
    theme: Option<String>,

    /// Difficulty to start with: very-easy, easy, medium, hard or insane
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// Milliseconds both picked cards stay face up before they are compared
    #[arg(long)]
    reveal_delay_ms: Option<u64>,

    /// Directory for highscore.json and stats.json
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> glib::ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Memory Puzzle v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();
    let overrides = Overrides {
        reveal_delay_ms: args.reveal_delay_ms,
        data_dir: args.data_dir,
    };
    let effective = config.with_overrides(&overrides);

    let player_name = args
        .player
        .filter(|name| !name.trim().is_empty())
        .or_else(|| config.player_name.clone());
    let theme = args.theme.or_else(|| config.theme.clone());
    let difficulty = args.difficulty.or(config.difficulty);

    let launch = Launch {
        timing: effective.timing(),
        scores_dir: effective.scores_dir(),
        player_name,
        theme,
        difficulty,
        config,
    };

    ui::app::run(launch)
}
