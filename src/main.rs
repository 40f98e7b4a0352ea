//! Lane Rush entry point
//!
//! Runs a headless fixed-step session driven by the autopilot, records
//! finished runs to the leaderboard and can snapshot the last frame.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use lane_rush::consts::FRAME_MS;
use lane_rush::gesture::{HandTracker, ReplayTracker, SyntheticTracker};
use lane_rush::renderer::rasterize;
use lane_rush::sim::{GameEvent, autopilot};
use lane_rush::{Calibration, Game, GameInput, Leaderboard, Tuning};

#[derive(Parser)]
#[command(name = "lane-rush")]
#[command(about = "Three-lane pseudo-3D runner (headless)", long_about = None)]
#[command(version)]
struct Cli {
    /// Run seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    /// Tuning overrides (JSON)
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Calibration service reply (free text containing a JSON object)
    #[arg(long)]
    calibration: Option<PathBuf>,

    /// Recorded hand trace (JSON array of frames); synthetic motion otherwise
    #[arg(long)]
    hands: Option<PathBuf>,

    /// Leaderboard file (defaults to the platform data directory)
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Write the final frame as PNG
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn default_scores_path() -> PathBuf {
    directories::ProjectDirs::from("", "", "lane-rush")
        .map(|dirs| dirs.data_dir().join("highscores.json"))
        .unwrap_or_else(|| PathBuf::from("highscores.json"))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let tuning = match &cli.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };

    let tracker: Box<dyn HandTracker> = match &cli.hands {
        Some(path) => Box::new(ReplayTracker::load(path, Duration::from_millis(33))?),
        None => Box::new(SyntheticTracker::default()),
    };

    let mut game = Game::new(cli.seed, tuning, tracker);

    if let Some(path) = &cli.calibration {
        let text = std::fs::read_to_string(path)?;
        game.apply_calibration(Calibration::from_report_or_default(&text));
    }

    let scores_path = cli.scores.clone().unwrap_or_else(default_scores_path);
    let mut leaderboard = Leaderboard::load_or_default(&scores_path);

    let ticks = (cli.seconds.max(0.0) * 1000.0 / FRAME_MS).round() as u64;
    let mut runs = 0u32;
    for _ in 0..ticks {
        match autopilot::suggest(game.state()) {
            Some(input) => game.handle_input(input),
            // Restart from a finished run
            None if game.state().phase.is_terminal() => {
                game.handle_input(GameInput::Confirm)
            }
            None => {}
        }
        game.advance(FRAME_MS);

        for event in game.drain_events() {
            match event {
                GameEvent::ScoreRecorded(entry) => {
                    runs += 1;
                    log::info!(
                        "Run {runs}: score {} with {} credits on {}",
                        entry.score,
                        entry.credits,
                        entry.date
                    );
                    if let Some(rank) = leaderboard.record(entry) {
                        log::info!("New leaderboard entry at #{rank}");
                    }
                }
                GameEvent::PlaybackRate(rate) => log::debug!("Background playback at {rate:.2}x"),
                GameEvent::MediaRewind => log::debug!("Background rewound"),
                other => log::trace!("{other:?}"),
            }
        }
    }

    let state = game.state();
    log::info!(
        "Finished in {} after {:.0} units: score {}, credits {}, shields {}",
        state.phase.as_str(),
        state.distance,
        state.score,
        state.credits,
        state.shields
    );

    leaderboard.save(&scores_path)?;
    for (i, entry) in leaderboard.entries.iter().enumerate() {
        println!("{}. {:>6} pts {:>4} credits  {}", i + 1, entry.score, entry.credits, entry.date);
    }

    if let Some(path) = &cli.snapshot {
        rasterize(&game.render()).save_png(path)?;
    }

    Ok(())
}
