//! Brick Volley headless runner
//!
//! Plays the simulation core with a simple autopilot at 60 Hz. Useful for
//! smoke runs and for eyeballing balance changes from a config file.

use std::f32::consts::PI;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::Vec2;

use brick_volley::consts::SIM_DT;
use brick_volley::sim::{GameState, ObstacleKind, RoundPhase};
use brick_volley::{Game, GameConfig, aim_angle};

/// Steepest allowed deviation from horizontal, so shots always go up
const MIN_ELEVATION: f32 = 0.15;

/// Safety cap on frames per round
const MAX_FRAMES_PER_ROUND: u32 = 60 * 120;

#[derive(Parser, Debug)]
#[command(name = "brick-volley")]
#[command(about = "Headless brick volley runner driven by a simple autopilot")]
struct Cli {
    /// Run seed
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Rounds to play before stopping
    #[arg(long, default_value_t = 50)]
    rounds: u32,
    /// JSON file with balance overrides
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the final scene as JSON
    #[arg(long)]
    dump_scene: bool,
}

/// Aim at the lowest standard obstacle; straight up on an empty board
fn autopilot_aim(state: &GameState) -> f32 {
    let target = state
        .field
        .obstacles()
        .iter()
        .filter(|o| o.kind == ObstacleKind::Standard)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
        .map(|o| o.rect().center())
        .unwrap_or(Vec2::new(state.launcher.x, 0.0));

    aim_angle(state.launcher, target).clamp(-PI + MIN_ELEVATION, -MIN_ELEVATION)
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();

    let config = match cli.config.as_deref().map(GameConfig::load) {
        None => GameConfig::default(),
        Some(Ok(config)) => config,
        Some(Err(err)) => {
            log::warn!("Rejected config: {err}");
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    log::info!("Brick Volley starting with seed {}", cli.seed);
    let mut game = Game::new(cli.seed, config);

    for _ in 0..cli.rounds {
        if game.game_over_level().is_some() {
            break;
        }
        let angle = autopilot_aim(game.state());
        game.fire(angle);

        let mut frames = 0;
        loop {
            game.update(SIM_DT);
            frames += 1;
            if game.phase() == RoundPhase::Firing && frames == 60 * 3 {
                game.request_speed_up();
            }
            if matches!(game.phase(), RoundPhase::Aiming | RoundPhase::GameOver) {
                break;
            }
            if frames >= MAX_FRAMES_PER_ROUND {
                log::warn!("Round exceeded {} frames, stopping", MAX_FRAMES_PER_ROUND);
                break;
            }
        }
    }

    let status = game.status();
    println!("{}  {}", status.level_text(), status.shots_text());
    if let Some(level) = status.game_over {
        println!("Game over at level {level}");
    }

    if cli.dump_scene {
        match game.scene().to_json() {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("failed to serialize scene: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
