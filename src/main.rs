//! Grid Shooter headless runner
//!
//! Plays one session against the real simulation with a simple autopilot,
//! logs every event, and prints the final session snapshot as JSON.
//!
//! Run with `--help` for the flags.

#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use grid_shooter::sim::{GameEvent, GameState, TickInput, WorldBounds, tick};
#[cfg(not(target_arch = "wasm32"))]
use grid_shooter::{ConfigError, Tuning};

/// 60 Hz frame clock
#[cfg(not(target_arch = "wasm32"))]
const FRAME_MS: f64 = 1000.0 / 60.0;

/// Headless Grid Shooter session driven by an autopilot
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
#[command(name = "grid-shooter")]
#[command(about = "Play one headless Grid Shooter session and print the final snapshot")]
#[command(version)]
struct CliArgs {
    /// RNG seed for the spawn stream
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Frames to simulate at 60 Hz
    #[arg(long, default_value_t = 60 * 120)]
    frames: u32,

    /// Tuning JSON file (missing keys use defaults)
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Wallet address attached to the score submission
    #[arg(long)]
    wallet: Option<String>,

    /// World size as WIDTHxHEIGHT
    #[arg(long = "size", value_name = "WxH", default_value = "800x600", value_parser = parse_size)]
    world: WorldBounds,
}

/// Parse `WIDTHxHEIGHT` into world bounds
#[cfg(not(target_arch = "wasm32"))]
fn parse_size(s: &str) -> Result<WorldBounds, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{}`", s))?;
    let width: f32 = w.trim().parse().map_err(|e| format!("bad width `{}`: {}", w, e))?;
    let height: f32 = h.trim().parse().map_err(|e| format!("bad height `{}`: {}", h, e))?;
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(format!("world size must be positive, got {}x{}", width, height));
    }
    Ok(WorldBounds::new(width, height))
}

/// Fire constantly; sidestep the closest enemy bearing down on the ship,
/// otherwise drift back to mid-height
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(state: &GameState) -> TickInput {
    let player = state.player.pos;
    let mut input = TickInput {
        fire: true,
        ..Default::default()
    };

    let threat = state
        .registry
        .enemies()
        .iter()
        .filter(|e| e.pos.x > player.x - 40.0 && (e.pos.y - player.y).abs() < 80.0)
        .min_by(|a, b| {
            a.pos
                .distance_squared(player)
                .partial_cmp(&b.pos.distance_squared(player))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some(enemy) = threat {
        let room_above = player.y - state.player.size.y;
        let room_below = state.world.height - player.y - state.player.size.y;
        if (enemy.pos.y >= player.y && room_above > 0.0) || room_below <= 0.0 {
            input.up = true;
        } else {
            input.down = true;
        }
    } else {
        let mid = state.world.height * 0.5;
        if player.y > mid + 20.0 {
            input.up = true;
        } else if player.y < mid - 20.0 {
            input.down = true;
        }
    }
    input
}

#[cfg(not(target_arch = "wasm32"))]
fn run(cli: &CliArgs) -> Result<GameState, ConfigError> {
    let tuning = match &cli.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let mut state = GameState::new(tuning, cli.world, cli.seed, 0.0)?;
    state.set_wallet_address(cli.wallet.clone());

    let mut now = 0.0;
    let mut submitted = false;
    for _ in 0..cli.frames {
        let input = autopilot(&state);
        tick(&mut state, &input, now);

        state.drain_events(&mut |event: &GameEvent| match event {
            GameEvent::EnemyHit(hit) => log::info!(
                "Hit {} enemy #{} (+{} base)",
                hit.kind.as_str(),
                hit.enemy_id,
                hit.points
            ),
            GameEvent::SessionEnded { final_score, .. } => {
                log::info!("Game over, final score {}", final_score)
            }
            GameEvent::ScoreSubmission { .. } => {
                log::info!("Score submission: {:?}", event);
                submitted = true;
            }
            other => log::trace!("{:?}", other),
        });

        if submitted {
            break;
        }
        now += FRAME_MS;
    }
    Ok(state)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    env_logger::init();
    log::info!("Grid Shooter (headless) starting...");

    let cli = CliArgs::parse();
    let state = match run(&cli) {
        Ok(state) => state,
        Err(e) => {
            log::error!("{}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&state.snapshot()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Failed to serialize snapshot: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    }
    std::process::ExitCode::SUCCESS
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is a library on the web; the host page drives it
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs, clap::Error> {
        CliArgs::try_parse_from(std::iter::once("grid-shooter").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.seed, 12345);
        assert_eq!(cli.frames, 7200);
        assert!(cli.tuning.is_none());
        assert!(cli.wallet.is_none());
        assert_eq!(cli.world, WorldBounds::default());
    }

    #[test]
    fn test_all_flags() {
        let cli = parse(&[
            "--seed", "7", "--frames", "60", "--tuning", "t.json", "--wallet", "0xabc", "--size",
            "1024x768",
        ])
        .unwrap();
        assert_eq!(cli.seed, 7);
        assert_eq!(cli.frames, 60);
        assert_eq!(cli.tuning, Some(PathBuf::from("t.json")));
        assert_eq!(cli.wallet.as_deref(), Some("0xabc"));
        assert_eq!(cli.world, WorldBounds::new(1024.0, 768.0));
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(parse(&["--seed", "abc"]).is_err());
        assert!(parse(&["--frames", "-5"]).is_err());
        assert!(parse(&["--size", "800xfoo"]).is_err());
        assert!(parse(&["--size", "800"]).is_err());
        assert!(parse(&["--size", "0x600"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
    }

    #[test]
    fn test_short_world_fails_at_session_start() {
        let cli = parse(&["--size", "800x60", "--frames", "1"]).unwrap();
        assert!(matches!(run(&cli), Err(ConfigError::WorldBounds { .. })));
    }

    #[test]
    fn test_run_stops_after_submission() {
        let cli = parse(&["--frames", "100000", "--seed", "3"]).unwrap();
        let state = run(&cli).unwrap();
        if state.is_game_over() {
            assert!(state.pending_submissions.is_empty());
        }
    }
}
