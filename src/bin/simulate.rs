use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use maze_arcade_server::constants::{GAMEPLAY_TICK_DIVISOR, TICK_RATE};
use maze_arcade_server::engine::{GameEngine, GameEngineOptions};
use maze_arcade_server::level::{load_layout_png, Level};
use maze_arcade_server::types::{Direction, RuntimeEvent, Snapshot, TileKind};
use serde::Serialize;
use serde_json::json;

/// Headless soak run: drives the engine for a fixed number of simulated
/// seconds and reports what happened as JSON lines.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Simulated seconds to run.
    #[arg(long, default_value_t = 120)]
    seconds: u64,
    /// Layout image to load.
    #[arg(long, default_value = "levels/default.png")]
    level: PathBuf,
    /// Turn at walls instead of idling once the spawn corridor ends.
    #[arg(long)]
    roam: bool,
    /// Write the final result as JSON to this file as well.
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, Serialize)]
struct EventTally {
    #[serde(rename = "pelletsEaten")]
    pellets_eaten: u64,
    #[serde(rename = "energizersEaten")]
    energizers_eaten: u64,
    #[serde(rename = "livesLost")]
    lives_lost: u64,
    #[serde(rename = "levelsCleared")]
    levels_cleared: u64,
    resets: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunResult {
    seconds: u64,
    ticks: u64,
    score: i32,
    lives: i32,
    #[serde(rename = "pelletsRemaining")]
    pellets_remaining: i32,
    #[serde(rename = "energizersRemaining")]
    energizers_remaining: i32,
    #[serde(rename = "gameOver")]
    game_over: bool,
    #[serde(rename = "levelCompleted")]
    level_completed: bool,
    #[serde(flatten)]
    tally: EventTally,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let engine = match build_engine(&cli.level) {
        Ok(engine) => engine,
        Err(message) => {
            log_line("error", "init_failed", json!({ "message": message }));
            return ExitCode::FAILURE;
        }
    };

    log_line(
        "info",
        "run_started",
        json!({
            "level": cli.level.display().to_string(),
            "seconds": cli.seconds,
            "roam": cli.roam,
        }),
    );

    let result = run(engine, &cli);
    log_line("info", "run_finished", serde_json::to_value(&result).unwrap_or_default());

    if let Some(path) = &cli.summary_out {
        let payload = serde_json::to_string_pretty(&result).unwrap_or_default();
        if let Err(source) = std::fs::write(path, payload) {
            log_line(
                "error",
                "summary_write_failed",
                json!({ "path": path.display().to_string(), "message": source.to_string() }),
            );
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

fn build_engine(level_path: &std::path::Path) -> Result<GameEngine, String> {
    let layout = load_layout_png(level_path).map_err(|source| source.to_string())?;
    let level = Level::from_image(&layout).map_err(|source| source.to_string())?;
    GameEngine::new(level, GameEngineOptions::default()).map_err(|source| source.to_string())
}

fn run(mut engine: GameEngine, cli: &Cli) -> RunResult {
    let total_ticks = cli.seconds * TICK_RATE as u64;
    let mut tally = EventTally::default();

    for _ in 0..total_ticks {
        if cli.roam && (engine.tick() + 1) % GAMEPLAY_TICK_DIVISOR == 0 {
            let snapshot = engine.build_snapshot(false);
            if let Some(turn) = pick_roam_turn(&engine, &snapshot) {
                engine.handle_input(turn);
            }
        }

        engine.step();
        tally_events(&mut engine, &mut tally);

        // The soak keeps the session moving through its banners.
        if engine.is_level_completed() {
            engine.handle_continue();
        } else if engine.is_game_over() {
            engine.handle_restart();
        }
    }

    let snapshot = engine.build_snapshot(false);
    RunResult {
        seconds: cli.seconds,
        ticks: snapshot.tick,
        score: snapshot.score,
        lives: snapshot.lives,
        pellets_remaining: snapshot.pellets_remaining,
        energizers_remaining: snapshot.energizers_remaining,
        game_over: snapshot.game_over,
        level_completed: snapshot.level_completed,
        tally,
    }
}

/// Keep the current heading while it is open; at a wall, take the first open
/// non-reversing direction in [Left, Right, Up, Down] order. Deterministic,
/// which is the point of a soak run.
fn pick_roam_turn(engine: &GameEngine, snapshot: &Snapshot) -> Option<Direction> {
    let level = engine.level();
    let (x, y) = (snapshot.player.x, snapshot.player.y);
    if passable(level, x, y, snapshot.player.dir) {
        return None;
    }
    Direction::MOVES
        .into_iter()
        .find(|&dir| dir != snapshot.player.dir.opposite() && passable(level, x, y, dir))
}

fn passable(level: &Level, x: i32, y: i32, direction: Direction) -> bool {
    level
        .neighbor(x, y, direction)
        .map(|index| {
            let tile = level.tile_at(index);
            !tile.is_wall() && tile.kind != TileKind::GhostGate
        })
        .unwrap_or(false)
}

fn tally_events(engine: &mut GameEngine, tally: &mut EventTally) {
    for event in engine.build_snapshot(true).events {
        match event {
            RuntimeEvent::PelletEaten { .. } => tally.pellets_eaten += 1,
            RuntimeEvent::EnergizerEaten { .. } => tally.energizers_eaten += 1,
            RuntimeEvent::LifeLost => tally.lives_lost += 1,
            RuntimeEvent::LevelCleared => tally.levels_cleared += 1,
            RuntimeEvent::GameReset { .. } => tally.resets += 1,
            RuntimeEvent::GameOver => {}
        }
    }
}

fn log_line(level: &str, event: &str, details: serde_json::Value) {
    let line = json!({
        "timestampMs": now_ms(),
        "level": level,
        "event": event,
        "details": details,
    });
    println!("{line}");
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
