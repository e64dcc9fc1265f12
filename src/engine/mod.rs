use crate::constants::{
    CHASE_DURATION_MS, GAMEPLAY_TICK_DIVISOR, INITIAL_LIVES, MS_PER_TICK, SCATTER_DURATION_MS,
    SpawnTable, ENERGIZER_SCORE, PELLET_SCORE, TICK_RATE,
};
use crate::error::GameError;
use crate::level::Level;
use crate::types::{
    Direction, GhostKind, GhostMode, GhostView, LevelInit, PlayerView, RuntimeEvent, Snapshot, Vec2,
};

mod ghost;
mod player;

#[derive(Clone, Debug)]
struct PlayerBody {
    tile: usize,
    facing: Direction,
    /// One-deep pending-turn buffer, attempted before `facing` each tick.
    queued: Direction,
}

#[derive(Clone, Debug)]
struct GhostBody {
    kind: GhostKind,
    mode: GhostMode,
    tile: usize,
    facing: Direction,
    target: usize,
    scatter_target: usize,
    home: usize,
}

#[derive(Clone, Debug, Default)]
pub struct GameEngineOptions {
    /// Overrides the bundled spawn/scatter table; every entry must resolve to
    /// a tile of the level.
    pub spawns: Option<SpawnTable>,
}

/// The whole session: board, player, four ghosts, counters and the
/// fixed-step clock. Single-threaded; `&mut` ticks, `&` reads.
#[derive(Clone, Debug)]
pub struct GameEngine {
    level: Level,
    porch: usize,
    player_spawn: usize,
    player: PlayerBody,
    ghosts: Vec<GhostBody>,

    score: i32,
    lives: i32,
    levels_cleared: i32,
    tick_counter: u64,
    tick_budget_ms: f64,
    phase_elapsed_ms: f64,
    game_over: bool,
    level_completed: bool,
    events: Vec<RuntimeEvent>,
}

impl GameEngine {
    pub fn new(level: Level, options: GameEngineOptions) -> Result<Self, GameError> {
        let spawns = options.spawns.unwrap_or_default();
        let resolve = |role: &'static str, v: Vec2| {
            level
                .tile_index(v.x, v.y)
                .ok_or(GameError::MissingTile { role, x: v.x, y: v.y })
        };

        let player_spawn = resolve("player spawn", spawns.player)?;
        let porch = resolve("porch", spawns.porch)?;

        let mut ghosts = Vec::with_capacity(GhostKind::ALL.len());
        for kind in GhostKind::ALL {
            let spawn = spawns.ghost(kind);
            let home = resolve("ghost home", spawn.home)?;
            let scatter_target = resolve("scatter target", spawn.scatter)?;
            ghosts.push(GhostBody {
                kind,
                mode: GhostMode::Scatter,
                tile: home,
                facing: Direction::Left,
                target: porch,
                scatter_target,
                home,
            });
        }

        Ok(Self {
            level,
            porch,
            player_spawn,
            player: PlayerBody {
                tile: player_spawn,
                facing: Direction::Left,
                queued: Direction::None,
            },
            ghosts,
            score: 0,
            lives: INITIAL_LIVES,
            levels_cleared: 0,
            tick_counter: 0,
            tick_budget_ms: 0.0,
            phase_elapsed_ms: 0.0,
            game_over: false,
            level_completed: false,
            events: Vec::new(),
        })
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn levels_cleared(&self) -> i32 {
        self.levels_cleared
    }

    pub fn tick(&self) -> u64 {
        self.tick_counter
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_level_completed(&self) -> bool {
        self.level_completed
    }

    /// Accumulates elapsed wall-clock time and drains it in whole logical
    /// ticks. Returns how many ticks ran. Catch-up is capped at one second of
    /// simulation per call; anything beyond that is dropped (stall recovery).
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        self.tick_budget_ms += elapsed_ms;
        let mut ticks = 0;
        while self.tick_budget_ms >= MS_PER_TICK {
            self.tick_budget_ms -= MS_PER_TICK;
            if ticks < TICK_RATE {
                self.step();
                ticks += 1;
            }
        }
        ticks
    }

    /// One logical tick at 60 Hz. Gameplay advances on every 20th tick; the
    /// phase timer advances on all of them while the session is live.
    pub fn step(&mut self) {
        self.tick_counter += 1;

        if self.tick_counter % GAMEPLAY_TICK_DIVISOR == 0 {
            if !self.game_over && !self.level_completed {
                self.gameplay_tick();
            }
            self.level_tick();
        }

        if !self.game_over && !self.level_completed {
            self.advance_phase_timer();
        }
    }

    fn gameplay_tick(&mut self) {
        let mut batch = Vec::new();
        self.tick_player(&mut batch);
        for index in 0..self.ghosts.len() {
            self.move_ghost(index);
            self.update_ghost_target(index);
        }
        if self.ghosts.iter().any(|ghost| ghost.tile == self.player.tile) {
            batch.push(RuntimeEvent::LifeLost);
        }
        self.apply_events(batch);
    }

    /// Central application of the tick's outcomes: movement and pickup code
    /// only produce events, counters mutate here.
    fn apply_events(&mut self, batch: Vec<RuntimeEvent>) {
        for event in batch {
            match event {
                RuntimeEvent::PelletEaten { .. } => self.score += PELLET_SCORE,
                RuntimeEvent::EnergizerEaten { .. } => self.score += ENERGIZER_SCORE,
                RuntimeEvent::LifeLost => self.lives -= 1,
                _ => {}
            }
            let life_lost = matches!(event, RuntimeEvent::LifeLost);
            self.events.push(event);
            if life_lost {
                if self.lives == 0 {
                    self.game_over = true;
                    self.events.push(RuntimeEvent::GameOver);
                } else {
                    self.reset(false);
                }
            }
        }
    }

    fn level_tick(&mut self) {
        if !self.level_completed && self.level.all_consumables_cleared() {
            self.level_completed = true;
            self.events.push(RuntimeEvent::LevelCleared);
        }
    }

    /// Scatter for 7 s, chase for 20 s, looping. The elapsed counter is
    /// reduced by the exact phase duration on each flip so the remainder
    /// carries over and no drift accumulates.
    fn advance_phase_timer(&mut self) {
        self.phase_elapsed_ms += MS_PER_TICK;
        match self.ghosts[0].mode {
            GhostMode::Scatter if self.phase_elapsed_ms >= SCATTER_DURATION_MS => {
                self.phase_elapsed_ms -= SCATTER_DURATION_MS;
                self.set_ghost_modes(GhostMode::Chase);
            }
            GhostMode::Chase if self.phase_elapsed_ms >= CHASE_DURATION_MS => {
                self.phase_elapsed_ms -= CHASE_DURATION_MS;
                self.set_ghost_modes(GhostMode::Scatter);
            }
            _ => {}
        }
    }

    fn set_ghost_modes(&mut self, mode: GhostMode) {
        for ghost in &mut self.ghosts {
            ghost.mode = mode;
        }
    }

    pub fn handle_input(&mut self, direction: Direction) {
        self.set_player_direction(direction);
    }

    /// Valid only while game-over.
    pub fn handle_restart(&mut self) {
        if self.game_over {
            self.reset(true);
        }
    }

    /// Valid only while level-completed.
    pub fn handle_continue(&mut self) {
        if self.level_completed {
            self.reset(true);
        }
    }

    /// Respawns everything. A game-over reset also restores score, lives and
    /// cleared-level count; a level-complete reset banks the cleared level.
    /// Consumables are restored only when `reset_pellets` is set (a life-loss
    /// soft reset keeps the eaten board).
    pub fn reset(&mut self, reset_pellets: bool) {
        if self.game_over {
            self.score = 0;
            self.levels_cleared = 0;
            self.lives = INITIAL_LIVES;
            self.game_over = false;
        } else if self.level_completed {
            self.levels_cleared += 1;
            self.level_completed = false;
        }

        self.phase_elapsed_ms = 0.0;

        if reset_pellets {
            self.level.reset_consumables();
        }

        self.spawn_player();
        for index in 0..self.ghosts.len() {
            self.spawn_ghost(index);
        }

        self.events.push(RuntimeEvent::GameReset {
            pellets_restored: reset_pellets,
        });
    }

    pub fn level_init(&self) -> LevelInit {
        self.level.to_level_init()
    }

    /// Read-only projection of post-tick state. With `include_events` the
    /// pending event list is drained into the snapshot.
    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let player_tile = self.level.tile_at(self.player.tile);
        Snapshot {
            tick: self.tick_counter,
            score: self.score,
            lives: self.lives,
            levels_cleared: self.levels_cleared,
            pellets_remaining: self.level.remaining_pellets(),
            energizers_remaining: self.level.remaining_energizers(),
            game_over: self.game_over,
            level_completed: self.level_completed,
            player: PlayerView {
                x: player_tile.x,
                y: player_tile.y,
                dir: self.player.facing,
            },
            ghosts: self
                .ghosts
                .iter()
                .map(|ghost| {
                    let tile = self.level.tile_at(ghost.tile);
                    let target = self.level.tile_at(ghost.target);
                    GhostView {
                        kind: ghost.kind,
                        mode: ghost.mode,
                        x: tile.x,
                        y: tile.y,
                        dir: ghost.facing,
                        target: Vec2 {
                            x: target.x,
                            y: target.y,
                        },
                    }
                })
                .collect(),
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                Vec::new()
            },
        }
    }
}
