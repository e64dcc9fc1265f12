use crate::types::{GhostKind, Vec2};

/// Logical physics rate. Gameplay advances once every
/// `GAMEPLAY_TICK_DIVISOR` logical ticks.
pub const TICK_RATE: u32 = 60;
pub const MS_PER_TICK: f64 = 1000.0 / TICK_RATE as f64;
pub const GAMEPLAY_TICK_DIVISOR: u64 = 20;

pub const TILE_SIZE: i32 = 32;

pub const SCATTER_DURATION_MS: f64 = 7_000.0;
pub const CHASE_DURATION_MS: f64 = 20_000.0;

pub const PELLET_SCORE: i32 = 5;
pub const ENERGIZER_SCORE: i32 = 50;
pub const INITIAL_LIVES: i32 = 5;

/// Clyde switches from chase to retreat below this tile distance.
pub const CLYDE_RETREAT_DISTANCE: i32 = 5;

/// Spawn and scatter positions in pixel units, tied to the bundled layout.
#[derive(Clone, Copy, Debug)]
pub struct GhostSpawn {
    pub home: Vec2,
    pub scatter: Vec2,
}

#[derive(Clone, Copy, Debug)]
pub struct SpawnTable {
    pub player: Vec2,
    pub porch: Vec2,
    pub blinky: GhostSpawn,
    pub inky: GhostSpawn,
    pub pinky: GhostSpawn,
    pub clyde: GhostSpawn,
}

impl SpawnTable {
    pub fn ghost(&self, kind: GhostKind) -> GhostSpawn {
        match kind {
            GhostKind::Blinky => self.blinky,
            GhostKind::Inky => self.inky,
            GhostKind::Pinky => self.pinky,
            GhostKind::Clyde => self.clyde,
        }
    }
}

impl Default for SpawnTable {
    fn default() -> Self {
        Self {
            player: Vec2 { x: 416, y: 736 },
            porch: Vec2 { x: 416, y: 352 },
            blinky: GhostSpawn {
                home: Vec2 { x: 352, y: 416 },
                scatter: Vec2 { x: 864, y: 0 },
            },
            inky: GhostSpawn {
                home: Vec2 { x: 352, y: 480 },
                scatter: Vec2 { x: 864, y: 960 },
            },
            pinky: GhostSpawn {
                home: Vec2 { x: 512, y: 416 },
                scatter: Vec2 { x: 0, y: 0 },
            },
            clyde: GhostSpawn {
                home: Vec2 { x: 512, y: 480 },
                scatter: Vec2 { x: 0, y: 960 },
            },
        }
    }
}
