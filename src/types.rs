use serde::Serialize;

/// Discriminant order is load-bearing: 0..=3 matches the
/// [Left, Right, Up, Down] neighbor slot order used by the level and by the
/// ghost steering filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    None,
}

impl Direction {
    pub const MOVES: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }

    pub fn from_slot(slot: usize) -> Self {
        match slot {
            0 => Self::Left,
            1 => Self::Right,
            2 => Self::Up,
            3 => Self::Down,
            _ => Self::None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::None => Self::None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Empty,
    Wall,
    Path,
    GhostGate,
    GhostHome,
    GhostCrossroad,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostKind {
    Blinky,
    Inky,
    Pinky,
    Clyde,
}

impl GhostKind {
    pub const ALL: [GhostKind; 4] = [
        GhostKind::Blinky,
        GhostKind::Inky,
        GhostKind::Pinky,
        GhostKind::Clyde,
    ];
}

/// Frightened and Respawning are reserved: they are serialized and external
/// code may branch on them, but no transition in this core ever enters them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Scatter,
    Chase,
    Frightened,
    Respawning,
}

/// Pixel-unit board coordinate (tile-aligned, one tile = 32 units).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct TileView {
    pub kind: TileKind,
    pub x: i32,
    pub y: i32,
    pub pellet: bool,
    pub energizer: bool,
}

/// Static board description, sent once per client and after resets.
#[derive(Clone, Debug, Serialize)]
pub struct LevelInit {
    #[serde(rename = "tileWidth")]
    pub tile_width: i32,
    #[serde(rename = "tileHeight")]
    pub tile_height: i32,
    #[serde(rename = "tileSize")]
    pub tile_size: i32,
    pub tiles: Vec<TileView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    #[serde(rename = "type")]
    pub kind: GhostKind,
    pub mode: GhostMode,
    pub x: i32,
    pub y: i32,
    pub dir: Direction,
    pub target: Vec2,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    PelletEaten { x: i32, y: i32 },
    EnergizerEaten { x: i32, y: i32 },
    LifeLost,
    LevelCleared,
    GameOver,
    GameReset { pellets_restored: bool },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub score: i32,
    pub lives: i32,
    #[serde(rename = "levelsCleared")]
    pub levels_cleared: i32,
    #[serde(rename = "pelletsRemaining")]
    pub pellets_remaining: i32,
    #[serde(rename = "energizersRemaining")]
    pub energizers_remaining: i32,
    #[serde(rename = "gameOver")]
    pub game_over: bool,
    #[serde(rename = "levelCompleted")]
    pub level_completed: bool,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub events: Vec<RuntimeEvent>,
}
