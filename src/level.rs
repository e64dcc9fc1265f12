use std::path::Path;

use crate::constants::TILE_SIZE;
use crate::error::GameError;
use crate::types::{Direction, LevelInit, TileKind, TileView};

/// One board cell. Tiles are created once by [`Level::from_image`] and only
/// the `*_active` flags mutate afterwards.
#[derive(Clone, Debug)]
pub struct Tile {
    pub kind: TileKind,
    /// Top-left corner in pixel units (tile-aligned).
    pub x: i32,
    pub y: i32,
    pub pellet: bool,
    pub pellet_active: bool,
    pub energizer: bool,
    pub energizer_active: bool,
}

impl Tile {
    pub fn is_wall(&self) -> bool {
        self.kind == TileKind::Wall
    }
}

/// Decoded RGBA layout, one pixel per tile. Decoding happens at the edge so
/// the core never touches the filesystem.
#[derive(Clone, Debug)]
pub struct LayoutImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

pub fn load_layout_png(path: &Path) -> Result<LayoutImage, GameError> {
    let bytes = std::fs::read(path).map_err(|source| GameError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = image::load_from_memory(&bytes).map_err(|source| GameError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = decoded.to_rgba8();
    Ok(LayoutImage {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

#[derive(Clone, Debug)]
pub struct Level {
    tiles: Vec<Tile>,
    tile_width: i32,
    tile_height: i32,
    pellet_count: i32,
    energizer_count: i32,
}

impl Level {
    /// Builds the board from a decoded layout. Each pixel classifies one tile
    /// through the fixed color table; unmatched colors fall back to `Empty`.
    pub fn from_image(layout: &LayoutImage) -> Result<Self, GameError> {
        if layout.width == 0 || layout.height == 0 {
            return Err(GameError::EmptyLayout {
                width: layout.width,
                height: layout.height,
            });
        }
        let expected = layout.width as usize * layout.height as usize * 4;
        if layout.pixels.len() != expected {
            return Err(GameError::TruncatedLayout {
                actual: layout.pixels.len(),
                expected,
            });
        }

        let tile_width = layout.width as i32;
        let tile_height = layout.height as i32;
        let mut tiles = Vec::with_capacity((tile_width * tile_height) as usize);
        let mut pellet_count = 0;
        let mut energizer_count = 0;

        for (index, rgba) in layout.pixels.chunks_exact(4).enumerate() {
            let index = index as i32;
            let mut tile = Tile {
                kind: TileKind::Empty,
                x: (index % tile_width) * TILE_SIZE,
                y: (index / tile_width) * TILE_SIZE,
                pellet: false,
                pellet_active: false,
                energizer: false,
                energizer_active: false,
            };

            match [rgba[0], rgba[1], rgba[2]] {
                [0x00, 0x00, 0x00] => tile.kind = TileKind::Empty,
                [0xff, 0x64, 0x00] => tile.kind = TileKind::GhostGate,
                [0xff, 0xff, 0xff] => tile.kind = TileKind::GhostHome,
                [0x00, 0x00, 0xaa] => tile.kind = TileKind::Wall,
                [0xff, 0x00, 0x00] => {
                    tile.kind = TileKind::Path;
                    tile.energizer = true;
                    tile.energizer_active = true;
                    energizer_count += 1;
                }
                [0xff, 0xaf, 0xb9] => {
                    tile.kind = TileKind::Path;
                    tile.pellet = true;
                    tile.pellet_active = true;
                    pellet_count += 1;
                }
                [0x64, 0x64, 0x64] => tile.kind = TileKind::Path,
                [0x00, 0xff, 0xff] => {
                    tile.kind = TileKind::GhostCrossroad;
                    tile.pellet = true;
                    tile.pellet_active = true;
                    pellet_count += 1;
                }
                [0xff, 0xff, 0x00] => tile.kind = TileKind::GhostCrossroad,
                _ => {}
            }

            tiles.push(tile);
        }

        Ok(Self {
            tiles,
            tile_width,
            tile_height,
            pellet_count,
            energizer_count,
        })
    }

    pub fn tile_width(&self) -> i32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> i32 {
        self.tile_height
    }

    pub fn pixel_width(&self) -> i32 {
        self.tile_width * TILE_SIZE
    }

    pub fn pixel_height(&self) -> i32 {
        self.tile_height * TILE_SIZE
    }

    pub fn remaining_pellets(&self) -> i32 {
        self.pellet_count
    }

    pub fn remaining_energizers(&self) -> i32 {
        self.energizer_count
    }

    /// Bounds-checked index lookup by pixel-unit coordinate. Outside the
    /// board there is no tile, and every caller treats that as impassable.
    pub fn tile_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.pixel_width() || y >= self.pixel_height() {
            return None;
        }
        Some(((y / TILE_SIZE) * self.tile_width + x / TILE_SIZE) as usize)
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        self.tile_index(x, y).map(|index| &self.tiles[index])
    }

    pub fn tile_at(&self, index: usize) -> &Tile {
        &self.tiles[index]
    }

    /// Directional neighbor with toroidal wraparound: a query within one tile
    /// of the edge, stepping over that edge, re-enters from the opposite
    /// side. For any in-bounds coordinate this always resolves to a tile.
    pub fn neighbor(&self, x: i32, y: i32, direction: Direction) -> Option<usize> {
        match direction {
            Direction::Left => self.left_of(x, y),
            Direction::Right => self.right_of(x, y),
            Direction::Up => self.upper_of(x, y),
            Direction::Down => self.lower_of(x, y),
            Direction::None => None,
        }
    }

    pub fn left_of(&self, mut x: i32, y: i32) -> Option<usize> {
        if x < TILE_SIZE && x >= 0 {
            x += self.pixel_width();
        }
        self.tile_index(x - TILE_SIZE, y)
    }

    pub fn right_of(&self, mut x: i32, y: i32) -> Option<usize> {
        if x >= self.pixel_width() - TILE_SIZE && x < self.pixel_width() {
            x -= self.pixel_width();
        }
        self.tile_index(x + TILE_SIZE, y)
    }

    pub fn upper_of(&self, x: i32, mut y: i32) -> Option<usize> {
        if y < TILE_SIZE && y >= 0 {
            y += self.pixel_height();
        }
        self.tile_index(x, y - TILE_SIZE)
    }

    pub fn lower_of(&self, x: i32, mut y: i32) -> Option<usize> {
        if y >= self.pixel_height() - TILE_SIZE && y < self.pixel_height() {
            y -= self.pixel_height();
        }
        self.tile_index(x, y + TILE_SIZE)
    }

    /// All four neighbors in [Left, Right, Up, Down] order. The slot order is
    /// load-bearing: ghost steering maps slots 0..=3 to directions and the
    /// crossroad filter keys on slot 2.
    pub fn neighbors(&self, x: i32, y: i32) -> [Option<usize>; 4] {
        [
            self.left_of(x, y),
            self.right_of(x, y),
            self.upper_of(x, y),
            self.lower_of(x, y),
        ]
    }

    /// Manhattan distance in tile units.
    pub fn tile_distance(&self, a: usize, b: usize) -> i32 {
        let a = &self.tiles[a];
        let b = &self.tiles[b];
        (b.x - a.x).abs() / TILE_SIZE + (b.y - a.y).abs() / TILE_SIZE
    }

    /// Deactivates the pellet on a tile and decrements the remaining count.
    /// Returns false when there was no active pellet, so a repeated pickup on
    /// the same tile can never double-decrement.
    pub fn consume_pellet(&mut self, index: usize) -> bool {
        let tile = &mut self.tiles[index];
        if !tile.pellet_active {
            return false;
        }
        tile.pellet_active = false;
        self.pellet_count -= 1;
        true
    }

    pub fn consume_energizer(&mut self, index: usize) -> bool {
        let tile = &mut self.tiles[index];
        if !tile.energizer_active {
            return false;
        }
        tile.energizer_active = false;
        self.energizer_count -= 1;
        true
    }

    /// Level-clear condition, evaluated as a live recount of active flags.
    /// The incremental counts are the serving copy; this keeps them honest.
    pub fn all_consumables_cleared(&self) -> bool {
        !self
            .tiles
            .iter()
            .any(|tile| tile.pellet_active || tile.energizer_active)
    }

    /// Reactivates every designated consumable and restores the remaining
    /// counts to their post-build totals.
    pub fn reset_consumables(&mut self) {
        let mut pellet_count = 0;
        let mut energizer_count = 0;
        for tile in &mut self.tiles {
            if tile.pellet {
                tile.pellet_active = true;
                pellet_count += 1;
            } else if tile.energizer {
                tile.energizer_active = true;
                energizer_count += 1;
            }
        }
        self.pellet_count = pellet_count;
        self.energizer_count = energizer_count;
    }

    pub fn to_level_init(&self) -> LevelInit {
        LevelInit {
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            tile_size: TILE_SIZE,
            tiles: self
                .tiles
                .iter()
                .map(|tile| TileView {
                    kind: tile.kind,
                    x: tile.x,
                    y: tile.y,
                    pellet: tile.pellet,
                    energizer: tile.energizer,
                })
                .collect(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{layout_from_ascii, level_from_ascii};
    use super::{Level, LayoutImage};
    use crate::constants::TILE_SIZE;
    use crate::types::{Direction, TileKind};

    fn open_ring() -> Level {
        level_from_ascii(&[
            "#####", //
            "#. .#", //
            "#o#.#", //
            "#. .#", //
            "#####",
        ])
    }

    #[test]
    fn color_table_classifies_every_kind() {
        let level = level_from_ascii(&[
            "_-H", //
            "#o.", //
            " Xx",
        ]);
        let kinds: Vec<TileKind> = (0..9).map(|i| level.tile_at(i).kind).collect();
        assert_eq!(
            kinds,
            vec![
                TileKind::Empty,
                TileKind::GhostGate,
                TileKind::GhostHome,
                TileKind::Wall,
                TileKind::Path,
                TileKind::Path,
                TileKind::Path,
                TileKind::GhostCrossroad,
                TileKind::GhostCrossroad,
            ]
        );
        assert_eq!(level.remaining_pellets(), 2);
        assert_eq!(level.remaining_energizers(), 1);
        assert!(level.tile_at(7).pellet_active);
        assert!(!level.tile_at(8).pellet_active);
    }

    #[test]
    fn unknown_colors_fall_back_to_empty() {
        let layout = LayoutImage {
            width: 1,
            height: 1,
            pixels: vec![0x12, 0x34, 0x56, 0xff],
        };
        let level = Level::from_image(&layout).expect("builds");
        assert_eq!(level.tile_at(0).kind, TileKind::Empty);
    }

    #[test]
    fn empty_layout_is_rejected() {
        let layout = LayoutImage {
            width: 0,
            height: 3,
            pixels: Vec::new(),
        };
        assert!(Level::from_image(&layout).is_err());
    }

    #[test]
    fn out_of_bounds_lookup_returns_none() {
        let level = open_ring();
        assert!(level.tile(-1, 0).is_none());
        assert!(level.tile(0, -1).is_none());
        assert!(level.tile(level.pixel_width(), 0).is_none());
        assert!(level.tile(0, level.pixel_height()).is_none());
        assert!(level.tile(0, 0).is_some());
    }

    #[test]
    fn neighbors_wrap_around_every_edge() {
        let level = open_ring();
        let last_col = level.pixel_width() - TILE_SIZE;
        let last_row = level.pixel_height() - TILE_SIZE;

        let left = level.neighbor(0, TILE_SIZE, Direction::Left).unwrap();
        assert_eq!(level.tile_at(left).x, last_col);
        assert_eq!(level.tile_at(left).y, TILE_SIZE);

        let right = level.neighbor(last_col, TILE_SIZE, Direction::Right).unwrap();
        assert_eq!(level.tile_at(right).x, 0);

        let up = level.neighbor(TILE_SIZE, 0, Direction::Up).unwrap();
        assert_eq!(level.tile_at(up).y, last_row);

        let down = level.neighbor(TILE_SIZE, last_row, Direction::Down).unwrap();
        assert_eq!(level.tile_at(down).y, 0);
    }

    #[test]
    fn interior_neighbors_are_adjacent_tiles() {
        let level = open_ring();
        let x = 2 * TILE_SIZE;
        let y = 2 * TILE_SIZE;
        let neighbors = level.neighbors(x, y);
        let expect = [
            (x - TILE_SIZE, y),
            (x + TILE_SIZE, y),
            (x, y - TILE_SIZE),
            (x, y + TILE_SIZE),
        ];
        for (slot, (ex, ey)) in expect.iter().enumerate() {
            let tile = level.tile_at(neighbors[slot].unwrap());
            assert_eq!((tile.x, tile.y), (*ex, *ey), "slot {slot}");
        }
    }

    #[test]
    fn tile_distance_is_symmetric_and_zero_on_self() {
        let level = open_ring();
        for a in 0..25 {
            assert_eq!(level.tile_distance(a, a), 0);
            for b in 0..25 {
                assert_eq!(level.tile_distance(a, b), level.tile_distance(b, a));
            }
        }
        let a = level.tile_index(TILE_SIZE, TILE_SIZE).unwrap();
        let b = level.tile_index(3 * TILE_SIZE, 3 * TILE_SIZE).unwrap();
        assert_eq!(level.tile_distance(a, b), 4);
    }

    #[test]
    fn counts_match_active_designations_after_build() {
        let level = open_ring();
        let layout = layout_from_ascii(&[
            "#####", //
            "#. .#", //
            "#o#.#", //
            "#. .#", //
            "#####",
        ]);
        assert_eq!(layout.width, 5);
        assert_eq!(level.remaining_pellets(), 5);
        assert_eq!(level.remaining_energizers(), 1);
        assert!(!level.all_consumables_cleared());
    }

    #[test]
    fn pellet_pickup_decrements_exactly_once() {
        let mut level = open_ring();
        let index = level.tile_index(TILE_SIZE, TILE_SIZE).unwrap();
        assert!(level.consume_pellet(index));
        assert_eq!(level.remaining_pellets(), 4);
        assert!(!level.consume_pellet(index));
        assert_eq!(level.remaining_pellets(), 4);
    }

    #[test]
    fn reset_restores_consumables_and_counts() {
        let mut level = open_ring();
        let pellets = level.remaining_pellets();
        let energizers = level.remaining_energizers();

        for index in 0..25 {
            level.consume_pellet(index);
            level.consume_energizer(index);
        }
        assert!(level.all_consumables_cleared());

        level.reset_consumables();
        assert_eq!(level.remaining_pellets(), pellets);
        assert_eq!(level.remaining_energizers(), energizers);
        for index in 0..25 {
            let tile = level.tile_at(index);
            assert_eq!(tile.pellet_active, tile.pellet);
            assert_eq!(tile.energizer_active, tile.energizer);
        }
    }

    #[test]
    fn bundled_layout_loads_with_expected_special_tiles() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("levels/default.png");
        let layout = super::load_layout_png(&path).expect("bundled layout loads");
        let level = Level::from_image(&layout).expect("bundled layout builds");

        assert_eq!(level.tile_width(), 28);
        assert_eq!(level.tile_height(), 31);
        assert_eq!(level.remaining_pellets(), 240);
        assert_eq!(level.remaining_energizers(), 4);

        // Ghost homes, gate, porch and player spawn from the spawn table.
        for (x, y) in [(352, 416), (352, 480), (512, 416), (512, 480)] {
            assert_eq!(level.tile(x, y).unwrap().kind, TileKind::GhostHome);
        }
        assert_eq!(level.tile(416, 384).unwrap().kind, TileKind::GhostGate);
        assert_eq!(level.tile(416, 352).unwrap().kind, TileKind::Path);
        assert_eq!(level.tile(416, 736).unwrap().kind, TileKind::Path);
    }

    #[test]
    fn clear_condition_needs_both_counts_at_zero() {
        let mut level = level_from_ascii(&[
            "###", //
            "#.#", //
            "#o#",
        ]);
        let pellet = level.tile_index(TILE_SIZE, TILE_SIZE).unwrap();
        let energizer = level.tile_index(TILE_SIZE, 2 * TILE_SIZE).unwrap();

        assert!(level.consume_pellet(pellet));
        assert!(!level.all_consumables_cleared());
        assert!(level.consume_energizer(energizer));
        assert!(level.all_consumables_cleared());
    }
}
