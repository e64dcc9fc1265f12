use crate::constants::CLYDE_RETREAT_DISTANCE;
use crate::types::{Direction, GhostKind, GhostMode, TileKind};

use super::GameEngine;

impl GameEngine {
    /// Back to the home tile, aiming for the porch again. Mode and facing are
    /// deliberately left as they were.
    pub(super) fn spawn_ghost(&mut self, index: usize) {
        let porch = self.porch;
        let ghost = &mut self.ghosts[index];
        ghost.tile = ghost.home;
        ghost.target = porch;
    }

    /// Greedy single step toward the target. Candidates are the four
    /// neighbors in [Left, Right, Up, Down] order, filtered by wall,
    /// no-reversal, gate (only crossable from a home tile) and the
    /// crossroad no-up rule. The first surviving candidate wins unless a
    /// later one is strictly closer to the target than the ghost's own tile.
    /// With every candidate filtered out the ghost holds position and its
    /// facing collapses to None.
    pub(super) fn move_ghost(&mut self, index: usize) {
        let (tile, facing, target) = {
            let ghost = &self.ghosts[index];
            (ghost.tile, ghost.facing, ghost.target)
        };
        let current = self.level.tile_at(tile);
        let current_kind = current.kind;
        let neighbors = self.level.neighbors(current.x, current.y);
        let current_distance = self.level.tile_distance(tile, target);

        let mut chosen: Option<(usize, Direction)> = None;
        for (slot, neighbor) in neighbors.into_iter().enumerate() {
            let Some(next) = neighbor else {
                continue;
            };
            let next_tile = self.level.tile_at(next);
            if next_tile.is_wall() {
                continue;
            }
            let direction = Direction::from_slot(slot);
            if direction == facing.opposite() {
                continue;
            }
            if current_kind != TileKind::GhostHome && next_tile.kind == TileKind::GhostGate {
                continue;
            }
            if current_kind == TileKind::GhostCrossroad && slot == 2 {
                continue;
            }

            match chosen {
                None => chosen = Some((next, direction)),
                Some(_) => {
                    if self.level.tile_distance(next, target) < current_distance {
                        chosen = Some((next, direction));
                    }
                }
            }
        }

        let ghost = &mut self.ghosts[index];
        match chosen {
            Some((next, direction)) => {
                ghost.tile = next;
                ghost.facing = direction;
            }
            None => ghost.facing = Direction::None,
        }
    }

    /// Runs after movement. Until the porch is reached no other targeting
    /// applies; afterwards scatter mode pins the fixed corner and chase picks
    /// a per-kind target from the player's state.
    pub(super) fn update_ghost_target(&mut self, index: usize) {
        let (tile, target, scatter, mode, kind) = {
            let ghost = &self.ghosts[index];
            (
                ghost.tile,
                ghost.target,
                ghost.scatter_target,
                ghost.mode,
                ghost.kind,
            )
        };

        if target == self.porch {
            if tile == self.porch {
                self.ghosts[index].target = scatter;
            }
            return;
        }

        if mode == GhostMode::Scatter {
            self.ghosts[index].target = scatter;
            return;
        }

        let player_tile = self.player.tile;
        let next_target = match kind {
            GhostKind::Blinky => player_tile,
            GhostKind::Inky => self
                .player_next_tile(self.player.facing.opposite())
                .unwrap_or(player_tile),
            GhostKind::Pinky => self
                .player_next_tile(self.player.facing)
                .unwrap_or(player_tile),
            GhostKind::Clyde => {
                if self.level.tile_distance(tile, player_tile) < CLYDE_RETREAT_DISTANCE {
                    scatter
                } else {
                    player_tile
                }
            }
        };
        self.ghosts[index].target = next_target;
    }
}
