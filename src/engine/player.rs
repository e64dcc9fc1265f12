use crate::types::{Direction, RuntimeEvent, TileKind};

use super::GameEngine;

impl GameEngine {
    /// A request into a blocked tile becomes the queued turn; an open tile
    /// turns the player immediately. Requests into the gate (or off the
    /// board) are dropped.
    pub(super) fn set_player_direction(&mut self, direction: Direction) {
        let Some(next) = self.player_next_tile(direction) else {
            return;
        };
        let tile = self.level.tile_at(next);
        if tile.kind == TileKind::GhostGate {
            return;
        }
        if !tile.is_wall() {
            self.player.facing = direction;
        } else if self.player.facing != direction {
            self.player.queued = direction;
        }
    }

    /// Queued turn first, straight ahead as the fallback, then pickup on the
    /// landing tile. Pellet wins when a tile somehow carries both.
    pub(super) fn tick_player(&mut self, batch: &mut Vec<RuntimeEvent>) {
        if !self.move_player(self.player.queued) {
            self.move_player(self.player.facing);
        }

        let index = self.player.tile;
        let tile = self.level.tile_at(index);
        let (x, y) = (tile.x, tile.y);
        if tile.pellet_active {
            if self.level.consume_pellet(index) {
                batch.push(RuntimeEvent::PelletEaten { x, y });
            }
        } else if tile.energizer_active && self.level.consume_energizer(index) {
            batch.push(RuntimeEvent::EnergizerEaten { x, y });
        }
    }

    /// Returns false without state change when the move is blocked. The
    /// player can never enter the gate. A successful move in the queued
    /// direction commits the turn and clears the queue.
    pub(super) fn move_player(&mut self, direction: Direction) -> bool {
        let Some(next) = self.player_next_tile(direction) else {
            return false;
        };
        let tile = self.level.tile_at(next);
        if tile.kind == TileKind::GhostGate || tile.is_wall() {
            return false;
        }

        self.player.tile = next;
        if self.player.queued == direction {
            self.player.facing = direction;
            self.player.queued = Direction::None;
        }
        true
    }

    /// Pure neighbor lookup from the player's tile; ghost targeting uses it
    /// to predict the player's near-future position.
    pub(super) fn player_next_tile(&self, direction: Direction) -> Option<usize> {
        let tile = self.level.tile_at(self.player.tile);
        self.level.neighbor(tile.x, tile.y, direction)
    }

    pub(super) fn spawn_player(&mut self) {
        self.player.tile = self.player_spawn;
        self.player.facing = Direction::Left;
        self.player.queued = Direction::None;
    }
}
