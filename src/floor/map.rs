//! The fixed-size floor grid and its finalization queries.

use crate::config::{FLOOR_HEIGHT, FLOOR_WIDTH};
use crate::{Direction, Position, Tile, TileKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A complete dungeon floor: tile grid plus the summary data the rendering,
/// AI, and minimap layers key off.
///
/// A `Floor` is created once per build attempt, filled by the generation
/// passes, and discarded wholesale when validation fails. Nothing outside the
/// build call sees a partially generated floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    tiles: Vec<Tile>,
    /// Exit coordinates per room index, driving minimap reveal
    pub room_exits: HashMap<u8, Vec<Position>>,
    /// Stairs location; meaningful once the spawner has run
    pub stairs: Position,
    /// Whether a shop was placed on this floor
    pub has_shop: bool,
}

impl Default for Floor {
    fn default() -> Self {
        Self::new()
    }
}

impl Floor {
    /// Creates a floor of solid wall.
    pub fn new() -> Self {
        Self {
            tiles: vec![Tile::default(); (FLOOR_WIDTH * FLOOR_HEIGHT) as usize],
            room_exits: HashMap::new(),
            stairs: Position::new(0, 0),
            has_shop: false,
        }
    }

    /// Whether the position lies on the grid at all.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < FLOOR_WIDTH && pos.y < FLOOR_HEIGHT
    }

    /// Whether the position lies strictly inside the outer border ring.
    ///
    /// Generation never carves the border, so everything interesting
    /// happens in here.
    pub fn in_interior(&self, pos: Position) -> bool {
        pos.x >= 1 && pos.y >= 1 && pos.x < FLOOR_WIDTH - 1 && pos.y < FLOOR_HEIGHT - 1
    }

    fn index(pos: Position) -> usize {
        (pos.y * FLOOR_WIDTH + pos.x) as usize
    }

    /// Bounds-checked tile access.
    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        self.in_bounds(pos).then(|| &self.tiles[Self::index(pos)])
    }

    /// Bounds-checked mutable tile access.
    pub fn tile_mut(&mut self, pos: Position) -> Option<&mut Tile> {
        self.in_bounds(pos).then(|| &mut self.tiles[Self::index(pos)])
    }

    /// Terrain kind at a position; out-of-bounds reads as wall.
    pub fn kind(&self, pos: Position) -> TileKind {
        self.tile(pos).map(|tile| tile.kind).unwrap_or(TileKind::Wall)
    }

    /// Whether a tile can be walked on by ground movement.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.tile(pos).map(|tile| tile.is_ground() && !tile.impassable).unwrap_or(false)
    }

    /// Every position on the floor, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        (0..FLOOR_HEIGHT)
            .flat_map(|y| (0..FLOOR_WIDTH).map(move |x| Position::new(x, y)))
    }

    /// Raw tile slice, row-major. Byte-for-byte comparable across builds.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Records room exits and spawn eligibility once the layout is final.
    ///
    /// An exit is a room tile with a cardinal hallway neighbor. Spawn
    /// candidates are room tiles that are neither an exit nor cardinally
    /// adjacent to one.
    pub fn finalize_rooms(&mut self) {
        self.room_exits.clear();

        let mut exits: Vec<Position> = Vec::new();
        for pos in self.positions() {
            let tile = self.tiles[Self::index(pos)];
            if !tile.in_room() {
                continue;
            }
            let is_exit = pos.neighbors4().iter().any(|&neighbor| {
                self.tile(neighbor)
                    .map(|other| other.is_ground() && !other.in_room())
                    .unwrap_or(false)
            });
            if is_exit {
                self.room_exits.entry(tile.room_index).or_default().push(pos);
                exits.push(pos);
            }
        }

        for pos in self.positions() {
            let index = Self::index(pos);
            if !self.tiles[index].in_room() {
                continue;
            }
            let near_exit = exits
                .iter()
                .any(|exit| (exit.x - pos.x).abs() <= 1 && (exit.y - pos.y).abs() <= 1);
            let spawnable = self.in_interior(pos) && !near_exit;
            self.tiles[index].can_spawn = spawnable;
        }
    }

    /// Recomputes the same-kind neighbor masks for every interior tile.
    ///
    /// Bit order follows [`Direction::ALL`] / [`Direction::CARDINAL`].
    /// Idempotent: running this twice without tile mutation yields
    /// identical masks.
    pub fn update_tile_masks(&mut self) {
        for pos in self.positions() {
            if !self.in_interior(pos) {
                continue;
            }
            let kind = self.tiles[Self::index(pos)].kind;

            let mut mask8 = 0_u8;
            for (bit, direction) in Direction::ALL.iter().enumerate() {
                if self.kind(pos.step(*direction)) == kind {
                    mask8 |= 1 << bit;
                }
            }
            let mut mask4 = 0_u8;
            for (bit, direction) in Direction::CARDINAL.iter().enumerate() {
                if self.kind(pos.step(*direction)) == kind {
                    mask4 |= 1 << bit;
                }
            }

            let tile = &mut self.tiles[Self::index(pos)];
            tile.mask8 = mask8;
            tile.mask4 = mask4;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tile;

    #[test]
    fn test_new_floor_is_all_wall() {
        let floor = Floor::new();
        assert!(floor.positions().all(|pos| floor.kind(pos) == TileKind::Wall));
        assert!(!floor.has_shop);
    }

    #[test]
    fn test_bounds_checked_access() {
        let mut floor = Floor::new();
        assert!(floor.tile(Position::new(-1, 0)).is_none());
        assert!(floor.tile(Position::new(0, FLOOR_HEIGHT)).is_none());
        assert!(floor.tile_mut(Position::new(5, 5)).is_some());
        assert_eq!(floor.kind(Position::new(-3, -3)), TileKind::Wall);
    }

    #[test]
    fn test_masks_reflect_neighbors_and_are_idempotent() {
        let mut floor = Floor::new();
        // A lone ground tile: no same-kind neighbors at all.
        *floor.tile_mut(Position::new(5, 5)).unwrap() = Tile::ground();
        floor.update_tile_masks();
        assert_eq!(floor.tile(Position::new(5, 5)).unwrap().mask8, 0);

        // Its wall neighbor to the north sees walls everywhere except south.
        let north = floor.tile(Position::new(5, 4)).unwrap();
        assert_eq!(north.mask4 & 0b0100, 0); // south bit cleared
        assert_eq!(north.mask4 & 0b1011, 0b1011);

        let before: Vec<(u8, u8)> =
            floor.tiles().iter().map(|tile| (tile.mask8, tile.mask4)).collect();
        floor.update_tile_masks();
        let after: Vec<(u8, u8)> =
            floor.tiles().iter().map(|tile| (tile.mask8, tile.mask4)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_finalize_rooms_marks_exits_and_spawn_tiles() {
        let mut floor = Floor::new();
        // A 3x3 room at (4..7, 4..7) with a hallway mouth to the east of (6, 5).
        for y in 4..7 {
            for x in 4..7 {
                *floor.tile_mut(Position::new(x, y)).unwrap() = Tile::room_ground(1);
            }
        }
        *floor.tile_mut(Position::new(7, 5)).unwrap() = Tile::ground();

        floor.finalize_rooms();

        assert_eq!(floor.room_exits.get(&1), Some(&vec![Position::new(6, 5)]));
        // The exit and everything touching it is spawn-ineligible.
        assert!(!floor.tile(Position::new(6, 5)).unwrap().can_spawn);
        assert!(!floor.tile(Position::new(5, 5)).unwrap().can_spawn);
        // The far corner is fine.
        assert!(floor.tile(Position::new(4, 4)).unwrap().can_spawn);
    }
}
