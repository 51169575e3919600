//! Per-tile state owned by [`Floor`](crate::Floor).

use serde::{Deserialize, Serialize};

/// Terrain class of a single tile.
///
/// The three classes come from the tileset model: walls are the primary
/// terrain the floor starts filled with, ground is carved into it, and the
/// secondary layer renders as water, lava, or void depending on the tileset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Solid rock; the initial state of every tile
    Wall,
    /// Water, lava, or void, depending on the tileset
    Secondary,
    /// Walkable ground: rooms and hallways
    Ground,
}

/// Trap species a tile can carry.
///
/// The generator only picks from the floor's weighted trap table; trap
/// behavior belongs to the battle system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrapKind {
    MudTrap,
    StickyTrap,
    GrimyTrap,
    PitfallTrap,
    WarpTrap,
    SpinTrap,
    SlowTrap,
    SealTrap,
    ExplosionTrap,
}

/// Index of an occupant in an entity table owned outside the floor.
///
/// The floor never owns entity lifetime; this is a weak back-reference used
/// by the AI and battle layers to find who stands on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OccupantId(pub u16);

/// Index of an item in the spawn list produced with the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemSlot(pub u16);

/// One tile of the floor grid.
///
/// Reset to [`Tile::default`] (solid wall) on every regeneration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Terrain class
    pub kind: TileKind,
    /// Room this tile belongs to; 0 = not part of a room
    pub room_index: u8,
    /// Impassable even to terrain-crossing movement
    pub impassable: bool,
    /// Trap on this tile, if any
    pub trap: Option<TrapKind>,
    /// Whether the floor's stairs stand here
    pub stairs: bool,
    /// Eligible as a spawn candidate (room interior, away from exits)
    pub can_spawn: bool,
    /// Part of a shop
    pub shop: bool,
    /// Entity standing on this tile, if any
    pub occupant: Option<OccupantId>,
    /// Item lying on this tile, if any
    pub item: Option<ItemSlot>,
    /// 8-neighbor same-kind bitmask; rendering/minimap only
    pub mask8: u8,
    /// 4-neighbor cardinal same-kind bitmask; rendering/minimap only
    pub mask4: u8,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            kind: TileKind::Wall,
            room_index: 0,
            impassable: false,
            trap: None,
            stairs: false,
            can_spawn: false,
            shop: false,
            occupant: None,
            item: None,
            mask8: 0,
            mask4: 0,
        }
    }
}

impl Tile {
    /// A freshly carved ground tile outside any room.
    pub fn ground() -> Self {
        Self { kind: TileKind::Ground, ..Self::default() }
    }

    /// A ground tile belonging to the given room.
    pub fn room_ground(room_index: u8) -> Self {
        Self { kind: TileKind::Ground, room_index, ..Self::default() }
    }

    /// Whether this tile is walkable ground.
    pub fn is_ground(&self) -> bool {
        self.kind == TileKind::Ground
    }

    /// Whether this tile is part of a committed room.
    pub fn in_room(&self) -> bool {
        self.room_index > 0
    }
}
