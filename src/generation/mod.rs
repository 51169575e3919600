//! # Generation Module
//!
//! Procedural floor generation: grid partitioning, structure templates,
//! layout passes, secondary terrain, validation, and spawning.
//!
//! The entry point is [`FloorFactory`], which turns one read-only
//! [`FloorData`] plus a seeded random source into a finished
//! [`GeneratedFloor`](crate::GeneratedFloor). Everything below it is a pure
//! function of its arguments; no module here reads ambient state.

pub mod factory;
pub mod grid;
pub mod layout;
pub mod spawner;
pub mod structure;
pub mod terrain;
pub mod validate;

pub use factory::*;
pub use spawner::*;
pub use structure::*;

use crate::TrapKind;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// One entry of a floor's weighted monster table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterWeight {
    /// Species index into the external monster database
    pub species: u16,
    /// Level the spawn enters at
    pub level: u8,
    /// Relative selection weight
    pub weight: u32,
}

/// One entry of a floor's weighted trap table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapWeight {
    pub kind: TrapKind,
    pub weight: u32,
}

/// Weather the floor starts under. Passed through to the battle layer;
/// generation never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weather {
    Clear,
    Rain,
    Sandstorm,
    Hail,
    Fog,
}

/// Declarative parameters for one floor, produced by an external
/// configuration loader and consumed read-only here.
///
/// # Examples
///
/// ```
/// use warren::{FloorData, Structure};
///
/// let data = FloorData::new(Structure::MediumLarge);
/// assert!(data.floor_connectivity > 0);
/// assert!(!data.secondary_used);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorData {
    /// Floor topology template
    pub structure: Structure,
    /// Base room count; negative means an exact count with no jitter
    pub room_density: i8,
    /// Steps of the cell connection walk; more steps add redundant loops
    pub floor_connectivity: u8,
    /// Enemies rolled at floor start
    pub initial_enemy_density: u8,
    /// Whether hallway dead ends may survive generation
    pub dead_ends: bool,
    /// Base item count
    pub item_density: u8,
    /// Upper bound on placed traps
    pub trap_density: u8,
    /// Extra organic hallways carved after the layout is connected
    pub extra_hallway_density: u8,
    /// Base count of items buried in walls
    pub buried_item_density: u8,
    /// Freestanding lakes stamped by secondary terrain
    pub water_density: u8,
    /// Percent chance for a room cell to be flagged imperfect
    pub imperfect_rooms: u8,
    /// Percent chance for each river to grow a lake
    pub secondary_percentage: u8,
    /// Master switch for secondary terrain
    pub secondary_used: bool,
    /// Weighted species+level table for enemy spawns
    pub monster_table: Vec<MonsterWeight>,
    /// Weighted table for trap placement
    pub trap_table: Vec<TrapWeight>,
    /// Passed through to the visibility layer; unused by generation
    pub darkness_level: u8,
    /// Passed through to the battle layer; unused by generation
    pub weather: Weather,
}

impl FloorData {
    /// Creates floor parameters with workable mid-dungeon defaults.
    pub fn new(structure: Structure) -> Self {
        Self {
            structure,
            room_density: 5,
            floor_connectivity: 15,
            initial_enemy_density: 4,
            dead_ends: false,
            item_density: 4,
            trap_density: 4,
            extra_hallway_density: 8,
            buried_item_density: 0,
            water_density: 0,
            imperfect_rooms: 0,
            secondary_percentage: 30,
            secondary_used: false,
            monster_table: vec![MonsterWeight { species: 1, level: 5, weight: 10 }],
            trap_table: vec![
                TrapWeight { kind: TrapKind::MudTrap, weight: 10 },
                TrapWeight { kind: TrapKind::WarpTrap, weight: 5 },
            ],
            darkness_level: 0,
            weather: Weather::Clear,
        }
    }

    /// Creates small, simple parameters for tests.
    pub fn for_testing(structure: Structure) -> Self {
        Self {
            room_density: 4,
            floor_connectivity: 10,
            initial_enemy_density: 2,
            extra_hallway_density: 4,
            ..Self::new(structure)
        }
    }
}

/// Utility functions shared by generation passes.
pub mod utils {
    use super::*;

    /// Creates the seeded random source one floor build runs on.
    pub fn create_rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_data_defaults_are_generable() {
        let data = FloorData::new(Structure::MediumLarge);
        assert!(data.floor_connectivity > 0);
        assert!(!data.monster_table.is_empty());
        assert!(!data.trap_table.is_empty());
        assert!(!data.dead_ends);
    }

    #[test]
    fn test_floor_data_round_trips_through_json() {
        let data = FloorData::for_testing(Structure::Ring);
        let encoded = serde_json::to_string(&data).unwrap();
        let decoded: FloorData = serde_json::from_str(&encoded).unwrap();
        assert_eq!(data, decoded);
    }

    #[test]
    fn test_create_rng_is_deterministic() {
        use rand::Rng;

        let mut a = utils::create_rng(7);
        let mut b = utils::create_rng(7);
        let rolls_a: Vec<u32> = (0..8).map(|_| a.gen()).collect();
        let rolls_b: Vec<u32> = (0..8).map(|_| b.gen()).collect();
        assert_eq!(rolls_a, rolls_b);
    }
}
