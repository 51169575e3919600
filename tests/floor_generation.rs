//! Integration tests for full floor builds: connectivity, determinism, and
//! the structural invariants every returned floor must satisfy.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet, VecDeque};
use warren::{
    config::{FLOOR_HEIGHT, FLOOR_WIDTH},
    generate_floor, FloorData, GeneratedFloor, Position, Structure, TileKind,
};

const GENERABLE: [Structure; 13] = [
    Structure::MediumLarge,
    Structure::Small,
    Structure::Ring,
    Structure::Crossroads,
    Structure::Line,
    Structure::Cross,
    Structure::SmallMedium,
    Structure::Beetle,
    Structure::Medium,
    Structure::MediumLarge12,
    Structure::MediumLarge13,
    Structure::MediumLarge14,
    Structure::MediumLarge15,
];

fn ground_tiles(generated: &GeneratedFloor) -> Vec<Position> {
    generated
        .floor
        .positions()
        .filter(|&pos| generated.floor.kind(pos) == TileKind::Ground)
        .collect()
}

/// Breadth-first sweep over 4-connected ground.
fn all_ground_connected(generated: &GeneratedFloor) -> bool {
    let ground = ground_tiles(generated);
    let Some(&start) = ground.first() else {
        return true;
    };

    let mut open = VecDeque::from([start]);
    let mut seen = HashSet::from([start]);
    while let Some(pos) = open.pop_front() {
        for next in pos.neighbors4() {
            if generated.floor.kind(next) == TileKind::Ground && seen.insert(next) {
                open.push_back(next);
            }
        }
    }
    seen.len() == ground.len()
}

#[test]
fn every_generable_structure_yields_a_connected_floor() {
    for structure in GENERABLE {
        for seed in 0..8_u64 {
            let data = FloorData::for_testing(structure);
            let generated = generate_floor(&data, seed, 4)
                .unwrap_or_else(|error| panic!("{structure:?} seed {seed}: {error}"));
            assert!(
                all_ground_connected(&generated),
                "{structure:?} seed {seed} produced disconnected ground"
            );
        }
    }
}

#[test]
fn identical_seed_and_data_reproduce_identical_floors() {
    for structure in [Structure::MediumLarge, Structure::Ring, Structure::Small] {
        let data = FloorData::for_testing(structure);
        let first = generate_floor(&data, 424_242, 4).unwrap();
        let second = generate_floor(&data, 424_242, 4).unwrap();
        assert_eq!(first.floor.tiles(), second.floor.tiles());
        assert_eq!(first.spawns, second.spawns);
    }
}

#[test]
fn different_seeds_change_the_floor() {
    let data = FloorData::for_testing(Structure::MediumLarge);
    let first = generate_floor(&data, 1, 4).unwrap();
    let second = generate_floor(&data, 2, 4).unwrap();
    assert_ne!(first.floor.tiles(), second.floor.tiles());
}

#[test]
fn tile_masks_are_idempotent() {
    let data = FloorData::for_testing(Structure::MediumLarge);
    let generated = generate_floor(&data, 9, 2).unwrap();

    let mut floor = generated.floor.clone();
    floor.update_tile_masks();
    assert_eq!(floor.tiles(), generated.floor.tiles());
}

#[test]
fn border_tiles_are_never_carved_or_spawnable() {
    for structure in GENERABLE {
        let data = FloorData::for_testing(structure);
        let generated = generate_floor(&data, 31, 2).unwrap();
        for pos in generated.floor.positions() {
            if pos.x != 0 && pos.y != 0 && pos.x != FLOOR_WIDTH - 1 && pos.y != FLOOR_HEIGHT - 1
            {
                continue;
            }
            let tile = generated.floor.tile(pos).unwrap();
            assert_eq!(tile.kind, TileKind::Wall, "{structure:?}: carved border at {pos:?}");
            assert!(!tile.can_spawn);
            assert_eq!(tile.room_index, 0);
        }
    }
}

#[test]
fn room_indices_tile_exact_rectangles() {
    for structure in [Structure::MediumLarge, Structure::Beetle, Structure::MediumLarge15] {
        for seed in 0..8_u64 {
            let data = FloorData::for_testing(structure);
            let generated = generate_floor(&data, seed, 2).unwrap();

            let mut by_index: HashMap<u8, Vec<Position>> = HashMap::new();
            for pos in generated.floor.positions() {
                let tile = generated.floor.tile(pos).unwrap();
                if tile.room_index > 0 {
                    assert_eq!(tile.kind, TileKind::Ground);
                    by_index.entry(tile.room_index).or_default().push(pos);
                }
            }
            assert!(!by_index.is_empty());

            // Merging always fills the spanning rectangle, so every index
            // must cover its bounding box exactly.
            for (index, tiles) in by_index {
                let min_x = tiles.iter().map(|pos| pos.x).min().unwrap();
                let max_x = tiles.iter().map(|pos| pos.x).max().unwrap();
                let min_y = tiles.iter().map(|pos| pos.y).min().unwrap();
                let max_y = tiles.iter().map(|pos| pos.y).max().unwrap();
                let expected = ((max_x - min_x + 1) * (max_y - min_y + 1)) as usize;
                assert_eq!(
                    tiles.len(),
                    expected,
                    "{structure:?} seed {seed}: room {index} is not a rectangle"
                );
            }
        }
    }
}

#[test]
fn small_structure_stays_in_the_left_half() {
    for seed in 0..8_u64 {
        let data = FloorData::for_testing(Structure::Small);
        let generated = generate_floor(&data, seed, 2).unwrap();
        for pos in generated.floor.positions() {
            if generated.floor.kind(pos) != TileKind::Wall {
                assert!(
                    pos.x < FLOOR_WIDTH / 2,
                    "seed {seed}: carved tile at {pos:?} outside the half canvas"
                );
            }
        }
    }
}

#[test]
fn cross_structure_builds_exactly_five_rooms() {
    let data = FloorData::for_testing(Structure::Cross);
    let generated = generate_floor(&data, 17, 2).unwrap();

    let indices: HashSet<u8> = generated
        .floor
        .positions()
        .filter_map(|pos| generated.floor.tile(pos).map(|tile| tile.room_index))
        .filter(|&index| index > 0)
        .collect();
    assert_eq!(indices.len(), 5);
    assert!(all_ground_connected(&generated));
}

#[test]
fn secondary_terrain_appears_and_keeps_its_margin() {
    let mut data = FloorData::for_testing(Structure::MediumLarge);
    data.secondary_used = true;
    data.water_density = 3;

    for seed in 0..8_u64 {
        let generated = generate_floor(&data, seed, 2).unwrap();
        let secondary: Vec<Position> = generated
            .floor
            .positions()
            .filter(|&pos| generated.floor.kind(pos) == TileKind::Secondary)
            .collect();
        assert!(!secondary.is_empty(), "seed {seed}: no secondary terrain");
        for pos in secondary {
            assert!(
                (2..FLOOR_WIDTH - 2).contains(&pos.x) && (2..FLOOR_HEIGHT - 2).contains(&pos.y),
                "seed {seed}: secondary tile at {pos:?} breaches the margin"
            );
        }
    }
}

#[test]
fn trap_density_six_places_three_to_six_traps() {
    let mut data = FloorData::for_testing(Structure::MediumLarge);
    data.trap_density = 6;

    for seed in 0..8_u64 {
        let generated = generate_floor(&data, seed, 2).unwrap();
        let count = generated.spawns.traps.len();
        assert!((3..=6).contains(&count), "seed {seed}: {count} traps");
    }
}

#[test]
fn stairs_sit_on_reachable_ground() {
    for structure in GENERABLE {
        let data = FloorData::for_testing(structure);
        let generated = generate_floor(&data, 5, 4).unwrap();
        let stairs = generated.spawns.stairs;
        assert!(generated.floor.is_walkable(stairs));
        assert!(generated.floor.tile(stairs).unwrap().stairs);
        // The leader can walk to the stairs.
        assert!(all_ground_connected(&generated));
        assert!(generated.floor.is_walkable(generated.spawns.party[0]));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn generated_floors_keep_ground_connected(
        seed in any::<u64>(),
        structure_index in 0_usize..GENERABLE.len(),
    ) {
        let data = FloorData::for_testing(GENERABLE[structure_index]);
        let generated = generate_floor(&data, seed, 4).unwrap();
        prop_assert!(
            all_ground_connected(&generated),
            "{:?} seed {seed} produced disconnected ground",
            GENERABLE[structure_index]
        );
    }

    #[test]
    fn generation_is_deterministic_across_runs(seed in any::<u64>()) {
        let data = FloorData::for_testing(Structure::MediumLarge);
        let first = generate_floor(&data, seed, 4).unwrap();
        let second = generate_floor(&data, seed, 4).unwrap();
        prop_assert_eq!(first.floor.tiles(), second.floor.tiles());
        prop_assert_eq!(first.spawns, second.spawns);
    }
}
