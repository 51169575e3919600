//! Secondary terrain: rivers and lakes layered onto wall tiles.
//!
//! Secondary tiles render as water, lava, or void depending on the tileset;
//! generation only cares that they replace walls, never rooms or hallways,
//! and that they keep a fixed margin from the canvas edge.

use crate::config::{FLOOR_HEIGHT, FLOOR_WIDTH, SECONDARY_MARGIN};
use crate::{Direction, FloorData, Floor, Position, Tile, TileKind};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Side length of the erosion grid a freestanding lake is stamped from.
const LAKE_GRID: usize = 10;

/// Erosion samples per freestanding lake.
const LAKE_EROSION_ROUNDS: usize = 80;

/// Sample count and radius for a river-fed lake.
const RIVER_LAKE_SAMPLES: usize = 64;
const RIVER_LAKE_RADIUS: i32 = 3;

/// Hard cap on river length; a river that wanders this long is done.
const RIVER_STEP_CAP: usize = 256;

/// Grows rivers and lakes over the floor's wall tiles.
pub(super) fn generate_secondary(floor: &mut Floor, data: &FloorData, rng: &mut StdRng) {
    let river_count = rng.gen_range(1..=3);
    for _ in 0..river_count {
        carve_river(floor, data, rng);
    }
    for _ in 0..data.water_density {
        stamp_lake(floor, rng);
    }
}

/// Whether secondary terrain may occupy this position.
fn in_secondary_region(pos: Position) -> bool {
    pos.x >= SECONDARY_MARGIN
        && pos.x < FLOOR_WIDTH - SECONDARY_MARGIN
        && pos.y >= SECONDARY_MARGIN
        && pos.y < FLOOR_HEIGHT - SECONDARY_MARGIN
}

fn wet_tile(floor: &mut Floor, pos: Position) {
    if let Some(tile) = floor.tile_mut(pos) {
        if tile.kind == TileKind::Wall {
            *tile = Tile { kind: TileKind::Secondary, ..Tile::default() };
        }
    }
}

/// Runs one river across the floor: a biased walk from one horizontal edge
/// of the secondary region toward the other, with periodic lateral drift.
/// Wall tiles on the path become water; ground is flowed across untouched;
/// meeting existing water ends the river.
fn carve_river(floor: &mut Floor, data: &FloorData, rng: &mut StdRng) {
    let southward = rng.gen_bool(0.5);
    let mut pos = Position::new(
        rng.gen_range(SECONDARY_MARGIN..FLOOR_WIDTH - SECONDARY_MARGIN),
        if southward { SECONDARY_MARGIN } else { FLOOR_HEIGHT - SECONDARY_MARGIN - 1 },
    );
    let toward = if southward { Direction::South } else { Direction::North };
    let mut drift = if rng.gen_bool(0.5) { Direction::East } else { Direction::West };

    let mut path: Vec<Position> = Vec::new();
    for _ in 0..RIVER_STEP_CAP {
        if !in_secondary_region(pos) {
            break;
        }
        match floor.kind(pos) {
            TileKind::Secondary => break,
            TileKind::Wall => {
                wet_tile(floor, pos);
                path.push(pos);
            }
            TileKind::Ground => {}
        }

        if rng.gen_bool(0.7) {
            pos = pos.step(toward);
        } else {
            pos = pos.step(drift);
            if rng.gen_bool(0.3) {
                drift = drift.opposite();
            }
        }
    }

    if !path.is_empty() && rng.gen_range(0..100) < data.secondary_percentage {
        if let Some(&center) = path.choose(rng) {
            grow_river_lake(floor, center, rng);
        }
    }
}

/// Widens a river into an irregular lake by repeatedly sampling positions
/// near the center and wetting walls that already touch water.
fn grow_river_lake(floor: &mut Floor, center: Position, rng: &mut StdRng) {
    for _ in 0..RIVER_LAKE_SAMPLES {
        let pos = Position::new(
            center.x + rng.gen_range(-RIVER_LAKE_RADIUS..=RIVER_LAKE_RADIUS),
            center.y + rng.gen_range(-RIVER_LAKE_RADIUS..=RIVER_LAKE_RADIUS),
        );
        if !in_secondary_region(pos) || floor.kind(pos) != TileKind::Wall {
            continue;
        }
        if pos.neighbors4().iter().any(|&next| floor.kind(next) == TileKind::Secondary) {
            wet_tile(floor, pos);
        }
    }
}

/// Stamps one freestanding lake.
///
/// A small boolean grid starts wet with a dry border; random interior
/// samples dry out wherever a cardinal neighbor is already dry, eroding the
/// shape organically from the rim inward. Whatever stays wet is stamped
/// over wall tiles around a random center.
fn stamp_lake(floor: &mut Floor, rng: &mut StdRng) {
    let mut wet = [[true; LAKE_GRID]; LAKE_GRID];
    for x in 0..LAKE_GRID {
        wet[0][x] = false;
        wet[LAKE_GRID - 1][x] = false;
        wet[x][0] = false;
        wet[x][LAKE_GRID - 1] = false;
    }

    for _ in 0..LAKE_EROSION_ROUNDS {
        let x = rng.gen_range(1..LAKE_GRID - 1);
        let y = rng.gen_range(1..LAKE_GRID - 1);
        let dry_neighbor =
            !wet[y - 1][x] || !wet[y + 1][x] || !wet[y][x - 1] || !wet[y][x + 1];
        if dry_neighbor {
            wet[y][x] = false;
        }
    }

    let half = (LAKE_GRID / 2) as i32;
    let center = Position::new(
        rng.gen_range(SECONDARY_MARGIN + half..FLOOR_WIDTH - SECONDARY_MARGIN - half),
        rng.gen_range(SECONDARY_MARGIN + half..FLOOR_HEIGHT - SECONDARY_MARGIN - half),
    );
    for (gy, row) in wet.iter().enumerate() {
        for (gx, &is_wet) in row.iter().enumerate() {
            if !is_wet {
                continue;
            }
            let pos =
                Position::new(center.x + gx as i32 - half, center.y + gy as i32 - half);
            if in_secondary_region(pos) {
                wet_tile(floor, pos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils;
    use crate::Structure;

    #[test]
    fn test_secondary_terrain_stays_inside_margin() {
        let mut data = FloorData::for_testing(Structure::MediumLarge);
        data.secondary_used = true;
        data.water_density = 3;
        data.secondary_percentage = 100;

        for seed in 0..20_u64 {
            let mut rng = utils::create_rng(seed);
            let mut floor = Floor::new();
            generate_secondary(&mut floor, &data, &mut rng);

            let secondary: Vec<Position> = floor
                .positions()
                .filter(|&pos| floor.kind(pos) == TileKind::Secondary)
                .collect();
            assert!(!secondary.is_empty(), "seed {seed} produced no water at all");
            for pos in secondary {
                assert!(in_secondary_region(pos), "water leaked to {pos:?}");
            }
        }
    }

    #[test]
    fn test_rivers_never_overwrite_ground() {
        let mut data = FloorData::for_testing(Structure::MediumLarge);
        data.secondary_used = true;
        data.water_density = 2;

        let mut rng = utils::create_rng(77);
        let mut floor = Floor::new();
        // A hallway strip across the river's likely path.
        for x in 2..FLOOR_WIDTH - 2 {
            *floor.tile_mut(Position::new(x, 15)).unwrap() = Tile::ground();
        }
        generate_secondary(&mut floor, &data, &mut rng);

        for x in 2..FLOOR_WIDTH - 2 {
            assert_eq!(floor.kind(Position::new(x, 15)), TileKind::Ground);
        }
    }

    #[test]
    fn test_lake_stamp_fits_its_erosion_grid() {
        for seed in 0..10_u64 {
            let mut rng = utils::create_rng(seed);
            let mut floor = Floor::new();
            stamp_lake(&mut floor, &mut rng);

            let lake: Vec<Position> = floor
                .positions()
                .filter(|&pos| floor.kind(pos) == TileKind::Secondary)
                .collect();
            assert!(!lake.is_empty(), "seed {seed} eroded the whole lake away");

            let min_x = lake.iter().map(|pos| pos.x).min().unwrap();
            let max_x = lake.iter().map(|pos| pos.x).max().unwrap();
            let min_y = lake.iter().map(|pos| pos.y).min().unwrap();
            let max_y = lake.iter().map(|pos| pos.y).max().unwrap();
            assert!(max_x - min_x < LAKE_GRID as i32);
            assert!(max_y - min_y < LAKE_GRID as i32);
            assert!(lake.iter().all(|&pos| in_secondary_region(pos)));
        }
    }
}
