//! Placement of stairs, traps, items, and characters on a validated floor.

use crate::{
    FloorData, Floor, ItemSlot, OccupantId, Position, TileKind, TrapKind,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One enemy rolled for floor start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub species: u16,
    pub level: u8,
    pub pos: Position,
}

/// Everything the spawner placed, in placement order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawns {
    pub stairs: Position,
    pub traps: Vec<(Position, TrapKind)>,
    pub items: Vec<Position>,
    pub buried_items: Vec<Position>,
    /// Party positions, leader first
    pub party: Vec<Position>,
    pub enemies: Vec<EnemySpawn>,
}

/// Places everything that lives on top of the finished structure.
///
/// One shuffled candidate list (spawn-eligible, unoccupied tiles) is
/// consumed from its end for stairs, traps, and items, which therefore land
/// on distinct tiles. Characters run on a rebuilt, reshuffled list checked
/// at selection time, so they also avoid everything placed before them.
///
/// Returns `None` when the floor cannot host the requested placements; the
/// factory treats that like any other structural failure and regenerates.
pub(super) fn place_spawns(
    floor: &mut Floor,
    data: &FloorData,
    party_size: usize,
    rng: &mut StdRng,
) -> Option<Spawns> {
    let mut candidates: Vec<Position> = floor
        .positions()
        .filter(|&pos| {
            floor
                .tile(pos)
                .map(|tile| tile.can_spawn && tile.occupant.is_none())
                .unwrap_or(false)
        })
        .collect();
    candidates.shuffle(rng);

    let stairs = place_stairs(floor, &mut candidates)?;
    let traps = place_traps(floor, data, &mut candidates, rng)?;
    let items = place_items(floor, data, &mut candidates, rng);
    let buried_items = place_buried_items(floor, data, items.len(), rng);
    let (party, enemies) = place_characters(floor, data, party_size, rng)?;

    Some(Spawns { stairs, traps, items, buried_items, party, enemies })
}

fn place_stairs(floor: &mut Floor, candidates: &mut Vec<Position>) -> Option<Position> {
    let pos = candidates.pop()?;
    if let Some(tile) = floor.tile_mut(pos) {
        tile.stairs = true;
    }
    floor.stairs = pos;
    Some(pos)
}

/// Trap count rolls uniformly in [density/2, density].
fn place_traps(
    floor: &mut Floor,
    data: &FloorData,
    candidates: &mut Vec<Position>,
    rng: &mut StdRng,
) -> Option<Vec<(Position, TrapKind)>> {
    if data.trap_density == 0 {
        return Some(Vec::new());
    }
    let count = rng.gen_range(data.trap_density / 2..=data.trap_density);

    let mut traps = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let Some(pos) = candidates.pop() else {
            break;
        };
        let kind = data.trap_table.choose_weighted(rng, |entry| entry.weight).ok()?.kind;
        if let Some(tile) = floor.tile_mut(pos) {
            tile.trap = Some(kind);
        }
        traps.push((pos, kind));
    }
    Some(traps)
}

/// Item count is the density with a small jitter either way, but never zero
/// when the density itself is nonzero.
fn jittered_count(density: u8, rng: &mut StdRng) -> usize {
    if density == 0 {
        return 0;
    }
    (density as i32 + rng.gen_range(-2..=2)).max(1) as usize
}

fn place_items(
    floor: &mut Floor,
    data: &FloorData,
    candidates: &mut Vec<Position>,
    rng: &mut StdRng,
) -> Vec<Position> {
    let count = jittered_count(data.item_density, rng);
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(pos) = candidates.pop() else {
            break;
        };
        if let Some(tile) = floor.tile_mut(pos) {
            tile.item = Some(ItemSlot(items.len() as u16));
        }
        items.push(pos);
    }
    items
}

/// Buried items go into wall tiles, from their own shuffled list.
fn place_buried_items(
    floor: &mut Floor,
    data: &FloorData,
    slot_offset: usize,
    rng: &mut StdRng,
) -> Vec<Position> {
    let count = jittered_count(data.buried_item_density, rng);
    if count == 0 {
        return Vec::new();
    }

    let mut walls: Vec<Position> = floor
        .positions()
        .filter(|&pos| floor.in_interior(pos) && floor.kind(pos) == TileKind::Wall)
        .collect();
    walls.shuffle(rng);

    let mut buried = Vec::with_capacity(count);
    for _ in 0..count {
        let Some(pos) = walls.pop() else {
            break;
        };
        if let Some(tile) = floor.tile_mut(pos) {
            tile.item = Some(ItemSlot((slot_offset + buried.len()) as u16));
        }
        buried.push(pos);
    }
    buried
}

/// Whether a character may start on this tile. Stricter than plain spawn
/// eligibility: stairs, traps, and lying items are all rejected, so nobody
/// spawns standing on something.
fn character_free(floor: &Floor, pos: Position) -> bool {
    floor
        .tile(pos)
        .map(|tile| {
            tile.can_spawn
                && tile.occupant.is_none()
                && !tile.stairs
                && tile.trap.is_none()
                && tile.item.is_none()
        })
        .unwrap_or(false)
}

/// Places the party and the initial enemies from a rebuilt candidate list.
fn place_characters(
    floor: &mut Floor,
    data: &FloorData,
    party_size: usize,
    rng: &mut StdRng,
) -> Option<(Vec<Position>, Vec<EnemySpawn>)> {
    let mut free: Vec<Position> =
        floor.positions().filter(|&pos| character_free(floor, pos)).collect();
    free.shuffle(rng);

    // Leader on a random candidate, members probing the 8 fixed directions
    // around them for walkable, unclaimed tiles.
    let leader = free.pop()?;
    let mut party = vec![leader];
    if let Some(tile) = floor.tile_mut(leader) {
        tile.occupant = Some(OccupantId(0));
    }
    for member in 1..party_size {
        let spot = leader.neighbors8().into_iter().find(|&pos| {
            floor
                .tile(pos)
                .map(|tile| {
                    tile.is_ground()
                        && !tile.impassable
                        && tile.occupant.is_none()
                        && !tile.stairs
                        && tile.trap.is_none()
                })
                .unwrap_or(false)
        })?;
        if let Some(tile) = floor.tile_mut(spot) {
            tile.occupant = Some(OccupantId(member as u16));
        }
        party.push(spot);
    }

    let mut enemies = Vec::with_capacity(data.initial_enemy_density as usize);
    for roll in 0..data.initial_enemy_density {
        // The list was shuffled before the party landed; re-check at
        // selection time instead of rebuilding again.
        let pos = loop {
            let candidate = free.pop()?;
            if character_free(floor, candidate) {
                break candidate;
            }
        };
        let entry = data.monster_table.choose_weighted(rng, |entry| entry.weight).ok()?;
        if let Some(tile) = floor.tile_mut(pos) {
            tile.occupant = Some(OccupantId(party_size as u16 + roll as u16));
        }
        enemies.push(EnemySpawn { species: entry.species, level: entry.level, pos });
    }

    Some((party, enemies))
}
