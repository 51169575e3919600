//! Layout passes: room assignment and carving, the cell connection walk,
//! hallway carving, room merging, isolation repair, and extra organic
//! hallways.
//!
//! Every pass is a plain function over the floor, the grid, the floor
//! parameters, and the injected random source. [`FloorFactory`] sequences
//! them according to the structure template's plan.
//!
//! [`FloorFactory`]: crate::FloorFactory

use crate::config::{FLOOR_HEIGHT, FLOOR_WIDTH};
use crate::generation::grid::{cardinal_index, Grid, Rect};
use crate::{Direction, FloorData, Floor, Position, Tile, TileKind};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Per-cell chance for an eligible room to absorb a neighbor.
const MERGE_CHANCE: f64 = 0.05;

/// Overall step cap for a single extra hallway; keeps the segment walk
/// finite no matter what it runs into.
const EXTRA_HALLWAY_STEP_CAP: u32 = 56;

/// Marks which valid cells carry rooms.
///
/// Negative density is an exact room count; a non-negative density picks up
/// a small jitter. Either way the target is clamped between 2 and the
/// number of valid cells.
pub(super) fn assign_rooms(grid: &mut Grid, data: &FloorData, rng: &mut StdRng) {
    let mut cells = grid.valid_cells();
    let requested = if data.room_density < 0 {
        (-(data.room_density as i32)) as usize
    } else {
        data.room_density as usize + rng.gen_range(0..=2)
    };
    let target = requested.clamp(2, cells.len());

    cells.shuffle(rng);
    for &(gx, gy) in cells.iter().take(target) {
        grid.cell_mut(gx, gy).is_room = true;
    }
}

/// Commits a room rectangle for every room cell and a single waypoint tile
/// for every dummy cell.
///
/// Room dimensions are bounded by the cell extent with the aspect ratio
/// clamped to 1.5 in both directions, then offset randomly within the
/// remaining slack. Also rolls each room cell's imperfect flag.
pub(super) fn create_rooms(
    floor: &mut Floor,
    grid: &mut Grid,
    data: &FloorData,
    rng: &mut StdRng,
) {
    let mut next_room_index = 1_u8;
    for (gx, gy) in grid.valid_cells() {
        let usable = cell_interior(grid, gx, gy);
        let cell = grid.cell_mut(gx, gy);

        if cell.is_room {
            let mut w = rng.gen_range(2..=usable.w.max(2));
            let mut h = rng.gen_range(2..=usable.h.max(2));
            w = w.min(h * 3 / 2);
            h = h.min(w * 3 / 2);
            let ox = rng.gen_range(0..=(usable.w - w).max(0));
            let oy = rng.gen_range(0..=(usable.h - h).max(0));
            let room = Rect { x: usable.x + ox, y: usable.y + oy, w, h };

            for pos in room.positions() {
                if let Some(tile) = floor.tile_mut(pos) {
                    *tile = Tile::room_ground(next_room_index);
                }
            }
            cell.room = Some(room);
            cell.room_index = next_room_index;
            next_room_index += 1;

            if data.imperfect_rooms > 0 && rng.gen_range(0..100) < data.imperfect_rooms {
                cell.imperfect = true;
            }
        } else {
            let waypoint = Position::new(
                rng.gen_range(usable.x..=usable.right()),
                rng.gen_range(usable.y..=usable.bottom()),
            );
            if let Some(tile) = floor.tile_mut(waypoint) {
                *tile = Tile::ground();
            }
            cell.waypoint = Some(waypoint);
        }
    }
}

/// The tile region a cell may carve into: the cell bounds pulled in one
/// tile on each side, clamped away from the canvas border.
fn cell_interior(grid: &Grid, gx: usize, gy: usize) -> Rect {
    let bounds = grid.cell(gx, gy).bounds;
    let x0 = (bounds.x + 1).max(1);
    let y0 = (bounds.y + 1).max(1);
    let x1 = (bounds.right() - 1).min(FLOOR_WIDTH - 2);
    let y1 = (bounds.bottom() - 1).min(FLOOR_HEIGHT - 2);
    Rect { x: x0, y: y0, w: (x1 - x0 + 1).max(1), h: (y1 - y0 + 1).max(1) }
}

/// Random connection walk over the valid cells.
///
/// Repeated steps record bidirectional connections; extra steps revisit
/// territory and add redundant loops rather than new reach. When dead ends
/// are disallowed, every non-room cell left with exactly one connection is
/// force-connected until none remain.
pub(super) fn connect_cells(grid: &mut Grid, data: &FloorData, rng: &mut StdRng) {
    let valid = grid.valid_cells();
    let Some(&(mut cx, mut cy)) = valid.choose(rng) else {
        return;
    };

    for _ in 0..data.floor_connectivity {
        let directions = grid.open_directions(cx, cy);
        let Some(&direction) = directions.choose(rng) else {
            break;
        };
        if let Some((nx, ny)) = grid.connect(cx, cy, direction) {
            cx = nx;
            cy = ny;
        }
    }

    if !data.dead_ends {
        remove_dead_ends(grid, rng);
    }
}

fn remove_dead_ends(grid: &mut Grid, rng: &mut StdRng) {
    let mut unfixable: Vec<(usize, usize)> = Vec::new();
    loop {
        let candidate = grid.valid_cells().into_iter().find(|&(gx, gy)| {
            let cell = grid.cell(gx, gy);
            !cell.is_room
                && cell.connected
                && cell.connection_count() == 1
                && !unfixable.contains(&(gx, gy))
        });
        let Some((gx, gy)) = candidate else {
            break;
        };

        let closed: Vec<Direction> = grid
            .open_directions(gx, gy)
            .into_iter()
            .filter(|&direction| !grid.cell(gx, gy).connections[cardinal_index(direction)])
            .collect();
        match closed.choose(rng) {
            Some(&direction) => {
                grid.connect(gx, gy, direction);
            }
            // Nowhere left to wire this cell to; the stub stays.
            None => unfixable.push((gx, gy)),
        }
    }
}

/// Carves a dog-leg hallway for every unique recorded cell connection.
pub(super) fn create_hallways(floor: &mut Floor, grid: &Grid, rng: &mut StdRng) {
    for (from, to) in grid.connection_pairs() {
        carve_connection(floor, grid, from, to, rng);
    }
}

/// Carves one dog-leg path between the anchor points of two adjacent
/// cells: out to the shared grid boundary, along it, then in to the
/// destination. Only wall tiles are converted, so rooms and earlier
/// hallways are never overwritten.
pub(super) fn carve_connection(
    floor: &mut Floor,
    grid: &Grid,
    from: (usize, usize),
    to: (usize, usize),
    rng: &mut StdRng,
) {
    let Some(start) = anchor_point(grid, from, rng) else {
        return;
    };
    let Some(end) = anchor_point(grid, to, rng) else {
        return;
    };

    if from.1 == to.1 {
        // Horizontal neighbors: meet at the shared column boundary.
        let boundary = grid.boundary_x(from.0.min(to.0));
        carve_horizontal(floor, start.y, start.x, boundary);
        carve_vertical(floor, boundary, start.y, end.y);
        carve_horizontal(floor, end.y, boundary, end.x);
    } else {
        let boundary = grid.boundary_y(from.1.min(to.1));
        carve_vertical(floor, start.x, start.y, boundary);
        carve_horizontal(floor, boundary, start.x, end.x);
        carve_vertical(floor, end.x, boundary, end.y);
    }
}

/// A random interior point of a room cell, or the waypoint of a dummy.
fn anchor_point(grid: &Grid, (gx, gy): (usize, usize), rng: &mut StdRng) -> Option<Position> {
    let cell = grid.cell(gx, gy);
    if let Some(room) = cell.room {
        return Some(Position::new(
            rng.gen_range(room.x..=room.right()),
            rng.gen_range(room.y..=room.bottom()),
        ));
    }
    cell.waypoint
}

fn carve_horizontal(floor: &mut Floor, y: i32, from_x: i32, to_x: i32) {
    for x in from_x.min(to_x)..=from_x.max(to_x) {
        carve_wall_tile(floor, Position::new(x, y));
    }
}

fn carve_vertical(floor: &mut Floor, x: i32, from_y: i32, to_y: i32) {
    for y in from_y.min(to_y)..=from_y.max(to_y) {
        carve_wall_tile(floor, Position::new(x, y));
    }
}

fn carve_wall_tile(floor: &mut Floor, pos: Position) {
    if !floor.in_interior(pos) {
        return;
    }
    if let Some(tile) = floor.tile_mut(pos) {
        if tile.kind == TileKind::Wall {
            *tile = Tile::ground();
        }
    }
}

/// Gives each eligible room cell a small chance to absorb a connected room
/// neighbor, filling the rectangle spanning both rooms under the absorbing
/// room's index.
pub(super) fn merge_rooms(floor: &mut Floor, grid: &mut Grid, rng: &mut StdRng) {
    for (gx, gy) in grid.valid_cells() {
        let cell = grid.cell(gx, gy);
        let eligible = cell.connected
            && cell.is_room
            && !cell.merged
            && !cell.imperfect
            && cell.room.is_some();
        if !eligible || !rng.gen_bool(MERGE_CHANCE) {
            continue;
        }

        let neighbors: Vec<(usize, usize)> = Direction::CARDINAL
            .into_iter()
            .filter(|&direction| grid.cell(gx, gy).connections[cardinal_index(direction)])
            .filter_map(|direction| grid.neighbor(gx, gy, direction))
            .filter(|&(nx, ny)| {
                let other = grid.cell(nx, ny);
                other.is_room && !other.merged && !other.imperfect && other.room.is_some()
            })
            .collect();
        let Some(&(nx, ny)) = neighbors.choose(rng) else {
            continue;
        };

        let (Some(room_a), Some(room_b)) = (grid.cell(gx, gy).room, grid.cell(nx, ny).room)
        else {
            continue;
        };
        fuse_rooms(floor, grid, (gx, gy), (nx, ny), room_a.span(room_b));
    }
}

/// Fuses the forced merge group of a structure template into one room.
pub(super) fn merge_forced(floor: &mut Floor, grid: &mut Grid, group: &[(usize, usize)]) {
    let Some(&first) = group.first() else {
        return;
    };
    for &next in &group[1..] {
        let (Some(room_a), Some(room_b)) =
            (grid.cell(first.0, first.1).room, grid.cell(next.0, next.1).room)
        else {
            continue;
        };
        fuse_rooms(floor, grid, first, next, room_a.span(room_b));
    }
}

fn fuse_rooms(
    floor: &mut Floor,
    grid: &mut Grid,
    absorber: (usize, usize),
    absorbed: (usize, usize),
    merged: Rect,
) {
    let index = grid.cell(absorber.0, absorber.1).room_index;
    for pos in merged.positions() {
        if floor.in_interior(pos) {
            if let Some(tile) = floor.tile_mut(pos) {
                *tile = Tile::room_ground(index);
            }
        }
    }
    for &(gx, gy) in &[absorber, absorbed] {
        let cell = grid.cell_mut(gx, gy);
        cell.room = Some(merged);
        cell.room_index = index;
        cell.merged = true;
    }
}

/// Repairs cells the connection walk never reached: real rooms are
/// force-connected and carved, dummy waypoints are removed outright.
///
/// Rooms with an already-connected neighbor are wired first, repeatedly, so
/// repairs chain toward the existing component instead of forming islands;
/// rooms with no such neighbor join blind and leave the rest to the
/// validator.
pub(super) fn join_isolated_rooms(floor: &mut Floor, grid: &mut Grid, rng: &mut StdRng) {
    let mut stranded: Vec<(usize, usize)> = Vec::new();
    loop {
        while let Some((gx, gy)) = find_isolated_room(grid, true, &stranded) {
            let toward_connected: Vec<Direction> = grid
                .open_directions(gx, gy)
                .into_iter()
                .filter(|&direction| {
                    grid.neighbor(gx, gy, direction)
                        .map(|(nx, ny)| grid.cell(nx, ny).connected)
                        .unwrap_or(false)
                })
                .collect();
            if let Some(&direction) = toward_connected.choose(rng) {
                if let Some(neighbor) = grid.connect(gx, gy, direction) {
                    carve_connection(floor, grid, (gx, gy), neighbor, rng);
                }
            }
        }

        let Some((gx, gy)) = find_isolated_room(grid, false, &stranded) else {
            break;
        };
        let open = grid.open_directions(gx, gy);
        let Some(&direction) = open.choose(rng) else {
            // A valid room with no valid neighbors at all; nothing to wire
            // it to, so it stays a standalone pocket.
            stranded.push((gx, gy));
            continue;
        };
        if let Some(neighbor) = grid.connect(gx, gy, direction) {
            carve_connection(floor, grid, (gx, gy), neighbor, rng);
        }
    }

    // Placeholder tiles of dummies nothing ever reached are taken back
    // out, unless a hallway happens to run through them.
    for (gx, gy) in grid.valid_cells() {
        if grid.cell(gx, gy).connected || grid.cell(gx, gy).is_room {
            continue;
        }
        let Some(waypoint) = grid.cell_mut(gx, gy).waypoint.take() else {
            continue;
        };
        let on_hallway =
            waypoint.neighbors4().iter().any(|&next| floor.kind(next) == TileKind::Ground);
        if !on_hallway {
            if let Some(tile) = floor.tile_mut(waypoint) {
                *tile = Tile::default();
            }
        }
    }
}

/// First still-disconnected valid room cell, optionally restricted to those
/// with a connected neighbor to chain onto.
fn find_isolated_room(
    grid: &Grid,
    require_connected_neighbor: bool,
    stranded: &[(usize, usize)],
) -> Option<(usize, usize)> {
    grid.valid_cells().into_iter().find(|&(gx, gy)| {
        let cell = grid.cell(gx, gy);
        if !cell.is_room || cell.connected || stranded.contains(&(gx, gy)) {
            return false;
        }
        if !require_connected_neighbor {
            return true;
        }
        Direction::CARDINAL.into_iter().any(|direction| {
            grid.neighbor(gx, gy, direction)
                .map(|(nx, ny)| grid.cell(nx, ny).valid && grid.cell(nx, ny).connected)
                .unwrap_or(false)
        })
    })
}

/// Carves winding 1-tile-wide hallways out of random rooms.
///
/// Each attempt leaves a room through a random compass direction and walks
/// 3-5 tile segments with random 90 degree turns. Carving stops the moment
/// a step would leave the soft bounds, touch ground beside the corridor, or
/// close a 2x2 ground block, so corridors stay exactly one tile wide and
/// never silently merge rooms.
pub(super) fn create_extra_hallways(
    floor: &mut Floor,
    grid: &Grid,
    data: &FloorData,
    rng: &mut StdRng,
) {
    let room_cells: Vec<(usize, usize)> = grid
        .valid_cells()
        .into_iter()
        .filter(|&(gx, gy)| {
            let cell = grid.cell(gx, gy);
            cell.is_room && cell.connected && !cell.imperfect && cell.room.is_some()
        })
        .collect();
    if room_cells.is_empty() {
        return;
    }

    for _ in 0..data.extra_hallway_density {
        let Some(&(gx, gy)) = room_cells.choose(rng) else {
            break;
        };
        let Some(room) = grid.cell(gx, gy).room else {
            continue;
        };
        let Some(&direction) = Direction::CARDINAL.as_slice().choose(rng) else {
            break;
        };

        let mut pos = Position::new(
            rng.gen_range(room.x..=room.right()),
            rng.gen_range(room.y..=room.bottom()),
        );
        // Leave the room through the nearest wall in the chosen direction.
        while floor.tile(pos).map(|tile| tile.in_room()).unwrap_or(false) {
            pos = pos.step(direction);
        }

        walk_extra_hallway(floor, grid, pos, direction, rng);
    }
}

fn walk_extra_hallway(
    floor: &mut Floor,
    grid: &Grid,
    mut pos: Position,
    mut direction: Direction,
    rng: &mut StdRng,
) {
    let mut budget = EXTRA_HALLWAY_STEP_CAP;
    'carve: loop {
        let segment = rng.gen_range(3..=5);
        for _ in 0..segment {
            if budget == 0 || !extra_hallway_step_ok(floor, grid, pos, direction) {
                break 'carve;
            }
            budget -= 1;
            if floor.kind(pos) == TileKind::Ground {
                // Ran into existing ground; the corridor joins it here.
                break 'carve;
            }
            if let Some(tile) = floor.tile_mut(pos) {
                *tile = Tile::ground();
            }
            pos = pos.step(direction);
        }
        direction = if rng.gen_bool(0.5) {
            direction.turn_clockwise()
        } else {
            direction.turn_counterclockwise()
        };
    }
}

/// Whether an extra hallway may carve this tile: the full 5x5 neighborhood
/// stays on the canvas (and inside the playable span), the tiles beside the
/// corridor are not ground, and carving would not close a 2x2 ground block.
fn extra_hallway_step_ok(
    floor: &Floor,
    grid: &Grid,
    pos: Position,
    direction: Direction,
) -> bool {
    let soft_right = grid.playable_width() - 2;
    if pos.x < 2 || pos.y < 2 || pos.x >= soft_right || pos.y >= FLOOR_HEIGHT - 2 {
        return false;
    }

    let beside_left = pos.step(direction.turn_counterclockwise());
    let beside_right = pos.step(direction.turn_clockwise());
    if floor.kind(beside_left) == TileKind::Ground
        || floor.kind(beside_right) == TileKind::Ground
    {
        return false;
    }

    !closes_ground_square(floor, pos)
}

/// Whether turning `pos` into ground would complete a 2x2 ground block.
fn closes_ground_square(floor: &Floor, pos: Position) -> bool {
    [(-1, -1), (0, -1), (-1, 0), (0, 0)].into_iter().any(|(dx, dy)| {
        let corner = Position::new(pos.x + dx, pos.y + dy);
        [(0, 0), (1, 0), (0, 1), (1, 1)]
            .into_iter()
            .map(|(ox, oy)| Position::new(corner.x + ox, corner.y + oy))
            .filter(|&other| other != pos)
            .all(|other| floor.kind(other) == TileKind::Ground)
    })
}
