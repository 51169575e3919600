//! Connectivity validation over the generation grid.

use crate::generation::grid::{cardinal_index, Grid};
use crate::Direction;
use pathfinding::directed::dfs::dfs_reach;
use std::collections::HashSet;

/// Checks that every valid cell marked connected is reachable from every
/// other one over the recorded connections.
///
/// Cells that never got connected (dummies whose waypoints were removed,
/// deliberate holes in hard-coded topologies) do not count against the
/// floor. Returns false when the connected cells split into more than one
/// component; the caller responds by regenerating the whole floor.
pub(super) fn validate_connectivity(grid: &Grid) -> bool {
    let connected: Vec<(usize, usize)> = grid
        .valid_cells()
        .into_iter()
        .filter(|&(gx, gy)| grid.cell(gx, gy).connected)
        .collect();
    let Some(&start) = connected.first() else {
        return true;
    };

    let reached: HashSet<(usize, usize)> = dfs_reach(start, |&(gx, gy)| {
        Direction::CARDINAL
            .into_iter()
            .filter(|&direction| grid.cell(gx, gy).connections[cardinal_index(direction)])
            .filter_map(move |direction| grid.neighbor(gx, gy, direction))
            .collect::<Vec<_>>()
    })
    .collect();

    connected.iter().all(|cell| reached.contains(cell))
}
