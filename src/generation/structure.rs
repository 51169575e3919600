//! Floor topology templates.
//!
//! Every floor names a [`Structure`]: either one of the generic families,
//! which only pick randomized grid dimensions and run the full layout
//! pipeline, or a hard-coded topology that fixes its boundaries and wires
//! specific cell connections up front. Each template is expressed as a
//! [`GridPlan`] so the per-template logic stays small and the pipeline
//! itself stays generic.

use crate::config::FLOOR_WIDTH;
use crate::Direction;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Named floor topology template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Structure {
    /// Generic layout on a medium-to-large randomized grid
    MediumLarge,
    /// Generic layout confined to the left half of the canvas
    Small,
    /// Whole floor as one monster house; not generable
    SingleMonsterHouse,
    /// Ring of rooms around a hollow center
    Ring,
    /// Rooms on the rim, hallway lattice through the middle
    Crossroads,
    /// Two large rooms, one a monster house; not generable
    TwoRoomsMonsterHouse,
    /// A single horizontal strip of rooms
    Line,
    /// Five rooms in a plus shape
    Cross,
    /// Generic layout on a small randomized grid, full canvas
    SmallMedium,
    /// A merged three-room body with rooms on both wings
    Beetle,
    /// Rooms only on the outer rim; not generable
    OuterRooms,
    /// Generic layout confined to three quarters of the canvas
    Medium,
    /// Generic layout, fixed 6x3 grid
    MediumLarge12,
    /// Generic layout, fixed 6x4 grid
    MediumLarge13,
    /// Generic layout, fixed 7x4 grid
    MediumLarge14,
    /// Generic layout, fixed 8x4 grid
    MediumLarge15,
}

impl std::str::FromStr for Structure {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "medium-large" => Ok(Structure::MediumLarge),
            "small" => Ok(Structure::Small),
            "single-monster-house" => Ok(Structure::SingleMonsterHouse),
            "ring" => Ok(Structure::Ring),
            "crossroads" => Ok(Structure::Crossroads),
            "two-rooms-monster-house" => Ok(Structure::TwoRoomsMonsterHouse),
            "line" => Ok(Structure::Line),
            "cross" => Ok(Structure::Cross),
            "small-medium" => Ok(Structure::SmallMedium),
            "beetle" => Ok(Structure::Beetle),
            "outer-rooms" => Ok(Structure::OuterRooms),
            "medium" => Ok(Structure::Medium),
            "medium-large-12" => Ok(Structure::MediumLarge12),
            "medium-large-13" => Ok(Structure::MediumLarge13),
            "medium-large-14" => Ok(Structure::MediumLarge14),
            "medium-large-15" => Ok(Structure::MediumLarge15),
            other => Err(format!("unknown structure '{other}'")),
        }
    }
}

/// Everything the generic pipeline needs to know about one topology.
#[derive(Debug, Clone)]
pub struct GridPlan {
    pub grid_w: usize,
    pub grid_h: usize,
    /// Horizontal tile cutoff; cells right of it are wasted canvas
    pub playable_width: i32,
    /// Hard-coded boundary arrays; `None` means even spacing
    pub boundaries: Option<(Vec<i32>, Vec<i32>)>,
    /// Cells forced to carry rooms; empty means randomized assignment
    pub forced_rooms: Vec<(usize, usize)>,
    /// Cells knocked out of the playable grid
    pub invalid_cells: Vec<(usize, usize)>,
    /// Connections wired before any carving
    pub forced_connections: Vec<(usize, usize, Direction)>,
    /// Room cells fused into one room after hallways are carved
    pub forced_merge: Vec<(usize, usize)>,
    /// Whether the randomized connection walk runs
    pub run_connect_walk: bool,
    /// Whether the merge and join-isolated passes run
    pub run_merge_join: bool,
}

impl GridPlan {
    fn generic(grid_w: usize, grid_h: usize, playable_width: i32) -> Self {
        Self {
            grid_w,
            grid_h,
            playable_width,
            boundaries: None,
            forced_rooms: Vec::new(),
            invalid_cells: Vec::new(),
            forced_connections: Vec::new(),
            forced_merge: Vec::new(),
            run_connect_walk: true,
            run_merge_join: true,
        }
    }

    fn wired(boundaries: (Vec<i32>, Vec<i32>)) -> Self {
        let grid_w = boundaries.0.len() - 1;
        let grid_h = boundaries.1.len() - 1;
        Self {
            grid_w,
            grid_h,
            playable_width: FLOOR_WIDTH,
            boundaries: Some(boundaries),
            forced_rooms: Vec::new(),
            invalid_cells: Vec::new(),
            forced_connections: Vec::new(),
            forced_merge: Vec::new(),
            run_connect_walk: false,
            run_merge_join: false,
        }
    }
}

impl Structure {
    /// Whether this template can produce a playable floor at all.
    pub fn is_generable(self) -> bool {
        !matches!(
            self,
            Structure::SingleMonsterHouse
                | Structure::TwoRoomsMonsterHouse
                | Structure::OuterRooms
        )
    }

    /// Produces the grid plan for this topology, rolling randomized
    /// dimensions where the template allows them. `None` for templates that
    /// cannot generate a playable floor.
    pub fn plan(self, rng: &mut StdRng) -> Option<GridPlan> {
        match self {
            Structure::MediumLarge => {
                Some(GridPlan::generic(rng.gen_range(4..=6), rng.gen_range(2..=4), FLOOR_WIDTH))
            }
            Structure::Small => {
                // Half the canvas is deliberately wasted; the grid still
                // spans it so the right columns simply go invalid.
                Some(GridPlan::generic(rng.gen_range(4..=5), 2, FLOOR_WIDTH / 2))
            }
            Structure::Medium => Some(GridPlan::generic(
                rng.gen_range(4..=5),
                rng.gen_range(2..=3),
                FLOOR_WIDTH * 3 / 4,
            )),
            Structure::SmallMedium => {
                Some(GridPlan::generic(rng.gen_range(3..=4), 2, FLOOR_WIDTH))
            }
            Structure::MediumLarge12 => Some(GridPlan::generic(6, 3, FLOOR_WIDTH)),
            Structure::MediumLarge13 => Some(GridPlan::generic(6, 4, FLOOR_WIDTH)),
            Structure::MediumLarge14 => Some(GridPlan::generic(7, 4, FLOOR_WIDTH)),
            Structure::MediumLarge15 => Some(GridPlan::generic(8, 4, FLOOR_WIDTH)),
            Structure::Ring => Some(ring_plan()),
            Structure::Crossroads => Some(crossroads_plan()),
            Structure::Line => Some(line_plan()),
            Structure::Cross => Some(cross_plan()),
            Structure::Beetle => Some(beetle_plan()),
            Structure::SingleMonsterHouse
            | Structure::TwoRoomsMonsterHouse
            | Structure::OuterRooms => None,
        }
    }
}

/// Ring of sixteen rooms around a hollow 4x2 center. The forced wiring
/// closes the ring; the generic connect/merge/join passes still run on top
/// of it, so the center can pick up hallways and redundant loops.
fn ring_plan() -> GridPlan {
    let mut plan =
        GridPlan::wired((vec![0, 9, 18, 28, 37, 46, 56], vec![0, 8, 16, 24, 32]));
    plan.run_connect_walk = true;
    plan.run_merge_join = true;

    for gx in 0..6 {
        for gy in 0..4 {
            if gx == 0 || gx == 5 || gy == 0 || gy == 3 {
                plan.forced_rooms.push((gx, gy));
            }
        }
    }
    for gx in 0..5 {
        plan.forced_connections.push((gx, 0, Direction::East));
        plan.forced_connections.push((gx, 3, Direction::East));
    }
    for gy in 0..3 {
        plan.forced_connections.push((0, gy, Direction::South));
        plan.forced_connections.push((5, gy, Direction::South));
    }
    plan
}

/// Rooms on the rim of a 5x4 grid (corners cut), dummy lattice through the
/// middle wired straight across both axes.
fn crossroads_plan() -> GridPlan {
    let mut plan = GridPlan::wired((vec![0, 11, 22, 33, 44, 56], vec![0, 8, 16, 24, 32]));
    plan.invalid_cells = vec![(0, 0), (4, 0), (0, 3), (4, 3)];

    for gx in 1..4 {
        plan.forced_rooms.push((gx, 0));
        plan.forced_rooms.push((gx, 3));
    }
    for gy in 1..3 {
        plan.forced_rooms.push((0, gy));
        plan.forced_rooms.push((4, gy));
    }
    for gx in 1..4 {
        for gy in 0..3 {
            plan.forced_connections.push((gx, gy, Direction::South));
        }
    }
    for gy in 1..3 {
        for gx in 0..4 {
            plan.forced_connections.push((gx, gy, Direction::East));
        }
    }
    plan
}

/// Five rooms chained along a single horizontal band.
fn line_plan() -> GridPlan {
    let mut plan = GridPlan::wired((vec![0, 11, 22, 33, 44, 56], vec![8, 24]));
    for gx in 0..5 {
        plan.forced_rooms.push((gx, 0));
        if gx < 4 {
            plan.forced_connections.push((gx, 0, Direction::East));
        }
    }
    plan
}

/// Five rooms in a plus shape: four arms wired only to the center.
fn cross_plan() -> GridPlan {
    let mut plan = GridPlan::wired((vec![0, 19, 38, 56], vec![0, 11, 21, 32]));
    plan.invalid_cells = vec![(0, 0), (2, 0), (0, 2), (2, 2)];
    plan.forced_rooms = vec![(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)];
    plan.forced_connections = vec![
        (1, 0, Direction::South),
        (0, 1, Direction::East),
        (1, 1, Direction::East),
        (1, 1, Direction::South),
    ];
    plan
}

/// Nine rooms; each wing wired to the center column, and the center column
/// fused into one tall body after hallways are carved.
fn beetle_plan() -> GridPlan {
    let mut plan = GridPlan::wired((vec![0, 19, 38, 56], vec![0, 11, 21, 32]));
    for gy in 0..3 {
        for gx in 0..3 {
            plan.forced_rooms.push((gx, gy));
        }
        plan.forced_connections.push((0, gy, Direction::East));
        plan.forced_connections.push((1, gy, Direction::East));
    }
    plan.forced_connections.push((1, 0, Direction::South));
    plan.forced_connections.push((1, 1, Direction::South));
    plan.forced_merge = vec![(1, 0), (1, 1), (1, 2)];
    plan
}
