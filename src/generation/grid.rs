//! Transient grid partition used while a floor is being generated.
//!
//! A [`Grid`] divides the tile canvas into a small table of [`Cell`]s along
//! irregular boundary arrays. Cells are pure scratch space: layout passes
//! mark rooms, record connections, and commit tiles through them, and the
//! whole structure is dropped once the floor is built. Cells live in a flat
//! arena addressed by grid coordinates; nothing holds references into it.

use crate::config::{FLOOR_HEIGHT, FLOOR_WIDTH};
use crate::{Direction, Position};

/// An axis-aligned tile-space rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn right(self) -> i32 {
        self.x + self.w - 1
    }

    pub fn bottom(self) -> i32 {
        self.y + self.h - 1
    }

    pub fn contains(self, pos: Position) -> bool {
        pos.x >= self.x && pos.x <= self.right() && pos.y >= self.y && pos.y <= self.bottom()
    }

    /// The rectangle spanning both `self` and `other`.
    pub fn span(self, other: Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            w: self.right().max(other.right()) - x + 1,
            h: self.bottom().max(other.bottom()) - y + 1,
        }
    }

    /// All positions inside the rectangle, row-major.
    pub fn positions(self) -> impl Iterator<Item = Position> {
        let (x, right, bottom) = (self.x, self.right(), self.bottom());
        (self.y..=bottom).flat_map(move |py| (x..=right).map(move |px| Position::new(px, py)))
    }
}

/// One cell of the generation grid.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Tile extent this cell may carve into
    pub bounds: Rect,
    /// Part of the active playable grid; false for the wasted portion of
    /// partial-canvas templates and for holes in hard-coded topologies
    pub valid: bool,
    /// Carries a room rather than a waypoint tile
    pub is_room: bool,
    /// Reached by the connection walk or forced wiring
    pub connected: bool,
    /// Absorbed into or absorbed another room
    pub merged: bool,
    /// Flagged by the imperfect-rooms roll; excluded from merges and
    /// extra-hallway starts
    pub imperfect: bool,
    /// Open connections, indexed in [`Direction::CARDINAL`] order
    pub connections: [bool; 4],
    /// Committed room rectangle
    pub room: Option<Rect>,
    /// Room index stamped on committed tiles; 0 until a room is committed
    pub room_index: u8,
    /// Hallway anchor tile of a dummy cell
    pub waypoint: Option<Position>,
}

impl Cell {
    fn new(bounds: Rect, valid: bool) -> Self {
        Self {
            bounds,
            valid,
            is_room: false,
            connected: false,
            merged: false,
            imperfect: false,
            connections: [false; 4],
            room: None,
            room_index: 0,
            waypoint: None,
        }
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.connections.iter().filter(|&&open| open).count()
    }
}

pub(super) fn cardinal_index(direction: Direction) -> usize {
    match direction {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
        _ => unreachable!("grid connections are cardinal"),
    }
}

/// The w×h cell table with its boundary arrays.
#[derive(Debug, Clone)]
pub struct Grid {
    w: usize,
    h: usize,
    cells: Vec<Cell>,
    xs: Vec<i32>,
    ys: Vec<i32>,
    playable_width: i32,
}

impl Grid {
    /// Builds a grid with evenly spaced boundaries over the full canvas,
    /// marking cells valid only left of the horizontal cutoff.
    ///
    /// Partial-size templates waste the canvas right of the cutoff on
    /// purpose: those cells exist but never become part of the floor.
    pub fn new(w: usize, h: usize, playable_width: i32) -> Self {
        let xs: Vec<i32> = (0..=w).map(|i| (i as i32) * FLOOR_WIDTH / (w as i32)).collect();
        let ys: Vec<i32> = (0..=h).map(|i| (i as i32) * FLOOR_HEIGHT / (h as i32)).collect();
        Self::with_boundaries(xs, ys, playable_width)
    }

    /// Builds a grid from explicit boundary arrays, as the hard-coded
    /// structure templates do.
    pub fn with_boundaries(xs: Vec<i32>, ys: Vec<i32>, playable_width: i32) -> Self {
        let w = xs.len() - 1;
        let h = ys.len() - 1;
        let mut cells = Vec::with_capacity(w * h);
        for gy in 0..h {
            for gx in 0..w {
                let bounds = Rect {
                    x: xs[gx],
                    y: ys[gy],
                    w: xs[gx + 1] - xs[gx],
                    h: ys[gy + 1] - ys[gy],
                };
                let valid = bounds.right() < playable_width;
                cells.push(Cell::new(bounds, valid));
            }
        }
        Self { w, h, cells, xs, ys, playable_width }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    /// Horizontal tile extent the floor may use; smaller than the canvas on
    /// partial-size templates.
    pub fn playable_width(&self) -> i32 {
        self.playable_width
    }

    /// Boundary x coordinate between grid columns `gx` and `gx + 1`.
    pub fn boundary_x(&self, gx: usize) -> i32 {
        self.xs[gx + 1]
    }

    /// Boundary y coordinate between grid rows `gy` and `gy + 1`.
    pub fn boundary_y(&self, gy: usize) -> i32 {
        self.ys[gy + 1]
    }

    pub fn cell(&self, gx: usize, gy: usize) -> &Cell {
        &self.cells[gy * self.w + gx]
    }

    pub fn cell_mut(&mut self, gx: usize, gy: usize) -> &mut Cell {
        &mut self.cells[gy * self.w + gx]
    }

    /// Every grid coordinate, row-major.
    pub fn coords(&self) -> impl Iterator<Item = (usize, usize)> {
        let w = self.w;
        (0..self.h).flat_map(move |gy| (0..w).map(move |gx| (gx, gy)))
    }

    /// Grid coordinates of all valid cells, row-major.
    pub fn valid_cells(&self) -> Vec<(usize, usize)> {
        self.coords().filter(|&(gx, gy)| self.cell(gx, gy).valid).collect()
    }

    /// Bounds-checked neighbor lookup; `None` off-grid.
    pub fn neighbor(&self, gx: usize, gy: usize, direction: Direction) -> Option<(usize, usize)> {
        let delta = direction.delta();
        let nx = gx as i32 + delta.x;
        let ny = gy as i32 + delta.y;
        (nx >= 0 && ny >= 0 && (nx as usize) < self.w && (ny as usize) < self.h)
            .then_some((nx as usize, ny as usize))
    }

    /// Cardinal directions that stay on the grid and lead to a valid cell.
    pub fn open_directions(&self, gx: usize, gy: usize) -> Vec<Direction> {
        Direction::CARDINAL
            .into_iter()
            .filter(|&direction| {
                self.neighbor(gx, gy, direction)
                    .map(|(nx, ny)| self.cell(nx, ny).valid)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Records a bidirectional connection from a cell toward a neighbor and
    /// marks both connected. Returns the neighbor, or `None` off-grid.
    pub fn connect(
        &mut self,
        gx: usize,
        gy: usize,
        direction: Direction,
    ) -> Option<(usize, usize)> {
        let (nx, ny) = self.neighbor(gx, gy, direction)?;
        self.cell_mut(gx, gy).connections[cardinal_index(direction)] = true;
        self.cell_mut(gx, gy).connected = true;
        self.cell_mut(nx, ny).connections[cardinal_index(direction.opposite())] = true;
        self.cell_mut(nx, ny).connected = true;
        Some((nx, ny))
    }

    /// Unique undirected connections as cell-coordinate pairs.
    ///
    /// Only east and south flags are scanned; the west/north mirrors were
    /// written by [`Grid::connect`].
    pub fn connection_pairs(&self) -> Vec<((usize, usize), (usize, usize))> {
        let mut pairs = Vec::new();
        for (gx, gy) in self.coords() {
            let cell = self.cell(gx, gy);
            if cell.connections[cardinal_index(Direction::East)] {
                pairs.push(((gx, gy), (gx + 1, gy)));
            }
            if cell.connections[cardinal_index(Direction::South)] {
                pairs.push(((gx, gy), (gx, gy + 1)));
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_grid_covers_canvas() {
        let grid = Grid::new(4, 2, FLOOR_WIDTH);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.valid_cells().len(), 8);

        let last = grid.cell(3, 1);
        assert_eq!(last.bounds.right(), FLOOR_WIDTH - 1);
        assert_eq!(last.bounds.bottom(), FLOOR_HEIGHT - 1);
    }

    #[test]
    fn test_half_cutoff_invalidates_right_columns() {
        let grid = Grid::new(4, 2, FLOOR_WIDTH / 2);
        let valid = grid.valid_cells();
        assert_eq!(valid.len(), 4);
        assert!(valid.iter().all(|&(gx, _)| gx < 2));
        assert!(valid
            .iter()
            .all(|&(gx, gy)| grid.cell(gx, gy).bounds.right() < FLOOR_WIDTH / 2));
    }

    #[test]
    fn test_neighbor_lookup_is_bounds_checked() {
        let grid = Grid::new(3, 3, FLOOR_WIDTH);
        assert_eq!(grid.neighbor(0, 0, Direction::North), None);
        assert_eq!(grid.neighbor(0, 0, Direction::West), None);
        assert_eq!(grid.neighbor(0, 0, Direction::East), Some((1, 0)));
        assert_eq!(grid.neighbor(2, 2, Direction::South), None);
    }

    #[test]
    fn test_connect_records_both_sides() {
        let mut grid = Grid::new(3, 2, FLOOR_WIDTH);
        let neighbor = grid.connect(0, 0, Direction::East);
        assert_eq!(neighbor, Some((1, 0)));
        assert!(grid.cell(0, 0).connected);
        assert!(grid.cell(1, 0).connected);
        assert!(grid.cell(0, 0).connections[cardinal_index(Direction::East)]);
        assert!(grid.cell(1, 0).connections[cardinal_index(Direction::West)]);
        assert_eq!(grid.connection_pairs(), vec![((0, 0), (1, 0))]);

        // Connecting again is a no-op for the pair list.
        grid.connect(1, 0, Direction::West);
        assert_eq!(grid.connection_pairs().len(), 1);
    }

    #[test]
    fn test_rect_span() {
        let a = Rect { x: 2, y: 3, w: 4, h: 3 };
        let b = Rect { x: 10, y: 4, w: 3, h: 4 };
        let span = a.span(b);
        assert_eq!(span, Rect { x: 2, y: 3, w: 11, h: 5 });
        assert!(span.contains(Position::new(8, 4)));
    }
}
