//! Hexagonal bubble grid
//!
//! Offset coordinates in a rectangular `rows × cols` array: odd rows are
//! shifted right by one tile radius, so the six neighbours of a cell depend
//! on the parity of its row.

use std::collections::{BTreeSet, VecDeque};

use glam::Vec2;

use super::Field;
use crate::consts::{MAX_TILE_RADIUS, TILE_RADII_ACROSS};

/// Grid coordinate `(row, col)`
pub type Cell = (usize, usize);

/// Neighbour offsets `(d_row, d_col)` for even rows
const EVEN_ROW_DIRS: [(isize, isize); 6] = [(-1, -1), (-1, 0), (0, -1), (0, 1), (1, -1), (1, 0)];
/// Neighbour offsets `(d_row, d_col)` for odd rows
const ODD_ROW_DIRS: [(isize, isize); 6] = [(-1, 0), (-1, 1), (0, -1), (0, 1), (1, 0), (1, 1)];

/// Pixel layout of the grid for a given field size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexGeometry {
    pub tile_radius: f32,
    pub diameter: f32,
    /// Vertical distance between row centres (r·√3)
    pub row_height: f32,
    pub rows: usize,
    pub cols: usize,
    /// Left margin that centres the columns in the field
    pub offset_x: f32,
}

impl HexGeometry {
    /// Fit tiles to the field: at most 25 px radius, at least 22 radii across
    pub fn for_field(field: Field) -> Self {
        let tile_radius = (field.width / TILE_RADII_ACROSS)
            .floor()
            .min(MAX_TILE_RADIUS)
            .max(1.0);
        let diameter = tile_radius * 2.0;
        let row_height = tile_radius * 3f32.sqrt();
        let cols = (field.width / diameter).floor().max(0.0) as usize;
        let rows = (field.height / row_height).floor().max(0.0) as usize;
        let offset_x = ((field.width - cols as f32 * diameter) / 2.0).max(0.0);

        Self {
            tile_radius,
            diameter,
            row_height,
            rows,
            cols,
            offset_x,
        }
    }

    /// Pixel centre of a cell
    pub fn cell_center(&self, (row, col): Cell) -> Vec2 {
        let mut x = self.offset_x + col as f32 * self.diameter + self.tile_radius;
        if row % 2 == 1 {
            x += self.tile_radius;
        }
        let y = row as f32 * self.row_height + self.tile_radius;
        Vec2::new(x, y)
    }
}

/// Bubble values by row, `None` for empty cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<Option<u8>>>,
}

impl HexGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![vec![None; cols]; rows],
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, (row, col): Cell) -> Option<u8> {
        self.cells.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    /// Write a cell; out-of-range coordinates are ignored
    pub fn set(&mut self, (row, col): Cell, value: Option<u8>) {
        if let Some(slot) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = value;
        }
    }

    /// Empty a cell, returning what it held
    pub fn take(&mut self, (row, col): Cell) -> Option<u8> {
        self.cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .and_then(Option::take)
    }

    /// Occupied cells in row-major order
    pub fn occupied(&self) -> impl Iterator<Item = (Cell, u8)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter_map(move |(col, v)| v.map(|v| ((row, col), v)))
        })
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied().count()
    }

    /// Distinct values currently on the grid, ascending
    pub fn distinct_values(&self) -> BTreeSet<u8> {
        self.occupied().map(|(_, v)| v).collect()
    }

    /// In-bounds neighbours of a cell (up to six)
    pub fn neighbors(&self, (row, col): Cell) -> Vec<Cell> {
        let dirs = if row % 2 == 0 { &EVEN_ROW_DIRS } else { &ODD_ROW_DIRS };
        let mut neighbors = Vec::with_capacity(6);

        for &(d_row, d_col) in dirs {
            let new_row = row as isize + d_row;
            let new_col = col as isize + d_col;
            if new_row >= 0
                && new_row < self.rows as isize
                && new_col >= 0
                && new_col < self.cols as isize
            {
                neighbors.push((new_row as usize, new_col as usize));
            }
        }

        neighbors
    }

    /// True when some neighbour of `cell` holds `value`
    pub fn has_matching_neighbor(&self, cell: Cell, value: u8) -> bool {
        self.neighbors(cell)
            .into_iter()
            .any(|n| self.get(n) == Some(value))
    }

    /// Connected component of cells equal to the seed's value (BFS order)
    ///
    /// Empty when the seed cell is empty.
    pub fn find_matches(&self, seed: Cell) -> Vec<Cell> {
        let Some(value) = self.get(seed) else {
            return Vec::new();
        };
        self.flood(std::iter::once(seed), |v| v == value)
    }

    /// Occupied cells with an occupied path to row 0
    pub fn ceiling_connected(&self) -> Vec<Cell> {
        let roots: Vec<Cell> = (0..self.cols)
            .map(|col| (0, col))
            .filter(|&cell| self.get(cell).is_some())
            .collect();
        self.flood(roots, |_| true)
    }

    /// Occupied cells with no occupied path to row 0
    pub fn floating_cells(&self) -> Vec<Cell> {
        let mut attached = vec![vec![false; self.cols]; self.rows];
        for (row, col) in self.ceiling_connected() {
            attached[row][col] = true;
        }
        self.occupied()
            .map(|(cell, _)| cell)
            .filter(|&(row, col)| !attached[row][col])
            .collect()
    }

    /// Empty cell whose centre is nearest `pos` (first in row-major order on ties)
    pub fn nearest_empty(&self, geometry: &HexGeometry, pos: Vec2) -> Option<Cell> {
        let mut best: Option<(Cell, f32)> = None;
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, value) in cells.iter().enumerate() {
                if value.is_some() {
                    continue;
                }
                let dist = geometry.cell_center((row, col)).distance_squared(pos);
                if best.is_none_or(|(_, d)| dist < d) {
                    best = Some(((row, col), dist));
                }
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// Breadth-first flood over occupied cells whose value passes `accept`
    fn flood<I, F>(&self, seeds: I, accept: F) -> Vec<Cell>
    where
        I: IntoIterator<Item = Cell>,
        F: Fn(u8) -> bool,
    {
        let mut visited = vec![vec![false; self.cols]; self.rows];
        let mut queue = VecDeque::new();
        let mut reached = Vec::new();

        for (row, col) in seeds {
            if self.get((row, col)).is_some_and(&accept) && !visited[row][col] {
                visited[row][col] = true;
                queue.push_back((row, col));
            }
        }

        while let Some(cell) = queue.pop_front() {
            reached.push(cell);
            for (row, col) in self.neighbors(cell) {
                if !visited[row][col] && self.get((row, col)).is_some_and(&accept) {
                    visited[row][col] = true;
                    queue.push_back((row, col));
                }
            }
        }

        reached
    }
}
