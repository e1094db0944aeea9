//! Core data types for carving: directions, connection flags, and the
//! flat carving grid.
//!
//! Grid storage is a flat `Vec` in row-major layout: `cells[row * cols + col]`.
//! Row-major order is also the order in which cells are scrambled, so it is
//! part of the reproducibility contract.

use serde::{Deserialize, Serialize};

/// Cardinal directions, in the order used by connection flags and by the
/// neighbour scan during carving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Pipe segments leaving a cell, indexed North, East, South, West.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connections([bool; 4]);

impl Connections {
    pub const fn new(north: bool, east: bool, south: bool, west: bool) -> Self {
        Self([north, east, south, west])
    }

    #[inline(always)]
    pub fn has(&self, dir: Direction) -> bool {
        self.0[dir.index()]
    }

    #[inline(always)]
    pub fn degree(&self) -> usize {
        self.0.iter().filter(|&&c| c).count()
    }

    pub fn as_array(&self) -> [bool; 4] {
        self.0
    }

    fn set(&mut self, dir: Direction, value: bool) {
        self.0[dir.index()] = value;
    }
}

impl From<[bool; 4]> for Connections {
    fn from(flags: [bool; 4]) -> Self {
        Self(flags)
    }
}

/// Carving grid: connection flags plus the transient visited flags.
///
/// Connections are only ever changed in symmetric pairs through
/// [`Maze::connect`] and [`Maze::disconnect`].
#[derive(Clone, Debug)]
pub struct Maze {
    pub rows: usize,
    pub cols: usize,
    links: Vec<Connections>,
    visited: Vec<bool>,
}

impl Maze {
    /// All cells disconnected and unvisited.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            links: vec![Connections::default(); rows * cols],
            visited: vec![false; rows * cols],
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    #[inline(always)]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    #[inline(always)]
    pub fn position(&self, idx: usize) -> (usize, usize) {
        (idx / self.cols, idx % self.cols)
    }

    #[inline(always)]
    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    #[inline(always)]
    pub fn links(&self, idx: usize) -> Connections {
        self.links[idx]
    }

    #[inline(always)]
    pub fn degree(&self, idx: usize) -> usize {
        self.links[idx].degree()
    }

    #[inline(always)]
    pub fn is_visited(&self, idx: usize) -> bool {
        self.visited[idx]
    }

    pub fn mark_visited(&mut self, idx: usize) {
        self.visited[idx] = true;
    }

    /// Grid-adjacent cell in `dir`, if inside the grid.
    pub fn neighbor(&self, idx: usize, dir: Direction) -> Option<usize> {
        let (row, col) = self.position(idx);
        let (nr, nc) = match dir {
            Direction::North => (row.checked_sub(1)?, col),
            Direction::East => (row, col + 1),
            Direction::South => (row + 1, col),
            Direction::West => (row, col.checked_sub(1)?),
        };
        self.in_bounds(nr, nc).then(|| self.index(nr, nc))
    }

    /// Grid-adjacent cells in North, East, South, West order.
    pub fn neighbors(&self, idx: usize) -> impl Iterator<Item = (Direction, usize)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.neighbor(idx, dir).map(|n| (dir, n)))
    }

    /// Link `idx` with its neighbour in `dir`, setting both flags.
    /// Returns the neighbour's index, or `None` at the grid edge.
    pub fn connect(&mut self, idx: usize, dir: Direction) -> Option<usize> {
        let other = self.neighbor(idx, dir)?;
        self.links[idx].set(dir, true);
        self.links[other].set(dir.opposite(), true);
        Some(other)
    }

    /// Remove the link between `idx` and its neighbour in `dir`.
    pub fn disconnect(&mut self, idx: usize, dir: Direction) -> Option<usize> {
        let other = self.neighbor(idx, dir)?;
        self.links[idx].set(dir, false);
        self.links[other].set(dir.opposite(), false);
        Some(other)
    }
}
