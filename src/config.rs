//! Generation parameters.
//!
//! Grid size policy (the 4..10 range offered to players) belongs to the
//! caller; this layer only rejects grids that cannot hold a puzzle.

use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};

/// Longest straight-ahead run before carving is forced to backtrack.
///
/// The cap is inclusive: a walk that has taken `max_run` forward steps since
/// its last backtrack takes no further step from the current cell, so no run
/// is ever longer than this. Changing it to "more than `max_run`" changes
/// every seeded puzzle.
pub const DEFAULT_MAX_RUN: usize = 5;
pub const DEFAULT_ROWS: usize = 4;
pub const DEFAULT_COLS: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationConfig {
    pub rows: usize,
    pub cols: usize,
    /// `0` requests a fresh seed.
    pub seed: u32,
    pub max_run: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            seed: 0,
            max_run: DEFAULT_MAX_RUN,
        }
    }
}

impl GenerationConfig {
    pub fn new(rows: usize, cols: usize, seed: u32) -> Self {
        Self {
            rows,
            cols,
            seed,
            ..Self::default()
        }
    }

    pub fn with_max_run(mut self, max_run: usize) -> Self {
        self.max_run = max_run;
        self
    }

    /// Every cell needs a grid neighbour, so a single cell is refused too.
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 || self.rows * self.cols < 2 {
            return Err(PuzzleError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.max_run == 0 {
            return Err(PuzzleError::InvalidRunLength(self.max_run));
        }
        Ok(())
    }
}
