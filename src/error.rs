//! Error type for puzzle generation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("invalid grid dimensions {rows}x{cols}: need at least two cells and no empty axis")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("invalid run length cap {0}: must be at least 1")]
    InvalidRunLength(usize),

    #[error("cell ({row}, {col}) has no piece for {degree} connections")]
    Unclassifiable { row: usize, col: usize, degree: usize },

    #[error("isolated cell ({row}, {col}) could not be attached to any neighbour")]
    Unrepairable { row: usize, col: usize },
}

pub type Result<T> = std::result::Result<T, PuzzleError>;
