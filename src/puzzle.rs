//! The puzzle aggregate: generation, scrambling, rotation and completion.
//!
//! Generation draws from one [`SequenceRng`] in a fixed order (start cell,
//! carving, repair, then one scramble draw per cell in row-major order), so
//! a seed and a grid size fully determine the puzzle.

use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use crate::carve::{carve, CarveStats};
use crate::classify::{classify, Classification, PieceType};
use crate::config::GenerationConfig;
use crate::error::{PuzzleError, Result};
use crate::rng::{fresh_seed, SequenceRng};
use crate::types::{Connections, Maze};

/// One grid position with its piece and rotation state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub connections: Connections,
    pub piece: PieceType,
    pub solved_orientation: u8,
    pub scramble_offset: u8,
    pub current_orientation: u8,
    pub click_count: u32,
}

impl Cell {
    #[inline(always)]
    pub fn period(&self) -> u8 {
        self.piece.period()
    }

    #[inline(always)]
    pub fn is_solved(&self) -> bool {
        self.current_orientation == self.solved_orientation
    }

    /// Forward rotations still needed to reach the solved orientation.
    pub fn moves_to_solve(&self) -> u8 {
        let period = self.period();
        (period + self.solved_orientation - self.current_orientation) % period
    }

    /// Rendering angle in degrees, clockwise.
    pub fn angle(&self) -> u16 {
        u16::from(self.current_orientation) * 90
    }

    fn rotate(&mut self) {
        self.current_orientation = (self.current_orientation + 1) % self.period();
        self.click_count += 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PuzzleState {
    NotStarted,
    InProgress,
    Solved,
}

/// Reported upward once the puzzle is solved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleResult {
    pub rows: usize,
    pub cols: usize,
    pub seed: u32,
    pub elapsed_ms: u64,
    pub min_moves: u32,
    pub clicks: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RotateOutcome {
    Rotated { orientation: u8 },
    Solved(PuzzleResult),
    /// The puzzle is already solved.
    Ignored,
    OutOfBounds,
    /// The command targeted a puzzle that has since been replaced.
    Stale,
}

/// What the presentation layer needs to draw one cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellView {
    pub row: usize,
    pub col: usize,
    pub piece: PieceType,
    pub orientation: u8,
    pub angle: u16,
}

impl From<&Cell> for CellView {
    fn from(cell: &Cell) -> Self {
        Self {
            row: cell.row,
            col: cell.col,
            piece: cell.piece,
            orientation: cell.current_orientation,
            angle: cell.angle(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub seed: u32,
    pub state: PuzzleState,
    pub min_moves: u32,
    pub clicks: u32,
    pub cells: Vec<CellView>,
}

#[derive(Clone, Debug)]
pub struct Puzzle {
    rows: usize,
    cols: usize,
    seed: u32,
    cells: Vec<Cell>,
    min_moves: u32,
    state: PuzzleState,
    started_at: Option<u64>,
    solved_at: Option<u64>,
    stopped_at: Option<u64>,
    carve_stats: CarveStats,
}

impl Puzzle {
    /// Carve, classify and scramble a new puzzle.
    pub fn generate(config: &GenerationConfig) -> Result<Self> {
        config.validate()?;
        let seed = if config.seed == 0 { fresh_seed() } else { config.seed };
        info!("Using seed: {}", seed);

        let mut rng = SequenceRng::new(seed);
        let mut maze = Maze::new(config.rows, config.cols);
        let carve_stats = carve(&mut maze, &mut rng, config.max_run)?;
        let mut cells = classify_cells(&maze)?;
        let min_moves = scramble(&mut cells, &mut rng);
        debug!(
            "generated {}x{} puzzle, seed {}, {} minimum moves",
            config.rows, config.cols, seed, min_moves
        );

        Ok(Self {
            rows: config.rows,
            cols: config.cols,
            seed,
            cells,
            min_moves,
            state: PuzzleState::NotStarted,
            started_at: None,
            solved_at: None,
            stopped_at: None,
            carve_stats,
        })
    }

    /// Shorthand for [`Puzzle::generate`] with the default run cap.
    pub fn new(rows: usize, cols: usize, seed: u32) -> Result<Self> {
        Self::generate(&GenerationConfig::new(rows, cols, seed))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The realized seed; never 0.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn min_moves(&self) -> u32 {
        self.min_moves
    }

    pub fn state(&self) -> PuzzleState {
        self.state
    }

    pub fn started_at(&self) -> Option<u64> {
        self.started_at
    }

    pub fn solved_at(&self) -> Option<u64> {
        self.solved_at
    }

    pub fn carve_stats(&self) -> CarveStats {
        self.carve_stats
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Total rotate commands applied so far.
    pub fn clicks(&self) -> u32 {
        self.cells.iter().map(|c| c.click_count).sum()
    }

    /// Start the timer without rotating. Returns `false` if already started.
    pub fn begin(&mut self, now_ms: u64) -> bool {
        if self.state != PuzzleState::NotStarted {
            return false;
        }
        self.state = PuzzleState::InProgress;
        self.started_at = Some(now_ms);
        true
    }

    /// Rotate one cell a quarter turn clockwise and check for completion.
    pub fn rotate(&mut self, row: usize, col: usize, now_ms: u64) -> RotateOutcome {
        if self.state == PuzzleState::Solved {
            return RotateOutcome::Ignored;
        }
        if row >= self.rows || col >= self.cols {
            return RotateOutcome::OutOfBounds;
        }
        self.begin(now_ms);

        let cell = &mut self.cells[row * self.cols + col];
        cell.rotate();
        let orientation = cell.current_orientation;
        trace!("rotated ({}, {}) to {}", row, col, orientation);

        if self.is_complete() {
            self.state = PuzzleState::Solved;
            self.solved_at = Some(now_ms);
            let result = self.summary(now_ms);
            debug!(
                "solved seed {} in {} ms with {} clicks (minimum {})",
                self.seed, result.elapsed_ms, result.clicks, result.min_moves
            );
            return RotateOutcome::Solved(result);
        }
        RotateOutcome::Rotated { orientation }
    }

    /// Every cell sits at its solved orientation.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Cell::is_solved)
    }

    /// Freeze the clock of an abandoned puzzle.
    pub fn stop_timer(&mut self, now_ms: u64) {
        if self.state == PuzzleState::InProgress && self.stopped_at.is_none() {
            self.stopped_at = Some(now_ms);
        }
    }

    /// Milliseconds since the first interaction; frozen once solved or stopped.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match (self.started_at, self.solved_at.or(self.stopped_at)) {
            (None, _) => 0,
            (Some(start), Some(end)) => end.saturating_sub(start),
            (Some(start), None) => now_ms.saturating_sub(start),
        }
    }

    pub fn result(&self) -> Option<PuzzleResult> {
        let solved_at = self.solved_at?;
        Some(self.summary(solved_at))
    }

    fn summary(&self, now_ms: u64) -> PuzzleResult {
        PuzzleResult {
            rows: self.rows,
            cols: self.cols,
            seed: self.seed,
            elapsed_ms: self.elapsed_ms(now_ms),
            min_moves: self.min_moves,
            clicks: self.clicks(),
        }
    }

    pub fn snapshot(&self) -> PuzzleSnapshot {
        PuzzleSnapshot {
            rows: self.rows,
            cols: self.cols,
            seed: self.seed,
            state: self.state,
            min_moves: self.min_moves,
            clicks: self.clicks(),
            cells: self.cells.iter().map(CellView::from).collect(),
        }
    }
}

/// Turn carved connections into classified, unscrambled cells.
fn classify_cells(maze: &Maze) -> Result<Vec<Cell>> {
    (0..maze.len())
        .map(|idx| {
            let (row, col) = maze.position(idx);
            let connections = maze.links(idx);
            let Classification { piece, orientation } =
                classify(connections).ok_or(PuzzleError::Unclassifiable {
                    row,
                    col,
                    degree: connections.degree(),
                })?;
            Ok(Cell {
                row,
                col,
                connections,
                piece,
                solved_orientation: orientation,
                scramble_offset: 0,
                current_orientation: orientation,
                click_count: 0,
            })
        })
        .collect()
}

/// Apply one random turn per cell. Returns the minimum total moves.
fn scramble(cells: &mut [Cell], rng: &mut SequenceRng) -> u32 {
    let mut min_moves = 0u32;
    for cell in cells.iter_mut() {
        let period = cell.period();
        // Straight pieces repeat after half a turn, so the draw folds to 0..2.
        let offset = rng.next() as u8 % period;
        cell.scramble_offset = offset;
        cell.current_orientation = (cell.solved_orientation + offset) % period;
        min_moves += u32::from((period - offset) % period);
    }
    min_moves
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rotate every cell home, in row-major order. Returns the outcomes.
    fn solve(puzzle: &mut Puzzle, now_ms: u64) -> Vec<RotateOutcome> {
        let mut outcomes = Vec::new();
        for idx in 0..puzzle.cells().len() {
            let (row, col) = (puzzle.cells()[idx].row, puzzle.cells()[idx].col);
            for _ in 0..puzzle.cells()[idx].moves_to_solve() {
                outcomes.push(puzzle.rotate(row, col, now_ms));
            }
        }
        outcomes
    }

    /// First cell that is not already home, if any.
    fn unsolved_cell(puzzle: &Puzzle) -> Option<(usize, usize)> {
        puzzle.cells().iter().find(|c| !c.is_solved()).map(|c| (c.row, c.col))
    }

    #[test]
    fn test_seed_42_three_by_three_layout() {
        let puzzle = Puzzle::new(3, 3, 42).unwrap();
        let flags = |bits: [u8; 4]| Connections::from(bits.map(|b| b == 1));
        let expected = [
            flags([0, 1, 1, 0]),
            flags([0, 1, 1, 1]),
            flags([0, 0, 1, 1]),
            flags([1, 0, 0, 0]),
            flags([1, 0, 1, 0]),
            flags([1, 0, 1, 0]),
            flags([0, 1, 0, 0]),
            flags([1, 0, 0, 1]),
            flags([1, 0, 0, 0]),
        ];
        let connections: Vec<Connections> = puzzle.cells().iter().map(|c| c.connections).collect();
        assert_eq!(connections, expected);

        let offsets: Vec<u8> = puzzle.cells().iter().map(|c| c.scramble_offset).collect();
        assert_eq!(offsets, [3, 0, 1, 3, 0, 1, 2, 3, 1]);
        assert_eq!(puzzle.min_moves(), 12);
    }

    #[test]
    fn test_one_by_two_seed_42() {
        let mut puzzle = Puzzle::new(1, 2, 42).unwrap();
        assert_eq!(puzzle.seed(), 42);
        let cells = puzzle.cells();
        assert_eq!(cells.len(), 2);
        assert!(cells.iter().all(|c| c.piece == PieceType::Endpoint));
        assert_eq!(cells[0].solved_orientation, 1);
        assert_eq!(cells[1].solved_orientation, 3);

        let replay = Puzzle::new(1, 2, 42).unwrap();
        let offsets = |p: &Puzzle| p.cells().iter().map(|c| c.scramble_offset).collect::<Vec<_>>();
        assert_eq!(offsets(&puzzle), offsets(&replay));

        if puzzle.min_moves() == 0 {
            // Both cells drew a zero turn; a full turn of one cell solves it.
            for _ in 0..3 {
                assert!(matches!(puzzle.rotate(0, 0, 10), RotateOutcome::Rotated { .. }));
            }
            assert!(matches!(puzzle.rotate(0, 0, 10), RotateOutcome::Solved(_)));
        } else {
            let outcomes = solve(&mut puzzle, 10);
            let (last, rest) = outcomes.split_last().unwrap();
            assert!(rest.iter().all(|o| matches!(o, RotateOutcome::Rotated { .. })));
            assert!(matches!(last, RotateOutcome::Solved(_)));
        }
        assert_eq!(puzzle.state(), PuzzleState::Solved);
    }

    #[test]
    fn test_scramble_offsets_match_orientation() {
        let puzzle = Puzzle::new(8, 8, 2024).unwrap();
        for cell in puzzle.cells() {
            let period = cell.period();
            assert!(cell.scramble_offset < period);
            assert!(cell.current_orientation < period);
            assert_eq!(
                cell.current_orientation,
                (cell.solved_orientation + cell.scramble_offset) % period
            );
            assert_eq!(cell.moves_to_solve(), (period - cell.scramble_offset) % period);
        }
    }

    #[test]
    fn test_min_moves_is_sum_of_cell_moves() {
        for seed in 1..50 {
            let puzzle = Puzzle::new(6, 9, seed).unwrap();
            let sum: u32 = puzzle.cells().iter().map(|c| u32::from(c.moves_to_solve())).sum();
            assert_eq!(puzzle.min_moves(), sum);
            assert!(puzzle.min_moves() <= 6 * 9 * 3);
        }
    }

    #[test]
    fn test_solving_reaches_solved_exactly_once() {
        let mut puzzle = Puzzle::new(5, 5, 777).unwrap();
        assert_eq!(puzzle.state(), PuzzleState::NotStarted);
        let outcomes = solve(&mut puzzle, 1_000);
        let solved = outcomes.iter().filter(|o| matches!(o, RotateOutcome::Solved(_))).count();
        assert_eq!(solved, 1);
        assert!(matches!(outcomes.last(), Some(RotateOutcome::Solved(_))));
        assert_eq!(puzzle.clicks(), puzzle.min_moves());
    }

    #[test]
    fn test_rotating_away_from_solved_is_not_solved() {
        let mut puzzle = Puzzle::new(4, 4, 99).unwrap();
        // Bring every cell home except the last one touched.
        let target = unsolved_cell(&puzzle).unwrap();
        for cell in puzzle.cells().to_vec() {
            if (cell.row, cell.col) == target {
                continue;
            }
            for _ in 0..cell.moves_to_solve() {
                assert!(matches!(puzzle.rotate(cell.row, cell.col, 5), RotateOutcome::Rotated { .. }));
            }
        }
        assert!(!puzzle.is_complete());
        assert_ne!(puzzle.state(), PuzzleState::Solved);

        let needed = puzzle.cell(target.0, target.1).unwrap().moves_to_solve();
        for step in 1..=needed {
            let outcome = puzzle.rotate(target.0, target.1, 9);
            if step < needed {
                assert!(matches!(outcome, RotateOutcome::Rotated { .. }));
            } else {
                assert!(matches!(outcome, RotateOutcome::Solved(_)));
            }
        }
    }

    #[test]
    fn test_rotate_after_solved_is_ignored() {
        let mut puzzle = Puzzle::new(3, 3, 5).unwrap();
        solve(&mut puzzle, 0);
        if puzzle.state() != PuzzleState::Solved {
            // Scramble left every cell home; one full turn of a cell solves.
            let period = puzzle.cells()[0].period();
            for _ in 0..period {
                puzzle.rotate(0, 0, 0);
            }
        }
        assert_eq!(puzzle.state(), PuzzleState::Solved);
        let before = puzzle.cells().to_vec();
        assert_eq!(puzzle.rotate(0, 0, 50), RotateOutcome::Ignored);
        assert_eq!(puzzle.cells(), &before[..]);
    }

    #[test]
    fn test_out_of_bounds_rotate() {
        let mut puzzle = Puzzle::new(4, 5, 11).unwrap();
        assert_eq!(puzzle.rotate(4, 0, 1), RotateOutcome::OutOfBounds);
        assert_eq!(puzzle.rotate(0, 5, 1), RotateOutcome::OutOfBounds);
        assert_eq!(puzzle.state(), PuzzleState::NotStarted);
        assert_eq!(puzzle.clicks(), 0);
    }

    #[test]
    fn test_rotation_wraps_by_period() {
        let mut puzzle = Puzzle::new(6, 6, 4242).unwrap();
        let cell = puzzle.cell(2, 3).unwrap().clone();
        for _ in 0..cell.period() {
            puzzle.rotate(2, 3, 0);
        }
        let after = puzzle.cell(2, 3).unwrap();
        assert_eq!(after.current_orientation, cell.current_orientation);
        assert_eq!(after.click_count, u32::from(cell.period()));
    }

    #[test]
    fn test_timing() {
        let mut puzzle = Puzzle::new(4, 4, 31).unwrap();
        assert_eq!(puzzle.elapsed_ms(500), 0);

        assert!(puzzle.begin(1_000));
        assert!(!puzzle.begin(2_000));
        assert_eq!(puzzle.state(), PuzzleState::InProgress);
        assert_eq!(puzzle.started_at(), Some(1_000));
        assert_eq!(puzzle.elapsed_ms(4_500), 3_500);

        solve(&mut puzzle, 6_000);
        if puzzle.state() == PuzzleState::Solved {
            assert_eq!(puzzle.solved_at(), Some(6_000));
            assert_eq!(puzzle.elapsed_ms(60_000), 5_000);
            let result = puzzle.result().unwrap();
            assert_eq!(result.elapsed_ms, 5_000);
            assert_eq!(result.seed, 31);
            assert_eq!((result.rows, result.cols), (4, 4));
        }
    }

    #[test]
    fn test_first_rotate_starts_timer() {
        let mut puzzle = Puzzle::new(4, 4, 8).unwrap();
        let (row, col) = unsolved_cell(&puzzle).unwrap_or((0, 0));
        puzzle.rotate(row, col, 250);
        assert_eq!(puzzle.started_at(), Some(250));
        assert_ne!(puzzle.state(), PuzzleState::NotStarted);
    }

    #[test]
    fn test_stop_timer_freezes_elapsed() {
        let mut puzzle = Puzzle::new(4, 4, 3).unwrap();
        puzzle.stop_timer(10);
        assert_eq!(puzzle.elapsed_ms(10), 0);

        puzzle.begin(100);
        puzzle.stop_timer(400);
        puzzle.stop_timer(900);
        assert_eq!(puzzle.elapsed_ms(10_000), 300);
        assert!(puzzle.result().is_none());
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(matches!(Puzzle::new(0, 4, 1), Err(PuzzleError::InvalidDimensions { .. })));
        assert!(matches!(Puzzle::new(4, 0, 1), Err(PuzzleError::InvalidDimensions { .. })));
        assert!(matches!(Puzzle::new(1, 1, 1), Err(PuzzleError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_fresh_seed_is_stored() {
        let a = Puzzle::new(5, 5, 0).unwrap();
        let b = Puzzle::new(5, 5, 0).unwrap();
        assert_ne!(a.seed(), 0);
        assert_ne!(b.seed(), 0);
        let replay = Puzzle::new(5, 5, a.seed()).unwrap();
        assert_eq!(a.cells(), replay.cells());
    }

    #[test]
    fn test_snapshot() {
        let puzzle = Puzzle::new(2, 3, 17).unwrap();
        let snapshot = puzzle.snapshot();
        assert_eq!((snapshot.rows, snapshot.cols, snapshot.seed), (2, 3, 17));
        assert_eq!(snapshot.cells.len(), 6);
        assert_eq!(snapshot.state, PuzzleState::NotStarted);
        for (view, cell) in snapshot.cells.iter().zip(puzzle.cells()) {
            assert_eq!(view.orientation, cell.current_orientation);
            assert_eq!(view.angle, u16::from(cell.current_orientation) * 90);
            assert_eq!(view.piece, cell.piece);
        }

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["state"], "notStarted");
        assert!(json["cells"][0]["piece"].is_string());
        assert!(json["minMoves"].is_u64());
    }
}
