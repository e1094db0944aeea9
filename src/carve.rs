//! Maze carving: randomized depth-first search with an explicit stack.
//!
//! Every cell is capped at three connections so the piece vocabulary stays
//! at endpoint, straight, curve and junction. Straight-ahead runs are capped
//! too; hitting the cap forces a backtrack, which branches the network.
//!
//! Carving stops as soon as every cell has been visited, or when the stack
//! runs dry. A repair pass then attaches every cell left without a
//! connection to a neighbour, so no isolated piece reaches the player.

use log::debug;

use crate::error::{PuzzleError, Result};
use crate::rng::SequenceRng;
use crate::types::{Direction, Maze};

/// Highest degree a carved cell may reach.
pub const MAX_DEGREE: usize = 3;

/// What happened during a carve, for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CarveStats {
    /// Edges laid down by the depth-first walk.
    pub edges: usize,
    /// Backtracks taken while the current cell still had unvisited neighbours.
    pub forced_backtracks: usize,
    /// Cells never reached by the walk.
    pub unvisited: usize,
    /// Isolated cells attached by the repair pass.
    pub repaired: usize,
    /// Repairs that had to move an existing edge.
    pub rewired: usize,
}

/// Carve `maze` in place. Expects every cell disconnected and unvisited.
pub fn carve(maze: &mut Maze, rng: &mut SequenceRng, max_run: usize) -> Result<CarveStats> {
    let mut stats = walk(maze, rng, max_run);
    let (repaired, rewired) = repair_isolated(maze, rng)?;
    stats.repaired = repaired;
    stats.rewired = rewired;
    debug!(
        "carved {}x{}: {} edges, {} forced backtracks, {} unvisited, {} repaired ({} rewired)",
        maze.rows, maze.cols, stats.edges, stats.forced_backtracks, stats.unvisited, repaired, rewired
    );
    Ok(stats)
}

/// The depth-first walk.
fn walk(maze: &mut Maze, rng: &mut SequenceRng, max_run: usize) -> CarveStats {
    let mut stats = CarveStats::default();
    let total = maze.len();

    let start_row = rng.pick(maze.rows);
    let start_col = rng.pick(maze.cols);
    let mut current = maze.index(start_row, start_col);
    maze.mark_visited(current);
    let mut visited = 1;

    let mut stack: Vec<usize> = Vec::with_capacity(total);
    let mut run = 0;

    while visited < total {
        let candidates: Vec<(Direction, usize)> = maze
            .neighbors(current)
            .filter(|&(_, n)| !maze.is_visited(n))
            .collect();
        let blocked = maze.degree(current) >= MAX_DEGREE || run >= max_run;

        if !candidates.is_empty() && !blocked {
            let (dir, next) = candidates[rng.pick(candidates.len())];
            maze.mark_visited(next);
            visited += 1;
            maze.connect(current, dir);
            stats.edges += 1;
            stack.push(current);
            current = next;
            run += 1;
            continue;
        }

        if !candidates.is_empty() {
            stats.forced_backtracks += 1;
        }

        // Cells that already hold three connections cannot branch again.
        while stack.last().is_some_and(|&top| maze.degree(top) >= MAX_DEGREE) {
            stack.pop();
        }
        match stack.pop() {
            Some(top) => {
                current = top;
                run = 0;
            }
            None => break,
        }
    }

    stats.unvisited = total - visited;
    stats
}

/// Attach every cell with no connections to a neighbour.
/// Returns `(repaired, rewired)` counts.
pub fn repair_isolated(maze: &mut Maze, rng: &mut SequenceRng) -> Result<(usize, usize)> {
    let mut repaired = 0;
    let mut rewired = 0;
    for idx in 0..maze.len() {
        if maze.degree(idx) == 0 {
            if attach_isolated(maze, idx, rng)? {
                rewired += 1;
            }
            repaired += 1;
        }
    }
    Ok((repaired, rewired))
}

/// Connect one isolated cell. Returns `true` when an edge had to be moved.
///
/// A random neighbour with spare capacity is preferred. Failing that, the
/// first full neighbour that can give up an edge without isolating the far
/// end is rewired onto the isolated cell.
pub(crate) fn attach_isolated(maze: &mut Maze, idx: usize, rng: &mut SequenceRng) -> Result<bool> {
    let open: Vec<Direction> = maze
        .neighbors(idx)
        .filter(|&(_, n)| maze.degree(n) < MAX_DEGREE)
        .map(|(dir, _)| dir)
        .collect();
    if !open.is_empty() {
        let dir = open[rng.pick(open.len())];
        maze.connect(idx, dir);
        return Ok(false);
    }

    let neighbors: Vec<(Direction, usize)> = maze.neighbors(idx).collect();
    for (dir, n) in neighbors {
        let links = maze.links(n);
        let donor = maze.neighbors(n).find(|&(d, far)| {
            far != idx && links.has(d) && maze.degree(far) >= 2
        });
        if let Some((drop_dir, _)) = donor {
            maze.disconnect(n, drop_dir);
            maze.connect(idx, dir);
            return Ok(true);
        }
    }

    // Only interior cells can have every neighbour full, and then the
    // diagonal cells shared by two neighbours hold two edges each, so a
    // donor is always found above.
    let (row, col) = maze.position(idx);
    Err(PuzzleError::Unrepairable { row, col })
}
