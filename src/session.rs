//! Session controller: owns at most one active puzzle and its clock.
//!
//! Each installed puzzle gets a new generation number. Commands tagged with
//! an older generation are rejected, so input queued against a replaced
//! puzzle never reaches the new one.

use std::cell::Cell as ClockCell;
use std::rc::Rc;

use log::debug;

use crate::config::GenerationConfig;
use crate::error::Result;
use crate::puzzle::{Puzzle, RotateOutcome};

/// Millisecond wall clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Browser `Date.now()` on wasm32, system time elsewhere.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> u64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Hand-driven clock for tests and replays. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock(Rc<ClockCell<u64>>);

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self(Rc::new(ClockCell::new(start_ms)))
    }

    pub fn set(&self, ms: u64) {
        self.0.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

pub struct Session<C: Clock = SystemClock> {
    clock: C,
    puzzle: Option<Puzzle>,
    generation: u64,
}

impl Session<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for Session<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Session<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            puzzle: None,
            generation: 0,
        }
    }

    /// Generate and install a new puzzle. Returns its generation number.
    ///
    /// On error the current puzzle stays active.
    pub fn new_puzzle(&mut self, config: &GenerationConfig) -> Result<u64> {
        let puzzle = Puzzle::generate(config)?;
        self.replace(puzzle);
        Ok(self.generation)
    }

    /// Install `puzzle`, stopping and returning the previous one.
    pub fn replace(&mut self, puzzle: Puzzle) -> Option<Puzzle> {
        let now = self.clock.now_ms();
        let mut previous = self.puzzle.replace(puzzle);
        if let Some(old) = previous.as_mut() {
            old.stop_timer(now);
            debug!("replaced puzzle with seed {} (generation {})", old.seed(), self.generation);
        }
        self.generation += 1;
        previous
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn puzzle(&self) -> Option<&Puzzle> {
        self.puzzle.as_ref()
    }

    /// Explicit start signal from the presentation layer.
    pub fn begin(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.puzzle.as_mut().is_some_and(|p| p.begin(now))
    }

    /// Rotate a cell of the active puzzle.
    pub fn rotate(&mut self, row: usize, col: usize) -> RotateOutcome {
        let now = self.clock.now_ms();
        match self.puzzle.as_mut() {
            Some(puzzle) => puzzle.rotate(row, col, now),
            None => RotateOutcome::Ignored,
        }
    }

    /// Rotate only if `generation` still names the active puzzle.
    pub fn rotate_in(&mut self, generation: u64, row: usize, col: usize) -> RotateOutcome {
        if generation != self.generation {
            return RotateOutcome::Stale;
        }
        self.rotate(row, col)
    }

    pub fn elapsed_ms(&self) -> u64 {
        let now = self.clock.now_ms();
        self.puzzle.as_ref().map_or(0, |p| p.elapsed_ms(now))
    }
}
