//! Pipe-rotation puzzle engine for the browser front end.
//!
//! Carves a seeded pipe network on a rectangular grid, scrambles every
//! piece by a random rotation, and tracks the player's rotations until the
//! network is restored. Rendering, input wiring and the on-screen timer
//! live in JavaScript; this crate only produces piece types, orientations
//! and completion state.
//!
//! The same seed and grid size always yield the same puzzle, which is what
//! shared and daily puzzle links rely on.

pub mod carve;
pub mod classify;
pub mod config;
pub mod error;
pub mod puzzle;
pub mod rng;
pub mod session;
pub mod types;

pub use classify::PieceType;
pub use config::GenerationConfig;
pub use error::{PuzzleError, Result};
pub use puzzle::{Cell, Puzzle, PuzzleResult, PuzzleSnapshot, PuzzleState, RotateOutcome};
pub use session::{Clock, ManualClock, Session, SystemClock};

// ─── WASM Exports (only compiled for wasm32 target) ─────────────────────────

#[cfg(target_arch = "wasm32")]
mod wasm_exports {
    use wasm_bindgen::prelude::*;

    use crate::config::GenerationConfig;
    use crate::session::{Session, SystemClock};

    /// One play session, holding at most one active puzzle.
    #[wasm_bindgen(js_name = "PipeSession")]
    pub struct PipeSession {
        inner: Session<SystemClock>,
    }

    #[wasm_bindgen(js_class = "PipeSession")]
    impl PipeSession {
        #[wasm_bindgen(constructor)]
        pub fn new() -> PipeSession {
            PipeSession { inner: Session::new() }
        }

        /// Generate a puzzle; `seed = 0` draws a fresh one.
        /// Returns the realized seed.
        #[wasm_bindgen(js_name = "newPuzzle")]
        pub fn new_puzzle(&mut self, rows: usize, cols: usize, seed: u32) -> Result<u32, JsError> {
            self.install(&GenerationConfig::new(rows, cols, seed))
        }

        /// Generate from a `{ rows, cols, seed, maxRun }` object; missing
        /// fields take their defaults.
        #[wasm_bindgen(js_name = "newPuzzleWithConfig")]
        pub fn new_puzzle_with_config(&mut self, config: JsValue) -> Result<u32, JsError> {
            let config: GenerationConfig = serde_wasm_bindgen::from_value(config)?;
            self.install(&config)
        }

        /// Returns `{ kind, ... }` describing what the rotation did.
        pub fn rotate(&mut self, row: usize, col: usize) -> Result<JsValue, JsError> {
            let outcome = self.inner.rotate(row, col);
            Ok(serde_wasm_bindgen::to_value(&outcome)?)
        }

        /// Same as `rotate`, but rejected if `generation` is no longer current.
        #[wasm_bindgen(js_name = "rotateIn")]
        pub fn rotate_in(&mut self, generation: f64, row: usize, col: usize) -> Result<JsValue, JsError> {
            let outcome = self.inner.rotate_in(generation as u64, row, col);
            Ok(serde_wasm_bindgen::to_value(&outcome)?)
        }

        /// Start the timer (the "click anywhere to start" dialog).
        pub fn begin(&mut self) -> bool {
            self.inner.begin()
        }

        /// Full render state as a plain object, or `null` before the first puzzle.
        pub fn snapshot(&self) -> Result<JsValue, JsError> {
            match self.inner.puzzle() {
                Some(puzzle) => Ok(serde_wasm_bindgen::to_value(&puzzle.snapshot())?),
                None => Ok(JsValue::NULL),
            }
        }

        /// Solve summary, or `null` while unsolved.
        pub fn result(&self) -> Result<JsValue, JsError> {
            match self.inner.puzzle().and_then(|p| p.result()) {
                Some(result) => Ok(serde_wasm_bindgen::to_value(&result)?),
                None => Ok(JsValue::NULL),
            }
        }

        #[wasm_bindgen(js_name = "elapsedMs")]
        pub fn elapsed_ms(&self) -> f64 {
            self.inner.elapsed_ms() as f64
        }

        pub fn seed(&self) -> u32 {
            self.inner.puzzle().map_or(0, |p| p.seed())
        }

        #[wasm_bindgen(js_name = "minMoves")]
        pub fn min_moves(&self) -> u32 {
            self.inner.puzzle().map_or(0, |p| p.min_moves())
        }

        pub fn generation(&self) -> f64 {
            self.inner.generation() as f64
        }

        /// `"notStarted"`, `"inProgress"` or `"solved"`; `null` before the first puzzle.
        pub fn state(&self) -> Result<JsValue, JsError> {
            match self.inner.puzzle() {
                Some(puzzle) => Ok(serde_wasm_bindgen::to_value(&puzzle.state())?),
                None => Ok(JsValue::NULL),
            }
        }
    }

    impl PipeSession {
        fn install(&mut self, config: &GenerationConfig) -> Result<u32, JsError> {
            self.inner.new_puzzle(config)?;
            Ok(self.seed())
        }
    }

    impl Default for PipeSession {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Ping function to verify WASM is loaded.
    #[wasm_bindgen(js_name = "ping")]
    pub fn wasm_ping() -> String {
        "WASM pipe puzzle ready".to_string()
    }
}
