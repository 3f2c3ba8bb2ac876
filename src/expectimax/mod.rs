//! Expectimax search policy for 2048.
//!
//! - [`evaluate`]: static heuristic for a board.
//! - [`search`]: plain depth-limited expectimax.
//! - [`search_pruned`]: the same tree with alpha-beta style cutoffs.
//! - [`Expectimax`]: move selector driving either strategy from the root.
//!
//! Notes
//! - Search is deterministic and single-threaded; randomness only occurs
//!   when applying real moves with `Board::make_move`.
//! - The live board is never touched: every branch works on its own copy.
//!
//! Quick start
//! ```
//! use ai_2048_core::engine::Board;
//! use ai_2048_core::expectimax::{Expectimax, ExpectimaxConfig, Strategy};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(123);
//! let b0 = Board::new_game(&mut rng);
//!
//! let mut ex = Expectimax::new();
//! let m = ex.best_move(b0);
//! assert!(m.is_some());
//!
//! let cfg = ExpectimaxConfig { strategy: Strategy::AlphaBeta, ..Default::default() };
//! let mut ab = Expectimax::with_config(cfg);
//! assert!(ab.best_move(b0).is_some());
//! ```

use std::fmt;
use std::str::FromStr;

use crate::engine::{Board, Move, Tile};
use crate::error::ConfigError;

mod heuristic;
mod policy;
mod search_pruned;
pub(crate) mod search_seq;

pub use heuristic::{evaluate, WEIGHTS};
pub use policy::Expectimax;
pub use search_pruned::search_pruned;
pub use search_seq::search;

/// Depth used by the move selector unless configured otherwise.
pub const DEFAULT_DEPTH: u64 = 3;

/// Deepest search accepted by [`ExpectimaxConfig::validate`].
pub const MAX_DEPTH: u64 = 6;

/// Spawned tile values and their probabilities at chance nodes.
pub(crate) const SPAWN_OUTCOMES: [(Tile, f64); 2] = [(2, 0.9), (4, 0.1)];

/// Kind of an implicit search node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// The player picks the best direction.
    Max,
    /// A 2 or 4 lands on a uniformly chosen empty cell.
    Chance,
}

/// Which search runs under each root direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// [`search`]
    #[default]
    Expectimax,
    /// [`search_pruned`]
    AlphaBeta,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Expectimax => f.write_str("expectimax"),
            Strategy::AlphaBeta => f.write_str("alphabeta"),
        }
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expectimax" | "plain" => Ok(Strategy::Expectimax),
            "alphabeta" | "alpha-beta" | "pruned" => Ok(Strategy::AlphaBeta),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Configurable knobs for Expectimax. Defaults match the reference player.
///
/// - `depth`: layers searched below each root move, counting max and chance
///   layers alike.
/// - `strategy`: plain or pruned search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectimaxConfig {
    pub depth: u64,
    pub strategy: Strategy,
}

impl Default for ExpectimaxConfig {
    fn default() -> Self {
        Self { depth: DEFAULT_DEPTH, strategy: Strategy::Expectimax }
    }
}

impl ExpectimaxConfig {
    /// Reject depths that would make a single decision impractically slow.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth > MAX_DEPTH {
            return Err(ConfigError::DepthTooLarge { depth: self.depth, max: MAX_DEPTH });
        }
        Ok(())
    }
}

/// Per-branch expected value at the root.
///
/// - `ev` is the expected value for taking `dir` from the current board.
/// - `legal` is false when the move is a no-op for the current board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchEval {
    pub dir: Move,
    pub ev: f64,
    pub legal: bool,
}

/// Basic search stats for a single decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub peak_nodes: u64,
}

/// Best direction for `board` with the default configuration, or `None`
/// when no direction changes the board.
///
/// ```
/// use ai_2048_core::engine::Board;
/// use ai_2048_core::expectimax::choose_direction;
/// let jammed = Board::from_grid([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
/// assert_eq!(choose_direction(jammed), None);
/// ```
pub fn choose_direction(board: Board) -> Option<Move> {
    Expectimax::new().best_move(board)
}
