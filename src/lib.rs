//! ai-2048-core: a 2048 game engine + Expectimax policy
//!
//! This crate provides:
//! - A `Board` value type (4x4 tiles plus score) with pure transitions
//!   (`shift`, `apply`, `make_move`, `can_move`, `is_win`, ...)
//! - The stack/merge/reverse/transpose primitives every direction is built from
//! - An Expectimax AI (`expectimax` module): heuristic evaluator, plain and
//!   alpha-beta-pruned search, and a root move selector
//! - A game session with undo history (`session` module)
//!
//! Quick start:
//! ```
//! use ai_2048_core::engine::{Board, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let b0 = Board::new_game(&mut rng);
//! let (b1, moved) = b0.make_move(Move::Left, &mut rng);
//! assert!(!moved || b1.count_empty() <= 14);
//! ```
//!
//! Note: For convenience, there are also free functions mirroring the `Board` methods
//! (e.g., `engine::new_board`, `engine::make_move`) that use thread-local RNG.
//! Prefer the methods when you need determinism.
//!
//! Full loop (simplest possible)
//! ```
//! use ai_2048_core::engine::Board;
//! use ai_2048_core::expectimax::Expectimax;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut policy = Expectimax::new();
//! let mut rng = StdRng::seed_from_u64(123);
//! let mut b = Board::new_game(&mut rng);
//! let mut moves = 0u32;
//!
//! // Keep doctests fast: a few moves only.
//! while moves < 4 {
//!     match policy.best_move(b) {
//!         Some(dir) => {
//!             b = b.make_move(dir, &mut rng).0;
//!             moves += 1;
//!         }
//!         None => break,
//!     }
//! }
//! assert!(moves > 0);
//! ```
//!
//! Boards passed in must hold only 0 or powers of two no smaller than 2;
//! anything else is a caller error and results are unspecified.
pub mod engine;
pub mod error;
pub mod expectimax;
pub mod session;
