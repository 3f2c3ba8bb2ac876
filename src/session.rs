//! A single game of 2048: live board, undo history and the one-shot win
//! notice. Presentation is left to the caller, which reacts to the
//! [`MoveOutcome`] values returned here.

use rand::{rngs::StdRng, SeedableRng};

use crate::engine::{Board, Move, Score};
use crate::expectimax::Expectimax;

/// What a call to [`Game::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The direction changes nothing; no tile was spawned and no history kept.
    Blocked,
    /// Tiles moved and a new tile was spawned.
    Moved,
    /// Tiles moved and a 2048 tile is on the board for the first time this
    /// game. Play may continue.
    Won,
    /// Tiles moved and afterwards no direction changes the board.
    GameOver,
}

pub struct Game {
    board: Board,
    history: Vec<Board>,
    win_reported: bool,
    rng: StdRng,
}

impl Game {
    /// New game with two random tiles, reproducible from `seed`.
    ///
    /// ```
    /// use ai_2048_core::session::Game;
    /// let g = Game::new(42);
    /// assert_eq!(g.board().count_empty(), 14);
    /// assert_eq!(g.score(), 0);
    /// ```
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let board = Board::new_game(&mut rng);
        Self { board, history: Vec::new(), win_reported: false, rng }
    }

    /// Continue from an existing position.
    pub fn from_board(board: Board, seed: u64) -> Self {
        let win_reported = board.is_win();
        Self { board, history: Vec::new(), win_reported, rng: StdRng::seed_from_u64(seed) }
    }

    /// Reset board, score, history and the win notice. The RNG stream
    /// continues.
    pub fn new_game(&mut self) {
        self.board = Board::new_game(&mut self.rng);
        self.history.clear();
        self.win_reported = false;
    }

    #[inline]
    pub fn board(&self) -> Board {
        self.board
    }

    #[inline]
    pub fn score(&self) -> Score {
        self.board.score()
    }

    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        !self.board.can_move()
    }

    /// Apply a real move.
    ///
    /// ```
    /// use ai_2048_core::engine::{Board, Move};
    /// use ai_2048_core::session::{Game, MoveOutcome};
    /// let mut g = Game::from_board(Board::from_grid([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]), 7);
    /// assert_eq!(g.step(Move::Left), MoveOutcome::Moved);
    /// assert_eq!(g.score(), 4);
    /// assert!(g.undo());
    /// assert_eq!(g.score(), 0);
    /// ```
    pub fn step(&mut self, dir: Move) -> MoveOutcome {
        if !self.board.can_move_direction(dir) {
            return MoveOutcome::Blocked;
        }
        let previous = self.board;
        let (next, _) = previous.make_move(dir, &mut self.rng);
        self.history.push(previous);
        self.board = next;

        if next.is_win() && !self.win_reported {
            self.win_reported = true;
            MoveOutcome::Won
        } else if !next.can_move() {
            MoveOutcome::GameOver
        } else {
            MoveOutcome::Moved
        }
    }

    /// Restore the board and score from before the last effective move.
    /// Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.board = previous;
                true
            }
            None => false,
        }
    }

    /// Direction the policy would play, without playing it.
    pub fn hint(&self, policy: &mut Expectimax) -> Option<Move> {
        policy.best_move(self.board)
    }

    /// Let the policy play one move. `None` when no direction changes the board.
    pub fn autoplay_step(&mut self, policy: &mut Expectimax) -> Option<MoveOutcome> {
        let dir = policy.best_move(self.board)?;
        Some(self.step(dir))
    }
}
