use std::time::Instant;

use tracing::{debug, trace};

use crate::engine::{has_move_occurred, Board, Move};
use crate::error::ConfigError;

use super::search_pruned::alpha_beta;
use super::search_seq::expectimax;
use super::{BranchEval, ExpectimaxConfig, Node, SearchStats, Strategy, MAX_DEPTH};

/// Root move selector.
///
/// Tries every direction in [`Move::ALL`] order, searches each board that
/// changed from a chance node, and keeps the first strictly best one.
pub struct Expectimax {
    cfg: ExpectimaxConfig,
    stats: SearchStats,
}

impl Expectimax {
    pub fn new() -> Self {
        Self::with_config(ExpectimaxConfig::default())
    }

    /// Depths above [`MAX_DEPTH`] are clamped.
    pub fn with_config(mut cfg: ExpectimaxConfig) -> Self {
        cfg.depth = cfg.depth.min(MAX_DEPTH);
        Self { cfg, stats: SearchStats::default() }
    }

    /// Like [`Self::with_config`], but rejects an out-of-range depth.
    pub fn try_with_config(cfg: ExpectimaxConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self { cfg, stats: SearchStats::default() })
    }

    #[inline]
    pub fn config(&self) -> &ExpectimaxConfig {
        &self.cfg
    }

    /// Compute the best move, or `None` if no direction changes the board.
    ///
    /// Example
    /// ```
    /// use ai_2048_core::engine::{Board, Move};
    /// use ai_2048_core::expectimax::Expectimax;
    /// // Only sliding left changes anything here.
    /// let b = Board::from_grid([[0, 2, 4, 8], [0, 4, 8, 2], [0, 2, 4, 8], [0, 4, 8, 2]]);
    /// let mut ex = Expectimax::new();
    /// assert_eq!(ex.best_move(b), Some(Move::Left));
    /// ```
    pub fn best_move(&mut self, board: Board) -> Option<Move> {
        let started = Instant::now();
        let branches = self.branch_evals(board);
        let mut best: Option<BranchEval> = None;
        for branch in branches.into_iter().filter(|b| b.legal) {
            if best.map_or(true, |b| branch.ev > b.ev) {
                best = Some(branch);
            }
        }
        debug!(
            dir = ?best.map(|b| b.dir),
            ev = ?best.map(|b| b.ev),
            nodes = self.stats.nodes,
            elapsed_us = started.elapsed().as_micros() as u64,
            "expectimax decision"
        );
        best.map(|b| b.dir)
    }

    /// Compute EV for each direction.
    ///
    /// Returns a fixed array in [`Move::ALL`] order and marks moves that do
    /// not change the board as `legal=false`.
    ///
    /// ```
    /// use ai_2048_core::engine::Board;
    /// use ai_2048_core::expectimax::Expectimax;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(9);
    /// let b = Board::new_game(&mut rng);
    /// let mut ex = Expectimax::new();
    /// let branches = ex.branch_evals(b);
    /// assert!(branches.iter().any(|br| br.legal));
    /// ```
    pub fn branch_evals(&mut self, board: Board) -> [BranchEval; 4] {
        let mut nodes = 0u64;
        let out = Move::ALL.map(|dir| {
            let child = board.shift(dir);
            if !has_move_occurred(&board.grid(), &child.grid()) {
                return BranchEval { dir, ev: 0.0, legal: false };
            }
            let ev = self.run(child, Node::Chance, &mut nodes);
            trace!(dir = %dir, ev, "root branch");
            BranchEval { dir, ev, legal: true }
        });
        self.record(nodes);
        out
    }

    /// EV at root searched as a max node, one layer deeper than the
    /// per-branch searches of [`Self::branch_evals`].
    pub fn state_value(&mut self, board: Board) -> f64 {
        let mut nodes = 0u64;
        let value = self.run(board, Node::Max, &mut nodes);
        self.record(nodes);
        value
    }

    /// Statistics collected from the last call to [`Self::best_move`],
    /// [`Self::branch_evals`] or [`Self::state_value`].
    #[inline]
    pub fn last_stats(&self) -> SearchStats {
        self.stats
    }

    /// Reset accumulated stats to zero.
    #[inline]
    pub fn reset_stats(&mut self) {
        self.stats = SearchStats::default();
    }

    fn run(&self, board: Board, node: Node, nodes: &mut u64) -> f64 {
        match self.cfg.strategy {
            Strategy::Expectimax => expectimax(board, self.cfg.depth, node, nodes),
            Strategy::AlphaBeta => {
                alpha_beta(board, self.cfg.depth, node, f64::NEG_INFINITY, f64::INFINITY, nodes)
            }
        }
    }

    #[inline]
    fn record(&mut self, nodes: u64) {
        self.stats.nodes = nodes;
        self.stats.peak_nodes = self.stats.peak_nodes.max(nodes);
    }
}

impl Default for Expectimax {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expectimax::{search, search_pruned};
    use rand::{rngs::StdRng, SeedableRng};

    fn one_way() -> Board {
        Board::from_grid([[0, 2, 4, 8], [0, 4, 8, 2], [0, 2, 4, 8], [0, 4, 8, 2]])
    }

    fn alpha_beta_cfg() -> ExpectimaxConfig {
        ExpectimaxConfig { strategy: Strategy::AlphaBeta, ..Default::default() }
    }

    #[test]
    fn jammed_board_has_no_move() {
        let jammed = Board::from_grid([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(!jammed.can_move());
        assert_eq!(Expectimax::new().best_move(jammed), None);
        assert_eq!(Expectimax::with_config(alpha_beta_cfg()).best_move(jammed), None);
        assert!(Expectimax::new().branch_evals(jammed).iter().all(|b| !b.legal));
    }

    #[test]
    fn single_legal_direction_is_chosen() {
        assert_eq!(Expectimax::new().best_move(one_way()), Some(Move::Left));
        let mut ab = Expectimax::with_config(alpha_beta_cfg());
        assert_eq!(ab.best_move(one_way()), Some(Move::Left));
    }

    #[test]
    fn full_board_with_one_pair_picks_a_merging_move() {
        let b = Board::from_grid([[2, 2, 4, 8], [4, 8, 16, 32], [2, 4, 8, 16], [4, 8, 16, 32]]);
        let m = Expectimax::new().best_move(b).expect("a merge is available");
        assert!(m == Move::Left || m == Move::Right);
    }

    #[test]
    fn branch_evals_match_direct_search() {
        let mut rng = StdRng::seed_from_u64(31);
        let b = Board::new_game(&mut rng);
        let mut ex = Expectimax::new();
        for branch in ex.branch_evals(b) {
            assert_eq!(branch.legal, b.can_move_direction(branch.dir));
            if branch.legal {
                assert_eq!(branch.ev, search(b.shift(branch.dir), 3, Node::Chance));
            }
        }
        let mut ab = Expectimax::with_config(alpha_beta_cfg());
        for branch in ab.branch_evals(b).into_iter().filter(|br| br.legal) {
            let child = b.shift(branch.dir);
            let direct = search_pruned(child, 3, Node::Chance, f64::NEG_INFINITY, f64::INFINITY);
            assert_eq!(branch.ev, direct);
        }
    }

    #[test]
    fn best_move_is_first_strict_maximum() {
        let mut rng = StdRng::seed_from_u64(77);
        let mut b = Board::new_game(&mut rng);
        let mut ex = Expectimax::with_config(ExpectimaxConfig { depth: 1, ..Default::default() });
        for _ in 0..10 {
            let branches = ex.branch_evals(b);
            let mut expected: Option<(Move, f64)> = None;
            for br in branches.iter().filter(|br| br.legal) {
                if expected.map_or(true, |(_, ev)| br.ev > ev) {
                    expected = Some((br.dir, br.ev));
                }
            }
            let chosen = ex.best_move(b);
            assert_eq!(chosen, expected.map(|(d, _)| d));
            match chosen {
                Some(dir) => b = b.make_move(dir, &mut rng).0,
                None => break,
            }
        }
    }

    #[test]
    fn stats_track_nodes() {
        let mut rng = StdRng::seed_from_u64(5);
        let b = Board::new_game(&mut rng);
        let mut ex = Expectimax::new();
        let _ = ex.best_move(b);
        let first = ex.last_stats();
        assert!(first.nodes > 0);
        assert_eq!(first.peak_nodes, first.nodes);
        let _ = ex.best_move(one_way());
        assert!(ex.last_stats().peak_nodes >= first.nodes);
        ex.reset_stats();
        assert_eq!(ex.last_stats(), SearchStats::default());
    }

    #[test]
    fn state_value_is_max_over_branches_one_layer_down() {
        let b = one_way();
        let cfg = ExpectimaxConfig { depth: 2, ..Default::default() };
        let mut ex = Expectimax::with_config(cfg);
        assert_eq!(ex.state_value(b), search(b, 2, Node::Max));
    }

    #[test]
    fn config_depth_is_bounded() {
        let deep = ExpectimaxConfig { depth: 40, ..Default::default() };
        assert_eq!(Expectimax::with_config(deep.clone()).config().depth, MAX_DEPTH);
        assert!(matches!(
            Expectimax::try_with_config(deep),
            Err(ConfigError::DepthTooLarge { depth: 40, .. })
        ));
    }

    #[test]
    fn search_does_not_mutate_live_board() {
        let mut rng = StdRng::seed_from_u64(11);
        let b = Board::new_game(&mut rng).with_score(128);
        let before = b;
        let _ = Expectimax::new().best_move(b);
        assert_eq!(b, before);
    }
}
