use crate::engine::{has_move_occurred, Board, Move};

use super::heuristic::evaluate;
use super::{Node, SPAWN_OUTCOMES};

/// Plain depth-limited expectimax.
///
/// Depth drops by one at every layer, max and chance alike. Terminal
/// positions (no changing direction at a max node, no empty cell at a chance
/// node) are scored by [`evaluate`] instead of failing.
///
/// ```
/// use ai_2048_core::engine::Board;
/// use ai_2048_core::expectimax::{evaluate, search, Node};
/// let b = Board::from_grid([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
/// assert_eq!(search(b, 0, Node::Max), evaluate(&b));
/// ```
pub fn search(board: Board, depth: u64, node: Node) -> f64 {
    let mut nodes = 0;
    expectimax(board, depth, node, &mut nodes)
}

pub(crate) fn expectimax(board: Board, depth: u64, node: Node, nodes: &mut u64) -> f64 {
    *nodes += 1;
    if depth == 0 {
        return evaluate(&board);
    }
    match node {
        Node::Max => evaluate_max(board, depth, nodes),
        Node::Chance => evaluate_chance(board, depth, nodes),
    }
}

fn evaluate_max(board: Board, depth: u64, nodes: &mut u64) -> f64 {
    let mut best: Option<f64> = None;
    for dir in Move::ALL {
        let child = board.shift(dir);
        if !has_move_occurred(&board.grid(), &child.grid()) {
            continue;
        }
        let score = expectimax(child, depth - 1, Node::Chance, nodes);
        best = Some(best.map_or(score, |b| b.max(score)));
    }
    best.unwrap_or_else(|| evaluate(&board))
}

fn evaluate_chance(board: Board, depth: u64, nodes: &mut u64) -> f64 {
    let empty = board.empty_cells();
    if empty.is_empty() {
        return evaluate(&board);
    }
    let possibilities = empty.len() as f64;
    let mut score = 0.0;
    for (row, col) in empty {
        let cell_score: f64 = SPAWN_OUTCOMES
            .iter()
            .map(|&(tile, prob)| {
                prob * expectimax(board.with_tile(row, col, tile), depth - 1, Node::Max, nodes)
            })
            .sum();
        score += cell_score / possibilities;
    }
    score
}
