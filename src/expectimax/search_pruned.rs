use crate::engine::{has_move_occurred, Board, Move};

use super::heuristic::evaluate;
use super::{Node, SPAWN_OUTCOMES};

/// Expectimax with alpha-beta style cutoffs.
///
/// Max nodes raise `alpha` and stop once `beta <= alpha`. Chance nodes lower
/// `beta` to the running weighted average after each empty cell and stop on
/// the same condition. The chance-node bound is a heuristic approximation:
/// a partial average is not a true upper bound, so results can differ from
/// [`search`](super::search) when a cutoff fires.
///
/// Unlike the plain variant, a board without empty cells is scored directly
/// at either node kind.
pub fn search_pruned(board: Board, depth: u64, node: Node, alpha: f64, beta: f64) -> f64 {
    let mut nodes = 0;
    alpha_beta(board, depth, node, alpha, beta, &mut nodes)
}

pub(crate) fn alpha_beta(
    board: Board,
    depth: u64,
    node: Node,
    alpha: f64,
    beta: f64,
    nodes: &mut u64,
) -> f64 {
    *nodes += 1;
    if depth == 0 || board.count_empty() == 0 {
        return evaluate(&board);
    }
    match node {
        Node::Max => evaluate_max(board, depth, alpha, beta, nodes),
        Node::Chance => evaluate_chance(board, depth, alpha, beta, nodes),
    }
}

fn evaluate_max(board: Board, depth: u64, mut alpha: f64, beta: f64, nodes: &mut u64) -> f64 {
    let mut best: Option<f64> = None;
    for dir in Move::ALL {
        let child = board.shift(dir);
        if !has_move_occurred(&board.grid(), &child.grid()) {
            continue;
        }
        let score = alpha_beta(child, depth - 1, Node::Chance, alpha, beta, nodes);
        best = Some(best.map_or(score, |b| b.max(score)));
        alpha = alpha.max(score);
        if beta <= alpha {
            break;
        }
    }
    best.unwrap_or_else(|| evaluate(&board))
}

fn evaluate_chance(board: Board, depth: u64, alpha: f64, mut beta: f64, nodes: &mut u64) -> f64 {
    let empty = board.empty_cells();
    let possibilities = empty.len() as f64;
    let mut running = 0.0;
    for (row, col) in empty {
        let cell_score: f64 = SPAWN_OUTCOMES
            .iter()
            .map(|&(tile, prob)| {
                let spawned = board.with_tile(row, col, tile);
                prob * alpha_beta(spawned, depth - 1, Node::Max, alpha, beta, nodes)
            })
            .sum();
        running += cell_score / possibilities;
        beta = beta.min(running);
        if beta <= alpha {
            break;
        }
    }
    running
}
