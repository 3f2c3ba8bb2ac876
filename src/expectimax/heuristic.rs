use crate::engine::{Board, Tile, SIZE};

/// Positional multipliers. Large tiles are pulled toward the bottom-right
/// corner along a snake through the bottom two rows.
pub const WEIGHTS: [[f64; SIZE]; SIZE] = [
    [8.0, 4.0, 2.0, 1.0],
    [16.0, 32.0, 64.0, 128.0],
    [2048.0, 1024.0, 512.0, 256.0],
    [4096.0, 8192.0, 16384.0, 32768.0],
];

const POSITIONAL_WEIGHT: f64 = 1.0;
const EMPTY_WEIGHT: f64 = 2000.0;
const MERGES_WEIGHT: f64 = 800.0;
const SMOOTHNESS_WEIGHT: f64 = 100.0;
const MONOTONICITY_WEIGHT: f64 = 2.0;
const MAX_TILE_WEIGHT: f64 = 1.0;

/// Heuristic value of a board. Deterministic, no search.
///
/// ```
/// use ai_2048_core::engine::Board;
/// use ai_2048_core::expectimax::evaluate;
/// let b = Board::from_grid([[0; 4], [0; 4], [0; 4], [0, 0, 0, 2]]);
/// assert_eq!(evaluate(&b), 2.0 * 32768.0 + 15.0 * 2000.0 + 4.0);
/// ```
pub fn evaluate(board: &Board) -> f64 {
    let grid = board.grid();
    let max_tile = f64::from(board.highest_tile());
    calc_positional(&grid) * POSITIONAL_WEIGHT
        + board.count_empty() as f64 * EMPTY_WEIGHT
        + calc_merges(&grid) as f64 * MERGES_WEIGHT
        + calc_smoothness(&grid) * SMOOTHNESS_WEIGHT
        + calc_monotonicity(&grid) * MONOTONICITY_WEIGHT
        + max_tile * max_tile * MAX_TILE_WEIGHT
}

fn calc_positional(grid: &[[Tile; SIZE]; SIZE]) -> f64 {
    grid.iter()
        .zip(WEIGHTS.iter())
        .flat_map(|(row, weights)| row.iter().zip(weights.iter()))
        .map(|(&tile, &w)| f64::from(tile) * w)
        .sum()
}

/// Adjacent equal pairs; a tile may count once horizontally and once vertically.
fn calc_merges(grid: &[[Tile; SIZE]; SIZE]) -> u32 {
    let mut merges = 0;
    for i in 0..SIZE {
        for j in 0..SIZE - 1 {
            if grid[i][j] != 0 && grid[i][j] == grid[i][j + 1] {
                merges += 1;
            }
            if grid[j][i] != 0 && grid[j][i] == grid[j + 1][i] {
                merges += 1;
            }
        }
    }
    merges
}

/// Non-positive: minus the absolute differences between occupied neighbours.
fn calc_smoothness(grid: &[[Tile; SIZE]; SIZE]) -> f64 {
    let mut smoothness = 0.0;
    for i in 0..SIZE {
        for j in 0..SIZE {
            let tile = grid[i][j];
            if tile == 0 {
                continue;
            }
            if j + 1 < SIZE && grid[i][j + 1] != 0 {
                smoothness -= f64::from(tile.abs_diff(grid[i][j + 1]));
            }
            if i + 1 < SIZE && grid[i + 1][j] != 0 {
                smoothness -= f64::from(tile.abs_diff(grid[i + 1][j]));
            }
        }
    }
    smoothness
}

fn calc_monotonicity(grid: &[[Tile; SIZE]; SIZE]) -> f64 {
    let mut monotonicity = 0.0;
    for row in grid {
        monotonicity += monotone_sum(*row);
    }
    for c in 0..SIZE {
        monotonicity += monotone_sum([grid[0][c], grid[1][c], grid[2][c], grid[3][c]]);
    }
    monotonicity
}

/// Sum of the line if it never increases, else 0. Empty cells rank below
/// every tile.
fn monotone_sum(line: [Tile; SIZE]) -> f64 {
    let rank = |t: Tile| (t != 0).then_some(t);
    if line.windows(2).all(|w| rank(w[0]) >= rank(w[1])) {
        line.iter().map(|&t| f64::from(t)).sum()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_evaluate_single_tile() {
        let corner = Board::from_grid([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        // 16 positional + 30000 empty + 2 * (2 + 2) monotone + 4 max tile
        assert_eq!(evaluate(&corner), 30028.0);
        let far = Board::from_grid([[0; 4], [0; 4], [0; 4], [0, 0, 0, 2]]);
        assert_eq!(evaluate(&far), 95540.0);
    }

    #[test]
    fn it_evaluate_mixed_row() {
        let b = Board::from_grid([[4, 4, 2, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(calc_positional(&b.grid()), 52.0);
        assert_eq!(calc_merges(&b.grid()), 1);
        assert_eq!(calc_smoothness(&b.grid()), -2.0);
        assert_eq!(calc_monotonicity(&b.grid()), 20.0);
        assert_eq!(evaluate(&b), 26708.0);
    }

    #[test]
    fn it_count_merges_both_axes() {
        let grid = [[2, 2, 0, 0], [2, 0, 0, 0], [0; 4], [0; 4]];
        assert_eq!(calc_merges(&grid), 2);
        let full = [[2; 4]; 4];
        assert_eq!(calc_merges(&full), 24);
    }

    #[test]
    fn it_monotone_sum() {
        assert_eq!(monotone_sum([8, 4, 2, 0]), 14.0);
        assert_eq!(monotone_sum([0, 0, 0, 0]), 0.0);
        assert_eq!(monotone_sum([0, 2, 0, 0]), 0.0);
        assert_eq!(monotone_sum([4, 8, 2, 0]), 0.0);
        assert_eq!(monotone_sum([4, 4, 4, 4]), 16.0);
    }

    #[test]
    fn smoothness_skips_empty_cells() {
        let grid = [[2, 0, 64, 0], [0; 4], [0; 4], [0; 4]];
        assert_eq!(calc_smoothness(&grid), 0.0);
        let grid = [[2, 64, 0, 0], [8, 0, 0, 0], [0; 4], [0; 4]];
        assert_eq!(calc_smoothness(&grid), -(62.0 + 6.0));
    }
}
