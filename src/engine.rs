use rand::Rng;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseMoveError;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Right,
    Down,
    Left,
}

impl Move {
    /// Canonical iteration order used by search and move selection.
    ///
    /// Ties between equally scored directions go to the earliest entry.
    pub const ALL: [Move; 4] = [Move::Up, Move::Right, Move::Down, Move::Left];

    /// Lowercase name, e.g. `"up"`.
    pub fn name(self) -> &'static str {
        match self {
            Move::Up => "up",
            Move::Right => "right",
            Move::Down => "down",
            Move::Left => "left",
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Move {
    type Err = ParseMoveError;

    /// Accepts direction names and WASD keys, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "w" => Ok(Move::Up),
            "right" | "d" => Ok(Move::Right),
            "down" | "s" => Ok(Move::Down),
            "left" | "a" => Ok(Move::Left),
            _ => Err(ParseMoveError(s.to_string())),
        }
    }
}

/// Side length of the board.
pub const SIZE: usize = 4;

/// Reaching this tile wins the game. Play may continue afterwards.
pub const WIN_TILE: Tile = 2048;

pub type Tile = u32;
pub type Score = u64;
pub type Grid = [[Tile; SIZE]; SIZE];

/// A 4x4 2048 board: row-major tile values (0 = empty) plus the score
/// accumulated by real moves.
///
/// `Board` is `Copy`; every simulated move works on its own value and never
/// touches the caller's board. Only [`Board::apply`] and [`Board::make_move`]
/// add merge results to the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    grid: Grid,
    score: Score,
}

impl Board {
    /// A constant empty board with zero score.
    pub const EMPTY: Board = Board { grid: [[0; SIZE]; SIZE], score: 0 };

    /// Build a board from raw tile values with a zero score.
    ///
    /// Every non-zero tile must be a power of two no smaller than 2. Other
    /// values are a contract violation and the engine's results for them are
    /// unspecified.
    #[inline]
    pub fn from_grid(grid: Grid) -> Self {
        Board { grid, score: 0 }
    }

    /// Same tiles, different score.
    #[inline]
    pub fn with_score(self, score: Score) -> Self {
        Board { score, ..self }
    }

    /// Copy of the tile grid.
    #[inline]
    pub fn grid(self) -> Grid {
        self.grid
    }

    #[inline]
    pub fn tile(self, row: usize, col: usize) -> Tile {
        self.grid[row][col]
    }

    /// Same board with one cell overwritten.
    #[inline]
    pub fn with_tile(mut self, row: usize, col: usize, tile: Tile) -> Self {
        self.grid[row][col] = tile;
        self
    }

    /// Score accumulated by real moves.
    #[inline]
    pub fn score(self) -> Score {
        self.score
    }

    /// Return the board resulting from sliding/merging tiles in `dir`.
    ///
    /// This is a simulated move: no random insert and no score change.
    ///
    /// ```
    /// use ai_2048_core::engine::{Board, Move};
    /// let b = Board::from_grid([[0, 2, 0, 2], [0; 4], [0; 4], [0; 4]]);
    /// let s = b.shift(Move::Left);
    /// assert_eq!(s.grid()[0], [4, 0, 0, 0]);
    /// assert_eq!(s.score(), 0);
    /// ```
    #[inline]
    pub fn shift(self, dir: Move) -> Self {
        let (grid, _) = slide(self.grid, dir);
        Board { grid, ..self }
    }

    /// Real move without the random insert: merge results are added to the
    /// score. Returns the new board and whether any tile moved.
    #[inline]
    pub fn apply(self, dir: Move) -> (Self, bool) {
        let (grid, gained) = slide(self.grid, dir);
        let moved = has_move_occurred(&self.grid, &grid);
        (Board { grid, score: self.score + gained }, moved)
    }

    /// Insert a 2 (90%) or 4 (10%) into a uniformly chosen empty cell.
    ///
    /// Returns `None` when the board is full.
    ///
    /// ```
    /// use ai_2048_core::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.spawn(&mut rng).unwrap();
    /// assert_eq!(b.count_empty(), 15);
    /// ```
    pub fn spawn<R: Rng + ?Sized>(self, rng: &mut R) -> Option<Self> {
        let empty = self.empty_cells();
        if empty.is_empty() {
            return None;
        }
        let (row, col) = empty[rng.gen_range(0..empty.len())];
        Some(self.with_tile(row, col, generate_random_tile(rng)))
    }

    /// Like [`Board::spawn`], but a full board is returned unchanged.
    #[inline]
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        self.spawn(rng).unwrap_or(self)
    }

    /// Fresh board with two random tiles.
    ///
    /// ```
    /// use ai_2048_core::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let b = Board::new_game(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// assert_eq!(b.score(), 0);
    /// ```
    pub fn new_game<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Board::EMPTY.with_random_tile(rng).with_random_tile(rng)
    }

    /// Perform a real move, then insert a random tile if the move changed
    /// the board.
    ///
    /// ```
    /// use ai_2048_core::engine::{Board, Move};
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let b0 = Board::from_grid([[2, 2, 4, 4], [0; 4], [0; 4], [0; 4]]);
    /// let (b1, moved) = b0.make_move(Move::Left, &mut rng);
    /// assert!(moved);
    /// assert_eq!(b1.score(), 12);
    /// ```
    pub fn make_move<R: Rng + ?Sized>(self, dir: Move, rng: &mut R) -> (Self, bool) {
        let (next, moved) = self.apply(dir);
        if moved {
            (next.with_random_tile(rng), true)
        } else {
            (self, false)
        }
    }

    /// Positions of empty cells in row-major order.
    pub fn empty_cells(self) -> Vec<(usize, usize)> {
        let mut cells = Vec::with_capacity(SIZE * SIZE);
        for (r, row) in self.grid.iter().enumerate() {
            for (c, &tile) in row.iter().enumerate() {
                if tile == 0 {
                    cells.push((r, c));
                }
            }
        }
        cells
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> usize {
        self.grid.iter().flatten().filter(|&&t| t == 0).count()
    }

    /// True if at least one direction would change the board.
    pub fn can_move(self) -> bool {
        if self.count_empty() > 0 {
            return true;
        }
        let g = &self.grid;
        for r in 0..SIZE {
            for c in 0..SIZE - 1 {
                if g[r][c] != 0 && g[r][c] == g[r][c + 1] {
                    return true;
                }
            }
        }
        for r in 0..SIZE - 1 {
            for c in 0..SIZE {
                if g[r][c] != 0 && g[r][c] == g[r + 1][c] {
                    return true;
                }
            }
        }
        false
    }

    /// True iff sliding in `dir` changes the board.
    #[inline]
    pub fn can_move_direction(self, dir: Move) -> bool {
        let (grid, _) = slide(self.grid, dir);
        has_move_occurred(&self.grid, &grid)
    }

    /// Return true if no legal moves remain.
    #[inline]
    pub fn is_game_over(self) -> bool {
        !self.can_move()
    }

    /// True iff some cell holds [`WIN_TILE`].
    #[inline]
    pub fn is_win(self) -> bool {
        self.grid.iter().flatten().any(|&t| t == WIN_TILE)
    }

    /// Return the highest tile value (e.g., 2048) present on the board.
    #[inline]
    pub fn highest_tile(self) -> Tile {
        self.grid.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Sum of all tile values.
    #[inline]
    pub fn tile_sum(self) -> u64 {
        self.grid.iter().flatten().map(|&t| u64::from(t)).sum()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for (r, row) in self.grid.iter().enumerate() {
            if r > 0 {
                writeln!(f, "-------------------------------")?;
            }
            let cells: Vec<String> = row.iter().map(|&t| format_val(t)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        writeln!(f, "score: {}", self.score)
    }
}

impl From<Grid> for Board {
    fn from(grid: Grid) -> Self {
        Board::from_grid(grid)
    }
}

/// Slide every row's tiles toward column 0, keeping order. No merging.
pub fn stack(grid: Grid) -> Grid {
    let mut out = [[0; SIZE]; SIZE];
    for (row, packed) in grid.iter().zip(out.iter_mut()) {
        let mut pos = 0;
        for &tile in row.iter().filter(|&&t| t != 0) {
            packed[pos] = tile;
            pos += 1;
        }
    }
    out
}

/// Merge equal neighbours left to right in every row.
///
/// The left tile doubles and the right one is zeroed, so a tile takes part
/// in at most one merge per pass. Returns the new grid and the sum of the
/// produced tiles.
pub fn merge(mut grid: Grid) -> (Grid, Score) {
    let mut gained = 0;
    for row in grid.iter_mut() {
        for j in 0..SIZE - 1 {
            if row[j] != 0 && row[j] == row[j + 1] {
                row[j] *= 2;
                row[j + 1] = 0;
                gained += Score::from(row[j]);
            }
        }
    }
    (grid, gained)
}

/// Mirror every row.
pub fn reverse(mut grid: Grid) -> Grid {
    for row in grid.iter_mut() {
        row.reverse();
    }
    grid
}

pub fn transpose(grid: Grid) -> Grid {
    let mut out = [[0; SIZE]; SIZE];
    for (r, row) in grid.iter().enumerate() {
        for (c, &tile) in row.iter().enumerate() {
            out[c][r] = tile;
        }
    }
    out
}

/// stack, merge, stack. Every other direction reduces to this one.
pub fn move_left(grid: Grid) -> (Grid, Score) {
    let (merged, gained) = merge(stack(grid));
    (stack(merged), gained)
}

pub fn move_right(grid: Grid) -> (Grid, Score) {
    let (moved, gained) = move_left(reverse(grid));
    (reverse(moved), gained)
}

pub fn move_up(grid: Grid) -> (Grid, Score) {
    let (moved, gained) = move_left(transpose(grid));
    (transpose(moved), gained)
}

pub fn move_down(grid: Grid) -> (Grid, Score) {
    let (moved, gained) = move_right(transpose(grid));
    (transpose(moved), gained)
}

/// Slide/merge tiles in the given direction. No randomness.
#[inline]
pub fn slide(grid: Grid, dir: Move) -> (Grid, Score) {
    match dir {
        Move::Up => move_up(grid),
        Move::Right => move_right(grid),
        Move::Down => move_down(grid),
        Move::Left => move_left(grid),
    }
}

/// True if the grids differ in at least one cell.
#[inline]
pub fn has_move_occurred(before: &Grid, after: &Grid) -> bool {
    before != after
}

/// Fresh board with two random tiles (uses thread-local RNG).
///
/// For reproducible behavior, prefer `Board::new_game(&mut impl Rng)`.
pub fn new_board() -> Board {
    let mut rng = rand::thread_rng();
    Board::new_game(&mut rng)
}

/// Perform a real move then insert a random tile if the move changed the
/// board (uses thread-local RNG).
pub fn make_move(board: Board, dir: Move) -> (Board, bool) {
    let mut rng = rand::thread_rng();
    board.make_move(dir, &mut rng)
}

pub fn can_move(board: Board) -> bool {
    board.can_move()
}

pub fn can_move_direction(board: Board, dir: Move) -> bool {
    board.can_move_direction(dir)
}

pub fn is_win(board: Board) -> bool {
    board.is_win()
}

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 {
        2
    } else {
        4
    }
}

fn format_val(tile: Tile) -> String {
    match tile {
        0 => String::from("       "),
        t => format!("{:^7}", t),
    }
}
