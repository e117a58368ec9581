use log::{debug, info};
use rand::Rng;
use std::fmt;

/// Side length of the (square) board.
pub const SIZE: usize = 4;

/// Producing a tile of exactly this value by a merge sets the win flag.
pub const WIN_TILE: Tile = 2048;

/// A cell value: 0 for empty, otherwise a power of two >= 2.
pub type Tile = u32;
pub type Score = u64;
pub type Rows = [[Tile; SIZE]; SIZE];

type Line = [Tile; SIZE];

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];
}

/// The 4x4 grid, row-major. `Copy`, so a snapshot is just a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(Rows);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board([[0; SIZE]; SIZE]);

    #[inline]
    pub fn from_rows(rows: Rows) -> Self {
        Board(rows)
    }

    #[inline]
    pub fn into_rows(self) -> Rows {
        self.0
    }

    #[inline]
    pub fn rows(&self) -> &Rows {
        &self.0
    }

    /// Tile at `(row, col)`. Panics when either index is >= `SIZE`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Tile {
        self.0[row][col]
    }

    /// All 16 cells in row-major order, empty cells included.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.0.iter().flat_map(|row| row.iter().copied())
    }

    /// Coordinates of every empty cell, row-major.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::with_capacity(SIZE * SIZE);
        for (r, row) in self.0.iter().enumerate() {
            for (c, &tile) in row.iter().enumerate() {
                if tile == 0 {
                    cells.push((r, c));
                }
            }
        }
        cells
    }

    #[inline]
    pub fn count_empty(&self) -> usize {
        self.tiles().filter(|&t| t == 0).count()
    }

    /// Highest tile value on the board (0 for an empty board).
    #[inline]
    pub fn highest_tile(&self) -> Tile {
        self.tiles().max().unwrap_or(0)
    }

    /// True if some move can still change the board: an empty cell exists,
    /// or two horizontally or vertically adjacent cells hold the same value.
    ///
    /// ```
    /// use term_2048::engine::Board;
    /// let stuck = Board::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
    /// assert!(!stuck.can_move());
    /// assert!(Board::EMPTY.can_move());
    /// ```
    pub fn can_move(&self) -> bool {
        for r in 0..SIZE {
            for c in 0..SIZE {
                let tile = self.0[r][c];
                if tile == 0 {
                    return true;
                }
                if c + 1 < SIZE && tile == self.0[r][c + 1] {
                    return true;
                }
                if r + 1 < SIZE && tile == self.0[r + 1][c] {
                    return true;
                }
            }
        }
        false
    }

    /// Swap rows and columns.
    pub fn transpose(self) -> Self {
        let mut out = [[0; SIZE]; SIZE];
        for (r, row) in self.0.iter().enumerate() {
            for (c, &tile) in row.iter().enumerate() {
                out[c][r] = tile;
            }
        }
        Board(out)
    }

    /// Mirror every row left-to-right.
    pub fn reverse_rows(mut self) -> Self {
        for row in self.0.iter_mut() {
            row.reverse();
        }
        self
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for (idx, row) in self.0.iter().enumerate() {
            let cells: Vec<String> = row.iter().map(format_val).collect();
            writeln!(f, "{}", cells.join("|"))?;
            if idx + 1 < SIZE {
                writeln!(f, "{}", "-".repeat(31))?;
            }
        }
        Ok(())
    }
}

impl From<Rows> for Board {
    fn from(rows: Rows) -> Self {
        Board::from_rows(rows)
    }
}

/// What a finished (or abandoned) game leaves behind for the score table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub score: Score,
    pub highest_tile: Tile,
}

/// One game session: the board plus score and status flags.
///
/// All randomness is injected, so a seeded RNG replays a game exactly:
/// ```
/// use term_2048::engine::{Game, Move};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let mut game = Game::new(&mut rng);
/// assert_eq!(game.board().count_empty(), 14);
/// for dir in Move::ALL {
///     game.play(dir, &mut rng);
/// }
/// assert!(game.score() % 2 == 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    score: Score,
    won: bool,
    game_over: bool,
}

impl Game {
    /// Fresh game: empty board with two random tiles, score 0.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut game = Game::from_board(Board::EMPTY);
        game.add_random_tile(rng);
        game.add_random_tile(rng);
        game
    }

    /// Game positioned on `board` with score 0 and the win flag clear.
    /// `game_over` reflects whether any move is left.
    pub fn from_board(board: Board) -> Self {
        Game {
            board,
            score: 0,
            won: false,
            game_over: !board.can_move(),
        }
    }

    pub fn with_score(mut self, score: Score) -> Self {
        self.score = score;
        self
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn score(&self) -> Score {
        self.score
    }

    #[inline]
    pub fn won(&self) -> bool {
        self.won
    }

    #[inline]
    pub fn game_over(&self) -> bool {
        self.game_over
    }

    #[inline]
    pub fn highest_tile(&self) -> Tile {
        self.board.highest_tile()
    }

    pub fn result(&self) -> GameResult {
        GameResult { score: self.score, highest_tile: self.highest_tile() }
    }

    #[inline]
    pub fn can_move(&self) -> bool {
        self.board.can_move()
    }

    /// Put a 2 (90%) or a 4 (10%) on a uniformly chosen empty cell.
    ///
    /// Returns the filled cell, or `None` on a full board (left untouched).
    pub fn add_random_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<(usize, usize)> {
        let empty = self.board.empty_cells();
        if empty.is_empty() {
            return None;
        }
        let (r, c) = empty[rng.gen_range(0..empty.len())];
        self.board.0[r][c] = generate_random_tile(rng);
        Some((r, c))
    }

    /// Slide and merge every row toward column 0.
    pub fn move_left(&mut self) -> bool {
        let before = self.board;
        for row in self.board.0.iter_mut() {
            let slid = slide_line_left(*row);
            *row = slid.line;
            self.score += slid.gained;
            self.won |= slid.reached_win;
        }
        self.board != before
    }

    pub fn move_right(&mut self) -> bool {
        let before = self.board;
        self.board = self.board.reverse_rows();
        self.move_left();
        self.board = self.board.reverse_rows();
        self.board != before
    }

    pub fn move_up(&mut self) -> bool {
        let before = self.board;
        self.board = self.board.transpose();
        self.move_left();
        self.board = self.board.transpose();
        self.board != before
    }

    pub fn move_down(&mut self) -> bool {
        let before = self.board;
        self.board = self.board.transpose();
        self.move_right();
        self.board = self.board.transpose();
        self.board != before
    }

    /// Slide/merge in `direction` without spawning. Returns whether the board changed.
    pub fn apply(&mut self, direction: Move) -> bool {
        match direction {
            Move::Up => self.move_up(),
            Move::Down => self.move_down(),
            Move::Left => self.move_left(),
            Move::Right => self.move_right(),
        }
    }

    /// One player turn: move, spawn a tile if the board changed, then
    /// refresh `game_over`. Returns whether the board changed.
    pub fn play<R: Rng + ?Sized>(&mut self, direction: Move, rng: &mut R) -> bool {
        let was_won = self.won;
        let changed = self.apply(direction);
        if changed {
            let spawned = self.add_random_tile(rng);
            debug!("{direction:?}: score {}, spawned at {spawned:?}", self.score);
        } else {
            debug!("{direction:?}: board unchanged");
        }
        if self.won && !was_won {
            info!("reached {WIN_TILE} with score {}", self.score);
        }
        self.game_over = !self.can_move();
        if self.game_over {
            info!("game over: score {}, highest tile {}", self.score, self.highest_tile());
        }
        changed
    }
}

struct LineSlide {
    line: Line,
    gained: Score,
    reached_win: bool,
}

/// Compact a line toward index 0 and merge equal neighbours once, left to right.
fn slide_line_left(line: Line) -> LineSlide {
    let packed: Vec<Tile> = line.iter().copied().filter(|&t| t != 0).collect();
    let mut out = [0; SIZE];
    let mut len = 0;
    let mut gained = 0;
    let mut reached_win = false;
    let mut idx = 0;
    while idx < packed.len() {
        let tile = packed[idx];
        if idx + 1 < packed.len() && packed[idx + 1] == tile {
            let merged = tile * 2;
            gained += Score::from(merged);
            reached_win |= merged == WIN_TILE;
            out[len] = merged;
            // the partner is consumed; a fresh tile never merges twice
            idx += 2;
        } else {
            out[len] = tile;
            idx += 1;
        }
        len += 1;
    }
    LineSlide { line: out, gained, reached_win }
}

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..10) < 9 { 2 } else { 4 }
}

fn format_val(val: &Tile) -> String {
    match val {
        0 => " ".repeat(7),
        x => format!("{:^7}", x),
    }
}
