//! Grid cells and moves.

use std::fmt;

/// A cell on the grid, addressed by row and column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Cell reached by `mv`, clamped to a `rows` x `cols` grid.
    pub fn step(self, mv: Move, rows: u32, cols: u32) -> Self {
        let (dr, dc) = mv.delta();
        let clamp = |value: u32, delta: i64, len: u32| -> u32 {
            let max = i64::from(len.saturating_sub(1));
            (i64::from(value) + delta).clamp(0, max) as u32
        };
        Self {
            row: clamp(self.row, dr, rows),
            col: clamp(self.col, dc, cols),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four grid moves.
///
/// The index of a move is also the outcome slot it occupies in the
/// belief, for simulated and real transitions alike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Move {
    Right,
    Left,
    Down,
    Up,
}

impl Move {
    /// All moves, in index order.
    pub const ALL: [Move; 4] = [Move::Right, Move::Left, Move::Down, Move::Up];

    /// Number of moves (and outcome slots).
    pub const COUNT: usize = 4;

    /// Index of the move in [`Move::ALL`].
    pub fn index(self) -> usize {
        match self {
            Move::Right => 0,
            Move::Left => 1,
            Move::Down => 2,
            Move::Up => 3,
        }
    }

    /// Move at `index`, if in range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// (row, column) displacement.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Move::Right => (0, 1),
            Move::Left => (0, -1),
            Move::Down => (1, 0),
            Move::Up => (-1, 0),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Right => "right",
            Move::Left => "left",
            Move::Down => "down",
            Move::Up => "up",
        };
        write!(f, "{}", name)
    }
}
