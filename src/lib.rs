use std::{
    fmt::{self, Display, Write},
    ops::Index,
};

use itertools::Itertools;
use smallvec::SmallVec;
use thiserror::Error;

pub mod frontier;
pub mod heuristic;
pub mod search;

pub use frontier::{EmptyFrontier, Frontier, SearchNode};
pub use heuristic::{Heuristic, UnknownHeuristic};
pub use search::{
    breadth_first_solution, solve, Outcome, SearchConfig, SearchEngine, SearchObserver,
    SearchResult, SearchState, SearchStats,
};

/// The movable empty cell.
pub const BLANK: u8 = 0;

const MIN_SIZE: usize = 2;
// tiles are stored as u8, so N² - 1 must fit
const MAX_SIZE: usize = 16;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("board has no rows")]
    Empty,
    #[error("board size {size} is too small, the smallest puzzle is 2x2")]
    TooSmall { size: usize },
    #[error("board size {size} is too large, the largest puzzle is 16x16")]
    TooLarge { size: usize },
    #[error("row {row} has {len} tiles, expected {size}")]
    NotSquare { row: usize, len: usize, size: usize },
    #[error("tile {value} is out of range 0..={max}")]
    OutOfRange { value: u8, max: usize },
    #[error("tile {value} appears more than once")]
    Duplicate { value: u8 },
    #[error("`{token}` is not a tile number")]
    InvalidTile { token: String },
}

/// Direction the blank moves in. Declaration order is the successor order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    fn delta(self) -> (isize, isize) {
        match self {
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
        }
    }
}

/// A square sliding-tile grid holding a permutation of `0..N²`, with `0` as the blank.
///
/// Boards are never mutated once built; moving the blank produces a new board.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Board {
    size: usize,
    tiles: SmallVec<[u8; 16]>,
}

impl Board {
    /// Builds a board from rows, rejecting anything that is not a square permutation.
    pub fn new(from: Vec<Vec<u8>>) -> Result<Board, BoardError> {
        let size = from.len();
        if size == 0 {
            return Err(BoardError::Empty);
        }
        if size < MIN_SIZE {
            return Err(BoardError::TooSmall { size });
        }
        if size > MAX_SIZE {
            return Err(BoardError::TooLarge { size });
        }
        if let Some((row, line)) = from.iter().find_position(|line| line.len() != size) {
            return Err(BoardError::NotSquare {
                row,
                len: line.len(),
                size,
            });
        }

        let tiles: SmallVec<[u8; 16]> = from.into_iter().flatten().collect();
        let max = tiles.len() - 1;
        let mut seen = [false; MAX_SIZE * MAX_SIZE];
        for &value in &tiles {
            if value as usize > max {
                return Err(BoardError::OutOfRange { value, max });
            }
            if std::mem::replace(&mut seen[value as usize], true) {
                return Err(BoardError::Duplicate { value });
            }
        }

        Ok(Board { size, tiles })
    }

    /// The solved board of the given size: tiles ascending row by row, blank last.
    pub fn goal_of_size(size: usize) -> Result<Board, BoardError> {
        if size < MIN_SIZE {
            return Err(BoardError::TooSmall { size });
        }
        if size > MAX_SIZE {
            return Err(BoardError::TooLarge { size });
        }

        Ok(Self::canonical_goal(size))
    }

    fn canonical_goal(size: usize) -> Board {
        let cells = size * size;
        let tiles = (1..cells)
            .map(|value| value as u8)
            .chain(std::iter::once(BLANK))
            .collect();

        Board { size, tiles }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.tiles.chunks(self.size)
    }

    // ((row, col), value), row-major
    pub fn cells(&self) -> impl Iterator<Item = ((usize, usize), u8)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(move |(ix, &value)| ((ix / self.size, ix % self.size), value))
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row < self.size && col < self.size {
            Some(self.tiles[row * self.size + col])
        } else {
            None
        }
    }

    pub fn goal(&self) -> Board {
        Self::canonical_goal(self.size)
    }

    pub fn is_goal(&self) -> bool {
        let last = self.tiles.len() - 1;
        self.tiles.iter().enumerate().all(|(ix, &value)| {
            if ix == last {
                value == BLANK
            } else {
                value as usize == ix + 1
            }
        })
    }

    pub fn position_of(&self, value: u8) -> Option<(usize, usize)> {
        self.tiles
            .iter()
            .position(|&tile| tile == value)
            .map(|ix| (ix / self.size, ix % self.size))
    }

    pub fn blank_position(&self) -> (usize, usize) {
        match self.position_of(BLANK) {
            Some(position) => position,
            None => unreachable!("board constructed without a blank"),
        }
    }

    /// The board after moving the blank one cell, or `None` at the edge.
    pub fn slide(&self, direction: Direction) -> Option<Board> {
        self.slide_from(self.blank_position(), direction)
    }

    fn slide_from(&self, blank: (usize, usize), direction: Direction) -> Option<Board> {
        let (d_row, d_col) = direction.delta();
        let row = blank.0.checked_add_signed(d_row)?;
        let col = blank.1.checked_add_signed(d_col)?;
        if row >= self.size || col >= self.size {
            return None;
        }

        let mut next = self.clone();
        next.tiles
            .swap(blank.0 * self.size + blank.1, row * self.size + col);
        Some(next)
    }

    /// One board per legal blank move, in [`Direction::ALL`] order.
    pub fn successors(&self) -> SmallVec<[Board; 4]> {
        let blank = self.blank_position();
        Direction::ALL
            .iter()
            .filter_map(|&direction| self.slide_from(blank, direction))
            .collect()
    }

    /// Whether the canonical goal is reachable, judged by permutation parity.
    pub fn is_solvable(&self) -> bool {
        let inversions = self
            .tiles
            .iter()
            .filter(|&&value| value != BLANK)
            .tuple_combinations()
            .filter(|(a, b)| a > b)
            .count();

        if self.size % 2 == 1 {
            inversions % 2 == 0
        } else {
            let (blank_row, _) = self.blank_position();
            (inversions + blank_row) % 2 == 1
        }
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for line in self.rows() {
            if !first {
                f.write_char('\n')?;
            } else {
                first = false;
            }

            write!(f, "{}", line.iter().join(" "))?;
        }

        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.rows()).finish()
    }
}

impl Index<(usize, usize)> for Board {
    type Output = u8;
    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.tiles[index.0 * self.size + index.1]
    }
}

pub fn parse_row(row: &str) -> Result<Vec<u8>, BoardError> {
    row.split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| BoardError::InvalidTile {
                token: token.to_owned(),
            })
        })
        .collect()
}

/// Parses a board written one row per line. Blank lines are skipped.
pub fn parse_board(b: &str) -> Result<Board, BoardError> {
    let board = b
        .trim()
        .lines()
        .filter(|row| !row.trim().is_empty())
        .map(parse_row)
        .collect::<Result<Vec<_>, _>>()?;

    Board::new(board)
}

#[cfg(test)]
mod test {
    use pathfinding::directed::bfs::bfs_reach;

    use super::*;

    const SAMPLE: &str = "
1 2 3
4 0 6
7 5 8
";

    fn board(rows: &[&[u8]]) -> Board {
        Board::new(rows.iter().map(|row| row.to_vec()).collect()).unwrap()
    }

    #[test]
    fn rejects_invalid_grids() {
        assert_eq!(Board::new(vec![]), Err(BoardError::Empty));
        assert_eq!(
            Board::new(vec![vec![0]]),
            Err(BoardError::TooSmall { size: 1 })
        );
        assert_eq!(
            Board::new(vec![vec![1, 2, 3], vec![4, 0], vec![5, 6, 7]]),
            Err(BoardError::NotSquare {
                row: 1,
                len: 2,
                size: 3
            })
        );
        assert_eq!(
            Board::new(vec![vec![1, 2], vec![9, 0]]),
            Err(BoardError::OutOfRange { value: 9, max: 3 })
        );
        assert_eq!(
            Board::new(vec![vec![1, 1], vec![3, 0]]),
            Err(BoardError::Duplicate { value: 1 })
        );
        // no blank means some other value is duplicated
        assert_eq!(
            Board::new(vec![vec![1, 2], vec![3, 3]]),
            Err(BoardError::Duplicate { value: 3 })
        );
        assert_eq!(
            Board::new(vec![vec![0; 17]; 17]),
            Err(BoardError::TooLarge { size: 17 })
        );
    }

    #[test]
    fn goal_is_row_major_with_blank_last() {
        let goal = Board::goal_of_size(3).unwrap();
        assert_eq!(goal, board(&[&[1, 2, 3], &[4, 5, 6], &[7, 8, 0]]));
        assert!(goal.is_goal());
        assert_eq!(goal.blank_position(), (2, 2));

        let sample = parse_board(SAMPLE).unwrap();
        assert_eq!(sample.goal(), goal);
        assert!(!sample.is_goal());

        assert_eq!(Board::goal_of_size(16).unwrap().tiles()[254], 255);
        assert!(Board::goal_of_size(1).is_err());
    }

    #[test]
    fn successors_follow_fixed_order() {
        let sample = parse_board(SAMPLE).unwrap();
        assert_eq!(sample.blank_position(), (1, 1));

        let children = sample.successors();
        assert_eq!(
            children.to_vec(),
            vec![
                board(&[&[1, 2, 3], &[0, 4, 6], &[7, 5, 8]]),
                board(&[&[1, 2, 3], &[4, 6, 0], &[7, 5, 8]]),
                board(&[&[1, 0, 3], &[4, 2, 6], &[7, 5, 8]]),
                board(&[&[1, 2, 3], &[4, 5, 6], &[7, 0, 8]]),
            ]
        );

        // parent is untouched
        assert_eq!(sample, parse_board(SAMPLE).unwrap());
    }

    #[test]
    fn corner_blank_has_two_moves() {
        let goal = Board::goal_of_size(3).unwrap();
        assert_eq!(goal.slide(Direction::Right), None);
        assert_eq!(goal.slide(Direction::Down), None);
        assert_eq!(
            goal.successors().to_vec(),
            vec![
                board(&[&[1, 2, 3], &[4, 5, 6], &[7, 0, 8]]),
                board(&[&[1, 2, 3], &[4, 5, 0], &[7, 8, 6]]),
            ]
        );
    }

    #[test]
    fn successors_move_blank_to_an_adjacent_cell() {
        for size in 2..=3 {
            let goal = Board::goal_of_size(size).unwrap();
            for parent in bfs_reach(goal, |b| b.successors()).take(2000) {
                let children = parent.successors();
                assert!((2..=4).contains(&children.len()), "{:?}", parent);

                let (row, col) = parent.blank_position();
                for child in children {
                    let (child_row, child_col) = child.blank_position();
                    assert_eq!(row.abs_diff(child_row) + col.abs_diff(child_col), 1);

                    let changed = parent
                        .tiles()
                        .iter()
                        .zip(child.tiles())
                        .filter(|(a, b)| a != b)
                        .count();
                    assert_eq!(changed, 2);
                }
            }
        }
    }

    #[test]
    fn solvability_parity() {
        assert!(Board::goal_of_size(3).unwrap().is_solvable());
        assert!(parse_board(SAMPLE).unwrap().is_solvable());
        assert!(!board(&[&[2, 1, 3], &[4, 5, 6], &[7, 8, 0]]).is_solvable());

        assert!(Board::goal_of_size(4).unwrap().is_solvable());
        assert!(board(&[&[1, 2], &[0, 3]]).is_solvable());
        assert!(!board(&[&[2, 1], &[3, 0]]).is_solvable());

        let goal = Board::goal_of_size(4).unwrap();
        let up = goal.slide(Direction::Up).unwrap();
        assert!(up.is_solvable());
        assert!(up.slide(Direction::Left).unwrap().is_solvable());
    }

    #[test]
    fn parses_and_displays() {
        let sample = parse_board(SAMPLE).unwrap();
        assert_eq!(sample.to_string(), "1 2 3\n4 0 6\n7 5 8");
        assert_eq!(sample[(2, 1)], 5);
        assert_eq!(sample.get(0, 2), Some(3));
        assert_eq!(sample.get(3, 0), None);
        assert_eq!(sample.position_of(8), Some((2, 2)));
        assert_eq!(format!("{:?}", sample), "[[1, 2, 3], [4, 0, 6], [7, 5, 8]]");

        assert_eq!(
            parse_board("1 2\n3 x"),
            Err(BoardError::InvalidTile {
                token: "x".to_owned()
            })
        );
        assert_eq!(parse_row("1\t2   3").unwrap(), vec![1, 2, 3]);
    }
}
