use std::{fmt, str::FromStr};

use smallvec::{smallvec, SmallVec};
use thiserror::Error;

use crate::{Board, BLANK};

/// Remaining-cost estimate used to order the frontier.
///
/// `MisplacedTile` and `Manhattan` never overestimate the number of moves left,
/// so A* with either still returns an optimal solution.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Heuristic {
    /// Always zero, which turns A* into uniform-cost search.
    Uniform,
    MisplacedTile,
    Manhattan,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown heuristic `{0}`, expected one of uniform, misplaced-tile, manhattan")]
pub struct UnknownHeuristic(pub String);

impl Heuristic {
    pub const ALL: [Heuristic; 3] = [
        Heuristic::Uniform,
        Heuristic::MisplacedTile,
        Heuristic::Manhattan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Heuristic::Uniform => "uniform",
            Heuristic::MisplacedTile => "misplaced-tile",
            Heuristic::Manhattan => "manhattan",
        }
    }

    pub fn estimate(self, board: &Board, goal: &Board) -> usize {
        match self {
            Heuristic::Uniform => 0,
            Heuristic::MisplacedTile => misplaced_tiles(board, goal),
            Heuristic::Manhattan => manhattan(board, goal),
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Heuristic {
    type Err = UnknownHeuristic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Heuristic::ALL
            .into_iter()
            .find(|heuristic| heuristic.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownHeuristic(s.to_owned()))
    }
}

// the blank is never counted, even when it is out of place
fn misplaced_tiles(board: &Board, goal: &Board) -> usize {
    board
        .cells()
        .filter(|&(_, value)| value != BLANK)
        .filter(|&((row, col), value)| goal.get(row, col) != Some(value))
        .count()
}

fn manhattan(board: &Board, goal: &Board) -> usize {
    let mut targets: SmallVec<[Option<(usize, usize)>; 16]> = smallvec![None; goal.tiles().len()];
    for (position, value) in goal.cells() {
        if let Some(slot) = targets.get_mut(value as usize) {
            *slot = Some(position);
        }
    }

    board
        .cells()
        .filter(|&(_, value)| value != BLANK)
        .map(
            |((row, col), value)| match targets.get(value as usize).copied().flatten() {
                Some((goal_row, goal_col)) => row.abs_diff(goal_row) + col.abs_diff(goal_col),
                // a tile missing from the goal contributes nothing
                None => 0,
            },
        )
        .sum()
}
