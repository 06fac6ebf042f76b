use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
};

use anyhow::{Context, Result};
use npuzzle_solver::{
    parse_board, parse_row, Board, BoardError, Heuristic, Outcome, SearchConfig, SearchEngine,
    SearchNode, SearchResult,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_PUZZLE: &str = "
1 2 3
4 0 6
7 5 8
";

enum Answer<T> {
    Got(T),
    // already reported, start over
    Invalid,
    EndOfInput,
}

// Answers come from a script file when one is given, otherwise from stdin.
#[auto_enums::auto_enum(Iterator)]
fn input_lines(script: Option<File>) -> impl Iterator<Item = io::Result<String>> {
    match script {
        Some(file) => BufReader::new(file).lines(),
        None => io::stdin().lines(),
    }
}

struct Console<I> {
    lines: I,
}

impl<I> Console<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        println!("{}", prompt);
        io::stdout().flush()?;

        let line = self.lines.next().transpose().context("reading input")?;
        Ok(line.map(|line| line.trim().to_owned()))
    }

    fn read_board(&mut self) -> Result<Answer<Board>> {
        let Some(choice) = self.ask(
            "Welcome to the N-puzzle solver. \
             Type \"1\" to use a default puzzle, or \"2\" to enter your own puzzle",
        )?
        else {
            return Ok(Answer::EndOfInput);
        };

        match choice.as_str() {
            "1" => Ok(Answer::Got(parse_board(DEFAULT_PUZZLE)?)),
            "2" => self.read_custom_board(),
            _ => {
                println!("Error, invalid input");
                Ok(Answer::Invalid)
            }
        }
    }

    // the first row fixes the size of the puzzle
    fn read_custom_board(&mut self) -> Result<Answer<Board>> {
        println!("Enter your puzzle, use a zero to represent the blank");
        let Some(line) = self.ask("Enter the first row, use space or tabs between numbers")?
        else {
            return Ok(Answer::EndOfInput);
        };
        let first = match parse_row(&line) {
            Ok(row) => row,
            Err(err) => return Ok(invalid(err)),
        };

        if first.is_empty() {
            return Ok(invalid(BoardError::Empty));
        }

        let size = first.len();
        let mut rows = vec![first];
        for ix in 1..size {
            let Some(line) = self.ask(&format!(
                "Enter row {} of {}, use space or tabs between numbers",
                ix + 1,
                size
            ))?
            else {
                return Ok(Answer::EndOfInput);
            };
            match parse_row(&line) {
                Ok(row) => rows.push(row),
                Err(err) => return Ok(invalid(err)),
            }
        }

        match Board::new(rows) {
            Ok(board) => Ok(Answer::Got(board)),
            Err(err) => Ok(invalid(err)),
        }
    }

    fn read_heuristic(&mut self) -> Result<Answer<Heuristic>> {
        let Some(choice) = self.ask(
            "Enter your choice of algorithm\n\
             1: Uniform Cost Search\n\
             2: A* with Misplaced Tile Heuristic\n\
             3: A* with Manhattan distance Heuristic",
        )?
        else {
            return Ok(Answer::EndOfInput);
        };

        let heuristic = match choice.as_str() {
            "1" => Ok(Heuristic::Uniform),
            "2" => Ok(Heuristic::MisplacedTile),
            "3" => Ok(Heuristic::Manhattan),
            name => name.parse::<Heuristic>(),
        };

        match heuristic {
            Ok(heuristic) => Ok(Answer::Got(heuristic)),
            Err(err) => {
                println!("Invalid input: {}", err);
                Ok(Answer::Invalid)
            }
        }
    }
}

fn invalid<T>(err: BoardError) -> Answer<T> {
    println!("Invalid Input: {}", err);
    Answer::Invalid
}

fn search(board: Board, heuristic: Heuristic) -> SearchResult {
    let engine = SearchEngine::new(board, heuristic, SearchConfig::default());
    engine.run_observed(&mut |node: &SearchNode| {
        println!(
            "Expanding node with g(n) = {} and h(n) = {}",
            node.g(),
            node.h()
        );
        println!("{}", node.board());
    })
}

fn report(result: &SearchResult) {
    match (result.outcome, result.path_cost) {
        (Outcome::GoalFound, Some(cost)) => println!("Goal state found in {} moves.", cost),
        (Outcome::GoalFound, None) => println!("Goal state found."),
        (Outcome::Exhausted, _) => println!("No solution found."),
        (Outcome::Aborted, _) => println!("Search aborted before reaching the goal."),
    }
    println!("Max queue size: {}", result.max_frontier_size);
    println!("Nodes expanded: {}", result.nodes_expanded);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let script = std::env::args()
        .nth(1)
        .map(|path| File::open(&path).with_context(|| format!("opening script {}", path)))
        .transpose()?;
    let mut console = Console {
        lines: input_lines(script),
    };

    loop {
        let board = match console.read_board()? {
            Answer::Got(board) => board,
            Answer::Invalid => continue,
            Answer::EndOfInput => return Ok(()),
        };
        if !board.is_solvable() {
            println!("Warning: this puzzle cannot reach the goal, expect the search to exhaust every reachable board.");
        }

        let heuristic = match console.read_heuristic()? {
            Answer::Got(heuristic) => heuristic,
            Answer::Invalid => continue,
            Answer::EndOfInput => return Ok(()),
        };

        let result = search(board, heuristic);
        report(&result);

        if console.ask("Press enter to restart.")?.is_none() {
            return Ok(());
        }
    }
}
