use std::time::{Duration, Instant};

use log::{debug, trace};
use pathfinding::directed::bfs::bfs;

use crate::{
    frontier::{Frontier, SearchNode},
    heuristic::Heuristic,
    Board,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchConfig {
    /// Skip boards that were already enqueued once.
    ///
    /// A rediscovered board is dropped even when the new path to it is shorter, so
    /// informed searches may settle for a longer solution. Turning this off can
    /// expand the same board repeatedly, and on an unsolvable board the search then
    /// only stops through a budget.
    pub dedup: bool,
    /// Stop with [`Outcome::Aborted`] after this many expansions.
    pub max_expansions: Option<usize>,
    /// Stop with [`Outcome::Aborted`] once this much time has passed since the
    /// engine was created. Limits past what `Instant` can represent never expire.
    pub time_limit: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            dedup: true,
            max_expansions: None,
            time_limit: None,
        }
    }
}

impl SearchConfig {
    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = Some(max_expansions);
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }
}

/// How a finished search ended. Only `GoalFound` carries a path cost.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Outcome {
    GoalFound,
    /// Every reachable board was expanded without meeting the goal.
    Exhausted,
    /// The expansion budget or time limit ran out first.
    Aborted,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SearchState {
    Running,
    Finished(Outcome),
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SearchStats {
    pub nodes_expanded: usize,
    pub max_frontier_size: usize,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchResult {
    pub outcome: Outcome,
    pub path_cost: Option<usize>,
    pub nodes_expanded: usize,
    pub max_frontier_size: usize,
}

/// Sees every node right before its goal test.
pub trait SearchObserver {
    fn expanding(&mut self, node: &SearchNode);
}

impl<F> SearchObserver for F
where
    F: FnMut(&SearchNode),
{
    fn expanding(&mut self, node: &SearchNode) {
        self(node)
    }
}

/// Best-first search from one start board towards its canonical goal.
///
/// Each [`step`](SearchEngine::step) samples the frontier size, dequeues the
/// minimum-`f` node, counts it as expanded, tests it against the goal and otherwise
/// enqueues its successors with `g + 1`.
pub struct SearchEngine {
    heuristic: Heuristic,
    goal: Board,
    frontier: Frontier,
    max_expansions: Option<usize>,
    deadline: Option<Instant>,
    state: SearchState,
    stats: SearchStats,
    path_cost: Option<usize>,
}

impl SearchEngine {
    pub fn new(start: Board, heuristic: Heuristic, config: SearchConfig) -> Self {
        let goal = start.goal();
        let h = heuristic.estimate(&start, &goal);

        let mut frontier = Frontier::new(config.dedup);
        frontier.enqueue(SearchNode::new(start, 0, h));

        SearchEngine {
            heuristic,
            goal,
            frontier,
            max_expansions: config.max_expansions,
            // a limit too far out to represent never expires
            deadline: config
                .time_limit
                .and_then(|limit| Instant::now().checked_add(limit)),
            state: SearchState::Running,
            stats: SearchStats::default(),
            path_cost: None,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn result(&self) -> Option<SearchResult> {
        match self.state {
            SearchState::Running => None,
            SearchState::Finished(outcome) => Some(self.result_for(outcome)),
        }
    }

    pub fn step(&mut self) -> SearchState {
        self.step_observed(&mut |_: &SearchNode| {})
    }

    pub fn step_observed<O>(&mut self, observer: &mut O) -> SearchState
    where
        O: SearchObserver + ?Sized,
    {
        if self.state != SearchState::Running {
            return self.state;
        }

        self.stats.max_frontier_size = self.stats.max_frontier_size.max(self.frontier.size());

        if self.frontier.is_empty() {
            return self.finish(Outcome::Exhausted);
        }
        if self.out_of_budget() {
            return self.finish(Outcome::Aborted);
        }

        let node = match self.frontier.dequeue() {
            Ok(node) => node,
            Err(err) => unreachable!("{} after checking it was non-empty", err),
        };
        self.stats.nodes_expanded += 1;

        trace!(
            "expanding node with g = {}, h = {} ({} left in frontier)",
            node.g(),
            node.h(),
            self.frontier.size()
        );
        observer.expanding(&node);

        if node.board().is_goal() {
            self.path_cost = Some(node.g());
            return self.finish(Outcome::GoalFound);
        }

        for successor in node.board().successors() {
            let h = self.heuristic.estimate(&successor, &self.goal);
            self.frontier
                .enqueue(SearchNode::new(successor, node.g() + 1, h));
        }

        self.state
    }

    pub fn run(self) -> SearchResult {
        self.run_observed(&mut |_: &SearchNode| {})
    }

    pub fn run_observed<O>(mut self, observer: &mut O) -> SearchResult
    where
        O: SearchObserver + ?Sized,
    {
        loop {
            if let SearchState::Finished(outcome) = self.step_observed(observer) {
                return self.result_for(outcome);
            }
        }
    }

    fn out_of_budget(&self) -> bool {
        let expansions_spent = self
            .max_expansions
            .map_or(false, |max| self.stats.nodes_expanded >= max);
        let time_spent = self
            .deadline
            .map_or(false, |deadline| Instant::now() >= deadline);

        expansions_spent || time_spent
    }

    fn finish(&mut self, outcome: Outcome) -> SearchState {
        debug!(
            "{} search finished with {:?} (cost {:?}): expanded {} nodes, max frontier {}",
            self.heuristic,
            outcome,
            self.path_cost,
            self.stats.nodes_expanded,
            self.stats.max_frontier_size
        );
        self.state = SearchState::Finished(outcome);
        self.state
    }

    fn result_for(&self, outcome: Outcome) -> SearchResult {
        SearchResult {
            outcome,
            path_cost: self.path_cost,
            nodes_expanded: self.stats.nodes_expanded,
            max_frontier_size: self.stats.max_frontier_size,
        }
    }
}

pub fn solve(start: &Board, heuristic: Heuristic) -> SearchResult {
    SearchEngine::new(start.clone(), heuristic, SearchConfig::default()).run()
}

/// A shortest solution by plain breadth-first search, start and goal included.
///
/// Explores the whole reachable state space when there is no solution, so it is
/// only practical up to the 8-puzzle.
pub fn breadth_first_solution(start: &Board) -> Option<Vec<Board>> {
    bfs(start, |b| b.successors(), |b| b.is_goal())
}
