//! The ordered set of discovered-but-unexpanded nodes.

use std::{cmp::Ordering, collections::BinaryHeap};

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::Board;

/// A board together with its path cost `g` and heuristic estimate `h`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchNode {
    board: Board,
    g: usize,
    h: usize,
}

impl SearchNode {
    pub fn new(board: Board, g: usize, h: usize) -> Self {
        SearchNode { board, g, h }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn g(&self) -> usize {
        self.g
    }

    pub fn h(&self) -> usize {
        self.h
    }

    // priority
    pub fn f(&self) -> usize {
        self.g + self.h
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("dequeue called on an empty frontier")]
pub struct EmptyFrontier;

struct Entry {
    f: usize,
    // insertion counter, breaks ties first-in first-out
    order: u64,
    node: SearchNode,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.order == other.order
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// reversed, so the max-heap pops the smallest (f, order)
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.order.cmp(&self.order))
    }
}

/// Min-`f` priority queue, FIFO among equal `f`.
///
/// With deduplication on, a board that was ever enqueued before is never enqueued
/// again, even when the newer node reaches it with a smaller `g`.
pub struct Frontier {
    heap: BinaryHeap<Entry>,
    inserted: u64,
    seen: Option<FxHashSet<Board>>,
}

impl Frontier {
    pub fn new(dedup: bool) -> Self {
        Frontier {
            heap: BinaryHeap::new(),
            inserted: 0,
            seen: dedup.then(FxHashSet::default),
        }
    }

    pub fn dedup(&self) -> bool {
        self.seen.is_some()
    }

    /// Inserts `node`, returning `false` if it was discarded as a repeated board.
    pub fn enqueue(&mut self, node: SearchNode) -> bool {
        if let Some(seen) = &mut self.seen {
            if !seen.insert(node.board.clone()) {
                return false;
            }
        }

        self.heap.push(Entry {
            f: node.f(),
            order: self.inserted,
            node,
        });
        self.inserted += 1;
        true
    }

    /// Removes the minimum-`f` node, the earliest inserted among ties.
    pub fn dequeue(&mut self) -> Result<SearchNode, EmptyFrontier> {
        self.heap.pop().map(|entry| entry.node).ok_or(EmptyFrontier)
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn size(&self) -> usize {
        self.heap.len()
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Frontier::new(true)
    }
}
