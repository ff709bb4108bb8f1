//! Traversal of object graphs.
//!
//! A graph is described by its nodes: every [`Node`] knows its children.
//! [`BreadthFirst`] and [`DepthFirst`] walk the graph reachable from a start
//! node, visiting each node once even when the graph has cycles.
//!
//! ```
//! use beans_graph::{Node, TraversalStrategy, per_predicate_iter};
//!
//! #[derive(Clone, PartialEq, Eq, Hash, Debug)]
//! struct Dir(&'static str);
//!
//! impl Node for Dir {
//!     fn children(&self) -> Vec<Self> {
//!         match self.0 {
//!             "/" => vec![Dir("/etc"), Dir("/usr")],
//!             "/usr" => vec![Dir("/usr/bin")],
//!             _ => Vec::new(),
//!         }
//!     }
//! }
//!
//! let predicates: [fn(&Dir) -> bool; 2] = [|d| d.0.starts_with("/usr"), |d| d.0 == "/etc"];
//! let order: Vec<_> = per_predicate_iter(TraversalStrategy::BreadthFirst, Dir("/"), predicates)
//!     .map(|d| d.0)
//!     .collect();
//! assert_eq!(order, vec!["/usr", "/usr/bin", "/etc"]);
//! ```

use std::collections::VecDeque;
use std::hash::Hash;

use rustc_hash::FxHashSet;

/// A node of a traversable graph.
///
/// Nodes are compared by `Eq`/`Hash` to detect already visited nodes.
pub trait Node: Clone + Eq + Hash {
    /// The direct successors of this node, in visiting order.
    fn children(&self) -> Vec<Self>;
}

// ============================================================================
// Iterators
// ============================================================================

/// Level-order traversal starting at one node.
#[derive(Debug, Clone)]
pub struct BreadthFirst<N: Node> {
    queue: VecDeque<N>,
    visited: FxHashSet<N>,
}

impl<N: Node> BreadthFirst<N> {
    pub fn new(start: N) -> Self {
        let mut visited = FxHashSet::default();
        visited.insert(start.clone());
        Self {
            queue: VecDeque::from([start]),
            visited,
        }
    }
}

impl<N: Node> Iterator for BreadthFirst<N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        let node = self.queue.pop_front()?;
        for child in node.children() {
            if self.visited.insert(child.clone()) {
                self.queue.push_back(child);
            }
        }
        Some(node)
    }
}

/// Pre-order depth-first traversal starting at one node.
#[derive(Debug, Clone)]
pub struct DepthFirst<N: Node> {
    stack: Vec<N>,
    visited: FxHashSet<N>,
}

impl<N: Node> DepthFirst<N> {
    pub fn new(start: N) -> Self {
        Self {
            stack: vec![start],
            visited: FxHashSet::default(),
        }
    }
}

impl<N: Node> Iterator for DepthFirst<N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        while let Some(node) = self.stack.pop() {
            if !self.visited.insert(node.clone()) {
                continue;
            }
            // Reversed so the first child is popped first.
            let children = node.children().into_iter().rev();
            self.stack.extend(children.filter(|child| !self.visited.contains(child)));
            return Some(node);
        }
        None
    }
}

// ============================================================================
// Facade
// ============================================================================

/// Order in which a traversal visits nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalStrategy {
    DepthFirst,
    BreadthFirst,
}

/// A traversal using either strategy.
#[derive(Debug, Clone)]
pub enum Traversal<N: Node> {
    DepthFirst(DepthFirst<N>),
    BreadthFirst(BreadthFirst<N>),
}

impl<N: Node> Traversal<N> {
    pub fn new(strategy: TraversalStrategy, start: N) -> Self {
        match strategy {
            TraversalStrategy::DepthFirst => Traversal::DepthFirst(DepthFirst::new(start)),
            TraversalStrategy::BreadthFirst => Traversal::BreadthFirst(BreadthFirst::new(start)),
        }
    }
}

impl<N: Node> Iterator for Traversal<N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        match self {
            Traversal::DepthFirst(iter) => iter.next(),
            Traversal::BreadthFirst(iter) => iter.next(),
        }
    }
}

/// Apply `visit` to every node reachable from `start`, breadth first.
pub fn traverse_breadth_first<N: Node>(start: N, visit: impl FnMut(N)) {
    BreadthFirst::new(start).for_each(visit);
}

/// Apply `visit` to every node reachable from `start`, depth first.
pub fn traverse_depth_first<N: Node>(start: N, visit: impl FnMut(N)) {
    DepthFirst::new(start).for_each(visit);
}

/// One full traversal per predicate, each filtered by its predicate, chained
/// in predicate order.
///
/// A node matching several predicates is yielded once per matching predicate.
pub fn per_predicate_iter<N, P, I>(
    strategy: TraversalStrategy,
    start: N,
    predicates: I,
) -> impl Iterator<Item = N>
where
    N: Node,
    P: FnMut(&N) -> bool,
    I: IntoIterator<Item = P>,
{
    predicates
        .into_iter()
        .flat_map(move |predicate| Traversal::new(strategy, start.clone()).filter(predicate))
}
