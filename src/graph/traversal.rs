//! Forward-reachability traversal over [`DirectedGraph`].
//!
//! The divergence fixpoint in [`crate::analysis`] is a transitive forward closure
//! over a seed set. The closure lives here so graph-level code owns the traversal
//! mechanics and the analysis layer owns only the seeding rule.

use std::collections::HashSet;

use crate::graph::DirectedGraph;

/// Computes the set of nodes reachable from `seeds` by following edges forward.
///
/// The result contains every seed that is present in the graph, plus every node
/// reachable from one of them through one or more edges. Seeds that are not in the
/// graph are ignored rather than reported, since callers hold dangling references by
/// design (see [`crate::DivergenceAnalysis::connect_source`]).
///
/// The traversal is iterative with an explicit worklist and a visited check, so it
/// terminates on cyclic graphs and never recurses. Processing order is unspecified;
/// the result depends only on membership.
///
/// # Arguments
///
/// * `graph` - The graph to traverse
/// * `seeds` - Starting nodes for the closure
///
/// # Returns
///
/// The forward transitive closure of `seeds` restricted to nodes in the graph.
///
/// # Examples
///
/// ```rust
/// use warpscope::{graph::reachable_from, DirectedGraph};
///
/// let mut graph: DirectedGraph<u32> = DirectedGraph::new();
/// graph.insert_edge(1, 2, true).unwrap();
/// graph.insert_edge(2, 3, true).unwrap();
/// graph.insert_edge(4, 5, true).unwrap();
///
/// let reached = reachable_from(&graph, [1]);
/// assert!(reached.contains(&1) && reached.contains(&2) && reached.contains(&3));
/// assert!(!reached.contains(&4));
/// ```
#[must_use]
pub fn reachable_from<N, I>(graph: &DirectedGraph<N>, seeds: I) -> HashSet<N>
where
    N: Copy + Eq + std::hash::Hash,
    I: IntoIterator<Item = N>,
{
    let mut visited: HashSet<N> = HashSet::new();
    let mut frontier: Vec<N> = seeds
        .into_iter()
        .filter(|&seed| graph.contains_node(seed))
        .collect();

    while let Some(node) = frontier.pop() {
        if !visited.insert(node) {
            continue;
        }
        for succ in graph.successors(node) {
            if !visited.contains(&succ) {
                frontier.push(succ);
            }
        }
    }

    visited
}
