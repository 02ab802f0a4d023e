//! Generic mutable directed graph keyed by caller-supplied identifiers.
//!
//! This module provides [`DirectedGraph`], the storage substrate for the divergence
//! analysis in [`crate::analysis`]. Nodes are opaque domain identifiers (a dynamic
//! translator uses virtual register ids); the graph attaches no state of its own to
//! them. Edges form an ordered-pair set: inserting the same pair twice is a no-op.

use std::collections::{HashMap, HashSet};

use crate::{Error, Result};

/// A generic mutable directed graph over caller-supplied node identifiers.
///
/// `DirectedGraph<N>` stores nodes keyed directly by a domain type `N` (which must be
/// `Copy + Eq + Hash`) and maintains both forward and reverse adjacency so that
/// successor and predecessor queries are O(1) set lookups. Edge multiplicity is not
/// tracked: edges between the same ordered pair collapse to one.
///
/// All operations are synchronous and total. Nothing blocks, and nothing panics for a
/// missing reference. Operations that can fail report their outcome through
/// [`Result`] or a `bool` status instead.
///
/// # Type Parameters
///
/// * `N` - The node identifier type (e.g., a virtual register id)
///
/// # Examples
///
/// ```rust
/// use warpscope::DirectedGraph;
///
/// let mut graph: DirectedGraph<u32> = DirectedGraph::new();
///
/// // Endpoints can be created on demand while building
/// graph.insert_edge(1, 2, true).unwrap();
/// graph.insert_edge(2, 3, true).unwrap();
///
/// assert_eq!(graph.node_count(), 3);
/// assert!(graph.contains_edge(1, 2));
/// assert_eq!(graph.successors(2).collect::<Vec<_>>(), vec![3]);
/// ```
///
/// # Thread Safety
///
/// `DirectedGraph<N>` is `Send` and `Sync` when `N` is, but it is not internally
/// synchronized, so concurrent mutation must be prevented by the caller.
#[derive(Debug, Clone)]
pub struct DirectedGraph<N> {
    /// Forward adjacency: node -> set of direct successors. Every node in the graph
    /// has an entry here, even when its successor set is empty.
    successors: HashMap<N, HashSet<N>>,
    /// Reverse adjacency: node -> set of direct predecessors. Mirrors `successors`.
    predecessors: HashMap<N, HashSet<N>>,
    /// Number of distinct edges currently stored.
    edges: usize,
}

impl<N> Default for DirectedGraph<N>
where
    N: Copy + Eq + std::hash::Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> DirectedGraph<N>
where
    N: Copy + Eq + std::hash::Hash,
{
    /// Creates a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            successors: HashMap::new(),
            predecessors: HashMap::new(),
            edges: 0,
        }
    }

    /// Creates a new empty graph with pre-allocated capacity for `nodes` nodes.
    #[must_use]
    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            successors: HashMap::with_capacity(nodes),
            predecessors: HashMap::with_capacity(nodes),
            edges: 0,
        }
    }

    /// Adds a node to the graph.
    ///
    /// This method is idempotent: inserting an identifier that is already present
    /// leaves the graph unchanged.
    ///
    /// # Arguments
    ///
    /// * `id` - The node identifier to add
    ///
    /// # Returns
    ///
    /// `true` if the node was newly added, `false` if it already existed.
    pub fn insert_node(&mut self, id: N) -> bool {
        if self.successors.contains_key(&id) {
            return false;
        }
        self.successors.insert(id, HashSet::new());
        self.predecessors.insert(id, HashSet::new());
        true
    }

    /// Adds a directed edge from `from` to `to`.
    ///
    /// Edges form a set: inserting a pair that is already present changes nothing.
    ///
    /// # Arguments
    ///
    /// * `from` - The source node
    /// * `to` - The destination node (its value depends on `from`)
    /// * `create_missing` - When `true`, absent endpoints are created; when `false`,
    ///   an absent endpoint fails the call
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if a new edge was added
    /// * `Ok(false)` if the edge already existed
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`] if either endpoint is absent and
    /// `create_missing` is `false`. No mutation is performed in that case.
    pub fn insert_edge(&mut self, from: N, to: N, create_missing: bool) -> Result<bool> {
        if !create_missing && (!self.contains_node(from) || !self.contains_node(to)) {
            return Err(Error::UnknownNode);
        }

        self.insert_node(from);
        self.insert_node(to);

        let added = self
            .successors
            .get_mut(&from)
            .map(|succs| succs.insert(to))
            .unwrap_or_default();
        if added {
            if let Some(preds) = self.predecessors.get_mut(&to) {
                preds.insert(from);
            }
            self.edges += 1;
        }
        Ok(added)
    }

    /// Removes a node and every edge touching it.
    ///
    /// # Arguments
    ///
    /// * `id` - The node identifier to remove
    ///
    /// # Returns
    ///
    /// `true` if the node existed and was removed, `false` otherwise.
    pub fn erase_node(&mut self, id: N) -> bool {
        let Some(succs) = self.successors.remove(&id) else {
            return false;
        };
        let preds = self.predecessors.remove(&id).unwrap_or_default();

        let mut removed = succs.len() + preds.len();
        // A self-loop appears in both sets but is a single edge.
        if succs.contains(&id) {
            removed -= 1;
        }

        for succ in succs {
            if let Some(entry) = self.predecessors.get_mut(&succ) {
                entry.remove(&id);
            }
        }
        for pred in preds {
            if let Some(entry) = self.successors.get_mut(&pred) {
                entry.remove(&id);
            }
        }

        self.edges -= removed;
        true
    }

    /// Removes the edge from `from` to `to` if it is present.
    ///
    /// With `remove_isolated`, an endpoint that is left with no remaining edges in
    /// either direction is also erased from the node set. This supports builders
    /// that retire values as their last dependency disappears.
    ///
    /// # Arguments
    ///
    /// * `from` - The source node of the edge
    /// * `to` - The destination node of the edge
    /// * `remove_isolated` - When `true`, endpoints left isolated by the removal are
    ///   erased as well
    ///
    /// # Returns
    ///
    /// `true` if the edge existed and was removed, `false` if it was absent (in
    /// which case nothing changes, including isolated-node cleanup).
    pub fn erase_edge(&mut self, from: N, to: N, remove_isolated: bool) -> bool {
        let removed = self
            .successors
            .get_mut(&from)
            .map(|succs| succs.remove(&to))
            .unwrap_or_default();
        if !removed {
            return false;
        }

        if let Some(preds) = self.predecessors.get_mut(&to) {
            preds.remove(&from);
        }
        self.edges -= 1;

        if remove_isolated {
            if self.is_isolated(from) {
                self.erase_node(from);
            }
            // A self-loop removal must not erase the same node twice.
            if from != to && self.is_isolated(to) {
                self.erase_node(to);
            }
        }
        true
    }

    /// Returns `true` if the node is in the graph.
    #[must_use]
    pub fn contains_node(&self, id: N) -> bool {
        self.successors.contains_key(&id)
    }

    /// Returns `true` if the edge from `from` to `to` is in the graph.
    #[must_use]
    pub fn contains_edge(&self, from: N, to: N) -> bool {
        self.successors
            .get(&from)
            .is_some_and(|succs| succs.contains(&to))
    }

    /// Returns an iterator over the direct successors of `id`.
    ///
    /// The set of nodes reachable by one outgoing edge. Empty when `id` has no
    /// outgoing edges or is not in the graph.
    pub fn successors(&self, id: N) -> impl Iterator<Item = N> + '_ {
        self.successors.get(&id).into_iter().flatten().copied()
    }

    /// Returns an iterator over the direct predecessors of `id`.
    ///
    /// Empty when `id` has no incoming edges or is not in the graph.
    pub fn predecessors(&self, id: N) -> impl Iterator<Item = N> + '_ {
        self.predecessors.get(&id).into_iter().flatten().copied()
    }

    /// Returns the number of outgoing edges of `id` (0 for unknown nodes).
    #[must_use]
    pub fn out_degree(&self, id: N) -> usize {
        self.successors.get(&id).map_or(0, HashSet::len)
    }

    /// Returns the number of incoming edges of `id` (0 for unknown nodes).
    #[must_use]
    pub fn in_degree(&self, id: N) -> usize {
        self.predecessors.get(&id).map_or(0, HashSet::len)
    }

    /// Returns an iterator over all node identifiers.
    ///
    /// The order is unspecified but stable for the duration of the call.
    pub fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.successors.keys().copied()
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.successors.len()
    }

    /// Returns the number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Returns `true` if the graph contains no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.successors.is_empty()
    }

    /// Removes all nodes and edges.
    pub fn clear(&mut self) {
        self.successors.clear();
        self.predecessors.clear();
        self.edges = 0;
    }

    /// Returns `true` if the node exists and has no edges in either direction.
    fn is_isolated(&self, id: N) -> bool {
        self.out_degree(id) == 0 && self.in_degree(id) == 0 && self.contains_node(id)
    }
}
