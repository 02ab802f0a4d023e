//! Divergence propagation over a value dependency graph.
//!
//! This module provides [`DivergenceAnalysis`], the layer the instruction
//! translator populates while scanning a kernel. It wraps a
//! [`DirectedGraph`] of value dependencies and adds the bookkeeping the graph
//! layer knows nothing about: which special sources feed which values, which
//! values are divergence origins in their own right, and the lazily
//! recomputed set of values that end up thread-varying.
//!
//! # Usage
//!
//! ```rust
//! use warpscope::{Axis, DivergenceAnalysis, SpecialRegister};
//!
//! let mut analysis: DivergenceAnalysis<u32, SpecialRegister> = DivergenceAnalysis::new();
//!
//! // The translator records hardware reads and dataflow as it scans
//! analysis.connect_source(SpecialRegister::ThreadId(Axis::X), 1, true).unwrap();
//! analysis.connect_source(SpecialRegister::BlockDim(Axis::X), 2, true).unwrap();
//! analysis.insert_node(1);
//! analysis.insert_node(2);
//! analysis.insert_edge(1, 3, true).unwrap();
//! analysis.insert_edge(2, 4, true).unwrap();
//!
//! analysis.recompute();
//! assert!(analysis.is_divergent(1) && analysis.is_divergent(3));
//! assert!(!analysis.is_divergent(2) && !analysis.is_divergent(4));
//! ```
//!
//! # Caching
//!
//! The divergent set is memoized behind a freshness flag. Every call that
//! actually changes the graph, the source registry, or the origin set clears
//! the flag; [`DivergenceAnalysis::recompute`] is a no-op while it is set.
//! Query methods read whatever the cache currently holds and never trigger a
//! recomputation themselves, so a translator batching hundreds of mutations pays
//! for exactly one fixpoint when it next asks for results.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fmt::Write;
use std::hash::Hash;

use crate::{
    analysis::{model::DivergenceModel, SimtModel},
    graph::{reachable_from, DirectedGraph},
    utils::escape_dot,
    Error, Result,
};

/// Divergence analysis over a value dependency graph.
///
/// Tracks three kinds of state on top of the wrapped [`DirectedGraph`]:
///
/// - a registry of *special sources* (hardware-read values external to the
///   graph), each owning the set of nodes that directly consume it,
/// - the set of *divergence origins*: nodes declared thread-varying
///   regardless of their predecessors,
/// - the cached *divergent set*: every node reachable forward from an origin
///   or from a consumer of a divergence-seeding source.
///
/// Consumer sets may name nodes that are not (or are no longer) in the graph.
/// Such dangling references are tolerated: propagation ignores them until the
/// node appears, at which point the next [`recompute`](Self::recompute) picks
/// it up as a seed.
///
/// # Type Parameters
///
/// * `N` - Node identifier type (e.g., a virtual register id)
/// * `S` - Special source handle type (e.g., [`SpecialRegister`])
/// * `M` - The [`DivergenceModel`] classifying which sources seed divergence;
///   defaults to [`SimtModel`]
///
/// [`SpecialRegister`]: crate::SpecialRegister
///
/// # Thread Safety
///
/// Not internally synchronized. The intended arrangement is one instance per
/// compilation unit, confined to the thread translating it.
#[derive(Debug, Clone)]
pub struct DivergenceAnalysis<N, S, M = SimtModel> {
    /// The wrapped dependency graph.
    graph: DirectedGraph<N>,
    /// Special source registry: handle -> nodes directly consuming its value.
    sources: HashMap<S, HashSet<N>>,
    /// Nodes declared divergent independent of their predecessors.
    origins: HashSet<N>,
    /// Last computed divergent set. Trustworthy only while `fresh` is set,
    /// except that erased nodes are always dropped immediately.
    divergent: HashSet<N>,
    /// Cleared by every effective mutation; restored only by `recompute`.
    fresh: bool,
    /// Classification rule for special sources.
    model: M,
}

impl<N, S, M> Default for DivergenceAnalysis<N, S, M>
where
    N: Copy + Eq + Hash,
    S: Copy + Eq + Hash,
    M: Default,
{
    fn default() -> Self {
        Self::with_model(M::default())
    }
}

impl<N, S, M> DivergenceAnalysis<N, S, M>
where
    N: Copy + Eq + Hash,
    S: Copy + Eq + Hash,
{
    /// Creates an empty analysis with a default-constructed model.
    #[must_use]
    pub fn new() -> Self
    where
        M: Default,
    {
        Self::with_model(M::default())
    }

    /// Creates an empty analysis using `model` as the classification rule.
    ///
    /// # Arguments
    ///
    /// * `model` - The rule deciding which special sources seed divergence
    #[must_use]
    pub fn with_model(model: M) -> Self {
        Self {
            graph: DirectedGraph::new(),
            sources: HashMap::new(),
            origins: HashSet::new(),
            divergent: HashSet::new(),
            fresh: true,
            model,
        }
    }

    // -------------------------------------------------------------------
    // Graph mutation (delegation + invalidation)
    // -------------------------------------------------------------------

    /// Adds a node to the dependency graph. Idempotent.
    ///
    /// Adding a node invalidates the cache even though the node starts
    /// unconnected: it may already be named as a consumer by a registered
    /// source, in which case the next recompute seeds it.
    ///
    /// # Returns
    ///
    /// `true` if the node was newly added.
    pub fn insert_node(&mut self, id: N) -> bool {
        let added = self.graph.insert_node(id);
        if added {
            self.fresh = false;
        }
        added
    }

    /// Adds a dependency edge from `from` to `to`.
    ///
    /// See [`DirectedGraph::insert_edge`] for the full contract.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownNode`](crate::Error::UnknownNode) if an endpoint
    /// is absent and `create_missing` is `false`; nothing is mutated and the
    /// cache stays valid in that case.
    pub fn insert_edge(&mut self, from: N, to: N, create_missing: bool) -> Result<bool> {
        let added = self.graph.insert_edge(from, to, create_missing)?;
        if added {
            self.fresh = false;
        }
        Ok(added)
    }

    /// Removes a node and every edge touching it.
    ///
    /// The node is also dropped from the divergent cache and the origin set
    /// immediately, so membership queries issued before the next
    /// [`recompute`](Self::recompute) never report an erased node. Consumer
    /// sets keep their (now dangling) references; see the type-level notes.
    ///
    /// # Returns
    ///
    /// `true` if the node existed and was removed.
    pub fn erase_node(&mut self, id: N) -> bool {
        if !self.graph.erase_node(id) {
            return false;
        }
        self.origins.remove(&id);
        self.divergent.remove(&id);
        self.fresh = false;
        true
    }

    /// Removes the edge from `from` to `to` if present.
    ///
    /// With `remove_isolated`, endpoints left without any edge are erased from
    /// the graph as well and, like [`erase_node`](Self::erase_node), dropped
    /// from the divergent cache and origin set immediately.
    ///
    /// # Returns
    ///
    /// `true` if the edge existed and was removed, `false` if it was absent.
    pub fn erase_edge(&mut self, from: N, to: N, remove_isolated: bool) -> bool {
        if !self.graph.erase_edge(from, to, false) {
            return false;
        }
        if remove_isolated {
            self.erase_if_isolated(from);
            if from != to {
                self.erase_if_isolated(to);
            }
        }
        self.fresh = false;
        true
    }

    /// Empties the graph, the source registry, the origin set, and the cache.
    ///
    /// The emptied cache is exact for the emptied graph, so the analysis is
    /// left fresh.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.sources.clear();
        self.origins.clear();
        self.divergent.clear();
        self.fresh = true;
    }

    fn erase_if_isolated(&mut self, id: N) {
        if self.graph.contains_node(id)
            && self.graph.out_degree(id) == 0
            && self.graph.in_degree(id) == 0
        {
            self.graph.erase_node(id);
            self.origins.remove(&id);
            self.divergent.remove(&id);
        }
    }

    // -------------------------------------------------------------------
    // Special source registry
    // -------------------------------------------------------------------

    /// Begins tracking `handle` with an empty consumer set. Idempotent.
    ///
    /// # Returns
    ///
    /// `true` if the source was newly registered.
    pub fn register_source(&mut self, handle: S) -> bool {
        if self.sources.contains_key(&handle) {
            return false;
        }
        self.sources.insert(handle, HashSet::new());
        self.fresh = false;
        true
    }

    /// Stops tracking `handle` and discards its consumer set.
    ///
    /// # Returns
    ///
    /// `true` if the source was registered.
    pub fn unregister_source(&mut self, handle: S) -> bool {
        if self.sources.remove(&handle).is_none() {
            return false;
        }
        self.fresh = false;
        true
    }

    /// Records that `node` directly consumes the value read from `handle`.
    ///
    /// `node` is not required to exist in the graph; the translator may record
    /// the consumption before (or after) the value participates in any
    /// dependency. Dangling consumers are ignored by propagation until the
    /// node appears.
    ///
    /// # Arguments
    ///
    /// * `handle` - The special source being read
    /// * `node` - The value receiving the read
    /// * `create_missing` - When `true`, an untracked `handle` is registered
    ///   first; when `false`, it fails the call
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if the pair was newly recorded
    /// * `Ok(false)` if `node` was already a consumer of `handle`
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSource`](crate::Error::UnknownSource) if
    /// `handle` is untracked and `create_missing` is `false`. No mutation is
    /// performed in that case.
    pub fn connect_source(&mut self, handle: S, node: N, create_missing: bool) -> Result<bool> {
        let Some(consumers) = self.sources.get_mut(&handle) else {
            if !create_missing {
                return Err(Error::UnknownSource);
            }
            self.sources.insert(handle, HashSet::from([node]));
            self.fresh = false;
            return Ok(true);
        };
        let added = consumers.insert(node);
        if added {
            self.fresh = false;
        }
        Ok(added)
    }

    /// Removes one (source, consumer) pair.
    ///
    /// # Returns
    ///
    /// `true` if `node` was a recorded consumer of `handle`.
    pub fn disconnect_source(&mut self, handle: S, node: N) -> bool {
        let removed = self
            .sources
            .get_mut(&handle)
            .map(|consumers| consumers.remove(&node))
            .unwrap_or_default();
        if removed {
            self.fresh = false;
        }
        removed
    }

    /// Returns `true` if `handle` is currently tracked.
    #[must_use]
    pub fn is_source_registered(&self, handle: S) -> bool {
        self.sources.contains_key(&handle)
    }

    /// Returns an iterator over all tracked source handles.
    pub fn sources(&self) -> impl Iterator<Item = S> + '_ {
        self.sources.keys().copied()
    }

    /// Returns an iterator over the recorded consumers of `handle`.
    ///
    /// Empty for untracked handles. May include nodes absent from the graph.
    pub fn consumers(&self, handle: S) -> impl Iterator<Item = N> + '_ {
        self.sources.get(&handle).into_iter().flatten().copied()
    }

    // -------------------------------------------------------------------
    // Divergence origins
    // -------------------------------------------------------------------

    /// Declares `node` a divergence origin: divergent regardless of its
    /// predecessors.
    ///
    /// No-op when `node` is not in the graph, so origins are always a subset of
    /// the node set.
    ///
    /// # Returns
    ///
    /// `true` if the node exists and was newly marked.
    pub fn mark_origin(&mut self, node: N) -> bool {
        if !self.graph.contains_node(node) {
            return false;
        }
        let marked = self.origins.insert(node);
        if marked {
            self.fresh = false;
        }
        marked
    }

    /// Withdraws an origin declaration.
    ///
    /// # Returns
    ///
    /// `true` if the node was an origin.
    pub fn unmark_origin(&mut self, node: N) -> bool {
        let removed = self.origins.remove(&node);
        if removed {
            self.fresh = false;
        }
        removed
    }

    /// Returns `true` if `node` is currently declared a divergence origin.
    #[must_use]
    pub fn is_origin(&self, node: N) -> bool {
        self.origins.contains(&node)
    }

    /// Returns the number of declared divergence origins.
    #[must_use]
    pub fn origin_count(&self) -> usize {
        self.origins.len()
    }
}

impl<N, S, M> DivergenceAnalysis<N, S, M>
where
    N: Copy + Eq + Hash,
    S: Copy + Eq + Hash,
    M: DivergenceModel<S>,
{
    // -------------------------------------------------------------------
    // Classification and fixpoint
    // -------------------------------------------------------------------

    /// Returns `true` if `handle` is classified as divergence-seeding.
    ///
    /// Pure in the handle's intrinsic kind: never consults graph structure or
    /// registration state, and an untracked handle classifies the same as a
    /// tracked one.
    #[must_use]
    pub fn seeds_divergence(&self, handle: S) -> bool {
        self.model.seeds_divergence(&handle)
    }

    /// Brings the divergent cache up to date.
    ///
    /// Returns immediately when nothing changed since the last computation.
    /// Otherwise rebuilds the cache from scratch: the seed set is every
    /// in-graph consumer of a divergence-seeding source plus every declared
    /// origin, and the cache becomes the forward transitive closure of that
    /// set. The pass visits each node at most once, so cyclic dependency
    /// chains terminate and the result is independent of processing order.
    pub fn recompute(&mut self) {
        if self.fresh {
            return;
        }

        let seeds: Vec<N> = self
            .sources
            .iter()
            .filter(|(handle, _)| self.model.seeds_divergence(handle))
            .flat_map(|(_, consumers)| consumers.iter().copied())
            .chain(self.origins.iter().copied())
            .collect();

        self.divergent = reachable_from(&self.graph, seeds);
        self.fresh = true;
    }

    // -------------------------------------------------------------------
    // Diagnostic export
    // -------------------------------------------------------------------

    /// Generates a DOT format representation of the analysis state.
    ///
    /// Special sources with at least one recorded consumer are drawn as
    /// ellipses, filled `lightcoral` when divergence-seeding and `lightblue`
    /// when not. Graph nodes are drawn as boxes, filled `lightyellow` when the
    /// cache currently holds them as divergent. Source-to-consumer edges are
    /// colored to match their source's classification; dependency edges are
    /// uncolored.
    ///
    /// This is a pure read of current state: it does not recompute and does
    /// not touch freshness. Callers wanting the tags to reflect the latest
    /// mutations must call [`recompute`](Self::recompute) first.
    ///
    /// # Arguments
    ///
    /// * `title` - Optional title for the graph
    ///
    /// # Returns
    ///
    /// A string containing the DOT representation, renderable with Graphviz.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use warpscope::{Axis, DivergenceAnalysis, SpecialRegister};
    ///
    /// let mut analysis: DivergenceAnalysis<u32, SpecialRegister> = DivergenceAnalysis::new();
    /// analysis.connect_source(SpecialRegister::ThreadId(Axis::X), 1, true).unwrap();
    /// analysis.insert_node(1);
    /// analysis.recompute();
    ///
    /// let dot = analysis.to_dot(Some("kernel_0"));
    /// assert!(dot.contains("digraph Divergence"));
    /// assert!(dot.contains("fillcolor=lightcoral"));
    /// ```
    #[must_use]
    pub fn to_dot(&self, title: Option<&str>) -> String
    where
        N: fmt::Display,
        S: fmt::Display,
    {
        let mut dot = String::new();

        dot.push_str("digraph Divergence {\n");
        if let Some(name) = title {
            let _ = writeln!(dot, "    label=\"{}\";", escape_dot(name));
        } else {
            dot.push_str("    label=\"Divergence Analysis\";\n");
        }
        dot.push_str("    labelloc=t;\n");
        dot.push_str("    node [shape=box, fontname=\"Courier\", fontsize=10];\n");
        dot.push_str("    edge [fontname=\"Courier\", fontsize=9];\n\n");

        // Special sources, tagged by classification
        for (handle, consumers) in &self.sources {
            if consumers.is_empty() {
                continue;
            }
            let fill = if self.model.seeds_divergence(handle) {
                "lightcoral"
            } else {
                "lightblue"
            };
            let _ = writeln!(
                dot,
                "    \"{}\" [shape=ellipse, style=filled, fillcolor={fill}];",
                escape_dot(&handle.to_string()),
            );
        }

        // Graph nodes, tagged by cached divergence
        for node in self.graph.nodes() {
            let style = if self.divergent.contains(&node) {
                ", style=filled, fillcolor=lightyellow"
            } else {
                ""
            };
            let _ = writeln!(
                dot,
                "    \"{}\" [label=\"{0}\"{style}];",
                escape_dot(&node.to_string()),
            );
        }

        dot.push('\n');

        // Source-to-consumer edges, colored by classification
        for (handle, consumers) in &self.sources {
            let color = if self.model.seeds_divergence(handle) {
                "red"
            } else {
                "blue"
            };
            for consumer in consumers {
                let _ = writeln!(
                    dot,
                    "    \"{}\" -> \"{}\" [color={color}];",
                    escape_dot(&handle.to_string()),
                    escape_dot(&consumer.to_string()),
                );
            }
        }

        // Dependency edges
        for node in self.graph.nodes() {
            for succ in self.graph.successors(node) {
                let _ = writeln!(
                    dot,
                    "    \"{}\" -> \"{}\";",
                    escape_dot(&node.to_string()),
                    escape_dot(&succ.to_string()),
                );
            }
        }

        dot.push_str("}\n");
        dot
    }

    /// Returns statistics about the analysis state.
    ///
    /// # Returns
    ///
    /// A [`DivergenceStats`] snapshot of node, edge, source, origin, and
    /// divergent counts plus cache freshness.
    #[must_use]
    pub fn stats(&self) -> DivergenceStats {
        DivergenceStats {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            source_count: self.sources.len(),
            consumer_count: self.sources.values().map(HashSet::len).sum(),
            origin_count: self.origins.len(),
            divergent_count: self.divergent.len(),
            fresh: self.fresh,
        }
    }
}

impl<N, S, M> DivergenceAnalysis<N, S, M>
where
    N: Copy + Eq + Hash,
    S: Copy + Eq + Hash,
{
    // -------------------------------------------------------------------
    // Queries (read the cache as-is; see module docs on staleness)
    // -------------------------------------------------------------------

    /// Returns `true` if the cache currently holds `node` as divergent.
    ///
    /// Reads the last computed result; call [`recompute`](Self::recompute)
    /// first when guaranteed freshness is required.
    #[must_use]
    pub fn is_divergent(&self, node: N) -> bool {
        self.divergent.contains(&node)
    }

    /// Returns an iterator over the cached divergent nodes.
    pub fn divergent_nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.divergent.iter().copied()
    }

    /// Returns the number of cached divergent nodes.
    #[must_use]
    pub fn divergent_count(&self) -> usize {
        self.divergent.len()
    }

    /// Returns `true` if no mutation occurred since the last
    /// [`recompute`](Self::recompute).
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    // -------------------------------------------------------------------
    // Graph views
    // -------------------------------------------------------------------

    /// Returns a read-only view of the wrapped dependency graph.
    #[must_use]
    pub fn graph(&self) -> &DirectedGraph<N> {
        &self.graph
    }

    /// Returns a reference to the configured classification model.
    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Returns `true` if `id` is a node of the dependency graph.
    #[must_use]
    pub fn contains_node(&self, id: N) -> bool {
        self.graph.contains_node(id)
    }

    /// Returns `true` if the dependency edge from `from` to `to` exists.
    #[must_use]
    pub fn contains_edge(&self, from: N, to: N) -> bool {
        self.graph.contains_edge(from, to)
    }

    /// Returns an iterator over the direct successors of `id`.
    pub fn successors(&self, id: N) -> impl Iterator<Item = N> + '_ {
        self.graph.successors(id)
    }

    /// Returns an iterator over the direct predecessors of `id`.
    pub fn predecessors(&self, id: N) -> impl Iterator<Item = N> + '_ {
        self.graph.predecessors(id)
    }

    /// Returns an iterator over all node identifiers.
    pub fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.graph.nodes()
    }

    /// Returns the number of nodes in the dependency graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges in the dependency graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Aggregate metrics for a [`DivergenceAnalysis`] instance.
///
/// Produced by [`DivergenceAnalysis::stats`]. `divergent_count` reflects the
/// cache as-is; it is meaningful for the current graph only when `fresh` is
/// `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DivergenceStats {
    /// Number of nodes in the dependency graph.
    pub node_count: usize,
    /// Number of dependency edges.
    pub edge_count: usize,
    /// Number of tracked special sources.
    pub source_count: usize,
    /// Total recorded (source, consumer) pairs, dangling ones included.
    pub consumer_count: usize,
    /// Number of declared divergence origins.
    pub origin_count: usize,
    /// Size of the cached divergent set.
    pub divergent_count: usize,
    /// Whether the cache reflects the current state.
    pub fresh: bool,
}
