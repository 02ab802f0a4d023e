use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure this crate reports is a recoverable unknown-reference condition: an
/// operation named a node or special source that does not exist, and the operation was
/// not asked to create it. No operation panics for a missing reference, and no mutating
/// operation applies partially: on error the graph and all analysis bookkeeping are
/// left untouched.
///
/// # Error Categories
///
/// ## Graph Errors
/// - [`Error::UnknownNode`] - An edge operation referenced a node that is not in the graph
///
/// ## Analysis Errors
/// - [`Error::UnknownSource`] - An operation referenced an unregistered special source
///
/// # Examples
///
/// ```rust
/// use warpscope::{DirectedGraph, Error};
///
/// let mut graph: DirectedGraph<u32> = DirectedGraph::new();
/// graph.insert_node(1);
///
/// // Endpoint 2 does not exist and creation was not requested
/// match graph.insert_edge(1, 2, false) {
///     Err(Error::UnknownNode) => {}
///     other => panic!("expected UnknownNode, got {:?}", other),
/// }
///
/// // The failed call performed no mutation
/// assert_eq!(graph.edge_count(), 0);
/// ```
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An edge operation referenced a node that is not in the graph.
    ///
    /// Returned by [`DirectedGraph::insert_edge`](crate::DirectedGraph::insert_edge)
    /// (and the delegating analysis wrapper) when an endpoint is absent and
    /// `create_missing` is `false`. The operation performs no mutation.
    #[error("Unknown node referenced by edge operation")]
    UnknownNode,

    /// An operation referenced a special source that has not been registered.
    ///
    /// Returned by
    /// [`DivergenceAnalysis::connect_source`](crate::DivergenceAnalysis::connect_source)
    /// when the handle is untracked and `create_missing` is `false`. The operation
    /// performs no mutation.
    #[error("Unknown special source handle")]
    UnknownSource,
}
