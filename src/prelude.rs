//! # warpscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the warpscope library. Import this module to get quick access to the essential
//! types for divergence analysis.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all warpscope operations
pub use crate::Error;

/// The result type used throughout warpscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// The divergence propagation layer the translator populates
pub use crate::analysis::DivergenceAnalysis;

/// The generic dependency-graph substrate
pub use crate::graph::DirectedGraph;

// ================================================================================================
// Analysis Support Types
// ================================================================================================

/// Classification seam deciding which special sources seed divergence
pub use crate::analysis::DivergenceModel;

/// Standard classification for the SIMT special-register taxonomy
pub use crate::analysis::SimtModel;

/// Hardware-read special register handles
pub use crate::analysis::{Axis, SpecialRegister};

/// Aggregate metrics snapshot
pub use crate::analysis::DivergenceStats;

// ================================================================================================
// Graph Algorithms
// ================================================================================================

/// Forward transitive closure over a seed set
pub use crate::graph::reachable_from;
