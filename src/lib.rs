// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # warpscope
//!
//! [![Crates.io](https://img.shields.io/crates/v/warpscope.svg)](https://crates.io/crates/warpscope)
//! [![Documentation](https://docs.rs/warpscope/badge.svg)](https://docs.rs/warpscope)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://github.com/BinFlip/warpscope/blob/main/LICENSE-APACHE)
//!
//! A static divergence-analysis core for SIMT dynamic compilers and emulators. Built in pure
//! Rust, `warpscope` determines which program values can differ between threads executing the
//! same instruction stream in lock-step, driving downstream decisions such as branch handling,
//! predication, and warp scheduling.
//!
//! ## Features
//!
//! - **🕸️ Generic graph substrate** - Mutable digraph keyed directly by caller-supplied value ids
//! - **🧵 Divergence propagation** - Lazy, dirty-flag-guarded fixpoint over dependency edges
//! - **🎛️ Configurable classification** - Which hardware registers seed divergence is data, not code
//! - **🛡️ Recoverable failures** - Unknown references report through `Result`, never abort
//! - **📊 Diagnostic export** - Graphviz DOT output tagging sources, values, and edges
//!
//! ## Quick Start
//!
//! Add `warpscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! warpscope = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! ```rust
//! use warpscope::prelude::*;
//!
//! let mut analysis: DivergenceAnalysis<u32, SpecialRegister> = DivergenceAnalysis::new();
//!
//! // %tid.x lands in value 1, %ntid.x in value 2
//! analysis.connect_source(SpecialRegister::ThreadId(Axis::X), 1, true)?;
//! analysis.connect_source(SpecialRegister::BlockDim(Axis::X), 2, true)?;
//! analysis.insert_node(1);
//! analysis.insert_node(2);
//!
//! // Value 3 depends on 1, value 4 on 2
//! analysis.insert_edge(1, 3, true)?;
//! analysis.insert_edge(2, 4, true)?;
//!
//! analysis.recompute();
//! assert!(analysis.is_divergent(3));
//! assert!(!analysis.is_divergent(4));
//! # Ok::<(), warpscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `warpscope` is organized into two layers, dependency order leaves-first:
//!
//! - [`graph`] - A generic mutable [`DirectedGraph`] plus forward-reachability
//!   traversal. No divergence semantics live here.
//! - [`analysis`] - [`DivergenceAnalysis`], which wraps a [`DirectedGraph`] and adds
//!   the special-source registry, the explicit origin set, the classification
//!   [`DivergenceModel`], the cached divergent set, and the DOT exporter.
//!
//! The translator building the graph owns when to pay for recomputation: every
//! mutation merely clears a freshness flag, and the next [`DivergenceAnalysis::recompute`]
//! performs a single fixpoint pass over the accumulated state. Queries never
//! recompute on their own, a deliberate contract for read-heavy passes that can
//! tolerate staleness between batches of mutations.
//!
//! ## Classification
//!
//! Which special registers make lock-step threads observe different values is a
//! property of the target, so it is supplied as configuration: any
//! [`DivergenceModel`] implementation (or plain closure) over the handle type.
//! [`SimtModel`] ships the standard rule for the [`SpecialRegister`] taxonomy:
//! per-thread and per-lane identities seed divergence, block/grid shape values
//! do not.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result) where failure is possible.
//! Every error is a recoverable unknown-reference condition; there are no fatal
//! paths, no I/O, and no partially-applied mutations:
//!
//! ```rust
//! use warpscope::{DirectedGraph, Error};
//!
//! let mut graph: DirectedGraph<u32> = DirectedGraph::new();
//! match graph.insert_edge(1, 2, false) {
//!     Err(Error::UnknownNode) => {} // endpoints were never created
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```
//!
//! ## Concurrency
//!
//! The analysis is single-threaded and not internally synchronized: one instance
//! per compilation unit, confined to its owning thread. All state is in-memory
//! and exclusively owned; no operation blocks or acquires external resources.

mod error;

/// Shared utilities: DOT-format escaping used by the diagnostic exporters.
pub mod utils;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use warpscope::prelude::*;
///
/// let mut analysis: DivergenceAnalysis<u32, SpecialRegister> = DivergenceAnalysis::new();
/// analysis.insert_node(1);
/// assert_eq!(analysis.node_count(), 1);
/// ```
pub mod prelude;

/// Generic directed-graph infrastructure.
///
/// Provides [`DirectedGraph`], a mutable digraph keyed by opaque caller-supplied
/// node identifiers, and [`graph::reachable_from`], the forward transitive
/// closure used by the divergence fixpoint. This layer carries no divergence
/// semantics and is reusable for other dependency analyses.
pub mod graph;

/// Divergence analysis for SIMT instruction streams.
///
/// Provides [`DivergenceAnalysis`] (special-source registry, divergence
/// origins, lazy fixpoint propagation, DOT export) plus the
/// [`SpecialRegister`] taxonomy and the [`DivergenceModel`] classification
/// seam.
pub mod analysis;

/// `warpscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `warpscope` Error type
///
/// The main error type for all operations in this crate. Every variant is a
/// recoverable unknown-reference condition; see [`Error`] for the full taxonomy.
pub use error::Error;

/// The divergence propagation layer.
///
/// See [`analysis::DivergenceAnalysis`] for construction, mutation, and query APIs.
pub use analysis::DivergenceAnalysis;

/// Supporting analysis types: register taxonomy, classification models, stats.
pub use analysis::{Axis, DivergenceModel, DivergenceStats, SimtModel, SpecialRegister};

/// The generic graph substrate under the analysis.
///
/// See [`graph::DirectedGraph`] for the full mutation and query contract.
pub use graph::DirectedGraph;
