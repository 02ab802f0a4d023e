//! Divergence analysis for SIMT instruction streams.
//!
//! This module layers thread-divergence semantics over the generic graph
//! infrastructure in [`crate::graph`]. The instruction translator populates a
//! [`DivergenceAnalysis`] while scanning a kernel: inserting value nodes and
//! dependency edges, connecting hardware-read special registers to the values
//! that consume them, and marking values whose producing instructions are
//! inherently thread-varying. Downstream passes then query which values can
//! differ between lock-step threads and react with predication or branch
//! handling of their own.
//!
//! # Key Types
//!
//! - [`DivergenceAnalysis`] - The propagation layer: graph mutation with cache
//!   invalidation, special-source registry, origin set, lazy fixpoint, DOT export
//! - [`SpecialRegister`] / [`Axis`] - Taxonomy of SIMT hardware-read registers
//! - [`DivergenceModel`] - Configurable classification of sources into
//!   divergence seeds
//! - [`SimtModel`] - The standard classification for [`SpecialRegister`]
//! - [`DivergenceStats`] - Aggregate metrics snapshot
//!
//! # Examples
//!
//! ```rust
//! use warpscope::{Axis, DivergenceAnalysis, SpecialRegister};
//!
//! let mut analysis: DivergenceAnalysis<u32, SpecialRegister> = DivergenceAnalysis::new();
//! analysis.connect_source(SpecialRegister::ThreadId(Axis::X), 10, true).unwrap();
//! analysis.insert_node(10);
//! analysis.insert_edge(10, 11, true).unwrap();
//!
//! analysis.recompute();
//! assert_eq!(analysis.divergent_count(), 2);
//! ```

mod divergence;
mod model;
mod register;

pub use divergence::{DivergenceAnalysis, DivergenceStats};
pub use model::{DivergenceModel, SimtModel};
pub use register::{Axis, SpecialRegister};
