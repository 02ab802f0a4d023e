//! Integration tests for end-to-end divergence analysis scenarios.
//!
//! These tests exercise the analysis the way the instruction translator does:
//! build a dependency graph incrementally while connecting special registers and
//! marking origins, then recompute and query. Each test pins one contract-level
//! property of the propagation.

use warpscope::prelude::*;

const TID_X: SpecialRegister = SpecialRegister::ThreadId(Axis::X);
const TID_Y: SpecialRegister = SpecialRegister::ThreadId(Axis::Y);
const NTID_X: SpecialRegister = SpecialRegister::BlockDim(Axis::X);
const CTAID_X: SpecialRegister = SpecialRegister::BlockId(Axis::X);

/// Builds the analysis for a small kernel prologue:
///
/// ```text
/// %tid.x   -> r1 -> r3 -> r4
/// %ntid.x  -> r2 ----^
/// %ctaid.x -> r5 -> r6
/// ```
///
/// r3 mixes a divergent and a uniform input, so r3 and r4 are divergent while
/// the block-level chain r5/r6 stays uniform.
fn thread_index_kernel() -> Result<DivergenceAnalysis<u32, SpecialRegister>> {
    let mut analysis = DivergenceAnalysis::new();

    analysis.connect_source(TID_X, 1, true)?;
    analysis.connect_source(NTID_X, 2, true)?;
    analysis.connect_source(CTAID_X, 5, true)?;
    for node in [1, 2, 5] {
        analysis.insert_node(node);
    }

    analysis.insert_edge(1, 3, true)?;
    analysis.insert_edge(2, 3, true)?;
    analysis.insert_edge(3, 4, true)?;
    analysis.insert_edge(5, 6, true)?;

    Ok(analysis)
}

fn sorted_divergent(analysis: &DivergenceAnalysis<u32, SpecialRegister>) -> Vec<u32> {
    let mut nodes: Vec<u32> = analysis.divergent_nodes().collect();
    nodes.sort_unstable();
    nodes
}

/// Closure: the divergent set equals exactly the forward closure of the origin
/// set, restricted to nodes in the graph.
#[test]
fn test_closure_over_mixed_sources() -> Result<()> {
    let mut analysis = thread_index_kernel()?;
    analysis.recompute();

    assert_eq!(sorted_divergent(&analysis), vec![1, 3, 4]);
    assert!(!analysis.is_divergent(2));
    assert!(!analysis.is_divergent(5));
    assert!(!analysis.is_divergent(6));
    Ok(())
}

/// The worked tid/ntid example: connect tid->A and ntid->B, add A->C and B->D,
/// then promote D to an explicit origin.
#[test]
fn test_explicit_origin_joins_seeded_divergence() -> Result<()> {
    let (a, b, c, d) = (10, 20, 30, 40);
    let mut analysis: DivergenceAnalysis<u32, SpecialRegister> = DivergenceAnalysis::new();

    analysis.connect_source(TID_X, a, true)?;
    analysis.connect_source(NTID_X, b, true)?;
    analysis.insert_node(a);
    analysis.insert_node(b);
    analysis.insert_edge(a, c, true)?;
    analysis.insert_edge(b, d, true)?;

    analysis.recompute();
    assert_eq!(sorted_divergent(&analysis), vec![a, c]);
    assert!(!analysis.is_divergent(b));
    assert!(!analysis.is_divergent(d));

    // An instruction producing d turns out inherently thread-varying
    assert!(analysis.mark_origin(d));
    analysis.recompute();
    assert_eq!(sorted_divergent(&analysis), vec![a, c, d]);
    assert!(!analysis.is_divergent(b));
    Ok(())
}

/// Monotonicity: pure additions (an edge, an origin) never shrink the
/// divergent set.
#[test]
fn test_monotonic_under_addition() -> Result<()> {
    let mut analysis = thread_index_kernel()?;
    analysis.recompute();
    let before = sorted_divergent(&analysis);

    analysis.insert_edge(4, 7, true)?;
    analysis.recompute();
    let with_edge = sorted_divergent(&analysis);
    assert!(before.iter().all(|node| with_edge.contains(node)));
    assert!(with_edge.contains(&7));

    analysis.mark_origin(6);
    analysis.recompute();
    let with_origin = sorted_divergent(&analysis);
    assert!(with_edge.iter().all(|node| with_origin.contains(node)));
    assert!(with_origin.contains(&6));
    Ok(())
}

/// Cycle termination: a loop-carried dependency reachable from a divergent
/// seed converges with every cycle member divergent.
#[test]
fn test_loop_carried_dependency() -> Result<()> {
    let mut analysis: DivergenceAnalysis<u32, SpecialRegister> = DivergenceAnalysis::new();

    analysis.connect_source(TID_X, 1, true)?;
    analysis.insert_node(1);

    // An induction chain feeding back on itself
    analysis.insert_edge(1, 2, true)?;
    analysis.insert_edge(2, 3, true)?;
    analysis.insert_edge(3, 2, true)?;
    analysis.insert_edge(3, 4, true)?;

    analysis.recompute();
    assert_eq!(sorted_divergent(&analysis), vec![1, 2, 3, 4]);
    Ok(())
}

/// Idempotent recompute: back-to-back recomputes with no mutation agree.
#[test]
fn test_recompute_idempotent() -> Result<()> {
    let mut analysis = thread_index_kernel()?;
    analysis.recompute();
    let first = sorted_divergent(&analysis);
    analysis.recompute();
    assert_eq!(first, sorted_divergent(&analysis));
    Ok(())
}

/// Deletion consistency: an erased node disappears from the divergent set
/// immediately, before any recompute.
#[test]
fn test_erase_updates_stale_reads() -> Result<()> {
    let mut analysis = thread_index_kernel()?;
    analysis.recompute();
    assert!(analysis.is_divergent(4));

    analysis.erase_node(4);
    assert!(!analysis.is_divergent(4));
    assert_eq!(sorted_divergent(&analysis), vec![1, 3]);

    analysis.recompute();
    assert_eq!(sorted_divergent(&analysis), vec![1, 3]);
    Ok(())
}

/// Classification purity: the same register kind classifies identically across
/// structurally different analyses.
#[test]
fn test_classification_is_structure_independent() -> Result<()> {
    let empty: DivergenceAnalysis<u32, SpecialRegister> = DivergenceAnalysis::new();
    let populated = thread_index_kernel()?;

    for register in [TID_X, TID_Y, NTID_X, CTAID_X, SpecialRegister::LaneId] {
        assert_eq!(
            empty.seeds_divergence(register),
            populated.seeds_divergence(register),
        );
    }
    assert!(empty.seeds_divergence(TID_X));
    assert!(!empty.seeds_divergence(NTID_X));
    Ok(())
}

/// Rebuilding after clear reuses the instance without leftover state.
#[test]
fn test_clear_then_rebuild() -> Result<()> {
    let mut analysis = thread_index_kernel()?;
    analysis.recompute();
    assert_eq!(analysis.divergent_count(), 3);

    analysis.clear();
    assert_eq!(analysis.node_count(), 0);
    assert_eq!(analysis.divergent_count(), 0);

    // A uniform-only kernel on the same instance
    analysis.connect_source(NTID_X, 1, true)?;
    analysis.insert_node(1);
    analysis.insert_edge(1, 2, true)?;
    analysis.recompute();
    assert_eq!(analysis.divergent_count(), 0);
    Ok(())
}

/// A translator retiring values: erase_edge with isolated-node cleanup keeps
/// the analysis consistent with the shrinking graph.
#[test]
fn test_retiring_values_with_isolated_cleanup() -> Result<()> {
    let mut analysis: DivergenceAnalysis<u32, SpecialRegister> = DivergenceAnalysis::new();
    analysis.connect_source(TID_X, 1, true)?;
    analysis.insert_node(1);
    analysis.insert_edge(1, 2, true)?;
    analysis.insert_edge(2, 3, true)?;
    analysis.recompute();
    assert_eq!(analysis.divergent_count(), 3);

    // Retire the tail; node 3 becomes isolated and is erased with the edge
    assert!(analysis.erase_edge(2, 3, true));
    assert!(!analysis.graph().contains_node(3));
    assert!(!analysis.is_divergent(3));

    analysis.recompute();
    assert_eq!(sorted_divergent(&analysis), vec![1, 2]);
    Ok(())
}

/// Consumer sets survive graph churn: a consumer recorded before its node
/// exists (or after it is erased) is dormant, not lost.
#[test]
fn test_dormant_consumers_across_churn() -> Result<()> {
    let mut analysis: DivergenceAnalysis<u32, SpecialRegister> = DivergenceAnalysis::new();
    analysis.connect_source(TID_X, 1, true)?;
    analysis.insert_node(1);
    analysis.recompute();
    assert!(analysis.is_divergent(1));

    // Erasing the node leaves the consumer record dangling and inert
    analysis.erase_node(1);
    analysis.recompute();
    assert_eq!(analysis.divergent_count(), 0);
    assert_eq!(analysis.consumers(TID_X).collect::<Vec<_>>(), vec![1]);

    // Re-creating the value re-arms it
    analysis.insert_node(1);
    analysis.recompute();
    assert!(analysis.is_divergent(1));
    Ok(())
}

/// The DOT export tags sources by classification and nodes by cached
/// divergence, and includes both edge families.
#[test]
fn test_dot_export_tags() -> Result<()> {
    let mut analysis = thread_index_kernel()?;
    analysis.recompute();

    let dot = analysis.to_dot(Some("prologue"));
    assert!(dot.contains("digraph Divergence {"));
    assert!(dot.contains("label=\"prologue\";"));

    // Seeding vs non-seeding sources
    assert!(dot.contains("\"%tid.x\" [shape=ellipse, style=filled, fillcolor=lightcoral];"));
    assert!(dot.contains("\"%ntid.x\" [shape=ellipse, style=filled, fillcolor=lightblue];"));
    assert!(dot.contains("\"%ctaid.x\" [shape=ellipse, style=filled, fillcolor=lightblue];"));

    // Divergent vs uniform values
    assert!(dot.contains("\"3\" [label=\"3\", style=filled, fillcolor=lightyellow];"));
    assert!(dot.contains("\"6\" [label=\"6\"];"));

    // Source edges colored, dependency edges plain
    assert!(dot.contains("\"%tid.x\" -> \"1\" [color=red];"));
    assert!(dot.contains("\"%ntid.x\" -> \"2\" [color=blue];"));
    assert!(dot.contains("\"3\" -> \"4\";"));
    Ok(())
}

/// Stats stay coherent through a mutate/recompute cycle.
#[test]
fn test_stats_lifecycle() -> Result<()> {
    let mut analysis = thread_index_kernel()?;

    let stats = analysis.stats();
    assert_eq!(stats.node_count, 6);
    assert_eq!(stats.edge_count, 4);
    assert_eq!(stats.source_count, 3);
    assert_eq!(stats.consumer_count, 3);
    assert!(!stats.fresh);

    analysis.recompute();
    let stats = analysis.stats();
    assert!(stats.fresh);
    assert_eq!(stats.divergent_count, 3);
    Ok(())
}

/// A target with its own register taxonomy plugs in through a closure model.
#[test]
fn test_alternate_taxonomy_via_closure() -> Result<()> {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum WaveRegister {
        LaneIndex,
        WaveSize,
    }

    let mut analysis: DivergenceAnalysis<u32, WaveRegister, _> =
        DivergenceAnalysis::with_model(|source: &WaveRegister| {
            matches!(source, WaveRegister::LaneIndex)
        });

    analysis.connect_source(WaveRegister::LaneIndex, 1, true)?;
    analysis.connect_source(WaveRegister::WaveSize, 2, true)?;
    analysis.insert_node(1);
    analysis.insert_node(2);

    analysis.recompute();
    assert!(analysis.is_divergent(1));
    assert!(!analysis.is_divergent(2));
    Ok(())
}
