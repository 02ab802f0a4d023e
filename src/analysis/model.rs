//! Classification of special sources into divergence seeds.
//!
//! Which hardware-read sources make lock-step threads observe different values is a
//! property of the target's register taxonomy, not of any particular dependency
//! graph. The rule is therefore supplied to [`DivergenceAnalysis`] as configuration:
//! a [`DivergenceModel`] implementation chosen when the analysis is constructed.
//! [`SimtModel`] is the shipped rule for the [`SpecialRegister`] taxonomy; targets
//! with a different special-register set implement the trait (or pass a closure)
//! over their own handle type.
//!
//! [`DivergenceAnalysis`]: crate::DivergenceAnalysis

use crate::analysis::register::SpecialRegister;

/// The classification rule deciding which special sources seed divergence.
///
/// Implementations must be pure in the handle's intrinsic kind: the verdict for a
/// given handle never depends on graph structure, registration order, or any other
/// analysis state. The analysis relies on this to reuse the verdict across
/// recomputations without invalidation.
///
/// Closures of type `Fn(&S) -> bool` implement this trait, so a one-off target
/// taxonomy does not need a named model type:
///
/// ```rust
/// use warpscope::DivergenceAnalysis;
///
/// // A toy target where only source 0 is per-thread varying
/// let mut analysis: DivergenceAnalysis<u32, u8, _> =
///     DivergenceAnalysis::with_model(|source: &u8| *source == 0);
///
/// analysis.register_source(0);
/// assert!(analysis.seeds_divergence(0));
/// ```
pub trait DivergenceModel<S> {
    /// Returns `true` if values read from `source` can differ between threads
    /// executing the same instruction in lock-step.
    fn seeds_divergence(&self, source: &S) -> bool;
}

impl<S, F> DivergenceModel<S> for F
where
    F: Fn(&S) -> bool,
{
    fn seeds_divergence(&self, source: &S) -> bool {
        self(source)
    }
}

/// The standard classification for the [`SpecialRegister`] taxonomy.
///
/// Per-thread and per-lane identity registers seed divergence; warp identities,
/// block/grid shape registers, and machine constants do not, because every thread
/// of a warp reads the same value from them.
///
/// # Examples
///
/// ```rust
/// use warpscope::{Axis, DivergenceModel, SimtModel, SpecialRegister};
///
/// let model = SimtModel;
/// assert!(model.seeds_divergence(&SpecialRegister::ThreadId(Axis::X)));
/// assert!(model.seeds_divergence(&SpecialRegister::LaneId));
/// assert!(!model.seeds_divergence(&SpecialRegister::BlockDim(Axis::X)));
/// assert!(!model.seeds_divergence(&SpecialRegister::BlockId(Axis::Z)));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimtModel;

impl DivergenceModel<SpecialRegister> for SimtModel {
    fn seeds_divergence(&self, source: &SpecialRegister) -> bool {
        source.is_thread_varying()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::register::Axis;
    use strum::IntoEnumIterator;

    #[test]
    fn test_simt_model_matches_register_split() {
        let model = SimtModel;
        for register in SpecialRegister::iter() {
            assert_eq!(
                model.seeds_divergence(&register),
                register.is_thread_varying()
            );
        }
    }

    #[test]
    fn test_closure_model() {
        let model = |source: &char| *source == 't';
        assert!(model.seeds_divergence(&'t'));
        assert!(!model.seeds_divergence(&'n'));
    }

    #[test]
    fn test_verdict_is_kind_only() {
        // Same kind, same verdict, independent of everything else
        let model = SimtModel;
        let a = SpecialRegister::ThreadId(Axis::X);
        let b = SpecialRegister::ThreadId(Axis::X);
        assert_eq!(model.seeds_divergence(&a), model.seeds_divergence(&b));
    }
}
