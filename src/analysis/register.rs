//! Special-register taxonomy for SIMT instruction sets.
//!
//! Hardware-read registers are the values a SIMT thread obtains from the machine
//! rather than from ordinary dataflow: its own position inside the thread block,
//! the lane it occupies inside its warp, the shape of the block and grid it was
//! launched with. The divergence analysis only cares which of these can differ
//! between threads that execute in lock-step, but the translator needs stable
//! handles for all of them, and this module provides that enumeration.

use std::fmt;

use strum::{EnumCount, EnumIter};

/// A component axis of a three-dimensional launch quantity.
///
/// Thread ids, block dimensions, block ids, and grid dimensions are all
/// three-component vectors; instructions read one component at a time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumCount, EnumIter)]
pub enum Axis {
    /// The x component.
    #[default]
    X,
    /// The y component.
    Y,
    /// The z component.
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// Identifiers for the hardware-read special registers of a SIMT instruction set.
///
/// Each variant is a stable handle for one machine-provided value. Variants carry
/// an [`Axis`] where the underlying quantity is a vector.
///
/// ## Register Categories
///
/// ### Per-Thread Identity
/// - **`ThreadId`**: Position of the thread within its block (`%tid`)
/// - **`LaneId`**: Position of the thread within its warp (`%laneid`)
///
/// ### Per-Warp Identity
/// - **`WarpId`**: Warp index within the block (`%warpid`)
/// - **`WarpCount`**: Number of warps in the block (`%nwarpid`)
///
/// ### Block and Grid Shape
/// - **`BlockDim`**: Threads per block along an axis (`%ntid`)
/// - **`BlockId`**: Position of the block within the grid (`%ctaid`)
/// - **`GridDim`**: Blocks per grid along an axis (`%nctaid`)
/// - **`GridId`**: Temporal grid launch index (`%gridid`)
///
/// ### Machine Constants
/// - **`WarpSize`**: Threads per warp (`WARP_SZ`)
/// - **`ProcessorId`**: Multiprocessor executing the block (`%smid`)
/// - **`ProcessorCount`**: Multiprocessors on the device (`%nsmid`)
///
/// # Examples
///
/// ```rust
/// use strum::IntoEnumIterator;
/// use warpscope::{Axis, SpecialRegister};
///
/// let tid_x = SpecialRegister::ThreadId(Axis::X);
/// assert_eq!(tid_x.to_string(), "%tid.x");
///
/// // Axes are enumerable for translators that expand vector reads
/// assert_eq!(Axis::iter().count(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumCount, EnumIter)]
pub enum SpecialRegister {
    /// Thread position within its block along one axis (`%tid`).
    ThreadId(Axis),
    /// Thread position within its warp (`%laneid`).
    LaneId,
    /// Warp index within the block (`%warpid`).
    WarpId,
    /// Number of warps in the block (`%nwarpid`).
    WarpCount,
    /// Threads per block along one axis (`%ntid`).
    BlockDim(Axis),
    /// Block position within the grid along one axis (`%ctaid`).
    BlockId(Axis),
    /// Blocks per grid along one axis (`%nctaid`).
    GridDim(Axis),
    /// Temporal grid launch index (`%gridid`).
    GridId,
    /// Threads per warp (`WARP_SZ`).
    WarpSize,
    /// Multiprocessor executing the block (`%smid`).
    ProcessorId,
    /// Multiprocessors on the device (`%nsmid`).
    ProcessorCount,
}

impl SpecialRegister {
    /// Returns `true` for registers whose value is private to a single thread or
    /// lane, the identities that make lock-step threads observe different data.
    ///
    /// Warp-level and block-level identities are shared by every thread of the
    /// warp executing an instruction, so they do not vary within the lock-step
    /// unit and report `false`, as do all shape and machine constants.
    #[must_use]
    pub fn is_thread_varying(self) -> bool {
        matches!(
            self,
            SpecialRegister::ThreadId(_) | SpecialRegister::LaneId
        )
    }
}

impl fmt::Display for SpecialRegister {
    /// Formats the register with its conventional assembly spelling.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecialRegister::ThreadId(axis) => write!(f, "%tid.{axis}"),
            SpecialRegister::LaneId => write!(f, "%laneid"),
            SpecialRegister::WarpId => write!(f, "%warpid"),
            SpecialRegister::WarpCount => write!(f, "%nwarpid"),
            SpecialRegister::BlockDim(axis) => write!(f, "%ntid.{axis}"),
            SpecialRegister::BlockId(axis) => write!(f, "%ctaid.{axis}"),
            SpecialRegister::GridDim(axis) => write!(f, "%nctaid.{axis}"),
            SpecialRegister::GridId => write!(f, "%gridid"),
            SpecialRegister::WarpSize => write!(f, "WARP_SZ"),
            SpecialRegister::ProcessorId => write!(f, "%smid"),
            SpecialRegister::ProcessorCount => write!(f, "%nsmid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_display_spelling() {
        assert_eq!(SpecialRegister::ThreadId(Axis::Y).to_string(), "%tid.y");
        assert_eq!(SpecialRegister::BlockDim(Axis::X).to_string(), "%ntid.x");
        assert_eq!(SpecialRegister::LaneId.to_string(), "%laneid");
        assert_eq!(SpecialRegister::WarpSize.to_string(), "WARP_SZ");
    }

    #[test]
    fn test_thread_varying_split() {
        for axis in Axis::iter() {
            assert!(SpecialRegister::ThreadId(axis).is_thread_varying());
            assert!(!SpecialRegister::BlockDim(axis).is_thread_varying());
            assert!(!SpecialRegister::BlockId(axis).is_thread_varying());
            assert!(!SpecialRegister::GridDim(axis).is_thread_varying());
        }
        assert!(SpecialRegister::LaneId.is_thread_varying());
        assert!(!SpecialRegister::WarpId.is_thread_varying());
        assert!(!SpecialRegister::GridId.is_thread_varying());
    }

    #[test]
    fn test_usable_as_map_key() {
        use std::collections::HashMap;

        let mut consumers: HashMap<SpecialRegister, Vec<u32>> = HashMap::new();
        consumers
            .entry(SpecialRegister::ThreadId(Axis::X))
            .or_default()
            .push(7);

        assert_eq!(
            consumers[&SpecialRegister::ThreadId(Axis::X)],
            vec![7]
        );
    }
}
