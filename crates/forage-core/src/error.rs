//! Error types for lattice construction and growth.
//!
//! Every variant except [`LatticeError::InvalidParameter`] and
//! [`LatticeError::DimensionMismatch`] is fatal for the owning run: a
//! failed growth leaves no state worth resuming from.

use crate::Coord;
use thiserror::Error;

/// Errors arising from lattice construction, indexing, or growth.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LatticeError {
    /// A linear index or capacity does not fit the index width.
    #[error("index overflow at {coord}: {detail}")]
    IndexOverflow {
        /// The coordinate being addressed when the overflow occurred.
        coord: Coord,
        /// Which computation overflowed.
        detail: String,
    },
    /// The occupancy store could not be grown.
    #[error("cannot allocate occupancy store of {requested} slots")]
    AllocationFailed {
        /// Slot count that was requested.
        requested: u64,
    },
    /// A remapped site landed outside the freshly grown store.
    #[error("remap produced index {index} outside capacity {capacity}")]
    RemapOutOfRange {
        /// The offending index.
        index: u64,
        /// Capacity after growth.
        capacity: u64,
    },
    /// Capacity and side length disagree.
    #[error(
        "capacity {capacity} is not side_length^dimension (side_length {side_length}, dimension {dimension})"
    )]
    GeometryMismatch {
        /// Current or requested capacity.
        capacity: u64,
        /// Side length of the addressable cube.
        side_length: u64,
        /// Lattice dimensionality.
        dimension: usize,
    },
    /// The strategy has no index formula for this dimensionality.
    #[error("dimension {dimension} unsupported (supported: {supported})")]
    UnsupportedDimension {
        /// Requested dimensionality.
        dimension: usize,
        /// Human-readable supported range.
        supported: &'static str,
    },
    /// A coordinate's arity does not match the lattice.
    #[error("expected {expected}D coordinate, got {got}D")]
    DimensionMismatch {
        /// Lattice dimensionality.
        expected: usize,
        /// Coordinate arity.
        got: usize,
    },
    /// A construction parameter is out of range.
    #[error("invalid lattice parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl LatticeError {
    /// Whether the error aborts the owning run.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::InvalidParameter { .. } | Self::DimensionMismatch { .. }
        )
    }
}
