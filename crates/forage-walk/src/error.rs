//! Error types for walk setup.

use thiserror::Error;

/// Errors from constructing a walker or a jump-length sampler.
///
/// Lattice failures during a walk are reported as
/// [`forage_core::LatticeError`] and are not wrapped here.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum WalkError {
    /// Power-law bounds are not `1 <= min <= max`.
    #[error("invalid power-law range [{min}, {max}]: {reason}")]
    InvalidRange {
        /// Requested lower bound.
        min: u64,
        /// Requested upper bound.
        max: u64,
        /// What is wrong with the range.
        reason: &'static str,
    },

    /// A real-valued parameter is out of range.
    #[error("invalid walk parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}
