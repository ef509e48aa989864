//! Core types for the Forage random-walk simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! [`Coord`] value type that walkers and lattices exchange, and the
//! [`LatticeError`] taxonomy shared by every lattice strategy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod coord;
pub mod error;

pub use coord::Coord;
pub use error::LatticeError;

/// Smallest lattice dimensionality supported by any strategy.
pub const MIN_DIMENSION: usize = 1;

/// Largest lattice dimensionality with concrete index formulas.
pub const MAX_DIMENSION: usize = 3;
