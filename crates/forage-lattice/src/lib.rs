//! Unbounded occupancy lattices for Forage random walks.
//!
//! A walker on an integer lattice never knows in advance how far it will
//! wander. The lattices here start from a finite cube centered on the
//! origin and grow on demand whenever a probe lands outside the current
//! addressable region, preserving every recorded visit.
//!
//! # Strategies
//!
//! - [`BaseConversionLattice`]: mixed-radix indexing for 1 to 3
//!   dimensions; growth remaps occupancy into the larger cube
//! - [`SpiralLattice`]: square-spiral indexing for 2-D; growth appends
//!
//! Both implement the [`Lattice`] trait. [`LatticeConfig::build`] (or the
//! [`construct`] shorthand) validates parameters and picks the strategy.
//!
//! # Percolation
//!
//! With a nonzero percolation probability, newly introduced sites are
//! pre-marked visited at random, modelling obstacles or depleted patches.
//! See [`Lattice::percolate_initial`] and
//! [`Lattice::probe_and_mark_percolating`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod base_conversion;
pub mod config;
pub mod geometry;
pub mod lattice;
pub mod occupancy;
pub mod spiral;

#[cfg(test)]
pub(crate) mod compliance;

pub use base_conversion::BaseConversionLattice;
pub use config::{construct, LatticeBuilder, LatticeConfig, DEFAULT_GROWTH_LAYERS};
pub use lattice::{Indexing, Lattice};
pub use occupancy::{OccupancyStore, SiteState};
pub use spiral::SpiralLattice;
