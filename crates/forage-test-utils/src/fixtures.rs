//! Small real lattices for integration tests.
//!
//! - [`smallest_lattice`]: a 3^d cube, the tightest valid geometry.
//! - [`spiral_lattice`]: a 2-D spiral lattice of the given side.
//! - [`base_conversion_lattice`]: forced mixed-radix indexing.
//! - [`percolating_lattice`]: a lattice with a percolation probability.

use forage_core::LatticeError;
use forage_lattice::{Indexing, Lattice, LatticeConfig};

fn cube(side: u64, dimension: usize) -> u64 {
    side.pow(dimension as u32)
}

/// The smallest valid lattice (side 3) with automatic indexing.
pub fn smallest_lattice(dimension: usize) -> Result<Box<dyn Lattice>, LatticeError> {
    LatticeConfig::new(cube(3, dimension), dimension).build()
}

/// 2-D spiral lattice with the given odd side length.
pub fn spiral_lattice(side: u64) -> Result<Box<dyn Lattice>, LatticeError> {
    LatticeConfig::builder()
        .initial_capacity(side * side)
        .dimension(2)
        .indexing(Indexing::Spiral)
        .build()
}

/// Mixed-radix lattice with the given odd side length and growth layers.
pub fn base_conversion_lattice(
    side: u64,
    dimension: usize,
    growth_layers: u64,
) -> Result<Box<dyn Lattice>, LatticeError> {
    LatticeConfig::builder()
        .initial_capacity(cube(side, dimension))
        .dimension(dimension)
        .growth_layers(growth_layers)
        .indexing(Indexing::BaseConversion)
        .build()
}

/// Lattice with automatic indexing and percolation probability `p`.
pub fn percolating_lattice(
    side: u64,
    dimension: usize,
    p: f64,
) -> Result<Box<dyn Lattice>, LatticeError> {
    LatticeConfig::builder()
        .initial_capacity(cube(side, dimension))
        .dimension(dimension)
        .percolation_probability(p)
        .build()
}
