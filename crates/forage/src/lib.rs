//! Forage: random-walk foraging on unbounded, self-growing lattices.
//!
//! This is the facade crate that re-exports the public API from all
//! Forage sub-crates. For most users, adding `forage` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use forage::prelude::*;
//!
//! let config = SimConfig {
//!     n_sims: 4,
//!     workers: Some(2),
//!     end_time: 200.0,
//!     densities: vec![400, 10_000],
//!     perturbation: Perturbation::Memory,
//!     ..SimConfig::default()
//! };
//! let summary = BatchRunner::new(config).unwrap().run().unwrap();
//! assert_eq!(summary.len(), 8);
//!
//! let mut out = Vec::new();
//! summary.write_to(&mut out).unwrap();
//! assert!(out.starts_with(b"400,"));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `forage-core` | `Coord`, `LatticeError` |
//! | [`lattice`] | `forage-lattice` | Occupancy store, indexing strategies, growth |
//! | [`walk`] | `forage-walk` | Power-law sampler, walker, walk policies |
//! | [`engine`] | `forage-engine` | Batch configuration, runner, result files |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Coordinates and the lattice error taxonomy (`forage-core`).
pub use forage_core as types;

/// Growing lattices (`forage-lattice`).
///
/// [`lattice::LatticeConfig`] selects between
/// [`lattice::BaseConversionLattice`] and [`lattice::SpiralLattice`].
pub use forage_lattice as lattice;

/// Walkers and jump-length sampling (`forage-walk`).
pub use forage_walk as walk;

/// Parallel batch driver (`forage-engine`).
pub use forage_engine as engine;

/// Common imports for typical Forage usage.
///
/// ```rust
/// use forage::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use forage_core::{Coord, LatticeError};

    // Lattice
    pub use forage_lattice::{construct, Indexing, Lattice, LatticeConfig};

    // Walk
    pub use forage_walk::{PowerLaw, WalkOutcome, WalkPolicy, Walker};

    // Engine
    pub use forage_engine::{
        BatchRunner, BatchSummary, ConfigError, Perturbation, RunError, RunRecord, SimConfig,
    };
}
