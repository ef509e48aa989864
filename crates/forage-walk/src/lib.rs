//! Random walks on growing lattices.
//!
//! A [`Walker`] starts at the lattice center and moves one axis at a time
//! until a simulated clock passes its end time, counting the sites it
//! discovers. The [`WalkPolicy`] decides how moves are drawn and which
//! lattice probe is used:
//!
//! - plain, drift and memory walks use unit steps and plain probes
//! - jump walks draw step lengths from a [`PowerLaw`] and use jump-aware
//!   growth
//! - percolation walks pre-mark sites and use percolating probes
//!
//! # Example
//!
//! ```
//! use forage_lattice::construct;
//! use forage_walk::{WalkPolicy, Walker};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut lattice = construct(2601, 2, 1000.0, 0.0, 1).unwrap();
//! let mut walker = Walker::new(lattice.center(), 1.0, 0.0).unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(1);
//!
//! let outcome = walker
//!     .walk(lattice.as_mut(), &WalkPolicy::Plain, 100.0, &mut rng)
//!     .unwrap();
//! assert!(outcome.discovered >= 1);
//! assert!(outcome.elapsed > 100.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod policy;
pub mod power_law;
pub mod walker;

pub use error::WalkError;
pub use policy::{Move, WalkPolicy};
pub use power_law::PowerLaw;
pub use walker::{WalkOutcome, Walker};
