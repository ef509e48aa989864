//! Batch driver for Forage random-walk simulations.
//!
//! A [`SimConfig`] names the lattice geometry, the walker, the walk
//! variant and the prey densities to sweep. [`BatchRunner`] validates it,
//! runs `n_sims` independent walks per density across a pool of worker
//! threads, and returns a [`BatchSummary`] that can be written in the
//! `density,discovered` result-file format.
//!
//! Every run is seeded from the batch seed and its task index, so a batch
//! produces the same records regardless of worker count, and any single
//! run can be replayed with [`BatchRunner::run_task`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod batch;
pub mod config;
pub mod results;

pub use batch::{BatchRunner, RunError, Task};
pub use config::{ConfigError, InitialCapacities, Perturbation, SimConfig};
pub use results::{result_file_name, write_records, BatchSummary, RunRecord};
