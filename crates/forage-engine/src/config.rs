//! Batch configuration, validation, and error types.
//!
//! [`SimConfig`] describes a whole batch: the lattice geometry, the walker,
//! the perturbation, and which prey densities to sweep.
//! [`validate()`](SimConfig::validate) checks every parameter before any
//! run starts; the [`BatchRunner`](crate::BatchRunner) constructor calls it.

use std::fmt;
use std::str::FromStr;

use forage_core::LatticeError;
use forage_lattice::{Indexing, LatticeConfig};
use forage_walk::WalkError;
use thiserror::Error;

// ── Perturbation ───────────────────────────────────────────────────

/// Which walk variant every run in the batch uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Perturbation {
    /// Simple random walk.
    #[default]
    Plain,
    /// Drift toward `+` on the first axis with probability `p_drift`.
    Drift,
    /// Power-law jumps between `power_law_xmin` and `power_law_xmax`.
    Jumps,
    /// No immediate backtracking.
    Memory,
    /// Walk on a lattice percolated with probability `p_perco`.
    Percolation,
}

impl Perturbation {
    /// All variants, in command-line order.
    pub const ALL: [Perturbation; 5] = [
        Perturbation::Plain,
        Perturbation::Drift,
        Perturbation::Jumps,
        Perturbation::Memory,
        Perturbation::Percolation,
    ];

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Perturbation::Plain => "plain",
            Perturbation::Drift => "drift",
            Perturbation::Jumps => "jumps",
            Perturbation::Memory => "memory",
            Perturbation::Percolation => "percolation",
        }
    }
}

impl fmt::Display for Perturbation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Perturbation {
    type Err = ConfigError;

    /// Parse a name, with or without a leading `-` (`"drift"`, `"-drift"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix('-').unwrap_or(s);
        Perturbation::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| ConfigError::UnknownPerturbation {
                value: s.to_string(),
            })
    }
}

// ── InitialCapacities ──────────────────────────────────────────────

/// Starting lattice capacity per dimensionality.
///
/// Each value must be `side^d` for an odd `side`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitialCapacities {
    /// 1-D lattices. Default: 10001.
    pub one_d: u64,
    /// 2-D lattices. Default: 2601 (51 x 51).
    pub two_d: u64,
    /// 3-D lattices. Default: 1030301 (101^3).
    pub three_d: u64,
}

impl Default for InitialCapacities {
    fn default() -> Self {
        Self {
            one_d: 10_001,
            two_d: 2_601,
            three_d: 1_030_301,
        }
    }
}

impl InitialCapacities {
    /// Capacity for `dimension`, or `None` outside 1 to 3.
    pub fn for_dimension(&self, dimension: usize) -> Option<u64> {
        match dimension {
            1 => Some(self.one_d),
            2 => Some(self.two_d),
            3 => Some(self.three_d),
            _ => None,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SimConfig::validate()`].
#[derive(Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Dimension outside 1 to 3.
    #[error("dimension must be an integer in [1, 3], got {value}")]
    InvalidDimension {
        /// The configured dimension.
        value: usize,
    },
    /// A quantity that must be strictly positive is not.
    #[error("`{name}` must be finite and > 0, got {value}")]
    NotPositive {
        /// Parameter name.
        name: &'static str,
        /// The configured value.
        value: f64,
    },
    /// A quantity that must be non-negative is not.
    #[error("`{name}` must be finite and >= 0, got {value}")]
    Negative {
        /// Parameter name.
        name: &'static str,
        /// The configured value.
        value: f64,
    },
    /// A probability outside `[0, 1]`.
    #[error("`{name}` must be in [0, 1], got {value}")]
    ProbabilityOutOfRange {
        /// Parameter name.
        name: &'static str,
        /// The configured value.
        value: f64,
    },
    /// No densities to sweep.
    #[error("`densities` is empty")]
    NoDensities,
    /// A density of zero.
    #[error("density #{index} is 0; every density must be > 0")]
    ZeroDensity {
        /// Position in `densities`.
        index: usize,
    },
    /// A power-law bound is not a non-negative integer.
    #[error("`{name}` must be a non-negative integer, got {value}")]
    NonIntegerBound {
        /// `power_law_xmin` or `power_law_xmax`.
        name: &'static str,
        /// The configured value.
        value: f64,
    },
    /// `power_law_xmax < power_law_xmin`.
    #[error("power-law bounds inverted: xmin = {xmin}, xmax = {xmax}")]
    InvertedBounds {
        /// Lower bound.
        xmin: f64,
        /// Upper bound.
        xmax: f64,
    },
    /// `n_sims` is zero.
    #[error("`n_sims` must be > 0")]
    ZeroSims,
    /// An explicit worker count of zero.
    #[error("`workers` must be > 0 when set")]
    ZeroWorkers,
    /// Unrecognised perturbation name.
    #[error("unknown perturbation `{value}` (expected plain, drift, jumps, memory or percolation)")]
    UnknownPerturbation {
        /// The rejected input.
        value: String,
    },
    /// The jump-length table could not be built.
    #[error("power law: {0}")]
    PowerLaw(#[from] WalkError),
    /// The lattice for one of the densities is invalid.
    #[error("lattice for density {density}: {source}")]
    Lattice {
        /// Density whose lattice was rejected.
        density: u64,
        /// Underlying lattice error.
        #[source]
        source: LatticeError,
    },
}

// ── SimConfig ──────────────────────────────────────────────────────

/// Parameters for a batch of simulations.
///
/// One run is executed for every `(density, sim_index)` pair, with
/// `sim_index` in `0..n_sims`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Runs per density. Default: 100.
    pub n_sims: u32,
    /// Worker threads. `None` = auto-detect
    /// (`available_parallelism`, clamped to `[1, 64]`).
    pub workers: Option<usize>,
    /// Lattice dimensionality, 1 to 3. Default: 2.
    pub dimension: usize,
    /// Physical extent of the lattice. Default: 1000.
    pub lattice_size: f64,
    /// Simulated time per run. Default: 1000.
    pub end_time: f64,
    /// Walker speed. Default: 1.
    pub walk_speed: f64,
    /// Time spent at each newly found site. Default: 0.
    pub handling_time: f64,
    /// Drift probability (drift walks). Default: 0.
    pub p_drift: f64,
    /// Smallest jump (jump walks). Default: 1.
    pub power_law_xmin: f64,
    /// Largest jump (jump walks); also sizes jump-aware growth. Default: 10.
    pub power_law_xmax: f64,
    /// Power-law exponent (jump walks). Default: 2.
    pub power_law_gamma: f64,
    /// Percolation probability (percolation walks). Default: 0.
    pub p_perco: f64,
    /// Prey densities (sites in `lattice_size`) to sweep.
    pub densities: Vec<u64>,
    /// Walk variant.
    pub perturbation: Perturbation,
    /// Base seed; run `i` uses `seed ^ i`.
    pub seed: u64,
    /// Starting lattice capacity per dimension.
    pub initial_capacities: InitialCapacities,
    /// Lattice indexing strategy.
    pub indexing: Indexing,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            n_sims: 100,
            workers: None,
            dimension: 2,
            lattice_size: 1000.0,
            end_time: 1000.0,
            walk_speed: 1.0,
            handling_time: 0.0,
            p_drift: 0.0,
            power_law_xmin: 1.0,
            power_law_xmax: 10.0,
            power_law_gamma: 2.0,
            p_perco: 0.0,
            densities: vec![10_000],
            perturbation: Perturbation::Plain,
            seed: 0,
            initial_capacities: InitialCapacities::default(),
            indexing: Indexing::Auto,
        }
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

fn probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}

fn integer_bound(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Ok(())
    } else {
        Err(ConfigError::NonIntegerBound { name, value })
    }
}

impl SimConfig {
    /// Check every parameter.
    ///
    /// Also builds (and discards) the lattice configuration for each
    /// density, so geometry problems surface before any thread starts.
    ///
    /// # Errors
    ///
    /// The first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=3).contains(&self.dimension) {
            return Err(ConfigError::InvalidDimension {
                value: self.dimension,
            });
        }
        positive("lattice_size", self.lattice_size)?;
        non_negative("end_time", self.end_time)?;
        positive("walk_speed", self.walk_speed)?;
        non_negative("handling_time", self.handling_time)?;
        if self.densities.is_empty() {
            return Err(ConfigError::NoDensities);
        }
        if let Some(index) = self.densities.iter().position(|&d| d == 0) {
            return Err(ConfigError::ZeroDensity { index });
        }
        probability("p_drift", self.p_drift)?;
        integer_bound("power_law_xmin", self.power_law_xmin)?;
        integer_bound("power_law_xmax", self.power_law_xmax)?;
        if self.power_law_xmax < self.power_law_xmin {
            return Err(ConfigError::InvertedBounds {
                xmin: self.power_law_xmin,
                xmax: self.power_law_xmax,
            });
        }
        probability("p_perco", self.p_perco)?;
        if self.n_sims == 0 {
            return Err(ConfigError::ZeroSims);
        }
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        for &density in &self.densities {
            self.lattice_config(density)
                .validate()
                .map_err(|source| ConfigError::Lattice { density, source })?;
        }
        Ok(())
    }

    /// Resolve the worker count, applying auto-detection if `None`.
    pub fn resolved_workers(&self) -> usize {
        match self.workers {
            Some(n) => n.clamp(1, 64),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, 64),
        }
    }

    /// Largest jump, used to size jump-aware growth. At least 1.
    pub fn max_jump_size(&self) -> u32 {
        (self.power_law_xmax as u32).max(1)
    }

    /// Lattice parameters for one run at `density`.
    pub fn lattice_config(&self, density: u64) -> LatticeConfig {
        LatticeConfig {
            initial_capacity: self
                .initial_capacities
                .for_dimension(self.dimension)
                .unwrap_or(0),
            dimension: self.dimension,
            physical_size: self.lattice_size,
            site_density: density,
            percolation_probability: self.p_perco,
            max_jump_size: self.max_jump_size(),
            indexing: self.indexing,
            ..LatticeConfig::default()
        }
    }

    /// Total number of runs in the batch.
    pub fn total_runs(&self) -> u64 {
        self.densities.len() as u64 * u64::from(self.n_sims)
    }
}
