//! Lattice construction parameters and the strategy factory.

use crate::base_conversion::BaseConversionLattice;
use crate::geometry::{cube_volume, side_from_capacity};
use crate::lattice::{Indexing, Lattice, LatticeCore};
use crate::occupancy::OccupancyStore;
use crate::spiral::SpiralLattice;
use forage_core::{LatticeError, MAX_DIMENSION, MIN_DIMENSION};

/// Default number of layers added by plain base-conversion growth.
pub const DEFAULT_GROWTH_LAYERS: u64 = 100;

/// Parameters for constructing a lattice.
///
/// `initial_capacity` must be `side^dimension` for an odd `side`, so the
/// origin sits on the central slot and every axis spans `[-k, k]`.
///
/// # Examples
///
/// ```
/// use forage_lattice::{Indexing, LatticeConfig};
///
/// let config = LatticeConfig {
///     initial_capacity: 9,
///     dimension: 2,
///     indexing: Indexing::Spiral,
///     ..LatticeConfig::default()
/// };
/// let lattice = config.build().unwrap();
/// assert_eq!(lattice.side_length(), 3);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LatticeConfig {
    /// Slots allocated at construction.
    pub initial_capacity: u64,
    /// Number of axes (1 to 3).
    pub dimension: usize,
    /// Physical extent of the simulated region.
    pub physical_size: f64,
    /// Requested number of sites in `physical_size`; sets the spacing.
    pub site_density: u64,
    /// Probability in `[0, 1]` that a new site is pre-marked visited.
    pub percolation_probability: f64,
    /// Largest jump the walker can take, in sites. At least 1.
    pub max_jump_size: u32,
    /// Layers added by plain base-conversion growth. At least 1.
    pub growth_layers: u64,
    /// Indexing strategy.
    pub indexing: Indexing,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 2601,
            dimension: 2,
            physical_size: 1000.0,
            site_density: 10_000,
            percolation_probability: 0.0,
            max_jump_size: 1,
            growth_layers: DEFAULT_GROWTH_LAYERS,
            indexing: Indexing::Auto,
        }
    }
}

fn invalid(name: &'static str, reason: String) -> LatticeError {
    LatticeError::InvalidParameter { name, reason }
}

impl LatticeConfig {
    /// Configuration with the given capacity and dimension and defaults
    /// for everything else.
    pub fn new(initial_capacity: u64, dimension: usize) -> Self {
        Self {
            initial_capacity,
            dimension,
            ..Self::default()
        }
    }

    /// Distance between adjacent sites.
    ///
    /// `physical_size / (n - 1)` in 1-D and
    /// `physical_size / (n^(1/d) - 1)` otherwise, where `n` is
    /// `site_density`.
    pub fn spacing(&self) -> f64 {
        let n = self.site_density as f64;
        if self.dimension == 1 {
            self.physical_size / (n - 1.0)
        } else {
            self.physical_size / (n.powf(1.0 / self.dimension as f64) - 1.0)
        }
    }

    /// Side length implied by `initial_capacity`.
    pub fn side_length(&self) -> u64 {
        side_from_capacity(self.initial_capacity, self.dimension)
    }

    /// Check every structural invariant.
    ///
    /// # Errors
    ///
    /// - [`LatticeError::UnsupportedDimension`] outside 1 to 3, or spiral
    ///   indexing with a dimension other than 2
    /// - [`LatticeError::InvalidParameter`] for a zero capacity, a
    ///   probability outside `[0, 1]`, non-positive spacing, or zero
    ///   growth/jump sizes
    /// - [`LatticeError::GeometryMismatch`] if the capacity is not the
    ///   power of an odd side length
    pub fn validate(&self) -> Result<(), LatticeError> {
        if !(MIN_DIMENSION..=MAX_DIMENSION).contains(&self.dimension) {
            return Err(LatticeError::UnsupportedDimension {
                dimension: self.dimension,
                supported: "1..=3",
            });
        }
        if self.indexing == Indexing::Spiral && self.dimension != 2 {
            return Err(LatticeError::UnsupportedDimension {
                dimension: self.dimension,
                supported: "2 (spiral)",
            });
        }
        if self.initial_capacity == 0 {
            return Err(invalid("initial_capacity", "must be > 0".into()));
        }
        let p = self.percolation_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(invalid(
                "percolation_probability",
                format!("must be in [0, 1], got {p}"),
            ));
        }
        let spacing = self.spacing();
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(invalid(
                "site_density",
                format!(
                    "spacing {spacing} from physical_size {} and site_density {} is not positive",
                    self.physical_size, self.site_density
                ),
            ));
        }
        if self.max_jump_size == 0 {
            return Err(invalid("max_jump_size", "must be >= 1".into()));
        }
        if self.growth_layers == 0 {
            return Err(invalid("growth_layers", "must be >= 1".into()));
        }
        let side = self.side_length();
        if side % 2 == 0 || cube_volume(side, self.dimension) != Some(self.initial_capacity) {
            return Err(LatticeError::GeometryMismatch {
                capacity: self.initial_capacity,
                side_length: side,
                dimension: self.dimension,
            });
        }
        Ok(())
    }

    /// Validate and construct the configured strategy.
    pub fn build(&self) -> Result<Box<dyn Lattice>, LatticeError> {
        self.validate()?;
        let core = LatticeCore {
            dimension: self.dimension,
            spacing: self.spacing(),
            side_length: self.side_length(),
            percolation_probability: self.percolation_probability,
            max_jump_size: self.max_jump_size,
            store: OccupancyStore::new(self.initial_capacity)?,
            initial_percolated: false,
        };
        tracing::trace!(
            indexing = %self.indexing.resolve(self.dimension),
            capacity = self.initial_capacity,
            dimension = self.dimension,
            "lattice constructed"
        );
        Ok(match self.indexing.resolve(self.dimension) {
            Indexing::Spiral => Box::new(SpiralLattice::from_core(core)),
            _ => Box::new(BaseConversionLattice::from_core(core, self.growth_layers)),
        })
    }
}

/// Consuming builder for a lattice.
///
/// Starts from [`LatticeConfig::default`]; the terminal
/// [`build`](Self::build) validates and constructs.
///
/// ```
/// use forage_lattice::{Indexing, LatticeConfig};
///
/// let lattice = LatticeConfig::builder()
///     .initial_capacity(27)
///     .dimension(3)
///     .max_jump_size(5)
///     .build()
///     .unwrap();
/// assert_eq!(lattice.indexing(), Indexing::BaseConversion);
/// assert_eq!(lattice.max_jump_size(), 5);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LatticeBuilder {
    config: LatticeConfig,
}

impl LatticeConfig {
    /// Create a new builder with default parameters.
    pub fn builder() -> LatticeBuilder {
        LatticeBuilder::default()
    }
}

impl LatticeBuilder {
    /// Slots allocated at construction (default: 2601).
    pub fn initial_capacity(mut self, initial_capacity: u64) -> Self {
        self.config.initial_capacity = initial_capacity;
        self
    }

    /// Number of axes (default: 2).
    pub fn dimension(mut self, dimension: usize) -> Self {
        self.config.dimension = dimension;
        self
    }

    /// Physical extent of the simulated region (default: 1000).
    pub fn physical_size(mut self, physical_size: f64) -> Self {
        self.config.physical_size = physical_size;
        self
    }

    /// Requested number of sites in the region (default: 10000).
    pub fn site_density(mut self, site_density: u64) -> Self {
        self.config.site_density = site_density;
        self
    }

    /// Percolation probability (default: 0).
    pub fn percolation_probability(mut self, p: f64) -> Self {
        self.config.percolation_probability = p;
        self
    }

    /// Largest jump in sites (default: 1).
    pub fn max_jump_size(mut self, max_jump_size: u32) -> Self {
        self.config.max_jump_size = max_jump_size;
        self
    }

    /// Layers per plain base-conversion growth (default: 100).
    pub fn growth_layers(mut self, growth_layers: u64) -> Self {
        self.config.growth_layers = growth_layers;
        self
    }

    /// Indexing strategy (default: [`Indexing::Auto`]).
    pub fn indexing(mut self, indexing: Indexing) -> Self {
        self.config.indexing = indexing;
        self
    }

    /// The accumulated configuration, unvalidated.
    pub fn into_config(self) -> LatticeConfig {
        self.config
    }

    /// Validate and construct.
    ///
    /// # Errors
    ///
    /// Everything [`LatticeConfig::validate`] rejects, plus
    /// [`LatticeError::AllocationFailed`].
    pub fn build(self) -> Result<Box<dyn Lattice>, LatticeError> {
        self.config.build()
    }
}

/// Construct a lattice with automatic strategy selection.
///
/// Shorthand for [`LatticeConfig::build`] with the remaining fields at
/// their defaults.
pub fn construct(
    initial_capacity: u64,
    dimension: usize,
    physical_size: f64,
    percolation_probability: f64,
    max_jump_size: u32,
) -> Result<Box<dyn Lattice>, LatticeError> {
    LatticeConfig {
        initial_capacity,
        dimension,
        physical_size,
        percolation_probability,
        max_jump_size,
        ..LatticeConfig::default()
    }
    .build()
}
