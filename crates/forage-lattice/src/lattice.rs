//! The [`Lattice`] trait and the state shared by every strategy.

use crate::occupancy::{OccupancyStore, SiteState};
use forage_core::{Coord, LatticeError};
use rand::RngCore;
use std::fmt;

/// Which coordinate-to-slot mapping a lattice uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Indexing {
    /// Spiral for 2-D, base-conversion otherwise.
    #[default]
    Auto,
    /// Mixed-radix indexing; any supported dimension, remaps on growth.
    BaseConversion,
    /// Closed-form square spiral; 2-D only, append-only growth.
    Spiral,
}

impl Indexing {
    /// Resolve [`Indexing::Auto`] for a concrete dimensionality.
    pub fn resolve(self, dimension: usize) -> Indexing {
        match self {
            Indexing::Auto if dimension == 2 => Indexing::Spiral,
            Indexing::Auto => Indexing::BaseConversion,
            other => other,
        }
    }
}

impl fmt::Display for Indexing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indexing::Auto => write!(f, "auto"),
            Indexing::BaseConversion => write!(f, "base_conversion"),
            Indexing::Spiral => write!(f, "spiral"),
        }
    }
}

/// An unbounded occupancy lattice that grows on demand.
///
/// A walk driver asks, once per step, whether the walker's coordinate is a
/// new site. The strategy maps the coordinate to a slot, grows the store
/// when the slot is out of range, and flips the slot to visited.
///
/// Three probe flavours differ only in how growth is sized and whether
/// newly introduced slots are percolated:
///
/// | Flavour | Growth | Percolation |
/// |---------|--------|-------------|
/// | [`probe_and_mark`](Self::probe_and_mark) | fixed layers | no |
/// | [`probe_and_mark_percolating`](Self::probe_and_mark_percolating) | fixed layers | new slots |
/// | [`probe_and_mark_jump`](Self::probe_and_mark_jump) | `max_jump_size * 4` layers | no |
///
/// Growth is atomic: on success capacity, geometry and occupancy are all
/// consistent; on error the run must be abandoned.
///
/// `Send` lets a run be built on one thread and executed on another.
pub trait Lattice: Send + fmt::Debug {
    /// Strategy in use (never [`Indexing::Auto`]).
    fn indexing(&self) -> Indexing;

    /// Number of axes.
    fn dimension(&self) -> usize;

    /// Physical distance between adjacent sites.
    fn spacing(&self) -> f64;

    /// The walker's starting site: the all-zero coordinate.
    fn center(&self) -> Coord {
        Coord::origin(self.dimension())
    }

    /// Number of addressable slots.
    fn capacity(&self) -> u64;

    /// Sites along one axis of the addressable region.
    fn side_length(&self) -> u64;

    /// Probability that a newly introduced site is pre-marked visited.
    fn percolation_probability(&self) -> f64;

    /// Largest single jump, used to size jump-aware growth.
    fn max_jump_size(&self) -> u32;

    /// Number of slots currently marked visited.
    fn visited_count(&self) -> u64;

    /// Slot of `coord` under the current geometry, or `None` if the
    /// coordinate is outside current capacity.
    fn slot_of(&self, coord: &Coord) -> Result<Option<u64>, LatticeError>;

    /// State of the slot at `index`, or `None` if out of range.
    fn site_state(&self, index: u64) -> Option<SiteState>;

    /// Whether `coord` is visited, without marking it or growing.
    ///
    /// `None` if the coordinate is outside current capacity.
    fn peek(&self, coord: &Coord) -> Result<Option<bool>, LatticeError> {
        Ok(self
            .slot_of(coord)?
            .and_then(|i| self.site_state(i))
            .map(|s| s == SiteState::Visited))
    }

    /// Percolate the slots present at construction.
    ///
    /// Intended to run once, before the first probe. Later calls, and any
    /// call after the lattice has grown, are no-ops.
    fn percolate_initial(&mut self, rng: &mut dyn RngCore);

    /// Plain check-and-mark. Returns `true` if the site was new.
    fn probe_and_mark(&mut self, coord: &Coord) -> Result<bool, LatticeError>;

    /// Check-and-mark that percolates every slot introduced by growth.
    fn probe_and_mark_percolating(
        &mut self,
        coord: &Coord,
        rng: &mut dyn RngCore,
    ) -> Result<bool, LatticeError>;

    /// Check-and-mark with growth sized for the largest jump.
    fn probe_and_mark_jump(&mut self, coord: &Coord) -> Result<bool, LatticeError>;
}

/// State common to both strategies.
#[derive(Debug)]
pub(crate) struct LatticeCore {
    pub dimension: usize,
    pub spacing: f64,
    pub side_length: u64,
    pub percolation_probability: f64,
    pub max_jump_size: u32,
    pub store: OccupancyStore,
    pub initial_percolated: bool,
}

impl LatticeCore {
    pub fn check_arity(&self, coord: &Coord) -> Result<(), LatticeError> {
        if coord.ndim() != self.dimension {
            return Err(LatticeError::DimensionMismatch {
                expected: self.dimension,
                got: coord.ndim(),
            });
        }
        Ok(())
    }

    pub fn percolate_initial(&mut self, rng: &mut dyn RngCore) {
        if self.initial_percolated {
            return;
        }
        self.initial_percolated = true;
        // Visited slots are left alone, so an early probe is never undone.
        self.store.settle(self.percolation_probability, Some(rng));
    }

    /// Layers added by jump-aware growth.
    pub fn jump_layers(&self) -> u64 {
        u64::from(self.max_jump_size.max(1)) * crate::geometry::JUMP_MARGIN
    }

    pub fn capacity(&self) -> u64 {
        self.store.len()
    }
}
