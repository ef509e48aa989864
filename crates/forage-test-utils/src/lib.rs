//! Test utilities and mock lattices for Forage development.
//!
//! Provides a seeded RNG helper, in-memory [`Lattice`] implementations
//! ([`MockLattice`], [`FailingLattice`]) for exercising walk drivers
//! without real growth, and [`fixtures`] for small real lattices.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::HashMap;

use forage_core::{Coord, LatticeError};
use forage_lattice::{Indexing, Lattice, SiteState};
use rand::RngCore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Deterministic RNG for tests.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Unbounded mock lattice backed by a `HashMap`.
///
/// Every coordinate is addressable; slots are assigned in probe order.
/// Records which probe flavour was used so walk tests can assert on it.
#[derive(Debug, Default)]
pub struct MockLattice {
    dimension: usize,
    spacing: f64,
    slots: HashMap<Coord, u64>,
    visited: Vec<bool>,
    pub plain_probes: u64,
    pub percolating_probes: u64,
    pub jump_probes: u64,
    pub initial_percolations: u64,
}

impl MockLattice {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            spacing: 1.0,
            ..Self::default()
        }
    }

    /// Override the site spacing (default: 1.0).
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Pre-mark a coordinate visited without counting a probe.
    pub fn preset_visited(&mut self, coord: Coord) {
        let i = self.slot_for(&coord) as usize;
        self.visited[i] = true;
    }

    /// Whether `coord` has been marked.
    pub fn is_visited(&self, coord: &Coord) -> bool {
        self.slots
            .get(coord)
            .is_some_and(|&i| self.visited[i as usize])
    }

    /// Total probes of any flavour.
    pub fn total_probes(&self) -> u64 {
        self.plain_probes + self.percolating_probes + self.jump_probes
    }

    fn slot_for(&mut self, coord: &Coord) -> u64 {
        if let Some(&i) = self.slots.get(coord) {
            return i;
        }
        let i = self.visited.len() as u64;
        self.slots.insert(coord.clone(), i);
        self.visited.push(false);
        i
    }

    fn mark(&mut self, coord: &Coord) -> Result<bool, LatticeError> {
        if coord.ndim() != self.dimension {
            return Err(LatticeError::DimensionMismatch {
                expected: self.dimension,
                got: coord.ndim(),
            });
        }
        let i = self.slot_for(coord) as usize;
        let new = !self.visited[i];
        self.visited[i] = true;
        Ok(new)
    }
}

impl Lattice for MockLattice {
    fn indexing(&self) -> Indexing {
        Indexing::BaseConversion
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn spacing(&self) -> f64 {
        self.spacing
    }

    fn capacity(&self) -> u64 {
        self.visited.len() as u64
    }

    fn side_length(&self) -> u64 {
        0
    }

    fn percolation_probability(&self) -> f64 {
        0.0
    }

    fn max_jump_size(&self) -> u32 {
        1
    }

    fn visited_count(&self) -> u64 {
        self.visited.iter().filter(|v| **v).count() as u64
    }

    fn slot_of(&self, coord: &Coord) -> Result<Option<u64>, LatticeError> {
        Ok(self.slots.get(coord).copied())
    }

    fn site_state(&self, index: u64) -> Option<SiteState> {
        self.visited.get(index as usize).map(|&v| {
            if v {
                SiteState::Visited
            } else {
                SiteState::Unvisited
            }
        })
    }

    fn percolate_initial(&mut self, _rng: &mut dyn RngCore) {
        self.initial_percolations += 1;
    }

    fn probe_and_mark(&mut self, coord: &Coord) -> Result<bool, LatticeError> {
        self.plain_probes += 1;
        self.mark(coord)
    }

    fn probe_and_mark_percolating(
        &mut self,
        coord: &Coord,
        _rng: &mut dyn RngCore,
    ) -> Result<bool, LatticeError> {
        self.percolating_probes += 1;
        self.mark(coord)
    }

    fn probe_and_mark_jump(&mut self, coord: &Coord) -> Result<bool, LatticeError> {
        self.jump_probes += 1;
        self.mark(coord)
    }
}

/// Lattice that fails with a fatal overflow after `fail_after` probes.
///
/// Useful for testing that walk drivers and batch runners abort cleanly.
#[derive(Debug)]
pub struct FailingLattice {
    inner: MockLattice,
    fail_after: u64,
}

impl FailingLattice {
    pub fn new(dimension: usize, fail_after: u64) -> Self {
        Self {
            inner: MockLattice::new(dimension),
            fail_after,
        }
    }

    fn check(&self, coord: &Coord) -> Result<(), LatticeError> {
        if self.inner.total_probes() >= self.fail_after {
            return Err(LatticeError::IndexOverflow {
                coord: coord.clone(),
                detail: format!("injected failure after {} probes", self.fail_after),
            });
        }
        Ok(())
    }
}

impl Lattice for FailingLattice {
    fn indexing(&self) -> Indexing {
        self.inner.indexing()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn spacing(&self) -> f64 {
        self.inner.spacing()
    }

    fn capacity(&self) -> u64 {
        self.inner.capacity()
    }

    fn side_length(&self) -> u64 {
        self.inner.side_length()
    }

    fn percolation_probability(&self) -> f64 {
        self.inner.percolation_probability()
    }

    fn max_jump_size(&self) -> u32 {
        self.inner.max_jump_size()
    }

    fn visited_count(&self) -> u64 {
        self.inner.visited_count()
    }

    fn slot_of(&self, coord: &Coord) -> Result<Option<u64>, LatticeError> {
        self.inner.slot_of(coord)
    }

    fn site_state(&self, index: u64) -> Option<SiteState> {
        self.inner.site_state(index)
    }

    fn percolate_initial(&mut self, rng: &mut dyn RngCore) {
        self.inner.percolate_initial(rng);
    }

    fn probe_and_mark(&mut self, coord: &Coord) -> Result<bool, LatticeError> {
        self.check(coord)?;
        self.inner.probe_and_mark(coord)
    }

    fn probe_and_mark_percolating(
        &mut self,
        coord: &Coord,
        rng: &mut dyn RngCore,
    ) -> Result<bool, LatticeError> {
        self.check(coord)?;
        self.inner.probe_and_mark_percolating(coord, rng)
    }

    fn probe_and_mark_jump(&mut self, coord: &Coord) -> Result<bool, LatticeError> {
        self.check(coord)?;
        self.inner.probe_and_mark_jump(coord)
    }
}
