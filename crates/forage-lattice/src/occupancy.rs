//! Growable per-site occupancy storage.
//!
//! [`OccupancyStore`] holds one marker per addressable slot. Outside a
//! growth operation every slot is either [`SiteState::Unvisited`] or
//! [`SiteState::Visited`]. During a percolating remap a third, transient
//! marker records "existed before growth and was unvisited"; it is
//! resolved before the store is handed back to the lattice, so it is
//! never observable through the public API.

use forage_core::LatticeError;
use rand::{Rng, RngCore};

/// Observable state of one lattice site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SiteState {
    /// Not yet discovered.
    Unvisited,
    /// Discovered by the walker, or pre-marked by percolation.
    Visited,
}

/// Internal slot marker, including the transient remap state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
enum Slot {
    Unvisited = 0,
    Visited = 1,
    /// Previously known to be unvisited; only present mid-growth.
    Known = 2,
}

/// Owned, resizable occupancy array.
///
/// Grows by allocating (base-conversion remap) or by appending (spiral).
/// Allocation goes through `try_reserve_exact` (amortised `try_reserve`
/// for appends) so an oversized request surfaces as
/// [`LatticeError::AllocationFailed`] instead of aborting.
#[derive(Clone, Debug)]
pub struct OccupancyStore {
    slots: Vec<Slot>,
    visited: u64,
}

fn slot_count(len: u64) -> Result<usize, LatticeError> {
    usize::try_from(len).map_err(|_| LatticeError::AllocationFailed { requested: len })
}

impl OccupancyStore {
    /// Allocate `len` unvisited slots.
    pub fn new(len: u64) -> Result<Self, LatticeError> {
        let n = slot_count(len)?;
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(n)
            .map_err(|_| LatticeError::AllocationFailed { requested: len })?;
        slots.resize(n, Slot::Unvisited);
        Ok(Self { slots, visited: 0 })
    }

    /// Number of addressable slots.
    pub fn len(&self) -> u64 {
        self.slots.len() as u64
    }

    /// Whether the store has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots currently marked visited.
    pub fn visited_count(&self) -> u64 {
        self.visited
    }

    /// State of the slot at `index`, or `None` past the end.
    pub fn get(&self, index: u64) -> Option<SiteState> {
        let i = usize::try_from(index).ok()?;
        self.slots.get(i).map(|slot| match slot {
            Slot::Visited => SiteState::Visited,
            Slot::Unvisited | Slot::Known => SiteState::Unvisited,
        })
    }

    /// Check-and-mark: returns `true` if the slot was unvisited.
    ///
    /// The caller guarantees `index < len()`.
    pub fn mark(&mut self, index: u64) -> bool {
        let slot = &mut self.slots[index as usize];
        if *slot == Slot::Visited {
            return false;
        }
        *slot = Slot::Visited;
        self.visited += 1;
        true
    }

    /// Iterate over the indices of visited slots in ascending order.
    pub fn visited_indices(&self) -> impl Iterator<Item = u64> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == Slot::Visited)
            .map(|(i, _)| i as u64)
    }

    /// Iterate over `(index, visited)` for every slot.
    pub(crate) fn iter_states(&self) -> impl Iterator<Item = (u64, bool)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, s)| (i as u64, *s == Slot::Visited))
    }

    /// Write a remapped state into a freshly allocated store.
    ///
    /// `visited == false` records the transient "known unvisited" marker.
    pub(crate) fn place(&mut self, index: u64, visited: bool) -> Result<(), LatticeError> {
        let capacity = self.len();
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| self.slots.get_mut(i))
            .ok_or(LatticeError::RemapOutOfRange { index, capacity })?;
        if visited {
            if *slot != Slot::Visited {
                self.visited += 1;
            }
            *slot = Slot::Visited;
        } else if *slot == Slot::Unvisited {
            *slot = Slot::Known;
        }
        Ok(())
    }

    /// Resolve transient markers after a remap.
    ///
    /// Known slots revert to unvisited. Slots still in the freshly
    /// allocated state are genuinely new: with a random stream each one is
    /// independently marked visited with probability `p`; without one
    /// they stay unvisited.
    pub(crate) fn settle(&mut self, p: f64, mut rng: Option<&mut (dyn RngCore + '_)>) {
        for slot in &mut self.slots {
            match *slot {
                Slot::Known => *slot = Slot::Unvisited,
                Slot::Unvisited => {
                    if let Some(rng) = rng.as_deref_mut() {
                        if rng.random::<f64>() < p {
                            *slot = Slot::Visited;
                            self.visited += 1;
                        }
                    }
                }
                Slot::Visited => {}
            }
        }
    }

    /// Append `extra` unvisited slots at the end.
    pub fn append(&mut self, extra: u64) -> Result<(), LatticeError> {
        let requested = self.len().saturating_add(extra);
        let n = slot_count(extra)?;
        let total = slot_count(requested)?;
        self.slots
            .try_reserve(n)
            .map_err(|_| LatticeError::AllocationFailed { requested })?;
        self.slots.resize(total, Slot::Unvisited);
        Ok(())
    }

    /// Percolate the slots in `start..len()`.
    ///
    /// Each slot in the range is overwritten: visited with probability
    /// `p`, unvisited otherwise. Callers pass only freshly introduced
    /// ranges.
    pub fn percolate_from(&mut self, start: u64, p: f64, rng: &mut dyn RngCore) {
        let start = start.min(self.len()) as usize;
        for slot in &mut self.slots[start..] {
            let was_visited = *slot == Slot::Visited;
            let now_visited = rng.random::<f64>() < p;
            *slot = if now_visited {
                Slot::Visited
            } else {
                Slot::Unvisited
            };
            match (was_visited, now_visited) {
                (false, true) => self.visited += 1,
                (true, false) => self.visited -= 1,
                _ => {}
            }
        }
    }
}
