//! Square-spiral indexing for 2-D lattices.
//!
//! Sites are enumerated outward in square rings around the origin:
//! ring `r` holds the indices `(2r - 1)^2 .. (2r + 1)^2`. The mapping does
//! not depend on the current lattice size, so growth is a pure append and
//! no existing slot ever moves.

use crate::geometry::{
    cube_volume, layers_to_reach, spiral_layer_growth, SPIRAL_RINGS_PER_GROWTH,
};
use crate::lattice::{Indexing, Lattice, LatticeCore};
use crate::occupancy::SiteState;
use forage_core::{Coord, LatticeError};
use rand::RngCore;

/// Spiral index of `(x, y)`.
///
/// ```
/// use forage_lattice::spiral::spiral_index;
///
/// assert_eq!(spiral_index(0, 0), Some(0));
/// assert_eq!(spiral_index(1, 0), Some(1));
/// assert_eq!(spiral_index(1, -1), Some(8));
/// assert_eq!(spiral_index(2, -1), Some(9));
/// ```
///
/// Returns `None` if the index does not fit in a `u64`.
pub fn spiral_index(x: i64, y: i64) -> Option<u64> {
    let (x, y) = (i128::from(x), i128::from(y));
    let xx = x.checked_mul(x)?;
    let yy = y.checked_mul(y)?;
    let p = if yy >= xx {
        let p = yy.checked_mul(4)? - y - x;
        if y < x {
            p - 2 * (y - x)
        } else {
            p
        }
    } else {
        let p = xx.checked_mul(4)? - y - x;
        if y < x {
            p + 2 * (y - x)
        } else {
            p
        }
    };
    u64::try_from(p).ok()
}

/// Lattice using square-spiral indexing (2-D only).
///
/// # Examples
///
/// ```
/// use forage_core::Coord;
/// use forage_lattice::LatticeConfig;
///
/// let mut lattice = LatticeConfig::new(9, 2).build().unwrap();
/// assert!(lattice.probe_and_mark(&Coord::from([1, 1])).unwrap());
///
/// // Two rings appended: 9 + 8*3 + 16 = 49 slots.
/// assert!(lattice.probe_and_mark(&Coord::from([2, 0])).unwrap());
/// assert_eq!(lattice.capacity(), 49);
/// assert!(!lattice.probe_and_mark(&Coord::from([1, 1])).unwrap());
/// ```
#[derive(Debug)]
pub struct SpiralLattice {
    core: LatticeCore,
}

impl SpiralLattice {
    pub(crate) fn from_core(core: LatticeCore) -> Self {
        Self { core }
    }

    fn index_of(&self, coord: &Coord) -> Result<u64, LatticeError> {
        self.core.check_arity(coord)?;
        spiral_index(coord[0], coord[1]).ok_or_else(|| LatticeError::IndexOverflow {
            coord: coord.clone(),
            detail: "spiral index exceeds u64".into(),
        })
    }

    /// Append `layers` rings, percolating them if `rng` is given.
    fn grow(
        &mut self,
        layers: u64,
        rng: Option<&mut (dyn RngCore + '_)>,
    ) -> Result<(), LatticeError> {
        let side = self.core.side_length;
        let overflow = |detail: &str| LatticeError::IndexOverflow {
            coord: Coord::origin(2),
            detail: format!("{detail} (side_length {side})"),
        };
        let added = spiral_layer_growth(side, layers).ok_or_else(|| overflow("spiral growth"))?;
        let old_capacity = self.core.capacity();
        let new_capacity = old_capacity
            .checked_add(added)
            .ok_or_else(|| overflow("grown capacity"))?;
        // Exact side length; equals isqrt(new_capacity) because capacity
        // is always a perfect square.
        let new_side = layers
            .checked_mul(2)
            .and_then(|l| side.checked_add(l))
            .ok_or_else(|| overflow("side length"))?;
        if cube_volume(new_side, 2) != Some(new_capacity) {
            return Err(LatticeError::GeometryMismatch {
                capacity: new_capacity,
                side_length: new_side,
                dimension: 2,
            });
        }

        self.core.store.append(added)?;
        let percolating = rng.is_some();
        if let Some(rng) = rng {
            self.core
                .store
                .percolate_from(old_capacity, self.core.percolation_probability, rng);
        }
        self.core.side_length = new_side;
        self.core.initial_percolated = true;

        tracing::debug!(
            indexing = "spiral",
            old_capacity,
            new_capacity,
            side_length = new_side,
            layers,
            percolating,
            "lattice grown"
        );
        Ok(())
    }

    /// Check-and-mark, growing once by the smallest multiple of `step`
    /// rings that reaches `coord`.
    fn probe_with(
        &mut self,
        coord: &Coord,
        step: u64,
        rng: Option<&mut (dyn RngCore + '_)>,
    ) -> Result<bool, LatticeError> {
        let index = self.index_of(coord)?;
        if index >= self.core.capacity() {
            let layers = layers_to_reach(self.core.side_length, coord.chebyshev_norm(), step)
                .ok_or_else(|| LatticeError::IndexOverflow {
                    coord: coord.clone(),
                    detail: "growth layers exceed u64".into(),
                })?;
            self.grow(layers, rng)?;
        }
        if index >= self.core.capacity() {
            return Err(LatticeError::RemapOutOfRange {
                index,
                capacity: self.core.capacity(),
            });
        }
        Ok(self.core.store.mark(index))
    }
}

impl Lattice for SpiralLattice {
    fn indexing(&self) -> Indexing {
        Indexing::Spiral
    }

    fn dimension(&self) -> usize {
        2
    }

    fn spacing(&self) -> f64 {
        self.core.spacing
    }

    fn capacity(&self) -> u64 {
        self.core.capacity()
    }

    fn side_length(&self) -> u64 {
        self.core.side_length
    }

    fn percolation_probability(&self) -> f64 {
        self.core.percolation_probability
    }

    fn max_jump_size(&self) -> u32 {
        self.core.max_jump_size
    }

    fn visited_count(&self) -> u64 {
        self.core.store.visited_count()
    }

    fn slot_of(&self, coord: &Coord) -> Result<Option<u64>, LatticeError> {
        let index = self.index_of(coord)?;
        Ok((index < self.core.capacity()).then_some(index))
    }

    fn site_state(&self, index: u64) -> Option<SiteState> {
        self.core.store.get(index)
    }

    fn percolate_initial(&mut self, rng: &mut dyn RngCore) {
        self.core.percolate_initial(rng);
    }

    fn probe_and_mark(&mut self, coord: &Coord) -> Result<bool, LatticeError> {
        self.probe_with(coord, SPIRAL_RINGS_PER_GROWTH, None)
    }

    fn probe_and_mark_percolating(
        &mut self,
        coord: &Coord,
        rng: &mut dyn RngCore,
    ) -> Result<bool, LatticeError> {
        self.probe_with(coord, SPIRAL_RINGS_PER_GROWTH, Some(rng))
    }

    fn probe_and_mark_jump(&mut self, coord: &Coord) -> Result<bool, LatticeError> {
        let step = self.core.jump_layers();
        self.probe_with(coord, step, None)
    }
}
