//! Mixed-radix ("base conversion") indexing for 1- to 3-D lattices.
//!
//! The addressable region is the cube `[-k, k]^d` with `k` the offset and
//! radix `r = 2k + 1`. A coordinate maps to
//!
//! ```text
//! index = Σ_d (c[d] + k) · r^d
//! ```
//!
//! evaluated with Horner's rule from the highest axis down. Indices are not
//! stable under a change of `k`, so every growth remaps the occupied slots
//! into the new geometry.

use crate::geometry::{cube_volume, layers_to_reach, nodes_to_add};
use crate::lattice::{Indexing, Lattice, LatticeCore};
use crate::occupancy::{OccupancyStore, SiteState};
use forage_core::{Coord, LatticeError};
use rand::RngCore;
use smallvec::SmallVec;

type Axes = SmallVec<[i64; 4]>;

/// Lattice using mixed-radix indexing.
///
/// # Examples
///
/// ```
/// use forage_core::Coord;
/// use forage_lattice::{Indexing, LatticeConfig};
///
/// let mut lattice = LatticeConfig {
///     indexing: Indexing::BaseConversion,
///     growth_layers: 1,
///     ..LatticeConfig::new(9, 2)
/// }
/// .build()
/// .unwrap();
///
/// let home = Coord::from([1, -1]);
/// assert!(lattice.probe_and_mark(&home).unwrap());
///
/// // Outside [-1, 1]^2: grows to a 5x5 cube and remaps `home`.
/// assert!(lattice.probe_and_mark(&Coord::from([2, 0])).unwrap());
/// assert_eq!(lattice.capacity(), 25);
/// assert!(!lattice.probe_and_mark(&home).unwrap());
/// ```
#[derive(Debug)]
pub struct BaseConversionLattice {
    core: LatticeCore,
    offset: i64,
    growth_layers: u64,
}

fn offset_for(side_length: u64) -> i64 {
    ((side_length - 1) / 2) as i64
}

/// Encode axes under offset `k`. `Ok(None)` if any axis is outside `[-k, k]`.
fn encode(axes: &[i64], k: i64) -> Result<Option<u64>, LatticeError> {
    if axes.iter().any(|&v| v < -k || v > k) {
        return Ok(None);
    }
    let overflow = |detail: &str| LatticeError::IndexOverflow {
        coord: Coord::from_slice(axes),
        detail: detail.to_string(),
    };
    let radix = u64::try_from(k)
        .ok()
        .and_then(|k| k.checked_mul(2))
        .and_then(|r| r.checked_add(1))
        .ok_or_else(|| overflow("radix"))?;
    let mut index: u64 = 0;
    for &v in axes.iter().rev() {
        // v + k is in [0, 2k], so the cast is lossless.
        let digit = (v + k) as u64;
        index = index
            .checked_mul(radix)
            .and_then(|i| i.checked_add(digit))
            .ok_or_else(|| overflow("mixed-radix accumulation"))?;
    }
    Ok(Some(index))
}

/// Decode `index` under offset `k` into `out` (one entry per axis).
fn decode(mut index: u64, k: i64, out: &mut [i64]) {
    let radix = 2 * k as u64 + 1;
    for axis in out.iter_mut() {
        *axis = (index % radix) as i64 - k;
        index /= radix;
    }
}

impl BaseConversionLattice {
    pub(crate) fn from_core(core: LatticeCore, growth_layers: u64) -> Self {
        let offset = offset_for(core.side_length);
        Self {
            core,
            offset,
            growth_layers,
        }
    }

    /// Half-width `k` of the addressable cube: axes span `[-k, k]`.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Grow by `layers` on every face and remap existing occupancy.
    ///
    /// With a random stream, slots that did not exist before growth are
    /// percolated; slots that existed keep their state exactly.
    fn grow(
        &mut self,
        layers: u64,
        rng: Option<&mut (dyn RngCore + '_)>,
    ) -> Result<(), LatticeError> {
        let dim = self.core.dimension;
        let old_side = self.core.side_length;
        let old_capacity = self.core.capacity();
        let geometry_err = |capacity, side_length| LatticeError::GeometryMismatch {
            capacity,
            side_length,
            dimension: dim,
        };

        let added =
            nodes_to_add(dim, old_side, layers).ok_or_else(|| self.overflow("nodes to add"))?;
        let new_capacity = old_capacity
            .checked_add(added)
            .ok_or_else(|| self.overflow("grown capacity"))?;
        let new_side = layers
            .checked_mul(2)
            .and_then(|l| old_side.checked_add(l))
            .filter(|s| *s <= i64::MAX as u64)
            .ok_or_else(|| self.overflow("side length"))?;
        if cube_volume(new_side, dim) != Some(new_capacity) {
            return Err(geometry_err(new_capacity, new_side));
        }

        let old_k = self.offset;
        let new_k = offset_for(new_side);
        let percolating = rng.is_some();
        let mut fresh = OccupancyStore::new(new_capacity)?;
        let mut axes: Axes = SmallVec::from_elem(0, dim);

        // Plain growth only needs the visited slots; percolating growth
        // also records which old slots were unvisited.
        for (index, visited) in self.core.store.iter_states() {
            if !visited && !percolating {
                continue;
            }
            decode(index, old_k, &mut axes);
            let new_index = encode(&axes, new_k)?.ok_or(
                LatticeError::RemapOutOfRange {
                    index,
                    capacity: new_capacity,
                },
            )?;
            fresh.place(new_index, visited)?;
        }
        fresh.settle(self.core.percolation_probability, rng);

        self.core.store = fresh;
        self.core.side_length = new_side;
        self.core.initial_percolated = true;
        self.offset = new_k;

        tracing::debug!(
            indexing = "base_conversion",
            old_capacity,
            new_capacity,
            side_length = new_side,
            layers,
            percolating,
            "lattice grown"
        );
        Ok(())
    }

    fn overflow(&self, detail: &str) -> LatticeError {
        LatticeError::IndexOverflow {
            coord: Coord::origin(self.core.dimension),
            detail: format!("{detail} (side_length {})", self.core.side_length),
        }
    }

    /// Check-and-mark, growing once by the smallest multiple of `step`
    /// layers that reaches `coord`.
    fn probe_with(
        &mut self,
        coord: &Coord,
        step: u64,
        rng: Option<&mut (dyn RngCore + '_)>,
    ) -> Result<bool, LatticeError> {
        self.core.check_arity(coord)?;
        if self.slot_of(coord)?.is_none() {
            let layers = layers_to_reach(self.core.side_length, coord.chebyshev_norm(), step)
                .ok_or_else(|| self.overflow("growth layers"))?;
            self.grow(layers, rng)?;
        }
        let index = self
            .slot_of(coord)?
            .ok_or_else(|| self.overflow("coordinate outside grown lattice"))?;
        Ok(self.core.store.mark(index))
    }
}

impl Lattice for BaseConversionLattice {
    fn indexing(&self) -> Indexing {
        Indexing::BaseConversion
    }

    fn dimension(&self) -> usize {
        self.core.dimension
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
        self.core.check_arity(coord)?;
        encode(coord.as_slice(), self.offset)
    }

    fn site_state(&self, index: u64) -> Option<SiteState> {
        self.core.store.get(index)
    }

    fn percolate_initial(&mut self, rng: &mut dyn RngCore) {
        self.core.percolate_initial(rng);
    }

    fn probe_and_mark(&mut self, coord: &Coord) -> Result<bool, LatticeError> {
        self.probe_with(coord, self.growth_layers, None)
    }

    fn probe_and_mark_percolating(
        &mut self,
        coord: &Coord,
        rng: &mut dyn RngCore,
    ) -> Result<bool, LatticeError> {
        self.probe_with(coord, self.growth_layers, Some(rng))
    }

    fn probe_and_mark_jump(&mut self, coord: &Coord) -> Result<bool, LatticeError> {
        let layers = self.core.jump_layers();
        self.probe_with(coord, layers, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance;
    use crate::config::LatticeConfig;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn lattice(capacity: u64, dimension: usize, layers: u64) -> BaseConversionLattice {
        let config = LatticeConfig {
            indexing: Indexing::BaseConversion,
            growth_layers: layers,
            ..LatticeConfig::new(capacity, dimension)
        };
        config.validate().unwrap();
        let core = LatticeCore {
            dimension,
            spacing: config.spacing(),
            side_length: config.side_length(),
            percolation_probability: config.percolation_probability,
            max_jump_size: config.max_jump_size,
            store: OccupancyStore::new(capacity).unwrap(),
            initial_percolated: false,
        };
        BaseConversionLattice::from_core(core, layers)
    }

    // ── Indexing ────────────────────────────────────────────────

    #[test]
    fn origin_is_the_central_slot() {
        assert_eq!(lattice(11, 1, 1).slot_of(&Coord::from([0])).unwrap(), Some(5));
        assert_eq!(lattice(9, 2, 1).slot_of(&Coord::from([0, 0])).unwrap(), Some(4));
        assert_eq!(
            lattice(27, 3, 1).slot_of(&Coord::from([0, 0, 0])).unwrap(),
            Some(13)
        );
    }

    #[test]
    fn horner_matches_positional_sum() {
        // k = 2, r = 5: (x+2) + 5(y+2) + 25(z+2) = 3 + 0 + 100
        let l = lattice(125, 3, 1);
        let c = Coord::from([1, -2, 2]);
        assert_eq!(l.slot_of(&c).unwrap(), Some(103));
    }

    #[test]
    fn outside_cube_is_none() {
        let l = lattice(9, 2, 1);
        assert_eq!(l.slot_of(&Coord::from([2, 0])).unwrap(), None);
        assert_eq!(l.slot_of(&Coord::from([0, -2])).unwrap(), None);
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let l = lattice(9, 2, 1);
        assert!(matches!(
            l.slot_of(&Coord::from([0, 0, 0])),
            Err(LatticeError::DimensionMismatch {
                expected: 2,
                got: 3
            })
        ));
    }

    #[test]
    fn decode_inverts_encode_in_every_dimension() {
        for (capacity, dim) in [(7u64, 1usize), (49, 2), (343, 3)] {
            let k = offset_for(side_from(capacity, dim));
            let mut axes: Axes = SmallVec::from_elem(0, dim);
            for index in 0..capacity {
                decode(index, k, &mut axes);
                assert_eq!(encode(&axes, k).unwrap(), Some(index));
            }
        }
    }

    fn side_from(capacity: u64, dim: usize) -> u64 {
        crate::geometry::side_from_capacity(capacity, dim)
    }

    // ── Growth ──────────────────────────────────────────────────

    #[test]
    fn growth_adds_closed_form_slots() {
        let mut l = lattice(25, 2, 1);
        l.grow(1, None).unwrap();
        assert_eq!(l.capacity(), 25 + 24);
        assert_eq!(l.side_length(), 7);
        assert_eq!(l.offset(), 3);
    }

    #[test]
    fn growth_remaps_visited_sites() {
        let mut l = lattice(9, 2, 1);
        let visited = [Coord::from([-1, -1]), Coord::from([1, 0]), Coord::from([0, 1])];
        for c in &visited {
            assert!(l.probe_and_mark(c).unwrap());
        }
        l.grow(3, None).unwrap();
        assert_eq!(l.visited_count(), 3);
        for c in &visited {
            assert_eq!(l.peek(c).unwrap(), Some(true));
        }
        assert_eq!(l.peek(&Coord::from([0, 0])).unwrap(), Some(false));
    }

    #[test]
    fn probe_grows_until_addressable() {
        let mut l = lattice(3, 1, 1);
        assert!(l.probe_and_mark(&Coord::from([10])).unwrap());
        assert_eq!(l.side_length(), 21);
        assert!(!l.probe_and_mark(&Coord::from([10])).unwrap());
    }

    #[test]
    fn distant_probe_rounds_up_to_whole_growth_steps() {
        let mut l = lattice(9, 2, 5);
        l.probe_and_mark(&Coord::from([1, 1])).unwrap();
        assert!(l.probe_and_mark(&Coord::from([0, 23])).unwrap());
        // Deficit 22 -> five steps of 5 layers.
        assert_eq!(l.side_length(), 3 + 2 * 25);
        assert_eq!(l.offset(), 26);
        assert_eq!(l.peek(&Coord::from([1, 1])).unwrap(), Some(true));
        assert_eq!(l.visited_count(), 2);
    }

    #[test]
    fn jump_growth_uses_max_jump_margin() {
        let mut l = lattice(9, 2, 100);
        l.core.max_jump_size = 3;
        assert!(l.probe_and_mark_jump(&Coord::from([4, 0])).unwrap());
        // 3 * 4 = 12 layers on each face
        assert_eq!(l.side_length(), 3 + 2 * 12);
        assert_eq!(l.capacity(), 27 * 27);
    }

    #[test]
    fn percolating_growth_never_repercolates_old_unvisited_sites() {
        let mut l = lattice(9, 2, 1);
        l.core.percolation_probability = 1.0;
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(l.probe_and_mark(&Coord::from([0, 0])).unwrap());

        // Force growth: every new slot is percolated (p = 1), old ones kept.
        assert!(!l
            .probe_and_mark_percolating(&Coord::from([2, 2]), &mut rng)
            .unwrap());
        assert_eq!(l.capacity(), 25);
        for x in -1..=1 {
            for y in -1..=1 {
                let expect = x == 0 && y == 0;
                assert_eq!(l.peek(&Coord::from([x, y])).unwrap(), Some(expect));
            }
        }
        // 16 new ring slots + the origin.
        assert_eq!(l.visited_count(), 17);
    }

    #[test]
    fn percolating_growth_with_zero_probability_adds_nothing() {
        let mut l = lattice(27, 3, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        assert!(l
            .probe_and_mark_percolating(&Coord::from([0, 0, 5]), &mut rng)
            .unwrap());
        assert_eq!(l.visited_count(), 1);
    }

    #[test]
    fn growth_overflow_is_fatal() {
        let mut l = lattice(3, 1, 1);
        let err = l.grow(u64::MAX / 2 + 1, None).unwrap_err();
        assert!(matches!(err, LatticeError::IndexOverflow { .. }));
        assert!(err.is_fatal());
        // State untouched.
        assert_eq!(l.capacity(), 3);
        assert_eq!(l.offset(), 1);
    }

    #[test]
    fn compliance_all_dimensions() {
        compliance::run_full_compliance(&mut lattice(5, 1, 2));
        compliance::run_full_compliance(&mut lattice(25, 2, 1));
        compliance::run_full_compliance(&mut lattice(27, 3, 1));
    }

    proptest! {
        #[test]
        fn growth_is_bijective_on_prior_occupancy(
            dim in 1usize..=3,
            layers in 1u64..4,
            sites in prop::collection::vec(prop::collection::vec(-2i64..=2, 3), 0..20),
        ) {
            let capacity = 5u64.pow(dim as u32);
            let mut l = lattice(capacity, dim, layers);
            for s in &sites {
                l.probe_and_mark(&Coord::from_slice(&s[..dim])).unwrap();
            }
            let before: Vec<(Coord, bool)> = (0..capacity)
                .map(|i| {
                    let mut axes: Axes = SmallVec::from_elem(0, dim);
                    decode(i, l.offset(), &mut axes);
                    let c = Coord::from_slice(&axes);
                    let v = l.peek(&c).unwrap().unwrap();
                    (c, v)
                })
                .collect();
            l.grow(layers, None).unwrap();
            for (c, v) in before {
                prop_assert_eq!(l.peek(&c).unwrap(), Some(v));
            }
        }
    }
}
