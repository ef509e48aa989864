//! Lattice trait compliance test helpers.
//!
//! These functions verify that a Lattice implementation satisfies the
//! contract the walk drivers rely on. Reused by the base-conversion and
//! spiral test modules. Every helper expects a lattice with no visited
//! sites and zero percolation probability.

use crate::lattice::Lattice;
use forage_core::{Coord, LatticeError};
use std::collections::HashSet;

/// Every coordinate of the cube `[-k, k]^dim`.
fn cube_coords(dim: usize, k: i64) -> Vec<Coord> {
    let mut out = vec![Coord::origin(dim)];
    for axis in 0..dim {
        out = out
            .into_iter()
            .flat_map(|c| {
                (-k..=k).map(move |v| {
                    let mut c = c.clone();
                    c[axis] = v;
                    c
                })
            })
            .collect();
    }
    out
}

fn half_width(lattice: &dyn Lattice) -> i64 {
    ((lattice.side_length() - 1) / 2) as i64
}

/// Assert that the addressable cube maps one-to-one onto `0..capacity`.
pub fn assert_slots_are_a_bijection(lattice: &dyn Lattice) {
    let coords = cube_coords(lattice.dimension(), half_width(lattice));
    assert_eq!(
        coords.len() as u64,
        lattice.capacity(),
        "addressable cube size != capacity"
    );
    let mut seen = HashSet::new();
    for c in &coords {
        let slot = lattice
            .slot_of(c)
            .unwrap_or_else(|e| panic!("slot_of({c}) failed: {e}"))
            .unwrap_or_else(|| panic!("{c} should be addressable"));
        assert!(slot < lattice.capacity(), "slot {slot} of {c} out of range");
        assert!(seen.insert(slot), "slot {slot} assigned twice");
    }
}

/// Assert that the center is the origin and is addressable.
pub fn assert_center_is_origin(lattice: &dyn Lattice) {
    let center = lattice.center();
    assert_eq!(center, Coord::origin(lattice.dimension()));
    assert!(
        lattice.slot_of(&center).unwrap().is_some(),
        "center must be addressable at construction"
    );
}

/// Assert that coordinates of the wrong arity are rejected without
/// side effects.
pub fn assert_arity_rejected(lattice: &mut dyn Lattice) {
    let dim = lattice.dimension();
    let capacity = lattice.capacity();
    let wrong = Coord::origin(dim + 1);
    let err = lattice.probe_and_mark(&wrong).unwrap_err();
    assert!(
        matches!(err, LatticeError::DimensionMismatch { expected, got } if expected == dim && got == dim + 1),
        "unexpected error {err:?}"
    );
    assert!(!err.is_fatal());
    assert_eq!(lattice.capacity(), capacity);
}

/// Assert that the first probe of a site reports it new and every later
/// probe does not.
pub fn assert_discovery_idempotent(lattice: &mut dyn Lattice) {
    let dim = lattice.dimension();
    let before = lattice.visited_count();
    let mut site = Coord::origin(dim);
    site[dim - 1] = 1;
    assert!(lattice.probe_and_mark(&site).unwrap(), "{site} should be new");
    assert!(!lattice.probe_and_mark(&site).unwrap());
    assert!(!lattice.probe_and_mark_jump(&site).unwrap());
    assert_eq!(lattice.visited_count(), before + 1);
    assert_eq!(lattice.peek(&site).unwrap(), Some(true));
}

/// Assert that growth keeps every visited site visited and every
/// unvisited site unvisited.
pub fn assert_growth_preserves_occupancy(lattice: &mut dyn Lattice) {
    let dim = lattice.dimension();
    let k = half_width(lattice);
    let inside = cube_coords(dim, k);
    // Every third site in canonical order.
    for c in inside.iter().step_by(3) {
        lattice.probe_and_mark(c).unwrap();
    }
    let snapshot: Vec<(Coord, bool)> = inside
        .iter()
        .map(|c| (c.clone(), lattice.peek(c).unwrap().unwrap()))
        .collect();
    let visited = lattice.visited_count();

    let mut far = Coord::origin(dim);
    far[0] = 3 * k + 2;
    let old_capacity = lattice.capacity();
    assert!(lattice.probe_and_mark(&far).unwrap());
    assert!(lattice.capacity() > old_capacity, "probe should have grown");
    assert_eq!(lattice.visited_count(), visited + 1);

    for (c, was) in snapshot {
        assert_eq!(lattice.peek(&c).unwrap(), Some(was), "{c} changed by growth");
    }
}

/// Run all compliance checks on a fresh lattice.
pub fn run_full_compliance(lattice: &mut dyn Lattice) {
    assert_slots_are_a_bijection(lattice);
    assert_center_is_origin(lattice);
    assert_arity_rejected(lattice);
    assert_discovery_idempotent(lattice);
    assert_growth_preserves_occupancy(lattice);
}
