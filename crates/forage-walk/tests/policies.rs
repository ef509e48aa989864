use forage_core::{Coord, LatticeError};
use forage_lattice::{construct, Lattice};
use forage_test_utils::fixtures::{percolating_lattice, smallest_lattice};
use forage_test_utils::{seeded_rng, FailingLattice, MockLattice};
use forage_walk::{PowerLaw, WalkPolicy, Walker};

fn walker_for(lattice: &dyn Lattice, handling_time: f64) -> Walker {
    Walker::new(lattice.center(), 1.0, handling_time).unwrap()
}

// ── Time accounting ─────────────────────────────────────────────

#[test]
fn zero_end_time_probes_the_start_once() {
    let mut lattice = MockLattice::new(2);
    let mut walker = walker_for(&lattice, 0.0);
    let outcome = walker
        .walk(&mut lattice, &WalkPolicy::Plain, 0.0, &mut seeded_rng(1))
        .unwrap();
    assert_eq!(outcome.discovered, 1);
    assert_eq!(outcome.steps, 1);
    assert_eq!(lattice.plain_probes, 1);
    assert!(lattice.is_visited(&Coord::origin(2)));
}

#[test]
fn elapsed_time_is_handling_plus_travel() {
    let mut lattice = MockLattice::new(2).with_spacing(2.0);
    let mut walker = Walker::new(lattice.center(), 4.0, 3.0).unwrap();
    let outcome = walker
        .walk(&mut lattice, &WalkPolicy::Plain, 250.0, &mut seeded_rng(2))
        .unwrap();

    let expected = outcome.discovered as f64 * 3.0 + outcome.steps as f64 * 0.5;
    assert!((outcome.elapsed - expected).abs() < 1e-9);
    assert!(outcome.elapsed > 250.0);
    assert_eq!(lattice.plain_probes, outcome.steps);
    assert_eq!(lattice.visited_count(), outcome.discovered);
}

#[test]
fn handling_time_slows_discovery() {
    let run = |handling| {
        let mut lattice = MockLattice::new(1);
        let mut walker = walker_for(&lattice, handling);
        walker
            .walk(&mut lattice, &WalkPolicy::Plain, 500.0, &mut seeded_rng(3))
            .unwrap()
    };
    let fast = run(0.0);
    let slow = run(5.0);
    assert!(slow.steps < fast.steps);
}

// ── Policies ────────────────────────────────────────────────────

#[test]
fn full_drift_walks_a_straight_line() {
    let mut lattice = MockLattice::new(3);
    let mut walker = walker_for(&lattice, 0.0);
    let outcome = walker
        .walk(
            &mut lattice,
            &WalkPolicy::Drift { p_drift: 1.0 },
            99.0,
            &mut seeded_rng(4),
        )
        .unwrap();
    assert_eq!(outcome.steps, 100);
    assert_eq!(outcome.discovered, 100);
    assert_eq!(walker.position(), &Coord::from([100, 0, 0]));
}

#[test]
fn memory_walk_in_one_dimension_never_revisits() {
    let mut lattice = MockLattice::new(1);
    let mut walker = walker_for(&lattice, 0.0);
    let outcome = walker
        .walk(&mut lattice, &WalkPolicy::Memory, 50.0, &mut seeded_rng(5))
        .unwrap();
    assert_eq!(outcome.discovered, outcome.steps);
}

#[test]
fn jump_walk_uses_jump_probes_and_charges_per_site() {
    let law = PowerLaw::new(2, 2, 1.0).unwrap();
    let mut lattice = MockLattice::new(2);
    let mut walker = walker_for(&lattice, 0.0);
    let outcome = walker
        .walk(
            &mut lattice,
            &WalkPolicy::Jumps { sampler: &law },
            40.0,
            &mut seeded_rng(6),
        )
        .unwrap();
    assert_eq!(lattice.jump_probes, outcome.steps);
    assert_eq!(lattice.plain_probes, 0);
    assert!((outcome.elapsed - 2.0 * outcome.steps as f64).abs() < 1e-9);
    // Every jump lands on an even coordinate.
    assert!(walker.position().as_slice().iter().all(|v| v % 2 == 0));
}

#[test]
fn percolation_walk_percolates_once_then_probes_percolating() {
    let mut lattice = MockLattice::new(2);
    let mut walker = walker_for(&lattice, 0.0);
    let outcome = walker
        .walk(&mut lattice, &WalkPolicy::Percolation, 30.0, &mut seeded_rng(7))
        .unwrap();
    assert_eq!(lattice.initial_percolations, 1);
    assert_eq!(lattice.percolating_probes, outcome.steps);
    assert_eq!(lattice.plain_probes, 0);
}

#[test]
fn pre_marked_start_is_not_discovered() {
    let mut lattice = MockLattice::new(1);
    lattice.preset_visited(Coord::origin(1));
    let mut walker = walker_for(&lattice, 0.0);
    let outcome = walker
        .walk(&mut lattice, &WalkPolicy::Plain, 0.0, &mut seeded_rng(8))
        .unwrap();
    assert_eq!(outcome.discovered, 0);
}

// ── Real lattices ───────────────────────────────────────────────

#[test]
fn walks_are_reproducible_from_the_seed() {
    let run = || {
        let mut lattice = construct(2601, 2, 1000.0, 0.0, 1).unwrap();
        let mut walker = walker_for(lattice.as_ref(), 1.0);
        walker
            .walk(
                lattice.as_mut(),
                &WalkPolicy::Plain,
                2_000.0,
                &mut seeded_rng(11),
            )
            .unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn discovered_matches_lattice_visits_in_every_dimension() {
    for dim in 1..=3 {
        let mut lattice = smallest_lattice(dim).unwrap();
        let mut walker = walker_for(lattice.as_ref(), 0.0);
        let mut rng = seeded_rng(dim as u64);
        let outcome = walker
            .walk(lattice.as_mut(), &WalkPolicy::Memory, 5_000.0, &mut rng)
            .unwrap();
        assert_eq!(lattice.visited_count(), outcome.discovered);
        assert!(lattice.capacity() >= 3u64.pow(dim as u32));
    }
}

#[test]
fn long_jumps_grow_real_lattices() {
    let law = PowerLaw::new(1, 5, 1.5).unwrap();
    let mut lattice = construct(27, 3, 100.0, 0.0, 5).unwrap();
    let mut walker = walker_for(lattice.as_ref(), 0.0);
    let outcome = walker
        .walk(
            lattice.as_mut(),
            &WalkPolicy::Jumps { sampler: &law },
            5_000.0,
            &mut seeded_rng(12),
        )
        .unwrap();
    assert!(lattice.capacity() > 27);
    assert_eq!(lattice.visited_count(), outcome.discovered);
    assert!(lattice.peek(walker.position()).unwrap().is_some());
}

#[test]
fn percolated_sites_are_not_counted_as_discoveries() {
    let mut lattice = percolating_lattice(51, 2, 0.5).unwrap();
    let mut walker = walker_for(lattice.as_ref(), 0.0);
    let mut rng = seeded_rng(13);
    let outcome = walker
        .walk(lattice.as_mut(), &WalkPolicy::Percolation, 3_000.0, &mut rng)
        .unwrap();
    assert!(lattice.visited_count() > outcome.discovered);
}

// ── Failure ─────────────────────────────────────────────────────

#[test]
fn lattice_failure_stops_the_walk() {
    let mut lattice = FailingLattice::new(2, 10);
    let mut walker = walker_for(&lattice, 0.0);
    let err = walker
        .walk(&mut lattice, &WalkPolicy::Plain, 1e6, &mut seeded_rng(14))
        .unwrap_err();
    assert!(matches!(err, LatticeError::IndexOverflow { .. }));
    assert!(err.is_fatal());
}
