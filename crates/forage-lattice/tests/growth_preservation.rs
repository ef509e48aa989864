use forage_core::Coord;
use forage_lattice::Lattice;
use forage_test_utils::fixtures::{base_conversion_lattice, smallest_lattice, spiral_lattice};

fn probe_far_and_recheck(lattice: &mut dyn Lattice) {
    let dim = lattice.dimension();
    let mut visited = Coord::origin(dim);
    visited[0] = -1;
    let mut untouched = Coord::origin(dim);
    untouched[dim - 1] = 1;

    assert!(lattice.probe_and_mark(&visited).unwrap());
    let before = lattice.capacity();

    let mut far = Coord::origin(dim);
    far[dim - 1] = -40;
    assert!(lattice.probe_and_mark(&far).unwrap());
    assert!(lattice.capacity() > before);

    assert!(!lattice.probe_and_mark(&visited).unwrap());
    assert!(lattice.probe_and_mark(&untouched).unwrap());
    assert_eq!(lattice.visited_count(), 3);
}

#[test]
fn growth_preserves_occupancy_for_every_auto_strategy() {
    for dim in 1..=3 {
        let mut lattice = smallest_lattice(dim).unwrap();
        probe_far_and_recheck(lattice.as_mut());
    }
}

#[test]
fn growth_preserves_occupancy_for_forced_base_conversion_in_2d() {
    let mut lattice = base_conversion_lattice(3, 2, 2).unwrap();
    probe_far_and_recheck(lattice.as_mut());
}

#[test]
fn spiral_growth_is_append_only() {
    let mut lattice = spiral_lattice(3).unwrap();
    for c in [[0, 0], [1, 1], [-1, 0]] {
        lattice.probe_and_mark(&Coord::from(c)).unwrap();
    }
    let before: Vec<_> = (0..9).map(|i| lattice.site_state(i)).collect();

    lattice.probe_and_mark(&Coord::from([0, 2])).unwrap();
    assert_eq!(lattice.capacity(), 9 + 8 * 3 + 16);
    let after: Vec<_> = (0..9).map(|i| lattice.site_state(i)).collect();
    assert_eq!(before, after);
}

#[test]
fn base_conversion_growth_adds_closed_form_count() {
    // side 5, one layer in 2-D: 4*5*1 + 4*1*1 = 24
    let mut lattice = base_conversion_lattice(5, 2, 1).unwrap();
    lattice.probe_and_mark(&Coord::from([3, 0])).unwrap();
    assert_eq!(lattice.capacity(), 25 + 24);
}

#[test]
fn a_long_excursion_keeps_every_site() {
    let mut lattice = smallest_lattice(2).unwrap();
    let path: Vec<Coord> = (0..200).map(|i| Coord::from([i, -i / 2])).collect();
    for c in &path {
        assert!(lattice.probe_and_mark(c).unwrap());
    }
    for c in &path {
        assert_eq!(lattice.peek(c).unwrap(), Some(true), "{c} lost");
    }
    assert_eq!(lattice.visited_count(), 200);
}

#[test]
fn jump_growth_reaches_distant_sites_in_one_call() {
    let mut lattice = base_conversion_lattice(3, 3, 1).unwrap();
    assert!(lattice.probe_and_mark_jump(&Coord::from([0, 0, 4])).unwrap());
    // max_jump_size 1: 4 layers per growth
    assert_eq!(lattice.side_length(), 3 + 8);
}
