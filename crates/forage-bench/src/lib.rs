//! Benchmark profiles and utilities for the Forage simulator.
//!
//! - [`reference_config`]: a small 2-D sweep, cheap enough to run per commit
//! - [`stress_config`]: long 3-D walks that force repeated remaps
//! - [`scatter_coords`]: deterministic probe coordinates

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use forage_core::Coord;
use forage_engine::{Perturbation, SimConfig};

/// Reference batch: 2-D, four densities, 8 runs each.
pub fn reference_config(seed: u64, perturbation: Perturbation) -> SimConfig {
    SimConfig {
        n_sims: 8,
        workers: Some(1),
        dimension: 2,
        end_time: 5_000.0,
        handling_time: 1.0,
        p_drift: 0.1,
        power_law_xmax: 20.0,
        p_perco: 0.05,
        densities: vec![400, 2_500, 10_000, 40_000],
        perturbation,
        seed,
        ..SimConfig::default()
    }
}

/// Stress batch: 3-D, dense prey, long walks.
///
/// Uses a small initial capacity so base-conversion growth and remap
/// dominate.
pub fn stress_config(seed: u64) -> SimConfig {
    let mut config = SimConfig {
        n_sims: 4,
        workers: None,
        dimension: 3,
        end_time: 50_000.0,
        densities: vec![1_000_000],
        seed,
        ..SimConfig::default()
    };
    config.initial_capacities.three_d = 21 * 21 * 21;
    config
}

/// `n` pseudo-random coordinates with every axis in `[-radius, radius]`.
///
/// A multiplicative hash of `(seed, i, axis)`; no RNG state.
pub fn scatter_coords(dimension: usize, n: usize, radius: i64, seed: u64) -> Vec<Coord> {
    let width = (2 * radius + 1) as u64;
    (0..n as u64)
        .map(|i| {
            let axes: Vec<i64> = (0..dimension as u64)
                .map(|axis| {
                    let h = (seed ^ (i << 8) ^ axis)
                        .wrapping_mul(6364136223846793005)
                        .rotate_right(29);
                    (h % width) as i64 - radius
                })
                .collect();
            Coord::from(axes)
        })
        .collect()
}
