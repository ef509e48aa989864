//! The walker and the timed walk loop.

use crate::error::WalkError;
use crate::policy::{Move, WalkPolicy};
use forage_core::{Coord, LatticeError};
use forage_lattice::Lattice;
use rand::{Rng, RngCore};

/// Uniform axis, then uniform direction.
fn unit_move(dimension: usize, rng: &mut dyn RngCore) -> Move {
    let axis = rng.random_range(0..dimension);
    Move::unit(axis, rng.random::<bool>())
}

/// Result of one walk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WalkOutcome {
    /// Sites found new, including the starting site.
    pub discovered: u64,
    /// Moves taken.
    pub steps: u64,
    /// Simulated time when the walk stopped (first value past `end_time`).
    pub elapsed: f64,
}

/// A forager moving on a lattice.
///
/// Travelling one site costs `spacing / speed` time units; finding a new
/// site costs an extra `handling_time`.
#[derive(Clone, Debug)]
pub struct Walker {
    position: Coord,
    speed: f64,
    handling_time: f64,
    last_move: Option<Move>,
}

impl Walker {
    /// Create a walker at `start`.
    ///
    /// # Errors
    ///
    /// [`WalkError::InvalidParameter`] if `speed` is not finite and
    /// positive, or `handling_time` is not finite and non-negative.
    pub fn new(start: Coord, speed: f64, handling_time: f64) -> Result<Self, WalkError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(WalkError::InvalidParameter {
                name: "speed",
                reason: format!("must be finite and > 0, got {speed}"),
            });
        }
        if !handling_time.is_finite() || handling_time < 0.0 {
            return Err(WalkError::InvalidParameter {
                name: "handling_time",
                reason: format!("must be finite and >= 0, got {handling_time}"),
            });
        }
        Ok(Self {
            position: start,
            speed,
            handling_time,
            last_move: None,
        })
    }

    /// Current site.
    pub fn position(&self) -> &Coord {
        &self.position
    }

    /// Sites per time unit, scaled by spacing.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Time spent on each newly found site.
    pub fn handling_time(&self) -> f64 {
        self.handling_time
    }

    /// Time to travel one site on a lattice with the given spacing.
    pub fn step_time(&self, spacing: f64) -> f64 {
        spacing / self.speed
    }

    /// Apply a move to the position.
    pub fn apply(&mut self, mv: Move) -> Result<(), LatticeError> {
        self.position
            .checked_shift(mv.axis, mv.delta())
            .ok_or_else(|| LatticeError::IndexOverflow {
                coord: self.position.clone(),
                detail: format!("walker cannot move {} along axis {}", mv.delta(), mv.axis),
            })?;
        self.last_move = Some(mv);
        Ok(())
    }

    fn choose_move(
        &self,
        policy: &WalkPolicy<'_>,
        dimension: usize,
        rng: &mut dyn RngCore,
    ) -> Move {
        match *policy {
            WalkPolicy::Plain | WalkPolicy::Percolation => unit_move(dimension, rng),
            WalkPolicy::Drift { p_drift } => {
                let mv = unit_move(dimension, rng);
                if rng.random::<f64>() < p_drift {
                    Move::unit(0, true)
                } else {
                    mv
                }
            }
            WalkPolicy::Memory => loop {
                let mv = unit_move(dimension, rng);
                match self.last_move {
                    Some(prev) if prev.reverses(&mv) => continue,
                    _ => break mv,
                }
            },
            WalkPolicy::Jumps { sampler } => {
                let mv = unit_move(dimension, rng);
                Move {
                    distance: sampler.draw(rng),
                    ..mv
                }
            }
        }
    }

    fn probe(
        &self,
        lattice: &mut dyn Lattice,
        policy: &WalkPolicy<'_>,
        rng: &mut dyn RngCore,
    ) -> Result<bool, LatticeError> {
        match policy {
            WalkPolicy::Jumps { .. } => lattice.probe_and_mark_jump(&self.position),
            WalkPolicy::Percolation => lattice.probe_and_mark_percolating(&self.position, rng),
            _ => lattice.probe_and_mark(&self.position),
        }
    }

    /// Walk until simulated time passes `end_time`.
    ///
    /// Each iteration probes the current site (charging `handling_time`
    /// if it is new), then moves and charges the travel time. The
    /// percolation policy percolates the lattice's initial region first.
    ///
    /// `end_time` must be finite; the caller validates it.
    ///
    /// # Errors
    ///
    /// Any [`LatticeError`] from a probe, or
    /// [`LatticeError::IndexOverflow`] if the position leaves `i64`. The
    /// walk stops at the first error.
    pub fn walk(
        &mut self,
        lattice: &mut dyn Lattice,
        policy: &WalkPolicy<'_>,
        end_time: f64,
        rng: &mut dyn RngCore,
    ) -> Result<WalkOutcome, LatticeError> {
        if let WalkPolicy::Percolation = policy {
            lattice.percolate_initial(rng);
        }
        let dimension = lattice.dimension();
        let dt = self.step_time(lattice.spacing());

        let mut outcome = WalkOutcome {
            discovered: 0,
            steps: 0,
            elapsed: 0.0,
        };
        while outcome.elapsed <= end_time {
            if self.probe(lattice, policy, rng)? {
                outcome.discovered += 1;
                outcome.elapsed += self.handling_time;
            }
            let mv = self.choose_move(policy, dimension, rng);
            self.apply(mv)?;
            outcome.steps += 1;
            outcome.elapsed += dt * mv.distance as f64;
        }

        tracing::trace!(
            policy = policy.name(),
            discovered = outcome.discovered,
            steps = outcome.steps,
            capacity = lattice.capacity(),
            "walk finished"
        );
        Ok(outcome)
    }
}
