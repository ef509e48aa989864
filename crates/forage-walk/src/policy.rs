//! Movement rules for a walk.

use crate::power_law::PowerLaw;
use std::fmt;

/// One lattice move: `distance` sites along `axis`, forward (`+`) or back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    /// Axis index in `[0, dimension)`.
    pub axis: usize,
    /// `true` for the positive direction.
    pub forward: bool,
    /// Sites travelled; 1 except for jumps.
    pub distance: u64,
}

impl Move {
    /// Unit move.
    pub fn unit(axis: usize, forward: bool) -> Self {
        Self {
            axis,
            forward,
            distance: 1,
        }
    }

    /// Signed displacement along `axis`.
    pub fn delta(&self) -> i64 {
        let d = i64::try_from(self.distance).unwrap_or(i64::MAX);
        if self.forward {
            d
        } else {
            -d
        }
    }

    /// Whether `other` undoes this move's direction on the same axis.
    pub fn reverses(&self, other: &Move) -> bool {
        self.axis == other.axis && self.forward != other.forward
    }
}

/// How the walker chooses its next move and probes the lattice.
///
/// | Policy | Move | Probe |
/// |--------|------|-------|
/// | `Plain` | uniform unit step | plain |
/// | `Drift` | unit step; `+1` on axis 0 with probability `p_drift` | plain |
/// | `Memory` | uniform unit step, never an immediate reversal | plain |
/// | `Jumps` | power-law length on a uniform axis | jump-aware |
/// | `Percolation` | uniform unit step | percolating |
#[derive(Clone, Copy, Debug)]
pub enum WalkPolicy<'a> {
    /// Simple random walk.
    Plain,
    /// Random walk biased toward `+` on the first axis.
    Drift {
        /// Probability in `[0, 1]` of taking the drift step.
        p_drift: f64,
    },
    /// Random walk that never immediately backtracks.
    Memory,
    /// Lévy-style walk with power-law jump lengths.
    Jumps {
        /// Shared jump-length table.
        sampler: &'a PowerLaw,
    },
    /// Random walk on a percolated lattice.
    Percolation,
}

impl WalkPolicy<'_> {
    /// Short lowercase name, used in logs and file names.
    pub fn name(&self) -> &'static str {
        match self {
            WalkPolicy::Plain => "plain",
            WalkPolicy::Drift { .. } => "drift",
            WalkPolicy::Memory => "memory",
            WalkPolicy::Jumps { .. } => "jumps",
            WalkPolicy::Percolation => "percolation",
        }
    }
}

impl fmt::Display for WalkPolicy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
