//! Discrete truncated power law for jump lengths.
//!
//! `P(k) = k^-gamma / C` for `k` in `[min, max]`, with
//! `C = Σ_{i=min}^{max} i^-gamma`. Sampling is inverse-CDF over a table of
//! cumulative boundaries built once and shared read-only between runs.

use crate::error::WalkError;
use rand::{Rng, RngCore};

/// Tabulated discrete power-law distribution.
///
/// # Examples
///
/// ```
/// use forage_walk::PowerLaw;
///
/// let law = PowerLaw::new(1, 3, 2.0).unwrap();
/// assert_eq!(law.sample(0.0), 1);
/// assert_eq!(law.sample(0.999), 3);
/// assert!((law.normalization() - 1.361_111).abs() < 1e-6);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PowerLaw {
    min: u64,
    max: u64,
    gamma: f64,
    normalization: f64,
    /// `boundaries[j]` is the probability mass below `min + j`.
    boundaries: Vec<f64>,
}

impl PowerLaw {
    /// Tabulate the distribution over `[min, max]` with exponent `gamma`.
    ///
    /// # Errors
    ///
    /// [`WalkError::InvalidRange`] unless `1 <= min <= max` and the table
    /// can be allocated; [`WalkError::InvalidParameter`] if `gamma` is not
    /// finite.
    pub fn new(min: u64, max: u64, gamma: f64) -> Result<Self, WalkError> {
        let range_err = |reason| WalkError::InvalidRange { min, max, reason };
        if min == 0 {
            return Err(range_err("min must be >= 1"));
        }
        if min > max {
            return Err(range_err("min exceeds max"));
        }
        if !gamma.is_finite() {
            return Err(WalkError::InvalidParameter {
                name: "gamma",
                reason: format!("must be finite, got {gamma}"),
            });
        }
        let len = usize::try_from(max - min)
            .ok()
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| range_err("range too large to tabulate"))?;

        let mut boundaries = Vec::new();
        boundaries
            .try_reserve_exact(len)
            .map_err(|_| range_err("range too large to tabulate"))?;
        let mut cumulative = 0.0;
        for k in min..=max {
            boundaries.push(cumulative);
            cumulative += (k as f64).powf(-gamma);
        }
        let normalization = cumulative;
        for b in &mut boundaries {
            *b /= normalization;
        }

        Ok(Self {
            min,
            max,
            gamma,
            normalization,
            boundaries,
        })
    }

    /// Smallest value the sampler returns.
    pub fn min(&self) -> u64 {
        self.min
    }

    /// Largest value the sampler returns.
    pub fn max(&self) -> u64 {
        self.max
    }

    /// Exponent.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Normalizing constant `C`.
    pub fn normalization(&self) -> f64 {
        self.normalization
    }

    /// Probability of drawing `k`; zero outside `[min, max]`.
    pub fn probability(&self, k: u64) -> f64 {
        if k < self.min || k > self.max {
            return 0.0;
        }
        (k as f64).powf(-self.gamma) / self.normalization
    }

    /// Map a uniform variate `u` in `[0, 1)` to a value in `[min, max]`.
    ///
    /// Returns `min` when `u` is at or below the first positive boundary
    /// and `max` when `u` exceeds the last one.
    pub fn sample(&self, u: f64) -> u64 {
        // Number of boundaries strictly below u.
        let above = self.boundaries.partition_point(|&b| b < u);
        self.min + above.saturating_sub(1) as u64
    }

    /// Draw one value.
    pub fn draw(&self, rng: &mut dyn RngCore) -> u64 {
        self.sample(rng.random::<f64>())
    }
}
