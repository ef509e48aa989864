//! Closed-form growth sizing shared by the indexing strategies.
//!
//! A *layer* is the minimal radius increment: adding `layers` layers to a
//! (hyper)cube of side `s` yields a cube of side `s + 2 * layers`.

/// Layers added per jump-aware growth, as a multiple of the maximum jump.
pub const JUMP_MARGIN: u64 = 4;

/// Rings appended by a single spiral growth step.
pub const SPIRAL_RINGS_PER_GROWTH: u64 = 2;

/// Number of slots added when growing a `dimension`-cube of side
/// `side_length` by `layers` layers on every face.
///
/// Uses the expanded binomial for dimensions 1 to 3 and the general
/// `(s + 2l)^d - s^d` otherwise. Returns `None` on overflow.
///
/// ```
/// use forage_lattice::geometry::nodes_to_add;
///
/// assert_eq!(nodes_to_add(2, 5, 1), Some(24));
/// assert_eq!(nodes_to_add(1, 9, 3), Some(6));
/// ```
pub fn nodes_to_add(dimension: usize, side_length: u64, layers: u64) -> Option<u64> {
    let s = side_length;
    let l = layers;
    match dimension {
        0 => Some(0),
        1 => l.checked_mul(2),
        2 => {
            let a = s.checked_mul(l)?.checked_mul(4)?;
            let b = l.checked_mul(l)?.checked_mul(4)?;
            a.checked_add(b)
        }
        3 => {
            let a = s.checked_mul(s)?.checked_mul(l)?.checked_mul(6)?;
            let b = s.checked_mul(l)?.checked_mul(l)?.checked_mul(12)?;
            let c = l.checked_mul(l)?.checked_mul(l)?.checked_mul(8)?;
            a.checked_add(b)?.checked_add(c)
        }
        d => {
            let d = u32::try_from(d).ok()?;
            let grown = s.checked_add(l.checked_mul(2)?)?.checked_pow(d)?;
            grown.checked_sub(s.checked_pow(d)?)
        }
    }
}

/// `side_length^dimension`, or `None` on overflow.
pub fn cube_volume(side_length: u64, dimension: usize) -> Option<u64> {
    side_length.checked_pow(u32::try_from(dimension).ok()?)
}

/// Slots appended by one spiral growth step (two full rings).
///
/// Equal to `(s + 4)^2 - s^2`.
pub fn spiral_ring_growth(side_length: u64) -> Option<u64> {
    side_length.checked_mul(8)?.checked_add(16)
}

/// Slots appended when a spiral grows by `layers` rings.
///
/// Equal to `(s + 2l)^2 - s^2`.
pub fn spiral_layer_growth(side_length: u64, layers: u64) -> Option<u64> {
    layers
        .checked_mul(4)?
        .checked_mul(side_length.checked_add(layers)?)
}

/// Layers needed for a cube of side `side_length` to address a site at
/// Chebyshev distance `norm`, rounded up to a multiple of `step`.
///
/// Zero if the site is already inside. `None` on overflow.
///
/// ```
/// use forage_lattice::geometry::layers_to_reach;
///
/// assert_eq!(layers_to_reach(3, 1, 2), Some(0));
/// assert_eq!(layers_to_reach(3, 4, 2), Some(4));
/// assert_eq!(layers_to_reach(3, 5, 2), Some(4));
/// ```
pub fn layers_to_reach(side_length: u64, norm: u64, step: u64) -> Option<u64> {
    let half_width = side_length.saturating_sub(1) / 2;
    let deficit = norm.saturating_sub(half_width);
    let step = step.max(1);
    deficit.div_ceil(step).checked_mul(step)
}

/// Side length of a cube holding `capacity` slots.
///
/// Exact for perfect powers; otherwise an approximation that construction
/// rejects through its volume check.
pub fn side_from_capacity(capacity: u64, dimension: usize) -> u64 {
    match dimension {
        0 => 0,
        1 => capacity,
        2 => capacity.isqrt(),
        d => {
            let guess = (capacity as f64).powf(1.0 / d as f64).round() as u64;
            // Float roots can land one off for large capacities.
            [guess.saturating_sub(1), guess, guess + 1]
                .into_iter()
                .find(|&s| cube_volume(s, d) == Some(capacity))
                .unwrap_or(guess)
        }
    }
}
