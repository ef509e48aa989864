//! The [`Coord`] value type: a walker's exact lattice position.

use smallvec::SmallVec;
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Sub, SubAssign};

/// A signed integer position on an unbounded lattice.
///
/// The arity equals the lattice dimensionality (1, 2 or 3 for the concrete
/// strategies). Coordinates carry no bounds of their own: whether a
/// position is currently addressable is a property of the lattice, not of
/// the coordinate.
///
/// Inline storage covers up to four axes without heap allocation.
///
/// # Examples
///
/// ```
/// use forage_core::Coord;
///
/// let a = Coord::from([1, -2]);
/// let b = Coord::from([3, 4]);
/// assert_eq!(&a + &b, Coord::from([4, 2]));
/// assert_eq!(Coord::origin(3), Coord::from([0, 0, 0]));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord(SmallVec<[i64; 4]>);

impl Coord {
    /// The all-zero coordinate of the given arity.
    pub fn origin(ndim: usize) -> Self {
        Self(SmallVec::from_elem(0, ndim))
    }

    /// Build a coordinate from a slice of axis values.
    pub fn from_slice(axes: &[i64]) -> Self {
        Self(SmallVec::from_slice(axes))
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// Axis values in order.
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    /// Move `delta` sites along `axis`.
    ///
    /// # Panics
    ///
    /// Panics if `axis >= self.ndim()`.
    pub fn shift(&mut self, axis: usize, delta: i64) {
        self.0[axis] += delta;
    }

    /// Like [`shift`](Self::shift), but returns `None` (leaving `self`
    /// unchanged) on overflow or an out-of-range axis.
    pub fn checked_shift(&mut self, axis: usize, delta: i64) -> Option<()> {
        let v = self.0.get_mut(axis)?;
        *v = v.checked_add(delta)?;
        Some(())
    }

    /// Largest absolute axis value (Chebyshev distance from the origin).
    pub fn chebyshev_norm(&self) -> u64 {
        self.0.iter().map(|v| v.unsigned_abs()).max().unwrap_or(0)
    }

    fn zip_assert(&self, other: &Self) {
        assert_eq!(
            self.ndim(),
            other.ndim(),
            "coordinate arity mismatch: {}D vs {}D",
            self.ndim(),
            other.ndim()
        );
    }
}

impl<const N: usize> From<[i64; N]> for Coord {
    fn from(axes: [i64; N]) -> Self {
        Self::from_slice(&axes)
    }
}

impl From<Vec<i64>> for Coord {
    fn from(axes: Vec<i64>) -> Self {
        Self(SmallVec::from_vec(axes))
    }
}

impl Index<usize> for Coord {
    type Output = i64;

    fn index(&self, axis: usize) -> &i64 {
        &self.0[axis]
    }
}

impl IndexMut<usize> for Coord {
    fn index_mut(&mut self, axis: usize) -> &mut i64 {
        &mut self.0[axis]
    }
}

impl AddAssign<&Coord> for Coord {
    fn add_assign(&mut self, rhs: &Coord) {
        self.zip_assert(rhs);
        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a += b;
        }
    }
}

impl SubAssign<&Coord> for Coord {
    fn sub_assign(&mut self, rhs: &Coord) {
        self.zip_assert(rhs);
        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a -= b;
        }
    }
}

impl Add<&Coord> for &Coord {
    type Output = Coord;

    fn add(self, rhs: &Coord) -> Coord {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Sub<&Coord> for &Coord {
    type Output = Coord;

    fn sub(self, rhs: &Coord) -> Coord {
        let mut out = self.clone();
        out -= rhs;
        out
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(mut self, rhs: Coord) -> Coord {
        self += &rhs;
        self
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(mut self, rhs: Coord) -> Coord {
        self -= &rhs;
        self
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for v in &self.0 {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{v}")?;
            first = false;
        }
        Ok(())
    }
}
