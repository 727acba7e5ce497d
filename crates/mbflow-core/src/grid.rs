//! Grid index algebra for structured 2D blocks.
//!
//! Cells are addressed by signed [`CellIndex`] pairs so that the one-cell
//! halo ring (index `0` and `n + 1`) and the offsets used by coupling
//! arithmetic can be expressed without casts. Faces are named by the
//! [`Axis`] they are normal to and the [`FaceEnd`] of the block they sit on.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Conserved variables `(rho, rho*u, rho*v, rho*E)`.
pub type Conserved = [f64; 4];

/// A 2D vector.
pub type Vec2 = [f64; 2];

/// A 2×2 tensor, row-major: `m[r][c]`.
pub type Mat2 = [[f64; 2]; 2];

// ── Axis / FaceEnd / March ─────────────────────────────────────────

/// Grid-logical direction.
///
/// A face tagged `I` is normal to the i direction, i.e. it separates cells
/// `(i, j)` and `(i + 1, j)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// The i direction (first index).
    I,
    /// The j direction (second index).
    J,
}

impl Axis {
    /// Both axes, i first.
    pub const ALL: [Axis; 2] = [Axis::I, Axis::J];

    /// Component index of this axis in a [`Vec2`] (`0` for I, `1` for J).
    pub fn index(self) -> usize {
        match self {
            Axis::I => 0,
            Axis::J => 1,
        }
    }

    /// The other axis.
    pub fn other(self) -> Axis {
        match self {
            Axis::I => Axis::J,
            Axis::J => Axis::I,
        }
    }

    /// Unit step along this axis.
    pub fn unit(self) -> CellIndex {
        match self {
            Axis::I => CellIndex::new(1, 0),
            Axis::J => CellIndex::new(0, 1),
        }
    }

    /// Decode the raw `0 = I, 1 = J` encoding.
    pub fn from_code(code: i32) -> Option<Axis> {
        match code {
            0 => Some(Axis::I),
            1 => Some(Axis::J),
            _ => None,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::I => write!(f, "i"),
            Axis::J => write!(f, "j"),
        }
    }
}

/// Which end of the block a face lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FaceEnd {
    /// The low-index side (`i = 0` or `j = 0` halo).
    Start,
    /// The high-index side (`i = ni + 1` or `j = nj + 1` halo).
    End,
}

impl FaceEnd {
    /// Decode the raw `0 = Start, 1 = End` encoding.
    pub fn from_code(code: i32) -> Option<FaceEnd> {
        match code {
            0 => Some(FaceEnd::Start),
            1 => Some(FaceEnd::End),
            _ => None,
        }
    }
}

impl fmt::Display for FaceEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceEnd::Start => write!(f, "start"),
            FaceEnd::End => write!(f, "end"),
        }
    }
}

/// Direction in which a coupling walks along its face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum March {
    /// Increasing index.
    Forward,
    /// Decreasing index.
    Backward,
}

impl March {
    /// `+1` or `-1`.
    pub fn sign(self) -> i32 {
        match self {
            March::Forward => 1,
            March::Backward => -1,
        }
    }

    /// Decode the raw `+1 / -1` encoding.
    pub fn from_sign(sign: i32) -> Option<March> {
        match sign {
            1 => Some(March::Forward),
            -1 => Some(March::Backward),
            _ => None,
        }
    }
}

// ── CellIndex ──────────────────────────────────────────────────────

/// A signed `(i, j)` cell position in halo-inclusive block coordinates.
///
/// Real cells occupy `1..=ni × 1..=nj`; the halo ring is `0` and `n + 1`.
/// The same type addresses faces (by their owning low-side cell) and is
/// used for offsets, hence the vector-like operators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellIndex {
    /// Index along i.
    pub i: i32,
    /// Index along j.
    pub j: i32,
}

impl CellIndex {
    /// Construct from components.
    pub const fn new(i: i32, j: i32) -> Self {
        Self { i, j }
    }

    /// The zero offset.
    pub const ZERO: CellIndex = CellIndex::new(0, 0);

    /// Component along `axis`.
    pub fn along(self, axis: Axis) -> i32 {
        match axis {
            Axis::I => self.i,
            Axis::J => self.j,
        }
    }

    /// Whether this is a real (non-halo) cell of an `ni × nj` block.
    pub fn is_interior(self, ni: usize, nj: usize) -> bool {
        self.i >= 1 && self.j >= 1 && self.i as i64 <= ni as i64 && self.j as i64 <= nj as i64
    }

    /// Whether this lies in the halo-inclusive `(ni + 2) × (nj + 2)` range.
    pub fn in_halo_range(self, ni: usize, nj: usize) -> bool {
        self.i >= 0 && self.j >= 0 && self.i as i64 <= ni as i64 + 1 && self.j as i64 <= nj as i64 + 1
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

impl From<(i32, i32)> for CellIndex {
    fn from((i, j): (i32, i32)) -> Self {
        Self::new(i, j)
    }
}

impl Add for CellIndex {
    type Output = CellIndex;
    fn add(self, rhs: CellIndex) -> CellIndex {
        CellIndex::new(self.i + rhs.i, self.j + rhs.j)
    }
}

impl Sub for CellIndex {
    type Output = CellIndex;
    fn sub(self, rhs: CellIndex) -> CellIndex {
        CellIndex::new(self.i - rhs.i, self.j - rhs.j)
    }
}

impl Neg for CellIndex {
    type Output = CellIndex;
    fn neg(self) -> CellIndex {
        CellIndex::new(-self.i, -self.j)
    }
}

impl Mul<i32> for CellIndex {
    type Output = CellIndex;
    fn mul(self, rhs: i32) -> CellIndex {
        CellIndex::new(self.i * rhs, self.j * rhs)
    }
}

// ── Face offsets ───────────────────────────────────────────────────

/// Step from a real edge cell to the halo cell across the `(face, end)` face.
pub fn outward_step(face: Axis, end: FaceEnd) -> CellIndex {
    match end {
        FaceEnd::Start => -face.unit(),
        FaceEnd::End => face.unit(),
    }
}

/// Offset from a real edge cell to the index of its boundary face.
///
/// Face `(i, j)` along `I` separates cells `(i, j)` and `(i + 1, j)`, so the
/// end face of cell `c` shares its index while the start face sits one step
/// back along the face axis.
pub fn boundary_face_offset(face: Axis, end: FaceEnd) -> CellIndex {
    match end {
        FaceEnd::Start => -face.unit(),
        FaceEnd::End => CellIndex::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn axis_helpers() {
        assert_eq!(Axis::I.other(), Axis::J);
        assert_eq!(Axis::J.index(), 1);
        assert_eq!(Axis::J.unit(), CellIndex::new(0, 1));
        assert_eq!(Axis::from_code(2), None);
    }

    #[test]
    fn march_round_trips_sign() {
        assert_eq!(March::from_sign(March::Backward.sign()), Some(March::Backward));
        assert_eq!(March::from_sign(0), None);
    }

    #[test]
    fn interior_excludes_halo_ring() {
        assert!(CellIndex::new(1, 1).is_interior(4, 3));
        assert!(CellIndex::new(4, 3).is_interior(4, 3));
        assert!(!CellIndex::new(0, 2).is_interior(4, 3));
        assert!(!CellIndex::new(5, 2).is_interior(4, 3));
        assert!(CellIndex::new(5, 4).in_halo_range(4, 3));
        assert!(!CellIndex::new(-1, 0).in_halo_range(4, 3));
    }

    #[test]
    fn face_offsets_point_outwards() {
        assert_eq!(outward_step(Axis::I, FaceEnd::Start), CellIndex::new(-1, 0));
        assert_eq!(outward_step(Axis::J, FaceEnd::End), CellIndex::new(0, 1));
        assert_eq!(boundary_face_offset(Axis::J, FaceEnd::Start), CellIndex::new(0, -1));
        assert_eq!(boundary_face_offset(Axis::I, FaceEnd::End), CellIndex::ZERO);
    }

    proptest! {
        #[test]
        fn offset_arithmetic_is_linear(i in -50i32..50, j in -50i32..50, k in -20i32..20) {
            let a = CellIndex::new(i, j);
            let d = CellIndex::new(1, -1);
            prop_assert_eq!((a + d * k) - d * k, a);
            prop_assert_eq!(a + (-a), CellIndex::ZERO);
        }
    }
}
