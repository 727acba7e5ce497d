//! Dense 2D arrays addressed by [`CellIndex`].
//!
//! Three layouts cover everything a block stores:
//!
//! - [`NodeArray`]: `(ni + 1) × (nj + 1)` grid nodes, indexed `0..=ni`.
//! - [`CellArray`]: `(ni + 2) × (nj + 2)` cells including the halo ring,
//!   indexed `0..=ni + 1`.
//! - [`FaceArray`]: `(ni + 1) × (nj + 1) × 2` faces. Face `(c, Axis::I)`
//!   separates cells `c` and `c + (1, 0)`; face `(c, Axis::J)` separates
//!   `c` and `c + (0, 1)`.
//!
//! All storage is row-major in i. Out-of-range indexing panics like slice
//! indexing does; use `get` for a checked lookup.

use std::ops::{Index, IndexMut};

use mbflow_core::{Axis, CellIndex};

fn flat(c: CellIndex, extent_i: usize, extent_j: usize) -> Option<usize> {
    if c.i < 0 || c.j < 0 {
        return None;
    }
    let (i, j) = (c.i as usize, c.j as usize);
    if i >= extent_i || j >= extent_j {
        return None;
    }
    Some(i * extent_j + j)
}

// ── NodeArray ──────────────────────────────────────────────────────

/// Per-node storage for an `ni × nj` block.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeArray<T> {
    ni: usize,
    nj: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> NodeArray<T> {
    /// Default-filled node array.
    pub fn new(ni: usize, nj: usize) -> Self {
        Self {
            ni,
            nj,
            data: vec![T::default(); (ni + 1) * (nj + 1)],
        }
    }
}

impl<T> NodeArray<T> {
    /// Cell counts `(ni, nj)` of the block the nodes bound.
    pub fn dims(&self) -> (usize, usize) {
        (self.ni, self.nj)
    }

    /// Checked lookup.
    pub fn get(&self, c: CellIndex) -> Option<&T> {
        flat(c, self.ni + 1, self.nj + 1).map(|k| &self.data[k])
    }
}

impl<T> Index<CellIndex> for NodeArray<T> {
    type Output = T;
    fn index(&self, c: CellIndex) -> &T {
        match flat(c, self.ni + 1, self.nj + 1) {
            Some(k) => &self.data[k],
            None => panic!("node {c} outside {}x{} block", self.ni, self.nj),
        }
    }
}

impl<T> IndexMut<CellIndex> for NodeArray<T> {
    fn index_mut(&mut self, c: CellIndex) -> &mut T {
        match flat(c, self.ni + 1, self.nj + 1) {
            Some(k) => &mut self.data[k],
            None => panic!("node {c} outside {}x{} block", self.ni, self.nj),
        }
    }
}

// ── CellArray ──────────────────────────────────────────────────────

/// Per-cell storage including the one-cell halo ring.
#[derive(Clone, Debug, PartialEq)]
pub struct CellArray<T> {
    ni: usize,
    nj: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> CellArray<T> {
    /// Default-filled cell array.
    pub fn new(ni: usize, nj: usize) -> Self {
        Self::filled(ni, nj, T::default())
    }

    /// Cell array with every cell (halo included) set to `value`.
    pub fn filled(ni: usize, nj: usize, value: T) -> Self {
        Self {
            ni,
            nj,
            data: vec![value; (ni + 2) * (nj + 2)],
        }
    }

    /// Overwrite every cell, halo included.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Copy all values from another array of the same shape.
    pub fn copy_from(&mut self, other: &CellArray<T>) {
        assert_eq!(self.dims(), other.dims(), "cell array shape mismatch");
        self.data.copy_from_slice(&other.data);
    }
}

impl<T> CellArray<T> {
    /// Real cell counts `(ni, nj)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.ni, self.nj)
    }

    /// Checked lookup.
    pub fn get(&self, c: CellIndex) -> Option<&T> {
        flat(c, self.ni + 2, self.nj + 2).map(|k| &self.data[k])
    }

    /// Raw storage, halo included.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> Index<CellIndex> for CellArray<T> {
    type Output = T;
    fn index(&self, c: CellIndex) -> &T {
        match flat(c, self.ni + 2, self.nj + 2) {
            Some(k) => &self.data[k],
            None => panic!("cell {c} outside {}x{} block halo", self.ni, self.nj),
        }
    }
}

impl<T> IndexMut<CellIndex> for CellArray<T> {
    fn index_mut(&mut self, c: CellIndex) -> &mut T {
        match flat(c, self.ni + 2, self.nj + 2) {
            Some(k) => &mut self.data[k],
            None => panic!("cell {c} outside {}x{} block halo", self.ni, self.nj),
        }
    }
}

// ── FaceArray ──────────────────────────────────────────────────────

/// Per-face storage, one slot per `(face index, axis)`.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceArray<T> {
    ni: usize,
    nj: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> FaceArray<T> {
    /// Default-filled face array.
    pub fn new(ni: usize, nj: usize) -> Self {
        Self {
            ni,
            nj,
            data: vec![T::default(); (ni + 1) * (nj + 1) * 2],
        }
    }

    /// Overwrite every face.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T> FaceArray<T> {
    /// Real cell counts `(ni, nj)` of the owning block.
    pub fn dims(&self) -> (usize, usize) {
        (self.ni, self.nj)
    }

    fn slot(&self, c: CellIndex, axis: Axis) -> Option<usize> {
        flat(c, self.ni + 1, self.nj + 1).map(|k| k * 2 + axis.index())
    }

    /// Checked lookup.
    pub fn get(&self, c: CellIndex, axis: Axis) -> Option<&T> {
        self.slot(c, axis).map(|k| &self.data[k])
    }
}

impl<T> Index<(CellIndex, Axis)> for FaceArray<T> {
    type Output = T;
    fn index(&self, (c, axis): (CellIndex, Axis)) -> &T {
        match self.slot(c, axis) {
            Some(k) => &self.data[k],
            None => panic!("face {c}/{axis} outside {}x{} block", self.ni, self.nj),
        }
    }
}

impl<T> IndexMut<(CellIndex, Axis)> for FaceArray<T> {
    fn index_mut(&mut self, (c, axis): (CellIndex, Axis)) -> &mut T {
        match self.slot(c, axis) {
            Some(k) => &mut self.data[k],
            None => panic!("face {c}/{axis} outside {}x{} block", self.ni, self.nj),
        }
    }
}

// ── Ranges ─────────────────────────────────────────────────────────

/// Real cells `1..=ni × 1..=nj`, i-major.
pub fn interior_cells(ni: usize, nj: usize) -> impl Iterator<Item = CellIndex> {
    (1..=ni as i32).flat_map(move |i| (1..=nj as i32).map(move |j| CellIndex::new(i, j)))
}

/// Every cell including the halo ring, i-major.
pub fn all_cells(ni: usize, nj: usize) -> impl Iterator<Item = CellIndex> {
    (0..=ni as i32 + 1).flat_map(move |i| (0..=nj as i32 + 1).map(move |j| CellIndex::new(i, j)))
}

/// Faces that bound at least one real cell along `axis`, boundary faces
/// included: `0..=ni × 1..=nj` for I, `1..=ni × 0..=nj` for J.
pub fn faces(ni: usize, nj: usize, axis: Axis) -> impl Iterator<Item = CellIndex> {
    let (i0, j0) = match axis {
        Axis::I => (0, 1),
        Axis::J => (1, 0),
    };
    (i0..=ni as i32).flat_map(move |i| (j0..=nj as i32).map(move |j| CellIndex::new(i, j)))
}

/// Faces strictly between two real cells along `axis`.
pub fn interior_faces(ni: usize, nj: usize, axis: Axis) -> impl Iterator<Item = CellIndex> {
    let (i_hi, j_hi) = match axis {
        Axis::I => (ni as i32 - 1, nj as i32),
        Axis::J => (ni as i32, nj as i32 - 1),
    };
    (1..=i_hi).flat_map(move |i| (1..=j_hi).map(move |j| CellIndex::new(i, j)))
}
