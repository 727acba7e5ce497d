//! Node generators.

use mbflow_core::{CellIndex, Vec2};

use crate::array::NodeArray;

/// An axis-aligned rectangle split into `ni × nj` equal cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectangleMesh {
    /// Cells along x.
    pub ni: usize,
    /// Cells along y.
    pub nj: usize,
    /// Lower-left corner.
    pub origin: Vec2,
    /// Width and height.
    pub extent: Vec2,
}

impl RectangleMesh {
    /// Generate node coordinates.
    pub fn nodes(&self) -> NodeArray<Vec2> {
        rectangle_nodes(self.ni, self.nj, self.origin, self.extent)
    }
}

/// Nodes of an axis-aligned rectangle with `ni × nj` equal cells.
pub fn rectangle_nodes(ni: usize, nj: usize, origin: Vec2, extent: Vec2) -> NodeArray<Vec2> {
    let dx = extent[0] / ni as f64;
    let dy = extent[1] / nj as f64;
    nodes_from_fn(ni, nj, |i, j| {
        [origin[0] + dx * i as f64, origin[1] + dy * j as f64]
    })
}

/// Nodes given by an arbitrary `(i, j) -> x` closure over `0..=ni × 0..=nj`.
pub fn nodes_from_fn(ni: usize, nj: usize, f: impl Fn(usize, usize) -> Vec2) -> NodeArray<Vec2> {
    let mut x = NodeArray::new(ni, nj);
    for i in 0..=ni {
        for j in 0..=nj {
            x[CellIndex::new(i as i32, j as i32)] = f(i, j);
        }
    }
    x
}
