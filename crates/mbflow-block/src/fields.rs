//! The per-block field bundle.

use mbflow_core::{CellIndex, Conserved, Mat2, Vec2};

use crate::array::{interior_cells, CellArray, FaceArray, NodeArray};

/// Every quantity a block stores that another block may read or write.
///
/// The inter-block synchronizer copies between these fields; solvers keep
/// private scratch (e.g. RK stage copies) elsewhere. The viscous fields are
/// always allocated so that transfers never branch on physics.
#[derive(Clone, Debug)]
pub struct BlockFields {
    /// Real cells along i.
    pub ni: usize,
    /// Real cells along j.
    pub nj: usize,
    /// Node coordinates.
    pub x: NodeArray<Vec2>,
    /// Cell centres.
    pub xc: CellArray<Vec2>,
    /// Cell areas.
    pub elem_area: CellArray<f64>,
    /// Distances between opposite face midpoints, `[along i, along j]`.
    pub elem_width: CellArray<Vec2>,
    /// Face normals scaled by face length, pointing towards increasing index.
    pub vec_surf: FaceArray<Vec2>,
    /// Conserved state.
    pub q: CellArray<Conserved>,
    /// Accumulated net outflow for the current RK sub-stage.
    pub flux: CellArray<Conserved>,
    /// Cell-centre velocity.
    pub v_c: CellArray<Vec2>,
    /// Cell-centre temperature.
    pub temp_c: CellArray<f64>,
    /// Face velocity.
    pub v_surf: FaceArray<Vec2>,
    /// Face temperature.
    pub temp_surf: FaceArray<f64>,
    /// Cell-centre velocity gradient, `g[r][c] = d v_r / d x_c`.
    pub gradient_v_c: CellArray<Mat2>,
    /// Cell-centre temperature gradient.
    pub gradient_temp_c: CellArray<Vec2>,
    /// Face velocity gradient.
    pub gradient_v_surf: FaceArray<Mat2>,
    /// Face temperature gradient.
    pub gradient_temp_surf: FaceArray<Vec2>,
}

impl BlockFields {
    /// Zeroed fields for an `ni × nj` block.
    pub fn new(ni: usize, nj: usize) -> Self {
        Self {
            ni,
            nj,
            x: NodeArray::new(ni, nj),
            xc: CellArray::new(ni, nj),
            elem_area: CellArray::new(ni, nj),
            elem_width: CellArray::new(ni, nj),
            vec_surf: FaceArray::new(ni, nj),
            q: CellArray::new(ni, nj),
            flux: CellArray::new(ni, nj),
            v_c: CellArray::new(ni, nj),
            temp_c: CellArray::new(ni, nj),
            v_surf: FaceArray::new(ni, nj),
            temp_surf: FaceArray::new(ni, nj),
            gradient_v_c: CellArray::new(ni, nj),
            gradient_temp_c: CellArray::new(ni, nj),
            gradient_v_surf: FaceArray::new(ni, nj),
            gradient_temp_surf: FaceArray::new(ni, nj),
        }
    }

    /// Fields for the block bounded by `x`.
    pub fn with_nodes(x: NodeArray<Vec2>) -> Self {
        let (ni, nj) = x.dims();
        let mut fields = Self::new(ni, nj);
        fields.x = x;
        fields
    }

    /// `(ni, nj)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.ni, self.nj)
    }

    /// Real cells, i-major.
    pub fn interior(&self) -> impl Iterator<Item = CellIndex> {
        interior_cells(self.ni, self.nj)
    }

    /// Set every real cell's state to `q`. Halo cells are left alone.
    pub fn fill_interior_q(&mut self, q: Conserved) {
        for c in interior_cells(self.ni, self.nj) {
            self.q[c] = q;
        }
    }

    /// First non-finite component of `q` among the real cells.
    pub fn first_non_finite_q(&self) -> Option<(CellIndex, usize, f64)> {
        for c in interior_cells(self.ni, self.nj) {
            for (k, v) in self.q[c].iter().enumerate() {
                if !v.is_finite() {
                    return Some((c, k, *v));
                }
            }
        }
        None
    }
}
