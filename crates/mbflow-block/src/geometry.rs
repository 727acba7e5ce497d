//! Metric computation from node coordinates.
//!
//! Cell `(i, j)` is the quadrilateral with corner nodes `(i-1, j-1)`,
//! `(i, j-1)`, `(i-1, j)` and `(i, j)`. Only real cells and faces that bound
//! a real cell are computed here; halo geometry is either mirrored from the
//! adjacent real cell ([`mirror_halo_geometry`]) or supplied by a neighbour
//! block during the geometry synchronization stage.

use mbflow_core::{Axis, CellIndex, Vec2};

use crate::array::{faces, interior_cells};
use crate::fields::BlockFields;

fn sub(a: Vec2, b: Vec2) -> Vec2 {
    [a[0] - b[0], a[1] - b[1]]
}

fn norm(a: Vec2) -> f64 {
    (a[0] * a[0] + a[1] * a[1]).sqrt()
}

/// Rotate by +90 degrees.
fn rotate(a: Vec2) -> Vec2 {
    [-a[1], a[0]]
}

/// Compute centres, areas, face normals and element widths for the real
/// cells of `fields` from its node coordinates.
pub fn compute_geometry(fields: &mut BlockFields) {
    let (ni, nj) = fields.dims();
    let x = &fields.x;

    for c in interior_cells(ni, nj) {
        let x11 = x[c + CellIndex::new(-1, -1)];
        let x21 = x[c + CellIndex::new(0, -1)];
        let x12 = x[c + CellIndex::new(-1, 0)];
        let x22 = x[c];

        fields.xc[c] = [
            0.25 * (x11[0] + x21[0] + x12[0] + x22[0]),
            0.25 * (x11[1] + x21[1] + x12[1] + x22[1]),
        ];

        let r12 = sub(x21, x12);
        let r21 = sub(x11, x22);
        fields.elem_area[c] = 0.5 * (r12[0] * r21[1] - r12[1] * r21[0]).abs();

        let mid = |a: Vec2, b: Vec2| [0.5 * (a[0] + b[0]), 0.5 * (a[1] + b[1])];
        let d_i = sub(mid(x21, x22), mid(x11, x12));
        let d_j = sub(mid(x12, x22), mid(x11, x21));
        fields.elem_width[c] = [norm(d_i), norm(d_j)];
    }

    for c in faces(ni, nj, Axis::I) {
        let diff = sub(x[c + CellIndex::new(0, -1)], x[c]);
        fields.vec_surf[(c, Axis::I)] = rotate(diff);
    }
    for c in faces(ni, nj, Axis::J) {
        let diff = sub(x[c], x[c + CellIndex::new(-1, 0)]);
        fields.vec_surf[(c, Axis::J)] = rotate(diff);
    }
}

/// Copy area and element width from the nearest real cell into every halo
/// cell, corners included.
///
/// Boundary conditions and couplings overwrite the edges they own later;
/// this keeps unowned halo cells from holding zero area.
pub fn mirror_halo_geometry(fields: &mut BlockFields) {
    let (ni, nj) = fields.dims();
    let clamp = |c: CellIndex| {
        CellIndex::new(c.i.clamp(1, ni as i32), c.j.clamp(1, nj as i32))
    };
    for i in 0..=ni as i32 + 1 {
        for j in 0..=nj as i32 + 1 {
            let c = CellIndex::new(i, j);
            if c.is_interior(ni, nj) {
                continue;
            }
            let src = clamp(c);
            fields.elem_area[c] = fields.elem_area[src];
            fields.elem_width[c] = fields.elem_width[src];
        }
    }
}
