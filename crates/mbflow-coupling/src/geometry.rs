//! Coupling geometry resolution.
//!
//! Turns a [`ConnectionDescriptor`] into concrete cell positions:
//!
//! | face | end   | first cell          | step       | halo step |
//! |------|-------|---------------------|------------|-----------|
//! | I    | Start | `(1, start)`        | `(0, dir)` | `(-1, 0)` |
//! | I    | End   | `(ni, start)`       | `(0, dir)` | `(1, 0)`  |
//! | J    | Start | `(start, 1)`        | `(dir, 0)` | `(0, -1)` |
//! | J    | End   | `(start, nj)`       | `(dir, 0)` | `(0, 1)`  |

use mbflow_core::{boundary_face_offset, outward_step, Axis, CellIndex, FaceEnd};

use crate::descriptor::ConnectionDescriptor;

/// Resolved positions for one side of a coupling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionGeometry {
    /// First real edge cell.
    pub pos_start: CellIndex,
    /// Step between consecutive coupled cells.
    pub direction_offset: CellIndex,
    /// Step from a real edge cell to its halo cell.
    pub halo_offset: CellIndex,
}

impl ConnectionGeometry {
    /// The `k`-th real edge cell.
    pub fn cell(&self, k: usize) -> CellIndex {
        self.pos_start + self.direction_offset * k as i32
    }

    /// The halo cell across from the `k`-th edge cell.
    pub fn halo(&self, k: usize) -> CellIndex {
        self.cell(k) + self.halo_offset
    }
}

/// Resolve a descriptor against its block's dimensions.
pub fn resolve(desc: &ConnectionDescriptor, ni: usize, nj: usize) -> ConnectionGeometry {
    let dir = desc.march.sign();
    let (pos_start, direction_offset) = match (desc.face, desc.end) {
        (Axis::I, FaceEnd::Start) => (CellIndex::new(1, desc.start), CellIndex::new(0, dir)),
        (Axis::I, FaceEnd::End) => (CellIndex::new(ni as i32, desc.start), CellIndex::new(0, dir)),
        (Axis::J, FaceEnd::Start) => (CellIndex::new(desc.start, 1), CellIndex::new(dir, 0)),
        (Axis::J, FaceEnd::End) => (CellIndex::new(desc.start, nj as i32), CellIndex::new(dir, 0)),
    };
    ConnectionGeometry {
        pos_start,
        direction_offset,
        halo_offset: outward_step(desc.face, desc.end),
    }
}

/// Offset from a real edge cell to the index of the coupled face.
pub fn surface_range_offset(face: Axis, end: FaceEnd) -> CellIndex {
    boundary_face_offset(face, end)
}
