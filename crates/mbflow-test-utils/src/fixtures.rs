//! Field and coupling fixtures.
//!
//! - [`numbered_fields`]: every cell tagged with a value derived from its
//!   index, so a copied value identifies its source cell.
//! - [`random_fields`]: seeded random state and gradients.
//! - [`rectangle_fields`]: a uniform rectangle with geometry computed.
//! - [`periodic_couplings`] / [`side_by_side_couplings`]: ready-made
//!   coupling lists.

use mbflow_block::array::all_cells;
use mbflow_block::{compute_geometry, mirror_halo_geometry, rectangle_nodes, BlockFields};
use mbflow_core::{Axis, BlockId, CellIndex, FaceEnd, March};
use mbflow_coupling::{ConnectionDescriptor, Coupling};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Tag for a cell: unique per `(block, cell)` for blocks up to 99 cells wide.
pub fn cell_tag(block: u32, c: CellIndex) -> f64 {
    (block as f64) * 1.0e4 + (c.i as f64) * 100.0 + c.j as f64
}

/// Fields whose every per-cell and per-face value encodes its position.
pub fn numbered_fields(block: u32, ni: usize, nj: usize) -> BlockFields {
    let mut f = BlockFields::new(ni, nj);
    for c in all_cells(ni, nj) {
        let t = cell_tag(block, c);
        f.q[c] = [t, t + 0.25, t + 0.5, t + 0.75];
        f.elem_area[c] = t;
        f.elem_width[c] = [t, t + 0.5];
        f.v_c[c] = [t, -t];
        f.temp_c[c] = t;
        f.gradient_v_c[c] = [[t, t + 1.0], [t + 2.0, t + 3.0]];
        f.gradient_temp_c[c] = [t, -t];
    }
    for i in 0..=ni as i32 {
        for j in 0..=nj as i32 {
            let c = CellIndex::new(i, j);
            for axis in Axis::ALL {
                let t = cell_tag(block, c) + 0.125 * axis.index() as f64;
                f.v_surf[(c, axis)] = [t, -t];
                f.temp_surf[(c, axis)] = t;
                f.gradient_v_surf[(c, axis)] = [[t, 0.0], [0.0, t]];
                f.gradient_temp_surf[(c, axis)] = [t, t];
            }
        }
    }
    f
}

/// Seeded random positive-density state with random gradients.
pub fn random_fields(ni: usize, nj: usize, seed: u64) -> BlockFields {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut f = BlockFields::new(ni, nj);
    for c in all_cells(ni, nj) {
        let rho = rng.gen_range(0.5..1.5);
        let u = rng.gen_range(-1.0..1.0);
        let v = rng.gen_range(-1.0..1.0);
        let et = rng.gen_range(5.0..10.0);
        f.q[c] = [rho, rho * u, rho * v, et];
        f.elem_area[c] = rng.gen_range(0.1..1.0);
        f.elem_width[c] = [rng.gen_range(0.1..1.0), rng.gen_range(0.1..1.0)];
        f.gradient_v_c[c] = [[rng.gen(), rng.gen()], [rng.gen(), rng.gen()]];
        f.gradient_temp_c[c] = [rng.gen(), rng.gen()];
    }
    f
}

/// A uniform `ni × nj` rectangle with interior and mirrored halo geometry.
pub fn rectangle_fields(ni: usize, nj: usize, origin: [f64; 2], extent: [f64; 2]) -> BlockFields {
    let mut f = BlockFields::with_nodes(rectangle_nodes(ni, nj, origin, extent));
    compute_geometry(&mut f);
    mirror_halo_geometry(&mut f);
    f
}

fn desc(block: u32, face: Axis, end: FaceEnd) -> ConnectionDescriptor {
    ConnectionDescriptor::new(BlockId(block), 1, March::Forward, face, end)
}

/// Couple a block to itself across both axes (a doubly periodic domain).
pub fn periodic_couplings(block: u32, ni: usize, nj: usize) -> Vec<Coupling> {
    let i_start = desc(block, Axis::I, FaceEnd::Start);
    let i_end = desc(block, Axis::I, FaceEnd::End);
    let j_start = desc(block, Axis::J, FaceEnd::Start);
    let j_end = desc(block, Axis::J, FaceEnd::End);
    vec![
        Coupling::new(i_start, i_end, nj),
        Coupling::new(i_end, i_start, nj),
        Coupling::new(j_start, j_end, ni),
        Coupling::new(j_end, j_start, ni),
    ]
}

/// Both directions of the seam joining the i-end face of `left` to the
/// i-start face of `right`, `nj` cells long.
pub fn side_by_side_couplings(left: u32, right: u32, nj: usize) -> Vec<Coupling> {
    let a = desc(left, Axis::I, FaceEnd::End);
    let b = desc(right, Axis::I, FaceEnd::Start);
    vec![Coupling::new(a, b, nj), Coupling::new(b, a, nj)]
}
