//! Local boundary conditions.
//!
//! [`apply`] fills the halo cells (or boundary faces) owned by one
//! [`LocalBoundary`] for one synchronization stage. Stages that a kind does
//! not touch are no-ops.

use mbflow_block::BlockFields;
use mbflow_core::{
    boundary_face_offset, Axis, BoundaryKind, CellIndex, Conserved, FaceEnd, GasModel,
    LocalBoundary, StageTag, Vec2,
};

use crate::config::ConvectScheme;
use crate::flux::convective_flux;

/// Shared inputs of every boundary kernel.
#[derive(Clone, Copy, Debug)]
pub struct BoundaryContext<'a> {
    /// Gas constants.
    pub gas: &'a GasModel,
    /// Convective scheme for boundary face fluxes.
    pub scheme: ConvectScheme,
    /// Prescribed states indexed by [`LocalBoundary::value_index`].
    pub values: &'a [Conserved],
}

/// Apply `bc` for `stage`.
pub fn apply(stage: StageTag, bc: &LocalBoundary, ctx: &BoundaryContext<'_>, fields: &mut BlockFields) {
    match stage {
        StageTag::Geometry => geometry(bc, fields),
        StageTag::State => state(bc, ctx, fields),
        StageTag::GradientCenter => gradient_center(bc, fields),
        StageTag::AdvectFlux => advect_flux(bc, ctx, fields),
        StageTag::CenterVt => center_vt(bc, ctx.gas, fields),
        StageTag::SurfaceVt => surface_vt(bc, fields),
        StageTag::GradientSurface => gradient_surface(bc, fields),
    }
}

/// Accumulate the convective flux through the boundary face between the
/// edge cell `cell` and its halo cell `halo` into `cell`'s residual.
///
/// The face vector points along `+face`, so on an end face the edge cell is
/// the left state and the flux leaves the cell; on a start face the halo is
/// the left state and the flux enters it.
pub fn boundary_face_flux(
    fields: &mut BlockFields,
    gas: &GasModel,
    scheme: ConvectScheme,
    cell: CellIndex,
    halo: CellIndex,
    face: Axis,
    end: FaceEnd,
) {
    let s = fields.vec_surf[(cell + boundary_face_offset(face, end), face)];
    let (q_cell, q_halo) = (fields.q[cell], fields.q[halo]);
    let flux = &mut fields.flux[cell];
    match end {
        FaceEnd::End => {
            let f = convective_flux(scheme, gas, &q_cell, &q_halo, s);
            for k in 0..4 {
                flux[k] += f[k];
            }
        }
        FaceEnd::Start => {
            let f = convective_flux(scheme, gas, &q_halo, &q_cell, s);
            for k in 0..4 {
                flux[k] -= f[k];
            }
        }
    }
}

fn unit_normal(s: Vec2) -> Vec2 {
    let len = (s[0] * s[0] + s[1] * s[1]).sqrt();
    if len == 0.0 {
        return [0.0, 0.0];
    }
    [s[0] / len, s[1] / len]
}

/// Remove `scale` times the component of `v` along unit vector `n`.
fn remove_normal(v: Vec2, n: Vec2, scale: f64) -> Vec2 {
    let vn = v[0] * n[0] + v[1] * n[1];
    [v[0] - scale * vn * n[0], v[1] - scale * vn * n[1]]
}

/// `(edge cell, halo cell, boundary face)` triples covered by `bc`.
fn edge<'a>(
    bc: &'a LocalBoundary,
    fields: &BlockFields,
) -> impl Iterator<Item = (CellIndex, CellIndex, CellIndex)> + 'a {
    let (ni, nj) = fields.dims();
    let step = bc.halo_step();
    let offset = boundary_face_offset(bc.face, bc.end);
    bc.cells(ni, nj).map(move |c| (c, c + step, c + offset))
}

fn geometry(bc: &LocalBoundary, fields: &mut BlockFields) {
    for (c, h, _) in edge(bc, fields) {
        fields.elem_area[h] = fields.elem_area[c];
        fields.elem_width[h] = fields.elem_width[c];
    }
}

fn prescribed(bc: &LocalBoundary, ctx: &BoundaryContext<'_>) -> Conserved {
    // validated by set_bc
    bc.value_index
        .and_then(|k| ctx.values.get(k).copied())
        .unwrap_or_else(|| ctx.gas.freestream())
}

fn state(bc: &LocalBoundary, ctx: &BoundaryContext<'_>, fields: &mut BlockFields) {
    let gas = ctx.gas;
    let step = bc.halo_step();
    for (c, h, face) in edge(bc, fields) {
        let q = fields.q[c];
        fields.q[h] = match bc.kind {
            BoundaryKind::SupersonicInlet => prescribed(bc, ctx),
            BoundaryKind::SupersonicOutlet => {
                let inner = fields.q[c - step];
                let mut out = [0.0; 4];
                for k in 0..4 {
                    out[k] = (2.0 * q[k] - inner[k]).max(0.0);
                }
                out
            }
            BoundaryKind::Symmetry | BoundaryKind::SlipWall => {
                let n = unit_normal(fields.vec_surf[(face, bc.face)]);
                let prim = gas.primitive(&q);
                let v = remove_normal(prim.velocity(), n, 2.0);
                [q[0], q[0] * v[0], q[0] * v[1], q[3]]
            }
            BoundaryKind::NoSlipWall => [q[0], -q[1], -q[2], q[3]],
            BoundaryKind::SubsonicInlet => {
                let b = gas.primitive(&prescribed(bc, ctx));
                let p = gas.primitive(&q).pressure(gas.gamma);
                gas.conserved(b.rho, b.u, b.v, p)
            }
            BoundaryKind::SubsonicOutlet => {
                let p = gas.primitive(&prescribed(bc, ctx)).pressure(gas.gamma);
                let prim = gas.primitive(&q);
                gas.conserved(prim.rho, prim.u, prim.v, p)
            }
        };
    }
}

fn gradient_center(bc: &LocalBoundary, fields: &mut BlockFields) {
    let step = bc.halo_step();
    for (c, h, _) in edge(bc, fields) {
        let gv = fields.gradient_v_c[c];
        let gt = fields.gradient_temp_c[c];
        let (hv, ht) = match bc.kind {
            BoundaryKind::SupersonicInlet
            | BoundaryKind::SubsonicInlet
            | BoundaryKind::SubsonicOutlet => (gv, gt),
            BoundaryKind::Symmetry => (
                [[-gv[0][0], -gv[0][1]], [-gv[1][0], -gv[1][1]]],
                [-gt[0], -gt[1]],
            ),
            BoundaryKind::NoSlipWall | BoundaryKind::SlipWall => (gv, [-gt[0], -gt[1]]),
            BoundaryKind::SupersonicOutlet => {
                let iv = fields.gradient_v_c[c - step];
                let it = fields.gradient_temp_c[c - step];
                let mut v = [[0.0; 2]; 2];
                for r in 0..2 {
                    for k in 0..2 {
                        v[r][k] = 2.0 * gv[r][k] - iv[r][k];
                    }
                }
                (v, [2.0 * gt[0] - it[0], 2.0 * gt[1] - it[1]])
            }
        };
        fields.gradient_v_c[h] = hv;
        fields.gradient_temp_c[h] = ht;
    }
}

fn advect_flux(bc: &LocalBoundary, ctx: &BoundaryContext<'_>, fields: &mut BlockFields) {
    for (c, h, _) in edge(bc, fields) {
        boundary_face_flux(fields, ctx.gas, ctx.scheme, c, h, bc.face, bc.end);
    }
}

fn center_vt(bc: &LocalBoundary, gas: &GasModel, fields: &mut BlockFields) {
    for (_, h, _) in edge(bc, fields) {
        let (v, t) = gas.velocity_temperature(&fields.q[h]);
        fields.v_c[h] = v;
        fields.temp_c[h] = t;
    }
}

fn surface_vt(bc: &LocalBoundary, fields: &mut BlockFields) {
    for (_, _, face) in edge(bc, fields) {
        let key = (face, bc.face);
        match bc.kind {
            BoundaryKind::NoSlipWall => fields.v_surf[key] = [0.0, 0.0],
            BoundaryKind::SlipWall | BoundaryKind::Symmetry => {
                let n = unit_normal(fields.vec_surf[key]);
                fields.v_surf[key] = remove_normal(fields.v_surf[key], n, 1.0);
            }
            _ => {}
        }
    }
}

fn gradient_surface(bc: &LocalBoundary, fields: &mut BlockFields) {
    if !(bc.kind.is_wall() || bc.kind == BoundaryKind::Symmetry) {
        return;
    }
    for (_, _, face) in edge(bc, fields) {
        let key = (face, bc.face);
        let n = unit_normal(fields.vec_surf[key]);
        fields.gradient_temp_surf[key] = remove_normal(fields.gradient_temp_surf[key], n, 1.0);
    }
}
