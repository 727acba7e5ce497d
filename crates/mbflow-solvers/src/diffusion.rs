//! Viscous terms: face interpolation, Green-Gauss gradients and the
//! laminar stress/heat-flux face flux.
//!
//! The kernels run in the order the march schedule calls them, with halo
//! synchronization in between:
//!
//! 1. [`velocity_temperature_center`] over every cell, halos included
//! 2. [`interpolate_surface`] onto every face bounding a real cell
//! 3. [`gradient_center`] on real cells
//! 4. [`gradient_surface`] onto every face bounding a real cell
//! 5. [`accumulate_viscous_flux`] into the flux residual

use mbflow_block::array::{all_cells, faces, interior_cells};
use mbflow_block::BlockFields;
use mbflow_core::{Axis, CellIndex, Conserved, GasModel, Mat2, Vec2};

use crate::config::ViscousParams;

/// Values that can be blended linearly.
trait Blend: Copy {
    fn blend(a: f64, x: Self, b: f64, y: Self) -> Self;
}

impl Blend for f64 {
    fn blend(a: f64, x: Self, b: f64, y: Self) -> Self {
        a * x + b * y
    }
}

impl Blend for Vec2 {
    fn blend(a: f64, x: Self, b: f64, y: Self) -> Self {
        [a * x[0] + b * y[0], a * x[1] + b * y[1]]
    }
}

impl Blend for Mat2 {
    fn blend(a: f64, x: Self, b: f64, y: Self) -> Self {
        [
            Vec2::blend(a, x[0], b, y[0]),
            Vec2::blend(a, x[1], b, y[1]),
        ]
    }
}

/// Width-weighted value on face `c` along `axis`: the nearer cell centre
/// gets the larger weight.
fn face_value<T: Blend>(
    fields: &BlockFields,
    values: &mbflow_block::CellArray<T>,
    c: CellIndex,
    axis: Axis,
) -> T {
    let right = c + axis.unit();
    let wl = fields.elem_width[c][axis.index()];
    let wr = fields.elem_width[right][axis.index()];
    let total = wl + wr;
    if total == 0.0 {
        return T::blend(0.5, values[c], 0.5, values[right]);
    }
    T::blend(wr / total, values[c], wl / total, values[right])
}

/// Velocity and temperature at every cell centre, halo ring included.
pub fn velocity_temperature_center(fields: &mut BlockFields, gas: &GasModel) {
    let (ni, nj) = fields.dims();
    for c in all_cells(ni, nj) {
        let (v, t) = gas.velocity_temperature(&fields.q[c]);
        fields.v_c[c] = v;
        fields.temp_c[c] = t;
    }
}

/// Interpolate centre velocity and temperature onto faces.
pub fn interpolate_surface(fields: &mut BlockFields) {
    let (ni, nj) = fields.dims();
    for axis in Axis::ALL {
        for c in faces(ni, nj, axis) {
            let v = face_value(fields, &fields.v_c, c, axis);
            let t = face_value(fields, &fields.temp_c, c, axis);
            fields.v_surf[(c, axis)] = v;
            fields.temp_surf[(c, axis)] = t;
        }
    }
}

fn outer(v: Vec2, s: Vec2) -> Mat2 {
    [[v[0] * s[0], v[0] * s[1]], [v[1] * s[0], v[1] * s[1]]]
}

/// Green-Gauss gradients of velocity and temperature on real cells.
///
/// `gradient_v_c[r][c]` is `d v_r / d x_c`.
pub fn gradient_center(fields: &mut BlockFields) {
    let (ni, nj) = fields.dims();
    for c in interior_cells(ni, nj) {
        let bounding = [
            (c, Axis::I, 1.0),
            (c - Axis::I.unit(), Axis::I, -1.0),
            (c, Axis::J, 1.0),
            (c - Axis::J.unit(), Axis::J, -1.0),
        ];
        let mut gv: Mat2 = [[0.0; 2]; 2];
        let mut gt: Vec2 = [0.0; 2];
        for (face, axis, sign) in bounding {
            let s = fields.vec_surf[(face, axis)];
            gv = Mat2::blend(1.0, gv, sign, outer(fields.v_surf[(face, axis)], s));
            gt = Vec2::blend(1.0, gt, sign * fields.temp_surf[(face, axis)], s);
        }

        let inv_area = 1.0 / fields.elem_area[c];
        for row in &mut gv {
            row[0] *= inv_area;
            row[1] *= inv_area;
        }
        fields.gradient_v_c[c] = gv;
        fields.gradient_temp_c[c] = [gt[0] * inv_area, gt[1] * inv_area];
    }
}

/// Interpolate centre gradients onto faces.
pub fn gradient_surface(fields: &mut BlockFields) {
    let (ni, nj) = fields.dims();
    for axis in Axis::ALL {
        for c in faces(ni, nj, axis) {
            let gv = face_value(fields, &fields.gradient_v_c, c, axis);
            let gt = face_value(fields, &fields.gradient_temp_c, c, axis);
            fields.gradient_v_surf[(c, axis)] = gv;
            fields.gradient_temp_surf[(c, axis)] = gt;
        }
    }
}

/// Sutherland's law for non-dimensional viscosity at temperature `t`.
pub fn sutherland_viscosity(params: &ViscousParams, t: f64) -> f64 {
    let cs = params.sutherland();
    (1.0 + cs) / (t + cs) * t.powf(1.5)
}

/// Viscous flux through face vector `s` before division by the Reynolds
/// number.
pub fn viscous_face_flux(
    gas: &GasModel,
    params: &ViscousParams,
    v: Vec2,
    t: f64,
    grad_v: &Mat2,
    grad_t: Vec2,
    s: Vec2,
) -> Conserved {
    let mu = sutherland_viscosity(params, t);
    let lambda = -2.0 / 3.0 * mu;
    let k = mu * gas.cp0() / params.prandtl;
    let div = grad_v[0][0] + grad_v[1][1];

    let mut stress = [[0.0; 2]; 2];
    for r in 0..2 {
        for c in 0..2 {
            stress[r][c] = mu * (grad_v[r][c] + grad_v[c][r]);
        }
        stress[r][r] += lambda * div;
    }

    let dot = |a: Vec2, b: Vec2| a[0] * b[0] + a[1] * b[1];
    let work = [dot(stress[0], v), dot(stress[1], v)];
    let heat = [k * grad_t[0], k * grad_t[1]];
    [
        0.0,
        dot(stress[0], s),
        dot(stress[1], s),
        dot([work[0] + heat[0], work[1] + heat[1]], s),
    ]
}

fn surface_flux(
    fields: &BlockFields,
    gas: &GasModel,
    params: &ViscousParams,
    c: CellIndex,
    axis: Axis,
) -> Conserved {
    viscous_face_flux(
        gas,
        params,
        fields.v_surf[(c, axis)],
        fields.temp_surf[(c, axis)],
        &fields.gradient_v_surf[(c, axis)],
        fields.gradient_temp_surf[(c, axis)],
        fields.vec_surf[(c, axis)],
    )
}

/// Subtract the net viscous flux of every real cell from its residual.
///
/// The residual holds outflow, so viscous terms enter with a negative sign.
pub fn accumulate_viscous_flux(fields: &mut BlockFields, gas: &GasModel, params: &ViscousParams) {
    let (ni, nj) = fields.dims();
    let inv_re = 1.0 / params.re0;
    for c in interior_cells(ni, nj) {
        let right = surface_flux(fields, gas, params, c, Axis::I);
        let left = surface_flux(fields, gas, params, c - Axis::I.unit(), Axis::I);
        let up = surface_flux(fields, gas, params, c, Axis::J);
        let down = surface_flux(fields, gas, params, c - Axis::J.unit(), Axis::J);
        let flux = &mut fields.flux[c];
        for k in 0..4 {
            let net = right[k] - left[k] + up[k] - down[k];
            flux[k] -= net * inv_re;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbflow_block::{compute_geometry, mirror_halo_geometry, rectangle_nodes};

    fn unit_square(n: usize) -> BlockFields {
        let mut f = BlockFields::with_nodes(rectangle_nodes(n, n, [0.0, 0.0], [1.0, 1.0]));
        compute_geometry(&mut f);
        mirror_halo_geometry(&mut f);
        f
    }

    #[test]
    fn green_gauss_recovers_linear_field() {
        let n = 6;
        let mut f = unit_square(n);
        // v = (2x + y, -x + 3y), T = 1 + 0.5x - 0.25y
        for c in all_cells(n, n) {
            let h = 1.0 / n as f64;
            let x = (c.i as f64 - 0.5) * h;
            let y = (c.j as f64 - 0.5) * h;
            f.v_c[c] = [2.0 * x + y, -x + 3.0 * y];
            f.temp_c[c] = 1.0 + 0.5 * x - 0.25 * y;
        }
        interpolate_surface(&mut f);
        gradient_center(&mut f);
        for c in interior_cells(n, n) {
            let g = f.gradient_v_c[c];
            assert!((g[0][0] - 2.0).abs() < 1e-10, "{c}: {g:?}");
            assert!((g[0][1] - 1.0).abs() < 1e-10);
            assert!((g[1][0] + 1.0).abs() < 1e-10);
            assert!((g[1][1] - 3.0).abs() < 1e-10);
            let gt = f.gradient_temp_c[c];
            assert!((gt[0] - 0.5).abs() < 1e-10);
            assert!((gt[1] + 0.25).abs() < 1e-10);
        }
    }

    #[test]
    fn interpolation_weights_nearer_cell() {
        let mut f = BlockFields::with_nodes(stretched_nodes());
        compute_geometry(&mut f);
        mirror_halo_geometry(&mut f);
        f.temp_c[CellIndex::new(1, 1)] = 0.0;
        f.temp_c[CellIndex::new(2, 1)] = 3.0;
        interpolate_surface(&mut f);
        // widths 1 and 2: the face sits one third of the way between centres
        let t = f.temp_surf[(CellIndex::new(1, 1), Axis::I)];
        assert!((t - 1.0).abs() < 1e-12, "{t}");
    }

    fn stretched_nodes() -> mbflow_block::NodeArray<Vec2> {
        mbflow_block::nodes_from_fn(2, 1, |i, j| {
            let x = [0.0, 1.0, 3.0][i];
            [x, j as f64]
        })
    }

    #[test]
    fn uniform_flow_has_no_viscous_flux() {
        let params = ViscousParams::new(100.0);
        let gas = GasModel::new(0.3);
        let f = viscous_face_flux(&gas, &params, [1.0, 0.5], 1.0, &[[0.0; 2]; 2], [0.0; 2], [0.2, 0.1]);
        assert_eq!(f, [0.0; 4]);
    }

    #[test]
    fn shear_flow_stress_and_work() {
        let params = ViscousParams::new(100.0);
        let gas = GasModel::new(0.3);
        // u = y: du/dy = 1
        let grad = [[0.0, 1.0], [0.0, 0.0]];
        let f = viscous_face_flux(&gas, &params, [2.0, 0.0], 1.0, &grad, [0.0; 2], [0.0, 1.0]);
        let mu = sutherland_viscosity(&params, 1.0);
        assert!((mu - 1.0).abs() < 1e-12);
        assert!((f[1] - 1.0).abs() < 1e-12);
        assert_eq!(f[2], 0.0);
        assert!((f[3] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn viscous_flux_damps_a_velocity_peak() {
        let n = 4;
        let mut f = unit_square(n);
        let gas = GasModel::new(0.3);
        let params = ViscousParams::new(10.0);
        for c in all_cells(n, n) {
            f.q[c] = gas.freestream();
        }
        let peak = CellIndex::new(2, 2);
        f.q[peak] = gas.conserved(1.0, 2.0, 0.0, gas.p0());
        velocity_temperature_center(&mut f, &gas);
        interpolate_surface(&mut f);
        gradient_center(&mut f);
        gradient_surface(&mut f);
        accumulate_viscous_flux(&mut f, &gas, &params);
        // outflow of x-momentum from the fast cell is positive
        assert!(f.flux[peak][1] > 0.0, "{:?}", f.flux[peak]);
        assert_eq!(f.flux[peak][0], 0.0);
    }
}
