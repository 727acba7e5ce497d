//! [`FvmBlockSolver`]: the reference cell-centred finite-volume solver.

use mbflow_block::array::{all_cells, interior_cells, interior_faces};
use mbflow_block::{compute_geometry, mirror_halo_geometry, BlockFields, CellArray, RectangleMesh};
use mbflow_core::{
    Axis, BoundaryError, CellIndex, Conserved, FaceEnd, LocalBoundary, StageTag,
};
use mbflow_coupling::BlockSolver;
use tracing::trace;

use crate::boundary::{self, BoundaryContext};
use crate::config::FvmConfig;
use crate::diffusion;
use crate::flux::convective_flux;

/// Low-storage RK3 sub-stage coefficients.
pub const RK3_COEFFICIENTS: [f64; 3] = [0.1481, 0.4, 1.0];

/// Finite-volume solver for one structured block.
///
/// Marches `q` with the residual accumulated in [`BlockFields::flux`]
/// (net outflow through the cell faces). Local boundary conditions are
/// installed with [`BlockSolver::set_bc`]; faces not covered by a local
/// boundary are expected to be coupled to a neighbour block.
#[derive(Debug)]
pub struct FvmBlockSolver {
    name: String,
    config: FvmConfig,
    fields: BlockFields,
    boundaries: Vec<LocalBoundary>,
    values: Vec<Conserved>,
    /// Base of the current RK3 step.
    w: CellArray<Conserved>,
    /// Previous physical time level in dual time.
    w_dual: CellArray<Conserved>,
    /// Base of the current pseudo-time iteration.
    w_dual_sub: CellArray<Conserved>,
    time: f64,
}

impl FvmBlockSolver {
    /// Create a solver over `fields`, whose node coordinates must be set.
    pub fn new(name: impl Into<String>, fields: BlockFields, config: FvmConfig) -> Self {
        let (ni, nj) = fields.dims();
        Self {
            name: name.into(),
            config,
            fields,
            boundaries: Vec::new(),
            values: Vec::new(),
            w: CellArray::new(ni, nj),
            w_dual: CellArray::new(ni, nj),
            w_dual_sub: CellArray::new(ni, nj),
            time: 0.0,
        }
    }

    /// Create a solver over a uniform rectangle.
    pub fn rectangle(name: impl Into<String>, mesh: RectangleMesh, config: FvmConfig) -> Self {
        Self::new(name, BlockFields::with_nodes(mesh.nodes()), config)
    }

    /// Solver configuration.
    pub fn config(&self) -> &FvmConfig {
        &self.config
    }

    /// Installed local boundaries.
    pub fn boundaries(&self) -> &[LocalBoundary] {
        &self.boundaries
    }

    /// Sum of `q * area` over real cells.
    pub fn totals(&self) -> Conserved {
        let mut total = [0.0; 4];
        for c in self.fields.interior() {
            let area = self.fields.elem_area[c];
            for k in 0..4 {
                total[k] += self.fields.q[c][k] * area;
            }
        }
        total
    }
}

impl BlockSolver for FvmBlockSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> &BlockFields {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut BlockFields {
        &mut self.fields
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn dt(&self) -> Option<f64> {
        Some(self.config.dt)
    }

    fn set_time(&mut self, t: f64) {
        self.time = t;
    }

    fn init(&mut self) {
        compute_geometry(&mut self.fields);
        mirror_halo_geometry(&mut self.fields);
        self.bc(StageTag::Geometry);

        let q0 = self.config.initial_state();
        let (ni, nj) = self.fields.dims();
        for c in all_cells(ni, nj) {
            self.fields.q[c] = q0;
        }
        self.fields.flux.fill([0.0; 4]);
        self.w.copy_from(&self.fields.q);
        self.w_dual.copy_from(&self.fields.q);
        self.w_dual_sub.copy_from(&self.fields.q);
        trace!(block = %self.name, ni, nj, "initialized");
    }

    fn set_bc(
        &mut self,
        boundaries: Vec<LocalBoundary>,
        values: Vec<Conserved>,
    ) -> Result<(), BoundaryError> {
        let (ni, nj) = self.fields.dims();
        for (index, bc) in boundaries.iter().enumerate() {
            bc.validate(index, ni, nj, values.len())?;
        }
        self.boundaries = boundaries;
        self.values = values;
        Ok(())
    }

    fn bc(&mut self, stage: StageTag) {
        if stage.is_viscous_only() && !self.config.is_viscous() {
            return;
        }
        let ctx = BoundaryContext {
            gas: &self.config.gas,
            scheme: self.config.scheme,
            values: &self.values,
        };
        for bc in &self.boundaries {
            boundary::apply(stage, bc, &ctx, &mut self.fields);
        }
    }

    fn clear_flux(&mut self) {
        self.fields.flux.fill([0.0; 4]);
    }

    fn time_save_q(&mut self) {
        self.w.copy_from(&self.fields.q);
    }

    fn time_save_q_dual(&mut self) {
        self.w_dual.copy_from(&self.fields.q);
    }

    fn time_save_q_dual_sub(&mut self) {
        self.w_dual_sub.copy_from(&self.fields.q);
    }

    fn calc_u_temp_center(&mut self) {
        diffusion::velocity_temperature_center(&mut self.fields, &self.config.gas);
    }

    fn flux_diffusion_interp_qsurf(&mut self) {
        diffusion::interpolate_surface(&mut self.fields);
    }

    fn flux_diffusion_integrate_gradient_center(&mut self) {
        diffusion::gradient_center(&mut self.fields);
    }

    fn flux_diffusion_calc_gradient_surf(&mut self) {
        diffusion::gradient_surface(&mut self.fields);
    }

    fn calc_flux_diffusion(&mut self) {
        if let Some(params) = &self.config.viscous {
            diffusion::accumulate_viscous_flux(&mut self.fields, &self.config.gas, params);
        }
    }

    fn flux_advect(&mut self) {
        let (ni, nj) = self.fields.dims();
        let gas = &self.config.gas;
        let fields = &mut self.fields;
        for axis in Axis::ALL {
            for c in interior_faces(ni, nj, axis) {
                let right = c + axis.unit();
                let s = fields.vec_surf[(c, axis)];
                let f = convective_flux(self.config.scheme, gas, &fields.q[c], &fields.q[right], s);
                for k in 0..4 {
                    fields.flux[c][k] += f[k];
                    fields.flux[right][k] -= f[k];
                }
            }
        }
    }

    fn bc_connection_advect_flux_cell(
        &mut self,
        cell: CellIndex,
        halo: CellIndex,
        face: Axis,
        end: FaceEnd,
    ) {
        boundary::boundary_face_flux(
            &mut self.fields,
            &self.config.gas,
            self.config.scheme,
            cell,
            halo,
            face,
            end,
        );
    }

    fn time_march_rk3(&mut self, substage: usize) {
        let coef = RK3_COEFFICIENTS[substage] * self.config.dt;
        let (ni, nj) = self.fields.dims();
        for c in interior_cells(ni, nj) {
            let scale = coef / self.fields.elem_area[c];
            let (w, flux) = (self.w[c], self.fields.flux[c]);
            let q = &mut self.fields.q[c];
            for k in 0..4 {
                q[k] = w[k] - scale * flux[k];
            }
        }
    }

    fn time_march_rk3_dual(&mut self, substage: usize, outer_index: u64) {
        let dt = self.config.dt;
        let dtau = dt * self.config.pseudo_dt_ratio;
        let coef = RK3_COEFFICIENTS[substage] * dtau;
        let (ni, nj) = self.fields.dims();
        let mut max_residual: f64 = 0.0;
        for c in interior_cells(ni, nj) {
            let inv_area = 1.0 / self.fields.elem_area[c];
            let (base, prev, flux) = (self.w_dual_sub[c], self.w_dual[c], self.fields.flux[c]);
            let q = &mut self.fields.q[c];
            for k in 0..4 {
                let residual = flux[k] * inv_area + (q[k] - prev[k]) / dt;
                max_residual = max_residual.max(residual.abs());
                q[k] = base[k] - coef * residual;
            }
        }
        trace!(block = %self.name, outer_index, substage, max_residual, "pseudo-time stage");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbflow_core::BoundaryKind;

    use crate::config::ConvectScheme;

    fn solver(ni: usize, nj: usize) -> FvmBlockSolver {
        let cfg = FvmConfig::builder()
            .ma0(0.5)
            .dt(1e-3)
            .scheme(ConvectScheme::VanLeer)
            .build()
            .unwrap();
        let mesh = RectangleMesh {
            ni,
            nj,
            origin: [0.0, 0.0],
            extent: [1.0, 1.0],
        };
        FvmBlockSolver::rectangle("b0", mesh, cfg)
    }

    #[test]
    fn init_sets_geometry_and_freestream() {
        let mut s = solver(4, 4);
        s.init();
        let f = s.fields();
        assert!((f.elem_area[CellIndex::new(2, 2)] - 1.0 / 16.0).abs() < 1e-15);
        assert_eq!(f.q[CellIndex::new(0, 3)], s.config().gas.freestream());
        let totals = s.totals();
        assert!((totals[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn set_bc_rejects_out_of_range() {
        let mut s = solver(4, 4);
        let bc = LocalBoundary::new(BoundaryKind::SlipWall, Axis::J, FaceEnd::Start, (1, 6));
        match s.set_bc(vec![bc], vec![]) {
            Err(BoundaryError::RangeOutOfBounds { index: 0, .. }) => {}
            other => panic!("expected RangeOutOfBounds, got {other:?}"),
        }
        assert!(s.boundaries().is_empty());
    }

    #[test]
    fn set_bc_rejects_missing_value() {
        let mut s = solver(4, 4);
        let bc = LocalBoundary::new(BoundaryKind::SubsonicInlet, Axis::I, FaceEnd::Start, (1, 5));
        match s.set_bc(vec![bc], vec![]) {
            Err(BoundaryError::MissingValue { index: 0, .. }) => {}
            other => panic!("expected MissingValue, got {other:?}"),
        }
    }

    #[test]
    fn interior_fluxes_telescope() {
        let mut s = solver(3, 3);
        s.init();
        let gas = s.config().gas;
        s.fields_mut().q[CellIndex::new(2, 2)] = gas.conserved(1.3, 0.2, -0.4, gas.p0() * 1.5);
        s.clear_flux();
        s.flux_advect();
        let mut net = [0.0; 4];
        for c in s.fields().interior() {
            for k in 0..4 {
                net[k] += s.fields().flux[c][k];
            }
        }
        for v in net {
            assert!(v.abs() < 1e-12, "{net:?}");
        }
    }

    #[test]
    fn rk3_substage_uses_its_coefficient() {
        let mut s = solver(2, 2);
        s.init();
        s.time_save_q();
        let c = CellIndex::new(1, 1);
        s.fields_mut().flux[c] = [1.0, 0.0, 0.0, 0.0];
        let rho0 = s.fields().q[c][0];
        s.time_march_rk3(1);
        let expected = rho0 - 0.4 * 1e-3 / 0.25;
        assert!((s.fields().q[c][0] - expected).abs() < 1e-15);
        // the update restarts from the saved base, not the current q
        s.time_march_rk3(1);
        assert!((s.fields().q[c][0] - expected).abs() < 1e-15);
    }

    #[test]
    fn dual_time_is_stationary_for_zero_residual() {
        let mut s = solver(2, 2);
        s.init();
        s.time_save_q_dual();
        s.time_save_q_dual_sub();
        s.clear_flux();
        let before = s.fields().q.as_slice().to_vec();
        for stage in 0..3 {
            s.time_march_rk3_dual(stage, 0);
        }
        assert_eq!(s.fields().q.as_slice(), &before[..]);
    }

    #[test]
    fn inviscid_solver_skips_viscous_boundary_stages() {
        let mut s = solver(2, 2);
        s.init();
        let bc = LocalBoundary::new(BoundaryKind::NoSlipWall, Axis::J, FaceEnd::Start, (1, 3));
        s.set_bc(vec![bc], vec![]).unwrap();
        let face = CellIndex::new(1, 0);
        s.fields_mut().v_surf[(face, Axis::J)] = [1.0, 1.0];
        s.bc(StageTag::SurfaceVt);
        assert_eq!(s.fields().v_surf[(face, Axis::J)], [1.0, 1.0]);
    }
}
