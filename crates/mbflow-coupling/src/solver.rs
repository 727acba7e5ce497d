//! The [`BlockSolver`] trait.
//!
//! A block solver owns one block's fields and performs every per-block
//! numerical step. The time-march controller calls these hooks in a fixed
//! order and interleaves them with inter-block synchronization; a solver
//! never reaches into another block itself.

use mbflow_block::BlockFields;
use mbflow_core::{Axis, BoundaryError, CellIndex, Conserved, FaceEnd, LocalBoundary, StageTag};

/// Per-block numerics driven by the time-march controller.
///
/// # Contract
///
/// - Every hook reads and writes only this block's fields.
/// - Halo cells hold whatever the last local boundary pass or
///   synchronization wrote; hooks must not assume anything else.
/// - [`init`](BlockSolver::init) computes geometry for the real cells and
///   sets the initial state. The controller synchronizes
///   [`StageTag::Geometry`] right after.
///
/// # Object safety
///
/// This trait is object-safe; the controller stores solvers as
/// `Vec<Box<dyn BlockSolver>>`.
pub trait BlockSolver: Send {
    /// Human-readable name for logs and errors.
    fn name(&self) -> &str;

    /// Fields visible to the synchronizer and to drawers.
    fn fields(&self) -> &BlockFields;

    /// Mutable access for the synchronizer.
    fn fields_mut(&mut self) -> &mut BlockFields;

    /// Physical time last propagated by the simulation loop.
    fn time(&self) -> f64;

    /// Record the current physical time.
    fn set_time(&mut self, t: f64);

    /// Physical time step this block integrates with, if it keeps its own.
    ///
    /// The simulation loop advances `t` by its configured `dt`; a block
    /// that reports a different value here is rejected when the loop is
    /// built.
    fn dt(&self) -> Option<f64> {
        None
    }

    /// Compute geometry, apply local geometry boundaries and set the
    /// initial state.
    fn init(&mut self);

    /// Replace the local boundary list and its prescribed value sets.
    fn set_bc(
        &mut self,
        boundaries: Vec<LocalBoundary>,
        values: Vec<Conserved>,
    ) -> Result<(), BoundaryError>;

    /// Apply the local boundary conditions for `stage`.
    fn bc(&mut self, stage: StageTag);

    /// Zero the flux accumulator.
    fn clear_flux(&mut self);

    /// Save `q` as the base of an RK3 step.
    fn time_save_q(&mut self);

    /// Save `q` as the previous physical time level of a dual-time step.
    fn time_save_q_dual(&mut self);

    /// Save `q` as the base of one pseudo-time RK3 iteration.
    fn time_save_q_dual_sub(&mut self);

    /// Derive cell-centre velocity and temperature from `q`.
    fn calc_u_temp_center(&mut self);

    /// Interpolate centre velocity and temperature onto faces.
    fn flux_diffusion_interp_qsurf(&mut self);

    /// Green-Gauss integrate face values into centre gradients.
    fn flux_diffusion_integrate_gradient_center(&mut self);

    /// Interpolate centre gradients onto faces.
    fn flux_diffusion_calc_gradient_surf(&mut self);

    /// Accumulate the viscous flux into the flux field.
    fn calc_flux_diffusion(&mut self);

    /// Accumulate the convective flux across interior faces.
    fn flux_advect(&mut self);

    /// Accumulate the convective flux across one coupled boundary face.
    ///
    /// `cell` is the real edge cell and `halo` the halo cell across the
    /// `(face, end)` face; the halo already holds the neighbour's state.
    fn bc_connection_advect_flux_cell(
        &mut self,
        cell: CellIndex,
        halo: CellIndex,
        face: Axis,
        end: FaceEnd,
    );

    /// Apply RK3 sub-stage `substage` (0..3) of a physical time step.
    fn time_march_rk3(&mut self, substage: usize);

    /// Apply RK3 sub-stage `substage` of a pseudo-time iteration.
    ///
    /// `outer_index` is the controller's count of completed physical steps
    /// (0 for the first step), so it changes with every step and is not the
    /// simulation loop's display-batch index. It is the same for every
    /// iteration and sub-stage of one step.
    fn time_march_rk3_dual(&mut self, substage: usize, outer_index: u64);
}
