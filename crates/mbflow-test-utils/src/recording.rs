//! A [`BlockSolver`] that records calls instead of computing.

use std::sync::{Arc, Mutex};

use mbflow_block::BlockFields;
use mbflow_core::{Axis, BoundaryError, CellIndex, Conserved, FaceEnd, LocalBoundary, StageTag};
use mbflow_coupling::BlockSolver;

/// One recorded hook invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum SolverCall {
    Init,
    SetBc,
    Bc(StageTag),
    ClearFlux,
    TimeSaveQ,
    TimeSaveQDual,
    TimeSaveQDualSub,
    CalcUTempCenter,
    InterpQSurf,
    IntegrateGradientCenter,
    CalcGradientSurf,
    CalcFluxDiffusion,
    FluxAdvect,
    AdvectFluxCell {
        cell: CellIndex,
        halo: CellIndex,
        face: Axis,
        end: FaceEnd,
    },
    Rk3(usize),
    Rk3Dual(usize, u64),
    SetTime(f64),
}

/// Shared, ordered log of `(block name, call)` across every solver.
pub type CallLog = Arc<Mutex<Vec<(String, SolverCall)>>>;

/// Mock solver: owns real [`BlockFields`] so the synchronizer can move
/// data through it, but every hook only appends to the shared log.
pub struct RecordingSolver {
    name: String,
    fields: BlockFields,
    time: f64,
    log: CallLog,
    marches: usize,
    poison_at_march: Option<usize>,
}

impl RecordingSolver {
    pub fn new(name: impl Into<String>, fields: BlockFields, log: CallLog) -> Self {
        Self {
            name: name.into(),
            fields,
            time: 0.0,
            log,
            marches: 0,
            poison_at_march: None,
        }
    }

    /// A fresh shared log.
    pub fn new_log() -> CallLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    /// Write NaN into the first real cell on the `n`-th RK march call
    /// (counting plain and dual marches, from 0).
    pub fn poison_at_march(mut self, n: usize) -> Self {
        self.poison_at_march = Some(n);
        self
    }

    fn record(&self, call: SolverCall) {
        self.log
            .lock()
            .unwrap()
            .push((self.name.clone(), call));
    }

    fn march(&mut self) {
        if self.poison_at_march == Some(self.marches) {
            self.fields.q[CellIndex::new(1, 1)][0] = f64::NAN;
        }
        self.marches += 1;
    }
}

/// Calls recorded for one block, in order.
pub fn calls_for(log: &CallLog, name: &str) -> Vec<SolverCall> {
    log.lock()
        .unwrap()
        .iter()
        .filter(|(n, _)| n == name)
        .map(|(_, c)| c.clone())
        .collect()
}

impl BlockSolver for RecordingSolver {
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

    fn set_time(&mut self, t: f64) {
        self.time = t;
        self.record(SolverCall::SetTime(t));
    }

    fn init(&mut self) {
        self.record(SolverCall::Init);
    }

    fn set_bc(
        &mut self,
        _boundaries: Vec<LocalBoundary>,
        _values: Vec<Conserved>,
    ) -> Result<(), BoundaryError> {
        self.record(SolverCall::SetBc);
        Ok(())
    }

    fn bc(&mut self, stage: StageTag) {
        self.record(SolverCall::Bc(stage));
    }

    fn clear_flux(&mut self) {
        self.record(SolverCall::ClearFlux);
    }

    fn time_save_q(&mut self) {
        self.record(SolverCall::TimeSaveQ);
    }

    fn time_save_q_dual(&mut self) {
        self.record(SolverCall::TimeSaveQDual);
    }

    fn time_save_q_dual_sub(&mut self) {
        self.record(SolverCall::TimeSaveQDualSub);
    }

    fn calc_u_temp_center(&mut self) {
        self.record(SolverCall::CalcUTempCenter);
    }

    fn flux_diffusion_interp_qsurf(&mut self) {
        self.record(SolverCall::InterpQSurf);
    }

    fn flux_diffusion_integrate_gradient_center(&mut self) {
        self.record(SolverCall::IntegrateGradientCenter);
    }

    fn flux_diffusion_calc_gradient_surf(&mut self) {
        self.record(SolverCall::CalcGradientSurf);
    }

    fn calc_flux_diffusion(&mut self) {
        self.record(SolverCall::CalcFluxDiffusion);
    }

    fn flux_advect(&mut self) {
        self.record(SolverCall::FluxAdvect);
    }

    fn bc_connection_advect_flux_cell(
        &mut self,
        cell: CellIndex,
        halo: CellIndex,
        face: Axis,
        end: FaceEnd,
    ) {
        self.record(SolverCall::AdvectFluxCell {
            cell,
            halo,
            face,
            end,
        });
    }

    fn time_march_rk3(&mut self, substage: usize) {
        self.record(SolverCall::Rk3(substage));
        self.march();
    }

    fn time_march_rk3_dual(&mut self, substage: usize, outer_index: u64) {
        self.record(SolverCall::Rk3Dual(substage, outer_index));
        self.march();
    }
}
