//! The RK3 / dual-time march controller.
//!
//! [`TimeMarchController`] owns the block list and the synchronizer and
//! walks the [`SubStagePlan`] once per RK3 sub-stage. After every update it
//! scans the blocks for non-finite state and stops at the first hit.

use std::sync::Arc;
use std::time::Instant;

use mbflow_core::{
    BlockId, Conserved, LocalBoundary, NumericalDivergence, StageTag, StepError,
};
use mbflow_coupling::{BlockSolver, Coupling, InterBlockSynchronizer};
use tracing::{debug, trace};

use crate::config::{ConfigError, MarchConfig};
use crate::context::ExecutionContext;
use crate::metrics::StepMetrics;
use crate::schedule::{MarchOp, SubStagePlan};

// Fails to compile if the block list stops being Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<TimeMarchController>();
    }
};

/// Which update a sub-stage ends with.
#[derive(Clone, Copy, Debug)]
enum UpdateKind {
    Plain,
    Dual { outer_index: u64 },
}

/// Sequences block hooks and halo synchronization for one physical step.
pub struct TimeMarchController {
    blocks: Vec<Box<dyn BlockSolver>>,
    sync: InterBlockSynchronizer,
    plan: SubStagePlan,
    dual_iterations: Option<usize>,
    exec: Arc<ExecutionContext>,
    steps: u64,
    last_metrics: StepMetrics,
}

impl TimeMarchController {
    /// Validate `couplings` against `blocks` and build the schedule.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoBlocks`] for an empty block list,
    /// [`ConfigError::DualIterationsZero`] for a zero-iteration dual setup,
    /// and [`ConfigError::Coupling`] for any coupling registration error.
    pub fn new(
        blocks: Vec<Box<dyn BlockSolver>>,
        couplings: Vec<Coupling>,
        march: &MarchConfig,
        exec: Arc<ExecutionContext>,
    ) -> Result<Self, ConfigError> {
        if blocks.is_empty() {
            return Err(ConfigError::NoBlocks);
        }
        if march.dual_time.as_ref().is_some_and(|d| d.iterations == 0) {
            return Err(ConfigError::DualIterationsZero);
        }
        let sync = InterBlockSynchronizer::for_blocks(couplings, &blocks)?;
        let plan = SubStagePlan::new(march);
        debug!(
            blocks = blocks.len(),
            couplings = sync.couplings().len(),
            ops = plan.ops().len(),
            viscous = march.viscous,
            dual = march.dual_time.is_some(),
            "time-march controller ready"
        );
        Ok(Self {
            blocks,
            sync,
            plan,
            dual_iterations: march.dual_time.as_ref().map(|d| d.iterations),
            exec,
            steps: 0,
            last_metrics: StepMetrics::default(),
        })
    }

    /// Install local boundaries on block `block`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownBlock`] if `block` is out of range and
    /// [`ConfigError::Boundary`] if the block rejects the list.
    pub fn set_bc(
        &mut self,
        block: usize,
        boundaries: Vec<LocalBoundary>,
        values: Vec<Conserved>,
    ) -> Result<(), ConfigError> {
        let n_blocks = self.blocks.len();
        let solver = self
            .blocks
            .get_mut(block)
            .ok_or(ConfigError::UnknownBlock { block, n_blocks })?;
        solver
            .set_bc(boundaries, values)
            .map_err(|error| ConfigError::Boundary { block, error })
    }

    /// Initialize every block and exchange halo geometry.
    pub fn init(&mut self) -> Result<(), StepError> {
        self.exec.for_each_block(&mut self.blocks, |b| b.init());
        self.sync.synchronize(StageTag::Geometry, &mut self.blocks)?;
        Ok(())
    }

    /// One plain RK3 physical step.
    ///
    /// # Errors
    ///
    /// [`StepError::Divergence`] as soon as any block holds non-finite
    /// state after an update; later sub-stages are not run.
    pub fn step(&mut self) -> Result<(), StepError> {
        let start = Instant::now();
        let mut metrics = StepMetrics::default();
        self.exec.for_each_block(&mut self.blocks, |b| b.time_save_q());
        let result = (0..3).try_for_each(|substage| {
            self.run_substage(substage, UpdateKind::Plain, &mut metrics)
        });
        self.finish(start, metrics);
        result
    }

    /// One dual-time physical step: the configured number of pseudo-time
    /// RK3 iterations, each restarting from its own saved state.
    ///
    /// Falls back to [`step`](Self::step) semantics with a single iteration
    /// when dual time is not configured. Blocks receive the number of steps
    /// completed before this one as their `outer_index`.
    ///
    /// # Errors
    ///
    /// As for [`step`](Self::step).
    pub fn step_dual(&mut self) -> Result<(), StepError> {
        let start = Instant::now();
        let mut metrics = StepMetrics::default();
        let outer_index = self.steps;
        let iterations = self.dual_iterations.unwrap_or(1);
        self.exec.for_each_block(&mut self.blocks, |b| b.time_save_q_dual());
        let result = (0..iterations).try_for_each(|_| {
            self.exec.for_each_block(&mut self.blocks, |b| b.time_save_q_dual_sub());
            (0..3).try_for_each(|substage| {
                self.run_substage(substage, UpdateKind::Dual { outer_index }, &mut metrics)
            })
        });
        self.finish(start, metrics);
        result
    }

    /// [`step_dual`](Self::step_dual) if dual time is configured, otherwise
    /// [`step`](Self::step).
    pub fn advance(&mut self) -> Result<(), StepError> {
        if self.dual_iterations.is_some() {
            self.step_dual()
        } else {
            self.step()
        }
    }

    /// Propagate physical time to every block.
    pub fn set_time(&mut self, t: f64) {
        self.exec.for_each_block(&mut self.blocks, |b| b.set_time(t));
    }

    /// The blocks, in registration order.
    pub fn blocks(&self) -> &[Box<dyn BlockSolver>] {
        &self.blocks
    }

    /// Mutable access to the blocks.
    pub fn blocks_mut(&mut self) -> &mut [Box<dyn BlockSolver>] {
        &mut self.blocks
    }

    /// The validated synchronizer.
    pub fn synchronizer(&self) -> &InterBlockSynchronizer {
        &self.sync
    }

    /// The sub-stage schedule.
    pub fn plan(&self) -> &SubStagePlan {
        &self.plan
    }

    /// Whether [`advance`](Self::advance) runs dual-time steps.
    pub fn is_dual(&self) -> bool {
        self.dual_iterations.is_some()
    }

    /// Physical steps attempted so far.
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Metrics of the most recent step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Give the blocks back.
    pub fn into_blocks(self) -> Vec<Box<dyn BlockSolver>> {
        self.blocks
    }

    fn finish(&mut self, start: Instant, mut metrics: StepMetrics) {
        metrics.total_us = start.elapsed().as_micros() as u64;
        self.steps += 1;
        self.last_metrics = metrics;
    }

    fn run_substage(
        &mut self,
        substage: usize,
        update: UpdateKind,
        metrics: &mut StepMetrics,
    ) -> Result<(), StepError> {
        trace!(substage, ?update, "sub-stage");
        for &op in self.plan.ops() {
            let blocks = &mut self.blocks;
            match op {
                MarchOp::LocalBc(stage) => self.exec.for_each_block(blocks, |b| b.bc(stage)),
                MarchOp::Sync(stage) => {
                    let t0 = Instant::now();
                    self.sync.synchronize(stage, blocks)?;
                    metrics.sync_us += t0.elapsed().as_micros() as u64;
                    metrics.sync_calls += 1;
                }
                MarchOp::ClearFlux => self.exec.for_each_block(blocks, |b| b.clear_flux()),
                MarchOp::CalcUTempCenter => {
                    self.exec.for_each_block(blocks, |b| b.calc_u_temp_center())
                }
                MarchOp::InterpQSurf => {
                    self.exec.for_each_block(blocks, |b| b.flux_diffusion_interp_qsurf())
                }
                MarchOp::IntegrateGradientCenter => self
                    .exec
                    .for_each_block(blocks, |b| b.flux_diffusion_integrate_gradient_center()),
                MarchOp::CalcGradientSurf => self
                    .exec
                    .for_each_block(blocks, |b| b.flux_diffusion_calc_gradient_surf()),
                MarchOp::CalcFluxDiffusion => {
                    self.exec.for_each_block(blocks, |b| b.calc_flux_diffusion())
                }
                MarchOp::FluxAdvect => self.exec.for_each_block(blocks, |b| b.flux_advect()),
                MarchOp::Update => {
                    match update {
                        UpdateKind::Plain => {
                            self.exec.for_each_block(blocks, |b| b.time_march_rk3(substage))
                        }
                        UpdateKind::Dual { outer_index } => self.exec.for_each_block(blocks, |b| {
                            b.time_march_rk3_dual(substage, outer_index)
                        }),
                    }
                    metrics.substages += 1;
                    self.check_finite(substage)?;
                }
            }
        }
        Ok(())
    }

    fn check_finite(&self, substage: usize) -> Result<(), StepError> {
        for (k, b) in self.blocks.iter().enumerate() {
            if let Some((cell, component, value)) = b.fields().first_non_finite_q() {
                return Err(StepError::Divergence {
                    divergence: NumericalDivergence {
                        block: BlockId(k as u32),
                        cell,
                        component,
                        value,
                    },
                    substage,
                });
            }
        }
        Ok(())
    }
}
