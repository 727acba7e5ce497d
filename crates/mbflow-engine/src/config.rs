//! Simulation configuration, validation, and error types.
//!
//! [`SimulationConfig`] is the input for a [`SimulationLoop`](crate::SimulationLoop).
//! [`validate()`](SimulationConfig::validate) checks structural invariants
//! before any block is touched; coupling and boundary problems surface as
//! [`ConfigError`] when the controller is built.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use mbflow_core::{BoundaryError, CouplingError, DisplayVar, Vec2};

// ── MarchConfig ────────────────────────────────────────────────────

/// Dual-time sub-iteration settings.
#[derive(Clone, Debug, PartialEq)]
pub struct DualTimeConfig {
    /// Pseudo-time RK3 iterations per physical step. Default: 3.
    pub iterations: usize,
}

impl Default for DualTimeConfig {
    fn default() -> Self {
        Self { iterations: 3 }
    }
}

/// Which stages the time-march controller runs.
#[derive(Clone, Debug, PartialEq)]
pub struct MarchConfig {
    /// Run the viscous gradient and diffusion stages. Default: false.
    pub viscous: bool,
    /// Dual-time stepping; `None` marches plain RK3. Default: `None`.
    pub dual_time: Option<DualTimeConfig>,
    /// Run `flux_advect`. Turning it off isolates the diffusion operator.
    /// Default: true.
    pub advection_enabled: bool,
    /// Apply local boundaries at the centre velocity/temperature stage
    /// before it is synchronized. Default: false.
    pub center_vt_local_bc: bool,
}

impl Default for MarchConfig {
    fn default() -> Self {
        Self {
            viscous: false,
            dual_time: None,
            advection_enabled: true,
            center_vt_local_bc: false,
        }
    }
}

// ── DisplayOptions ─────────────────────────────────────────────────

/// What the drawer renders at each display batch.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayOptions {
    /// Render the field every batch. Default: true.
    pub display_field: bool,
    /// Variable shown by the field display. Default: [`DisplayVar::Mach`].
    pub display_var: DisplayVar,
    /// Lower end of the colour range.
    pub display_value_min: f64,
    /// Upper end of the colour range.
    pub display_value_max: f64,
    /// Overlay grid lines.
    pub display_show_grid: bool,
    /// Overlay velocity arrows.
    pub display_show_velocity: bool,
    /// Draw every `(i, j)`-th velocity arrow. Default: `(4, 4)`.
    pub display_show_velocity_skip: (usize, usize),
    /// Sample a line probe every batch. Default: false.
    pub output_line: bool,
    /// Endpoints of the line probe.
    pub output_line_ends: (Vec2, Vec2),
    /// Samples along the probe. Default: 200.
    pub output_line_num_points: usize,
    /// Variable sampled along the probe.
    pub output_line_var: DisplayVar,
    /// Points whose nearest cell is reported every batch.
    pub output_monitor_points: Vec<Vec2>,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            display_field: true,
            display_var: DisplayVar::Mach,
            display_value_min: 0.0,
            display_value_max: 1.0,
            display_show_grid: false,
            display_show_velocity: false,
            display_show_velocity_skip: (4, 4),
            output_line: false,
            output_line_ends: ([0.0, 0.0], [0.0, 0.0]),
            output_line_num_points: 200,
            output_line_var: DisplayVar::Mach,
            output_monitor_points: Vec::new(),
        }
    }
}

// ── ExecutionConfig ────────────────────────────────────────────────

/// Backend for "every block" dispatch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Worker threads. `None` = rayon's default, `Some(1)` = run blocks
    /// serially on the calling thread.
    pub threads: Option<usize>,
}

// ── DivergencePolicy ───────────────────────────────────────────────

/// What the simulation loop does when a step reports non-finite state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DivergencePolicy {
    /// Stop and return the error.
    #[default]
    Halt,
    /// Log a warning and keep stepping.
    Continue,
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected before stepping starts.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Coupling registration failed.
    Coupling(CouplingError),
    /// A block rejected its local boundary list.
    Boundary {
        /// Index of the block.
        block: usize,
        /// The boundary error.
        error: BoundaryError,
    },
    /// No blocks were supplied.
    NoBlocks,
    /// A block index is out of range.
    UnknownBlock {
        /// The requested index.
        block: usize,
        /// Number of blocks.
        n_blocks: usize,
    },
    /// `dt` is NaN, infinite, zero, or negative.
    InvalidTimeStep {
        /// The invalid value.
        value: f64,
    },
    /// A block integrates with a different time step than the loop.
    TimeStepMismatch {
        /// Index of the block.
        block: usize,
        /// The block's own time step.
        block_dt: f64,
        /// The loop's time step.
        dt: f64,
    },
    /// `display_steps` is zero.
    DisplayStepsZero,
    /// Dual time is enabled with zero iterations.
    DualIterationsZero,
    /// `threads` is `Some(0)`.
    ThreadCountZero,
    /// The worker pool could not be built.
    ThreadPool {
        /// Description from the pool builder.
        reason: String,
    },
    /// A display option is inconsistent.
    InvalidDisplay {
        /// Which option and why.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coupling(e) => write!(f, "coupling: {e}"),
            Self::Boundary { block, error } => write!(f, "block {block} boundary: {error}"),
            Self::NoBlocks => write!(f, "no blocks supplied"),
            Self::UnknownBlock { block, n_blocks } => {
                write!(f, "block {block} out of range ({n_blocks} blocks)")
            }
            Self::InvalidTimeStep { value } => {
                write!(f, "dt must be finite and positive, got {value}")
            }
            Self::TimeStepMismatch { block, block_dt, dt } => {
                write!(f, "block {block} integrates with dt {block_dt}, loop advances by {dt}")
            }
            Self::DisplayStepsZero => write!(f, "display_steps must be at least 1"),
            Self::DualIterationsZero => write!(f, "dual-time iterations must be at least 1"),
            Self::ThreadCountZero => write!(f, "thread count must be at least 1"),
            Self::ThreadPool { reason } => write!(f, "thread pool: {reason}"),
            Self::InvalidDisplay { reason } => write!(f, "invalid display options: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Coupling(e) => Some(e),
            Self::Boundary { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<CouplingError> for ConfigError {
    fn from(e: CouplingError) -> Self {
        Self::Coupling(e)
    }
}

// ── SimulationConfig ───────────────────────────────────────────────

/// Top-level settings for a simulation run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Physical time step added to `t` after every controller step.
    ///
    /// Blocks integrate with their own step; any block whose
    /// [`BlockSolver::dt`](mbflow_coupling::BlockSolver::dt) disagrees
    /// makes [`SimulationLoop::new`](crate::SimulationLoop::new) fail.
    pub dt: f64,
    /// Stage selection for the controller.
    pub march: MarchConfig,
    /// Controller steps per display batch. Default: 20.
    pub display_steps: usize,
    /// Drawer options.
    pub display: DisplayOptions,
    /// Block dispatch backend.
    pub execution: ExecutionConfig,
    /// Reaction to non-finite state.
    pub divergence: DivergencePolicy,
    /// Stop after this many display batches. `None` runs until quit.
    pub max_outer_steps: Option<u64>,
    /// How long a paused loop waits for input before redrawing.
    /// Default: 50 ms.
    pub pause_redraw_interval: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: 1e-3,
            march: MarchConfig::default(),
            display_steps: 20,
            display: DisplayOptions::default(),
            execution: ExecutionConfig::default(),
            divergence: DivergencePolicy::default(),
            max_outer_steps: None,
            pause_redraw_interval: Duration::from_millis(50),
        }
    }
}

impl SimulationConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dt > 0.0) || !self.dt.is_finite() {
            return Err(ConfigError::InvalidTimeStep { value: self.dt });
        }
        if self.display_steps == 0 {
            return Err(ConfigError::DisplayStepsZero);
        }
        if self.march.dual_time.as_ref().is_some_and(|d| d.iterations == 0) {
            return Err(ConfigError::DualIterationsZero);
        }
        if self.execution.threads == Some(0) {
            return Err(ConfigError::ThreadCountZero);
        }
        let d = &self.display;
        if d.output_line && d.output_line_num_points < 2 {
            return Err(ConfigError::InvalidDisplay {
                reason: format!(
                    "output_line_num_points must be at least 2, got {}",
                    d.output_line_num_points
                ),
            });
        }
        if !(d.display_value_min < d.display_value_max) {
            return Err(ConfigError::InvalidDisplay {
                reason: format!(
                    "display range [{}, {}] is empty",
                    d.display_value_min, d.display_value_max
                ),
            });
        }
        Ok(())
    }
}
