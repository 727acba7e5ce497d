//! Time-march controller and simulation loop for mbflow.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | [`SimulationConfig`], [`MarchConfig`], validation, [`ConfigError`] |
//! | [`context`] | [`ExecutionContext`]: serial or rayon dispatch over blocks |
//! | [`schedule`] | [`SubStagePlan`]: the RK3 sub-stage operation table |
//! | [`march`] | [`TimeMarchController`]: RK3 and dual-time stepping |
//! | [`drawer`] | [`Drawer`] trait, [`NullDrawer`], [`SummaryDrawer`] |
//! | [`simulation`] | [`SimulationLoop`] with pause/quit control |
//! | [`metrics`] | [`StepMetrics`] |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod drawer;
pub mod march;
pub mod metrics;
pub mod schedule;
pub mod simulation;

pub use config::{
    ConfigError, DisplayOptions, DivergencePolicy, DualTimeConfig, ExecutionConfig, MarchConfig,
    SimulationConfig,
};
pub use context::ExecutionContext;
pub use drawer::{
    nearest_cell, BlockRange, Drawer, FrameSummary, GuiHandle, LineSample, NullDrawer,
    SummaryDrawer,
};
pub use march::TimeMarchController;
pub use metrics::StepMetrics;
pub use schedule::{MarchOp, SubStagePlan};
pub use simulation::{ControlHandle, ControlSignal, RunState, RunSummary, SimulationLoop};
