//! Two-block viscous channel, run headless.
//!
//! Demonstrates:
//!   1. Building two rectangle blocks and joining them with a seam coupling
//!   2. Installing inlet, outlet and wall boundaries
//!   3. Dual-time viscous marching through a `SimulationLoop`
//!   4. Reading monitor points and a line probe from `SummaryDrawer`
//!
//! Run with:
//!   RUST_LOG=info cargo run --example two_block_channel

use std::error::Error;
use std::sync::Arc;

use mbflow_block::RectangleMesh;
use mbflow_core::{Axis, BlockId, BoundaryKind, DisplayVar, FaceEnd, LocalBoundary, March};
use mbflow_coupling::{BlockSolver, ConnectionDescriptor, Coupling};
use mbflow_engine::{
    DualTimeConfig, ExecutionConfig, ExecutionContext, MarchConfig, SimulationConfig,
    SimulationLoop, SummaryDrawer, TimeMarchController,
};
use mbflow_solvers::{ConvectScheme, FvmBlockSolver, FvmConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// ─── Channel parameters ─────────────────────────────────────────

const NI: usize = 16;
const NJ: usize = 8;
const LENGTH: f64 = 1.0;
const HEIGHT: f64 = 0.5;
const MA0: f64 = 0.3;
const RE0: f64 = 200.0;
const DT: f64 = 1e-3;

// ─── Setup helpers ──────────────────────────────────────────────

fn block(name: &str, x0: f64, config: &FvmConfig) -> Box<dyn BlockSolver> {
    let mesh = RectangleMesh {
        ni: NI,
        nj: NJ,
        origin: [x0, 0.0],
        extent: [LENGTH, HEIGHT],
    };
    Box::new(FvmBlockSolver::rectangle(name, mesh, config.clone()))
}

/// Both directions of the seam between the upstream and downstream block.
fn seam() -> Vec<Coupling> {
    let upstream = ConnectionDescriptor::new(BlockId(0), 1, March::Forward, Axis::I, FaceEnd::End);
    let downstream =
        ConnectionDescriptor::new(BlockId(1), 1, March::Forward, Axis::I, FaceEnd::Start);
    vec![
        Coupling::new(upstream, downstream, NJ),
        Coupling::new(downstream, upstream, NJ),
    ]
}

fn walls() -> [LocalBoundary; 2] {
    let along = (1, NI as i32 + 1);
    [
        LocalBoundary::new(BoundaryKind::NoSlipWall, Axis::J, FaceEnd::Start, along),
        LocalBoundary::new(BoundaryKind::NoSlipWall, Axis::J, FaceEnd::End, along),
    ]
}

fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let fvm = FvmConfig::builder()
        .ma0(MA0)
        .dt(DT)
        .scheme(ConvectScheme::Roe)
        .viscous(RE0)
        .build()?;
    let gas = fvm.gas;

    let march = MarchConfig {
        viscous: true,
        dual_time: Some(DualTimeConfig { iterations: 3 }),
        ..MarchConfig::default()
    };
    let mut config = SimulationConfig {
        dt: DT,
        march: march.clone(),
        display_steps: 25,
        execution: ExecutionConfig { threads: Some(2) },
        max_outer_steps: Some(8),
        ..SimulationConfig::default()
    };
    config.display.display_var = DisplayVar::Mach;
    config.display.display_value_max = 2.0 * MA0;
    config.display.output_line = true;
    config.display.output_line_ends = ([LENGTH, 0.0], [LENGTH, HEIGHT]);
    config.display.output_line_num_points = 16;
    config.display.output_line_var = DisplayVar::U;
    config.display.output_monitor_points = vec![[0.5, 0.25], [1.5, 0.25], [1.5, 0.02]];

    // ─── Blocks, couplings and boundaries ───────────────────────

    let blocks = vec![block("upstream", 0.0, &fvm), block("downstream", LENGTH, &fvm)];
    let exec = Arc::new(ExecutionContext::new(&config.execution)?);
    let mut controller = TimeMarchController::new(blocks, seam(), &march, exec)?;

    let across = (1, NJ as i32 + 1);
    let mut inlet = vec![LocalBoundary::new(
        BoundaryKind::SubsonicInlet,
        Axis::I,
        FaceEnd::Start,
        across,
    )
    .with_value(0)];
    inlet.extend(walls());
    controller.set_bc(0, inlet, vec![gas.freestream()])?;

    let mut outlet = vec![LocalBoundary::new(
        BoundaryKind::SubsonicOutlet,
        Axis::I,
        FaceEnd::End,
        across,
    )
    .with_value(0)];
    outlet.extend(walls());
    controller.set_bc(1, outlet, vec![gas.conserved(1.0, 0.0, 0.0, gas.p0())])?;

    // ─── Run ────────────────────────────────────────────────────

    let mut sim = SimulationLoop::new(controller, SummaryDrawer::new(gas), config)?;
    let summary = sim.run()?;
    info!(
        t = summary.t,
        batches = summary.batches,
        steps = summary.steps,
        "channel run finished"
    );

    if let Some(frame) = sim.drawer().last_frame() {
        for range in &frame.ranges {
            println!("{:>10}: Mach in [{:.4}, {:.4}]", range.block, range.min, range.max);
        }
        for (p, value) in &frame.monitors {
            match value {
                Some(v) => println!("monitor ({:.2}, {:.2}): {v:.4}", p[0], p[1]),
                None => println!("monitor ({:.2}, {:.2}): outside the mesh", p[0], p[1]),
            }
        }
    }
    println!("u across the seam:");
    for s in sim.drawer().last_line() {
        println!("  y = {:.3}  u = {:.4}", s.position[1], s.value);
    }
    Ok(())
}
