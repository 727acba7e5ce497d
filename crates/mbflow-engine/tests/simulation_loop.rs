//! Outer-loop behaviour: display cadence, pause, quit and divergence policy.

use std::sync::Arc;
use std::time::Duration;

use mbflow_block::RectangleMesh;
use mbflow_core::StepError;
use mbflow_coupling::BlockSolver;
use mbflow_engine::{
    ConfigError, DisplayOptions, DivergencePolicy, Drawer, ExecutionContext, GuiHandle,
    MarchConfig, RunState, SimulationConfig, SimulationLoop, TimeMarchController,
};
use mbflow_solvers::{FvmBlockSolver, FvmConfig};
use mbflow_test_utils::{
    calls_for, numbered_fields, periodic_couplings, CallLog, RecordingSolver, SolverCall,
};

/// Counts every drawer call and remembers the step indices displayed.
#[derive(Default)]
struct CountingDrawer {
    gui_title: Option<String>,
    options: Option<DisplayOptions>,
    inits: usize,
    displayed: Vec<u64>,
    lines: usize,
}

impl Drawer for CountingDrawer {
    fn set_gui(&mut self, gui: GuiHandle) {
        self.gui_title = Some(gui.title().to_string());
    }

    fn set_display_options(&mut self, options: &DisplayOptions) {
        self.options = Some(options.clone());
    }

    fn init_display(&mut self, blocks: &[Box<dyn BlockSolver>]) {
        assert_eq!(blocks.len(), 1);
        self.inits += 1;
    }

    fn display(&mut self, step_index: u64, _blocks: &[Box<dyn BlockSolver>]) {
        self.displayed.push(step_index);
    }

    fn display_output_line(&mut self, _blocks: &[Box<dyn BlockSolver>]) {
        self.lines += 1;
    }
}

fn config() -> SimulationConfig {
    SimulationConfig {
        dt: 0.25,
        display_steps: 2,
        pause_redraw_interval: Duration::from_millis(1),
        ..SimulationConfig::default()
    }
}

fn sim_with(solver: RecordingSolver, config: SimulationConfig) -> SimulationLoop<CountingDrawer> {
    let controller = TimeMarchController::new(
        vec![Box::new(solver) as Box<dyn BlockSolver>],
        periodic_couplings(0, 4, 4),
        &config.march,
        Arc::new(ExecutionContext::serial()),
    )
    .unwrap();
    SimulationLoop::new(controller, CountingDrawer::default(), config).unwrap()
}

fn sim(config: SimulationConfig) -> (SimulationLoop<CountingDrawer>, CallLog) {
    let log = RecordingSolver::new_log();
    let solver = RecordingSolver::new("box", numbered_fields(0, 4, 4), log.clone());
    (sim_with(solver, config), log)
}

#[test]
fn run_stops_after_max_outer_steps() {
    let (mut s, log) = sim(SimulationConfig {
        max_outer_steps: Some(3),
        ..config()
    });

    let summary = s.run().unwrap();

    assert_eq!(summary.batches, 3);
    assert_eq!(summary.steps, 6);
    assert_eq!(summary.divergences, 0);
    assert_eq!(summary.t, 1.5);
    assert_eq!(s.state(), RunState::Quit);

    let d = s.drawer();
    assert_eq!(d.gui_title.as_deref(), Some("mbflow"));
    assert_eq!(d.inits, 1);
    assert_eq!(d.displayed, vec![0, 1, 2]);
    assert_eq!(d.lines, 0);
    assert!(d.options.is_some());

    let times: Vec<f64> = calls_for(&log, "box")
        .into_iter()
        .filter_map(|c| match c {
            SolverCall::SetTime(t) => Some(t),
            _ => None,
        })
        .collect();
    assert_eq!(times, vec![0.0, 0.25, 0.5, 0.75, 1.0, 1.25, 1.5]);
}

#[test]
fn output_line_and_field_display_follow_options() {
    let mut cfg = SimulationConfig {
        max_outer_steps: Some(2),
        ..config()
    };
    cfg.display.display_field = false;
    cfg.display.output_line = true;
    let (mut s, _log) = sim(cfg);

    s.run().unwrap();

    assert!(s.drawer().displayed.is_empty());
    assert_eq!(s.drawer().lines, 2);
}

#[test]
fn quit_before_run_stops_without_stepping() {
    let (mut s, log) = sim(config());
    assert!(s.control_handle().quit());

    let summary = s.run().unwrap();

    assert_eq!(summary.batches, 0);
    assert_eq!(summary.steps, 0);
    assert_eq!(summary.t, 0.0);
    let calls = calls_for(&log, "box");
    assert_eq!(calls.first(), Some(&SolverCall::Init));
    assert!(!calls.iter().any(|c| matches!(c, SolverCall::Rk3(_))));
}

#[test]
fn pause_freezes_time_and_keeps_redrawing() {
    let (mut s, _log) = sim(config());
    s.init().unwrap();
    let handle = s.control_handle();

    assert_eq!(s.tick().unwrap(), RunState::Running);
    assert_eq!(s.time(), 0.5);

    handle.toggle_pause();
    assert_eq!(s.tick().unwrap(), RunState::Paused);
    assert_eq!(s.tick().unwrap(), RunState::Paused);
    assert_eq!(s.time(), 0.5);
    assert_eq!(s.step_index(), 1);
    assert_eq!(s.controller().step_count(), 2);
    // One batch display, then a redraw of that batch per paused tick.
    assert_eq!(s.drawer().displayed, vec![0, 0, 0]);

    handle.toggle_pause();
    assert_eq!(s.tick().unwrap(), RunState::Running);
    assert_eq!(s.time(), 1.0);

    handle.quit();
    assert_eq!(s.tick().unwrap(), RunState::Quit);
    assert_eq!(s.tick().unwrap(), RunState::Quit);
    assert_eq!(s.time(), 1.0);
}

#[test]
fn quit_while_paused_is_honoured() {
    let (mut s, _log) = sim(config());
    s.init().unwrap();
    let handle = s.control_handle();
    handle.toggle_pause();
    assert_eq!(s.tick().unwrap(), RunState::Paused);

    handle.quit();
    assert_eq!(s.tick().unwrap(), RunState::Quit);
    assert_eq!(s.summary().steps, 0);
}

#[test]
fn divergence_halts_by_default() {
    let log = RecordingSolver::new_log();
    let solver = RecordingSolver::new("box", numbered_fields(0, 4, 4), log.clone()).poison_at_march(4);
    let mut s = sim_with(
        solver,
        SimulationConfig {
            max_outer_steps: Some(5),
            ..config()
        },
    );

    match s.run() {
        Err(StepError::Divergence { substage: 1, .. }) => {}
        other => panic!("expected divergence at sub-stage 1, got {other:?}"),
    }
    // Only the first step completed; time stops where it was.
    assert_eq!(s.time(), 0.25);
    assert_eq!(s.step_index(), 0);
}

#[test]
fn divergence_is_counted_under_continue_policy() {
    let log = RecordingSolver::new_log();
    let solver = RecordingSolver::new("box", numbered_fields(0, 4, 4), log.clone()).poison_at_march(0);
    let mut s = sim_with(
        solver,
        SimulationConfig {
            max_outer_steps: Some(2),
            divergence: DivergencePolicy::Continue,
            ..config()
        },
    );

    let summary = s.run().unwrap();

    // The poisoned cell stays NaN, so every step reports it.
    assert_eq!(summary.divergences, 4);
    assert_eq!(summary.steps, 4);
    assert_eq!(summary.t, 1.0);
}

#[test]
fn invalid_config_is_rejected_before_running() {
    let log = RecordingSolver::new_log();
    let controller = TimeMarchController::new(
        vec![Box::new(RecordingSolver::new("box", numbered_fields(0, 4, 4), log)) as Box<dyn BlockSolver>],
        periodic_couplings(0, 4, 4),
        &MarchConfig::default(),
        Arc::new(ExecutionContext::serial()),
    )
    .unwrap();
    let cfg = SimulationConfig {
        display_steps: 0,
        ..config()
    };
    match SimulationLoop::new(controller, CountingDrawer::default(), cfg) {
        Err(ConfigError::DisplayStepsZero) => {}
        Err(other) => panic!("expected DisplayStepsZero, got {other:?}"),
        Ok(_) => panic!("expected DisplayStepsZero, got a loop"),
    }
}

fn fvm_controller(dt: f64) -> TimeMarchController {
    let fvm = FvmConfig::builder().ma0(0.5).dt(dt).build().unwrap();
    let mesh = RectangleMesh {
        ni: 4,
        nj: 4,
        origin: [0.0, 0.0],
        extent: [1.0, 1.0],
    };
    TimeMarchController::new(
        vec![Box::new(FvmBlockSolver::rectangle("box", mesh, fvm)) as Box<dyn BlockSolver>],
        periodic_couplings(0, 4, 4),
        &MarchConfig::default(),
        Arc::new(ExecutionContext::serial()),
    )
    .unwrap()
}

#[test]
fn block_time_step_must_match_loop_time_step() {
    match SimulationLoop::new(fvm_controller(2e-3), CountingDrawer::default(), config()) {
        Err(ConfigError::TimeStepMismatch { block: 0, block_dt, dt }) => {
            assert_eq!(block_dt, 2e-3);
            assert_eq!(dt, 0.25);
        }
        Err(other) => panic!("expected TimeStepMismatch, got {other:?}"),
        Ok(_) => panic!("expected TimeStepMismatch, got a loop"),
    }

    let s = SimulationLoop::new(fvm_controller(0.25), CountingDrawer::default(), config()).unwrap();
    assert_eq!(s.time(), 0.0);
}
