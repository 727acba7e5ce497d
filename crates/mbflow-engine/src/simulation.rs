//! The interactive simulation loop.
//!
//! [`SimulationLoop`] owns physical time and the display cadence and
//! delegates all numerics to a [`TimeMarchController`]. Control input
//! arrives as [`ControlSignal`]s over a channel and is polled once per
//! outer step, never inside the flux/sync pipeline.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use mbflow_core::StepError;
use tracing::{info, warn};

use crate::config::{ConfigError, DivergencePolicy, SimulationConfig};
use crate::drawer::{Drawer, GuiHandle};
use crate::march::TimeMarchController;

/// Logical input to the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlSignal {
    /// Stop after the current outer step.
    Quit,
    /// Switch between running and paused.
    TogglePause,
}

/// Cloneable sender for [`ControlSignal`]s.
#[derive(Clone, Debug)]
pub struct ControlHandle {
    tx: Sender<ControlSignal>,
}

impl ControlHandle {
    /// Send a signal. Returns `false` once the loop is gone.
    pub fn send(&self, signal: ControlSignal) -> bool {
        self.tx.send(signal).is_ok()
    }

    /// Ask the loop to quit.
    pub fn quit(&self) -> bool {
        self.send(ControlSignal::Quit)
    }

    /// Toggle pause.
    pub fn toggle_pause(&self) -> bool {
        self.send(ControlSignal::TogglePause)
    }
}

/// Loop state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Advancing time.
    Running,
    /// Time frozen, display kept alive.
    Paused,
    /// Terminal.
    Quit,
}

/// Outcome of [`SimulationLoop::run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// Physical time reached.
    pub t: f64,
    /// Display batches completed.
    pub batches: u64,
    /// Controller steps taken.
    pub steps: u64,
    /// Divergences logged and skipped under [`DivergencePolicy::Continue`].
    pub divergences: u64,
}

/// Wall-clock stepping, display cadence and pause/quit handling.
pub struct SimulationLoop<D: Drawer> {
    controller: TimeMarchController,
    drawer: D,
    config: SimulationConfig,
    t: f64,
    step_index: u64,
    state: RunState,
    divergences: u64,
    initialized: bool,
    control_tx: Sender<ControlSignal>,
    control_rx: Receiver<ControlSignal>,
}

impl<D: Drawer> SimulationLoop<D> {
    /// Validate `config` and assemble the loop.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from [`SimulationConfig::validate`], or
    /// [`ConfigError::TimeStepMismatch`] if a block reports a time step
    /// other than `config.dt`.
    pub fn new(
        controller: TimeMarchController,
        drawer: D,
        config: SimulationConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        for (block, b) in controller.blocks().iter().enumerate() {
            if let Some(block_dt) = b.dt() {
                if (block_dt - config.dt).abs() > 1e-12 * config.dt {
                    return Err(ConfigError::TimeStepMismatch {
                        block,
                        block_dt,
                        dt: config.dt,
                    });
                }
            }
        }
        let (control_tx, control_rx) = unbounded();
        Ok(Self {
            controller,
            drawer,
            config,
            t: 0.0,
            step_index: 0,
            state: RunState::Running,
            divergences: 0,
            initialized: false,
            control_tx,
            control_rx,
        })
    }

    /// A handle for sending [`ControlSignal`]s.
    pub fn control_handle(&self) -> ControlHandle {
        ControlHandle {
            tx: self.control_tx.clone(),
        }
    }

    /// Initialize blocks and the drawer. Called by [`run`](Self::run) if
    /// not called explicitly.
    pub fn init(&mut self) -> Result<(), StepError> {
        self.controller.init()?;
        self.controller.set_time(self.t);
        self.drawer.set_display_options(&self.config.display);
        let gui = GuiHandle::new("mbflow", self.control_handle());
        self.drawer.set_gui(gui);
        self.drawer.init_display(self.controller.blocks());
        self.initialized = true;
        Ok(())
    }

    /// Run until quit or `max_outer_steps`.
    ///
    /// # Errors
    ///
    /// The first [`StepError`] under [`DivergencePolicy::Halt`], or any
    /// synchronization failure.
    pub fn run(&mut self) -> Result<RunSummary, StepError> {
        if !self.initialized {
            self.init()?;
        }
        while self.tick()? != RunState::Quit {}
        info!(t = self.t, batches = self.step_index, "simulation finished");
        Ok(self.summary())
    }

    /// One outer step: poll input, then run a display batch or, while
    /// paused, wait for input and redraw.
    pub fn tick(&mut self) -> Result<RunState, StepError> {
        self.poll_signals();
        if self
            .config
            .max_outer_steps
            .is_some_and(|max| self.step_index >= max)
        {
            self.state = RunState::Quit;
        }
        match self.state {
            RunState::Quit => {}
            RunState::Paused => self.paused_tick(),
            RunState::Running => self.run_batch()?,
        }
        Ok(self.state)
    }

    /// Current physical time.
    pub fn time(&self) -> f64 {
        self.t
    }

    /// Display batches completed.
    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    /// Current loop state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The controller.
    pub fn controller(&self) -> &TimeMarchController {
        &self.controller
    }

    /// The drawer.
    pub fn drawer(&self) -> &D {
        &self.drawer
    }

    /// Totals so far.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            t: self.t,
            batches: self.step_index,
            steps: self.controller.step_count(),
            divergences: self.divergences,
        }
    }

    fn apply(&mut self, signal: ControlSignal) {
        self.state = match (signal, self.state) {
            (_, RunState::Quit) | (ControlSignal::Quit, _) => RunState::Quit,
            (ControlSignal::TogglePause, RunState::Running) => RunState::Paused,
            (ControlSignal::TogglePause, RunState::Paused) => RunState::Running,
        };
    }

    fn poll_signals(&mut self) {
        while let Ok(signal) = self.control_rx.try_recv() {
            self.apply(signal);
        }
    }

    fn paused_tick(&mut self) {
        match self
            .control_rx
            .recv_timeout(self.config.pause_redraw_interval)
        {
            Ok(signal) => self.apply(signal),
            Err(RecvTimeoutError::Timeout) => {}
            // the loop holds a sender
            Err(RecvTimeoutError::Disconnected) => self.state = RunState::Quit,
        }
        if self.state == RunState::Paused && self.config.display.display_field {
            let last = self.step_index.saturating_sub(1);
            self.drawer.display(last, self.controller.blocks());
        }
    }

    fn run_batch(&mut self) -> Result<(), StepError> {
        for _ in 0..self.config.display_steps {
            match self.controller.advance() {
                Ok(()) => {}
                Err(e @ StepError::Divergence { .. })
                    if self.config.divergence == DivergencePolicy::Continue =>
                {
                    warn!(error = %e, t = self.t, "divergence, continuing");
                    self.divergences += 1;
                }
                Err(e) => return Err(e),
            }
            self.t += self.config.dt;
            self.controller.set_time(self.t);
        }

        let blocks = self.controller.blocks();
        if self.config.display.display_field {
            self.drawer.display(self.step_index, blocks);
        }
        if self.config.display.output_line {
            self.drawer.display_output_line(blocks);
        }
        let m = self.controller.last_metrics();
        info!(
            step_index = self.step_index,
            t = self.t,
            step_us = m.total_us,
            sync_us = m.sync_us,
            "batch complete"
        );
        self.step_index += 1;
        Ok(())
    }
}
