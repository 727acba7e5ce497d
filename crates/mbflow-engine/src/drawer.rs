//! Display collaborators.
//!
//! The simulation loop calls a [`Drawer`] after every display batch and
//! while paused. Drawers read blocks through shared references only.
//!
//! Two drawers ship with the engine:
//!
//! - [`NullDrawer`]: does nothing (headless runs, benchmarks)
//! - [`SummaryDrawer`]: per-block value ranges, monitor points and line
//!   probes, reported through `tracing`

use mbflow_block::array::interior_cells;
use mbflow_core::{CellIndex, DisplayVar, GasModel, Vec2};
use mbflow_coupling::BlockSolver;
use tracing::{debug, info};

use crate::config::DisplayOptions;
use crate::simulation::ControlHandle;

/// What a drawer gets to talk back to the loop with.
#[derive(Clone, Debug)]
pub struct GuiHandle {
    title: String,
    control: ControlHandle,
}

impl GuiHandle {
    /// Bundle a window title with the loop's control handle.
    pub fn new(title: impl Into<String>, control: ControlHandle) -> Self {
        Self {
            title: title.into(),
            control,
        }
    }

    /// Window or log title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Forward quit/pause input to the simulation loop.
    pub fn control(&self) -> &ControlHandle {
        &self.control
    }
}

/// Visualisation and sampling hooks.
pub trait Drawer {
    /// Receive the handle used to forward user input.
    fn set_gui(&mut self, gui: GuiHandle);

    /// Receive display options; called before [`init_display`](Drawer::init_display).
    fn set_display_options(&mut self, options: &DisplayOptions);

    /// Called once after the blocks are initialized.
    fn init_display(&mut self, blocks: &[Box<dyn BlockSolver>]);

    /// Render the field after batch `step_index`, or re-render while paused.
    fn display(&mut self, step_index: u64, blocks: &[Box<dyn BlockSolver>]);

    /// Sample the line probe.
    fn display_output_line(&mut self, blocks: &[Box<dyn BlockSolver>]);
}

// ── NullDrawer ─────────────────────────────────────────────────────

/// A drawer that ignores every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDrawer;

impl Drawer for NullDrawer {
    fn set_gui(&mut self, _gui: GuiHandle) {}
    fn set_display_options(&mut self, _options: &DisplayOptions) {}
    fn init_display(&mut self, _blocks: &[Box<dyn BlockSolver>]) {}
    fn display(&mut self, _step_index: u64, _blocks: &[Box<dyn BlockSolver>]) {}
    fn display_output_line(&mut self, _blocks: &[Box<dyn BlockSolver>]) {}
}

// ── SummaryDrawer ──────────────────────────────────────────────────

/// Range of the display variable over one block's real cells.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockRange {
    /// Block name.
    pub block: String,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

/// One rendered frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSummary {
    /// Display batch the frame belongs to.
    pub step_index: u64,
    /// Per-block ranges in block order.
    pub ranges: Vec<BlockRange>,
    /// Values at the configured monitor points; `None` when a point has no
    /// block.
    pub monitors: Vec<(Vec2, Option<f64>)>,
}

/// One line-probe sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSample {
    /// Probe position.
    pub position: Vec2,
    /// Value in the nearest real cell.
    pub value: f64,
}

/// Headless drawer that reports field statistics through `tracing`.
#[derive(Clone, Debug)]
pub struct SummaryDrawer {
    gas: GasModel,
    options: DisplayOptions,
    gui: Option<GuiHandle>,
    frames: u64,
    last_frame: Option<FrameSummary>,
    last_line: Vec<LineSample>,
}

impl SummaryDrawer {
    /// A drawer that converts states with `gas`.
    pub fn new(gas: GasModel) -> Self {
        Self {
            gas,
            options: DisplayOptions::default(),
            gui: None,
            frames: 0,
            last_frame: None,
            last_line: Vec::new(),
        }
    }

    /// Frames rendered so far, re-renders included.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The most recent frame.
    pub fn last_frame(&self) -> Option<&FrameSummary> {
        self.last_frame.as_ref()
    }

    /// Handle received through [`Drawer::set_gui`].
    pub fn gui(&self) -> Option<&GuiHandle> {
        self.gui.as_ref()
    }

    /// The most recent line probe.
    pub fn last_line(&self) -> &[LineSample] {
        &self.last_line
    }

    fn sample(&self, blocks: &[Box<dyn BlockSolver>], p: Vec2, var: DisplayVar) -> Option<f64> {
        let (block, cell) = nearest_cell(blocks, p)?;
        Some(self.gas.display_value(&blocks[block].fields().q[cell], var))
    }
}

/// The real cell whose centre is closest to `p`, over all blocks.
pub fn nearest_cell(blocks: &[Box<dyn BlockSolver>], p: Vec2) -> Option<(usize, CellIndex)> {
    let mut best: Option<(f64, usize, CellIndex)> = None;
    for (k, b) in blocks.iter().enumerate() {
        let f = b.fields();
        for c in interior_cells(f.ni, f.nj) {
            let x = f.xc[c];
            let d = (x[0] - p[0]).powi(2) + (x[1] - p[1]).powi(2);
            if best.is_none_or(|(bd, _, _)| d < bd) {
                best = Some((d, k, c));
            }
        }
    }
    best.map(|(_, k, c)| (k, c))
}

impl Drawer for SummaryDrawer {
    fn set_gui(&mut self, gui: GuiHandle) {
        debug!(title = gui.title(), "drawer attached");
        self.gui = Some(gui);
    }

    fn set_display_options(&mut self, options: &DisplayOptions) {
        self.options = options.clone();
    }

    fn init_display(&mut self, blocks: &[Box<dyn BlockSolver>]) {
        let cells: usize = blocks.iter().map(|b| b.fields().ni * b.fields().nj).sum();
        info!(blocks = blocks.len(), cells, var = %self.options.display_var, "display ready");
    }

    fn display(&mut self, step_index: u64, blocks: &[Box<dyn BlockSolver>]) {
        let var = self.options.display_var;
        let ranges: Vec<BlockRange> = blocks
            .iter()
            .map(|b| {
                let f = b.fields();
                let (min, max) = interior_cells(f.ni, f.nj)
                    .map(|c| self.gas.display_value(&f.q[c], var))
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                        (lo.min(v), hi.max(v))
                    });
                BlockRange {
                    block: b.name().to_string(),
                    min,
                    max,
                }
            })
            .collect();
        let monitors = self
            .options
            .output_monitor_points
            .iter()
            .map(|&p| (p, self.sample(blocks, p, var)))
            .collect();

        for r in &ranges {
            info!(step_index, block = %r.block, %var, min = r.min, max = r.max, "frame");
        }
        self.frames += 1;
        self.last_frame = Some(FrameSummary {
            step_index,
            ranges,
            monitors,
        });
    }

    fn display_output_line(&mut self, blocks: &[Box<dyn BlockSolver>]) {
        let (a, b) = self.options.output_line_ends;
        let n = self.options.output_line_num_points.max(2);
        let var = self.options.output_line_var;
        self.last_line = (0..n)
            .filter_map(|k| {
                let s = k as f64 / (n - 1) as f64;
                let p = [a[0] + s * (b[0] - a[0]), a[1] + s * (b[1] - a[1])];
                self.sample(blocks, p, var).map(|value| LineSample { position: p, value })
            })
            .collect();
        let (lo, hi) = self
            .last_line
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.value), hi.max(s.value))
            });
        info!(%var, samples = self.last_line.len(), min = lo, max = hi, "line probe");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbflow_test_utils::{rectangle_fields, RecordingSolver};

    fn blocks() -> Vec<Box<dyn BlockSolver>> {
        let log = RecordingSolver::new_log();
        (0..2)
            .map(|k| {
                let mut f = rectangle_fields(4, 2, [k as f64, 0.0], [1.0, 1.0]);
                let gas = GasModel::new(0.5);
                for c in interior_cells(4, 2) {
                    let rho = 1.0 + k as f64 + 0.1 * c.i as f64;
                    f.q[c] = gas.conserved(rho, 0.0, 0.0, gas.p0());
                }
                Box::new(RecordingSolver::new(format!("b{k}"), f, log.clone()))
                    as Box<dyn BlockSolver>
            })
            .collect()
    }

    #[test]
    fn nearest_cell_crosses_blocks() {
        let bs = blocks();
        assert_eq!(nearest_cell(&bs, [0.1, 0.1]), Some((0, CellIndex::new(1, 1))));
        assert_eq!(nearest_cell(&bs, [1.9, 0.9]), Some((1, CellIndex::new(4, 2))));
    }

    #[test]
    fn frame_reports_block_ranges() {
        let bs = blocks();
        let mut d = SummaryDrawer::new(GasModel::new(0.5));
        d.set_display_options(&DisplayOptions {
            display_var: DisplayVar::Rho,
            output_monitor_points: vec![[0.6, 0.5], [10.0, 10.0]],
            ..DisplayOptions::default()
        });
        d.display(7, &bs);
        let frame = d.last_frame().unwrap();
        assert_eq!(frame.step_index, 7);
        assert!((frame.ranges[0].min - 1.1).abs() < 1e-12);
        assert!((frame.ranges[1].max - 2.4).abs() < 1e-12);
        // (0.6, 0.5) is equidistant from two centres; either is in block 0
        assert!(frame.monitors[0].1.unwrap() < 2.0);
        // far away points still snap to the nearest cell
        assert!(frame.monitors[1].1.is_some());
        assert_eq!(d.frames(), 1);
    }

    #[test]
    fn line_probe_samples_requested_points() {
        let bs = blocks();
        let mut d = SummaryDrawer::new(GasModel::new(0.5));
        d.set_display_options(&DisplayOptions {
            output_line: true,
            output_line_ends: ([0.125, 0.25], [1.875, 0.25]),
            output_line_num_points: 8,
            output_line_var: DisplayVar::Rho,
            ..DisplayOptions::default()
        });
        d.display_output_line(&bs);
        let line = d.last_line();
        assert_eq!(line.len(), 8);
        assert!((line[0].value - 1.1).abs() < 1e-12);
        assert!((line[7].value - 2.4).abs() < 1e-12);
    }
}
