//! Benchmark profiles for the mbflow solver.
//!
//! Every profile tiles the unit square with `bx × by` equal blocks coupled
//! into a doubly periodic domain, so there are no local boundaries and all
//! halo traffic goes through the synchronizer:
//!
//! - [`reference_profile`]: 2x2 tiles of 32x32 cells (4K cells)
//! - [`stress_profile`]: 4x4 tiles of 64x64 cells (~65K cells)
//! - [`tiled_blocks`] / [`tile_couplings`]: the raw pieces, for benches
//!   that drive the synchronizer directly

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::error::Error;
use std::sync::Arc;

use mbflow_block::RectangleMesh;
use mbflow_core::{Axis, BlockId, Conserved, FaceEnd, GasModel, March};
use mbflow_coupling::{BlockSolver, ConnectionDescriptor, Coupling};
use mbflow_engine::{ExecutionContext, MarchConfig, TimeMarchController};
use mbflow_solvers::{ConvectScheme, FvmBlockSolver, FvmConfig};

/// Solver settings shared by every profile: Ma 0.5, Re 1000, Roe flux.
pub fn profile_config() -> FvmConfig {
    FvmConfig::builder()
        .ma0(0.5)
        .dt(1e-3)
        .scheme(ConvectScheme::Roe)
        .viscous(1000.0)
        .build()
        // constant inputs
        .unwrap_or_else(|e| panic!("invalid profile config: {e}"))
}

/// A smooth periodic perturbation of the free stream.
pub fn wave(gas: &GasModel, x: [f64; 2]) -> Conserved {
    let tau = std::f64::consts::TAU;
    gas.conserved(
        1.0 + 0.1 * (tau * x[0]).sin() * (tau * x[1]).cos(),
        1.0,
        0.2 * (tau * x[0]).cos(),
        gas.p0() * (1.0 + 0.05 * (tau * x[1]).sin()),
    )
}

/// `bx × by` blocks of `n × n` cells tiling the unit square, numbered row
/// by row. The blocks are not yet initialized.
pub fn tiled_blocks(bx: usize, by: usize, n: usize, config: &FvmConfig) -> Vec<Box<dyn BlockSolver>> {
    let (w, h) = (1.0 / bx as f64, 1.0 / by as f64);
    let mut blocks: Vec<Box<dyn BlockSolver>> = Vec::with_capacity(bx * by);
    for ty in 0..by {
        for tx in 0..bx {
            let mesh = RectangleMesh {
                ni: n,
                nj: n,
                origin: [tx as f64 * w, ty as f64 * h],
                extent: [w, h],
            };
            blocks.push(Box::new(FvmBlockSolver::rectangle(
                format!("tile-{tx}-{ty}"),
                mesh,
                config.clone(),
            )));
        }
    }
    blocks
}

/// Overwrite every real cell with [`wave`].
pub fn seed_wave(blocks: &mut [Box<dyn BlockSolver>], gas: &GasModel) {
    for b in blocks {
        let f = b.fields_mut();
        let cells: Vec<_> = f.interior().collect();
        for c in cells {
            let x = f.xc[c];
            f.q[c] = wave(gas, x);
        }
    }
}

/// Couplings joining `bx × by` tiles of `n × n` cells into a doubly
/// periodic domain. Single-tile rows or columns couple to themselves.
pub fn tile_couplings(bx: usize, by: usize, n: usize) -> Vec<Coupling> {
    let id = |tx: usize, ty: usize| BlockId((ty * bx + tx) as u32);
    let side = |b, face, end| ConnectionDescriptor::new(b, 1, March::Forward, face, end);
    let mut couplings = Vec::with_capacity(4 * bx * by);
    for ty in 0..by {
        for tx in 0..bx {
            let here = id(tx, ty);
            let right = id((tx + 1) % bx, ty);
            let above = id(tx, (ty + 1) % by);
            for (other, axis) in [(right, Axis::I), (above, Axis::J)] {
                let a = side(here, axis, FaceEnd::End);
                let b = side(other, axis, FaceEnd::Start);
                couplings.push(Coupling::new(a, b, n));
                couplings.push(Coupling::new(b, a, n));
            }
        }
    }
    couplings
}

fn profile(
    bx: usize,
    by: usize,
    n: usize,
    march: &MarchConfig,
    exec: ExecutionContext,
) -> Result<TimeMarchController, Box<dyn Error>> {
    let config = profile_config();
    let blocks = tiled_blocks(bx, by, n, &config);
    let couplings = tile_couplings(bx, by, n);
    let mut controller = TimeMarchController::new(blocks, couplings, march, Arc::new(exec))?;
    controller.init()?;
    seed_wave(controller.blocks_mut(), &config.gas);
    Ok(controller)
}

/// 2x2 tiles of 32x32 cells, initialized and seeded with [`wave`].
pub fn reference_profile(
    march: &MarchConfig,
    exec: ExecutionContext,
) -> Result<TimeMarchController, Box<dyn Error>> {
    profile(2, 2, 32, march, exec)
}

/// 4x4 tiles of 64x64 cells.
///
/// Same setup as [`reference_profile`] at 16x the cell count.
pub fn stress_profile(
    march: &MarchConfig,
    exec: ExecutionContext,
) -> Result<TimeMarchController, Box<dyn Error>> {
    profile(4, 4, 64, march, exec)
}
