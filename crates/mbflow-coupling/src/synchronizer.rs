//! The inter-block synchronizer.
//!
//! [`InterBlockSynchronizer::new`] validates the coupling list once, at
//! construction, and resolves every coupling to cell positions. After that
//! [`synchronize`](InterBlockSynchronizer::synchronize) is a barrier: it
//! runs every coupling's transfer for one stage, in registration order,
//! and returns only when all owner halos are refreshed.

use indexmap::IndexMap;
use mbflow_core::{BlockId, CellIndex, CouplingError, HaloConflict, StageTag};
use tracing::{debug, trace};

use crate::descriptor::{ConnectionDescriptor, Coupling};
use crate::geometry::resolve;
use crate::solver::BlockSolver;
use crate::transfer::ResolvedCoupling;

/// Validated couplings and their resolved positions.
#[derive(Debug)]
pub struct InterBlockSynchronizer {
    couplings: Vec<Coupling>,
    resolved: Vec<ResolvedCoupling>,
    n_blocks: usize,
}

impl InterBlockSynchronizer {
    /// Validate `couplings` against the block dimensions `dims[block]`.
    ///
    /// Checks performed, per coupling in order:
    ///
    /// 1. Both blocks exist.
    /// 2. Neither side is empty.
    /// 3. Both sides declare the same cell count.
    /// 4. Every coupled cell on both sides is a real cell of its block.
    ///
    /// and then across couplings:
    ///
    /// 5. No owner halo cell is written by two couplings.
    pub fn new(couplings: Vec<Coupling>, dims: &[(usize, usize)]) -> Result<Self, CouplingError> {
        let n_blocks = dims.len();
        let mut resolved = Vec::with_capacity(couplings.len());

        for (index, coupling) in couplings.iter().enumerate() {
            for side in [&coupling.owner, &coupling.neighbor] {
                if side.block.index() >= n_blocks {
                    return Err(CouplingError::UnknownBlock {
                        coupling: index,
                        block: side.block,
                        n_blocks,
                    });
                }
            }
            if coupling.owner_cells == 0 || coupling.neighbor_cells == 0 {
                return Err(CouplingError::EmptyCoupling { coupling: index });
            }
            if coupling.owner_cells != coupling.neighbor_cells {
                return Err(CouplingError::CellCountMismatch {
                    coupling: index,
                    owner: coupling.owner_cells,
                    neighbor: coupling.neighbor_cells,
                });
            }
            for side in [&coupling.owner, &coupling.neighbor] {
                check_in_range(index, side, coupling.num(), dims[side.block.index()])?;
            }
            resolved.push(ResolvedCoupling::new(
                coupling,
                dims[coupling.owner.block.index()],
                dims[coupling.neighbor.block.index()],
            ));
        }

        let mut last_writer: IndexMap<(BlockId, CellIndex), usize> = IndexMap::new();
        let mut conflicts = Vec::new();
        for (index, (coupling, r)) in couplings.iter().zip(&resolved).enumerate() {
            for halo in r.owner_halos() {
                let key = (coupling.owner.block, halo);
                if let Some(&first) = last_writer.get(&key) {
                    conflicts.push(HaloConflict {
                        block: coupling.owner.block,
                        cell: halo,
                        first,
                        second: index,
                    });
                }
                last_writer.insert(key, index);
            }
        }
        if !conflicts.is_empty() {
            return Err(CouplingError::HaloWriteConflict(conflicts));
        }

        debug!(
            couplings = couplings.len(),
            blocks = n_blocks,
            halo_cells = last_writer.len(),
            "inter-block couplings registered"
        );

        Ok(Self {
            couplings,
            resolved,
            n_blocks,
        })
    }

    /// Build against the dimensions of an existing solver list.
    pub fn for_blocks(
        couplings: Vec<Coupling>,
        blocks: &[Box<dyn BlockSolver>],
    ) -> Result<Self, CouplingError> {
        let dims: Vec<_> = blocks.iter().map(|b| b.fields().dims()).collect();
        Self::new(couplings, &dims)
    }

    /// Refresh every owner halo for `stage`.
    ///
    /// # Errors
    ///
    /// [`CouplingError::BlockCountMismatch`] if `blocks` is not the list the
    /// synchronizer was validated against.
    pub fn synchronize(
        &self,
        stage: StageTag,
        blocks: &mut [Box<dyn BlockSolver>],
    ) -> Result<(), CouplingError> {
        if blocks.len() != self.n_blocks {
            return Err(CouplingError::BlockCountMismatch {
                expected: self.n_blocks,
                actual: blocks.len(),
            });
        }
        trace!(%stage, couplings = self.resolved.len(), "synchronize");
        for r in &self.resolved {
            r.apply(stage, blocks);
        }
        Ok(())
    }

    /// Decode a raw stage code and synchronize it.
    pub fn synchronize_code(
        &self,
        code: i32,
        blocks: &mut [Box<dyn BlockSolver>],
    ) -> Result<(), CouplingError> {
        self.synchronize(StageTag::from_code(code)?, blocks)
    }

    /// The registered couplings, in registration order.
    pub fn couplings(&self) -> &[Coupling] {
        &self.couplings
    }

    /// Resolved positions, parallel to [`couplings`](Self::couplings).
    pub fn resolved(&self) -> &[ResolvedCoupling] {
        &self.resolved
    }

    /// Number of blocks the synchronizer was validated against.
    pub fn n_blocks(&self) -> usize {
        self.n_blocks
    }
}

fn check_in_range(
    coupling: usize,
    side: &ConnectionDescriptor,
    num: usize,
    (ni, nj): (usize, usize),
) -> Result<(), CouplingError> {
    let g = resolve(side, ni, nj);
    // Cells advance linearly, so the two ends bound the run.
    for cell in [g.cell(0), g.cell(num - 1)] {
        if !cell.is_interior(ni, nj) {
            return Err(CouplingError::DescriptorOutOfRange {
                coupling,
                block: side.block,
                cell,
            });
        }
    }
    Ok(())
}
