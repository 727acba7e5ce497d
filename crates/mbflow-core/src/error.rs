//! Error types for the mbflow solver.
//!
//! Organized by when they surface: [`CouplingError`] and [`BoundaryError`]
//! are configuration-time (raised before any stepping), while
//! [`StepError`] is raised by the time-march controller mid-run.

use std::error::Error;
use std::fmt;

use crate::grid::{Axis, CellIndex, FaceEnd};
use crate::id::BlockId;

// ── Coupling ───────────────────────────────────────────────────────

/// Two couplings that would both write the same owner halo cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HaloConflict {
    /// The block owning the contested halo cell.
    pub block: BlockId,
    /// The contested halo cell.
    pub cell: CellIndex,
    /// Registration index of the first writer.
    pub first: usize,
    /// Registration index of the second writer.
    pub second: usize,
}

/// Errors from coupling registration and stage decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CouplingError {
    /// A descriptor names a block that does not exist.
    UnknownBlock {
        /// Registration index of the coupling.
        coupling: usize,
        /// The offending block.
        block: BlockId,
        /// Number of registered blocks.
        n_blocks: usize,
    },
    /// The two sides of a coupling declare different cell counts.
    CellCountMismatch {
        /// Registration index of the coupling.
        coupling: usize,
        /// Count on the owner side.
        owner: usize,
        /// Count on the neighbour side.
        neighbor: usize,
    },
    /// A coupling transfers zero cells.
    EmptyCoupling {
        /// Registration index of the coupling.
        coupling: usize,
    },
    /// A descriptor walks off the real cells of its face.
    DescriptorOutOfRange {
        /// Registration index of the coupling.
        coupling: usize,
        /// The block the descriptor refers to.
        block: BlockId,
        /// The first cell found outside the block.
        cell: CellIndex,
    },
    /// Two or more couplings write the same halo cell.
    HaloWriteConflict(Vec<HaloConflict>),
    /// A raw stage code outside the closed set.
    UnknownStage {
        /// The raw code.
        code: i32,
    },
    /// A raw descriptor tuple could not be decoded.
    InvalidDescriptor {
        /// Human-readable description.
        reason: String,
    },
    /// The synchronizer was handed a block list of the wrong length.
    BlockCountMismatch {
        /// Blocks known at registration.
        expected: usize,
        /// Blocks passed to the call.
        actual: usize,
    },
}

impl fmt::Display for CouplingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownBlock {
                coupling,
                block,
                n_blocks,
            } => write!(
                f,
                "coupling {coupling} references block {block}, but only {n_blocks} blocks exist"
            ),
            Self::CellCountMismatch {
                coupling,
                owner,
                neighbor,
            } => write!(
                f,
                "coupling {coupling} has {owner} owner cells but {neighbor} neighbour cells"
            ),
            Self::EmptyCoupling { coupling } => {
                write!(f, "coupling {coupling} transfers zero cells")
            }
            Self::DescriptorOutOfRange {
                coupling,
                block,
                cell,
            } => write!(
                f,
                "coupling {coupling} leaves the real cells of block {block} at {cell}"
            ),
            Self::HaloWriteConflict(conflicts) => {
                write!(f, "halo write conflicts: ")?;
                for (i, c) in conflicts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(
                        f,
                        "block {} cell {} written by couplings {} and {}",
                        c.block, c.cell, c.first, c.second
                    )?;
                }
                Ok(())
            }
            Self::UnknownStage { code } => write!(f, "unknown synchronization stage code {code}"),
            Self::InvalidDescriptor { reason } => write!(f, "invalid descriptor: {reason}"),
            Self::BlockCountMismatch { expected, actual } => write!(
                f,
                "synchronizer built for {expected} blocks but called with {actual}"
            ),
        }
    }
}

impl Error for CouplingError {}

// ── Local boundaries ───────────────────────────────────────────────

/// Errors from validating local boundary-condition specs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoundaryError {
    /// The cell range leaves the face it is declared on.
    RangeOutOfBounds {
        /// Position in the boundary list.
        index: usize,
        /// Face axis.
        face: Axis,
        /// Face end.
        end: FaceEnd,
        /// Declared half-open range.
        range: (i32, i32),
        /// Number of real cells along the face.
        limit: usize,
    },
    /// The cell range is empty.
    EmptyRange {
        /// Position in the boundary list.
        index: usize,
    },
    /// A kind that needs prescribed values has no valid value index.
    MissingValue {
        /// Position in the boundary list.
        index: usize,
        /// The declared value index, if any.
        value_index: Option<usize>,
    },
    /// A raw boundary kind code is not recognised.
    UnknownKind {
        /// The raw code.
        code: i32,
    },
    /// A raw face axis or face end code is not recognised.
    InvalidFace {
        /// Raw axis code.
        face: i32,
        /// Raw end code.
        end: i32,
    },
}

impl fmt::Display for BoundaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RangeOutOfBounds {
                index,
                face,
                end,
                range,
                limit,
            } => write!(
                f,
                "boundary {index} on {face}-{end} face spans {}..{} but the face has cells 1..={limit}",
                range.0, range.1
            ),
            Self::EmptyRange { index } => write!(f, "boundary {index} has an empty cell range"),
            Self::MissingValue { index, value_index } => match value_index {
                Some(v) => write!(f, "boundary {index} refers to missing value set {v}"),
                None => write!(f, "boundary {index} requires a value set"),
            },
            Self::UnknownKind { code } => write!(f, "unknown boundary kind code {code}"),
            Self::InvalidFace { face, end } => {
                write!(f, "invalid face encoding (axis {face}, end {end})")
            }
        }
    }
}

impl Error for BoundaryError {}

// ── Stepping ───────────────────────────────────────────────────────

/// A non-finite conserved value found after a state update.
#[derive(Clone, Debug, PartialEq)]
pub struct NumericalDivergence {
    /// Block containing the bad cell.
    pub block: BlockId,
    /// The first non-finite cell found.
    pub cell: CellIndex,
    /// Component of `q` (0..4) that is non-finite.
    pub component: usize,
    /// The offending value.
    pub value: f64,
}

impl fmt::Display for NumericalDivergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "non-finite q[{}] = {} in block {} at cell {}",
            self.component, self.value, self.block, self.cell
        )
    }
}

impl Error for NumericalDivergence {}

/// Errors from the time-march controller during `step()`.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// The state became non-finite after an RK sub-stage.
    Divergence {
        /// Where the divergence was found.
        divergence: NumericalDivergence,
        /// RK sub-stage (0..3) whose update produced it.
        substage: usize,
    },
    /// A synchronization call failed.
    Coupling(CouplingError),
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Divergence {
                divergence,
                substage,
            } => write!(f, "diverged after RK sub-stage {substage}: {divergence}"),
            Self::Coupling(e) => write!(f, "synchronization failed: {e}"),
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Divergence { divergence, .. } => Some(divergence),
            Self::Coupling(e) => Some(e),
        }
    }
}

impl From<CouplingError> for StepError {
    fn from(e: CouplingError) -> Self {
        Self::Coupling(e)
    }
}
