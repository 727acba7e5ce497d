//! Core types for the mbflow multi-block flow solver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace: block
//! identifiers, grid index algebra, synchronization stage tags, the
//! non-dimensional gas model, local boundary descriptions, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod error;
pub mod gas;
pub mod grid;
pub mod id;
pub mod stage;

pub use boundary::{BoundaryKind, LocalBoundary};
pub use error::{BoundaryError, CouplingError, HaloConflict, NumericalDivergence, StepError};
pub use gas::{DisplayVar, GasModel, Primitive};
pub use grid::{
    boundary_face_offset, outward_step, Axis, CellIndex, Conserved, FaceEnd, Mat2, March, Vec2,
};
pub use id::BlockId;
pub use stage::StageTag;
