//! Test utilities and mock solvers for mbflow development.
//!
//! Provides a [`RecordingSolver`] that implements [`BlockSolver`] without
//! any numerics and logs every hook call, plus field and coupling fixtures
//! for building multi-block scenarios.
//!
//! [`BlockSolver`]: mbflow_coupling::BlockSolver

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod recording;

pub use fixtures::{
    cell_tag, numbered_fields, periodic_couplings, random_fields, rectangle_fields, side_by_side_couplings,
};
pub use recording::{calls_for, CallLog, RecordingSolver, SolverCall};
