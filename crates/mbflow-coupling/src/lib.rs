//! Block solver interface and inter-block halo synchronization.
//!
//! A multi-block run is a list of independently owned [`BlockSolver`]s
//! joined by [`Coupling`]s. Each coupling says which edge cells of a
//! neighbour block feed which halo cells of an owner block, walking along
//! both faces with possibly different orientation. The
//! [`InterBlockSynchronizer`] validates the coupling list once and then, on
//! request, refreshes every owner halo for a given [`StageTag`].
//!
//! [`StageTag`]: mbflow_core::StageTag

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod descriptor;
pub mod geometry;
pub mod solver;
pub mod synchronizer;
pub mod transfer;

pub use descriptor::{ConnectionDescriptor, Coupling};
pub use geometry::{resolve, surface_range_offset, ConnectionGeometry};
pub use solver::BlockSolver;
pub use synchronizer::InterBlockSynchronizer;
pub use transfer::{HaloPayload, ResolvedCoupling};
