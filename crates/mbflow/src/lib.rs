//! mbflow: a multi-block structured-grid compressible Navier-Stokes solver.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all mbflow sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use mbflow::prelude::*;
//! use mbflow::block::RectangleMesh;
//!
//! let config = FvmConfig::builder().ma0(0.5).dt(1e-3).build().unwrap();
//! let mesh = RectangleMesh { ni: 8, nj: 8, origin: [0.0, 0.0], extent: [1.0, 1.0] };
//! let blocks: Vec<Box<dyn BlockSolver>> =
//!     vec![Box::new(FvmBlockSolver::rectangle("box", mesh, config))];
//!
//! // One block, periodic in both directions.
//! let side = |face, end| ConnectionDescriptor::new(BlockId(0), 1, March::Forward, face, end);
//! let couplings = vec![
//!     Coupling::new(side(Axis::I, FaceEnd::Start), side(Axis::I, FaceEnd::End), 8),
//!     Coupling::new(side(Axis::I, FaceEnd::End), side(Axis::I, FaceEnd::Start), 8),
//!     Coupling::new(side(Axis::J, FaceEnd::Start), side(Axis::J, FaceEnd::End), 8),
//!     Coupling::new(side(Axis::J, FaceEnd::End), side(Axis::J, FaceEnd::Start), 8),
//! ];
//!
//! let mut controller = TimeMarchController::new(
//!     blocks,
//!     couplings,
//!     &MarchConfig::default(),
//!     Arc::new(ExecutionContext::serial()),
//! )
//! .unwrap();
//! controller.init().unwrap();
//! controller.step().unwrap();
//! assert_eq!(controller.step_count(), 1);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `mbflow-core` | Indices, stage tags, boundary kinds, gas model, errors |
//! | [`block`] | `mbflow-block` | Halo-padded field arrays, geometry, meshes |
//! | [`coupling`] | `mbflow-coupling` | `BlockSolver` trait and the inter-block synchronizer |
//! | [`solvers`] | `mbflow-solvers` | Finite-volume block solver, fluxes, boundary conditions |
//! | [`engine`] | `mbflow-engine` | Time-march controller and simulation loop |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`mbflow-core`).
///
/// Cell indices, [`types::StageTag`], [`types::LocalBoundary`],
/// [`types::GasModel`] and the error enums.
pub use mbflow_core as types;

/// Per-block field storage and geometry (`mbflow-block`).
pub use mbflow_block as block;

/// Block solver contract and halo synchronization (`mbflow-coupling`).
///
/// [`coupling::BlockSolver`] is the main extension point for user-defined
/// block numerics.
pub use mbflow_coupling as coupling;

/// Reference finite-volume solver (`mbflow-solvers`).
pub use mbflow_solvers as solvers;

/// Stepping and the interactive loop (`mbflow-engine`).
///
/// [`engine::TimeMarchController`] for direct stepping,
/// [`engine::SimulationLoop`] for display batches with pause and quit.
pub use mbflow_engine as engine;

/// Common imports for typical mbflow usage.
///
/// ```rust
/// use mbflow::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use mbflow_core::{
        Axis, BlockId, BoundaryKind, CellIndex, Conserved, DisplayVar, FaceEnd, GasModel,
        LocalBoundary, March, StageTag,
    };

    // Errors
    pub use mbflow_core::{BoundaryError, CouplingError, StepError};

    // Coupling
    pub use mbflow_coupling::{BlockSolver, ConnectionDescriptor, Coupling, InterBlockSynchronizer};

    // Solvers
    pub use mbflow_solvers::{ConvectScheme, FvmBlockSolver, FvmConfig};

    // Engine
    pub use mbflow_engine::{
        ConfigError, Drawer, DualTimeConfig, ExecutionContext, MarchConfig, NullDrawer,
        SimulationConfig, SimulationLoop, SummaryDrawer, TimeMarchController,
    };
}
