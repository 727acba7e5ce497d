//! Reference finite-volume block solver for mbflow.
//!
//! [`FvmBlockSolver`] implements [`BlockSolver`](mbflow_coupling::BlockSolver)
//! for the 2D compressible Navier-Stokes equations on one structured block:
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | [`FvmConfig`] and its builder |
//! | [`flux`] | van Leer and Roe convective fluxes |
//! | [`diffusion`] | face interpolation, Green-Gauss gradients, viscous flux |
//! | [`boundary`] | local boundary conditions per synchronization stage |
//! | [`fvm`] | the solver itself: RK3 and dual-time marching |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod config;
pub mod diffusion;
pub mod flux;
pub mod fvm;

pub use config::{ConvectScheme, FvmConfig, FvmConfigBuilder, ViscousParams};
pub use fvm::FvmBlockSolver;
