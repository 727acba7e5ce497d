//! Halo-aware block storage and geometry for the mbflow solver.
//!
//! A block is an `ni × nj` structured grid surrounded by a one-cell halo
//! ring. This crate provides the dense arrays that hold per-node, per-cell
//! and per-face quantities, the [`BlockFields`] bundle every block solver
//! exposes to the inter-block synchronizer, and the metric computation that
//! turns node coordinates into areas, face normals and element widths.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod fields;
pub mod geometry;
pub mod mesh;

pub use array::{CellArray, FaceArray, NodeArray};
pub use fields::BlockFields;
pub use geometry::{compute_geometry, mirror_halo_geometry};
pub use mesh::{nodes_from_fn, rectangle_nodes, RectangleMesh};
