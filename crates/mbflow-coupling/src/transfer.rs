//! Staged halo transfer for a single coupling.
//!
//! A transfer runs in two phases: [`ResolvedCoupling::gather`] reads the
//! neighbour's real cells into a [`HaloPayload`], then
//! [`ResolvedCoupling::scatter`] writes that payload into the owner's halo.
//! Splitting the phases lets a block be coupled to itself (periodic seams)
//! without aliasing a mutable and a shared borrow of the same fields.

use mbflow_block::BlockFields;
use mbflow_core::{Axis, CellIndex, Conserved, FaceEnd, Mat2, StageTag, Vec2};

use crate::descriptor::Coupling;
use crate::geometry::{resolve, surface_range_offset, ConnectionGeometry};
use crate::solver::BlockSolver;

/// Values read from a neighbour for one stage, in coupling order.
#[derive(Clone, Debug, PartialEq)]
pub enum HaloPayload {
    /// `(elem_area, elem_width)`, widths already in owner orientation.
    Geometry(Vec<(f64, Vec2)>),
    /// Conserved state.
    State(Vec<Conserved>),
    /// `(gradient_v_c, gradient_temp_c)`.
    GradientCenter(Vec<(Mat2, Vec2)>),
    /// `(v_c, temp_c)`.
    CenterVt(Vec<(Vec2, f64)>),
    /// `(v_surf, temp_surf)` on the coupled face.
    SurfaceVt(Vec<(Vec2, f64)>),
    /// `(gradient_v_surf, gradient_temp_surf)` on the coupled face.
    GradientSurface(Vec<(Mat2, Vec2)>),
}

impl HaloPayload {
    /// Number of cells carried.
    pub fn len(&self) -> usize {
        match self {
            HaloPayload::Geometry(v) => v.len(),
            HaloPayload::State(v) => v.len(),
            HaloPayload::GradientCenter(v) => v.len(),
            HaloPayload::CenterVt(v) => v.len(),
            HaloPayload::SurfaceVt(v) => v.len(),
            HaloPayload::GradientSurface(v) => v.len(),
        }
    }

    /// Whether the payload carries no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A validated coupling with both sides resolved to cell positions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCoupling {
    /// Owner block position in the solver list.
    pub owner: usize,
    /// Neighbour block position in the solver list.
    pub neighbor: usize,
    /// Owner-side positions.
    pub owner_geometry: ConnectionGeometry,
    /// Neighbour-side positions.
    pub neighbor_geometry: ConnectionGeometry,
    /// Owner face axis.
    pub owner_face: Axis,
    /// Owner face end.
    pub owner_end: FaceEnd,
    /// Neighbour face axis.
    pub neighbor_face: Axis,
    /// Offset from an owner edge cell to its coupled face.
    pub owner_surface_offset: CellIndex,
    /// Offset from a neighbour edge cell to its coupled face.
    pub neighbor_surface_offset: CellIndex,
    /// Cells transferred.
    pub num: usize,
}

impl ResolvedCoupling {
    /// Resolve `coupling` against the owner and neighbour dimensions.
    pub fn new(coupling: &Coupling, owner_dims: (usize, usize), neighbor_dims: (usize, usize)) -> Self {
        let (o, n) = (&coupling.owner, &coupling.neighbor);
        Self {
            owner: o.block.index(),
            neighbor: n.block.index(),
            owner_geometry: resolve(o, owner_dims.0, owner_dims.1),
            neighbor_geometry: resolve(n, neighbor_dims.0, neighbor_dims.1),
            owner_face: o.face,
            owner_end: o.end,
            neighbor_face: n.face,
            owner_surface_offset: surface_range_offset(o.face, o.end),
            neighbor_surface_offset: surface_range_offset(n.face, n.end),
            num: coupling.num(),
        }
    }

    /// Owner halo cells written by this coupling.
    pub fn owner_halos(&self) -> impl Iterator<Item = CellIndex> + '_ {
        (0..self.num).map(|k| self.owner_geometry.halo(k))
    }

    fn neighbor_cells(&self) -> impl Iterator<Item = CellIndex> + '_ {
        (0..self.num).map(|k| self.neighbor_geometry.cell(k))
    }

    fn neighbor_faces(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.neighbor_cells().map(|c| c + self.neighbor_surface_offset)
    }

    /// Whether the two faces have different axes, which swaps the i/j
    /// element widths.
    pub fn crosses_axes(&self) -> bool {
        self.owner_face != self.neighbor_face
    }

    /// Read the neighbour values `stage` needs. Returns `None` for
    /// [`StageTag::AdvectFlux`], which copies nothing.
    pub fn gather(&self, stage: StageTag, neighbor: &BlockFields) -> Option<HaloPayload> {
        let axis = self.neighbor_face;
        let payload = match stage {
            StageTag::Geometry => HaloPayload::Geometry(
                self.neighbor_cells()
                    .map(|c| {
                        let w = neighbor.elem_width[c];
                        let w = if self.crosses_axes() { [w[1], w[0]] } else { w };
                        (neighbor.elem_area[c], w)
                    })
                    .collect(),
            ),
            StageTag::State => HaloPayload::State(self.neighbor_cells().map(|c| neighbor.q[c]).collect()),
            StageTag::GradientCenter => HaloPayload::GradientCenter(
                self.neighbor_cells()
                    .map(|c| (neighbor.gradient_v_c[c], neighbor.gradient_temp_c[c]))
                    .collect(),
            ),
            StageTag::CenterVt => HaloPayload::CenterVt(
                self.neighbor_cells()
                    .map(|c| (neighbor.v_c[c], neighbor.temp_c[c]))
                    .collect(),
            ),
            StageTag::SurfaceVt => HaloPayload::SurfaceVt(
                self.neighbor_faces()
                    .map(|s| (neighbor.v_surf[(s, axis)], neighbor.temp_surf[(s, axis)]))
                    .collect(),
            ),
            StageTag::GradientSurface => HaloPayload::GradientSurface(
                self.neighbor_faces()
                    .map(|s| {
                        (
                            neighbor.gradient_v_surf[(s, axis)],
                            neighbor.gradient_temp_surf[(s, axis)],
                        )
                    })
                    .collect(),
            ),
            StageTag::AdvectFlux => return None,
        };
        Some(payload)
    }

    /// Write a gathered payload into the owner's halo cells or coupled faces.
    pub fn scatter(&self, payload: &HaloPayload, owner: &mut BlockFields) {
        let g = &self.owner_geometry;
        let axis = self.owner_face;
        let face = |k: usize| g.cell(k) + self.owner_surface_offset;
        match payload {
            HaloPayload::Geometry(values) => {
                for (k, (area, width)) in values.iter().enumerate() {
                    owner.elem_area[g.halo(k)] = *area;
                    owner.elem_width[g.halo(k)] = *width;
                }
            }
            HaloPayload::State(values) => {
                for (k, q) in values.iter().enumerate() {
                    owner.q[g.halo(k)] = *q;
                }
            }
            HaloPayload::GradientCenter(values) => {
                for (k, (gv, gt)) in values.iter().enumerate() {
                    owner.gradient_v_c[g.halo(k)] = *gv;
                    owner.gradient_temp_c[g.halo(k)] = *gt;
                }
            }
            HaloPayload::CenterVt(values) => {
                for (k, (v, t)) in values.iter().enumerate() {
                    owner.v_c[g.halo(k)] = *v;
                    owner.temp_c[g.halo(k)] = *t;
                }
            }
            HaloPayload::SurfaceVt(values) => {
                for (k, (v, t)) in values.iter().enumerate() {
                    owner.v_surf[(face(k), axis)] = *v;
                    owner.temp_surf[(face(k), axis)] = *t;
                }
            }
            HaloPayload::GradientSurface(values) => {
                for (k, (gv, gt)) in values.iter().enumerate() {
                    owner.gradient_v_surf[(face(k), axis)] = *gv;
                    owner.gradient_temp_surf[(face(k), axis)] = *gt;
                }
            }
        }
    }

    /// Run `stage` for this coupling over the full solver list.
    pub fn apply(&self, stage: StageTag, blocks: &mut [Box<dyn BlockSolver>]) {
        match self.gather(stage, blocks[self.neighbor].fields()) {
            Some(payload) => self.scatter(&payload, blocks[self.owner].fields_mut()),
            None => {
                let owner = &mut blocks[self.owner];
                for k in 0..self.num {
                    let cell = self.owner_geometry.cell(k);
                    let halo = self.owner_geometry.halo(k);
                    owner.bc_connection_advect_flux_cell(cell, halo, self.owner_face, self.owner_end);
                }
            }
        }
    }
}
