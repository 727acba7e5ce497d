//! Coupling descriptors.

use mbflow_core::{Axis, BlockId, CouplingError, FaceEnd, March};

/// One side of a coupling: where on which block the coupled cells start
/// and which way they run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionDescriptor {
    /// The block this side belongs to.
    pub block: BlockId,
    /// Index along the face of the first coupled cell.
    pub start: i32,
    /// Direction to walk along the face.
    pub march: March,
    /// Face axis.
    pub face: Axis,
    /// Face end.
    pub end: FaceEnd,
}

impl ConnectionDescriptor {
    /// Construct from parts.
    pub fn new(block: BlockId, start: i32, march: March, face: Axis, end: FaceEnd) -> Self {
        Self {
            block,
            start,
            march,
            face,
            end,
        }
    }

    /// Decode the raw `(block, start, ±1, face 0|1, end 0|1)` tuple form.
    pub fn from_raw(raw: [i32; 5]) -> Result<Self, CouplingError> {
        let [block, start, march, face, end] = raw;
        let invalid = |what: &str| CouplingError::InvalidDescriptor {
            reason: format!("{what} in {raw:?}"),
        };
        let block = u32::try_from(block).map_err(|_| invalid("negative block id"))?;
        let march = March::from_sign(march).ok_or_else(|| invalid("march must be +1 or -1"))?;
        let face = Axis::from_code(face).ok_or_else(|| invalid("face must be 0 or 1"))?;
        let end = FaceEnd::from_code(end).ok_or_else(|| invalid("end must be 0 or 1"))?;
        Ok(Self::new(BlockId(block), start, march, face, end))
    }
}

/// An ordered coupling: halo cells of `owner` are filled from real cells
/// of `neighbor`.
///
/// Couplings are one-directional. A shared seam needs two couplings, one
/// per side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coupling {
    /// The side whose halo is written.
    pub owner: ConnectionDescriptor,
    /// The side whose real cells are read.
    pub neighbor: ConnectionDescriptor,
    /// Cells declared on the owner side.
    pub owner_cells: usize,
    /// Cells declared on the neighbour side.
    pub neighbor_cells: usize,
}

impl Coupling {
    /// A coupling of `num` cells on each side.
    pub fn new(owner: ConnectionDescriptor, neighbor: ConnectionDescriptor, num: usize) -> Self {
        Self::with_counts(owner, neighbor, num, num)
    }

    /// A coupling with separately declared per-side counts. Mismatched
    /// counts are rejected when the synchronizer is built.
    pub fn with_counts(
        owner: ConnectionDescriptor,
        neighbor: ConnectionDescriptor,
        owner_cells: usize,
        neighbor_cells: usize,
    ) -> Self {
        Self {
            owner,
            neighbor,
            owner_cells,
            neighbor_cells,
        }
    }

    /// Decode `(owner tuple, neighbour tuple, num)`.
    pub fn from_raw(owner: [i32; 5], neighbor: [i32; 5], num: usize) -> Result<Self, CouplingError> {
        Ok(Self::new(
            ConnectionDescriptor::from_raw(owner)?,
            ConnectionDescriptor::from_raw(neighbor)?,
            num,
        ))
    }

    /// The same seam seen from the other side.
    pub fn reversed(&self) -> Self {
        Self {
            owner: self.neighbor,
            neighbor: self.owner,
            owner_cells: self.neighbor_cells,
            neighbor_cells: self.owner_cells,
        }
    }

    /// Number of transferred cells (the owner-side count).
    pub fn num(&self) -> usize {
        self.owner_cells
    }
}
