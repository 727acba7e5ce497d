//! Local (non-coupled) boundary-condition descriptions.
//!
//! A [`LocalBoundary`] applies one [`BoundaryKind`] to a contiguous run of
//! edge cells on one face of a block. The solver decides what each kind
//! means at each [`StageTag`](crate::StageTag); this module only carries
//! and validates the description.

use std::fmt;

use crate::error::BoundaryError;
use crate::grid::{outward_step, Axis, CellIndex, FaceEnd};

/// Boundary-condition kinds with their stable raw codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryKind {
    /// Fixed prescribed state (code 0).
    SupersonicInlet,
    /// Linear extrapolation of the state (code 1).
    SupersonicOutlet,
    /// Mirror plane, normal velocity reflected (code 2).
    Symmetry,
    /// Viscous wall, velocity reflected to zero at the face (code 3).
    NoSlipWall,
    /// Inviscid wall, normal velocity reflected (code 4).
    SlipWall,
    /// Prescribed density and velocity, pressure extrapolated (code 10).
    SubsonicInlet,
    /// Prescribed back pressure, density and velocity extrapolated (code 11).
    SubsonicOutlet,
}

impl BoundaryKind {
    /// Stable integer code.
    pub fn code(self) -> i32 {
        match self {
            BoundaryKind::SupersonicInlet => 0,
            BoundaryKind::SupersonicOutlet => 1,
            BoundaryKind::Symmetry => 2,
            BoundaryKind::NoSlipWall => 3,
            BoundaryKind::SlipWall => 4,
            BoundaryKind::SubsonicInlet => 10,
            BoundaryKind::SubsonicOutlet => 11,
        }
    }

    /// Decode a raw kind code.
    pub fn from_code(code: i32) -> Result<BoundaryKind, BoundaryError> {
        match code {
            0 => Ok(BoundaryKind::SupersonicInlet),
            1 => Ok(BoundaryKind::SupersonicOutlet),
            2 => Ok(BoundaryKind::Symmetry),
            3 => Ok(BoundaryKind::NoSlipWall),
            4 => Ok(BoundaryKind::SlipWall),
            10 => Ok(BoundaryKind::SubsonicInlet),
            11 => Ok(BoundaryKind::SubsonicOutlet),
            _ => Err(BoundaryError::UnknownKind { code }),
        }
    }

    /// Whether the kind reads a prescribed value set.
    pub fn needs_value(self) -> bool {
        matches!(
            self,
            BoundaryKind::SupersonicInlet
                | BoundaryKind::SubsonicInlet
                | BoundaryKind::SubsonicOutlet
        )
    }

    /// Whether the kind is a solid wall.
    pub fn is_wall(self) -> bool {
        matches!(self, BoundaryKind::NoSlipWall | BoundaryKind::SlipWall)
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoundaryKind::SupersonicInlet => "supersonic_inlet",
            BoundaryKind::SupersonicOutlet => "supersonic_outlet",
            BoundaryKind::Symmetry => "symmetry",
            BoundaryKind::NoSlipWall => "no_slip_wall",
            BoundaryKind::SlipWall => "slip_wall",
            BoundaryKind::SubsonicInlet => "subsonic_inlet",
            BoundaryKind::SubsonicOutlet => "subsonic_outlet",
        };
        f.write_str(name)
    }
}

/// One local boundary condition on a block face.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalBoundary {
    /// What the boundary imposes.
    pub kind: BoundaryKind,
    /// Face axis.
    pub face: Axis,
    /// Face end.
    pub end: FaceEnd,
    /// Half-open range of cell indices along the face, e.g. `(1, nj + 1)`
    /// covers a whole I face.
    pub range: (i32, i32),
    /// Index into the value sets passed alongside the boundary list.
    pub value_index: Option<usize>,
}

impl LocalBoundary {
    /// A boundary without prescribed values covering `range` on `(face, end)`.
    pub fn new(kind: BoundaryKind, face: Axis, end: FaceEnd, range: (i32, i32)) -> Self {
        Self {
            kind,
            face,
            end,
            range,
            value_index: None,
        }
    }

    /// Attach a value-set index.
    pub fn with_value(mut self, value_index: usize) -> Self {
        self.value_index = Some(value_index);
        self
    }

    /// Decode the raw `(kind, rng0, rng1, face, end, value_index)` tuple form.
    pub fn from_raw(
        kind: i32,
        rng0: i32,
        rng1: i32,
        face: i32,
        end: i32,
        value_index: Option<usize>,
    ) -> Result<Self, BoundaryError> {
        let kind = BoundaryKind::from_code(kind)?;
        let invalid = BoundaryError::InvalidFace { face, end };
        let (Some(face), Some(end)) = (Axis::from_code(face), FaceEnd::from_code(end)) else {
            return Err(invalid);
        };
        Ok(Self {
            kind,
            face,
            end,
            range: (rng0, rng1),
            value_index,
        })
    }

    /// Check the range against an `ni × nj` block and the value table size.
    pub fn validate(
        &self,
        index: usize,
        ni: usize,
        nj: usize,
        n_values: usize,
    ) -> Result<(), BoundaryError> {
        let limit = match self.face {
            Axis::I => nj,
            Axis::J => ni,
        };
        if self.range.1 <= self.range.0 {
            return Err(BoundaryError::EmptyRange { index });
        }
        if self.range.0 < 1 || self.range.1 as i64 > limit as i64 + 1 {
            return Err(BoundaryError::RangeOutOfBounds {
                index,
                face: self.face,
                end: self.end,
                range: self.range,
                limit,
            });
        }
        if self.kind.needs_value() && !self.value_index.is_some_and(|v| v < n_values) {
            return Err(BoundaryError::MissingValue {
                index,
                value_index: self.value_index,
            });
        }
        Ok(())
    }

    /// Real edge cells covered by this boundary on an `ni × nj` block.
    pub fn cells(&self, ni: usize, nj: usize) -> impl Iterator<Item = CellIndex> + '_ {
        let fixed = match (self.face, self.end) {
            (_, FaceEnd::Start) => 1,
            (Axis::I, FaceEnd::End) => ni as i32,
            (Axis::J, FaceEnd::End) => nj as i32,
        };
        let face = self.face;
        (self.range.0..self.range.1).map(move |k| match face {
            Axis::I => CellIndex::new(fixed, k),
            Axis::J => CellIndex::new(k, fixed),
        })
    }

    /// Step from an edge cell to its halo cell.
    pub fn halo_step(&self) -> CellIndex {
        outward_step(self.face, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_tuple_decodes() {
        let bc = LocalBoundary::from_raw(10, 1, 41, 0, 0, Some(0)).unwrap();
        assert_eq!(bc.kind, BoundaryKind::SubsonicInlet);
        assert_eq!(bc.face, Axis::I);
        assert_eq!(bc.end, FaceEnd::Start);
        assert_eq!(bc.range, (1, 41));
    }

    #[test]
    fn cells_walk_the_face() {
        let bc = LocalBoundary::new(BoundaryKind::NoSlipWall, Axis::J, FaceEnd::End, (2, 5));
        let cells: Vec<_> = bc.cells(6, 4).collect();
        assert_eq!(
            cells,
            vec![
                CellIndex::new(2, 4),
                CellIndex::new(3, 4),
                CellIndex::new(4, 4)
            ]
        );
        assert_eq!(bc.halo_step(), CellIndex::new(0, 1));
    }

    #[test]
    fn validate_rejects_range_past_face() {
        let bc = LocalBoundary::new(BoundaryKind::Symmetry, Axis::I, FaceEnd::End, (1, 6));
        match bc.validate(3, 10, 4, 0) {
            Err(BoundaryError::RangeOutOfBounds { index: 3, limit: 4, .. }) => {}
            other => panic!("expected RangeOutOfBounds, got {other:?}"),
        }
        assert!(bc.validate(0, 10, 5, 0).is_ok());
    }

    #[test]
    fn validate_requires_value_for_inlets() {
        let bc = LocalBoundary::new(BoundaryKind::SupersonicInlet, Axis::I, FaceEnd::Start, (1, 3));
        match bc.validate(0, 4, 4, 1) {
            Err(BoundaryError::MissingValue { value_index: None, .. }) => {}
            other => panic!("expected MissingValue, got {other:?}"),
        }
        assert!(bc.clone().with_value(0).validate(0, 4, 4, 1).is_ok());
        assert!(bc.with_value(1).validate(0, 4, 4, 1).is_err());
    }

    #[test]
    fn unknown_kind_code() {
        assert_eq!(
            BoundaryKind::from_code(7),
            Err(BoundaryError::UnknownKind { code: 7 })
        );
    }
}
