//! Synchronization stage tags.
//!
//! Each [`StageTag`] names a point in the time-march pipeline at which
//! halo data is refreshed and selects which per-cell or per-face quantities
//! the inter-block transfer copies. The integer codes are stable and are
//! the form in which stages cross the raw-input boundary.

use std::fmt;

use crate::error::CouplingError;

/// A named halo-refresh point in the time-march pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageTag {
    /// Cell area and element widths (once, after init).
    Geometry,
    /// Conserved state `q`.
    State,
    /// Cell-centre velocity and temperature gradients.
    GradientCenter,
    /// Convective flux across block boundary faces.
    AdvectFlux,
    /// Cell-centre velocity and temperature.
    CenterVt,
    /// Face velocity and temperature.
    SurfaceVt,
    /// Face velocity and temperature gradients.
    GradientSurface,
}

impl StageTag {
    /// Every stage, in code order.
    pub const ALL: [StageTag; 7] = [
        StageTag::Geometry,
        StageTag::State,
        StageTag::GradientCenter,
        StageTag::AdvectFlux,
        StageTag::CenterVt,
        StageTag::SurfaceVt,
        StageTag::GradientSurface,
    ];

    /// Stable integer code.
    pub fn code(self) -> i32 {
        match self {
            StageTag::Geometry => -1,
            StageTag::State => 0,
            StageTag::GradientCenter => 1,
            StageTag::AdvectFlux => 10,
            StageTag::CenterVt => 20,
            StageTag::SurfaceVt => 21,
            StageTag::GradientSurface => 22,
        }
    }

    /// Decode a raw stage code.
    ///
    /// # Errors
    ///
    /// Returns [`CouplingError::UnknownStage`] for any code outside the
    /// closed set.
    pub fn from_code(code: i32) -> Result<StageTag, CouplingError> {
        match code {
            -1 => Ok(StageTag::Geometry),
            0 => Ok(StageTag::State),
            1 => Ok(StageTag::GradientCenter),
            10 => Ok(StageTag::AdvectFlux),
            20 => Ok(StageTag::CenterVt),
            21 => Ok(StageTag::SurfaceVt),
            22 => Ok(StageTag::GradientSurface),
            _ => Err(CouplingError::UnknownStage { code }),
        }
    }

    /// Whether this stage only matters for viscous runs.
    pub fn is_viscous_only(self) -> bool {
        matches!(
            self,
            StageTag::GradientCenter
                | StageTag::CenterVt
                | StageTag::SurfaceVt
                | StageTag::GradientSurface
        )
    }
}

impl fmt::Display for StageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageTag::Geometry => "geometry",
            StageTag::State => "state",
            StageTag::GradientCenter => "gradient_center",
            StageTag::AdvectFlux => "advect_flux",
            StageTag::CenterVt => "center_vt",
            StageTag::SurfaceVt => "surface_vt",
            StageTag::GradientSurface => "gradient_surface",
        };
        write!(f, "{name}({})", self.code())
    }
}
