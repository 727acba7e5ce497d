//! The RK3 sub-stage schedule.
//!
//! A [`SubStagePlan`] is the ordered list of operations one RK3 sub-stage
//! performs, built once from [`MarchConfig`] and interpreted by the
//! [`TimeMarchController`](crate::TimeMarchController). Every "for all
//! blocks" operation is a barrier: the next operation starts only after
//! every block has finished the current one.

use std::fmt;

use mbflow_core::StageTag;
use smallvec::SmallVec;

use crate::config::MarchConfig;

/// One operation of a sub-stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarchOp {
    /// Apply local boundary conditions for a stage on every block.
    LocalBc(StageTag),
    /// Synchronize coupled halos for a stage.
    Sync(StageTag),
    /// Zero every block's flux accumulator.
    ClearFlux,
    /// Centre velocity and temperature.
    CalcUTempCenter,
    /// Centre-to-face velocity and temperature.
    InterpQSurf,
    /// Green-Gauss centre gradients.
    IntegrateGradientCenter,
    /// Centre-to-face gradients.
    CalcGradientSurf,
    /// Viscous flux accumulation.
    CalcFluxDiffusion,
    /// Convective flux across interior faces.
    FluxAdvect,
    /// RK3 update of the sub-stage (plain or pseudo-time).
    Update,
}

impl fmt::Display for MarchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalBc(stage) => write!(f, "bc({stage})"),
            Self::Sync(stage) => write!(f, "sync({stage})"),
            Self::ClearFlux => write!(f, "clear_flux"),
            Self::CalcUTempCenter => write!(f, "calc_u_temp_center"),
            Self::InterpQSurf => write!(f, "interp_qsurf"),
            Self::IntegrateGradientCenter => write!(f, "integrate_gradient_center"),
            Self::CalcGradientSurf => write!(f, "calc_gradient_surf"),
            Self::CalcFluxDiffusion => write!(f, "calc_flux_diffusion"),
            Self::FluxAdvect => write!(f, "flux_advect"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// Immutable operation table for one RK3 sub-stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubStagePlan {
    ops: SmallVec<[MarchOp; 20]>,
}

impl SubStagePlan {
    /// Build the table for `march`.
    pub fn new(march: &MarchConfig) -> Self {
        use MarchOp::*;

        let mut ops: SmallVec<[MarchOp; 20]> = SmallVec::new();
        ops.extend([LocalBc(StageTag::State), Sync(StageTag::State), ClearFlux]);

        if march.viscous {
            ops.push(CalcUTempCenter);
            if march.center_vt_local_bc {
                ops.push(LocalBc(StageTag::CenterVt));
            }
            ops.extend([
                Sync(StageTag::CenterVt),
                InterpQSurf,
                LocalBc(StageTag::SurfaceVt),
                Sync(StageTag::SurfaceVt),
                IntegrateGradientCenter,
                LocalBc(StageTag::GradientCenter),
                Sync(StageTag::GradientCenter),
                CalcGradientSurf,
                LocalBc(StageTag::GradientSurface),
                Sync(StageTag::GradientSurface),
                CalcFluxDiffusion,
            ]);
        }

        if march.advection_enabled {
            ops.push(FluxAdvect);
        }
        ops.extend([LocalBc(StageTag::AdvectFlux), Sync(StageTag::AdvectFlux), Update]);
        Self { ops }
    }

    /// Operations in execution order.
    pub fn ops(&self) -> &[MarchOp] {
        &self.ops
    }

    /// Number of synchronizer calls per sub-stage.
    pub fn sync_count(&self) -> usize {
        self.ops.iter().filter(|op| matches!(op, MarchOp::Sync(_))).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DualTimeConfig;
    use proptest::prelude::*;
    use MarchOp::*;

    #[test]
    fn inviscid_table() {
        let plan = SubStagePlan::new(&MarchConfig::default());
        assert_eq!(
            plan.ops(),
            &[
                LocalBc(StageTag::State),
                Sync(StageTag::State),
                ClearFlux,
                FluxAdvect,
                LocalBc(StageTag::AdvectFlux),
                Sync(StageTag::AdvectFlux),
                Update,
            ]
        );
        assert_eq!(plan.sync_count(), 2);
    }

    #[test]
    fn viscous_table() {
        let march = MarchConfig {
            viscous: true,
            ..MarchConfig::default()
        };
        let plan = SubStagePlan::new(&march);
        assert_eq!(
            plan.ops(),
            &[
                LocalBc(StageTag::State),
                Sync(StageTag::State),
                ClearFlux,
                CalcUTempCenter,
                Sync(StageTag::CenterVt),
                InterpQSurf,
                LocalBc(StageTag::SurfaceVt),
                Sync(StageTag::SurfaceVt),
                IntegrateGradientCenter,
                LocalBc(StageTag::GradientCenter),
                Sync(StageTag::GradientCenter),
                CalcGradientSurf,
                LocalBc(StageTag::GradientSurface),
                Sync(StageTag::GradientSurface),
                CalcFluxDiffusion,
                FluxAdvect,
                LocalBc(StageTag::AdvectFlux),
                Sync(StageTag::AdvectFlux),
                Update,
            ]
        );
        assert_eq!(plan.sync_count(), 6);
        assert!(!plan.ops.spilled());
    }

    #[test]
    fn toggles_change_only_their_op() {
        let march = MarchConfig {
            viscous: true,
            advection_enabled: false,
            center_vt_local_bc: true,
            ..MarchConfig::default()
        };
        let ops = SubStagePlan::new(&march).ops().to_vec();
        assert!(!ops.contains(&FluxAdvect));
        let calc = ops.iter().position(|op| *op == CalcUTempCenter).unwrap();
        assert_eq!(ops[calc + 1], LocalBc(StageTag::CenterVt));
        assert_eq!(ops[calc + 2], Sync(StageTag::CenterVt));
        // boundary face fluxes are unaffected
        assert!(ops.contains(&Sync(StageTag::AdvectFlux)));
    }

    #[test]
    fn display_names() {
        assert_eq!(ClearFlux.to_string(), "clear_flux");
        assert!(Sync(StageTag::State).to_string().starts_with("sync(state"));
    }

    proptest! {
        #[test]
        fn every_plan_brackets_the_update(
            viscous in any::<bool>(),
            advection in any::<bool>(),
            center_bc in any::<bool>(),
            dual in any::<bool>(),
        ) {
            let march = MarchConfig {
                viscous,
                dual_time: dual.then(DualTimeConfig::default),
                advection_enabled: advection,
                center_vt_local_bc: center_bc,
            };
            let plan = SubStagePlan::new(&march);
            let ops = plan.ops();
            prop_assert_eq!(&ops[..2], &[LocalBc(StageTag::State), Sync(StageTag::State)]);
            prop_assert_eq!(
                &ops[ops.len() - 3..],
                &[LocalBc(StageTag::AdvectFlux), Sync(StageTag::AdvectFlux), Update]
            );
            prop_assert_eq!(plan.sync_count(), if viscous { 6 } else { 2 });
            prop_assert_eq!(ops.iter().filter(|op| **op == Update).count(), 1);
            // every stage synchronized at most once
            for stage in StageTag::ALL {
                prop_assert!(ops.iter().filter(|op| **op == Sync(stage)).count() <= 1);
            }
        }
    }
}
