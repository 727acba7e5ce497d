//! Solver configuration.

use mbflow_core::{Conserved, GasModel};

/// Convective flux scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConvectScheme {
    /// van Leer flux-vector splitting.
    VanLeer,
    /// Roe approximate Riemann solver with entropy fix.
    #[default]
    Roe,
}

/// Laminar viscosity parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViscousParams {
    /// Reynolds number based on the free stream.
    pub re0: f64,
    /// Dimensional free-stream temperature in kelvin.
    pub temp0_raw: f64,
    /// Laminar Prandtl number.
    pub prandtl: f64,
}

impl ViscousParams {
    /// Air defaults: `T0 = 273 K`, `Pr = 0.72`.
    pub fn new(re0: f64) -> Self {
        Self {
            re0,
            temp0_raw: 273.0,
            prandtl: 0.72,
        }
    }

    /// Sutherland constant scaled by the free-stream temperature.
    pub fn sutherland(&self) -> f64 {
        117.0 / self.temp0_raw
    }
}

/// Validated configuration for [`FvmBlockSolver`](crate::FvmBlockSolver).
///
/// Constructed via [`FvmConfig::builder`].
#[derive(Clone, Debug, PartialEq)]
pub struct FvmConfig {
    /// Gas constants.
    pub gas: GasModel,
    /// Physical time step.
    pub dt: f64,
    /// Convective scheme.
    pub scheme: ConvectScheme,
    /// Laminar viscosity, `None` for inviscid runs.
    pub viscous: Option<ViscousParams>,
    /// Pseudo-time step as a fraction of `dt` in dual-time iterations.
    pub pseudo_dt_ratio: f64,
    /// Initial state; the free stream when `None`.
    pub initial_state: Option<Conserved>,
}

impl FvmConfig {
    /// Start building a configuration.
    pub fn builder() -> FvmConfigBuilder {
        FvmConfigBuilder {
            ma0: None,
            dt: None,
            gamma: GasModel::GAMMA_AIR,
            scheme: ConvectScheme::default(),
            viscous: None,
            pseudo_dt_ratio: 1.0,
            initial_state: None,
        }
    }

    /// Whether viscous terms are computed.
    pub fn is_viscous(&self) -> bool {
        self.viscous.is_some()
    }

    /// The state a fresh block starts from.
    pub fn initial_state(&self) -> Conserved {
        self.initial_state.unwrap_or_else(|| self.gas.freestream())
    }
}

/// Builder for [`FvmConfig`].
///
/// Required: `ma0` and `dt`. Defaults: air, Roe scheme, inviscid, pseudo
/// step equal to `dt`, free-stream initial state.
#[derive(Clone, Debug)]
pub struct FvmConfigBuilder {
    ma0: Option<f64>,
    dt: Option<f64>,
    gamma: f64,
    scheme: ConvectScheme,
    viscous: Option<ViscousParams>,
    pseudo_dt_ratio: f64,
    initial_state: Option<Conserved>,
}

impl FvmConfigBuilder {
    /// Free-stream Mach number. Must be > 0.
    pub fn ma0(mut self, ma0: f64) -> Self {
        self.ma0 = Some(ma0);
        self
    }

    /// Physical time step. Must be > 0.
    pub fn dt(mut self, dt: f64) -> Self {
        self.dt = Some(dt);
        self
    }

    /// Ratio of specific heats (default 1.4). Must be > 1.
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Convective scheme.
    pub fn scheme(mut self, scheme: ConvectScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Enable laminar viscosity with air defaults at Reynolds number `re0`.
    pub fn viscous(mut self, re0: f64) -> Self {
        self.viscous = Some(ViscousParams::new(re0));
        self
    }

    /// Enable laminar viscosity with explicit parameters.
    pub fn viscous_params(mut self, params: ViscousParams) -> Self {
        self.viscous = Some(params);
        self
    }

    /// Pseudo-time step as a fraction of `dt`. Must be > 0.
    pub fn pseudo_dt_ratio(mut self, ratio: f64) -> Self {
        self.pseudo_dt_ratio = ratio;
        self
    }

    /// Initial state for every cell.
    pub fn initial_state(mut self, q: Conserved) -> Self {
        self.initial_state = Some(q);
        self
    }

    /// Build the configuration, validating all values.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `ma0` or `dt` is not set, or not finite and positive
    /// - `gamma` is not finite and > 1
    /// - viscous `re0`, `temp0_raw` or `prandtl` is not finite and positive
    /// - `pseudo_dt_ratio` is not finite and positive
    /// - the initial state has non-positive density or non-finite components
    pub fn build(self) -> Result<FvmConfig, String> {
        let ma0 = self.ma0.ok_or_else(|| "ma0 is required".to_string())?;
        let dt = self.dt.ok_or_else(|| "dt is required".to_string())?;
        positive("ma0", ma0)?;
        positive("dt", dt)?;
        positive("pseudo_dt_ratio", self.pseudo_dt_ratio)?;
        if !(self.gamma > 1.0) || !self.gamma.is_finite() {
            return Err(format!("gamma must be finite and > 1, got {}", self.gamma));
        }
        if let Some(v) = &self.viscous {
            positive("re0", v.re0)?;
            positive("temp0_raw", v.temp0_raw)?;
            positive("prandtl", v.prandtl)?;
        }
        if let Some(q) = &self.initial_state {
            if q.iter().any(|v| !v.is_finite()) || !(q[0] > 0.0) {
                return Err(format!("initial state must be finite with rho > 0, got {q:?}"));
            }
        }
        Ok(FvmConfig {
            gas: GasModel {
                gamma: self.gamma,
                ma0,
            },
            dt,
            scheme: self.scheme,
            viscous: self.viscous,
            pseudo_dt_ratio: self.pseudo_dt_ratio,
            initial_state: self.initial_state,
        })
    }
}

fn positive(name: &str, value: f64) -> Result<(), String> {
    if !(value > 0.0) || !value.is_finite() {
        return Err(format!("{name} must be finite and > 0, got {value}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_minimal() {
        let cfg = FvmConfig::builder().ma0(0.3).dt(1e-5).build().unwrap();
        assert_eq!(cfg.gas.gamma, 1.4);
        assert_eq!(cfg.scheme, ConvectScheme::Roe);
        assert!(!cfg.is_viscous());
        assert_eq!(cfg.initial_state(), cfg.gas.freestream());
    }

    #[test]
    fn builder_viscous_defaults() {
        let cfg = FvmConfig::builder().ma0(0.3).dt(1e-5).viscous(1e4).build().unwrap();
        let v = cfg.viscous.unwrap();
        assert_eq!(v.prandtl, 0.72);
        assert!((v.sutherland() - 117.0 / 273.0).abs() < 1e-15);
    }

    #[test]
    fn builder_rejects_missing_dt() {
        let result = FvmConfig::builder().ma0(0.3).build();
        assert!(result.unwrap_err().contains("dt"));
    }

    #[test]
    fn builder_rejects_nan_mach() {
        let result = FvmConfig::builder().ma0(f64::NAN).dt(0.1).build();
        assert!(result.unwrap_err().contains("ma0"));
    }

    #[test]
    fn builder_rejects_zero_reynolds() {
        let result = FvmConfig::builder().ma0(0.3).dt(0.1).viscous(0.0).build();
        assert!(result.unwrap_err().contains("re0"));
    }

    #[test]
    fn builder_rejects_vacuum_initial_state() {
        let result = FvmConfig::builder()
            .ma0(0.3)
            .dt(0.1)
            .initial_state([0.0, 0.0, 0.0, 1.0])
            .build();
        assert!(result.unwrap_err().contains("initial state"));
    }

    #[test]
    fn builder_rejects_gamma_below_one() {
        let result = FvmConfig::builder().ma0(0.3).dt(0.1).gamma(0.9).build();
        assert!(result.unwrap_err().contains("gamma"));
    }
}
