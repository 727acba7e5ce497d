//! Non-dimensional calorically perfect gas.
//!
//! Quantities are scaled by free-stream density, velocity and temperature,
//! so the free stream is `rho = 1, |u| = 1, T = 1` and the free-stream
//! pressure is `p0 = 1 / (gamma * Ma0^2)`.

use std::fmt;

use crate::grid::{Conserved, Vec2};

/// Densities below this are treated as vacuum and map to a zero state.
pub const RHO_FLOOR: f64 = 1e-10;

/// Primitive variables `(rho, u, v, e)` with `e` the specific internal energy.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Primitive {
    /// Density.
    pub rho: f64,
    /// Velocity along x.
    pub u: f64,
    /// Velocity along y.
    pub v: f64,
    /// Specific internal energy.
    pub e: f64,
}

impl Primitive {
    /// Velocity vector.
    pub fn velocity(&self) -> Vec2 {
        [self.u, self.v]
    }

    /// Squared speed.
    pub fn speed_sqr(&self) -> f64 {
        self.u * self.u + self.v * self.v
    }

    /// `p / rho`.
    pub fn p_on_rho(&self, gamma: f64) -> f64 {
        self.e * (gamma - 1.0)
    }

    /// Static pressure.
    pub fn pressure(&self, gamma: f64) -> f64 {
        self.p_on_rho(gamma) * self.rho
    }

    /// Speed of sound.
    pub fn sound_speed(&self, gamma: f64) -> f64 {
        (gamma * self.p_on_rho(gamma)).sqrt()
    }

    /// Specific total enthalpy `h = gamma/(gamma-1) p/rho + |u|^2/2`.
    pub fn enthalpy(&self, gamma: f64) -> f64 {
        gamma / (gamma - 1.0) * self.p_on_rho(gamma) + 0.5 * self.speed_sqr()
    }
}

/// Scalar quantities a drawer can sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisplayVar {
    /// Density.
    Rho,
    /// x velocity.
    U,
    /// y velocity.
    V,
    /// Total specific energy.
    Et,
    /// Speed magnitude.
    Speed,
    /// Pressure.
    P,
    /// Speed of sound.
    A,
    /// Mach number.
    Mach,
}

impl DisplayVar {
    /// Decode the raw `0..8` index (`rho/u/v/et/uu/p/a/ma`).
    pub fn from_index(index: usize) -> Option<DisplayVar> {
        const ALL: [DisplayVar; 8] = [
            DisplayVar::Rho,
            DisplayVar::U,
            DisplayVar::V,
            DisplayVar::Et,
            DisplayVar::Speed,
            DisplayVar::P,
            DisplayVar::A,
            DisplayVar::Mach,
        ];
        ALL.get(index).copied()
    }
}

impl fmt::Display for DisplayVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisplayVar::Rho => "rho",
            DisplayVar::U => "u",
            DisplayVar::V => "v",
            DisplayVar::Et => "et",
            DisplayVar::Speed => "uu",
            DisplayVar::P => "p",
            DisplayVar::A => "a",
            DisplayVar::Mach => "ma",
        };
        f.write_str(name)
    }
}

/// Gas constants and state conversions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GasModel {
    /// Ratio of specific heats.
    pub gamma: f64,
    /// Free-stream Mach number.
    pub ma0: f64,
}

impl GasModel {
    /// Ratio of specific heats for air.
    pub const GAMMA_AIR: f64 = 1.4;

    /// Air at free-stream Mach number `ma0`.
    pub fn new(ma0: f64) -> Self {
        Self {
            gamma: Self::GAMMA_AIR,
            ma0,
        }
    }

    /// Free-stream pressure.
    pub fn p0(&self) -> f64 {
        1.0 / (self.gamma * self.ma0 * self.ma0)
    }

    /// Free-stream total specific energy.
    pub fn e0(&self) -> f64 {
        self.p0() / (self.gamma - 1.0) + 0.5
    }

    /// Non-dimensional specific heat at constant pressure.
    pub fn cp0(&self) -> f64 {
        self.gamma / (self.gamma - 1.0) * self.p0()
    }

    /// Unit-density free stream moving along +x.
    pub fn freestream(&self) -> Conserved {
        [1.0, 1.0, 0.0, self.e0()]
    }

    /// Conserved state from density, velocity and pressure.
    pub fn conserved(&self, rho: f64, u: f64, v: f64, p: f64) -> Conserved {
        let et = p / (self.gamma - 1.0) + 0.5 * rho * (u * u + v * v);
        [rho, rho * u, rho * v, et]
    }

    /// Conserved to primitive. Vacuum cells map to zeros.
    ///
    /// The internal energy is taken in absolute value so that a transiently
    /// negative energy does not produce NaN sound speeds.
    pub fn primitive(&self, q: &Conserved) -> Primitive {
        let rho = q[0];
        if rho < RHO_FLOOR {
            return Primitive::default();
        }
        let rho_inv = 1.0 / rho;
        let u = q[1] * rho_inv;
        let v = q[2] * rho_inv;
        let e = (q[3] * rho_inv - 0.5 * (u * u + v * v)).abs();
        Primitive { rho, u, v, e }
    }

    /// Temperature scaled by the free stream: `T = Ma0^2 * gamma * p / rho`.
    pub fn temperature(&self, prim: &Primitive) -> f64 {
        self.ma0 * self.ma0 * self.gamma * prim.p_on_rho(self.gamma)
    }

    /// Velocity and temperature of a conserved state.
    pub fn velocity_temperature(&self, q: &Conserved) -> (Vec2, f64) {
        let prim = self.primitive(q);
        if prim.rho == 0.0 {
            return ([0.0, 0.0], 0.0);
        }
        (prim.velocity(), self.temperature(&prim))
    }

    /// Sample a display variable from a conserved state.
    pub fn display_value(&self, q: &Conserved, var: DisplayVar) -> f64 {
        let prim = self.primitive(q);
        match var {
            DisplayVar::Rho => prim.rho,
            DisplayVar::U => prim.u,
            DisplayVar::V => prim.v,
            DisplayVar::Et => prim.e + 0.5 * prim.speed_sqr(),
            DisplayVar::Speed => prim.speed_sqr().sqrt(),
            DisplayVar::P => prim.pressure(self.gamma),
            DisplayVar::A => prim.sound_speed(self.gamma),
            DisplayVar::Mach => {
                let a = prim.sound_speed(self.gamma);
                if a > 0.0 {
                    prim.speed_sqr().sqrt() / a
                } else {
                    0.0
                }
            }
        }
    }
}
