//! Convective face fluxes.
//!
//! Every function takes the left and right states of a face and the face
//! vector `s` (normal scaled by face length, pointing from left to right)
//! and returns the flux through the whole face, i.e. per-unit-length flux
//! times `|s|`.

use mbflow_core::{Conserved, GasModel, Vec2};

use crate::config::ConvectScheme;

/// Flux from `ql` to `qr` through face vector `s` using `scheme`.
pub fn convective_flux(
    scheme: ConvectScheme,
    gas: &GasModel,
    ql: &Conserved,
    qr: &Conserved,
    s: Vec2,
) -> Conserved {
    match scheme {
        ConvectScheme::VanLeer => van_leer(gas, ql, qr, s),
        ConvectScheme::Roe => roe(gas, ql, qr, s),
    }
}

/// Unit normal and length of a face vector.
fn normal_and_length(s: Vec2) -> (Vec2, f64) {
    let len = (s[0] * s[0] + s[1] * s[1]).sqrt();
    if len == 0.0 {
        return ([0.0, 0.0], 0.0);
    }
    ([s[0] / len, s[1] / len], len)
}

fn scale(f: Conserved, k: f64) -> Conserved {
    [f[0] * k, f[1] * k, f[2] * k, f[3] * k]
}

/// van Leer flux-vector splitting.
pub fn van_leer(gas: &GasModel, ql: &Conserved, qr: &Conserved, s: Vec2) -> Conserved {
    let (n, len) = normal_and_length(s);
    let plus = van_leer_split(gas, ql, n, 1.0);
    let minus = van_leer_split(gas, qr, n, -1.0);
    scale(
        [
            plus[0] + minus[0],
            plus[1] + minus[1],
            plus[2] + minus[2],
            plus[3] + minus[3],
        ],
        len,
    )
}

/// One half of the van Leer split. `dir` is +1 for F+ and -1 for F-.
fn van_leer_split(gas: &GasModel, q: &Conserved, n: Vec2, dir: f64) -> Conserved {
    let gamma = gas.gamma;
    let prim = gas.primitive(q);
    if prim.rho == 0.0 {
        return [0.0; 4];
    }
    let rho = prim.rho;
    let v = prim.velocity();
    let p_on_rho = prim.p_on_rho(gamma);
    let p = p_on_rho * rho;
    let v_across = v[0] * n[0] + v[1] * n[1];
    let a = (gamma * p_on_rho).sqrt();
    let ma = v_across / a;

    if ma >= 1.0 || ma <= -1.0 {
        let weight = if ma >= 1.0 {
            0.5 * (1.0 + dir)
        } else {
            0.5 * (1.0 - dir)
        };
        let h = prim.enthalpy(gamma);
        let m = rho * v_across;
        return scale(
            [m, m * v[0] + p * n[0], m * v[1] + p * n[1], m * h],
            weight,
        );
    }

    let f_mass = dir * rho * a / 4.0 * (ma + dir) * (ma + dir);
    let u_part = (-v_across + dir * 2.0 * a) / gamma;
    [
        f_mass,
        f_mass * (u_part * n[0] + v[0]),
        f_mass * (u_part * n[1] + v[1]),
        f_mass * (a * a / (gamma - 1.0) + 0.5 * prim.speed_sqr()),
    ]
}

/// Roe flux-difference splitting with a Harten-style eigenvalue limiter.
///
/// Falls back to [`van_leer`] when either side is vacuum, where Roe
/// averages are undefined.
pub fn roe(gas: &GasModel, ql: &Conserved, qr: &Conserved, s: Vec2) -> Conserved {
    let gamma = gas.gamma;
    let l = gas.primitive(ql);
    let r = gas.primitive(qr);
    if l.rho == 0.0 || r.rho == 0.0 {
        return van_leer(gas, ql, qr, s);
    }
    let (n, len) = normal_and_length(s);
    let dot = |a: Vec2, b: Vec2| a[0] * b[0] + a[1] * b[1];

    let (v_l, v_r) = (l.velocity(), r.velocity());
    let (p_l, p_r) = (l.pressure(gamma), r.pressure(gamma));
    let (a_l, a_r) = (l.sound_speed(gamma), r.sound_speed(gamma));
    let (h_l, h_r) = (l.enthalpy(gamma), r.enthalpy(gamma));

    // Roe-averaged state.
    let w = (r.rho / l.rho).sqrt();
    let rho_m = (r.rho * l.rho).sqrt();
    let v_m = [
        (v_l[0] + v_r[0] * w) / (1.0 + w),
        (v_l[1] + v_r[1] * w) / (1.0 + w),
    ];
    let p_m = (p_l + p_r * w) / (1.0 + w);
    let a_m = (gamma * p_m / rho_m).sqrt();
    let v_m_sqr = dot(v_m, v_m);
    let h_m = gamma / (gamma - 1.0) * p_m / rho_m + 0.5 * v_m_sqr;

    let v_normal = dot(v_m, n);
    let dv = [v_r[0] - v_l[0], v_r[1] - v_l[1]];
    let dv_normal = dot(dv, n);

    let v_limit = 0.5 * (dv_normal.abs() + (a_r - a_l).abs());
    let eigen1 = v_normal.abs();
    let eigen2 = v_limit.max((v_normal + a_m).abs());
    let eigen3 = v_limit.max((v_normal - a_m).abs());

    let a_star = 0.5 * (eigen2 + eigen3);
    let ma_star = 0.5 * (eigen2 - eigen3) / a_m;

    let drho = r.rho - l.rho;
    let dp = p_r - p_l;
    let drho_v = [
        rho_m * dv[0] + drho * v_m[0],
        rho_m * dv[1] + drho * v_m[1],
    ];
    let drho_e = dp / (gamma - 1.0) + 0.5 * v_m_sqr * drho + rho_m * dot(v_m, dv);

    let dv_roe = ma_star * dv_normal + (a_star - eigen1) * dp / rho_m / (a_m * a_m);
    let dp_roe = ma_star * dp + (a_star - eigen1) * rho_m * dv_normal;

    // |A| dq
    let d0 = eigen1 * drho + dv_roe * rho_m;
    let d1 = eigen1 * drho_v[0] + rho_m * dv_roe * v_m[0] + dp_roe * n[0];
    let d2 = eigen1 * drho_v[1] + rho_m * dv_roe * v_m[1] + dp_roe * n[1];
    let d3 = eigen1 * drho_e + rho_m * dv_roe * h_m + dp_roe * v_normal;

    let m_l = l.rho * dot(v_l, n);
    let m_r = r.rho * dot(v_r, n);
    scale(
        [
            0.5 * (m_l + m_r - d0),
            0.5 * (m_l * v_l[0] + m_r * v_r[0] + (p_l + p_r) * n[0] - d1),
            0.5 * (m_l * v_l[1] + m_r * v_r[1] + (p_l + p_r) * n[1] - d2),
            0.5 * (m_l * h_l + m_r * h_r - d3),
        ],
        len,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gas() -> GasModel {
        GasModel::new(0.5)
    }

    /// Exact Euler flux of a single state.
    fn physical_flux(gas: &GasModel, q: &Conserved, s: Vec2) -> Conserved {
        let prim = gas.primitive(q);
        let p = prim.pressure(gas.gamma);
        let vn = prim.u * s[0] + prim.v * s[1];
        let m = prim.rho * vn;
        [
            m,
            m * prim.u + p * s[0],
            m * prim.v + p * s[1],
            m * prim.enthalpy(gas.gamma),
        ]
    }

    fn assert_close(a: Conserved, b: Conserved, tol: f64) {
        for k in 0..4 {
            assert!(
                (a[k] - b[k]).abs() <= tol * (1.0 + b[k].abs()),
                "component {k}: {a:?} vs {b:?}"
            );
        }
    }

    #[test]
    fn both_schemes_are_consistent_with_physical_flux() {
        let g = gas();
        let q = g.conserved(1.2, 0.7, -0.3, g.p0() * 1.1);
        let s = [0.3, 0.4];
        let exact = physical_flux(&g, &q, s);
        assert_close(van_leer(&g, &q, &q, s), exact, 1e-12);
        assert_close(roe(&g, &q, &q, s), exact, 1e-12);
    }

    #[test]
    fn supersonic_van_leer_is_pure_upwind() {
        let g = GasModel::new(2.0);
        let ql = g.freestream();
        let qr = g.conserved(0.5, 1.5, 0.0, g.p0() * 0.5);
        let s = [1.0, 0.0];
        assert_close(van_leer(&g, &ql, &qr, s), physical_flux(&g, &ql, s), 1e-12);
    }

    #[test]
    fn flux_scales_with_face_length() {
        let g = gas();
        let ql = g.freestream();
        let qr = g.conserved(0.9, 0.8, 0.1, g.p0());
        let unit = roe(&g, &ql, &qr, [0.0, 1.0]);
        let long = roe(&g, &ql, &qr, [0.0, 4.0]);
        for k in 0..4 {
            assert!((long[k] - 4.0 * unit[k]).abs() < 1e-12);
        }
    }

    #[test]
    fn reversing_face_negates_flux() {
        let g = gas();
        let ql = g.freestream();
        let qr = g.conserved(0.9, 0.8, 0.1, g.p0() * 0.95);
        let s = [0.6, -0.8];
        let fwd = van_leer(&g, &ql, &qr, s);
        let back = van_leer(&g, &qr, &ql, [-s[0], -s[1]]);
        assert_close(fwd, [-back[0], -back[1], -back[2], -back[3]], 1e-12);
    }

    #[test]
    fn zero_normal_velocity_has_no_mass_flux() {
        let g = gas();
        let q = g.conserved(1.0, 0.0, 0.0, g.p0());
        let f = van_leer(&g, &q, &q, [0.0, 1.0]);
        assert_eq!(f[0], 0.0);
        assert_eq!(f[3], 0.0);
        assert!((f[2] - g.p0()).abs() < 1e-12);
    }

    #[test]
    fn vacuum_side_does_not_produce_nan() {
        let g = gas();
        let f = roe(&g, &g.freestream(), &[0.0; 4], [1.0, 0.0]);
        assert!(f.iter().all(|v| v.is_finite()));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn state() -> impl Strategy<Value = (f64, f64, f64, f64)> {
            (0.2f64..2.0, -3.0f64..3.0, -3.0f64..3.0, 0.5f64..2.0)
        }

        proptest! {
            #[test]
            fn roe_is_antisymmetric_under_face_reversal(
                l in state(),
                r in state(),
                angle in 0.0f64..std::f64::consts::TAU,
            ) {
                let g = GasModel::new(0.8);
                let ql = g.conserved(l.0, l.1, l.2, l.3 * g.p0());
                let qr = g.conserved(r.0, r.1, r.2, r.3 * g.p0());
                let s = [angle.cos(), angle.sin()];
                let fwd = roe(&g, &ql, &qr, s);
                let back = roe(&g, &qr, &ql, [-s[0], -s[1]]);
                for k in 0..4 {
                    prop_assert!((fwd[k] + back[k]).abs() < 1e-9 * (1.0 + fwd[k].abs()));
                }
            }
        }
    }
}
