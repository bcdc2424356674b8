//! Kerr metric in the equatorial plane (θ = π/2), Boyer-Lindquist coordinates.
//!
//! With Δ = r² − R_s r + a² = (r − R_h+)(r − R_h−) and
//! W = (r² + a² + R_s a²/r) E − R_s a L / r:
//!
//! - dt/dτ = W / Δ
//! - dφ/dτ = c (R_s a E / r + (1 − R_s/r) L) / Δ
//! - (dr/dτ)² = c² (E² − V_A), (dr/dt)² = c² (E² − V_A) Δ² / W²

use super::{lorentz_factor, IntegrationConstants, ParticleKind, TrajectoryModel};
use crate::body::CentralBody;

/// Equatorial Kerr metric (KM)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kerr {
    c: f64,
    r_s: f64,
    a: f64,
    r_h_plus: f64,
}

impl Kerr {
    /// Model for the spacetime around a rotating `body`
    pub fn new(body: &CentralBody) -> Self {
        let geometry = body.geometry();
        Self {
            c: body.constants().c,
            r_s: geometry.r_s,
            a: geometry.a,
            r_h_plus: geometry.r_h_plus,
        }
    }

    /// Spin parameter a
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Δ(r) = r² − R_s r + a², positive everywhere past extremal spin
    pub fn delta(&self, r: f64) -> f64 {
        r * r - self.r_s * r + self.a * self.a
    }

    /// g_φφ = r² + a² + R_s a² / r
    fn g_phi_phi(&self, r: f64) -> f64 {
        r * r + self.a * self.a + self.r_s * self.a * self.a / r
    }

    /// W(r) = g_φφ E − R_s a L / r
    fn w(&self, r: f64, k: &IntegrationConstants) -> f64 {
        self.g_phi_phi(r) * k.e - self.r_s * self.a * k.l / r
    }
}

impl TrajectoryModel for Kerr {
    fn name(&self) -> &'static str {
        "kerr"
    }

    fn c(&self) -> f64 {
        self.c
    }

    /// R_h+, or 0 for a naked singularity (4a² > R_s²)
    fn horizon(&self) -> f64 {
        if self.r_h_plus.is_nan() {
            0.0
        } else {
            self.r_h_plus
        }
    }

    fn static_metric(&self, r: f64) -> (f64, f64) {
        (1.0 - self.r_s / r, r * r / self.delta(r))
    }

    fn seed_velocity(&self, kind: ParticleKind, r: f64, speed: f64, angle: f64) -> (f64, f64) {
        let delta = self.delta(r);
        match kind {
            ParticleKind::Massive => {
                let gv = lorentz_factor(self.c, speed) * speed;
                (gv * angle.cos() * delta.sqrt() / r, gv * angle.sin())
            }
            ParticleKind::Photon => (
                self.c * angle.cos() * (delta / (r * (r - self.r_s))).sqrt(),
                self.c * angle.sin() * r / delta.sqrt(),
            ),
        }
    }

    /// Solves the normalization
    /// ε c² = g_tt T² + 2 b T Φ − (r²/Δ) U_r² − g_φφ Φ²
    /// for T = c dt/dτ with Φ = U_phi / r and b = R_s a / r, then
    /// E = (g_tt T + b Φ) / c and L = (g_φφ Φ − b T) / c.
    fn integration_constants(
        &self,
        kind: ParticleKind,
        r: f64,
        u_r: f64,
        u_phi: f64,
    ) -> IntegrationConstants {
        let c = self.c;
        let g_tt = 1.0 - self.r_s / r;
        let b = self.r_s * self.a / r;
        let g_pp = self.g_phi_phi(r);
        let phi_rate = u_phi / r;

        let k = kind.epsilon() * c * c
            + r * r / self.delta(r) * u_r * u_r
            + g_pp * phi_rate * phi_rate;
        let t = (-b * phi_rate + (b * b * phi_rate * phi_rate + g_tt * k).sqrt()) / g_tt;

        IntegrationConstants {
            l: (g_pp * phi_rate - b * t) / c,
            e: (g_tt * t + b * phi_rate) / c,
        }
    }

    fn potential_a(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        let (rs, a, e, l) = (self.r_s, self.a, k.e, k.l);
        let coupling = rs * (l - a * e).powi(2) / r.powi(3);
        match kind {
            ParticleKind::Massive => {
                1.0 - rs / r - (a * a * (e * e - 1.0) - l * l) / (r * r) - coupling
            }
            ParticleKind::Photon => -(a * a * e * e - l * l) / (r * r) - coupling,
        }
    }

    fn acceleration_a(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        let (c, rs, a, e, l) = (self.c, self.r_s, self.a, k.e, k.l);
        let coupling = 3.0 * rs * (l - a * e).powi(2);
        let bracket = match kind {
            ParticleKind::Massive => {
                rs * r * r + 2.0 * r * (a * a * (e * e - 1.0) - l * l) + coupling
            }
            ParticleKind::Photon => 2.0 * r * (a * a * e * e - l * l) + coupling,
        };
        -c * c / (2.0 * r.powi(4)) * bracket
    }

    fn acceleration_do(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        let (c, rs, a, e, l) = (self.c, self.r_s, self.a, k.e, k.l);
        let (r2, r3, r4) = (r * r, r * r * r, r.powi(4));
        let delta = self.delta(r);
        let w = self.w(r, k);

        let y = rs * (l - a * e).powi(2);
        // Z = 2 (E² − V_A); dq = d(E² − V_A)/dr
        let (z, dq) = match kind {
            ParticleKind::Massive => {
                let x = e * e * a * a - l * l - a * a;
                (
                    2.0 * (e * e - 1.0 + rs / r + x / r2 + y / r3),
                    -rs / r2 - 2.0 * x / r3 - 3.0 * y / r4,
                )
            }
            ParticleKind::Photon => {
                let x = e * e * a * a - l * l;
                (2.0 * (e * e + x / r2 + y / r3), -2.0 * x / r3 - 3.0 * y / r4)
            }
        };
        let dw = (2.0 * r - rs * a * a / r2) * e + rs * a * l / r2;

        c * c * delta / (2.0 * w * w) * (dq * delta + z * (2.0 * r - rs) - z * dw * delta / w)
    }

    fn dt_dtau(&self, _kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        self.w(r, k) / self.delta(r)
    }

    fn dphi_dtau(&self, _kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        self.c * (self.r_s * self.a * k.e / r + (1.0 - self.r_s / r) * k.l) / self.delta(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SOLAR_MASS;
    use crate::metric::schwarzschild::ExternalSchwarzschild;
    use crate::metric::test_support::{acceleration_from_potential, radial_rate_squared};
    use crate::metric::ReferenceFrame;
    use approx::assert_relative_eq;

    const KINDS: [ParticleKind; 2] = [ParticleKind::Massive, ParticleKind::Photon];
    const FRAMES: [ReferenceFrame; 2] = [
        ReferenceFrame::Astronaut,
        ReferenceFrame::DistantObserver,
    ];

    /// Solar-mass body with a = spin · R_s
    fn spinning_sun(spin: f64) -> CentralBody {
        let body = CentralBody::new(SOLAR_MASS, 0.0);
        let j = spin * body.r_s() * body.constants().c * SOLAR_MASS;
        body.with_angular_momentum(j)
    }

    #[test]
    fn test_zero_spin_reduces_to_external_schwarzschild() {
        let body = spinning_sun(0.0);
        let kerr = Kerr::new(&body);
        let esm = ExternalSchwarzschild::new(&body);
        let c = body.constants().c;
        let r = 9.0 * body.r_s();

        for kind in KINDS {
            let seed_k = kerr.seed_velocity(kind, r, 0.35 * c, 1.2);
            let seed_s = esm.seed_velocity(kind, r, 0.35 * c, 1.2);
            assert_relative_eq!(seed_k.0, seed_s.0, max_relative = 1e-12);
            assert_relative_eq!(seed_k.1, seed_s.1, max_relative = 1e-12);

            let k = kerr.integration_constants(kind, r, seed_k.0, seed_k.1);
            let s = esm.integration_constants(kind, r, seed_s.0, seed_s.1);
            assert_relative_eq!(k.e, s.e, max_relative = 1e-12);
            assert_relative_eq!(k.l, s.l, max_relative = 1e-12);

            for frame in FRAMES {
                for x in [1.5 * r, r, 0.5 * r] {
                    assert_relative_eq!(
                        kerr.acceleration(kind, frame, x, &s),
                        esm.acceleration(kind, frame, x, &s),
                        max_relative = 1e-10
                    );
                    assert_relative_eq!(
                        kerr.potential(kind, frame, x, &s),
                        esm.potential(kind, frame, x, &s),
                        max_relative = 1e-10
                    );
                }
            }
            assert_relative_eq!(
                kerr.dt_dtau(kind, r, &s),
                esm.dt_dtau(kind, r, &s),
                max_relative = 1e-12
            );
            assert_relative_eq!(
                kerr.dphi_dtau(kind, r, &s),
                esm.dphi_dtau(kind, r, &s),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_constants_satisfy_normalization() {
        let body = spinning_sun(0.3);
        let kerr = Kerr::new(&body);
        let c = body.constants().c;
        let rs = body.r_s();
        let a = kerr.a();
        let r = 8.0 * rs;
        let (u_r, u_phi) = (0.1 * c, 0.3 * c);

        for kind in KINDS {
            let k = kerr.integration_constants(kind, r, u_r, u_phi);
            assert_relative_eq!(
                radial_rate_squared(&kerr, kind, r, &k),
                (u_r / c).powi(2),
                max_relative = 1e-10
            );

            // Rates recovered from (L, E) match the launch state
            let t = c * kerr.dt_dtau(kind, r, &k);
            let phi_rate = kerr.dphi_dtau(kind, r, &k);
            assert_relative_eq!(phi_rate, u_phi / r, max_relative = 1e-10);

            let g_tt = 1.0 - rs / r;
            let b = rs * a / r;
            let g_pp = r * r + a * a + rs * a * a / r;
            let norm = g_tt * t * t + 2.0 * b * t * phi_rate
                - r * r / kerr.delta(r) * u_r * u_r
                - g_pp * phi_rate * phi_rate;
            let expected = kind.epsilon() * c * c;
            assert!(
                (norm - expected).abs() < 1e-8 * c * c,
                "{:?}: normalization {} vs {}",
                kind,
                norm,
                expected
            );
        }
    }

    #[test]
    fn test_accelerations_derive_from_potentials() {
        let body = spinning_sun(0.3);
        let kerr = Kerr::new(&body);
        let c = body.constants().c;
        let rs = body.r_s();
        let k = IntegrationConstants {
            l: 2.5 * rs,
            e: 0.98,
        };

        for kind in KINDS {
            for frame in FRAMES {
                let r = 6.0 * rs;
                let expected =
                    acceleration_from_potential(c, |x| kerr.potential(kind, frame, x, &k), r);
                assert_relative_eq!(
                    kerr.acceleration(kind, frame, r, &k),
                    expected,
                    max_relative = 1e-6
                );
            }
        }
    }

    #[test]
    fn test_frame_dragging_turns_zero_momentum_orbit() {
        // A particle with L = 0 still co-rotates with the body
        let body = spinning_sun(0.4);
        let kerr = Kerr::new(&body);
        let k = IntegrationConstants { l: 0.0, e: 1.0 };
        let r = 3.0 * body.r_s();
        assert!(kerr.dphi_dtau(ParticleKind::Massive, r, &k) > 0.0);

        let still = spinning_sun(0.0);
        let schwarzschild = Kerr::new(&still);
        assert_eq!(schwarzschild.dphi_dtau(ParticleKind::Massive, r, &k), 0.0);
    }

    #[test]
    fn test_horizon_is_outer_root_of_delta() {
        let body = spinning_sun(0.4);
        let kerr = Kerr::new(&body);
        assert_relative_eq!(kerr.horizon(), 0.8 * body.r_s(), max_relative = 1e-12);
        assert!(kerr.delta(kerr.horizon()).abs() < 1e-9 * body.r_s().powi(2));
        assert!(kerr.delta(0.5 * body.r_s()) < 0.0);
    }

    #[test]
    fn test_naked_singularity_has_finite_geometry() {
        let body = spinning_sun(0.6);
        assert!(!body.has_horizon());
        let kerr = Kerr::new(&body);
        let rs = body.r_s();
        let a = kerr.a();
        let c = body.constants().c;
        assert_eq!(kerr.horizon(), 0.0);

        for r in [0.5 * rs, rs, 20.0 * rs] {
            assert_relative_eq!(kerr.delta(r), r * r - rs * r + a * a, max_relative = 1e-12);
            assert!(kerr.delta(r) > 0.0);
        }

        let r = 20.0 * rs;
        let (u_r, u_phi) = kerr.seed_velocity(ParticleKind::Massive, r, 0.2 * c, 1.3);
        let k = kerr.integration_constants(ParticleKind::Massive, r, u_r, u_phi);
        assert!(k.l.is_finite() && k.e.is_finite());
        assert!(kerr.dt_dtau(ParticleKind::Massive, r, &k) > 1.0);
    }
}
