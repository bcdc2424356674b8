//! Schwarzschild spacetime: external vacuum solution (r ≥ R) and the
//! interior solution of a uniform-density body (r < R).

use super::{lorentz_factor, IntegrationConstants, ParticleKind, TrajectoryModel};
use crate::body::CentralBody;

/// External Schwarzschild metric (ESM)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExternalSchwarzschild {
    c: f64,
    r_s: f64,
}

impl ExternalSchwarzschild {
    /// Model for the vacuum outside `body`
    pub fn new(body: &CentralBody) -> Self {
        Self {
            c: body.constants().c,
            r_s: body.r_s(),
        }
    }

    /// Schwarzschild radius
    pub fn r_s(&self) -> f64 {
        self.r_s
    }
}

impl TrajectoryModel for ExternalSchwarzschild {
    fn name(&self) -> &'static str {
        "external schwarzschild"
    }

    fn c(&self) -> f64 {
        self.c
    }

    fn horizon(&self) -> f64 {
        self.r_s
    }

    fn static_metric(&self, r: f64) -> (f64, f64) {
        let g_tt = 1.0 - self.r_s / r;
        (g_tt, 1.0 / g_tt)
    }

    fn seed_velocity(&self, kind: ParticleKind, r: f64, speed: f64, angle: f64) -> (f64, f64) {
        let redshift = (1.0 - self.r_s / r).sqrt();
        match kind {
            ParticleKind::Massive => {
                let gv = lorentz_factor(self.c, speed) * speed;
                (gv * angle.cos() * redshift, gv * angle.sin())
            }
            ParticleKind::Photon => (self.c * angle.cos(), self.c * angle.sin() / redshift),
        }
    }

    fn integration_constants(
        &self,
        kind: ParticleKind,
        r: f64,
        u_r: f64,
        u_phi: f64,
    ) -> IntegrationConstants {
        let c = self.c;
        let l = u_phi * r / c;
        let e = ((u_r / c).powi(2)
            + (1.0 - self.r_s / r) * (kind.epsilon() + (u_phi / c).powi(2)))
        .sqrt();
        IntegrationConstants { l, e }
    }

    fn potential_a(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        (1.0 - self.r_s / r) * (kind.epsilon() + k.l * k.l / (r * r))
    }

    fn acceleration_a(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        let (c, rs, l) = (self.c, self.r_s, k.l);
        let r4 = r.powi(4);
        match kind {
            ParticleKind::Massive => {
                c * c / (2.0 * r4) * (-rs * r * r + (2.0 * r - 3.0 * rs) * l * l)
            }
            ParticleKind::Photon => c * c / (2.0 * r4) * (2.0 * r - 3.0 * rs) * l * l,
        }
    }

    fn acceleration_do(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        let (c, rs, l, e) = (self.c, self.r_s, k.l, k.e);
        let (r2, r3) = (r * r, r * r * r);
        let l2 = l * l;

        let mut bracket = 2.0 * e * e * r3 * rs + 2.0 * l2 * r2 - 7.0 * l2 * r * rs
            + 5.0 * l2 * rs * rs;
        if kind == ParticleKind::Massive {
            bracket += -3.0 * r3 * rs + 3.0 * r2 * rs * rs;
        }
        c * c * (r - rs) * bracket / (2.0 * e * e * r.powi(6))
    }

    fn dt_dtau(&self, _kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        k.e / (1.0 - self.r_s / r)
    }

    fn dphi_dtau(&self, _kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        self.c * k.l / (r * r)
    }
}

/// Internal Schwarzschild metric (ISM) of a uniform-density body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InternalSchwarzschild {
    c: f64,
    r_s: f64,
    radius: f64,
}

impl InternalSchwarzschild {
    /// Model for the interior of `body`
    pub fn new(body: &CentralBody) -> Self {
        Self {
            c: body.constants().c,
            r_s: body.r_s(),
            radius: body.radius(),
        }
    }

    /// α(r) = 1 − r² R_s / R³
    pub fn alpha(&self, r: f64) -> f64 {
        1.0 - r * r * self.r_s / self.radius.powi(3)
    }

    /// β(r) = 3/2 √(1 − R_s/R) − 1/2 √α(r)
    pub fn beta(&self, r: f64) -> f64 {
        1.5 * (1.0 - self.r_s / self.radius).sqrt() - 0.5 * self.alpha(r).sqrt()
    }

    /// G(r) = α (E²β² − β⁴ P) with P = L²/r² + ε, so that (dr/dt)² = c² G / E²
    fn g_and_derivative(
        &self,
        kind: ParticleKind,
        r: f64,
        k: &IntegrationConstants,
    ) -> (f64, f64) {
        let r3 = self.radius.powi(3);
        let alpha = self.alpha(r);
        let beta = self.beta(r);
        let p = k.l * k.l / (r * r) + kind.epsilon();

        let d_alpha = -2.0 * r * self.r_s / r3;
        let d_beta = r * self.r_s / (2.0 * r3 * alpha.sqrt());
        let d_p = -2.0 * k.l * k.l / (r * r * r);

        let e2 = k.e * k.e;
        let b2 = beta * beta;
        let b3 = b2 * beta;
        let b4 = b2 * b2;

        let g = alpha * (e2 * b2 - b4 * p);
        let dg = d_alpha * (e2 * b2 - b4 * p)
            + alpha * (2.0 * e2 * beta * d_beta - 4.0 * b3 * d_beta * p - b4 * d_p);
        (g, dg)
    }
}

impl TrajectoryModel for InternalSchwarzschild {
    fn name(&self) -> &'static str {
        "internal schwarzschild"
    }

    fn c(&self) -> f64 {
        self.c
    }

    fn horizon(&self) -> f64 {
        0.0
    }

    fn static_metric(&self, r: f64) -> (f64, f64) {
        (self.beta(r).powi(2), 1.0 / self.alpha(r))
    }

    fn seed_velocity(&self, kind: ParticleKind, r: f64, speed: f64, angle: f64) -> (f64, f64) {
        let alpha = self.alpha(r);
        match kind {
            ParticleKind::Massive => {
                let gv = lorentz_factor(self.c, speed) * speed;
                (gv * angle.cos() * alpha.sqrt(), gv * angle.sin())
            }
            ParticleKind::Photon => {
                let beta = self.beta(r);
                (
                    self.c * angle.cos() * alpha.sqrt() / beta,
                    self.c * angle.sin() / beta,
                )
            }
        }
    }

    fn integration_constants(
        &self,
        kind: ParticleKind,
        r: f64,
        u_r: f64,
        u_phi: f64,
    ) -> IntegrationConstants {
        let c = self.c;
        let rest = kind.epsilon() * c * c;
        let e = self.beta(r) / c * (u_r * u_r / self.alpha(r) + u_phi * u_phi + rest).sqrt();
        IntegrationConstants {
            l: u_phi * r / c,
            e,
        }
    }

    fn potential_a(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        let beta = self.beta(r);
        let p = k.l * k.l / (r * r) + kind.epsilon();
        k.e * k.e - self.alpha(r) * ((k.e / beta).powi(2) - p)
    }

    fn acceleration_a(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        let c2 = self.c * self.c;
        let rs = self.r_s;
        let big_r = self.radius;
        let alpha = self.alpha(r);
        let beta = self.beta(r);
        let l = k.l;
        let e = k.e;

        -(c2 * r * rs / big_r.powi(3)) * ((e / beta).powi(2) - (l / r).powi(2) - kind.epsilon())
            + c2 * alpha
                * 0.5
                * (-e * e * r * rs / ((beta * big_r).powi(3) * alpha.sqrt())
                    + 2.0 * l * l / r.powi(3))
    }

    fn acceleration_do(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        let (_, dg) = self.g_and_derivative(kind, r, k);
        self.c * self.c / (2.0 * k.e * k.e) * dg
    }

    fn potential_do(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        let (g, _) = self.g_and_derivative(kind, r, k);
        k.e * k.e - g / (k.e * k.e)
    }

    fn dt_dtau(&self, _kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        k.e / self.beta(r).powi(2)
    }

    fn dphi_dtau(&self, _kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        self.c * k.l / (r * r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SOLAR_MASS;
    use crate::metric::test_support::{acceleration_from_potential, radial_rate_squared};
    use crate::metric::ReferenceFrame;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    const KINDS: [ParticleKind; 2] = [ParticleKind::Massive, ParticleKind::Photon];

    fn sun_with_radius(factor: f64) -> CentralBody {
        let mut body = CentralBody::new(SOLAR_MASS, 0.0);
        let rs = body.r_s();
        body.set_radius(factor * rs);
        body
    }

    #[test]
    fn test_esm_constants_match_launch_rate() {
        let body = sun_with_radius(0.0);
        let esm = ExternalSchwarzschild::new(&body);
        let c = body.constants().c;
        let r = 7.0 * body.r_s();

        for kind in KINDS {
            let (u_r, u_phi) = esm.seed_velocity(kind, r, 0.3 * c, 0.7);
            let k = esm.integration_constants(kind, r, u_r, u_phi);
            assert_relative_eq!(
                radial_rate_squared(&esm, kind, r, &k),
                (u_r / c).powi(2),
                max_relative = 1e-12
            );
            assert_relative_eq!(k.l, u_phi * r / c);
        }
    }

    #[test]
    fn test_esm_photon_seed_has_unit_energy() {
        let body = sun_with_radius(0.0);
        let esm = ExternalSchwarzschild::new(&body);
        let r = 4.0 * body.r_s();
        for angle in [0.0, 0.4, FRAC_PI_2, 2.5] {
            let (u_r, u_phi) = esm.seed_velocity(ParticleKind::Photon, r, 0.0, angle);
            let k = esm.integration_constants(ParticleKind::Photon, r, u_r, u_phi);
            assert_relative_eq!(k.e, 1.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_esm_massive_seed_energy_is_redshifted_gamma() {
        let body = sun_with_radius(0.0);
        let esm = ExternalSchwarzschild::new(&body);
        let c = body.constants().c;
        let r = 10.0 * body.r_s();

        let (u_r, u_phi) = esm.seed_velocity(ParticleKind::Massive, r, 0.2 * c, FRAC_PI_2);
        assert!(u_r.abs() < 1e-6 * c);
        let k = esm.integration_constants(ParticleKind::Massive, r, u_r, u_phi);
        // E² = (1 − R_s/r) γ² = 0.9 / 0.96
        assert_relative_eq!(k.e * k.e, 0.9375, max_relative = 1e-12);
    }

    #[test]
    fn test_esm_accelerations_derive_from_potentials() {
        let body = sun_with_radius(0.0);
        let esm = ExternalSchwarzschild::new(&body);
        let c = body.constants().c;
        let rs = body.r_s();
        let k = IntegrationConstants {
            l: 2.0 * rs,
            e: 0.97,
        };

        for kind in KINDS {
            for frame in [ReferenceFrame::Astronaut, ReferenceFrame::DistantObserver] {
                let r = 7.0 * rs;
                let expected =
                    acceleration_from_potential(c, |x| esm.potential(kind, frame, x, &k), r);
                assert_relative_eq!(
                    esm.acceleration(kind, frame, r, &k),
                    expected,
                    max_relative = 1e-6
                );
            }
        }
    }

    #[test]
    fn test_esm_circular_orbit_has_no_radial_acceleration() {
        let body = sun_with_radius(0.0);
        let esm = ExternalSchwarzschild::new(&body);
        let rs = body.r_s();
        let r = 8.0 * rs;
        // L² = R_s r² / (2r − 3R_s)
        let l = (rs * r * r / (2.0 * r - 3.0 * rs)).sqrt();
        let k = IntegrationConstants { l, e: 0.95 };
        let scale = esm.c().powi(2) / r;
        assert!(esm.acceleration_a(ParticleKind::Massive, r, &k).abs() < 1e-12 * scale);

        // Photon sphere at 1.5 R_s
        assert_eq!(esm.acceleration_a(ParticleKind::Photon, 1.5 * rs, &k), 0.0);
    }

    #[test]
    fn test_ism_constants_and_seed() {
        let body = sun_with_radius(3.0);
        let ism = InternalSchwarzschild::new(&body);
        let c = body.constants().c;
        let r = 1.2 * body.r_s();

        for kind in KINDS {
            let (u_r, u_phi) = ism.seed_velocity(kind, r, 0.25 * c, 1.1);
            let k = ism.integration_constants(kind, r, u_r, u_phi);
            assert_relative_eq!(
                radial_rate_squared(&ism, kind, r, &k),
                (u_r / c).powi(2),
                max_relative = 1e-10
            );
        }

        let (u_r, u_phi) = ism.seed_velocity(ParticleKind::Photon, r, 0.0, 0.3);
        let k = ism.integration_constants(ParticleKind::Photon, r, u_r, u_phi);
        assert_relative_eq!(k.e, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_ism_accelerations_derive_from_potentials() {
        let body = sun_with_radius(3.0);
        let ism = InternalSchwarzschild::new(&body);
        let c = body.constants().c;
        let rs = body.r_s();
        let k = IntegrationConstants { l: rs, e: 0.9 };

        for kind in KINDS {
            for frame in [ReferenceFrame::Astronaut, ReferenceFrame::DistantObserver] {
                let r = 1.7 * rs;
                let expected =
                    acceleration_from_potential(c, |x| ism.potential(kind, frame, x, &k), r);
                assert_relative_eq!(
                    ism.acceleration(kind, frame, r, &k),
                    expected,
                    max_relative = 1e-6
                );
            }
        }
    }

    #[test]
    fn test_ism_matches_esm_at_surface() {
        let body = sun_with_radius(3.0);
        let ism = InternalSchwarzschild::new(&body);
        let esm = ExternalSchwarzschild::new(&body);
        let c = body.constants().c;
        let surface = body.radius();

        let g_tt = 1.0 - body.r_s() / surface;
        assert_relative_eq!(ism.alpha(surface), g_tt, max_relative = 1e-14);
        assert_relative_eq!(ism.beta(surface).powi(2), g_tt, max_relative = 1e-14);

        for kind in KINDS {
            let (u_r, u_phi) = esm.seed_velocity(kind, surface, 0.3 * c, 2.0);
            let outside = esm.integration_constants(kind, surface, u_r, u_phi);
            let inside = ism.integration_constants(kind, surface, u_r, u_phi);
            assert_relative_eq!(outside.e, inside.e, max_relative = 1e-12);
            assert_relative_eq!(outside.l, inside.l, max_relative = 1e-12);
            assert_relative_eq!(
                esm.potential_a(kind, surface, &outside),
                ism.potential_a(kind, surface, &outside),
                max_relative = 1e-12
            );
            assert_relative_eq!(
                esm.dt_dtau(kind, surface, &outside),
                ism.dt_dtau(kind, surface, &outside),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_esm_local_velocity_recovers_launch_speed() {
        let body = sun_with_radius(0.0);
        let esm = ExternalSchwarzschild::new(&body);
        let c = body.constants().c;
        let r = 6.0 * body.r_s();
        let (speed, angle) = (0.4 * c, 0.8_f64);

        let (u_r, u_phi) = esm.seed_velocity(ParticleKind::Massive, r, speed, angle);
        let k = esm.integration_constants(ParticleKind::Massive, r, u_r, u_phi);
        let v = esm.local_velocity(ParticleKind::Massive, r, u_r, &k);

        assert_relative_eq!(v.speed, speed, max_relative = 1e-10);
        assert_relative_eq!(v.v_r, speed * angle.cos(), max_relative = 1e-10);
        assert_relative_eq!(v.v_phi, speed * angle.sin(), max_relative = 1e-10);
    }
}
