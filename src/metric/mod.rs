//! Equatorial geodesic models
//!
//! Each spacetime region is a strategy implementing [`TrajectoryModel`]:
//! it turns a launch state into frozen integration constants (L, E), gives
//! the effective potential and the radial acceleration for a particle kind
//! and reference frame, and the rates dt/dτ, dφ/dτ used to advance the
//! angle and the clocks.
//!
//! Conventions, shared by every model:
//! - `U_r` is dr/dτ and `U_phi` is r dφ/dτ, both in m/s;
//! - L is a length (L = r U_phi / c far from rotation) and E is dimensionless;
//! - (dr/dτ)² = c² (E² − V_A) and (dr/dt)² = c² (E² − V_DO).

use serde::{Deserialize, Serialize};

pub mod kerr;
pub mod schwarzschild;

pub use kerr::Kerr;
pub use schwarzschild::{ExternalSchwarzschild, InternalSchwarzschild};

/// Massive particle or photon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Particle with rest mass; moves slower than c
    Massive,
    /// Photon; always moves at c
    Photon,
}

impl ParticleKind {
    /// 1 for massive particles, 0 for photons
    pub(crate) fn epsilon(self) -> f64 {
        match self {
            ParticleKind::Massive => 1.0,
            ParticleKind::Photon => 0.0,
        }
    }

    /// True for photons
    pub fn is_photon(self) -> bool {
        self == ParticleKind::Photon
    }
}

/// Time coordinate the trajectory is integrated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReferenceFrame {
    /// Proper time τ of the travelling astronaut ("A")
    #[default]
    Astronaut,
    /// Coordinate time t of an observer at infinity ("DO")
    DistantObserver,
}

/// Constants of motion, computed once at launch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegrationConstants {
    /// Specific angular momentum (m)
    pub l: f64,
    /// Specific energy (dimensionless)
    pub e: f64,
}

/// Velocity measured by a static observer at the mobile's position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalVelocity {
    /// Radial component (m/s)
    pub v_r: f64,
    /// Tangential component (m/s), signed like dφ/dτ
    pub v_phi: f64,
    /// Norm (m/s)
    pub speed: f64,
}

/// A spacetime region in which equatorial geodesics are integrated
pub trait TrajectoryModel {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Speed of light the model was built with
    fn c(&self) -> f64;

    /// Radius below which no distant-observer time is defined
    fn horizon(&self) -> f64;

    /// Metric coefficients (g_tt, g_rr) seen by a static observer at r
    fn static_metric(&self, r: f64) -> (f64, f64);

    /// 4-velocity (U_r, U_phi) of a launch at `speed` (ignored for photons)
    /// and angle `angle` from the outward radial direction, both measured by
    /// a static observer
    fn seed_velocity(&self, kind: ParticleKind, r: f64, speed: f64, angle: f64) -> (f64, f64);

    /// Constants of motion for a launch at (r, U_r, U_phi)
    fn integration_constants(
        &self,
        kind: ParticleKind,
        r: f64,
        u_r: f64,
        u_phi: f64,
    ) -> IntegrationConstants;

    /// Effective potential V_A with (dr/dτ)² = c² (E² − V_A)
    fn potential_a(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64;

    /// d²r/dτ²
    fn acceleration_a(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64;

    /// d²r/dt²
    fn acceleration_do(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64;

    /// dt/dτ
    fn dt_dtau(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64;

    /// dφ/dτ
    fn dphi_dtau(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64;

    /// Effective potential V_DO with (dr/dt)² = c² (E² − V_DO)
    fn potential_do(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        let e2 = k.e * k.e;
        let ratio = self.dt_dtau(kind, r, k);
        e2 - (e2 - self.potential_a(kind, r, k)) / (ratio * ratio)
    }

    /// Potential in the requested frame
    fn potential(
        &self,
        kind: ParticleKind,
        frame: ReferenceFrame,
        r: f64,
        k: &IntegrationConstants,
    ) -> f64 {
        match frame {
            ReferenceFrame::Astronaut => self.potential_a(kind, r, k),
            ReferenceFrame::DistantObserver => self.potential_do(kind, r, k),
        }
    }

    /// Radial acceleration in the requested frame
    fn acceleration(
        &self,
        kind: ParticleKind,
        frame: ReferenceFrame,
        r: f64,
        k: &IntegrationConstants,
    ) -> f64 {
        match frame {
            ReferenceFrame::Astronaut => self.acceleration_a(kind, r, k),
            ReferenceFrame::DistantObserver => self.acceleration_do(kind, r, k),
        }
    }

    /// dφ/dt
    fn dphi_dt(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        self.dphi_dtau(kind, r, k) / self.dt_dtau(kind, r, k)
    }

    /// Velocity measured by a static observer, given dr/dτ.
    ///
    /// NaN inside the horizon, where no static observer exists.
    fn local_velocity(
        &self,
        kind: ParticleKind,
        r: f64,
        u_r: f64,
        k: &IntegrationConstants,
    ) -> LocalVelocity {
        let (g_tt, g_rr) = self.static_metric(r);
        // dt_local/dτ
        let gamma = g_tt.sqrt() * self.dt_dtau(kind, r, k);
        if gamma.is_nan() {
            return LocalVelocity {
                v_r: f64::NAN,
                v_phi: f64::NAN,
                speed: f64::NAN,
            };
        }
        let c = self.c();

        let v_r = g_rr.sqrt() * u_r / gamma;
        let speed = match kind {
            ParticleKind::Massive => c * (1.0 - 1.0 / (gamma * gamma)).max(0.0).sqrt(),
            ParticleKind::Photon => c,
        };
        let tangential = (speed * speed - v_r * v_r).max(0.0).sqrt();
        let v_phi = if self.dphi_dtau(kind, r, k) < 0.0 {
            -tangential
        } else {
            tangential
        };

        LocalVelocity { v_r, v_phi, speed }
    }
}

/// Radial equation of motion for one mobile, fed to the RK4 integrator
///
/// The acceleration depends on r only; the independent variable and the
/// current radial rate are ignored.
pub struct RadialEquation<'a> {
    /// Region the mobile is in
    pub model: &'a dyn TrajectoryModel,
    /// Particle kind
    pub kind: ParticleKind,
    /// Integration frame
    pub frame: ReferenceFrame,
    /// Frozen constants of motion
    pub constants: IntegrationConstants,
}

impl crate::integrator::SecondOrderOde for RadialEquation<'_> {
    fn acceleration(&self, _x: f64, r: f64, _dr: f64) -> f64 {
        self.model.acceleration(self.kind, self.frame, r, &self.constants)
    }
}

/// Lorentz factor of a speed v
pub(crate) fn lorentz_factor(c: f64, v: f64) -> f64 {
    1.0 / (1.0 - (v / c).powi(2)).sqrt()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Central difference of V, scaled to the acceleration −(c²/2) dV/dr
    pub fn acceleration_from_potential<F: Fn(f64) -> f64>(c: f64, potential: F, r: f64) -> f64 {
        let h = r * 1e-6;
        -0.5 * c * c * (potential(r + h) - potential(r - h)) / (2.0 * h)
    }

    /// (dr/dτ / c)² recovered from the potential
    pub fn radial_rate_squared(
        model: &dyn TrajectoryModel,
        kind: ParticleKind,
        r: f64,
        k: &IntegrationConstants,
    ) -> f64 {
        k.e * k.e - model.potential_a(kind, r, k)
    }
}
