//! Test particles and photons moving around a central body

use crate::constants::PhysicsConstants;
use crate::metric::{IntegrationConstants, LocalVelocity, ParticleKind};
use crate::trajectory::TrajectoryError;
use serde::Serialize;

/// Lifecycle of a mobile inside a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MobileState {
    /// Launch parameters only; no constants of motion yet
    Seeded,
    /// Constants computed; the mobile can be stepped
    Initialized,
    /// Crossed the outer horizon; the distant-observer clock is infinite
    HorizonCrossed,
    /// Hit the surface of a collidable body and stopped
    Collided,
    /// A step was refused (see [`Mobile::rejection`]); no longer stepped
    Rejected,
}

/// A massive particle or a photon on an equatorial trajectory
#[derive(Debug, Clone, PartialEq)]
pub struct Mobile {
    id: usize,
    kind: ParticleKind,
    pub(crate) r: f64,
    pub(crate) phi: f64,
    launch_speed: f64,
    launch_angle: f64,
    /// dr/dτ
    pub(crate) u_r: f64,
    /// r dφ/dτ
    pub(crate) u_phi: f64,
    /// dr/dt
    pub(crate) dr_dt: f64,
    pub(crate) constants: Option<IntegrationConstants>,
    pub(crate) dtau: f64,
    /// Integration parameter elapsed: τ in the astronaut frame, t otherwise
    pub(crate) elapsed: f64,
    pub(crate) clock_a: f64,
    pub(crate) clock_do: f64,
    pub(crate) velocity: LocalVelocity,
    pub(crate) state: MobileState,
    pub(crate) rejection: Option<TrajectoryError>,
}

impl Mobile {
    fn seeded(id: usize, kind: ParticleKind, r: f64, phi: f64, speed: f64, angle: f64) -> Self {
        Self {
            id,
            kind,
            r,
            phi,
            launch_speed: speed,
            launch_angle: angle,
            u_r: 0.0,
            u_phi: 0.0,
            dr_dt: 0.0,
            constants: None,
            dtau: 0.0,
            elapsed: 0.0,
            clock_a: 0.0,
            clock_do: 0.0,
            velocity: LocalVelocity {
                v_r: speed * angle.cos(),
                v_phi: speed * angle.sin(),
                speed,
            },
            state: MobileState::Seeded,
            rejection: None,
        }
    }

    /// Massive particle at (r, φ) launched at `speed` (m/s) with `launch_angle`
    /// (radians) from the outward radial direction, as seen by a static observer
    pub fn massive(id: usize, r: f64, phi: f64, speed: f64, launch_angle: f64) -> Self {
        Self::seeded(id, ParticleKind::Massive, r, phi, speed, launch_angle)
    }

    /// Photon at (r, φ) emitted at `launch_angle` (radians) from the outward
    /// radial direction; its speed is c by construction.
    ///
    /// Until initialization the velocity uses the SI value of c.
    pub fn photon(id: usize, r: f64, phi: f64, launch_angle: f64) -> Self {
        let c = PhysicsConstants::default().c;
        Self::seeded(id, ParticleKind::Photon, r, phi, c, launch_angle)
    }

    /// Same as [`Mobile::massive`] with angles in degrees
    pub fn massive_from_degrees(
        id: usize,
        r: f64,
        phi_deg: f64,
        speed: f64,
        angle_deg: f64,
    ) -> Self {
        Self::massive(id, r, phi_deg.to_radians(), speed, angle_deg.to_radians())
    }

    /// Same as [`Mobile::photon`] with angles in degrees
    pub fn photon_from_degrees(id: usize, r: f64, phi_deg: f64, angle_deg: f64) -> Self {
        Self::photon(id, r, phi_deg.to_radians(), angle_deg.to_radians())
    }

    /// Identifier
    pub fn id(&self) -> usize {
        self.id
    }

    /// Massive particle or photon
    pub fn kind(&self) -> ParticleKind {
        self.kind
    }

    /// True for photons
    pub fn is_photon(&self) -> bool {
        self.kind.is_photon()
    }

    /// Radial coordinate (m)
    pub fn r(&self) -> f64 {
        self.r
    }

    /// Azimuthal coordinate (rad)
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Launch speed (m/s); c for photons
    pub fn launch_speed(&self) -> f64 {
        self.launch_speed
    }

    /// Launch angle from the outward radial direction (rad)
    pub fn launch_angle(&self) -> f64 {
        self.launch_angle
    }

    /// dr/dτ (m/s)
    pub fn u_r(&self) -> f64 {
        self.u_r
    }

    /// r dφ/dτ (m/s)
    pub fn u_phi(&self) -> f64 {
        self.u_phi
    }

    /// dr/dt (m/s)
    pub fn dr_dt(&self) -> f64 {
        self.dr_dt
    }

    /// Constants of motion, once initialized
    pub fn constants(&self) -> Option<&IntegrationConstants> {
        self.constants.as_ref()
    }

    /// Step used by the last tick (s)
    pub fn dtau(&self) -> f64 {
        self.dtau
    }

    /// Sum of the steps taken so far (s)
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Proper time elapsed on board (s)
    pub fn clock_a(&self) -> f64 {
        self.clock_a
    }

    /// Coordinate time elapsed for a distant observer (s); +∞ past the horizon
    pub fn clock_do(&self) -> f64 {
        self.clock_do
    }

    /// Velocity measured by a local static observer
    pub fn velocity(&self) -> &LocalVelocity {
        &self.velocity
    }

    /// Lifecycle state
    pub fn state(&self) -> MobileState {
        self.state
    }

    /// Why the mobile was dropped from its simulation, if it was
    pub fn rejection(&self) -> Option<&TrajectoryError> {
        self.rejection.as_ref()
    }

    /// True once the mobile has constants and has not stopped
    pub fn is_active(&self) -> bool {
        matches!(self.state, MobileState::Initialized | MobileState::HorizonCrossed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_degree_constructors() {
        let m = Mobile::massive_from_degrees(1, 5.0e4, 180.0, 1.0e7, 90.0);
        assert_relative_eq!(m.phi(), std::f64::consts::PI);
        assert_relative_eq!(m.launch_angle(), std::f64::consts::FRAC_PI_2);
        assert_eq!(m.kind(), ParticleKind::Massive);
        assert_eq!(m.state(), MobileState::Seeded);
        assert!(!m.is_active());
        assert!(m.constants().is_none());

        let p = Mobile::photon_from_degrees(2, 5.0e4, 0.0, 45.0);
        assert!(p.is_photon());
        assert_relative_eq!(p.launch_angle(), std::f64::consts::FRAC_PI_4);
        assert!(p.rejection().is_none());
    }

    #[test]
    fn test_seeded_photon_moves_at_c() {
        let c = PhysicsConstants::default().c;
        let p = Mobile::photon(0, 1.0e5, 0.0, std::f64::consts::FRAC_PI_2);
        assert_eq!(p.velocity().speed, c);
        assert_eq!(p.launch_speed(), c);
        assert_abs_diff_eq!(p.velocity().v_r, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.velocity().v_phi, c);
    }

    #[test]
    fn test_seeded_velocity_split() {
        let m = Mobile::massive(0, 1.0e5, 0.0, 2.0e7, 0.5);
        assert_relative_eq!(m.velocity().v_r, 2.0e7 * 0.5_f64.cos());
        assert_relative_eq!(m.velocity().v_phi, 2.0e7 * 0.5_f64.sin());
        assert_eq!(m.clock_a(), 0.0);
        assert_eq!(m.clock_do(), 0.0);
    }
}
