//! Central gravitating body
//!
//! The primordial fields (mass, requested radius, angular momentum) are
//! private and only change through setters; each setter re-derives the whole
//! [`BodyGeometry`] from scratch so no derived value can go stale.

use crate::constants::PhysicsConstants;
use serde::{Deserialize, Serialize};

/// Quantities derived from mass, radius and angular momentum
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BodyGeometry {
    /// Effective radius: the requested radius, or 0 if it lies within R_s
    pub radius: f64,
    /// Schwarzschild radius 2GM/c²
    pub r_s: f64,
    /// Kerr spin parameter a = J/(cM), in metres
    pub a: f64,
    /// Outer horizon (R_s + √(R_s² − 4a²))/2
    pub r_h_plus: f64,
    /// Inner horizon (R_s − √(R_s² − 4a²))/2
    pub r_h_minus: f64,
}

impl BodyGeometry {
    /// Pure derivation from the primordial parameters.
    ///
    /// A spin with 4a² > R_s² (naked singularity) yields NaN horizons.
    pub fn derive(
        constants: &PhysicsConstants,
        mass: f64,
        radius: f64,
        angular_momentum: f64,
    ) -> Self {
        let r_s = constants.schwarzschild_radius(mass);
        let a = if angular_momentum == 0.0 {
            0.0
        } else {
            angular_momentum / (constants.c * mass)
        };
        let root = (r_s * r_s - 4.0 * a * a).sqrt();

        Self {
            radius: if radius <= r_s { 0.0 } else { radius },
            r_s,
            a,
            r_h_plus: 0.5 * (r_s + root),
            r_h_minus: 0.5 * (r_s - root),
        }
    }

    /// Δ(r) = (r − R_h+)(r − R_h−) = r² − R_s r + a²
    pub fn delta(&self, r: f64) -> f64 {
        r * r - self.r_s * r + self.a * self.a
    }
}

/// Serializable description of a central body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyParams {
    /// Mass (kg)
    pub mass: f64,
    /// Physical radius (m); 0 for a point mass
    pub radius: f64,
    /// Whether mobiles stop when they hit the surface
    pub collidable: bool,
    /// Angular momentum J (kg m²/s)
    pub angular_momentum: f64,
}

/// Central mass of a trajectory simulation
#[derive(Debug, Clone, PartialEq)]
pub struct CentralBody {
    constants: PhysicsConstants,
    mass: f64,
    requested_radius: f64,
    collidable: bool,
    angular_momentum: f64,
    geometry: BodyGeometry,
}

impl CentralBody {
    /// Non-rotating, non-collidable body with SI constants
    pub fn new(mass: f64, radius: f64) -> Self {
        Self::from_params(
            PhysicsConstants::default(),
            BodyParams {
                mass,
                radius,
                collidable: false,
                angular_momentum: 0.0,
            },
        )
    }

    /// Build a body from serialized parameters
    pub fn from_params(constants: PhysicsConstants, params: BodyParams) -> Self {
        Self {
            constants,
            mass: params.mass,
            requested_radius: params.radius,
            collidable: params.collidable,
            angular_momentum: params.angular_momentum,
            geometry: BodyGeometry::derive(
                &constants,
                params.mass,
                params.radius,
                params.angular_momentum,
            ),
        }
    }

    /// Builder: set the angular momentum J
    pub fn with_angular_momentum(mut self, angular_momentum: f64) -> Self {
        self.set_angular_momentum(angular_momentum);
        self
    }

    /// Builder: set the collidable flag
    pub fn with_collidable(mut self, collidable: bool) -> Self {
        self.collidable = collidable;
        self
    }

    fn recompute(&mut self) {
        self.geometry = BodyGeometry::derive(
            &self.constants,
            self.mass,
            self.requested_radius,
            self.angular_momentum,
        );
    }

    /// Current parameters (radius as requested, before clamping)
    pub fn params(&self) -> BodyParams {
        BodyParams {
            mass: self.mass,
            radius: self.requested_radius,
            collidable: self.collidable,
            angular_momentum: self.angular_momentum,
        }
    }

    /// Constants the geometry was derived with
    pub fn constants(&self) -> &PhysicsConstants {
        &self.constants
    }

    /// Mass (kg)
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Effective radius (m), 0 when the body lies within its Schwarzschild radius
    pub fn radius(&self) -> f64 {
        self.geometry.radius
    }

    /// Angular momentum J
    pub fn angular_momentum(&self) -> f64 {
        self.angular_momentum
    }

    /// Collidable flag
    pub fn collidable(&self) -> bool {
        self.collidable
    }

    /// All derived quantities
    pub fn geometry(&self) -> &BodyGeometry {
        &self.geometry
    }

    /// Schwarzschild radius R_s
    pub fn r_s(&self) -> f64 {
        self.geometry.r_s
    }

    /// Spin parameter a
    pub fn a(&self) -> f64 {
        self.geometry.a
    }

    /// Outer horizon R_h+
    pub fn r_h_plus(&self) -> f64 {
        self.geometry.r_h_plus
    }

    /// Inner horizon R_h−
    pub fn r_h_minus(&self) -> f64 {
        self.geometry.r_h_minus
    }

    /// True unless the spin exceeds the extremal value (4a² > R_s²)
    pub fn has_horizon(&self) -> bool {
        self.geometry.r_s * self.geometry.r_s >= 4.0 * self.geometry.a * self.geometry.a
    }

    /// Set the mass; the radius clamp is re-evaluated against the new R_s
    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
        self.recompute();
    }

    /// Set the physical radius
    pub fn set_radius(&mut self, radius: f64) {
        self.requested_radius = radius;
        self.recompute();
    }

    /// Set the angular momentum J
    pub fn set_angular_momentum(&mut self, angular_momentum: f64) {
        self.angular_momentum = angular_momentum;
        self.recompute();
    }

    /// Set the collidable flag
    pub fn set_collidable(&mut self, collidable: bool) {
        self.collidable = collidable;
    }

    /// Replace the physical constants and re-derive the geometry
    pub fn set_constants(&mut self, constants: PhysicsConstants) {
        self.constants = constants;
        self.recompute();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SOLAR_MASS;
    use approx::assert_relative_eq;

    #[test]
    fn test_non_rotating_horizons() {
        let body = CentralBody::new(SOLAR_MASS, 7.0e8);
        assert_eq!(body.a(), 0.0);
        assert_eq!(body.r_h_plus(), body.r_s());
        assert_eq!(body.r_h_minus(), 0.0);
        assert!(body.has_horizon());
        assert_eq!(body.radius(), 7.0e8);
    }

    #[test]
    fn test_radius_clamped_inside_schwarzschild_radius() {
        let body = CentralBody::new(SOLAR_MASS, 1000.0);
        assert_eq!(body.radius(), 0.0);
        assert_eq!(body.params().radius, 1000.0);
    }

    #[test]
    fn test_derived_fields_follow_mass() {
        let mut body = CentralBody::new(SOLAR_MASS, 4000.0);
        assert_eq!(body.radius(), 4000.0);

        // Doubling the mass puts R_s (~5.9 km) above the requested radius
        body.set_mass(2.0 * SOLAR_MASS);
        assert_relative_eq!(body.r_s(), 2.0 * CentralBody::new(SOLAR_MASS, 0.0).r_s());
        assert_eq!(body.radius(), 0.0);

        // Back to one solar mass restores the surface
        body.set_mass(SOLAR_MASS);
        assert_eq!(body.radius(), 4000.0);
    }

    #[test]
    fn test_kerr_spin_and_horizons() {
        let k = PhysicsConstants::default();
        let rs = k.schwarzschild_radius(SOLAR_MASS);
        // a = 0.4 R_s
        let j = 0.4 * rs * k.c * SOLAR_MASS;
        let body = CentralBody::new(SOLAR_MASS, 0.0).with_angular_momentum(j);

        assert_relative_eq!(body.a(), 0.4 * rs, max_relative = 1e-12);
        assert_relative_eq!(body.r_h_plus(), 0.8 * rs, max_relative = 1e-12);
        assert_relative_eq!(body.r_h_minus(), 0.2 * rs, max_relative = 1e-12);
        assert_relative_eq!(body.r_h_plus() + body.r_h_minus(), rs, max_relative = 1e-12);
        assert_relative_eq!(
            body.geometry().delta(3.0 * rs),
            (3.0 * rs - body.r_h_plus()) * (3.0 * rs - body.r_h_minus()),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_naked_singularity_has_nan_horizons() {
        let k = PhysicsConstants::default();
        let rs = k.schwarzschild_radius(SOLAR_MASS);
        let j = 0.6 * rs * k.c * SOLAR_MASS;
        let body = CentralBody::new(SOLAR_MASS, 0.0).with_angular_momentum(j);
        assert!(!body.has_horizon());
        assert!(body.r_h_plus().is_nan());
        assert!(body.r_h_minus().is_nan());
    }

    #[test]
    fn test_geometrized_constants() {
        let mut body = CentralBody::new(1.0, 10.0);
        body.set_constants(PhysicsConstants::geometrized());
        assert_eq!(body.r_s(), 2.0);
        assert_eq!(body.radius(), 10.0);
    }
}
