//! Physical constants and unit conversions.
//!
//! Every simulation object owns its own [`PhysicsConstants`], so tests can run
//! with non-physical values (for example `c = 1`, `G = 1`) without touching
//! any shared state.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Astronomical unit in metres (IAU 2012)
pub const AU: f64 = 1.495_978_707e11;

/// One parsec in metres
pub const PARSEC: f64 = AU * 180.0 * 3600.0 / PI;

/// One megaparsec in metres
pub const MEGAPARSEC: f64 = PARSEC * 1.0e6;

/// Light year in metres (Julian year)
pub const LIGHT_YEAR: f64 = 9.460_730_472_580_8e15;

/// Solar mass in kilograms
pub const SOLAR_MASS: f64 = 1.988_47e30;

/// Seconds in one day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Length of a year used when converting seconds to years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum YearKind {
    /// Sidereal year, 365.256363051 days
    Sidereal,
    /// Julian year, 365.25 days
    Julian,
    /// Tropical year at J2000, 365.242190517 days
    Tropical2000,
    /// Gregorian calendar year, 365.2425 days
    #[default]
    Gregorian,
}

impl YearKind {
    /// Number of days in the year
    pub fn days(self) -> f64 {
        match self {
            YearKind::Sidereal => 365.256_363_051,
            YearKind::Julian => 365.25,
            YearKind::Tropical2000 => 365.242_190_517,
            YearKind::Gregorian => 365.2425,
        }
    }

    /// Number of seconds in the year
    pub fn seconds(self) -> f64 {
        self.days() * SECONDS_PER_DAY
    }
}

/// Fundamental constants in SI units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConstants {
    /// Speed of light (m/s)
    pub c: f64,
    /// Gravitational constant (m³ kg⁻¹ s⁻²)
    pub g: f64,
    /// Boltzmann constant (J/K)
    pub k_b: f64,
    /// Planck constant (J s)
    pub h: f64,
    /// Year used by [`PhysicsConstants::seconds_to_years`]
    pub year: YearKind,
}

impl Default for PhysicsConstants {
    fn default() -> Self {
        Self {
            c: 2.997_924_58e8,
            g: 6.674_30e-11,
            k_b: 1.380_648_52e-23,
            h: 6.626_070_04e-34,
            year: YearKind::default(),
        }
    }
}

impl PhysicsConstants {
    /// Geometrized units: c = G = 1, with the SI values of k and h
    pub fn geometrized() -> Self {
        Self {
            c: 1.0,
            g: 1.0,
            ..Self::default()
        }
    }

    /// Schwarzschild radius 2GM/c² of a mass in kilograms
    pub fn schwarzschild_radius(&self, mass: f64) -> f64 {
        2.0 * self.g * mass / (self.c * self.c)
    }

    /// Stefan-Boltzmann constant σ = 2π⁵k⁴ / (15 h³ c²)
    pub fn stefan_boltzmann(&self) -> f64 {
        2.0 * PI.powi(5) * self.k_b.powi(4) / (15.0 * self.h.powi(3) * self.c * self.c)
    }

    /// Convert a duration in seconds to years of the configured kind
    pub fn seconds_to_years(&self, seconds: f64) -> f64 {
        seconds / self.year.seconds()
    }

    /// Convert a Hubble constant in km/s/Mpc to s⁻¹
    pub fn hubble_to_si(&self, h0_km_s_mpc: f64) -> f64 {
        h0_km_s_mpc * 1.0e3 / MEGAPARSEC
    }
}
