//! Homogeneous FLRW cosmology
//!
//! A [`Universe`] holds today's temperature, Hubble constant and density
//! parameters. Everything else follows from the normalized Friedmann
//! function
//!
//! F(x) = (1+x)² Ω_k + (1+x)³ Ω_m + (1+x)⁴ Ω_r + Y(1/(1+x)) Ω_DE
//!
//! with x the redshift and Y the dark-energy evolution for the
//! equation of state w(a) = w0 + w1 (1 − a). H(z) = H0 √F(z).
//!
//! Durations come from Simpson quadrature of 1/((1+x)√F(x)) after the
//! substitution x = y/(1−y), which maps [0, ∞) onto [0, 1). The scale factor
//! a(τ) is swept with RK4 in units where H0 = 1 and rescaled to seconds.

use crate::constants::PhysicsConstants;
use crate::integrator::{simpson, FirstOrderOde, IntegrationError, Integrator, SecondOrderOde};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

/// Neutrino contribution to the radiation density, relative to photons alone
const NEUTRINO_FACTOR: f64 = 1.68;

/// Errors raised by cosmological computations
#[derive(Debug, Error)]
pub enum CosmologyError {
    /// Redshifts must stay above −1
    #[error("redshift z = {z} is at or below -1")]
    InvalidRedshift {
        /// Offending redshift
        z: f64,
    },

    /// Sweep or march failure
    #[error(transparent)]
    Integration(#[from] IntegrationError),
}

/// Dark-energy block: density parameter and equation of state w0 + w1 (1 − a)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DarkEnergy {
    /// Ω_DE today
    pub omega: f64,
    /// w0
    pub w0: f64,
    /// w1
    pub w1: f64,
}

impl Default for DarkEnergy {
    /// Cosmological constant with Planck 2015 density
    fn default() -> Self {
        Self {
            omega: 0.6911,
            w0: -1.0,
            w1: 0.0,
        }
    }
}

/// Primordial parameters of a universe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniverseParams {
    /// CMB temperature today (K)
    pub temperature: f64,
    /// Hubble constant (km/s/Mpc)
    pub hubble: f64,
    /// Ω_m today
    pub omega_m: f64,
    /// Dark energy
    pub dark_energy: DarkEnergy,
    /// Radiation from the cosmic microwave background
    pub has_cmb: bool,
    /// Radiation from relic neutrinos
    pub has_neutrino: bool,
    /// Force Ω_k = 0 and keep the density parameters summing to 1
    pub is_flat: bool,
}

impl Default for UniverseParams {
    fn default() -> Self {
        Self {
            temperature: 2.7255,
            hubble: 67.74,
            omega_m: 0.3089,
            dark_energy: DarkEnergy::default(),
            has_cmb: true,
            has_neutrino: true,
            is_flat: false,
        }
    }
}

/// Simpson subdivision counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadratureSettings {
    /// Age of the universe
    pub age: usize,
    /// Age at emission
    pub emission_age: usize,
    /// Duration between two redshifts
    pub duration: usize,
    /// Comoving distance
    pub distance: usize,
}

impl Default for QuadratureSettings {
    fn default() -> Self {
        Self {
            age: 10_000,
            emission_age: 1_000,
            duration: 1_000,
            distance: 1_000,
        }
    }
}

/// The four density parameters at one epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DensityParameters {
    /// Matter
    pub omega_m: f64,
    /// Radiation
    pub omega_r: f64,
    /// Dark energy
    pub omega_de: f64,
    /// Curvature
    pub omega_k: f64,
}

impl DensityParameters {
    /// Ω_m + Ω_r + Ω_DE + Ω_k
    pub fn sum(&self) -> f64 {
        self.omega_m + self.omega_r + self.omega_de + self.omega_k
    }
}

/// Scale factor against cosmic time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScaleFactorSeries {
    /// Time since the big bang (s); a = 1 falls on the current age
    pub time: Vec<f64>,
    /// Scale factor a
    pub a: Vec<f64>,
    /// da/dτ in units where H0 = 1, i.e. ȧ / H0
    pub da: Vec<f64>,
}

impl ScaleFactorSeries {
    /// Number of samples
    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// True if the series is empty
    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }
}

/// Look-back time against redshift
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedshiftTimeSeries {
    /// Redshift
    pub z: Vec<f64>,
    /// Light travel time from z to today (s)
    pub time: Vec<f64>,
}

/// Density parameters sampled over redshift
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DensityEvolution {
    /// Redshift
    pub z: Vec<f64>,
    /// Ω_m(z)
    pub omega_m: Vec<f64>,
    /// Ω_r(z)
    pub omega_r: Vec<f64>,
    /// Ω_DE(z)
    pub omega_de: Vec<f64>,
    /// Ω_k(z)
    pub omega_k: Vec<f64>,
}

/// Comoving distance and the two distances derived from it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distances {
    /// Redshift
    pub z: f64,
    /// Comoving (metric) distance (m)
    pub metric: f64,
    /// Luminosity distance (m)
    pub luminosity: f64,
    /// Angular diameter distance (m)
    pub angular_diameter: f64,
}

/// Friedmann terms frozen for one computation
#[derive(Debug, Clone, Copy)]
struct Friedmann {
    omegas: DensityParameters,
    w0: f64,
    w1: f64,
}

impl Friedmann {
    fn y(&self, x: f64) -> f64 {
        (-3.0 * (self.w0 + self.w1 + 1.0) * x.ln() - 3.0 * self.w1 * (1.0 - x)).exp()
    }

    fn dy(&self, x: f64) -> f64 {
        self.y(x) * (3.0 * self.w1 - 3.0 * (1.0 + self.w0 + self.w1) / x)
    }

    fn f(&self, x: f64) -> f64 {
        let p = &self.omegas;
        let s = 1.0 + x;
        s * s * p.omega_k
            + s.powi(3) * p.omega_m
            + s.powi(4) * p.omega_r
            + self.y(1.0 / s) * p.omega_de
    }

    /// 1/((1+x)√F(x)) with x = y/(1−y), times dx/dy = 1/(1−y)²
    fn duration_integrand(&self, y: f64) -> f64 {
        if y >= 1.0 {
            // F grows at least like (1+x)³ with matter, so the limit is 0
            return 0.0;
        }
        1.0 / ((1.0 - y) * self.f(y / (1.0 - y)).sqrt())
    }

    fn distance_integrand(&self, x: f64) -> f64 {
        1.0 / self.f(x).sqrt()
    }
}

/// ä in units where H0 = 1
impl SecondOrderOde for Friedmann {
    fn acceleration(&self, _tau: f64, a: f64, _da: f64) -> f64 {
        let p = &self.omegas;
        -p.omega_r / a.powi(3) - 0.5 * p.omega_m / (a * a)
            + p.omega_de * (a * self.y(a) + a * a * self.dy(a) / 2.0)
    }
}

/// dt/dz = 1/(H0 (1+z) √F(z)), in seconds
struct LookbackRate {
    friedmann: Friedmann,
    hubble_si: f64,
}

impl FirstOrderOde for LookbackRate {
    fn slope(&self, z: f64, _t: f64) -> f64 {
        1.0 / (self.hubble_si * (1.0 + z) * self.friedmann.f(z).sqrt())
    }
}

fn check_redshift(z: f64) -> Result<(), CosmologyError> {
    if z <= -1.0 {
        Err(CosmologyError::InvalidRedshift { z })
    } else {
        Ok(())
    }
}

/// FLRW universe
///
/// Setters keep the density parameters consistent: when the universe is
/// flat, Ω_m (or Ω_DE, when Ω_m itself is being set) is overwritten so the
/// four parameters sum to 1.
///
/// # Example
///
/// ```
/// use cosmograv::Universe;
///
/// let universe = Universe::default();
/// let years = universe.seconds_to_years(universe.age());
/// assert!((years / 1e9 - 13.8).abs() < 0.2);
/// ```
#[derive(Debug, Clone)]
pub struct Universe {
    constants: PhysicsConstants,
    params: UniverseParams,
    quadrature: QuadratureSettings,
    integrator: Integrator,
}

impl Default for Universe {
    fn default() -> Self {
        Self::new(PhysicsConstants::default(), UniverseParams::default())
    }
}

impl Universe {
    /// Universe with the given constants and parameters
    pub fn new(constants: PhysicsConstants, params: UniverseParams) -> Self {
        let mut universe = Self {
            constants,
            params,
            quadrature: QuadratureSettings::default(),
            integrator: Integrator::new(),
        };
        universe.check_sum_omegas(true);
        universe
    }

    /// Builder: Simpson subdivision counts
    pub fn with_quadrature(mut self, quadrature: QuadratureSettings) -> Self {
        self.quadrature = quadrature;
        self
    }

    /// Builder: step cap for the scale-factor sweep
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.integrator.max_steps = max_steps;
        self
    }

    // ---- parameters ----

    /// Current parameters
    pub fn params(&self) -> &UniverseParams {
        &self.params
    }

    /// Physical constants
    pub fn constants(&self) -> &PhysicsConstants {
        &self.constants
    }

    /// Simpson subdivision counts
    pub fn quadrature(&self) -> &QuadratureSettings {
        &self.quadrature
    }

    /// Steps taken by the sweeps and marches so far
    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    /// Temperature today (K)
    pub fn temperature(&self) -> f64 {
        self.params.temperature
    }

    /// Hubble constant (km/s/Mpc)
    pub fn hubble(&self) -> f64 {
        self.params.hubble
    }

    /// Hubble constant (s⁻¹)
    pub fn hubble_si(&self) -> f64 {
        self.constants.hubble_to_si(self.params.hubble)
    }

    /// Ω_m today
    pub fn omega_m(&self) -> f64 {
        self.params.omega_m
    }

    /// Dark energy block
    pub fn dark_energy(&self) -> &DarkEnergy {
        &self.params.dark_energy
    }

    /// Set the temperature
    pub fn set_temperature(&mut self, temperature: f64) {
        self.params.temperature = temperature;
        self.check_sum_omegas(true);
    }

    /// Set H0 (km/s/Mpc)
    pub fn set_hubble(&mut self, hubble: f64) {
        self.params.hubble = hubble;
        self.check_sum_omegas(true);
    }

    /// Set Ω_m; in a flat universe Ω_DE absorbs the change
    pub fn set_omega_m(&mut self, omega_m: f64) {
        self.params.omega_m = omega_m;
        self.check_sum_omegas(false);
    }

    /// Set the dark energy; in a flat universe Ω_m absorbs the change
    pub fn set_dark_energy(&mut self, dark_energy: DarkEnergy) {
        self.params.dark_energy = dark_energy;
        self.check_sum_omegas(true);
    }

    /// Toggle CMB radiation
    pub fn set_has_cmb(&mut self, has_cmb: bool) {
        self.params.has_cmb = has_cmb;
        self.check_sum_omegas(true);
    }

    /// Toggle neutrino radiation
    pub fn set_has_neutrino(&mut self, has_neutrino: bool) {
        self.params.has_neutrino = has_neutrino;
        self.check_sum_omegas(true);
    }

    /// Toggle flatness
    pub fn set_flat(&mut self, is_flat: bool) {
        self.params.is_flat = is_flat;
        self.check_sum_omegas(true);
    }

    /// Replace the physical constants
    pub fn set_constants(&mut self, constants: PhysicsConstants) {
        self.constants = constants;
        self.check_sum_omegas(true);
    }

    /// In a flat universe, overwrite Ω_m (`modify_matter`) or Ω_DE so that
    /// the density parameters sum to 1. Returns true if one was changed.
    pub fn check_sum_omegas(&mut self, modify_matter: bool) -> bool {
        let omegas = self.omegas();
        if !self.params.is_flat || omegas.sum() == 1.0 {
            return false;
        }
        let p = &mut self.params;
        if modify_matter {
            p.omega_m = 1.0 - p.dark_energy.omega - omegas.omega_r;
        } else {
            p.dark_energy.omega = 1.0 - p.omega_m - omegas.omega_r;
        }
        true
    }

    // ---- densities ----

    /// Radiation energy density 4σT⁴/c³, expressed as a mass density (kg/m³)
    pub fn radiation_density(&self) -> f64 {
        let c = self.constants.c;
        4.0 * self.constants.stefan_boltzmann() * self.params.temperature.powi(4) / c.powi(3)
    }

    /// Critical density 3H0²/(8πG) (kg/m³)
    pub fn critical_density(&self) -> f64 {
        3.0 * self.hubble_si().powi(2) / (8.0 * PI * self.constants.g)
    }

    /// Dark-energy density Ω_DE ρ_c (kg/m³)
    pub fn dark_energy_density(&self) -> f64 {
        self.params.dark_energy.omega * self.critical_density()
    }

    /// Matter density Ω_m ρ_c (kg/m³)
    pub fn matter_density(&self) -> f64 {
        self.params.omega_m * self.critical_density()
    }

    /// Ω_r today; zero unless both CMB and neutrinos are enabled
    pub fn omega_r(&self) -> f64 {
        if !(self.params.has_cmb && self.params.has_neutrino) {
            return 0.0;
        }
        let photons = 8.0 * PI * self.constants.g * self.radiation_density()
            / (3.0 * self.hubble_si().powi(2));
        photons * NEUTRINO_FACTOR
    }

    /// Ω_k today; zero for a flat universe
    pub fn omega_k(&self) -> f64 {
        if self.params.is_flat {
            0.0
        } else {
            1.0 - self.omega_r() - self.params.omega_m - self.params.dark_energy.omega
        }
    }

    /// All four density parameters today
    pub fn omegas(&self) -> DensityParameters {
        DensityParameters {
            omega_m: self.params.omega_m,
            omega_r: self.omega_r(),
            omega_de: self.params.dark_energy.omega,
            omega_k: self.omega_k(),
        }
    }

    fn friedmann(&self) -> Friedmann {
        Friedmann {
            omegas: self.omegas(),
            w0: self.params.dark_energy.w0,
            w1: self.params.dark_energy.w1,
        }
    }

    /// Y(x) = exp(−3(w0 + w1 + 1) ln x − 3 w1 (1 − x)); 1 for a cosmological constant
    pub fn y(&self, x: f64) -> f64 {
        self.friedmann().y(x)
    }

    /// dY/dx
    pub fn dy(&self, x: f64) -> f64 {
        self.friedmann().dy(x)
    }

    /// F(x) = (H(x)/H0)²
    pub fn f(&self, x: f64) -> f64 {
        self.friedmann().f(x)
    }

    /// T(z) = T0 (1 + z)
    pub fn temperature_at(&self, z: f64) -> f64 {
        self.params.temperature * (1.0 + z)
    }

    /// H(z) = H0 √F(z) (km/s/Mpc)
    pub fn hubble_at(&self, z: f64) -> f64 {
        self.params.hubble * self.f(z).sqrt()
    }

    /// Density parameters at redshift z; they sum to 1
    pub fn omegas_at(&self, z: f64) -> DensityParameters {
        let fr = self.friedmann();
        let p = &fr.omegas;
        let s = 1.0 + z;
        let f = fr.f(z);
        DensityParameters {
            omega_m: p.omega_m * s.powi(3) / f,
            omega_r: p.omega_r * s.powi(4) / f,
            omega_de: p.omega_de * fr.y(1.0 / s) / f,
            omega_k: p.omega_k * s * s / f,
        }
    }

    /// [`Universe::omegas_at`] over a list of redshifts
    pub fn density_evolution(&self, redshifts: &[f64]) -> DensityEvolution {
        let mut out = DensityEvolution::default();
        for &z in redshifts {
            let o = self.omegas_at(z);
            out.z.push(z);
            out.omega_m.push(o.omega_m);
            out.omega_r.push(o.omega_r);
            out.omega_de.push(o.omega_de);
            out.omega_k.push(o.omega_k);
        }
        out
    }

    // ---- times ----

    /// Age of the universe today (s)
    ///
    /// NaN when F turns negative somewhere in the past (a universe that never
    /// had a big bang); a warning is logged.
    pub fn age(&self) -> f64 {
        let fr = self.friedmann();
        let age = simpson(|y| fr.duration_integrand(y), 0.0, 1.0, self.quadrature.age)
            / self.hubble_si();
        if !age.is_finite() {
            log::warn!("universe age is not finite ({}); F(x) < 0 in the past", age);
        }
        age
    }

    /// Age of the universe when light now observed at redshift z was emitted (s)
    pub fn emission_age(&self, z: f64) -> Result<f64, CosmologyError> {
        check_redshift(z)?;
        let fr = self.friedmann();
        Ok(simpson(
            |y| fr.duration_integrand(y),
            z / (1.0 + z),
            1.0,
            self.quadrature.emission_age,
        ) / self.hubble_si())
    }

    /// Cosmic time elapsed between redshifts z2 and z1 (s), positive for z2 > z1
    pub fn duration(&self, z1: f64, z2: f64) -> Result<f64, CosmologyError> {
        check_redshift(z1)?;
        check_redshift(z2)?;
        let fr = self.friedmann();
        Ok(simpson(
            |y| fr.duration_integrand(y),
            z1 / (1.0 + z1),
            z2 / (1.0 + z2),
            self.quadrature.duration,
        ) / self.hubble_si())
    }

    /// Look-back time over [z_min, z_max] in `n` RK4 steps, starting from
    /// duration(0, z_min)
    pub fn time_vs_redshift(
        &mut self,
        n: usize,
        z_min: f64,
        z_max: f64,
    ) -> Result<RedshiftTimeSeries, CosmologyError> {
        let t0 = self.duration(0.0, z_min)?;
        check_redshift(z_max)?;
        let rate = LookbackRate {
            friedmann: self.friedmann(),
            hubble_si: self.hubble_si(),
        };
        let step = (z_max - z_min) / n as f64;

        let series = self.integrator.march_order1(&rate, z_min, t0, step, n)?;
        Ok(RedshiftTimeSeries {
            z: series.x,
            time: series.y,
        })
    }

    /// Scale factor swept from a = 1 today in both directions with step
    /// `step` (in units of 1/H0) while a_min ≤ a < a_max.
    ///
    /// Times are offset by the current age; if the age is not finite it is
    /// taken as 0 and times are relative to today.
    pub fn scale_factor(
        &mut self,
        step: f64,
        a_min: f64,
        a_max: f64,
    ) -> Result<ScaleFactorSeries, CosmologyError> {
        let age = self.age();
        let age = if age.is_finite() { age } else { 0.0 };
        let hubble_si = self.hubble_si();
        let friedmann = self.friedmann();

        let series = self
            .integrator
            .sweep_order2(&friedmann, 0.0, 1.0, 1.0, step, |_tau, a, _da| {
                a_min <= a && a < a_max
            })?;

        Ok(ScaleFactorSeries {
            time: series.x.iter().map(|tau| tau / hubble_si + age).collect(),
            a: series.y,
            da: series.dy,
        })
    }

    // ---- distances ----

    /// Comoving distance to redshift z (m), corrected for curvature
    pub fn metric_distance(&self, z: f64) -> f64 {
        let fr = self.friedmann();
        let mut d = simpson(|x| fr.distance_integrand(x), 0.0, z, self.quadrature.distance);

        let omega_k = fr.omegas.omega_k;
        let root = omega_k.abs().sqrt();
        if omega_k < 0.0 {
            d = (root * d).sinh() / root;
        } else if omega_k > 0.0 {
            d = (root * d).sin() / root;
        }
        d * self.constants.c / self.hubble_si()
    }

    /// Luminosity distance d (1 + z) (m)
    pub fn luminosity_distance(&self, z: f64) -> f64 {
        self.metric_distance(z) * (1.0 + z)
    }

    /// Angular diameter distance d / (1 + z) (m)
    pub fn angular_diameter_distance(&self, z: f64) -> f64 {
        self.metric_distance(z) / (1.0 + z)
    }

    /// Metric, luminosity and angular diameter distances from one quadrature
    pub fn distances(&self, z: f64) -> Distances {
        let metric = self.metric_distance(z);
        Distances {
            z,
            metric,
            luminosity: metric * (1.0 + z),
            angular_diameter: metric / (1.0 + z),
        }
    }

    /// Distance light travels during duration(0, z): c t (m)
    pub fn light_distance(&self, z: f64) -> Result<f64, CosmologyError> {
        Ok(self.duration(0.0, z)? * self.constants.c)
    }

    /// Luminosity 4πI of a source of uniform intensity I
    pub fn luminosity(&self, intensity: f64) -> f64 {
        4.0 * PI * intensity
    }

    /// Received flux L / (4π (d (1+z))²) from a source of luminosity L at z
    pub fn brightness(&self, z: f64, luminosity: f64) -> f64 {
        let d = self.luminosity_distance(z);
        luminosity / (4.0 * PI * d * d)
    }

    /// Apparent angular diameter D_e (1+z) / d (rad) of an object of size D_e
    pub fn apparent_diameter(&self, diameter: f64, z: f64) -> f64 {
        diameter * (1.0 + z) / self.metric_distance(z)
    }

    /// Seconds to years of the configured kind
    pub fn seconds_to_years(&self, seconds: f64) -> f64 {
        self.constants.seconds_to_years(seconds)
    }
}
