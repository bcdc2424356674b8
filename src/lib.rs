//! # cosmograv: geodesics around compact bodies and FLRW cosmology
//!
//! A small fixed-step numerical engine for two families of problems in
//! general relativity:
//!
//! - **Trajectories** of massive particles and photons in the equatorial
//!   plane of a Schwarzschild (external and uniform-density interior) or Kerr
//!   spacetime, integrated either in the proper time of the travelling
//!   astronaut or in the coordinate time of a distant observer.
//! - **Cosmology** of a homogeneous universe with matter, radiation,
//!   curvature and dark energy: scale factor, age, durations and distances.
//!
//! ## Features
//!
//! - Classic RK4 for first- and second-order scalar ODEs, composite Simpson
//!   quadrature, and bidirectional sweeps bounded by a step cap
//! - One strategy object per spacetime region behind the
//!   [`TrajectoryModel`] trait; constants of motion are frozen at launch
//! - Adaptive per-mobile step from the free-fall time and the 4-velocity
//! - Horizon crossings, surface collisions and refused steps tracked per
//!   mobile; one failing mobile never stops the others
//! - Every object owns its [`PhysicsConstants`]; no global state
//! - Optional `parallel` feature ticks mobiles on the rayon thread pool
//!
//! ## Trajectories
//!
//! ```rust
//! use cosmograv::{CentralBody, MetricKind, Mobile, ReferenceFrame, TrajectorySimulation};
//! use cosmograv::constants::{PhysicsConstants, SOLAR_MASS};
//!
//! let body = CentralBody::new(SOLAR_MASS, 0.0);
//! let rs = body.r_s();
//! let mut sim = TrajectorySimulation::new(
//!     PhysicsConstants::default(),
//!     body,
//!     MetricKind::Schwarzschild,
//!     ReferenceFrame::Astronaut,
//! );
//!
//! // 0.2 c tangential launch at 10 R_s: a bound, precessing orbit
//! sim.add_mobile(Mobile::massive_from_degrees(0, 10.0 * rs, 0.0, 0.2 * 2.997_924_58e8, 90.0));
//! sim.initialize_mobiles();
//! let series = sim.run(5_000).unwrap();
//!
//! let r_min = series[0].samples.iter().map(|s| s.r).fold(f64::INFINITY, f64::min);
//! assert!(r_min > 4.0 * rs && r_min < 5.0 * rs);
//! ```
//!
//! ## Cosmology
//!
//! ```rust
//! use cosmograv::Universe;
//!
//! let mut universe = Universe::default();
//! let age = universe.seconds_to_years(universe.age());
//! assert!(age > 13.6e9 && age < 14.0e9);
//!
//! let a = universe.scale_factor(1e-3, 0.1, 2.0).unwrap();
//! assert!(a.a[0] < 0.1);
//! ```
//!
//! ## Conventions
//!
//! Lengths are in metres and times in seconds. `U_r` is dr/dτ and `U_phi`
//! is r dφ/dτ. The angular momentum L is a length and the energy E is
//! dimensionless, so that (dr/dτ)² = c² (E² − V(r)).
//!
//! ## References
//!
//! 1. Misner, C.W., Thorne, K.S., & Wheeler, J.A. (1973). "Gravitation".
//!    W.H. Freeman.
//!
//! 2. Chandrasekhar, S. (1983). "The Mathematical Theory of Black Holes".
//!    Oxford University Press.
//!
//! 3. Linder, E.V. (2003). "Exploring the Expansion History of the
//!    Universe". Physical Review Letters 90, 091301.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod body;
pub mod constants;
pub mod cosmology;
pub mod integrator;
pub mod metric;
pub mod mobile;
pub mod trajectory;

pub use body::{BodyGeometry, BodyParams, CentralBody};
pub use constants::{PhysicsConstants, YearKind};
pub use cosmology::{
    CosmologyError, DarkEnergy, DensityEvolution, DensityParameters, Distances,
    QuadratureSettings, RedshiftTimeSeries, ScaleFactorSeries, Universe, UniverseParams,
};
pub use integrator::{rk4_order1, rk4_order2, simpson, IntegrationError, Integrator, Series, Stats};
pub use metric::{
    IntegrationConstants, LocalVelocity, ParticleKind, ReferenceFrame, TrajectoryModel,
};
pub use mobile::{Mobile, MobileState};
pub use trajectory::{
    MetricKind, Spacetime, StepPolicy, TrajectoryError, TrajectorySample, TrajectorySeries,
    TrajectorySimulation,
};
