//! Trajectory simulation around a central body
//!
//! A [`TrajectorySimulation`] owns the body, the mobiles and the choice of
//! metric and frame. Each tick advances every active mobile by one RK4 step
//! of the radial equation, with a step size picked from the mobile's current
//! state by a [`StepPolicy`]. The angle and both clocks follow from the
//! frozen constants of motion.
//!
//! Mobiles are independent: a step refused for one of them (a
//! distant-observer step inside the horizon) drops that mobile from the run
//! with [`MobileState::Rejected`] and the others carry on.
//!
//! With the `parallel` feature, mobiles are ticked concurrently with rayon;
//! they share nothing but the read-only body and metric.

use crate::body::CentralBody;
use crate::constants::PhysicsConstants;
use crate::integrator::{rk4_order2, IntegrationError, Integrator, Stats};
use crate::metric::{
    ExternalSchwarzschild, IntegrationConstants, InternalSchwarzschild, Kerr, LocalVelocity,
    ParticleKind, RadialEquation, ReferenceFrame, TrajectoryModel,
};
use crate::mobile::{Mobile, MobileState};
use serde::{Deserialize, Serialize, Serializer};
use std::f64::consts::FRAC_PI_2;
use thiserror::Error;

/// Errors raised while stepping mobiles
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrajectoryError {
    /// Distant-observer time stops at the horizon
    #[error("mobile {id} is at r = {r:e} m, inside the horizon at {horizon:e} m")]
    InsideHorizon {
        /// Mobile identifier
        id: usize,
        /// Radial coordinate (m)
        r: f64,
        /// Outer horizon (m)
        horizon: f64,
    },

    /// `tick` was called before `initialize_mobiles`
    #[error("mobile {id} has no constants of motion; call initialize_mobiles first")]
    NotInitialized {
        /// Mobile identifier
        id: usize,
    },

    /// No mobile at this index
    #[error("no mobile at index {index}")]
    UnknownMobile {
        /// Requested index
        index: usize,
    },

    /// Tick budget or step failure
    #[error(transparent)]
    Integration(#[from] IntegrationError),
}

/// Spacetime family used for the whole simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MetricKind {
    /// External metric outside the body, internal metric inside it
    #[default]
    Schwarzschild,
    /// Rotating body, equatorial plane
    Kerr,
}

/// Adaptive step constants
///
/// The ceiling is the free-fall time from r, (π/2) r √(r / 2GM), divided
/// by `free_fall_divisor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepPolicy {
    /// Divisor applied to the free-fall time
    pub free_fall_divisor: f64,
    /// Massive particles: fraction of r / |U| per step
    pub massive_scale: f64,
    /// Massive particles: guard added to |U| for launches at rest
    pub massive_epsilon: f64,
    /// Photons in the astronaut frame: fraction of r / (|U_r| + |U_phi| + offset)
    pub photon_astronaut_scale: f64,
    /// Photons in the distant-observer frame: fraction of r / (|U| + offset)
    pub photon_observer_scale: f64,
    /// Offset added to photon velocities (m/s)
    pub photon_offset: f64,
}

impl Default for StepPolicy {
    fn default() -> Self {
        Self {
            free_fall_divisor: 500.0,
            massive_scale: 1e-2,
            massive_epsilon: 1e-20,
            photon_astronaut_scale: 1e-3,
            photon_observer_scale: 1e-3,
            photon_offset: 1.0,
        }
    }
}

impl StepPolicy {
    /// Free-fall time (π/2) r √(r / 2GM) for a gravitational parameter `gm`
    pub fn free_fall_time(gm: f64, r: f64) -> f64 {
        FRAC_PI_2 * r * (r / (2.0 * gm)).sqrt()
    }

    /// Step for a mobile at r with 4-velocity (U_r, U_phi)
    pub fn step(
        &self,
        gm: f64,
        kind: ParticleKind,
        frame: ReferenceFrame,
        r: f64,
        u_r: f64,
        u_phi: f64,
    ) -> f64 {
        let r = r.abs();
        let ceiling = Self::free_fall_time(gm, r) / self.free_fall_divisor;
        let norm = u_r.hypot(u_phi);

        match (kind, frame) {
            (ParticleKind::Massive, _) => {
                ceiling.min(self.massive_scale * r / (norm + self.massive_epsilon))
            }
            (ParticleKind::Photon, ReferenceFrame::Astronaut) => {
                self.photon_astronaut_scale * r / (u_r.abs() + u_phi.abs() + self.photon_offset)
            }
            (ParticleKind::Photon, ReferenceFrame::DistantObserver) => {
                ceiling.min(self.photon_observer_scale * r / (norm + self.photon_offset))
            }
        }
    }
}

/// Piecewise spacetime of a simulation: one model per region
///
/// Implements [`TrajectoryModel`] by delegating to the model that owns r, so
/// a step that crosses the surface of the body switches metric mid-stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacetime {
    metric: MetricKind,
    radius: f64,
    external: ExternalSchwarzschild,
    internal: InternalSchwarzschild,
    kerr: Kerr,
}

impl Spacetime {
    /// Models for `body` under `metric`
    pub fn new(body: &CentralBody, metric: MetricKind) -> Self {
        Self {
            metric,
            radius: body.radius(),
            external: ExternalSchwarzschild::new(body),
            internal: InternalSchwarzschild::new(body),
            kerr: Kerr::new(body),
        }
    }

    /// Metric family
    pub fn metric(&self) -> MetricKind {
        self.metric
    }

    /// Model that governs radius r
    pub fn region(&self, r: f64) -> &dyn TrajectoryModel {
        match self.metric {
            MetricKind::Kerr => &self.kerr,
            MetricKind::Schwarzschild if r < self.radius => &self.internal,
            MetricKind::Schwarzschild => &self.external,
        }
    }
}

impl TrajectoryModel for Spacetime {
    fn name(&self) -> &'static str {
        match self.metric {
            MetricKind::Schwarzschild => "schwarzschild",
            MetricKind::Kerr => "kerr",
        }
    }

    fn c(&self) -> f64 {
        self.external.c()
    }

    fn horizon(&self) -> f64 {
        match self.metric {
            MetricKind::Kerr => self.kerr.horizon(),
            // a surface outside R_s hides the horizon
            MetricKind::Schwarzschild if self.radius > 0.0 => 0.0,
            MetricKind::Schwarzschild => self.external.horizon(),
        }
    }

    fn static_metric(&self, r: f64) -> (f64, f64) {
        self.region(r).static_metric(r)
    }

    fn seed_velocity(&self, kind: ParticleKind, r: f64, speed: f64, angle: f64) -> (f64, f64) {
        self.region(r).seed_velocity(kind, r, speed, angle)
    }

    fn integration_constants(
        &self,
        kind: ParticleKind,
        r: f64,
        u_r: f64,
        u_phi: f64,
    ) -> IntegrationConstants {
        self.region(r).integration_constants(kind, r, u_r, u_phi)
    }

    fn potential_a(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        self.region(r).potential_a(kind, r, k)
    }

    fn potential_do(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        self.region(r).potential_do(kind, r, k)
    }

    fn acceleration_a(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        self.region(r).acceleration_a(kind, r, k)
    }

    fn acceleration_do(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        self.region(r).acceleration_do(kind, r, k)
    }

    fn dt_dtau(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        self.region(r).dt_dtau(kind, r, k)
    }

    fn dphi_dtau(&self, kind: ParticleKind, r: f64, k: &IntegrationConstants) -> f64 {
        self.region(r).dphi_dtau(kind, r, k)
    }
}

/// State of one mobile after a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectorySample {
    /// Tick index, 0 for the initial state
    pub tick: u64,
    /// Integration parameter elapsed (τ or t, s)
    pub time: f64,
    /// Radial coordinate (m)
    pub r: f64,
    /// Azimuth (rad)
    pub phi: f64,
    /// dr/dτ (m/s)
    pub u_r: f64,
    /// dr/dt (m/s)
    pub dr_dt: f64,
    /// Proper time on board (s)
    pub clock_a: f64,
    /// Distant-observer time (s)
    pub clock_do: f64,
    /// Velocity measured by a local static observer
    pub velocity: LocalVelocity,
    /// Lifecycle state
    pub state: MobileState,
}

impl TrajectorySample {
    fn of(mobile: &Mobile, tick: u64) -> Self {
        Self {
            tick,
            time: mobile.elapsed,
            r: mobile.r,
            phi: mobile.phi,
            u_r: mobile.u_r,
            dr_dt: mobile.dr_dt,
            clock_a: mobile.clock_a,
            clock_do: mobile.clock_do,
            velocity: mobile.velocity,
            state: mobile.state,
        }
    }
}

/// Samples recorded for one mobile by [`TrajectorySimulation::run`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectorySeries {
    /// Mobile identifier
    pub id: usize,
    /// Initial state, then one sample per tick while the mobile was active
    pub samples: Vec<TrajectorySample>,
    /// Refused step that ended this mobile's run, if any
    #[serde(serialize_with = "error_message")]
    pub error: Option<TrajectoryError>,
}

fn error_message<S: Serializer>(
    error: &Option<TrajectoryError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.collect_str(err),
        None => serializer.serialize_none(),
    }
}

/// Everything a tick reads; shared immutably between mobiles
#[derive(Debug, Clone)]
struct Stepper {
    body: CentralBody,
    spacetime: Spacetime,
    frame: ReferenceFrame,
    policy: StepPolicy,
}

impl Stepper {
    fn new(
        body: CentralBody,
        metric: MetricKind,
        frame: ReferenceFrame,
        policy: StepPolicy,
    ) -> Self {
        Self {
            spacetime: Spacetime::new(&body, metric),
            body,
            frame,
            policy,
        }
    }

    fn gm(&self) -> f64 {
        self.body.constants().g * self.body.mass()
    }

    fn constants(&self, mobile: &Mobile) -> Result<IntegrationConstants, TrajectoryError> {
        mobile
            .constants
            .ok_or(TrajectoryError::NotInitialized { id: mobile.id() })
    }

    fn initialize(&self, mobile: &mut Mobile) {
        let st = &self.spacetime;
        let kind = mobile.kind();
        let r = mobile.r;

        let (u_r, u_phi) =
            st.seed_velocity(kind, r, mobile.launch_speed(), mobile.launch_angle());
        let k = st.integration_constants(kind, r, u_r, u_phi);

        mobile.u_r = u_r;
        mobile.u_phi = u_phi;
        mobile.dr_dt = u_r / st.dt_dtau(kind, r, &k);
        mobile.constants = Some(k);
        mobile.velocity = st.local_velocity(kind, r, u_r, &k);
        mobile.state = MobileState::Initialized;
        self.update_dtau(mobile);

        log::debug!(
            "mobile {} ({:?}) initialized in {} region at r = {:e} m: L = {:e} m, E = {}",
            mobile.id(),
            kind,
            st.region(r).name(),
            r,
            k.l,
            k.e
        );
    }

    fn update_dtau(&self, mobile: &mut Mobile) {
        mobile.dtau = self.policy.step(
            self.gm(),
            mobile.kind(),
            self.frame,
            mobile.r,
            mobile.u_r,
            mobile.u_phi,
        );
    }

    fn update_velocity(&self, mobile: &mut Mobile) -> Result<(), TrajectoryError> {
        let k = self.constants(mobile)?;
        mobile.velocity = self
            .spacetime
            .local_velocity(mobile.kind(), mobile.r, mobile.u_r, &k);
        Ok(())
    }

    /// One RK4 step of the radial equation, then angle and clocks
    fn advance(&self, mobile: &mut Mobile) -> Result<(), TrajectoryError> {
        let k = self.constants(mobile)?;
        let st = &self.spacetime;
        let kind = mobile.kind();
        let horizon = st.horizon();
        let h = mobile.dtau;
        let equation = RadialEquation {
            model: st,
            kind,
            frame: self.frame,
            constants: k,
        };

        match self.frame {
            ReferenceFrame::Astronaut => {
                let (tau, r, u_r) = rk4_order2(&equation, mobile.elapsed, mobile.r, mobile.u_r, h);
                let dt_dtau = st.dt_dtau(kind, r, &k);
                let dphi_dtau = st.dphi_dtau(kind, r, &k);

                mobile.elapsed = tau;
                mobile.r = r;
                mobile.u_r = u_r;
                mobile.dr_dt = u_r / dt_dtau;
                mobile.phi += dphi_dtau * h;
                mobile.u_phi = r * dphi_dtau;

                if kind == ParticleKind::Massive {
                    mobile.clock_a += h;
                }
                if r > horizon {
                    mobile.clock_do += h * dt_dtau;
                } else {
                    self.cross_horizon(mobile, horizon);
                }
            }
            ReferenceFrame::DistantObserver => {
                if mobile.r < horizon {
                    return Err(TrajectoryError::InsideHorizon {
                        id: mobile.id(),
                        r: mobile.r,
                        horizon,
                    });
                }
                let (t, r, dr_dt) =
                    rk4_order2(&equation, mobile.elapsed, mobile.r, mobile.dr_dt, h);
                let dt_dtau = st.dt_dtau(kind, r, &k);
                let dphi_dtau = st.dphi_dtau(kind, r, &k);

                mobile.elapsed = t;
                mobile.r = r;
                mobile.dr_dt = dr_dt;
                mobile.u_r = dr_dt * dt_dtau;
                mobile.phi += dphi_dtau / dt_dtau * h;
                mobile.u_phi = r * dphi_dtau;

                mobile.clock_do += h;
                if r >= horizon {
                    if kind == ParticleKind::Massive {
                        mobile.clock_a += h / dt_dtau;
                    }
                } else {
                    self.cross_horizon(mobile, horizon);
                }
            }
        }
        Ok(())
    }

    fn cross_horizon(&self, mobile: &mut Mobile, horizon: f64) {
        if mobile.state != MobileState::HorizonCrossed {
            log::warn!(
                "mobile {} crossed the horizon at r = {:e} m (R_h = {:e} m)",
                mobile.id(),
                mobile.r,
                horizon
            );
            mobile.state = MobileState::HorizonCrossed;
        }
        if self.frame == ReferenceFrame::Astronaut {
            mobile.clock_do = f64::INFINITY;
        }
    }

    fn check_collision(&self, mobile: &mut Mobile) {
        let radius = self.body.radius();
        if self.body.collidable() && radius > 0.0 && mobile.r <= radius {
            log::debug!(
                "mobile {} hit the surface at tick time {:e} s",
                mobile.id(),
                mobile.elapsed
            );
            mobile.r = radius;
            mobile.u_r = 0.0;
            mobile.dr_dt = 0.0;
            mobile.state = MobileState::Collided;
        }
    }

    /// RK4 step, velocity and collision check with the current step size.
    ///
    /// A refused step leaves the mobile where it was and marks it rejected.
    fn step(&self, mobile: &mut Mobile) -> Result<(), TrajectoryError> {
        let outcome = self
            .advance(mobile)
            .and_then(|()| self.update_velocity(mobile));
        match outcome {
            Ok(()) => {
                self.check_collision(mobile);
                Ok(())
            }
            Err(err) => {
                log::warn!("mobile {} dropped from the run: {}", mobile.id(), err);
                mobile.state = MobileState::Rejected;
                mobile.rejection = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Full tick for one active mobile; returns true if it advanced
    fn tick_mobile(&self, mobile: &mut Mobile) -> bool {
        if !mobile.is_active() {
            return false;
        }
        self.update_dtau(mobile);
        self.step(mobile).is_ok()
    }
}

/// Mobiles orbiting one central body under one metric and frame
///
/// # Example
///
/// ```
/// use cosmograv::{CentralBody, MetricKind, Mobile, ReferenceFrame, TrajectorySimulation};
/// use cosmograv::constants::{PhysicsConstants, SOLAR_MASS};
///
/// let body = CentralBody::new(SOLAR_MASS, 0.0);
/// let rs = body.r_s();
/// let mut sim = TrajectorySimulation::new(
///     PhysicsConstants::default(),
///     body,
///     MetricKind::Schwarzschild,
///     ReferenceFrame::Astronaut,
/// );
/// sim.add_mobile(Mobile::massive_from_degrees(0, 10.0 * rs, 0.0, 0.2 * 2.99792458e8, 90.0));
/// sim.initialize_mobiles();
///
/// let series = sim.run(100).unwrap();
/// assert_eq!(series[0].samples.len(), 101);
/// assert!(series[0].samples[100].r < 10.0 * rs);
/// ```
#[derive(Debug, Clone)]
pub struct TrajectorySimulation {
    stepper: Stepper,
    mobiles: Vec<Mobile>,
    integrator: Integrator,
    ticks: u64,
}

impl TrajectorySimulation {
    /// Simulation around `body`; the body's geometry is re-derived with
    /// `constants` so every model shares one set of constants
    pub fn new(
        constants: PhysicsConstants,
        mut body: CentralBody,
        metric: MetricKind,
        frame: ReferenceFrame,
    ) -> Self {
        body.set_constants(constants);
        Self {
            stepper: Stepper::new(body, metric, frame, StepPolicy::default()),
            mobiles: Vec::new(),
            integrator: Integrator::new(),
            ticks: 0,
        }
    }

    /// Builder: replace the adaptive step constants
    pub fn with_step_policy(mut self, policy: StepPolicy) -> Self {
        self.stepper.policy = policy;
        self
    }

    /// Builder: cap on the number of ticks a single `run` may request
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.integrator.max_steps = max_ticks;
        self
    }

    /// Central body
    pub fn body(&self) -> &CentralBody {
        &self.stepper.body
    }

    /// Replace the body. Constants of motion already computed are kept.
    pub fn set_body(&mut self, mut body: CentralBody) {
        body.set_constants(*self.stepper.body.constants());
        self.stepper = Stepper::new(
            body,
            self.stepper.spacetime.metric(),
            self.stepper.frame,
            self.stepper.policy,
        );
    }

    /// Metric family
    pub fn metric(&self) -> MetricKind {
        self.stepper.spacetime.metric()
    }

    /// Integration frame
    pub fn frame(&self) -> ReferenceFrame {
        self.stepper.frame
    }

    /// Adaptive step constants
    pub fn step_policy(&self) -> &StepPolicy {
        &self.stepper.policy
    }

    /// Piecewise spacetime the mobiles move in
    pub fn spacetime(&self) -> &Spacetime {
        &self.stepper.spacetime
    }

    /// Mobiles in insertion order
    pub fn mobiles(&self) -> &[Mobile] {
        &self.mobiles
    }

    /// Ticks performed so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// RK4 steps and right-hand-side evaluations across all mobiles
    pub fn stats(&self) -> &Stats {
        &self.integrator.stats
    }

    /// Add a mobile; returns its index
    pub fn add_mobile(&mut self, mobile: Mobile) -> usize {
        self.mobiles.push(mobile);
        self.mobiles.len() - 1
    }

    /// Seed the 4-velocity and freeze L and E for every mobile not yet
    /// initialized. Mobiles already in flight are left untouched.
    pub fn initialize_mobiles(&mut self) {
        for mobile in self
            .mobiles
            .iter_mut()
            .filter(|m| m.state() == MobileState::Seeded)
        {
            self.stepper.initialize(mobile);
        }
    }

    /// Recompute the step size of mobile `index` from its current state
    pub fn update_dtau(&mut self, index: usize) -> Result<f64, TrajectoryError> {
        let stepper = &self.stepper;
        let mobile = self
            .mobiles
            .get_mut(index)
            .ok_or(TrajectoryError::UnknownMobile { index })?;
        stepper.update_dtau(mobile);
        Ok(mobile.dtau)
    }

    /// Advance mobile `index` by its current step, without recomputing it.
    ///
    /// A refused step is returned and also recorded on the mobile, which is
    /// then [`MobileState::Rejected`].
    pub fn step_mobile(&mut self, index: usize) -> Result<(), TrajectoryError> {
        let stepper = &self.stepper;
        let mobile = self
            .mobiles
            .get_mut(index)
            .ok_or(TrajectoryError::UnknownMobile { index })?;
        match mobile.state() {
            MobileState::Seeded => return Err(TrajectoryError::NotInitialized { id: mobile.id() }),
            MobileState::Collided | MobileState::Rejected => return Ok(()),
            MobileState::Initialized | MobileState::HorizonCrossed => {}
        }
        stepper.step(mobile)?;

        self.integrator.stats.steps += 1;
        self.integrator.stats.fn_evals += 4;
        Ok(())
    }

    /// Refresh the static-observer velocity of mobile `index`
    pub fn update_velocity(&mut self, index: usize) -> Result<LocalVelocity, TrajectoryError> {
        let stepper = &self.stepper;
        let mobile = self
            .mobiles
            .get_mut(index)
            .ok_or(TrajectoryError::UnknownMobile { index })?;
        stepper.update_velocity(mobile)?;
        Ok(mobile.velocity)
    }

    /// Effective potential at the mobile's radius in the simulation frame
    pub fn potential(&self, mobile: &Mobile) -> Result<f64, TrajectoryError> {
        let k = self.stepper.constants(mobile)?;
        Ok(self
            .stepper
            .spacetime
            .potential(mobile.kind(), self.stepper.frame, mobile.r, &k))
    }

    /// Advance every active mobile by one adaptive step.
    ///
    /// Fails without moving anything if a mobile was never initialized. A
    /// mobile whose step is refused is rejected on its own; the tick still
    /// succeeds for the others.
    pub fn tick(&mut self) -> Result<(), TrajectoryError> {
        if let Some(m) = self.mobiles.iter().find(|m| m.state() == MobileState::Seeded) {
            return Err(TrajectoryError::NotInitialized { id: m.id() });
        }
        let stepper = &self.stepper;

        #[cfg(feature = "parallel")]
        let advanced: u64 = {
            use rayon::prelude::*;
            self.mobiles
                .par_iter_mut()
                .map(|m| u64::from(stepper.tick_mobile(m)))
                .sum()
        };
        #[cfg(not(feature = "parallel"))]
        let advanced: u64 = self
            .mobiles
            .iter_mut()
            .map(|m| u64::from(stepper.tick_mobile(m)))
            .sum();

        self.ticks += 1;
        self.integrator.stats.steps += advanced;
        self.integrator.stats.fn_evals += 4 * advanced;
        log::trace!("tick {}: {} mobiles advanced", self.ticks, advanced);
        Ok(())
    }

    /// Run `ticks` ticks and record every mobile's trajectory
    pub fn run(&mut self, ticks: u64) -> Result<Vec<TrajectorySeries>, TrajectoryError> {
        self.run_with(ticks, |_| true)
    }

    /// Run up to `ticks` ticks; `keep_going(tick)` is polled before each one
    /// and stops the run early when it returns false.
    ///
    /// Samples are recorded for a mobile on every tick it was active at the
    /// start of, so the tick on which it collides or is rejected is included.
    /// A rejected mobile's error is kept in its series.
    pub fn run_with<F>(
        &mut self,
        ticks: u64,
        mut keep_going: F,
    ) -> Result<Vec<TrajectorySeries>, TrajectoryError>
    where
        F: FnMut(u64) -> bool,
    {
        if ticks > self.integrator.max_steps {
            return Err(IntegrationError::MaxStepsExceeded { steps: ticks }.into());
        }

        let start = self.ticks;
        let mut series: Vec<TrajectorySeries> = self
            .mobiles
            .iter()
            .map(|m| TrajectorySeries {
                id: m.id(),
                samples: vec![TrajectorySample::of(m, start)],
                error: None,
            })
            .collect();

        for tick in 1..=ticks {
            if !keep_going(tick) {
                log::debug!("run stopped before tick {} of {}", tick, ticks);
                break;
            }
            let was_active: Vec<bool> = self.mobiles.iter().map(Mobile::is_active).collect();
            self.tick()?;

            for ((s, m), active) in series.iter_mut().zip(&self.mobiles).zip(was_active) {
                if active {
                    s.samples.push(TrajectorySample::of(m, self.ticks));
                }
            }
        }

        for (s, m) in series.iter_mut().zip(&self.mobiles) {
            s.error = m.rejection().cloned();
        }
        Ok(series)
    }
}
