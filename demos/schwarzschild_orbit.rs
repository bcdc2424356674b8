//! Precessing orbit around a neutron star, then a plunge through its interior.
//!
//! A probe launched tangentially at 10 R_s traces a rosette in the external
//! metric. A second probe, dropped radially onto a non-collidable star, falls
//! through the uniform-density interior and out the other side.
//!
//! Run with:
//!   cargo run --example schwarzschild_orbit
//!
//! Set `RUST_LOG=debug` to see step and state transitions.

use std::f64::consts::PI;

use cosmograv::constants::{PhysicsConstants, SOLAR_MASS};
use cosmograv::{CentralBody, MetricKind, Mobile, ReferenceFrame, TrajectorySimulation};

fn main() {
    env_logger::init();

    let constants = PhysicsConstants::default();
    let star = CentralBody::new(1.4 * SOLAR_MASS, 0.0);
    let rs = star.r_s();
    let c = constants.c;

    let mut sim = TrajectorySimulation::new(
        constants,
        star,
        MetricKind::Schwarzschild,
        ReferenceFrame::Astronaut,
    );
    sim.add_mobile(Mobile::massive_from_degrees(0, 10.0 * rs, 0.0, 0.2 * c, 90.0));
    sim.initialize_mobiles();

    let series = sim.run(20_000).unwrap();
    let samples = &series[0].samples;

    let (r_min, r_max) = samples
        .iter()
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), s| (lo.min(s.r), hi.max(s.r)));
    let last = samples.last().unwrap();
    let k = sim.mobiles()[0].constants().unwrap();

    println!("Bound orbit (M = 1.4 M_sun, R_s = {:.1} m)", rs);
    println!("  L = {:.6e} m   E = {:.9}", k.l, k.e);
    println!("  Periapsis:   {:.3} R_s", r_min / rs);
    println!("  Apoapsis:    {:.3} R_s", r_max / rs);
    println!("  Revolutions: {:.3}", last.phi / (2.0 * PI));
    println!("  Proper time: {:.6e} s", last.clock_a);
    println!("  Far time:    {:.6e} s", last.clock_do);
    println!("  Time dilation dt/dτ (avg): {:.6}", last.clock_do / last.clock_a);

    // A star of radius 3 R_s that lets the probe pass through
    let star = CentralBody::new(1.4 * SOLAR_MASS, 3.0 * rs);
    let mut sim = TrajectorySimulation::new(
        constants,
        star,
        MetricKind::Schwarzschild,
        ReferenceFrame::Astronaut,
    );
    sim.add_mobile(Mobile::massive_from_degrees(1, 5.0 * rs, 0.0, 0.1 * c, 90.0));
    sim.initialize_mobiles();

    let series = sim.run(20_000).unwrap();
    let inside = series[0].samples.iter().filter(|s| s.r < 3.0 * rs).count();
    let deepest = series[0]
        .samples
        .iter()
        .map(|s| s.r)
        .fold(f64::INFINITY, f64::min);
    let fastest = series[0]
        .samples
        .iter()
        .map(|s| s.velocity.speed)
        .fold(0.0, f64::max);

    println!();
    println!("Passage through a 3 R_s star");
    println!("  Samples inside the star: {}", inside);
    println!("  Deepest point: {:.3} R_s", deepest / rs);
    println!("  Peak local speed: {:.4} c", fastest / c);

    let tail = &series[0].samples[series[0].samples.len() - 3..];
    println!();
    println!("Last samples as JSON:");
    println!("{}", serde_json::to_string_pretty(tail).unwrap());
}
