//! Photons around a rapidly spinning black hole.
//!
//! Emits a fan of photons from 6 R_s in the equatorial plane of a Kerr black
//! hole with a = 0.9 GM/c² and reports, for each emission angle, whether the
//! photon escapes or crosses the outer horizon. Prograde and retrograde
//! photons bend by different amounts because of frame dragging.
//!
//! Run with:
//!   cargo run --example kerr_photon

use cosmograv::constants::{PhysicsConstants, SOLAR_MASS};
use cosmograv::{CentralBody, MetricKind, Mobile, MobileState, ReferenceFrame, TrajectorySimulation};

const MAX_TICKS: u64 = 50_000;

fn main() {
    env_logger::init();

    let constants = PhysicsConstants::default();
    let mass = 10.0 * SOLAR_MASS;
    let spin = 0.9 * constants.g * mass * mass / constants.c;
    let hole = CentralBody::new(mass, 0.0).with_angular_momentum(spin);
    let rs = hole.r_s();

    println!("Kerr black hole (M = 10 M_sun, a = {:.3} R_s)", hole.a() / rs);
    println!("  R_h+ = {:.4} R_s   R_h- = {:.4} R_s", hole.r_h_plus() / rs, hole.r_h_minus() / rs);
    println!();
    println!("  angle    fate          ticks   final r/R_s   swept φ (deg)");

    let mut report = Vec::new();
    for angle in (-180..=180).step_by(30) {
        let mut sim = TrajectorySimulation::new(
            constants,
            hole.clone(),
            MetricKind::Kerr,
            ReferenceFrame::Astronaut,
        );
        sim.add_mobile(Mobile::photon_from_degrees(0, 6.0 * rs, 0.0, angle as f64));
        sim.initialize_mobiles();

        let mut fate = "bound";
        while sim.ticks() < MAX_TICKS {
            if let Err(err) = sim.tick() {
                eprintln!("photon at {angle} deg: {err}");
                fate = "error";
                break;
            }
            let photon = &sim.mobiles()[0];
            if photon.state() == MobileState::HorizonCrossed {
                fate = "captured";
                break;
            }
            if photon.r() > 50.0 * rs {
                fate = "escaped";
                break;
            }
        }

        let photon = &sim.mobiles()[0];
        let swept = photon.phi().to_degrees();
        println!(
            "  {:>5}    {:<12}  {:>6}   {:>10.3}   {:>12.2}",
            angle,
            fate,
            sim.ticks(),
            photon.r() / rs,
            swept
        );
        report.push(serde_json::json!({
            "angle_deg": angle,
            "fate": fate,
            "ticks": sim.ticks(),
            "r_over_rs": photon.r() / rs,
            "phi_deg": swept,
            "affine_elapsed": photon.elapsed(),
        }));
    }

    println!();
    println!("{}", serde_json::to_string_pretty(&report).unwrap());
}
