//! Expansion history of the reference ΛCDM universe.
//!
//! Prints the age, a few look-back times and distances, then sweeps the scale
//! factor a(t) from a = 1 today back towards the big bang and forward into
//! the accelerating future.
//!
//! Run with:
//!   cargo run --example scale_factor

use cosmograv::{DarkEnergy, Universe};

const MPC: f64 = 3.085_677_581e22;

fn gyr(universe: &Universe, seconds: f64) -> f64 {
    universe.seconds_to_years(seconds) / 1e9
}

fn main() {
    env_logger::init();

    let mut universe = Universe::default();

    let omegas = universe.omegas();
    println!("Reference universe (H0 = {} km/s/Mpc)", universe.hubble());
    println!(
        "  Ω_m = {:.4}  Ω_r = {:.3e}  Ω_k = {:.2e}  Ω_Λ = {:.4}",
        omegas.omega_m, omegas.omega_r, omegas.omega_k, omegas.omega_de
    );
    println!("  Age: {:.3} Gyr", gyr(&universe, universe.age()));
    println!();

    println!("      z   look-back (Gyr)   D_L (Mpc)   D_A (Mpc)");
    for z in [0.1, 0.5, 1.0, 2.0, 5.0] {
        let lookback = universe.duration(0.0, z).unwrap();
        let d = universe.distances(z);
        println!(
            "  {:>5.1}   {:>15.3}   {:>9.1}   {:>9.1}",
            z,
            gyr(&universe, lookback),
            d.luminosity / MPC,
            d.angular_diameter / MPC
        );
    }

    let history = universe.scale_factor(1e-3, 0.01, 3.0).unwrap();
    println!();
    println!("Scale factor: {} samples", history.len());
    for i in (0..history.len()).step_by(history.len() / 10 + 1) {
        println!(
            "  t = {:>7.3} Gyr   a = {:.4}   da/dτ = {:.4}",
            gyr(&universe, history.time[i]),
            history.a[i],
            history.da[i]
        );
    }

    // Same universe with a phantom-like evolving equation of state
    universe.set_dark_energy(DarkEnergy {
        omega: 0.6911,
        w0: -1.1,
        w1: 0.2,
    });
    println!();
    println!("w0 = -1.1, w1 = 0.2: age {:.3} Gyr", gyr(&universe, universe.age()));
    println!(
        "{}",
        serde_json::to_string_pretty(&universe.density_evolution(&[0.0, 1.0, 10.0])).unwrap()
    );
}
