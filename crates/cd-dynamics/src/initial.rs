//! Initial conditions for a young star cluster.
//!
//! Masses follow the Kroupa (2001) IMF. Positions and velocities come from a
//! Plummer or homogeneous sphere in dimensionless units and are then scaled to
//! a requested virial radius and virial ratio. All sampling goes through a
//! seeded `ChaChaRng`, so a seed reproduces a cluster exactly.

use std::f64::consts::PI;

use cd_core::Vec3;
use cd_core::units;
use rand::Rng;
use rand_chacha::ChaChaRng;

use crate::error::{DynamicsError, DynamicsResult};

/// Lower mass limit of the IMF [MSun].
pub const IMF_MIN_MASS: f64 = 0.08;
/// IMF break between the low- and high-mass slopes [MSun].
const IMF_BREAK: f64 = 0.5;

/// Plummer radii beyond this enclosed-mass fraction are resampled.
const PLUMMER_MASS_CUTOFF: f64 = 0.999;

/// A star before it is turned into simulation state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    /// [MSun]
    pub mass: f64,
    /// [pc]
    pub position: Vec3,
    /// [km/s]
    pub velocity: Vec3,
}

/// Spatial distribution of the initial cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    Plummer,
    Uniform,
}

/// Inverse-transform sample of `p(x) ~ x^alpha` on `[x_min, x_max]`.
fn sample_power_law(rng: &mut ChaChaRng, x_min: f64, x_max: f64, alpha: f64) -> f64 {
    let u: f64 = rng.random();
    let a1 = alpha + 1.0;
    (u * (x_max.powf(a1) - x_min.powf(a1)) + x_min.powf(a1)).powf(1.0 / a1)
}

/// Integral of `x^alpha` over `[lo, hi]`.
fn power_law_weight(lo: f64, hi: f64, alpha: f64) -> f64 {
    let a1 = alpha + 1.0;
    (hi.powf(a1) - lo.powf(a1)) / a1
}

/// Draw `n` stellar masses from the Kroupa IMF between 0.08 MSun and
/// `max_mass`.
///
/// The two segments (slope -1.3 below 0.5 MSun, -2.3 above) are joined
/// continuously; segment probabilities come from their integrals.
pub fn sample_kroupa_masses(n: usize, max_mass: f64, rng: &mut ChaChaRng) -> DynamicsResult<Vec<f64>> {
    if !(max_mass > IMF_MIN_MASS) {
        return Err(DynamicsError::InvalidArg {
            what: "maximum stellar mass must exceed 0.08 MSun",
        });
    }
    let low_hi = max_mass.min(IMF_BREAK);
    let low = power_law_weight(IMF_MIN_MASS, low_hi, -1.3);
    // continuity at the break: k_high = k_low * 0.5
    let high = if max_mass > IMF_BREAK {
        IMF_BREAK * power_law_weight(IMF_BREAK, max_mass, -2.3)
    } else {
        0.0
    };
    let p_low = low / (low + high);

    Ok((0..n)
        .map(|_| {
            let u: f64 = rng.random();
            if u < p_low {
                sample_power_law(rng, IMF_MIN_MASS, low_hi, -1.3)
            } else {
                sample_power_law(rng, IMF_BREAK, max_mass, -2.3)
            }
        })
        .collect())
}

/// Make sure at least one star is above `threshold`, replacing the first
/// mass with a uniform draw from `[2, 100]` MSun otherwise. Returns the new
/// mass when a replacement happened.
pub fn ensure_bright_star(masses: &mut [f64], threshold: f64, rng: &mut ChaChaRng) -> Option<f64> {
    if masses.is_empty() || masses.iter().any(|&m| m > threshold) {
        return None;
    }
    let big = rng.random_range(2.0..100.0);
    masses[0] = big;
    tracing::warn!(mass = big, "no star above {threshold} MSun from the IMF, added one");
    Some(big)
}

fn random_direction(rng: &mut ChaChaRng) -> Vec3 {
    let cos_theta: f64 = rng.random_range(-1.0..1.0);
    let phi: f64 = rng.random_range(0.0..2.0 * PI);
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

fn gaussian(rng: &mut ChaChaRng) -> f64 {
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Plummer sphere in Henon units (Aarseth, Henon & Wielen 1974).
pub fn plummer_sphere(masses: &[f64], rng: &mut ChaChaRng) -> Vec<Body> {
    masses
        .iter()
        .map(|&mass| {
            let x: f64 = rng.random_range(0.0..PLUMMER_MASS_CUTOFF);
            let r = 1.0 / (x.powf(-2.0 / 3.0) - 1.0).sqrt();

            // von Neumann rejection for q = v / v_escape
            let q = loop {
                let q: f64 = rng.random();
                let y: f64 = rng.random_range(0.0..0.1);
                if y < q * q * (1.0 - q * q).powf(3.5) {
                    break q;
                }
            };
            let v = q * std::f64::consts::SQRT_2 * (1.0 + r * r).powf(-0.25);

            Body {
                mass,
                position: random_direction(rng) * r,
                velocity: random_direction(rng) * v,
            }
        })
        .collect()
}

/// Homogeneous sphere of unit radius with isotropic Gaussian velocities.
pub fn uniform_sphere(masses: &[f64], rng: &mut ChaChaRng) -> Vec<Body> {
    masses
        .iter()
        .map(|&mass| {
            let r = rng.random::<f64>().cbrt();
            Body {
                mass,
                position: random_direction(rng) * r,
                velocity: Vec3::new(gaussian(rng), gaussian(rng), gaussian(rng)),
            }
        })
        .collect()
}

/// Generate bodies for `masses` following `distribution` (dimensionless).
pub fn sample_positions(distribution: Distribution, masses: &[f64], rng: &mut ChaChaRng) -> Vec<Body> {
    match distribution {
        Distribution::Plummer => plummer_sphere(masses, rng),
        Distribution::Uniform => uniform_sphere(masses, rng),
    }
}

/// Kinetic energy and unsoftened potential energy, treating positions as pc
/// and velocities as pc/Myr.
fn energies(bodies: &[Body], g: f64) -> (f64, f64) {
    let kinetic = bodies
        .iter()
        .map(|b| 0.5 * b.mass * b.velocity.norm_squared())
        .sum();
    let mut potential = 0.0;
    for (i, a) in bodies.iter().enumerate() {
        for b in &bodies[i + 1..] {
            potential -= g * a.mass * b.mass / (b.position - a.position).norm();
        }
    }
    (kinetic, potential)
}

/// Move to the centre-of-mass frame and rescale so that the virial radius is
/// `virial_radius_pc` and `-K/U = virial_ratio`.
///
/// Input positions and velocities may be in any consistent dimensionless
/// units; output positions are in pc and velocities in km/s.
pub fn scale_to_standard(bodies: &mut [Body], virial_radius_pc: f64, virial_ratio: f64) -> DynamicsResult<()> {
    if bodies.len() < 2 {
        return Err(DynamicsError::InvalidArg {
            what: "virial scaling needs at least two bodies",
        });
    }
    if !(virial_radius_pc > 0.0 && virial_ratio >= 0.0) {
        return Err(DynamicsError::InvalidArg {
            what: "virial radius must be positive and virial ratio non-negative",
        });
    }

    let total: f64 = bodies.iter().map(|b| b.mass).sum();
    let com = bodies.iter().fold(Vec3::zeros(), |acc, b| acc + b.position * b.mass) / total;
    let cov = bodies.iter().fold(Vec3::zeros(), |acc, b| acc + b.velocity * b.mass) / total;
    for b in bodies.iter_mut() {
        b.position -= com;
        b.velocity -= cov;
    }

    let g = units::g_pc3_msun_myr2();
    let (_, potential) = energies(bodies, g);
    if !(potential < 0.0 && potential.is_finite()) {
        return Err(DynamicsError::NonFinite {
            what: "cluster potential energy",
        });
    }
    let target_potential = -g * total * total / (2.0 * virial_radius_pc);
    let length_scale = potential / target_potential;
    for b in bodies.iter_mut() {
        b.position *= length_scale;
    }

    let (kinetic, potential) = energies(bodies, g);
    let velocity_scale = if kinetic > 0.0 {
        (-virial_ratio * potential / kinetic).sqrt()
    } else {
        0.0
    };
    let to_kms = 1.0 / units::kms_to_pc_per_myr(1.0);
    for b in bodies.iter_mut() {
        b.velocity *= velocity_scale * to_kms;
    }
    Ok(())
}
