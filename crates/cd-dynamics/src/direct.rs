//! Direct-summation N-body integrator.
//!
//! Plummer-softened pairwise gravity, kick-drift-kick leapfrog with one shared
//! adaptive timestep. Internally positions are in pc, velocities in pc/Myr and
//! times in Myr; the [`GravityCode`] surface speaks pc, km/s and yr.

use std::collections::HashMap;

use cd_core::units;
use cd_core::{StarKey, Vec3};

use crate::error::{DynamicsError, DynamicsResult};
use crate::gravity::{GravityCode, GravityParticle};
use crate::potential::BackgroundPotential;

/// Smallest substep before the integrator gives up [Myr].
const MIN_STEP_MYR: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectGravityParams {
    /// Plummer softening length [AU]
    pub softening_au: f64,
    /// Timestep accuracy parameter
    pub eta: f64,
    pub background: Option<BackgroundPotential>,
}

impl Default for DirectGravityParams {
    fn default() -> Self {
        Self {
            softening_au: 100.0,
            eta: 0.01,
            background: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirectGravity {
    keys: Vec<StarKey>,
    index: HashMap<StarKey, usize>,
    mass: Vec<f64>,
    pos: Vec<Vec3>,
    /// [pc/Myr]
    vel: Vec<Vec3>,
    radius: Vec<f64>,
    /// Accelerations at the current positions [pc/Myr^2]
    acc: Vec<Vec3>,
    /// [Myr]
    time: f64,
    eps2: f64,
    g: f64,
    kms: f64,
    params: DirectGravityParams,
    pending: Option<[StarKey; 2]>,
}

impl DirectGravity {
    /// Load `particles` at simulation time `start_time_yr`.
    pub fn new(
        particles: &[GravityParticle],
        start_time_yr: f64,
        params: DirectGravityParams,
    ) -> DynamicsResult<Self> {
        if !(params.eta > 0.0) || params.softening_au < 0.0 {
            return Err(DynamicsError::InvalidArg {
                what: "eta must be positive and softening non-negative",
            });
        }
        let mut index = HashMap::with_capacity(particles.len());
        for (i, p) in particles.iter().enumerate() {
            if index.insert(p.key, i).is_some() {
                return Err(DynamicsError::InvalidArg {
                    what: "duplicate particle key",
                });
            }
            if !(p.mass >= 0.0) {
                return Err(DynamicsError::InvalidArg {
                    what: "particle mass must be non-negative",
                });
            }
        }

        let kms = units::kms_to_pc_per_myr(1.0);
        let eps = params.softening_au / units::pc_in_au();
        let mut code = Self {
            keys: particles.iter().map(|p| p.key).collect(),
            index,
            mass: particles.iter().map(|p| p.mass).collect(),
            pos: particles.iter().map(|p| p.position).collect(),
            vel: particles.iter().map(|p| p.velocity * kms).collect(),
            radius: particles.iter().map(|p| p.radius).collect(),
            acc: vec![Vec3::zeros(); particles.len()],
            time: start_time_yr * 1e-6,
            eps2: eps * eps,
            g: units::g_pc3_msun_myr2(),
            kms,
            params,
            pending: None,
        };
        code.acc = code.accelerations();
        Ok(code)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn slot(&self, key: StarKey) -> DynamicsResult<usize> {
        self.index
            .get(&key)
            .copied()
            .ok_or(DynamicsError::UnknownKey { key })
    }

    fn accelerations(&self) -> Vec<Vec3> {
        let n = self.pos.len();
        let mut acc = vec![Vec3::zeros(); n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.pos[j] - self.pos[i];
                let r2 = d.norm_squared() + self.eps2;
                let inv_r3 = 1.0 / (r2 * r2.sqrt());
                acc[i] += d * (self.g * self.mass[j] * inv_r3);
                acc[j] -= d * (self.g * self.mass[i] * inv_r3);
            }
        }
        if let Some(background) = &self.params.background {
            for (a, x) in acc.iter_mut().zip(&self.pos) {
                *a += background.acceleration(x);
            }
        }
        acc
    }

    /// Shared timestep from the largest acceleration [Myr].
    fn timestep(&self) -> f64 {
        let a_max = self.acc.iter().map(|a| a.norm()).fold(0.0, f64::max);
        if a_max > 0.0 {
            let length = self.eps2.sqrt().max(1e-6);
            self.params.eta * (length / a_max).sqrt()
        } else {
            f64::INFINITY
        }
    }

    fn step(&mut self, dt: f64) {
        let half = 0.5 * dt;
        for (v, a) in self.vel.iter_mut().zip(&self.acc) {
            *v += a * half;
        }
        for (x, v) in self.pos.iter_mut().zip(&self.vel) {
            *x += v * dt;
        }
        self.acc = self.accelerations();
        for (v, a) in self.vel.iter_mut().zip(&self.acc) {
            *v += a * half;
        }
        self.time += dt;
    }

    /// First overlapping pair in index order.
    fn detect_encounter(&self) -> Option<[StarKey; 2]> {
        let n = self.pos.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let reach = self.radius[i] + self.radius[j];
                if reach > 0.0 && (self.pos[j] - self.pos[i]).norm_squared() < reach * reach {
                    return Some([self.keys[i], self.keys[j]]);
                }
            }
        }
        None
    }
}

impl GravityCode for DirectGravity {
    fn model_time(&self) -> f64 {
        self.time * 1e6
    }

    fn evolve_model(&mut self, t_end: f64) -> DynamicsResult<()> {
        self.pending = None;
        let t_end = t_end * 1e-6;
        if t_end < self.time {
            return Err(DynamicsError::Backwards {
                from_yr: self.model_time(),
                to_yr: t_end * 1e6,
            });
        }
        while self.time < t_end {
            let dt = self.timestep().min(t_end - self.time);
            if !(dt > MIN_STEP_MYR) {
                // round-off left a sliver at the end
                if t_end - self.time <= MIN_STEP_MYR {
                    self.time = t_end;
                    break;
                }
                return Err(DynamicsError::Stalled {
                    time_yr: self.model_time(),
                    dt_yr: dt * 1e6,
                });
            }
            self.step(dt);
            if self.pos.iter().chain(&self.vel).any(|v| !v.iter().all(|c| c.is_finite())) {
                return Err(DynamicsError::NonFinite {
                    what: "particle phase space",
                });
            }
            if let Some(pair) = self.detect_encounter() {
                tracing::debug!(a = %pair[0], b = %pair[1], t_yr = self.model_time(), "collision detected");
                self.pending = Some(pair);
                return Ok(());
            }
        }
        Ok(())
    }

    fn particles(&self) -> Vec<GravityParticle> {
        (0..self.keys.len())
            .map(|i| GravityParticle {
                key: self.keys[i],
                mass: self.mass[i],
                position: self.pos[i],
                velocity: self.vel[i] / self.kms,
                radius: self.radius[i],
            })
            .collect()
    }

    fn set_mass(&mut self, key: StarKey, mass: f64) -> DynamicsResult<()> {
        let i = self.slot(key)?;
        if !(mass >= 0.0) {
            return Err(DynamicsError::InvalidArg {
                what: "particle mass must be non-negative",
            });
        }
        if self.mass[i] != mass {
            self.mass[i] = mass;
            self.acc = self.accelerations();
        }
        Ok(())
    }

    fn set_collision_radius(&mut self, key: StarKey, radius_pc: f64) -> DynamicsResult<()> {
        let i = self.slot(key)?;
        self.radius[i] = radius_pc;
        Ok(())
    }

    fn pending_encounter(&self) -> Option<[StarKey; 2]> {
        self.pending
    }

    fn kinetic_energy(&self) -> f64 {
        self.mass
            .iter()
            .zip(&self.vel)
            .map(|(m, v)| 0.5 * m * v.norm_squared())
            .sum()
    }

    fn potential_energy(&self) -> f64 {
        let n = self.pos.len();
        let mut u = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let r = ((self.pos[j] - self.pos[i]).norm_squared() + self.eps2).sqrt();
                u -= self.g * self.mass[i] * self.mass[j] / r;
            }
        }
        u
    }
}
