//! Gravity collaborator interface.

use cd_core::{StarKey, Vec3};

use crate::error::DynamicsResult;

/// A star as held by the gravity code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityParticle {
    pub key: StarKey,
    /// Gravitating mass, star plus disk [MSun]
    pub mass: f64,
    /// [pc]
    pub position: Vec3,
    /// [km/s]
    pub velocity: Vec3,
    /// Collision radius used for encounter detection [pc]
    pub radius: f64,
}

/// An N-body integrator that stops on close encounters.
///
/// Times are absolute simulation times in years.
pub trait GravityCode: Send {
    fn model_time(&self) -> f64;

    /// Integrate up to `t_end`, or until two particles come within the sum of
    /// their collision radii. In the second case `model_time() < t_end` and
    /// [`pending_encounter`](Self::pending_encounter) names the pair.
    fn evolve_model(&mut self, t_end: f64) -> DynamicsResult<()>;

    fn particles(&self) -> Vec<GravityParticle>;

    fn set_mass(&mut self, key: StarKey, mass: f64) -> DynamicsResult<()>;

    fn set_collision_radius(&mut self, key: StarKey, radius_pc: f64) -> DynamicsResult<()>;

    /// Pair that stopped the last `evolve_model` call, if any.
    fn pending_encounter(&self) -> Option<[StarKey; 2]>;

    /// Kinetic energy [MSun pc^2 / Myr^2].
    fn kinetic_energy(&self) -> f64;

    /// Softened potential energy [MSun pc^2 / Myr^2].
    fn potential_energy(&self) -> f64;
}
