//! Dynamics errors.

use cd_core::StarKey;
use thiserror::Error;

pub type DynamicsResult<T> = Result<T, DynamicsError>;

#[derive(Error, Debug)]
pub enum DynamicsError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Unknown particle {key}")]
    UnknownKey { key: StarKey },

    #[error("Non-finite value in {what}")]
    NonFinite { what: &'static str },

    /// The adaptive timestep collapsed, usually from a near-singular pair.
    #[error("Timestep underflow at t = {time_yr} yr (dt = {dt_yr} yr)")]
    Stalled { time_yr: f64, dt_yr: f64 },

    #[error("Cannot evolve backwards from {from_yr} yr to {to_yr} yr")]
    Backwards { from_yr: f64, to_yr: f64 },
}
