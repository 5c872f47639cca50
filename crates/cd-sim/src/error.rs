//! Error types for cluster evolution.

use cd_core::StarKey;
use thiserror::Error;

/// Errors that abort a cluster step or run.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Unknown star {key}")]
    UnknownStar { key: StarKey },

    #[error(transparent)]
    Core(#[from] cd_core::CoreError),

    #[error(transparent)]
    Disk(#[from] cd_disk::DiskError),

    #[error(transparent)]
    Photo(#[from] cd_photo::PhotoError),

    #[error(transparent)]
    Dynamics(#[from] cd_dynamics::DynamicsError),

    #[error(transparent)]
    Results(#[from] cd_results::ResultsError),

    #[error("More than {limit} encounters in the step ending at t = {time_yr} yr")]
    EncounterOverflow { limit: usize, time_yr: f64 },

    #[error("Worker pool: {message}")]
    Pool { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<rayon::ThreadPoolBuildError> for SimError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        SimError::Pool {
            message: e.to_string(),
        }
    }
}
