//! Error types for disk setup and integration.

use cd_core::StarKey;
use thiserror::Error;

/// Errors raised by disks and viscous backends.
#[derive(Error, Debug)]
pub enum DiskError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Disk {key}: integration needs {substeps} substeps, above the limit of {limit}")]
    NonConvergence {
        key: StarKey,
        substeps: f64,
        limit: usize,
    },

    #[error("Disk {key}: non-finite surface density in cell {cell}")]
    NonFinite { key: StarKey, cell: usize },

    #[error("Disk {key} was built on a different grid than its backend")]
    GridMismatch { key: StarKey },
}

pub type DiskResult<T> = Result<T, DiskError>;
