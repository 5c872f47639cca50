//! One-dimensional viscous protoplanetary disks on a shared radial grid.
//!
//! Provides:
//! - `RadialGrid`: log-spaced cell geometry shared read-only by every backend
//! - `Disk`: per-star gas profile, dust budget, truncation and dispersal state
//! - `ViscousCode`: an integrator backend that evolves one bound disk at a time

pub mod disk;
pub mod error;
pub mod grid;
pub mod viscous;

pub use disk::{DUST_TO_GAS, DispersalThresholds, Disk, DiskInit, Truncation};
pub use error::{DiskError, DiskResult};
pub use grid::RadialGrid;
pub use viscous::{ViscousCode, ViscousParams};
