//! Cluster-scale coupling of stellar dynamics and protoplanetary disks.
//!
//! Provides:
//! - `Star`: the shared star record with its disk bookkeeping
//! - Disk pool partitioning and parallel dispatch onto viscous backends
//! - Encounter classification and tidal truncation
//! - `Cluster`: the per-step evolution loop tying gravity, stellar evolution,
//!   radiation, photoevaporation and disk evolution together

pub mod cluster;
pub mod dispatch;
pub mod encounter;
pub mod error;
pub mod partition;
pub mod setup;
pub mod star;

pub use cluster::{Cluster, ClusterParams, ClusterParts, RunSummary, StepProgress};
pub use dispatch::WorkerPool;
pub use encounter::{
    DiskOutcome, DiskSlot, EncounterCase, EncounterError, EncounterOutcome, EncounterParams,
    classify, periastron_distance, resolve_encounter, truncation_radius,
};
pub use error::{SimError, SimResult};
pub use partition::{partition, partition_bounds, partition_mut};
pub use setup::setup_disks_and_codes;
pub use star::{Star, StarRole};
