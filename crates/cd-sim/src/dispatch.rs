//! Parallel disk evolution on a fixed worker pool.

use cd_disk::{Disk, DiskResult, ViscousCode};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::error::{SimError, SimResult};
use crate::partition::partition_mut;

/// A fixed-size thread pool built once per run.
///
/// Disk dispatch and the radiation / mass-loss maps both run on it, one after
/// the other. Every call blocks until all of its work is done.
pub struct WorkerPool {
    pool: ThreadPool,
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize) -> SimResult<Self> {
        if workers == 0 {
            return Err(SimError::InvalidArg {
                what: "worker count must be at least 1",
            });
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("cd-worker-{i}"))
            .build()?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn pool(&self) -> &ThreadPool {
        &self.pool
    }

    /// Evolve every disk in `disks` by `dt` years.
    ///
    /// The disks are split into one contiguous partition per backend. Each
    /// partition runs as one unit of work that binds its disks to its backend
    /// and evolves them in order. The first failing disk aborts the call.
    pub fn evolve_disks(&self, backends: &mut [ViscousCode], disks: &mut [&mut Disk], dt: f64) -> SimResult<()> {
        if backends.is_empty() {
            return Err(SimError::InvalidArg {
                what: "at least one disk backend is required",
            });
        }
        debug!(disks = disks.len(), backends = backends.len(), dt_yr = dt, "dispatching disks");
        let partitions = partition_mut(disks, backends.len())?;
        self.pool.install(|| {
            partitions
                .into_par_iter()
                .zip(backends.par_iter_mut())
                .try_for_each(|(part, backend)| evolve_partition(backend, part, dt))
        })?;
        Ok(())
    }
}

fn evolve_partition(backend: &mut ViscousCode, disks: &mut [&mut Disk], dt: f64) -> DiskResult<()> {
    for disk in disks.iter_mut() {
        backend.bind(disk)?;
        backend.evolve(disk, dt)?;
    }
    Ok(())
}
