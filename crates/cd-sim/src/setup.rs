//! Creation of the disk pool and its backends.

use std::sync::Arc;

use cd_core::BackendId;
use cd_disk::{Disk, DiskInit, RadialGrid, ViscousCode, ViscousParams};
use tracing::info;

use crate::error::{SimError, SimResult};
use crate::partition::partition_bounds;

/// Build every disk and `min(n_backends, disks.len())` backends (at least
/// one) on a single shared grid.
///
/// Backend `i` is normalised against the mean stellar mass of the `i`-th
/// contiguous share of `disks`.
pub fn setup_disks_and_codes(
    disks: &[DiskInit],
    n_backends: usize,
    n_cells: usize,
    r_min: f64,
    r_max: f64,
    params: ViscousParams,
) -> SimResult<(Vec<Disk>, Vec<ViscousCode>)> {
    if n_backends == 0 {
        return Err(SimError::InvalidArg {
            what: "number of disk backends must be at least 1",
        });
    }
    let grid = Arc::new(RadialGrid::new(n_cells, r_min, r_max)?);

    let built = disks
        .iter()
        .map(|init| Disk::new(*init, Arc::clone(&grid), params.sigma_floor))
        .collect::<Result<Vec<_>, _>>()?;

    let n_codes = n_backends.min(disks.len()).max(1);
    let mut codes = Vec::with_capacity(n_codes);
    for (i, range) in partition_bounds(disks.len(), n_codes)?.into_iter().enumerate() {
        let share = &disks[range];
        let reference_mass = if share.is_empty() {
            1.0
        } else {
            share.iter().map(|d| d.stellar_mass).sum::<f64>() / share.len() as f64
        };
        let id = BackendId::from_index(u32::try_from(i).map_err(|_| SimError::InvalidArg {
            what: "too many disk backends",
        })?);
        codes.push(ViscousCode::new(id, Arc::clone(&grid), params, reference_mass)?);
    }

    info!(
        disks = built.len(),
        backends = codes.len(),
        cells = n_cells,
        r_min_au = r_min,
        r_max_au = r_max,
        "disk pool ready"
    );
    Ok((built, codes))
}
