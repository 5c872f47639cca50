//! Photoevaporative mass-loss rates for every active disk.

use cd_core::StarKey;
use cd_core::units;
use rayon::ThreadPool;
use rayon::prelude::*;

use crate::error::{PhotoError, PhotoResult};
use crate::radiation::Irradiation;

/// Tabulated FUV mass-loss rate.
pub trait MassLossTable: Send + Sync {
    /// Mass-loss rate [MSun/yr] for a host of `stellar_mass` MSun under
    /// `flux_g0`, with `disk_gas_mass` MSun of gas inside `disk_radius` AU.
    fn lookup(&self, stellar_mass: f64, flux_g0: f64, disk_gas_mass: f64, disk_radius: f64) -> f64;
}

/// Disk parameters the evaluator needs.
#[derive(Debug, Clone, Copy)]
pub struct PhotoevapTarget {
    pub key: StarKey,
    /// [MSun]
    pub stellar_mass: f64,
    /// [MSun]
    pub disk_gas_mass: f64,
    /// [AU]
    pub disk_radius_au: f64,
}

/// Ionisation-front mass-loss rate [MSun/yr] for a disk of `disk_radius_au`.
pub fn euv_mass_loss(disk_radius_au: f64) -> f64 {
    let r14 = disk_radius_au * units::au_in_cm() / 1e14;
    2e-9 * 3.0 * 4.12 * r14.powf(1.5)
}

fn single_mass_loss(table: &dyn MassLossTable, target: &PhotoevapTarget, rad: Irradiation) -> f64 {
    let fuv = table.lookup(
        target.stellar_mass,
        rad.flux_g0,
        target.disk_gas_mass,
        target.disk_radius_au,
    );
    let euv = if rad.euv {
        euv_mass_loss(target.disk_radius_au)
    } else {
        0.0
    };
    fuv + euv
}

/// FUV plus (when flagged) EUV mass-loss rate for every target, in order.
///
/// `irradiation[i]` must belong to `targets[i]`; the EUV flag is consumed
/// here and not stored anywhere.
pub fn photoevaporation_mass_loss(
    pool: &ThreadPool,
    table: &dyn MassLossTable,
    targets: &[PhotoevapTarget],
    irradiation: &[Irradiation],
) -> PhotoResult<Vec<f64>> {
    if targets.len() != irradiation.len() {
        return Err(PhotoError::InvalidArg {
            what: "one irradiation value per target is required",
        });
    }
    Ok(pool.install(|| {
        targets
            .par_iter()
            .zip(irradiation.par_iter())
            .map(|(target, rad)| single_mass_loss(table, target, *rad))
            .collect()
    }))
}
