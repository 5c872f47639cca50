//! FUV flux received by each disked star from the bright stars.

use std::f64::consts::PI;

use cd_core::units::{self, constants};
use cd_core::{StarKey, Vec3};
use rayon::ThreadPool;
use rayon::prelude::*;

use crate::luminosity::luminosity_fit;

/// A bright star as seen by the evaluator.
#[derive(Debug, Clone, Copy)]
pub struct RadiationSource {
    /// [pc]
    pub position_pc: Vec3,
    /// Stellar mass [MSun]
    pub mass: f64,
}

/// A disk receiving radiation.
#[derive(Debug, Clone, Copy)]
pub struct IrradiatedDisk {
    pub key: StarKey,
    /// [pc]
    pub position_pc: Vec3,
    /// [AU]
    pub disk_radius_au: f64,
}

/// Radiation received by one disk during one step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Irradiation {
    /// Summed FUV flux [G0]
    pub flux_g0: f64,
    /// Some bright star is close enough for EUV mass loss.
    pub euv: bool,
}

/// Distance [cm] inside which a disk of `disk_radius_au` is EUV-dominated.
pub fn euv_distance_cm(disk_radius_au: f64) -> f64 {
    let r_cm = disk_radius_au * units::au_in_cm();
    1.25e17 * (r_cm / 1e14).sqrt()
}

/// Sum the flux of every source on `target`.
pub fn radiation_at(target: &IrradiatedDisk, sources: &[RadiationSource]) -> Irradiation {
    let pc_cm = units::pc_in_cm();
    let d_min = euv_distance_cm(target.disk_radius_au);

    sources.iter().fold(Irradiation::default(), |mut acc, source| {
        let d = (source.position_pc - target.position_pc).norm() * pc_cm;
        if d < d_min {
            acc.euv = true;
        }
        let lum = luminosity_fit(source.mass);
        if lum > 0.0 {
            let flux = lum * constants::LSUN_ERG_S / (4.0 * PI * d * d);
            acc.flux_g0 += flux / constants::G0_ERG_S_CM2;
        }
        acc
    })
}

/// Evaluate [`radiation_at`] for every target on `pool`.
///
/// The result has one entry per target, in target order.
pub fn total_radiation(
    pool: &ThreadPool,
    targets: &[IrradiatedDisk],
    sources: &[RadiationSource],
) -> Vec<Irradiation> {
    pool.install(|| {
        targets
            .par_iter()
            .map(|target| radiation_at(target, sources))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_at(x: f64) -> IrradiatedDisk {
        IrradiatedDisk {
            key: StarKey::new(1),
            position_pc: Vec3::new(x, 0.0, 0.0),
            disk_radius_au: 30.0,
        }
    }

    #[test]
    fn bright_star_irradiates_nearby_disk() {
        let sources = [RadiationSource {
            position_pc: Vec3::zeros(),
            mass: 5.0,
        }];
        let rad = radiation_at(&target_at(0.1), &sources);
        assert!(rad.flux_g0 > 0.0);
        assert!(!rad.euv);

        // inverse square
        let far = radiation_at(&target_at(0.2), &sources);
        assert!((rad.flux_g0 / far.flux_g0 - 4.0).abs() < 1e-9);
    }

    #[test]
    fn close_source_sets_euv() {
        // d_min for 30 AU is about 0.088 pc
        let d_min_pc = euv_distance_cm(30.0) / units::pc_in_cm();
        assert!(d_min_pc > 0.05 && d_min_pc < 0.1);
        let sources = [RadiationSource {
            position_pc: Vec3::zeros(),
            mass: 5.0,
        }];
        assert!(radiation_at(&target_at(0.5 * d_min_pc), &sources).euv);
        assert!(!radiation_at(&target_at(2.0 * d_min_pc), &sources).euv);
    }

    #[test]
    fn no_sources_no_flux() {
        let rad = radiation_at(&target_at(1.0), &[]);
        assert_eq!(rad, Irradiation::default());
    }

    #[test]
    fn parallel_matches_serial_order() {
        let pool = rayon::ThreadPoolBuilder::new().num_threads(3).build().unwrap();
        let sources = [
            RadiationSource {
                position_pc: Vec3::new(0.0, 0.0, 0.0),
                mass: 8.0,
            },
            RadiationSource {
                position_pc: Vec3::new(0.0, 1.0, 0.0),
                mass: 25.0,
            },
        ];
        let targets: Vec<_> = (1..40)
            .map(|i| IrradiatedDisk {
                key: StarKey::new(i),
                position_pc: Vec3::new(0.05 * i as f64, 0.3, -0.1),
                disk_radius_au: 10.0 + i as f64,
            })
            .collect();
        let parallel = total_radiation(&pool, &targets, &sources);
        let serial: Vec<_> = targets.iter().map(|t| radiation_at(t, &sources)).collect();
        assert_eq!(parallel, serial);
    }
}
