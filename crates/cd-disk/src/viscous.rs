//! Viscous disk backend.
//!
//! Solves the thin-disk diffusion equation
//!
//! ```text
//! dSigma/dt = (3/r) d/dr [ r^(1/2) d/dr (nu Sigma r^(1/2)) ]
//! ```
//!
//! with an explicit finite-volume scheme on the shared [`RadialGrid`]. The
//! viscosity follows the alpha prescription `nu = alpha c_s^2 / Omega` with a
//! passive temperature profile `T = T_1AU (r / AU)^(-1/2)`. The inner boundary
//! is zero-torque (gas drains onto the star), the outer boundary is closed.
//!
//! A backend is bound to one disk at a time. Binding reloads the thermal
//! normalisation from the host star, so the result of `evolve` depends only on
//! the disk and never on which backend it was handed to.

use std::f64::consts::PI;
use std::sync::Arc;

use cd_core::units::{self, constants};
use cd_core::{BackendId, StarKey};

use crate::disk::Disk;
use crate::error::{DiskError, DiskResult};
use crate::grid::RadialGrid;

/// Midplane temperature at 1 AU around a 1 MSun star [K].
const T_1AU_SUN: f64 = 100.0;

/// Numerical and physical parameters shared by every backend of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViscousParams {
    /// Shakura-Sunyaev viscosity parameter
    pub alpha: f64,
    /// Mean molecular weight
    pub mu: f64,
    /// Minimum surface density [MSun/AU^2]
    pub sigma_floor: f64,
    /// Fraction of the stable explicit step actually taken
    pub courant: f64,
    pub max_substeps: usize,
}

impl Default for ViscousParams {
    fn default() -> Self {
        Self {
            alpha: 5e-3,
            mu: 2.33,
            sigma_floor: units::g_per_cm2_to_msun_per_au2(1e-12),
            courant: 0.5,
            max_substeps: 200_000,
        }
    }
}

/// Host-dependent state loaded into a backend by [`ViscousCode::bind`].
#[derive(Debug, Clone)]
struct Loaded {
    key: StarKey,
    stellar_mass: f64,
    /// Kinematic viscosity per cell [AU^2/yr]
    nu: Vec<f64>,
    /// Largest stable substep [yr]
    max_step: f64,
}

/// One viscous integrator.
#[derive(Debug, Clone)]
pub struct ViscousCode {
    id: BackendId,
    grid: Arc<RadialGrid>,
    params: ViscousParams,
    t_1au: f64,
    loaded: Option<Loaded>,
}

impl ViscousCode {
    /// Create a backend on `grid`, normalised for a host of
    /// `reference_stellar_mass` until the first disk is bound.
    pub fn new(
        id: BackendId,
        grid: Arc<RadialGrid>,
        params: ViscousParams,
        reference_stellar_mass: f64,
    ) -> DiskResult<Self> {
        if !(params.alpha > 0.0 && params.mu > 0.0) {
            return Err(DiskError::InvalidArg {
                what: "alpha and mu must be positive",
            });
        }
        if !(params.courant > 0.0 && params.courant <= 1.0) {
            return Err(DiskError::InvalidArg {
                what: "courant factor must be in (0, 1]",
            });
        }
        if params.max_substeps == 0 {
            return Err(DiskError::InvalidArg {
                what: "max_substeps must be at least 1",
            });
        }
        if reference_stellar_mass <= 0.0 {
            return Err(DiskError::InvalidArg {
                what: "reference stellar mass must be positive",
            });
        }
        Ok(Self {
            id,
            grid,
            params,
            t_1au: temperature_at_1au(reference_stellar_mass),
            loaded: None,
        })
    }

    pub fn id(&self) -> BackendId {
        self.id
    }

    pub fn grid(&self) -> &Arc<RadialGrid> {
        &self.grid
    }

    pub fn params(&self) -> &ViscousParams {
        &self.params
    }

    /// Temperature normalisation at 1 AU currently loaded [K].
    pub fn temperature_1au(&self) -> f64 {
        self.t_1au
    }

    /// Key of the disk last bound to this backend.
    pub fn loaded_key(&self) -> Option<StarKey> {
        self.loaded.as_ref().map(|l| l.key)
    }

    /// Load `disk`'s host into this backend and record the binding on the disk.
    pub fn bind(&mut self, disk: &mut Disk) -> DiskResult<()> {
        if !Arc::ptr_eq(&self.grid, disk.grid()) {
            return Err(DiskError::GridMismatch { key: disk.key() });
        }
        let stellar_mass = disk.stellar_mass();
        let current = self
            .loaded
            .as_ref()
            .is_some_and(|l| l.key == disk.key() && l.stellar_mass == stellar_mass);
        if !current {
            self.t_1au = temperature_at_1au(stellar_mass);
            let nu = self.viscosity_profile(stellar_mass);
            let max_step = self.stable_step(&nu);
            self.loaded = Some(Loaded {
                key: disk.key(),
                stellar_mass,
                nu,
                max_step,
            });
        }
        disk.backend = Some(self.id);
        Ok(())
    }

    /// Advance `disk` by `dt` years.
    ///
    /// Does nothing for `dt <= 0` or a dispersed disk. Afterwards the disk is
    /// checked against its dispersal thresholds.
    pub fn evolve(&mut self, disk: &mut Disk, dt: f64) -> DiskResult<()> {
        if !(dt > 0.0) || disk.is_dispersed() {
            return Ok(());
        }
        self.bind(disk)?;
        let Some(loaded) = self.loaded.as_ref() else {
            return Err(DiskError::InvalidArg {
                what: "backend has no disk loaded",
            });
        };

        let wanted = dt / loaded.max_step;
        let n_sub = wanted.ceil().max(1.0);
        if n_sub > self.params.max_substeps as f64 {
            return Err(DiskError::NonConvergence {
                key: disk.key(),
                substeps: n_sub,
                limit: self.params.max_substeps,
            });
        }
        let n_sub = n_sub as usize;
        let h = dt / n_sub as f64;

        let gas_before = disk.gas_mass();
        let evaporated_per_substep = disk.outer_photoevap_rate.max(0.0) * h;
        let mut accreted = 0.0;
        let mut evaporated = 0.0;
        let mut flux = vec![0.0; self.grid.n_cells() + 1];
        for _ in 0..n_sub {
            accreted += diffuse(&self.grid, &loaded.nu, disk, &mut flux, h);
            if evaporated_per_substep > 0.0 {
                evaporated += photoevaporate(&self.grid, disk, evaporated_per_substep);
            }
        }
        disk.photoevap_mass_lost += evaporated;

        if let Some(cell) = disk.sigma.iter().position(|s| !s.is_finite()) {
            return Err(DiskError::NonFinite {
                key: disk.key(),
                cell,
            });
        }

        disk.accreted_mass += accreted;
        if gas_before > 0.0 {
            disk.dust_mass *= (1.0 - accreted / gas_before).max(0.0);
        }
        disk.check_dispersal();
        Ok(())
    }

    /// `nu(r) = alpha c_s^2 / Omega` on the cell centres [AU^2/yr].
    fn viscosity_profile(&self, stellar_mass: f64) -> Vec<f64> {
        let yr_s = units::to_seconds(units::yr(1.0));
        let au_cm = units::au_in_cm();
        // c_s^2 at 1 AU in AU^2/yr^2
        let cs2_1au = constants::K_B_CGS * self.t_1au / (self.params.mu * constants::M_H_CGS)
            * (yr_s / au_cm).powi(2);
        let gm = units::g_au3_msun_yr2() * stellar_mass;
        self.grid
            .centers()
            .iter()
            .map(|&r| {
                let cs2 = cs2_1au / r.sqrt();
                let omega = (gm / (r * r * r)).sqrt();
                self.params.alpha * cs2 / omega
            })
            .collect()
    }

    /// Largest explicit substep keeping every cell's outflow coefficient
    /// below the Courant factor.
    fn stable_step(&self, nu: &[f64]) -> f64 {
        let edges = self.grid.edges();
        let centers = self.grid.centers();
        let areas = self.grid.areas();
        let n = centers.len();
        let mut rate_max: f64 = 0.0;
        for i in 0..n {
            let inner_dx = if i == 0 {
                centers[0] - edges[0]
            } else {
                centers[i] - centers[i - 1]
            };
            let mut geom = edges[i].sqrt() / inner_dx;
            if i + 1 < n {
                geom += edges[i + 1].sqrt() / (centers[i + 1] - centers[i]);
            }
            let rate = 6.0 * PI * centers[i].sqrt() * nu[i] * geom / areas[i];
            rate_max = rate_max.max(rate);
        }
        if rate_max > 0.0 {
            self.params.courant / rate_max
        } else {
            f64::INFINITY
        }
    }
}

/// `T_1AU` for a host of `stellar_mass` MSun [K].
pub fn temperature_at_1au(stellar_mass: f64) -> f64 {
    T_1AU_SUN * stellar_mass.powf(0.25)
}

/// One explicit diffusion substep. Returns the mass accreted through the
/// inner edge [MSun].
fn diffuse(grid: &RadialGrid, nu: &[f64], disk: &mut Disk, flux: &mut [f64], h: f64) -> f64 {
    let edges = grid.edges();
    let centers = grid.centers();
    let areas = grid.areas();
    let n = centers.len();
    let sigma = &mut disk.sigma;

    // torque-like quantity G = nu Sigma r^1/2, zero at the inner edge
    let g = |i: usize, s: &[f64]| nu[i] * s[i] * centers[i].sqrt();

    // outward mass flux through each interface [MSun/yr]
    flux[0] = -6.0 * PI * edges[0].sqrt() * g(0, sigma) / (centers[0] - edges[0]);
    for j in 1..n {
        flux[j] = -6.0 * PI * edges[j].sqrt() * (g(j, sigma) - g(j - 1, sigma))
            / (centers[j] - centers[j - 1]);
    }
    flux[n] = 0.0;

    for i in 0..n {
        sigma[i] -= h * (flux[i + 1] - flux[i]) / areas[i];
        if sigma[i] < disk.sigma_floor {
            sigma[i] = disk.sigma_floor;
        }
    }

    (-flux[0] * h).max(0.0)
}

/// Remove `mass` from the outside in, down to the density floor. Returns what
/// was actually removed.
fn photoevaporate(grid: &RadialGrid, disk: &mut Disk, mass: f64) -> f64 {
    let areas = grid.areas();
    let floor = disk.sigma_floor;
    let mut remaining = mass;
    for (sigma, area) in disk.sigma.iter_mut().zip(areas).rev() {
        if remaining <= 0.0 {
            break;
        }
        let available = (*sigma - floor).max(0.0) * area;
        if available <= 0.0 {
            continue;
        }
        if available > remaining {
            *sigma -= remaining / area;
            remaining = 0.0;
        } else {
            *sigma = floor;
            remaining -= available;
        }
    }
    mass - remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::{DispersalThresholds, DiskInit};

    fn setup(stellar_mass: f64) -> (Arc<RadialGrid>, Disk) {
        let grid = Arc::new(RadialGrid::new(100, 0.05, 2000.0).unwrap());
        let disk = Disk::new(
            DiskInit {
                key: StarKey::new(11),
                radius: 30.0 * stellar_mass.sqrt(),
                gas_mass: 0.1 * stellar_mass,
                stellar_mass,
                thresholds: DispersalThresholds {
                    mass: units::mearth_to_msun(0.03),
                    density: units::g_per_cm2_to_msun_per_au2(1e-5),
                },
            },
            Arc::clone(&grid),
            ViscousParams::default().sigma_floor,
        )
        .unwrap();
        (grid, disk)
    }

    #[test]
    fn temperature_scales_with_quarter_power() {
        assert!((temperature_at_1au(1.0) - 100.0).abs() < 1e-12);
        assert!((temperature_at_1au(16.0) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn evolution_conserves_mass_up_to_accretion() {
        let (grid, mut disk) = setup(1.0);
        let mut code =
            ViscousCode::new(BackendId::from_index(0), grid, ViscousParams::default(), 1.0).unwrap();
        let before = disk.gas_mass();
        code.evolve(&mut disk, 1000.0).unwrap();
        let after = disk.gas_mass();
        assert!(after < before);
        assert!(disk.accreted_mass() > 0.0);
        let balance = (before - after - disk.accreted_mass()).abs() / before;
        assert!(balance < 1e-6, "mass balance off by {balance}");
        assert_eq!(disk.backend(), Some(BackendId::from_index(0)));
    }

    #[test]
    fn viscous_spreading_moves_mass_outward() {
        let (grid, mut disk) = setup(1.0);
        let mut code =
            ViscousCode::new(BackendId::from_index(0), grid, ViscousParams::default(), 1.0).unwrap();
        let r0 = disk.radius();
        for _ in 0..50 {
            code.evolve(&mut disk, 1000.0).unwrap();
        }
        assert!(disk.radius() >= r0);
    }

    #[test]
    fn zero_dt_is_noop() {
        let (grid, mut disk) = setup(0.5);
        let mut code =
            ViscousCode::new(BackendId::from_index(0), grid, ViscousParams::default(), 0.5).unwrap();
        let sigma = disk.surface_density().to_vec();
        code.evolve(&mut disk, 0.0).unwrap();
        assert_eq!(disk.surface_density(), sigma.as_slice());
        assert_eq!(disk.backend(), None);
    }

    #[test]
    fn photoevaporation_removes_outer_gas() {
        let (grid, mut disk) = setup(1.0);
        let mut quiet = disk.clone();
        let mut code =
            ViscousCode::new(BackendId::from_index(0), grid, ViscousParams::default(), 1.0).unwrap();
        disk.outer_photoevap_rate = 1e-6;
        code.evolve(&mut disk, 1000.0).unwrap();
        code.evolve(&mut quiet, 1000.0).unwrap();
        assert!((disk.photoevap_mass_lost() - 1e-3).abs() < 1e-9);
        assert!(disk.gas_mass() < quiet.gas_mass());
    }

    #[test]
    fn backend_choice_does_not_change_result() {
        let (grid, disk) = setup(0.3);
        let mut a = disk.clone();
        let mut b = disk;
        let mut code_a =
            ViscousCode::new(BackendId::from_index(0), Arc::clone(&grid), ViscousParams::default(), 0.3)
                .unwrap();
        let mut code_b =
            ViscousCode::new(BackendId::from_index(1), grid, ViscousParams::default(), 8.0).unwrap();
        code_a.evolve(&mut a, 2000.0).unwrap();
        code_b.evolve(&mut b, 2000.0).unwrap();
        assert_eq!(a.surface_density(), b.surface_density());
    }

    #[test]
    fn foreign_grid_is_rejected() {
        let (_, mut disk) = setup(1.0);
        let other = Arc::new(RadialGrid::new(100, 0.05, 2000.0).unwrap());
        let mut code =
            ViscousCode::new(BackendId::from_index(0), other, ViscousParams::default(), 1.0).unwrap();
        assert!(matches!(
            code.bind(&mut disk),
            Err(DiskError::GridMismatch { .. })
        ));
    }

    #[test]
    fn substep_cap_reports_non_convergence() {
        let (grid, mut disk) = setup(1.0);
        let params = ViscousParams {
            max_substeps: 1,
            ..ViscousParams::default()
        };
        let mut code = ViscousCode::new(BackendId::from_index(0), grid, params, 1.0).unwrap();
        let err = code.evolve(&mut disk, 1e6).unwrap_err();
        assert!(matches!(err, DiskError::NonConvergence { .. }));
    }
}
