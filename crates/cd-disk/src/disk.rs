//! Per-star disk state.

use std::sync::Arc;

use cd_core::{BackendId, StarKey};

use crate::error::{DiskError, DiskResult};
use crate::grid::RadialGrid;

/// Initial dust-to-gas mass ratio.
pub const DUST_TO_GAS: f64 = 0.01;

/// Fraction of the gas mass enclosed by the disk radius.
const RADIUS_MASS_FRACTION: f64 = 0.99;

/// Below either threshold the disk is considered gone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersalThresholds {
    /// Gas mass [MSun]
    pub mass: f64,
    /// Mean surface density inside the disk radius [MSun/AU^2]
    pub density: f64,
}

/// Parameters to create a disk.
#[derive(Debug, Clone, Copy)]
pub struct DiskInit {
    pub key: StarKey,
    /// Radius enclosing 99% of the gas [AU]
    pub radius: f64,
    /// Gas mass [MSun]
    pub gas_mass: f64,
    /// Host star mass [MSun]
    pub stellar_mass: f64,
    pub thresholds: DispersalThresholds,
}

/// Radius and total mass left after a truncation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Truncation {
    /// [AU]
    pub radius: f64,
    /// Gas plus dust [MSun]
    pub mass: f64,
}

/// A viscously evolving gas disk around one star.
///
/// The surface density lives on the shared grid. `dispersed` only ever goes
/// from false to true; once set the disk keeps its last state for output and
/// backends leave it alone.
#[derive(Debug, Clone)]
pub struct Disk {
    key: StarKey,
    grid: Arc<RadialGrid>,
    /// Gas surface density per cell [MSun/AU^2]
    pub(crate) sigma: Vec<f64>,
    pub(crate) sigma_floor: f64,
    pub(crate) dust_mass: f64,
    stellar_mass: f64,
    thresholds: DispersalThresholds,
    dispersed: bool,
    /// External photoevaporation rate applied at the outer edge [MSun/yr].
    /// Set once per step before integration.
    pub outer_photoevap_rate: f64,
    pub(crate) accreted_mass: f64,
    pub(crate) photoevap_mass_lost: f64,
    pub(crate) backend: Option<BackendId>,
}

impl Disk {
    /// Create a disk with a Lynden-Bell & Pringle similarity profile
    /// `sigma ~ exp(-r/r_c) / r`, normalised to `init.gas_mass` on the grid.
    ///
    /// `r_c` is chosen so that 99% of the mass sits inside `init.radius`.
    pub fn new(init: DiskInit, grid: Arc<RadialGrid>, sigma_floor: f64) -> DiskResult<Self> {
        if !(init.radius > 0.0 && init.radius.is_finite()) {
            return Err(DiskError::InvalidArg {
                what: "disk radius must be positive",
            });
        }
        if !(init.gas_mass > 0.0 && init.gas_mass.is_finite()) {
            return Err(DiskError::InvalidArg {
                what: "disk mass must be positive",
            });
        }
        if init.stellar_mass <= 0.0 {
            return Err(DiskError::InvalidArg {
                what: "host stellar mass must be positive",
            });
        }
        if sigma_floor < 0.0 {
            return Err(DiskError::InvalidArg {
                what: "density floor must be non-negative",
            });
        }

        let r_c = init.radius / (1.0 / (1.0 - RADIUS_MASS_FRACTION)).ln();
        let shape: Vec<f64> = grid
            .centers()
            .iter()
            .map(|&r| (-r / r_c).exp() * r_c / r)
            .collect();
        let norm: f64 = shape
            .iter()
            .zip(grid.areas())
            .map(|(s, a)| s * a)
            .sum();
        if norm <= 0.0 {
            return Err(DiskError::InvalidArg {
                what: "disk radius is not resolved by the grid",
            });
        }
        let sigma = shape
            .iter()
            .map(|s| (s * init.gas_mass / norm).max(sigma_floor))
            .collect();

        Ok(Self {
            key: init.key,
            grid,
            sigma,
            sigma_floor,
            dust_mass: DUST_TO_GAS * init.gas_mass,
            stellar_mass: init.stellar_mass,
            thresholds: init.thresholds,
            dispersed: false,
            outer_photoevap_rate: 0.0,
            accreted_mass: 0.0,
            photoevap_mass_lost: 0.0,
            backend: None,
        })
    }

    pub fn key(&self) -> StarKey {
        self.key
    }

    pub fn grid(&self) -> &Arc<RadialGrid> {
        &self.grid
    }

    pub fn surface_density(&self) -> &[f64] {
        &self.sigma
    }

    pub fn stellar_mass(&self) -> f64 {
        self.stellar_mass
    }

    pub fn thresholds(&self) -> DispersalThresholds {
        self.thresholds
    }

    pub fn is_dispersed(&self) -> bool {
        self.dispersed
    }

    /// Backend this disk was last bound to.
    pub fn backend(&self) -> Option<BackendId> {
        self.backend
    }

    /// Gas mass accreted onto the star so far [MSun].
    pub fn accreted_mass(&self) -> f64 {
        self.accreted_mass
    }

    /// Gas mass removed by external photoevaporation so far [MSun].
    pub fn photoevap_mass_lost(&self) -> f64 {
        self.photoevap_mass_lost
    }

    /// Gas mass [MSun].
    pub fn gas_mass(&self) -> f64 {
        self.sigma
            .iter()
            .zip(self.grid.areas())
            .map(|(s, a)| s * a)
            .sum()
    }

    /// Dust mass [MSun].
    pub fn dust_mass(&self) -> f64 {
        self.dust_mass
    }

    /// Gas plus dust [MSun].
    pub fn mass(&self) -> f64 {
        self.gas_mass() + self.dust_mass
    }

    /// Outer edge of the cell where the enclosed gas mass reaches 99%.
    ///
    /// Only gas above the density floor counts; a disk holding nothing but
    /// floor gas has radius 0.
    pub fn radius(&self) -> f64 {
        let excess: Vec<f64> = self
            .sigma
            .iter()
            .zip(self.grid.areas())
            .map(|(s, a)| (s - self.sigma_floor).max(0.0) * a)
            .collect();
        let total: f64 = excess.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        let target = RADIUS_MASS_FRACTION * total;
        let mut enclosed = 0.0;
        for (i, m) in excess.iter().enumerate() {
            enclosed += m;
            if enclosed >= target {
                return self.grid.edges()[i + 1];
            }
        }
        self.grid.r_max()
    }

    /// Whether at least one cell lies entirely inside `radius` (AU).
    pub fn resolves(&self, radius: f64) -> bool {
        self.grid.edges()[1] <= radius
    }

    /// Remove all gas outside `new_radius` (AU).
    ///
    /// Every cell whose outer interface lies beyond `new_radius` drops to the
    /// density floor, so the resulting radius never exceeds `new_radius`. It is
    /// 0 when no cell fits inside `new_radius`. Dust is removed in proportion
    /// to the gas.
    pub fn truncate(&mut self, new_radius: f64) -> Truncation {
        let gas_before = self.gas_mass();
        let edges = self.grid.edges();
        let areas = self.grid.areas();
        let mut removed = 0.0;
        for (i, sigma) in self.sigma.iter_mut().enumerate() {
            if edges[i + 1] > new_radius && *sigma > self.sigma_floor {
                removed += (*sigma - self.sigma_floor) * areas[i];
                *sigma = self.sigma_floor;
            }
        }
        if gas_before > 0.0 {
            self.dust_mass *= (1.0 - removed / gas_before).max(0.0);
        }

        Truncation {
            radius: self.radius(),
            mass: self.mass(),
        }
    }

    /// Mark the disk dispersed. There is no way back.
    pub fn disperse(&mut self) {
        self.dispersed = true;
    }

    /// Drop all gas and dust.
    pub fn clear_mass(&mut self) {
        self.sigma.iter_mut().for_each(|s| *s = 0.0);
        self.dust_mass = 0.0;
    }

    /// Flag the disk as dispersed if it fell below either threshold.
    ///
    /// Returns the (possibly unchanged) dispersal state.
    pub fn check_dispersal(&mut self) -> bool {
        if self.dispersed {
            return true;
        }
        let gas = self.gas_mass();
        let radius = self.radius();
        let mean_density = if radius > 0.0 {
            gas / (std::f64::consts::PI * radius * radius)
        } else {
            0.0
        };
        if gas < self.thresholds.mass || mean_density < self.thresholds.density {
            self.disperse();
        }
        self.dispersed
    }
}
