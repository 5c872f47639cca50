//! Run configuration schema.
//!
//! Every field has a default, so an empty file is a valid configuration.
//! Units are in the field names.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub cluster: ClusterDef,
    pub disks: DisksDef,
    pub time: TimeDef,
    pub parallel: ParallelDef,
    pub encounters: EncountersDef,
    pub output: OutputDef,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DistributionDef {
    #[default]
    Plummer,
    Uniform,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterDef {
    pub n_stars: usize,
    pub virial_radius_pc: f64,
    pub virial_ratio: f64,
    pub distribution: DistributionDef,
    pub seed: u64,
    /// Upper mass limit of the IMF [MSun]
    pub max_stellar_mass: f64,
    /// Stars above this mass are bright and carry no disk [MSun]
    pub bright_mass_threshold: f64,
    pub initial_collisional_radius_pc: f64,
    /// Plummer softening of the gravity code [AU]
    pub softening_au: f64,
    /// Place the cluster this far from the galactic centre in a background
    /// potential. No potential when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub galactic_distance_pc: Option<f64>,
}

impl Default for ClusterDef {
    fn default() -> Self {
        Self {
            n_stars: 100,
            virial_radius_pc: 0.5,
            virial_ratio: 0.5,
            distribution: DistributionDef::Plummer,
            seed: 1,
            max_stellar_mass: 100.0,
            bright_mass_threshold: 1.9,
            initial_collisional_radius_pc: 0.02,
            softening_au: 100.0,
            galactic_distance_pc: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisksDef {
    pub alpha: f64,
    pub mu: f64,
    pub n_cells: usize,
    pub r_min_au: f64,
    pub r_max_au: f64,
    /// Initial radius is `radius_coefficient_au * sqrt(M / MSun)`
    pub radius_coefficient_au: f64,
    /// Initial disk mass as a fraction of the stellar mass
    pub mass_fraction: f64,
    pub dispersed_mass_mearth: f64,
    pub dispersed_density_g_cm2: f64,
    /// Directory holding the FRIED `*.dat` files
    pub fried_grid_path: String,
}

impl Default for DisksDef {
    fn default() -> Self {
        Self {
            alpha: 5e-3,
            mu: 2.33,
            n_cells: 100,
            r_min_au: 0.05,
            r_max_au: 2000.0,
            radius_coefficient_au: 30.0,
            mass_fraction: 0.1,
            dispersed_mass_mearth: 0.03,
            dispersed_density_g_cm2: 1e-5,
            fried_grid_path: "data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeDef {
    pub start_yr: f64,
    pub end_yr: f64,
    pub dt_yr: f64,
    pub save_interval_yr: f64,
}

impl Default for TimeDef {
    fn default() -> Self {
        Self {
            start_yr: 0.0,
            end_yr: 2.0e6,
            dt_yr: 1000.0,
            save_interval_yr: 5000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParallelDef {
    /// Threads in the worker pool
    pub workers: usize,
    /// Viscous backends; clamped to the number of disks
    pub backends: usize,
}

impl Default for ParallelDef {
    fn default() -> Self {
        Self {
            workers: 1,
            backends: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EncountersDef {
    pub truncation_parameter: f64,
    pub mass_factor_exponent: f64,
    pub dispersal_radius_au: f64,
    pub max_per_step: usize,
}

impl Default for EncountersDef {
    fn default() -> Self {
        Self {
            truncation_parameter: 1.0 / 3.0,
            mass_factor_exponent: 0.2,
            dispersal_radius_au: 0.1,
            max_per_step: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputDef {
    pub save_path: String,
    pub run_number: u32,
    /// Continue from the latest snapshot of this run
    pub restart: bool,
}

impl Default for OutputDef {
    fn default() -> Self {
        Self {
            save_path: ".".to_string(),
            run_number: 0,
            restart: false,
        }
    }
}
