//! Persisted data types.

use cd_core::StarKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTag {
    Bright,
    Disked,
    Dispersed,
}

/// One star with its disk bookkeeping, as written to a snapshot.
///
/// Units: pc, km/s, MSun, AU, yr, G0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarRecord {
    pub key: StarKey,
    pub role: RoleTag,
    pub position_pc: [f64; 3],
    pub velocity_kms: [f64; 3],
    pub stellar_mass: f64,
    pub mass: f64,
    pub stellar_radius_rsun: f64,
    pub collisional_radius_pc: f64,
    pub disk_radius_au: f64,
    pub disk_gas_mass: f64,
    pub disk_dust_mass: f64,
    pub disk_mass: f64,
    pub initial_disk_mass: f64,
    pub dispersed_mass_threshold: f64,
    /// [MSun/AU^2]
    pub dispersed_density_threshold: f64,
    pub total_radiation_g0: f64,
    /// [MSun/yr]
    pub photoevap_mdot: f64,
    pub cumulative_photoevap_mass_loss: f64,
    pub truncation_mass_loss: f64,
    pub cumulative_truncation_mass_loss: f64,
    pub encounters: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_encounter_yr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispersal_time_yr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub time_yr: f64,
    pub n_stars: usize,
    pub stars: Vec<StarRecord>,
}

impl Snapshot {
    pub fn new(time_yr: f64, stars: Vec<StarRecord>) -> Self {
        Self {
            time_yr,
            n_stars: stars.len(),
            stars,
        }
    }

    /// Stars that still host an active disk.
    pub fn active_disks(&self) -> usize {
        self.stars
            .iter()
            .filter(|s| s.role == RoleTag::Disked)
            .count()
    }
}

/// Per-step energy bookkeeping of the gravity code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsRecord {
    pub time_yr: f64,
    /// `E / E_initial - 1`
    pub energy_error: f64,
    /// `-E_kin / E_pot`
    pub virial_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_number: u32,
    pub n_stars: usize,
    pub timestamp: String,
    /// Snapshot time the run was restarted from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restarted_from_yr: Option<f64>,
    /// Echo of the run configuration.
    pub config: serde_json::Value,
}
