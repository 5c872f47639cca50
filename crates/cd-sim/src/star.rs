//! The shared star record.

use cd_core::{StarKey, Vec3};
use cd_disk::{DispersalThresholds, Disk};
use cd_results::{RoleTag, StarRecord};

/// What a star is, as far as radiation and encounters are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarRole {
    /// Luminous and disk-less; a radiation source.
    Bright,
    /// Hosts an active disk.
    Disked,
    /// Its disk is gone. Neither radiates nor is irradiated.
    Dispersed,
}

impl From<StarRole> for RoleTag {
    fn from(role: StarRole) -> Self {
        match role {
            StarRole::Bright => RoleTag::Bright,
            StarRole::Disked => RoleTag::Disked,
            StarRole::Dispersed => RoleTag::Dispersed,
        }
    }
}

impl From<RoleTag> for StarRole {
    fn from(tag: RoleTag) -> Self {
        match tag {
            RoleTag::Bright => StarRole::Bright,
            RoleTag::Disked => StarRole::Disked,
            RoleTag::Dispersed => StarRole::Dispersed,
        }
    }
}

/// One cluster member with its disk bookkeeping.
///
/// Units: pc, km/s, MSun, AU, yr, G0. `mass` is the gravitating mass
/// (star plus disk). `collisional_radius` only ever shrinks.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    key: StarKey,
    pub role: StarRole,
    pub position: Vec3,
    pub velocity: Vec3,
    pub stellar_mass: f64,
    pub mass: f64,
    /// [RSun]
    pub stellar_radius: f64,
    collisional_radius: f64,
    pub disk_radius: f64,
    pub disk_gas_mass: f64,
    pub disk_dust_mass: f64,
    pub disk_mass: f64,
    pub initial_disk_mass: f64,
    pub dispersed_mass_threshold: f64,
    /// [MSun/AU^2]
    pub dispersed_density_threshold: f64,
    pub total_radiation: f64,
    /// [MSun/yr]
    pub photoevap_mdot: f64,
    pub cumulative_photoevap_mass_loss: f64,
    pub truncation_mass_loss: f64,
    pub cumulative_truncation_mass_loss: f64,
    pub encounters: u32,
    pub last_encounter: Option<f64>,
    pub dispersal_time: Option<f64>,
}

impl Star {
    fn empty(key: StarKey, role: StarRole, stellar_mass: f64, collisional_radius: f64) -> Self {
        Self {
            key,
            role,
            position: Vec3::zeros(),
            velocity: Vec3::zeros(),
            stellar_mass,
            mass: stellar_mass,
            stellar_radius: 0.0,
            collisional_radius,
            disk_radius: 0.0,
            disk_gas_mass: 0.0,
            disk_dust_mass: 0.0,
            disk_mass: 0.0,
            initial_disk_mass: 0.0,
            dispersed_mass_threshold: 0.0,
            dispersed_density_threshold: 0.0,
            total_radiation: 0.0,
            photoevap_mdot: 0.0,
            cumulative_photoevap_mass_loss: 0.0,
            truncation_mass_loss: 0.0,
            cumulative_truncation_mass_loss: 0.0,
            encounters: 0,
            last_encounter: None,
            dispersal_time: None,
        }
    }

    /// A luminous, disk-less star.
    pub fn bright(key: StarKey, stellar_mass: f64, collisional_radius: f64) -> Self {
        Self::empty(key, StarRole::Bright, stellar_mass, collisional_radius)
    }

    /// A star hosting `disk`. Disk fields are copied from it.
    pub fn disked(key: StarKey, stellar_mass: f64, collisional_radius: f64, disk: &Disk) -> Self {
        let thresholds = disk.thresholds();
        let mut star = Self::empty(key, StarRole::Disked, stellar_mass, collisional_radius);
        star.initial_disk_mass = disk.mass();
        star.dispersed_mass_threshold = thresholds.mass;
        star.dispersed_density_threshold = thresholds.density;
        star.sync_disk_fields(disk);
        star
    }

    pub fn key(&self) -> StarKey {
        self.key
    }

    /// [pc]
    pub fn collisional_radius(&self) -> f64 {
        self.collisional_radius
    }

    pub fn is_bright(&self) -> bool {
        self.role == StarRole::Bright
    }

    pub fn is_disked(&self) -> bool {
        self.role == StarRole::Disked
    }

    pub fn thresholds(&self) -> DispersalThresholds {
        DispersalThresholds {
            mass: self.dispersed_mass_threshold,
            density: self.dispersed_density_threshold,
        }
    }

    /// Replace the collisional radius if `radius` is smaller.
    ///
    /// Returns whether the radius changed.
    pub fn shrink_collisional_radius(&mut self, radius: f64) -> bool {
        if radius < self.collisional_radius {
            self.collisional_radius = radius;
            true
        } else {
            false
        }
    }

    /// Copy radius and masses from the disk and update the gravitating mass.
    pub fn sync_disk_fields(&mut self, disk: &Disk) {
        self.disk_radius = disk.radius();
        self.disk_gas_mass = disk.gas_mass();
        self.disk_dust_mass = disk.dust_mass();
        self.disk_mass = disk.mass();
        self.mass = self.stellar_mass + self.disk_mass;
    }

    /// Pull disk state onto the star after integration.
    ///
    /// A star whose disk dispersed becomes [`StarRole::Dispersed`] with
    /// `dispersal_time = time` the first time this is seen.
    pub fn sync_from_disk(&mut self, disk: &Disk, time: f64) {
        if self.role != StarRole::Disked {
            return;
        }
        self.sync_disk_fields(disk);
        if disk.is_dispersed() {
            self.role = StarRole::Dispersed;
            self.dispersal_time.get_or_insert(time);
        }
    }

    pub fn to_record(&self) -> StarRecord {
        StarRecord {
            key: self.key,
            role: self.role.into(),
            position_pc: self.position.into(),
            velocity_kms: self.velocity.into(),
            stellar_mass: self.stellar_mass,
            mass: self.mass,
            stellar_radius_rsun: self.stellar_radius,
            collisional_radius_pc: self.collisional_radius,
            disk_radius_au: self.disk_radius,
            disk_gas_mass: self.disk_gas_mass,
            disk_dust_mass: self.disk_dust_mass,
            disk_mass: self.disk_mass,
            initial_disk_mass: self.initial_disk_mass,
            dispersed_mass_threshold: self.dispersed_mass_threshold,
            dispersed_density_threshold: self.dispersed_density_threshold,
            total_radiation_g0: self.total_radiation,
            photoevap_mdot: self.photoevap_mdot,
            cumulative_photoevap_mass_loss: self.cumulative_photoevap_mass_loss,
            truncation_mass_loss: self.truncation_mass_loss,
            cumulative_truncation_mass_loss: self.cumulative_truncation_mass_loss,
            encounters: self.encounters,
            last_encounter_yr: self.last_encounter,
            dispersal_time_yr: self.dispersal_time,
        }
    }

    pub fn from_record(record: &StarRecord) -> Self {
        Self {
            key: record.key,
            role: record.role.into(),
            position: Vec3::from(record.position_pc),
            velocity: Vec3::from(record.velocity_kms),
            stellar_mass: record.stellar_mass,
            mass: record.mass,
            stellar_radius: record.stellar_radius_rsun,
            collisional_radius: record.collisional_radius_pc,
            disk_radius: record.disk_radius_au,
            disk_gas_mass: record.disk_gas_mass,
            disk_dust_mass: record.disk_dust_mass,
            disk_mass: record.disk_mass,
            initial_disk_mass: record.initial_disk_mass,
            dispersed_mass_threshold: record.dispersed_mass_threshold,
            dispersed_density_threshold: record.dispersed_density_threshold,
            total_radiation: record.total_radiation_g0,
            photoevap_mdot: record.photoevap_mdot,
            cumulative_photoevap_mass_loss: record.cumulative_photoevap_mass_loss,
            truncation_mass_loss: record.truncation_mass_loss,
            cumulative_truncation_mass_loss: record.cumulative_truncation_mass_loss,
            encounters: record.encounters,
            last_encounter: record.last_encounter_yr,
            dispersal_time: record.dispersal_time_yr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collisional_radius_never_grows() {
        let mut star = Star::bright(StarKey::new(1), 3.0, 0.02);
        assert!(!star.shrink_collisional_radius(0.05));
        assert_eq!(star.collisional_radius(), 0.02);
        assert!(star.shrink_collisional_radius(0.01));
        assert_eq!(star.collisional_radius(), 0.01);
    }

    #[test]
    fn record_round_trip_keeps_role_and_history() {
        let mut star = Star::bright(StarKey::new(9), 0.4, 0.02);
        star.role = StarRole::Dispersed;
        star.position = Vec3::new(0.1, 0.2, 0.3);
        star.velocity = Vec3::new(-1.0, 0.5, 0.0);
        star.encounters = 2;
        star.last_encounter = Some(3000.0);
        star.dispersal_time = Some(4000.0);
        let back = Star::from_record(&star.to_record());
        assert_eq!(back, star);
    }
}
