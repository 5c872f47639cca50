//! Initial cluster state, drawn fresh or restored from a snapshot.

use std::collections::HashMap;

use cd_config::{DisksDef, DistributionDef, RunConfig};
use cd_core::{StarKey, Vec3, units};
use cd_disk::{DispersalThresholds, Disk, DiskInit, ViscousCode, ViscousParams};
use cd_dynamics::initial::{ensure_bright_star, sample_kroupa_masses, sample_positions, scale_to_standard};
use cd_dynamics::{BackgroundPotential, Distribution};
use cd_results::Snapshot;
use cd_sim::{Star, setup_disks_and_codes};
use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use tracing::info;

use crate::error::{AppError, AppResult};

/// Stars, disks and disk backends a cluster starts from.
pub struct InitialState {
    pub stars: Vec<Star>,
    pub disks: Vec<Disk>,
    pub backends: Vec<ViscousCode>,
    /// [yr]
    pub start_time: f64,
    /// Time of the snapshot this state was restored from [yr]
    pub restored_from: Option<f64>,
}

pub fn viscous_params(disks: &DisksDef) -> ViscousParams {
    ViscousParams {
        alpha: disks.alpha,
        mu: disks.mu,
        ..ViscousParams::default()
    }
}

fn thresholds(disks: &DisksDef) -> DispersalThresholds {
    DispersalThresholds {
        mass: units::mearth_to_msun(disks.dispersed_mass_mearth),
        density: units::g_per_cm2_to_msun_per_au2(disks.dispersed_density_g_cm2),
    }
}

fn distribution(def: DistributionDef) -> Distribution {
    match def {
        DistributionDef::Plummer => Distribution::Plummer,
        DistributionDef::Uniform => Distribution::Uniform,
    }
}

fn build_disks(config: &RunConfig, inits: &[DiskInit]) -> AppResult<(Vec<Disk>, Vec<ViscousCode>)> {
    let disks = &config.disks;
    Ok(setup_disks_and_codes(
        inits,
        config.parallel.backends,
        disks.n_cells,
        disks.r_min_au,
        disks.r_max_au,
        viscous_params(disks),
    )?)
}

/// Draw a new cluster from `config`.
///
/// Stars above the bright-mass threshold carry no disk. Every other star gets
/// a disk of radius `radius_coefficient_au * sqrt(M)` holding
/// `mass_fraction * M` of gas. The same seed gives the same cluster.
pub fn fresh_state(config: &RunConfig) -> AppResult<InitialState> {
    let cluster = &config.cluster;
    let mut rng = ChaChaRng::seed_from_u64(cluster.seed);

    let mut masses = sample_kroupa_masses(cluster.n_stars, cluster.max_stellar_mass, &mut rng)?;
    ensure_bright_star(&mut masses, cluster.bright_mass_threshold, &mut rng);
    let mut bodies = sample_positions(distribution(cluster.distribution), &masses, &mut rng);
    scale_to_standard(&mut bodies, cluster.virial_radius_pc, cluster.virial_ratio)?;

    if let Some(distance) = cluster.galactic_distance_pc {
        let v_circ = BackgroundPotential::galactic().circular_velocity(distance);
        let offset = Vec3::new(distance, 0.0, 0.0);
        let drift = Vec3::new(0.0, v_circ, 0.0);
        for body in &mut bodies {
            body.position += offset;
            body.velocity += drift;
        }
        info!(distance_pc = distance, v_circ_kms = v_circ, "cluster placed in the galactic potential");
    }

    let thresholds = thresholds(&config.disks);
    let keys: Vec<StarKey> = (0..bodies.len() as u64).map(StarKey::new).collect();
    let inits: Vec<DiskInit> = bodies
        .iter()
        .zip(&keys)
        .filter(|(body, _)| body.mass <= cluster.bright_mass_threshold)
        .map(|(body, &key)| DiskInit {
            key,
            radius: config.disks.radius_coefficient_au * body.mass.sqrt(),
            gas_mass: config.disks.mass_fraction * body.mass,
            stellar_mass: body.mass,
            thresholds,
        })
        .collect();
    let (disks, backends) = build_disks(config, &inits)?;

    let by_key: HashMap<StarKey, &Disk> = disks.iter().map(|d| (d.key(), d)).collect();
    let stars: Vec<Star> = bodies
        .iter()
        .zip(&keys)
        .map(|(body, &key)| {
            let r_coll = cluster.initial_collisional_radius_pc;
            let mut star = match by_key.get(&key) {
                Some(disk) => Star::disked(key, body.mass, r_coll, disk),
                None => Star::bright(key, body.mass, r_coll),
            };
            star.position = body.position;
            star.velocity = body.velocity;
            star
        })
        .collect();

    info!(
        stars = stars.len(),
        bright = stars.iter().filter(|s| s.is_bright()).count(),
        disks = disks.len(),
        total_mass = masses.iter().sum::<f64>(),
        "initial cluster drawn"
    );
    Ok(InitialState {
        stars,
        disks,
        backends,
        start_time: config.time.start_yr,
        restored_from: None,
    })
}

/// Rebuild the cluster saved in `snapshot`.
///
/// Disks of disked stars are rebuilt from their saved radius and gas mass.
/// Dispersed stars get no disk back.
pub fn restored_state(config: &RunConfig, snapshot: &Snapshot) -> AppResult<InitialState> {
    if snapshot.stars.len() < 2 {
        return Err(AppError::InvalidInput(format!(
            "snapshot at t = {} yr holds {} stars",
            snapshot.time_yr,
            snapshot.stars.len()
        )));
    }
    let mut stars: Vec<Star> = snapshot.stars.iter().map(Star::from_record).collect();

    let inits: Vec<DiskInit> = stars
        .iter()
        .filter(|s| s.is_disked())
        .map(|s| DiskInit {
            key: s.key(),
            radius: s.disk_radius,
            gas_mass: s.disk_gas_mass,
            stellar_mass: s.stellar_mass,
            thresholds: s.thresholds(),
        })
        .collect();
    let (disks, backends) = build_disks(config, &inits)?;

    let by_key: HashMap<StarKey, &Disk> = disks.iter().map(|d| (d.key(), d)).collect();
    for star in &mut stars {
        if let Some(disk) = by_key.get(&star.key()) {
            star.sync_disk_fields(disk);
        }
    }

    info!(
        time_yr = snapshot.time_yr,
        stars = stars.len(),
        active_disks = disks.len(),
        "cluster restored from snapshot"
    );
    Ok(InitialState {
        stars,
        disks,
        backends,
        start_time: snapshot.time_yr,
        restored_from: Some(snapshot.time_yr),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> RunConfig {
        let mut config = RunConfig::default();
        config.cluster.n_stars = 20;
        config.cluster.seed = 7;
        config.disks.n_cells = 40;
        config.parallel.backends = 3;
        config
    }

    #[test]
    fn fresh_state_is_reproducible() {
        let config = small_config();
        let a = fresh_state(&config).unwrap();
        let b = fresh_state(&config).unwrap();
        assert_eq!(a.stars.len(), 20);
        for (sa, sb) in a.stars.iter().zip(&b.stars) {
            assert_eq!(sa.to_record(), sb.to_record());
        }
    }

    #[test]
    fn fresh_state_has_a_bright_star_and_disks_for_the_rest() {
        let config = small_config();
        let state = fresh_state(&config).unwrap();
        let bright = state.stars.iter().filter(|s| s.is_bright()).count();
        assert!(bright >= 1);
        assert_eq!(state.disks.len(), state.stars.len() - bright);
        assert_eq!(state.backends.len(), 3.min(state.disks.len()));
        for star in state.stars.iter().filter(|s| s.is_disked()) {
            assert!(star.stellar_mass <= config.cluster.bright_mass_threshold);
            assert!((star.mass - star.stellar_mass - star.disk_mass).abs() < 1e-12);
            assert!(star.disk_gas_mass > 0.0);
        }
    }

    #[test]
    fn galactic_offset_moves_the_centre_of_mass() {
        let mut config = small_config();
        config.cluster.galactic_distance_pc = Some(8000.0);
        let state = fresh_state(&config).unwrap();
        let total: f64 = state.stars.iter().map(|s| s.stellar_mass).sum();
        let com = state
            .stars
            .iter()
            .fold(Vec3::zeros(), |acc, s| acc + s.position * s.stellar_mass)
            / total;
        assert!((com.x - 8000.0).abs() < 10.0);
        let vy = state.stars.iter().map(|s| s.velocity.y * s.stellar_mass).sum::<f64>() / total;
        assert!(vy > 200.0);
    }

    #[test]
    fn restore_rebuilds_only_active_disks() {
        let config = small_config();
        let state = fresh_state(&config).unwrap();
        let mut records: Vec<_> = state.stars.iter().map(Star::to_record).collect();
        let victim = records
            .iter()
            .position(|r| r.role == cd_results::RoleTag::Disked)
            .unwrap();
        records[victim].role = cd_results::RoleTag::Dispersed;
        records[victim].dispersal_time_yr = Some(3000.0);
        let snapshot = Snapshot::new(5000.0, records);

        let restored = restored_state(&config, &snapshot).unwrap();
        assert_eq!(restored.start_time, 5000.0);
        assert_eq!(restored.restored_from, Some(5000.0));
        assert_eq!(restored.disks.len(), state.disks.len() - 1);
        let key = snapshot.stars[victim].key;
        assert!(restored.disks.iter().all(|d| d.key() != key));
        let star = restored.stars.iter().find(|s| s.key() == key).unwrap();
        assert_eq!(star.dispersal_time, Some(3000.0));
    }

    #[test]
    fn restore_needs_a_cluster() {
        let config = small_config();
        let snapshot = Snapshot::new(0.0, Vec::new());
        assert!(matches!(
            restored_state(&config, &snapshot),
            Err(AppError::InvalidInput(_))
        ));
    }
}
