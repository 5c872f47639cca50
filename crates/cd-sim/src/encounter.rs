//! Close stellar encounters: periastron, classification and disk truncation.
//!
//! A pair reported by the gravity code goes through three stages: its
//! periastron is computed from the current relative orbit, the pair is
//! classified by which members host a disk, and each disk is truncated to a
//! fraction of the periastron that depends on the mass ratio. Both members get
//! their collisional radius shrunk below half the periastron, so the same pair
//! is not reported again on its way out.

use cd_core::units;
use cd_core::{StarKey, Vec3};
use cd_disk::Disk;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::star::{Star, StarRole};

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EncounterError {
    #[error("Degenerate two-body orbit: {what}")]
    DegenerateOrbit { what: &'static str },
}

/// Which members of a pair host an active disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterCase {
    DiskDisk,
    DiskOther,
    OtherDisk,
    OtherOther,
}

pub fn classify(first: StarRole, second: StarRole) -> EncounterCase {
    match (first == StarRole::Disked, second == StarRole::Disked) {
        (true, true) => EncounterCase::DiskDisk,
        (true, false) => EncounterCase::DiskOther,
        (false, true) => EncounterCase::OtherDisk,
        (false, false) => EncounterCase::OtherOther,
    }
}

/// The disk of one encounter member, if it has one.
#[derive(Debug)]
pub enum DiskSlot<'a> {
    NoDisk,
    HasDisk(&'a mut Disk),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncounterParams {
    /// Truncation radius in units of the periastron for equal masses
    pub truncation_parameter: f64,
    /// Exponent of the mass ratio in the truncation radius
    pub mass_factor_exponent: f64,
    /// Truncation below this radius disperses the disk [AU]
    pub dispersal_radius_au: f64,
    /// New collisional radius in units of the periastron
    pub collisional_radius_factor: f64,
}

impl Default for EncounterParams {
    fn default() -> Self {
        Self {
            truncation_parameter: 1.0 / 3.0,
            mass_factor_exponent: 0.2,
            dispersal_radius_au: 0.1,
            collisional_radius_factor: 0.49,
        }
    }
}

/// What happened to one member's disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiskOutcome {
    NoDisk,
    /// Disk already smaller than the truncation radius.
    Untouched,
    Truncated { radius: f64, mass_lost: f64 },
    Dispersed { mass_lost: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncounterOutcome {
    pub keys: [StarKey; 2],
    pub case: EncounterCase,
    /// [AU]; `None` when the orbit was degenerate and nothing was truncated.
    pub periastron_au: Option<f64>,
    pub disks: [DiskOutcome; 2],
}

/// Periastron [AU] of the relative two-body orbit.
///
/// Positions in pc, velocities in km/s, `total_mass` in MSun.
pub fn periastron_distance(
    pos0: &Vec3,
    vel0: &Vec3,
    pos1: &Vec3,
    vel1: &Vec3,
    total_mass: f64,
) -> Result<f64, EncounterError> {
    fn degenerate(what: &'static str) -> Result<f64, EncounterError> {
        Err(EncounterError::DegenerateOrbit { what })
    }

    let mu = units::g_au3_msun_yr2() * total_mass;
    if !(mu > 0.0 && mu.is_finite()) {
        return degenerate("non-positive total mass");
    }
    let r = (pos0 - pos1) * units::pc_in_au();
    let v = (vel0 - vel1) * units::kms_to_au_per_yr(1.0);
    let r_len = r.norm();
    if !(r_len > 0.0 && r_len.is_finite()) {
        return degenerate("zero separation");
    }

    let h = r.cross(&v).norm();
    let p = h * h / mu;
    if !(p > 0.0 && p.is_finite()) {
        return degenerate("zero angular momentum");
    }

    let energy = 0.5 * v.norm_squared() - mu / r_len;
    let e = if energy.abs() <= 1e-12 * mu / r_len {
        1.0
    } else {
        let a = -mu / (2.0 * energy);
        let e2 = 1.0 - p / a;
        if e2 < -1e-12 {
            return degenerate("negative squared eccentricity");
        }
        e2.max(0.0).sqrt()
    };

    let q = p / (1.0 + e);
    if !(q > 0.0 && q.is_finite()) {
        return degenerate("non-finite periastron");
    }
    Ok(q)
}

/// Truncation radius [AU] of a disk around a star of `mass_self` passing one
/// of `mass_other` at `periastron` AU.
pub fn truncation_radius(periastron: f64, mass_self: f64, mass_other: f64, params: &EncounterParams) -> f64 {
    periastron * params.truncation_parameter * (mass_self / mass_other).powf(params.mass_factor_exponent)
}

/// Resolve one encounter in place.
///
/// Disks must belong to the matching stars. Stars without a disk only get
/// their collisional radius shrunk.
pub fn resolve_encounter(
    stars: [&mut Star; 2],
    disks: [DiskSlot<'_>; 2],
    time: f64,
    params: &EncounterParams,
) -> EncounterOutcome {
    let [s0, s1] = stars;
    let keys = [s0.key(), s1.key()];
    let case = classify(s0.role, s1.role);
    let masses = [s0.mass, s1.mass];

    let periastron = periastron_distance(
        &s0.position,
        &s0.velocity,
        &s1.position,
        &s1.velocity,
        masses[0] + masses[1],
    );
    let periastron_au = match periastron {
        Ok(q) => q,
        Err(e) => {
            let separation = (s0.position - s1.position).norm();
            warn!(a = %keys[0], b = %keys[1], t_yr = time, error = %e, "skipping truncation");
            for star in [&mut *s0, &mut *s1] {
                star.shrink_collisional_radius(params.collisional_radius_factor * separation);
                star.encounters += 1;
            }
            return EncounterOutcome {
                keys,
                case,
                periastron_au: None,
                disks: [disk_outcome_none(&disks[0]), disk_outcome_none(&disks[1])],
            };
        }
    };
    info!(a = %keys[0], b = %keys[1], t_yr = time, ?case, periastron_au, "encounter");

    let collisional_radius = params.collisional_radius_factor * periastron_au / units::pc_in_au();
    let [d0, d1] = disks;
    let outcome0 = truncate_member(s0, d0, masses, periastron_au, collisional_radius, time, params);
    let outcome1 = truncate_member(
        s1,
        d1,
        [masses[1], masses[0]],
        periastron_au,
        collisional_radius,
        time,
        params,
    );

    EncounterOutcome {
        keys,
        case,
        periastron_au: Some(periastron_au),
        disks: [outcome0, outcome1],
    }
}

fn disk_outcome_none(slot: &DiskSlot<'_>) -> DiskOutcome {
    match slot {
        DiskSlot::NoDisk => DiskOutcome::NoDisk,
        DiskSlot::HasDisk(_) => DiskOutcome::Untouched,
    }
}

/// `masses` is `[self, other]`.
fn truncate_member(
    star: &mut Star,
    slot: DiskSlot<'_>,
    masses: [f64; 2],
    periastron_au: f64,
    collisional_radius: f64,
    time: f64,
    params: &EncounterParams,
) -> DiskOutcome {
    star.shrink_collisional_radius(collisional_radius);
    star.encounters += 1;

    let disk = match slot {
        DiskSlot::HasDisk(disk) if star.is_disked() && !disk.is_dispersed() => disk,
        _ => return DiskOutcome::NoDisk,
    };

    let r_trunc = truncation_radius(periastron_au, masses[0], masses[1], params);
    let current = disk.radius();
    if !(r_trunc < current) {
        return DiskOutcome::Untouched;
    }
    debug!(key = %star.key(), from_au = current, to_au = r_trunc, "truncating disk");

    star.last_encounter = Some(time);
    if r_trunc <= params.dispersal_radius_au || !disk.resolves(r_trunc) {
        let mass_lost = disk.mass();
        disk.clear_mass();
        disk.disperse();
        star.sync_disk_fields(disk);
        star.disk_radius = r_trunc;
        star.role = StarRole::Dispersed;
        star.dispersal_time = Some(time);
        star.truncation_mass_loss = mass_lost;
        star.cumulative_truncation_mass_loss += mass_lost;
        info!(key = %star.key(), t_yr = time, "disk destroyed in encounter");
        return DiskOutcome::Dispersed { mass_lost };
    }

    let before = disk.mass();
    let result = disk.truncate(r_trunc);
    let mass_lost = (before - result.mass).max(0.0);
    star.sync_disk_fields(disk);
    star.truncation_mass_loss = mass_lost;
    star.cumulative_truncation_mass_loss += mass_lost;
    DiskOutcome::Truncated {
        radius: result.radius,
        mass_lost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Relative orbit caught at periastron `q_au` with `v^2 = k mu / q`.
    fn at_periastron(q_au: f64, total_mass: f64, k: f64) -> (Vec3, Vec3) {
        let mu = units::g_au3_msun_yr2() * total_mass;
        let v_au_yr = (k * mu / q_au).sqrt();
        let pos = Vec3::new(q_au / units::pc_in_au(), 0.0, 0.0);
        let vel = Vec3::new(0.0, v_au_yr / units::kms_to_au_per_yr(1.0), 0.0);
        (pos, vel)
    }

    #[test]
    fn periastron_of_orbits_caught_at_closest_approach() {
        for k in [1.5, 2.0, 3.0, 10.0] {
            let (pos, vel) = at_periastron(50.0, 1.0, k);
            let q = periastron_distance(&pos, &vel, &Vec3::zeros(), &Vec3::zeros(), 1.0).unwrap();
            assert!((q - 50.0).abs() < 1e-6 * 50.0, "k = {k}: q = {q}");
        }
    }

    #[test]
    fn head_on_approach_is_degenerate() {
        let pos = Vec3::new(1e-3, 0.0, 0.0);
        let vel = Vec3::new(-1.0, 0.0, 0.0);
        let err = periastron_distance(&pos, &vel, &Vec3::zeros(), &Vec3::zeros(), 1.0);
        assert!(matches!(err, Err(EncounterError::DegenerateOrbit { .. })));
        let err = periastron_distance(&pos, &Vec3::zeros(), &pos, &Vec3::zeros(), 1.0);
        assert!(err.is_err());
    }

    #[test]
    fn classification_covers_all_cases() {
        use StarRole::*;
        assert_eq!(classify(Disked, Disked), EncounterCase::DiskDisk);
        assert_eq!(classify(Disked, Bright), EncounterCase::DiskOther);
        assert_eq!(classify(Dispersed, Disked), EncounterCase::OtherDisk);
        assert_eq!(classify(Bright, Dispersed), EncounterCase::OtherOther);
    }

    #[test]
    fn degenerate_pair_only_shrinks_radii() {
        let mut a = Star::bright(StarKey::new(1), 3.0, 0.02);
        let mut b = Star::bright(StarKey::new(2), 1.0, 0.02);
        a.position = Vec3::new(0.001, 0.0, 0.0);
        a.velocity = Vec3::new(-2.0, 0.0, 0.0);
        let outcome = resolve_encounter(
            [&mut a, &mut b],
            [DiskSlot::NoDisk, DiskSlot::NoDisk],
            500.0,
            &EncounterParams::default(),
        );
        assert_eq!(outcome.periastron_au, None);
        assert_eq!(outcome.case, EncounterCase::OtherOther);
        assert!((a.collisional_radius() - 0.49e-3).abs() < 1e-12);
        assert_eq!(b.collisional_radius(), a.collisional_radius());
    }

    proptest! {
        #[test]
        fn collisional_radius_never_increases(
            q_au in 1.0f64..5000.0,
            k in 1.1f64..20.0,
            start in 1e-6f64..0.05,
        ) {
            let (pos, vel) = at_periastron(q_au, 2.0, k);
            let mut a = Star::bright(StarKey::new(1), 1.0, start);
            let mut b = Star::bright(StarKey::new(2), 1.0, start);
            a.position = pos;
            a.velocity = vel;
            resolve_encounter(
                [&mut a, &mut b],
                [DiskSlot::NoDisk, DiskSlot::NoDisk],
                0.0,
                &EncounterParams::default(),
            );
            prop_assert!(a.collisional_radius() <= start);
            prop_assert!(b.collisional_radius() <= start);
            prop_assert!(a.collisional_radius() < 0.5 * q_au / units::pc_in_au());
        }
    }
}
