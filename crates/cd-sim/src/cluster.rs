//! The cluster evolution loop.
//!
//! One step of size `dt` runs, in order:
//! 1. stellar evolution to `t + dt/2`, masses and radii pushed to gravity
//! 2. gravity to `t + dt`
//! 3. every encounter the gravity code stops on, resolved and re-evolved
//! 4. radiation field, then photoevaporation rates for the disked stars
//! 5. disk evolution on the worker pool, dispersed disks excluded
//! 6. disk state copied back onto the stars
//! 7. stellar evolution to `t + dt`
//!
//! Snapshots are only written between steps.

use std::collections::HashMap;
use std::sync::Arc;

use cd_core::{StarKey, ensure_finite};
use cd_core::timing::{Timer, phase};
use cd_disk::{Disk, ViscousCode};
use cd_dynamics::{GravityCode, StellarCode};
use cd_photo::{
    IrradiatedDisk, MassLossTable, PhotoevapTarget, RadiationSource, photoevaporation_mass_loss,
    total_radiation,
};
use cd_results::{DiagnosticsRecord, Snapshot, SnapshotSink};
use tracing::{debug, info};

use crate::dispatch::WorkerPool;
use crate::encounter::{DiskSlot, EncounterOutcome, EncounterParams, resolve_encounter};
use crate::error::{SimError, SimResult};
use crate::star::{Star, StarRole};

/// Time-stepping and encounter settings of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterParams {
    /// [yr]
    pub dt: f64,
    /// [yr]
    pub t_end: f64,
    /// [yr]
    pub save_interval: f64,
    pub encounter: EncounterParams,
    /// Safety limit on resolutions within one step
    pub max_encounters_per_step: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            dt: 1000.0,
            t_end: 2.0e6,
            save_interval: 5.0e4,
            encounter: EncounterParams::default(),
            max_encounters_per_step: 10_000,
        }
    }
}

/// Reported after every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepProgress {
    pub step: usize,
    pub time_yr: f64,
    pub t_end_yr: f64,
    pub active_disks: usize,
    /// Encounters resolved in this step
    pub encounters: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub end_time_yr: f64,
    pub active_disks: usize,
    pub encounters: usize,
    pub snapshots: usize,
    /// Every disk dispersed before `t_end`.
    pub stopped_early: bool,
}

/// Everything a [`Cluster`] is built from.
pub struct ClusterParts<G, S> {
    pub stars: Vec<Star>,
    /// One disk per disked or dispersed star, built on the backends' grid
    pub disks: Vec<Disk>,
    pub backends: Vec<ViscousCode>,
    pub gravity: G,
    pub stellar: S,
    pub pool: WorkerPool,
    pub table: Arc<dyn MassLossTable>,
    /// [yr]
    pub start_time: f64,
}

/// A star cluster with protoplanetary disks.
pub struct Cluster<G: GravityCode, S: StellarCode> {
    time: f64,
    stars: Vec<Star>,
    star_index: HashMap<StarKey, usize>,
    disks: Vec<Disk>,
    disk_index: HashMap<StarKey, usize>,
    backends: Vec<ViscousCode>,
    gravity: G,
    stellar: S,
    pool: WorkerPool,
    table: Arc<dyn MassLossTable>,
    params: ClusterParams,
    initial_energy: f64,
    encounters: usize,
}

impl<G: GravityCode, S: StellarCode> Cluster<G, S> {
    pub fn new(parts: ClusterParts<G, S>, params: ClusterParams) -> SimResult<Self> {
        if !(params.dt > 0.0 && params.dt.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if !(params.save_interval > 0.0) {
            return Err(SimError::InvalidArg {
                what: "save interval must be positive",
            });
        }
        if params.t_end < parts.start_time {
            return Err(SimError::InvalidArg {
                what: "end time is before the start time",
            });
        }
        if parts.backends.is_empty() {
            return Err(SimError::InvalidArg {
                what: "at least one disk backend is required",
            });
        }

        let mut star_index = HashMap::with_capacity(parts.stars.len());
        for (i, star) in parts.stars.iter().enumerate() {
            if star_index.insert(star.key(), i).is_some() {
                return Err(SimError::InvalidArg {
                    what: "duplicate star key",
                });
            }
        }
        let mut disk_index = HashMap::with_capacity(parts.disks.len());
        for (i, disk) in parts.disks.iter().enumerate() {
            let star = star_index
                .get(&disk.key())
                .map(|&s| &parts.stars[s])
                .ok_or(SimError::UnknownStar { key: disk.key() })?;
            if star.is_bright() {
                return Err(SimError::InvalidArg {
                    what: "bright stars cannot host disks",
                });
            }
            if disk_index.insert(disk.key(), i).is_some() {
                return Err(SimError::InvalidArg {
                    what: "more than one disk for a star",
                });
            }
        }
        if let Some(star) = parts
            .stars
            .iter()
            .find(|s| s.is_disked() && !disk_index.contains_key(&s.key()))
        {
            return Err(SimError::UnknownStar { key: star.key() });
        }

        let initial_energy = parts.gravity.kinetic_energy() + parts.gravity.potential_energy();
        Ok(Self {
            time: parts.start_time,
            stars: parts.stars,
            star_index,
            disks: parts.disks,
            disk_index,
            backends: parts.backends,
            gravity: parts.gravity,
            stellar: parts.stellar,
            pool: parts.pool,
            table: parts.table,
            params,
            initial_energy,
            encounters: 0,
        })
    }

    /// [yr]
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn params(&self) -> &ClusterParams {
        &self.params
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn star(&self, key: StarKey) -> Option<&Star> {
        self.star_index.get(&key).map(|&i| &self.stars[i])
    }

    pub fn disk(&self, key: StarKey) -> Option<&Disk> {
        self.disk_index.get(&key).map(|&i| &self.disks[i])
    }

    pub fn gravity(&self) -> &G {
        &self.gravity
    }

    /// Stars that still host an undispersed disk.
    pub fn active_disks(&self) -> usize {
        self.stars.iter().filter(|s| s.is_disked()).count()
    }

    /// Encounters resolved since the cluster was built.
    pub fn encounters(&self) -> usize {
        self.encounters
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.time, self.stars.iter().map(Star::to_record).collect())
    }

    /// Relative energy error and virial ratio of the gravity code.
    pub fn diagnostics(&self) -> DiagnosticsRecord {
        let kinetic = self.gravity.kinetic_energy();
        let potential = self.gravity.potential_energy();
        let energy = kinetic + potential;
        DiagnosticsRecord {
            time_yr: self.time,
            energy_error: if self.initial_energy != 0.0 {
                energy / self.initial_energy - 1.0
            } else {
                0.0
            },
            virial_ratio: if potential != 0.0 { -kinetic / potential } else { 0.0 },
        }
    }

    /// Advance the whole cluster by `dt` years.
    ///
    /// Returns the number of encounters resolved. Any error leaves the
    /// cluster mid-step and should end the run.
    pub fn step(&mut self, dt: f64) -> SimResult<usize> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        let t_new = self.time + dt;

        let timer = Timer::start();
        self.evolve_stellar(self.time + 0.5 * dt)?;
        timer.record_into(&phase::STELLAR);

        let timer = Timer::start();
        self.gravity.evolve_model(t_new)?;
        self.pull_phase_space();
        timer.record_into(&phase::GRAVITY);

        let timer = Timer::start();
        let resolved = self.drain_encounters(t_new)?;
        timer.record_into(&phase::ENCOUNTERS);

        self.update_photoevaporation()?;

        let timer = Timer::start();
        self.evolve_disks(dt, t_new)?;
        timer.record_into(&phase::DISKS);

        let timer = Timer::start();
        self.evolve_stellar(t_new)?;
        timer.record_into(&phase::STELLAR);

        self.time = t_new;
        Ok(resolved)
    }

    /// Step until `t_end` or until no active disk is left.
    ///
    /// Writes a snapshot at the start, whenever a save interval is crossed
    /// and at the end, plus one diagnostics record per step.
    pub fn run(
        &mut self,
        sink: &mut dyn SnapshotSink,
        progress: &mut dyn FnMut(&StepProgress),
    ) -> SimResult<RunSummary> {
        let t_end = self.params.t_end;
        let tolerance = 1e-9 * self.params.dt;
        info!(
            t_start_yr = self.time,
            t_end_yr = t_end,
            stars = self.stars.len(),
            active_disks = self.active_disks(),
            workers = self.pool.workers(),
            backends = self.backends.len(),
            "starting cluster run"
        );

        let mut snapshots = 0;
        self.save(sink)?;
        snapshots += 1;
        let mut last_saved = self.time;
        sink.append_diagnostics(&self.diagnostics())?;

        let mut next_save = self.time + self.params.save_interval;
        let mut steps = 0;
        let mut encounters = 0;
        let mut stopped_early = self.active_disks() == 0;

        while !stopped_early && self.time < t_end - tolerance {
            let dt = self.params.dt.min(t_end - self.time);
            let resolved = self.step(dt)?;
            steps += 1;
            encounters += resolved;
            sink.append_diagnostics(&self.diagnostics())?;

            let active = self.active_disks();
            progress(&StepProgress {
                step: steps,
                time_yr: self.time,
                t_end_yr: t_end,
                active_disks: active,
                encounters: resolved,
            });
            debug!(step = steps, t_yr = self.time, active_disks = active, encounters = resolved, "step done");

            if active == 0 {
                info!(t_yr = self.time, "all disks dispersed, stopping");
                stopped_early = true;
            }
            if stopped_early || self.time >= next_save - tolerance {
                self.save(sink)?;
                snapshots += 1;
                last_saved = self.time;
                while next_save <= self.time + tolerance {
                    next_save += self.params.save_interval;
                }
            }
        }
        if last_saved < self.time {
            self.save(sink)?;
            snapshots += 1;
        }

        phase::log_summary();
        Ok(RunSummary {
            steps,
            end_time_yr: self.time,
            active_disks: self.active_disks(),
            encounters,
            snapshots,
            stopped_early,
        })
    }

    fn save(&self, sink: &mut dyn SnapshotSink) -> SimResult<()> {
        let timer = Timer::start();
        sink.write_snapshot(&self.snapshot())?;
        timer.record_into(&phase::PERSISTENCE);
        Ok(())
    }

    fn evolve_stellar(&mut self, t_end: f64) -> SimResult<()> {
        self.stellar.evolve_model(t_end)?;
        for particle in self.stellar.particles() {
            let &i = self
                .star_index
                .get(&particle.key)
                .ok_or(SimError::UnknownStar { key: particle.key })?;
            let star = &mut self.stars[i];
            star.stellar_mass = particle.mass;
            star.stellar_radius = particle.radius;
            star.mass = particle.mass + star.disk_mass;
            self.gravity.set_mass(particle.key, star.mass)?;
        }
        Ok(())
    }

    fn pull_phase_space(&mut self) {
        for particle in self.gravity.particles() {
            if let Some(&i) = self.star_index.get(&particle.key) {
                self.stars[i].position = particle.position;
                self.stars[i].velocity = particle.velocity;
            }
        }
    }

    /// Index of the undispersed disk of a disked star.
    fn active_disk(&self, star: usize) -> Option<usize> {
        let star = &self.stars[star];
        if !star.is_disked() {
            return None;
        }
        self.disk_index
            .get(&star.key())
            .copied()
            .filter(|&d| !self.disks[d].is_dispersed())
    }

    fn drain_encounters(&mut self, t_end: f64) -> SimResult<usize> {
        let mut resolved = 0;
        while let Some([a, b]) = self.gravity.pending_encounter() {
            if resolved >= self.params.max_encounters_per_step {
                return Err(SimError::EncounterOverflow {
                    limit: self.params.max_encounters_per_step,
                    time_yr: t_end,
                });
            }
            self.pull_phase_space();
            let outcome = self.resolve_pair(a, b, self.gravity.model_time())?;
            debug!(?outcome, "encounter resolved");
            for key in outcome.keys {
                let star = &self.stars[self.star_index[&key]];
                self.gravity.set_collision_radius(key, star.collisional_radius())?;
                self.gravity.set_mass(key, star.mass)?;
            }
            resolved += 1;
            self.gravity.evolve_model(t_end)?;
            self.pull_phase_space();
        }
        self.encounters += resolved;
        Ok(resolved)
    }

    fn resolve_pair(&mut self, a: StarKey, b: StarKey, time: f64) -> SimResult<EncounterOutcome> {
        let ia = *self.star_index.get(&a).ok_or(SimError::UnknownStar { key: a })?;
        let ib = *self.star_index.get(&b).ok_or(SimError::UnknownStar { key: b })?;
        let disk_a = self.active_disk(ia);
        let disk_b = self.active_disk(ib);

        let (star_a, star_b) = two_mut(&mut self.stars, ia, ib).ok_or(SimError::InvalidArg {
            what: "encounter between a star and itself",
        })?;
        let slots = match (disk_a, disk_b) {
            (Some(da), Some(db)) => {
                let (x, y) = two_mut(&mut self.disks, da, db).ok_or(SimError::InvalidArg {
                    what: "two stars share one disk",
                })?;
                [DiskSlot::HasDisk(x), DiskSlot::HasDisk(y)]
            }
            (Some(da), None) => [DiskSlot::HasDisk(&mut self.disks[da]), DiskSlot::NoDisk],
            (None, Some(db)) => [DiskSlot::NoDisk, DiskSlot::HasDisk(&mut self.disks[db])],
            (None, None) => [DiskSlot::NoDisk, DiskSlot::NoDisk],
        };
        Ok(resolve_encounter([star_a, star_b], slots, time, &self.params.encounter))
    }

    /// Radiation and mass-loss rates for every disked star; the rates become
    /// the disks' outer photoevaporation rates for this step.
    fn update_photoevaporation(&mut self) -> SimResult<()> {
        let timer = Timer::start();
        let sources: Vec<RadiationSource> = self
            .stars
            .iter()
            .filter(|s| s.is_bright())
            .map(|s| RadiationSource {
                position_pc: s.position,
                mass: s.stellar_mass,
            })
            .collect();
        let irradiated: Vec<usize> = (0..self.stars.len())
            .filter(|&i| self.active_disk(i).is_some())
            .collect();
        let targets: Vec<IrradiatedDisk> = irradiated
            .iter()
            .map(|&i| IrradiatedDisk {
                key: self.stars[i].key(),
                position_pc: self.stars[i].position,
                disk_radius_au: self.stars[i].disk_radius,
            })
            .collect();
        let irradiation = total_radiation(self.pool.pool(), &targets, &sources);
        timer.record_into(&phase::RADIATION);

        let timer = Timer::start();
        let mass_loss_targets: Vec<PhotoevapTarget> = irradiated
            .iter()
            .map(|&i| {
                let star = &self.stars[i];
                PhotoevapTarget {
                    key: star.key(),
                    stellar_mass: star.stellar_mass,
                    disk_gas_mass: star.disk_gas_mass,
                    disk_radius_au: star.disk_radius,
                }
            })
            .collect();
        let rates = photoevaporation_mass_loss(
            self.pool.pool(),
            self.table.as_ref(),
            &mass_loss_targets,
            &irradiation,
        )?;

        for ((&i, rad), rate) in irradiated.iter().zip(&irradiation).zip(rates) {
            let rate = ensure_finite(rate, "photoevaporation rate")?;
            let star = &mut self.stars[i];
            star.total_radiation = rad.flux_g0;
            star.photoevap_mdot = rate;
            let d = self.disk_index[&star.key()];
            self.disks[d].outer_photoevap_rate = rate;
        }
        debug!(targets = targets.len(), sources = sources.len(), "photoevaporation rates set");
        timer.record_into(&phase::MASS_LOSS);
        Ok(())
    }

    fn evolve_disks(&mut self, dt: f64, t_new: f64) -> SimResult<()> {
        let lost_before: Vec<f64> = self.disks.iter().map(Disk::photoevap_mass_lost).collect();
        {
            let mut active: Vec<&mut Disk> = self.disks.iter_mut().filter(|d| !d.is_dispersed()).collect();
            self.pool.evolve_disks(&mut self.backends, &mut active, dt)?;
        }

        for (disk, before) in self.disks.iter().zip(lost_before) {
            let Some(&i) = self.star_index.get(&disk.key()) else {
                continue;
            };
            let star = &mut self.stars[i];
            if star.role != StarRole::Disked {
                continue;
            }
            star.cumulative_photoevap_mass_loss += disk.photoevap_mass_lost() - before;
            star.sync_from_disk(disk, t_new);
            if !star.is_disked() {
                info!(key = %star.key(), t_yr = t_new, "disk dispersed");
            }
            self.gravity.set_mass(star.key(), star.mass)?;
        }
        Ok(())
    }
}

/// Two distinct mutable elements of one slice.
fn two_mut<T>(items: &mut [T], i: usize, j: usize) -> Option<(&mut T, &mut T)> {
    if i == j || i >= items.len() || j >= items.len() {
        return None;
    }
    if i < j {
        let (head, tail) = items.split_at_mut(j);
        Some((&mut head[i], &mut tail[0]))
    } else {
        let (head, tail) = items.split_at_mut(i);
        Some((&mut tail[0], &mut head[j]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_mut_returns_requested_order() {
        let mut items = [10, 20, 30];
        let (a, b) = two_mut(&mut items, 2, 0).unwrap();
        assert_eq!((*a, *b), (30, 10));
        *a = 31;
        *b = 11;
        assert_eq!(items, [11, 20, 31]);
        assert!(two_mut(&mut items, 1, 1).is_none());
        assert!(two_mut(&mut items, 1, 3).is_none());
    }
}
