//! Run execution service.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use cd_config::{RunConfig, validate_config};
use cd_core::timing::phase;
use cd_dynamics::{BackgroundPotential, DirectGravity, DirectGravityParams, GravityParticle, ZamsStellar};
use cd_photo::{FriedGrid, MassLossTable};
use cd_results::{RunManifest, SnapshotStore, timestamp_now};
use cd_sim::{Cluster, ClusterParams, ClusterParts, EncounterParams, RunSummary, Star, StepProgress, WorkerPool};
use tracing::info;

use crate::error::AppResult;
use crate::initial::{self, InitialState};
use crate::progress::{ClusterProgress, RunProgressEvent, RunStage};

/// Wall-clock breakdown of a run.
#[derive(Debug, Clone, Default)]
pub struct RunTiming {
    pub table_load_time_s: f64,
    pub setup_time_s: f64,
    pub run_time_s: f64,
    pub total_time_s: f64,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_dir: PathBuf,
    pub summary: RunSummary,
    pub restarted_from_yr: Option<f64>,
    pub timing: RunTiming,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    cluster: Option<ClusterProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        let mut event = RunProgressEvent::stage(stage, started.elapsed().as_secs_f64(), message);
        event.cluster = cluster;
        cb(event);
    }
}

pub fn cluster_params(config: &RunConfig) -> ClusterParams {
    ClusterParams {
        dt: config.time.dt_yr,
        t_end: config.time.end_yr,
        save_interval: config.time.save_interval_yr,
        encounter: EncounterParams {
            truncation_parameter: config.encounters.truncation_parameter,
            mass_factor_exponent: config.encounters.mass_factor_exponent,
            dispersal_radius_au: config.encounters.dispersal_radius_au,
            ..EncounterParams::default()
        },
        max_encounters_per_step: config.encounters.max_per_step,
    }
}

fn build_gravity(config: &RunConfig, stars: &[Star], start_time: f64) -> AppResult<DirectGravity> {
    let particles: Vec<GravityParticle> = stars
        .iter()
        .map(|s| GravityParticle {
            key: s.key(),
            mass: s.mass,
            position: s.position,
            velocity: s.velocity,
            radius: s.collisional_radius(),
        })
        .collect();
    let params = DirectGravityParams {
        softening_au: config.cluster.softening_au,
        background: config
            .cluster
            .galactic_distance_pc
            .map(|_| BackgroundPotential::galactic()),
        ..DirectGravityParams::default()
    };
    Ok(DirectGravity::new(&particles, start_time, params)?)
}

fn build_stellar(stars: &[Star], start_time: f64) -> ZamsStellar {
    ZamsStellar::new(
        stars
            .iter()
            .filter(|s| s.is_bright())
            .map(|s| (s.key(), s.stellar_mass)),
        start_time,
    )
}

/// Execute the run described by `config`.
pub fn run(config: &RunConfig) -> AppResult<RunReport> {
    run_with_progress(config, None)
}

/// Execute the run described by `config`, reporting stages and steps.
///
/// A fresh run draws a new cluster. With `output.restart` set the run
/// continues from the latest snapshot in `<save_path>/<run_number>/`.
pub fn run_with_progress(
    config: &RunConfig,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunReport> {
    let started = Instant::now();
    let mut timing = RunTiming::default();
    validate_config(config)?;
    phase::reset_all();

    emit_progress(
        &mut progress_cb,
        RunStage::LoadingMassLossTable,
        started,
        Some(config.disks.fried_grid_path.clone()),
        None,
    );
    let table_start = Instant::now();
    let table: Arc<dyn MassLossTable> = Arc::new(FriedGrid::load_dir(&config.disks.fried_grid_path)?);
    timing.table_load_time_s = table_start.elapsed().as_secs_f64();

    let setup_start = Instant::now();
    let store = SnapshotStore::new(&config.output.save_path, config.output.run_number)?;
    let state: InitialState = if config.output.restart {
        emit_progress(
            &mut progress_cb,
            RunStage::RestoringSnapshot,
            started,
            Some(store.run_dir().display().to_string()),
            None,
        );
        let snapshot = store.latest_snapshot()?;
        initial::restored_state(config, &snapshot)?
    } else {
        emit_progress(&mut progress_cb, RunStage::BuildingCluster, started, None, None);
        initial::fresh_state(config)?
    };

    let restarted_from_yr = state.restored_from;
    store.write_manifest(&RunManifest {
        run_number: config.output.run_number,
        n_stars: state.stars.len(),
        timestamp: timestamp_now(),
        restarted_from_yr,
        config: serde_json::to_value(config)?,
    })?;

    let gravity = build_gravity(config, &state.stars, state.start_time)?;
    let stellar = build_stellar(&state.stars, state.start_time);
    let pool = WorkerPool::new(config.parallel.workers)?;
    let mut cluster = Cluster::new(
        ClusterParts {
            stars: state.stars,
            disks: state.disks,
            backends: state.backends,
            gravity,
            stellar,
            pool,
            table,
            start_time: state.start_time,
        },
        cluster_params(config),
    )?;
    timing.setup_time_s = setup_start.elapsed().as_secs_f64();

    emit_progress(&mut progress_cb, RunStage::RunningCluster, started, None, None);
    let run_start = Instant::now();
    let mut sink = store.clone();
    let summary = {
        let mut on_step = |p: &StepProgress| {
            let span = p.t_end_yr - config.time.start_yr;
            let fraction_complete = if span > 0.0 {
                ((p.time_yr - config.time.start_yr) / span).clamp(0.0, 1.0)
            } else {
                1.0
            };
            emit_progress(
                &mut progress_cb,
                RunStage::RunningCluster,
                started,
                None,
                Some(ClusterProgress {
                    sim_time_yr: p.time_yr,
                    t_end_yr: p.t_end_yr,
                    fraction_complete,
                    step: p.step,
                    active_disks: p.active_disks,
                    encounters: p.encounters,
                }),
            );
        };
        cluster.run(&mut sink, &mut on_step)?
    };
    timing.run_time_s = run_start.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    info!(
        run_dir = %store.run_dir().display(),
        steps = summary.steps,
        end_time_yr = summary.end_time_yr,
        active_disks = summary.active_disks,
        encounters = summary.encounters,
        snapshots = summary.snapshots,
        total_time_s = timing.total_time_s,
        "run finished"
    );
    emit_progress(
        &mut progress_cb,
        RunStage::Completed,
        started,
        Some(format!("{} snapshots written", summary.snapshots)),
        None,
    );

    Ok(RunReport {
        run_dir: store.run_dir().to_path_buf(),
        summary,
        restarted_from_yr,
        timing,
    })
}
