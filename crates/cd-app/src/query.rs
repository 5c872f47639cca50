//! Query helpers over saved runs.

use std::path::{Path, PathBuf};

use cd_results::{RoleTag, Snapshot, SnapshotStore};

use crate::error::{AppError, AppResult};

/// Disk statistics of one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSummary {
    pub time_yr: f64,
    pub path: Option<PathBuf>,
    pub n_stars: usize,
    pub bright: usize,
    pub active_disks: usize,
    pub dispersed: usize,
    /// Fraction of the initially disked stars that still host a disk
    pub disk_fraction: f64,
    /// Mean mass of the active disks [MSun]
    pub mean_disk_mass: f64,
    pub encounters: u64,
}

pub fn summarize_snapshot(snapshot: &Snapshot) -> SnapshotSummary {
    let count = |role: RoleTag| snapshot.stars.iter().filter(|s| s.role == role).count();
    let bright = count(RoleTag::Bright);
    let active_disks = count(RoleTag::Disked);
    let dispersed = count(RoleTag::Dispersed);
    let disk_fraction = if active_disks + dispersed > 0 {
        active_disks as f64 / (active_disks + dispersed) as f64
    } else {
        0.0
    };
    let mean_disk_mass = if active_disks > 0 {
        snapshot
            .stars
            .iter()
            .filter(|s| s.role == RoleTag::Disked)
            .map(|s| s.disk_mass)
            .sum::<f64>()
            / active_disks as f64
    } else {
        0.0
    };
    // Each encounter is counted on both members.
    let encounters = snapshot.stars.iter().map(|s| u64::from(s.encounters)).sum::<u64>() / 2;

    SnapshotSummary {
        time_yr: snapshot.time_yr,
        path: None,
        n_stars: snapshot.stars.len(),
        bright,
        active_disks,
        dispersed,
        disk_fraction,
        mean_disk_mass,
        encounters,
    }
}

/// Summaries of every snapshot of run `run_number`, oldest first.
pub fn list_snapshots(save_path: &Path, run_number: u32) -> AppResult<Vec<SnapshotSummary>> {
    let run_dir = save_path.join(run_number.to_string());
    if !run_dir.is_dir() {
        return Err(AppError::InvalidInput(format!(
            "no run directory at {}",
            run_dir.display()
        )));
    }
    let store = SnapshotStore::new(save_path, run_number)?;
    store
        .list_snapshots()?
        .into_iter()
        .map(|(_, path)| {
            let snapshot = store.load_snapshot(&path)?;
            let mut summary = summarize_snapshot(&snapshot);
            summary.path = Some(path);
            Ok(summary)
        })
        .collect()
}
