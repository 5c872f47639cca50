//! End-to-end runs through the service layer.

use std::fs;
use std::path::{Path, PathBuf};

use cd_app::{AppError, RunProgressEvent, RunStage, list_snapshots, run, run_with_progress};
use cd_config::RunConfig;
use cd_results::SnapshotStore;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    dir.push(format!("{prefix}_{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_grid(dir: &Path) {
    let mut text = String::from("# m_star fuv m_disk r_disk log10_mdot\n");
    for m in [0.1, 0.5, 1.0, 1.9] {
        for fuv in [10.0, 100.0, 1000.0, 10000.0] {
            for md in [0.1, 1.0, 10.0, 100.0] {
                for r in [1.0, 10.0, 100.0, 400.0] {
                    let l: f64 = -12.0 + 0.5 * f64::log10(fuv) + 0.3 * f64::log10(r) - 0.2 * f64::log10(md);
                    text.push_str(&format!("{m} {fuv} {md} {r} {l:.6}\n"));
                }
            }
        }
    }
    fs::write(dir.join("grid.dat"), text).unwrap();
}

fn small_config(root: &Path) -> RunConfig {
    let grid = root.join("fried");
    fs::create_dir_all(&grid).unwrap();
    write_grid(&grid);

    let mut config = RunConfig::default();
    config.cluster.n_stars = 12;
    config.cluster.seed = 3;
    config.disks.n_cells = 40;
    config.disks.fried_grid_path = grid.display().to_string();
    config.time.end_yr = 3000.0;
    config.time.dt_yr = 1000.0;
    config.time.save_interval_yr = 1000.0;
    config.parallel.workers = 2;
    config.parallel.backends = 2;
    config.output.save_path = root.join("out").display().to_string();
    config.output.run_number = 1;
    config
}

#[test]
fn fresh_run_writes_snapshots_and_reports_progress() {
    let root = unique_temp_dir("cd_app_fresh");
    let config = small_config(&root);

    let mut events: Vec<RunProgressEvent> = Vec::new();
    let report = run_with_progress(&config, Some(&mut |event| events.push(event))).unwrap();

    assert_eq!(report.restarted_from_yr, None);
    assert_eq!(report.summary.steps, 3);
    assert!((report.summary.end_time_yr - 3000.0).abs() < 1e-6);
    assert_eq!(report.summary.snapshots, 4);
    assert!(report.timing.total_time_s >= report.timing.run_time_s);

    assert!(matches!(events.first().map(|e| e.stage), Some(RunStage::LoadingMassLossTable)));
    assert!(events.iter().any(|e| e.stage == RunStage::BuildingCluster));
    let steps: Vec<_> = events.iter().filter_map(|e| e.cluster.as_ref()).collect();
    assert_eq!(steps.len(), 3);
    assert!((steps[2].fraction_complete - 1.0).abs() < 1e-9);
    assert!(matches!(events.last().map(|e| e.stage), Some(RunStage::Completed)));

    let store = SnapshotStore::new(&config.output.save_path, 1).unwrap();
    let manifest = store.load_manifest().unwrap();
    assert_eq!(manifest.n_stars, 12);
    assert_eq!(manifest.config["cluster"]["n_stars"], 12);
    assert_eq!(store.load_diagnostics().unwrap().len(), 4);

    let summaries = list_snapshots(Path::new(&config.output.save_path), 1).unwrap();
    let times: Vec<f64> = summaries.iter().map(|s| s.time_yr).collect();
    assert_eq!(times, vec![0.0, 1000.0, 2000.0, 3000.0]);
    assert!(summaries.iter().all(|s| s.n_stars == 12 && s.bright >= 1));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn restart_continues_from_the_latest_snapshot() {
    let root = unique_temp_dir("cd_app_restart");
    let mut config = small_config(&root);
    run(&config).unwrap();

    config.output.restart = true;
    config.time.end_yr = 5000.0;
    let report = run(&config).unwrap();
    assert_eq!(report.restarted_from_yr, Some(3000.0));
    assert_eq!(report.summary.steps, 2);

    let summaries = list_snapshots(Path::new(&config.output.save_path), 1).unwrap();
    assert_eq!(summaries.last().map(|s| s.time_yr), Some(5000.0));
    assert_eq!(summaries.len(), 6);
    let store = SnapshotStore::new(&config.output.save_path, 1).unwrap();
    assert_eq!(store.load_manifest().unwrap().restarted_from_yr, Some(3000.0));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn restart_without_snapshots_fails() {
    let root = unique_temp_dir("cd_app_restart_empty");
    let mut config = small_config(&root);
    config.output.restart = true;
    assert!(matches!(run(&config), Err(AppError::Results(_))));
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn missing_mass_loss_table_is_fatal() {
    let root = unique_temp_dir("cd_app_no_grid");
    let mut config = small_config(&root);
    config.disks.fried_grid_path = root.join("nowhere").display().to_string();
    assert!(matches!(run(&config), Err(AppError::MassLossTable(_))));
    let _ = fs::remove_dir_all(&root);
}

#[test]
fn invalid_config_is_rejected_before_any_work() {
    let root = unique_temp_dir("cd_app_invalid");
    let mut config = small_config(&root);
    config.parallel.workers = 0;
    assert!(matches!(run(&config), Err(AppError::Validation(_))));
    assert!(!Path::new(&config.output.save_path).exists());
    let _ = fs::remove_dir_all(&root);
}
