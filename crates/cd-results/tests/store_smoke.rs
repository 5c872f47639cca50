use cd_core::StarKey;
use cd_results::*;

fn star(key: u64, role: RoleTag) -> StarRecord {
    StarRecord {
        key: StarKey::new(key),
        role,
        position_pc: [0.1, -0.2, 0.3],
        velocity_kms: [1.0, 0.0, -0.5],
        stellar_mass: 0.5,
        mass: 0.55,
        stellar_radius_rsun: 0.57,
        collisional_radius_pc: 0.02,
        disk_radius_au: 21.2,
        disk_gas_mass: 0.0495,
        disk_dust_mass: 0.000495,
        disk_mass: 0.05,
        initial_disk_mass: 0.05,
        dispersed_mass_threshold: 9e-8,
        dispersed_density_threshold: 1.1e-12,
        total_radiation_g0: 0.0,
        photoevap_mdot: 0.0,
        cumulative_photoevap_mass_loss: 0.0,
        truncation_mass_loss: 0.0,
        cumulative_truncation_mass_loss: 0.0,
        encounters: 0,
        last_encounter_yr: None,
        dispersal_time_yr: None,
    }
}

#[test]
fn save_and_reload_latest_snapshot() {
    let temp_dir = std::env::temp_dir().join("cd_results_test");
    let _ = std::fs::remove_dir_all(&temp_dir);

    let mut store = SnapshotStore::new(&temp_dir, 3).unwrap();
    assert!(store.run_dir().ends_with("3"));
    assert!(matches!(
        store.latest_snapshot(),
        Err(ResultsError::NoSnapshots { .. })
    ));

    for (t, role) in [(0.0, RoleTag::Disked), (5000.0, RoleTag::Disked), (15000.0, RoleTag::Dispersed)] {
        let snapshot = Snapshot::new(t, vec![star(1, role), star(2, RoleTag::Bright)]);
        store.write_snapshot(&snapshot).unwrap();
    }

    let listed = store.list_snapshots().unwrap();
    assert_eq!(listed.len(), 3);
    assert!(listed.windows(2).all(|w| w[0].0 < w[1].0));

    let latest = store.latest_snapshot().unwrap();
    assert_eq!(latest.time_yr, 15000.0);
    assert_eq!(latest.n_stars, 2);
    assert_eq!(latest.active_disks(), 0);
    assert_eq!(latest.stars[0], star(1, RoleTag::Dispersed));
}

#[test]
fn diagnostics_append_across_handles() {
    let temp_dir = std::env::temp_dir().join("cd_results_test_diag");
    let _ = std::fs::remove_dir_all(&temp_dir);

    let mut first = SnapshotStore::new(&temp_dir, 0).unwrap();
    first
        .append_diagnostics(&DiagnosticsRecord {
            time_yr: 0.0,
            energy_error: 0.0,
            virial_ratio: 0.5,
        })
        .unwrap();

    // a restarted run keeps appending to the same file
    let mut second = SnapshotStore::new(&temp_dir, 0).unwrap();
    second
        .append_diagnostics(&DiagnosticsRecord {
            time_yr: 1000.0,
            energy_error: 1e-6,
            virial_ratio: 0.49,
        })
        .unwrap();

    let records = first.load_diagnostics().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].time_yr, 1000.0);
}

#[test]
fn manifest_round_trip() {
    let temp_dir = std::env::temp_dir().join("cd_results_test_manifest");
    let _ = std::fs::remove_dir_all(&temp_dir);

    let store = SnapshotStore::new(&temp_dir, 1).unwrap();
    let manifest = RunManifest {
        run_number: 1,
        n_stars: 100,
        timestamp: timestamp_now(),
        restarted_from_yr: None,
        config: serde_json::json!({ "cluster": { "n_stars": 100 } }),
    };
    store.write_manifest(&manifest).unwrap();
    let loaded = store.load_manifest().unwrap();
    assert_eq!(loaded.n_stars, 100);
    assert_eq!(loaded.config["cluster"]["n_stars"], 100);
}
