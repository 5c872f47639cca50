use cd_config::*;

#[test]
fn minimal_yaml_fills_in_defaults() {
    let temp_dir = std::env::temp_dir();
    let path = temp_dir.join("cd_config_minimal.yaml");
    std::fs::write(
        &path,
        "cluster:\n  n_stars: 250\n  distribution: uniform\nparallel:\n  workers: 8\n",
    )
    .unwrap();

    let config = load_yaml(&path).unwrap();
    assert_eq!(config.cluster.n_stars, 250);
    assert_eq!(config.cluster.distribution, DistributionDef::Uniform);
    assert_eq!(config.cluster.virial_radius_pc, 0.5);
    assert_eq!(config.parallel.workers, 8);
    assert_eq!(config.parallel.backends, 1);
    assert_eq!(config.time.dt_yr, 1000.0);
    assert_eq!(config.cluster.galactic_distance_pc, None);
}

#[test]
fn roundtrip_yaml_and_json() {
    let mut config = RunConfig::default();
    config.cluster.galactic_distance_pc = Some(8000.0);
    config.output.run_number = 4;
    config.output.restart = true;

    let temp_dir = std::env::temp_dir();
    let yaml = temp_dir.join("cd_config_roundtrip.yaml");
    save_yaml(&yaml, &config).unwrap();
    assert_eq!(load_yaml(&yaml).unwrap(), config);

    let json = temp_dir.join("cd_config_roundtrip.json");
    save_json(&json, &config).unwrap();
    assert_eq!(load_json(&json).unwrap(), config);
}

#[test]
fn invalid_file_is_rejected_on_load_but_parses_unchecked() {
    let path = std::env::temp_dir().join("cd_config_invalid.yaml");
    std::fs::write(&path, "time:\n  dt_yr: -5\n").unwrap();

    assert!(matches!(
        load_yaml(&path),
        Err(ConfigError::Validation(ValidationError::InvalidValue { .. }))
    ));
    let mut config = load_yaml_unchecked(&path).unwrap();
    config.time.dt_yr = 500.0;
    validate_config(&config).unwrap();
}
