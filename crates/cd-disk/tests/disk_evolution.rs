use std::sync::Arc;

use cd_core::units;
use cd_core::{BackendId, StarKey};
use cd_disk::{DispersalThresholds, Disk, DiskInit, RadialGrid, ViscousCode, ViscousParams};

fn thresholds() -> DispersalThresholds {
    DispersalThresholds {
        mass: units::mearth_to_msun(0.03),
        density: units::g_per_cm2_to_msun_per_au2(1e-5),
    }
}

fn disk_on(grid: &Arc<RadialGrid>, key: u64, stellar_mass: f64) -> Disk {
    Disk::new(
        DiskInit {
            key: StarKey::new(key),
            radius: 30.0 * stellar_mass.sqrt(),
            gas_mass: 0.1 * stellar_mass,
            stellar_mass,
            thresholds: thresholds(),
        },
        Arc::clone(grid),
        ViscousParams::default().sigma_floor,
    )
    .unwrap()
}

#[test]
fn one_backend_serves_many_disks_in_turn() {
    let grid = Arc::new(RadialGrid::new(100, 0.05, 2000.0).unwrap());
    let mut code =
        ViscousCode::new(BackendId::from_index(0), Arc::clone(&grid), ViscousParams::default(), 1.0)
            .unwrap();

    let mut shared: Vec<Disk> = [0.2, 0.8, 1.5].iter().enumerate().map(|(i, &m)| disk_on(&grid, i as u64, m)).collect();
    for disk in &mut shared {
        code.evolve(disk, 1000.0).unwrap();
    }

    // each disk evolved alone on a fresh backend ends up identical
    for (i, &m) in [0.2, 0.8, 1.5].iter().enumerate() {
        let mut alone = disk_on(&grid, i as u64, m);
        let mut fresh =
            ViscousCode::new(BackendId::from_index(7), Arc::clone(&grid), ViscousParams::default(), m)
                .unwrap();
        fresh.evolve(&mut alone, 1000.0).unwrap();
        assert_eq!(alone.surface_density(), shared[i].surface_density());
        assert_eq!(alone.dust_mass(), shared[i].dust_mass());
    }
    assert_eq!(code.loaded_key(), Some(StarKey::new(2)));
}

#[test]
fn strong_photoevaporation_disperses_disk() {
    let grid = Arc::new(RadialGrid::new(100, 0.05, 2000.0).unwrap());
    let mut code =
        ViscousCode::new(BackendId::from_index(0), Arc::clone(&grid), ViscousParams::default(), 0.1)
            .unwrap();
    let mut disk = disk_on(&grid, 4, 0.1);
    // 0.01 MSun of gas against 1e-5 MSun/yr
    disk.outer_photoevap_rate = 1e-5;
    for _ in 0..2 {
        code.evolve(&mut disk, 1000.0).unwrap();
    }
    assert!(disk.is_dispersed());

    let frozen = disk.surface_density().to_vec();
    code.evolve(&mut disk, 1000.0).unwrap();
    assert_eq!(disk.surface_density(), frozen.as_slice());
    assert!(disk.is_dispersed());
}

#[test]
fn truncated_disk_keeps_evolving() {
    let grid = Arc::new(RadialGrid::new(100, 0.05, 2000.0).unwrap());
    let mut code =
        ViscousCode::new(BackendId::from_index(0), Arc::clone(&grid), ViscousParams::default(), 1.0)
            .unwrap();
    let mut disk = disk_on(&grid, 9, 1.0);
    let cut = disk.truncate(5.0);
    assert!(cut.radius <= 5.0);
    code.evolve(&mut disk, 1000.0).unwrap();
    assert!(!disk.is_dispersed());
    assert!(disk.gas_mass() > 0.0);
}
