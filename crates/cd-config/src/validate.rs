//! Configuration validation logic.

use crate::schema::RunConfig;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive and finite"))
    }
}

fn at_least_one(field: &str, value: usize) -> Result<(), ValidationError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be at least 1"))
    }
}

pub fn validate_config(config: &RunConfig) -> Result<(), ValidationError> {
    let cluster = &config.cluster;
    if cluster.n_stars < 2 {
        return Err(invalid("cluster.n_stars", cluster.n_stars, "a cluster needs at least 2 stars"));
    }
    positive("cluster.virial_radius_pc", cluster.virial_radius_pc)?;
    if !(cluster.virial_ratio >= 0.0 && cluster.virial_ratio.is_finite()) {
        return Err(invalid("cluster.virial_ratio", cluster.virial_ratio, "must be non-negative"));
    }
    positive("cluster.bright_mass_threshold", cluster.bright_mass_threshold)?;
    if !(cluster.max_stellar_mass > cluster.bright_mass_threshold) {
        return Err(invalid(
            "cluster.max_stellar_mass",
            cluster.max_stellar_mass,
            "must exceed the bright mass threshold",
        ));
    }
    positive("cluster.initial_collisional_radius_pc", cluster.initial_collisional_radius_pc)?;
    if !(cluster.softening_au >= 0.0 && cluster.softening_au.is_finite()) {
        return Err(invalid("cluster.softening_au", cluster.softening_au, "must be non-negative"));
    }
    if let Some(d) = cluster.galactic_distance_pc {
        positive("cluster.galactic_distance_pc", d)?;
    }

    let disks = &config.disks;
    if !(disks.alpha > 0.0 && disks.alpha < 1.0) {
        return Err(invalid("disks.alpha", disks.alpha, "must be in (0, 1)"));
    }
    positive("disks.mu", disks.mu)?;
    if disks.n_cells < 2 {
        return Err(invalid("disks.n_cells", disks.n_cells, "must be at least 2"));
    }
    positive("disks.r_min_au", disks.r_min_au)?;
    if !(disks.r_max_au > disks.r_min_au && disks.r_max_au.is_finite()) {
        return Err(invalid("disks.r_max_au", disks.r_max_au, "must exceed r_min_au"));
    }
    positive("disks.radius_coefficient_au", disks.radius_coefficient_au)?;
    positive("disks.mass_fraction", disks.mass_fraction)?;
    positive("disks.dispersed_mass_mearth", disks.dispersed_mass_mearth)?;
    positive("disks.dispersed_density_g_cm2", disks.dispersed_density_g_cm2)?;
    if disks.fried_grid_path.trim().is_empty() {
        return Err(invalid("disks.fried_grid_path", "\"\"", "must name a directory"));
    }

    let time = &config.time;
    if !(time.start_yr >= 0.0 && time.start_yr.is_finite()) {
        return Err(invalid("time.start_yr", time.start_yr, "must be non-negative"));
    }
    if !(time.end_yr > time.start_yr && time.end_yr.is_finite()) {
        return Err(invalid("time.end_yr", time.end_yr, "must be after start_yr"));
    }
    positive("time.dt_yr", time.dt_yr)?;
    positive("time.save_interval_yr", time.save_interval_yr)?;

    at_least_one("parallel.workers", config.parallel.workers)?;
    at_least_one("parallel.backends", config.parallel.backends)?;

    let encounters = &config.encounters;
    positive("encounters.truncation_parameter", encounters.truncation_parameter)?;
    if !encounters.mass_factor_exponent.is_finite() {
        return Err(invalid(
            "encounters.mass_factor_exponent",
            encounters.mass_factor_exponent,
            "must be finite",
        ));
    }
    positive("encounters.dispersal_radius_au", encounters.dispersal_radius_au)?;
    at_least_one("encounters.max_per_step", encounters.max_per_step)?;

    if config.output.save_path.trim().is_empty() {
        return Err(invalid("output.save_path", "\"\"", "must name a directory"));
    }
    Ok(())
}
