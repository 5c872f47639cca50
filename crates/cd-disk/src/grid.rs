//! Shared radial discretisation.

use cd_core::log_spaced;
use std::f64::consts::PI;

use crate::error::{DiskError, DiskResult};

/// Log-spaced radial grid in AU.
///
/// Built once at setup and shared through `Arc` by every disk and backend;
/// it is never mutated afterwards, so concurrent reads are safe.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGrid {
    /// Cell interfaces, `n_cells + 1` values
    edges: Vec<f64>,
    /// Cell centres (geometric mean of the bounding interfaces)
    centers: Vec<f64>,
    /// Annulus areas, AU^2
    areas: Vec<f64>,
}

impl RadialGrid {
    /// Build a grid of `n_cells` cells between `r_min` and `r_max` (AU).
    pub fn new(n_cells: usize, r_min: f64, r_max: f64) -> DiskResult<Self> {
        if n_cells < 2 {
            return Err(DiskError::InvalidArg {
                what: "grid needs at least 2 cells",
            });
        }
        if !(r_min > 0.0 && r_max > r_min && r_max.is_finite()) {
            return Err(DiskError::InvalidArg {
                what: "grid radii must satisfy 0 < r_min < r_max",
            });
        }

        let edges = log_spaced(r_min, r_max, n_cells + 1);
        let centers = edges.windows(2).map(|w| (w[0] * w[1]).sqrt()).collect();
        let areas = edges
            .windows(2)
            .map(|w| PI * (w[1] * w[1] - w[0] * w[0]))
            .collect();

        Ok(Self {
            edges,
            centers,
            areas,
        })
    }

    pub fn n_cells(&self) -> usize {
        self.centers.len()
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    pub fn areas(&self) -> &[f64] {
        &self.areas
    }

    pub fn r_min(&self) -> f64 {
        self.edges[0]
    }

    pub fn r_max(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_geometry_is_consistent() {
        let grid = RadialGrid::new(100, 0.05, 2000.0).unwrap();
        assert_eq!(grid.n_cells(), 100);
        assert_eq!(grid.edges().len(), 101);
        assert!((grid.r_min() - 0.05).abs() < 1e-12);
        assert!((grid.r_max() - 2000.0).abs() < 1e-9);

        for i in 0..grid.n_cells() {
            assert!(grid.edges()[i] < grid.centers()[i]);
            assert!(grid.centers()[i] < grid.edges()[i + 1]);
        }

        let total: f64 = grid.areas().iter().sum();
        let expected = PI * (2000.0_f64.powi(2) - 0.05_f64.powi(2));
        assert!((total - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn rejects_bad_bounds() {
        assert!(RadialGrid::new(1, 0.05, 2000.0).is_err());
        assert!(RadialGrid::new(10, 0.0, 2000.0).is_err());
        assert!(RadialGrid::new(10, 5.0, 1.0).is_err());
    }
}
