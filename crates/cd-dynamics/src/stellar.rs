//! Stellar evolution collaborator.

use cd_core::StarKey;

use crate::error::{DynamicsError, DynamicsResult};

/// A bright star as held by the stellar evolution code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StellarParticle {
    pub key: StarKey,
    /// [MSun]
    pub mass: f64,
    /// [RSun]
    pub radius: f64,
}

/// Evolves the bright stars. Times are absolute simulation times in years.
pub trait StellarCode: Send {
    fn model_time(&self) -> f64;

    fn evolve_model(&mut self, t_end: f64) -> DynamicsResult<()>;

    fn particles(&self) -> Vec<StellarParticle>;
}

/// Zero-age main sequence: masses stay fixed and `R = M^0.8`.
#[derive(Debug, Clone)]
pub struct ZamsStellar {
    stars: Vec<StellarParticle>,
    time: f64,
}

impl ZamsStellar {
    pub fn new(stars: impl IntoIterator<Item = (StarKey, f64)>, start_time_yr: f64) -> Self {
        Self {
            stars: stars
                .into_iter()
                .map(|(key, mass)| StellarParticle {
                    key,
                    mass,
                    radius: zams_radius(mass),
                })
                .collect(),
            time: start_time_yr,
        }
    }
}

/// Main-sequence radius [RSun] of a star of `mass` MSun.
pub fn zams_radius(mass: f64) -> f64 {
    mass.max(0.0).powf(0.8)
}

impl StellarCode for ZamsStellar {
    fn model_time(&self) -> f64 {
        self.time
    }

    fn evolve_model(&mut self, t_end: f64) -> DynamicsResult<()> {
        if t_end < self.time {
            return Err(DynamicsError::Backwards {
                from_yr: self.time,
                to_yr: t_end,
            });
        }
        self.time = t_end;
        Ok(())
    }

    fn particles(&self) -> Vec<StellarParticle> {
        self.stars.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masses_stay_fixed() {
        let mut code = ZamsStellar::new([(StarKey::new(3), 10.0)], 0.0);
        code.evolve_model(500.0).unwrap();
        code.evolve_model(1000.0).unwrap();
        let p = code.particles();
        assert_eq!(p.len(), 1);
        assert_eq!(p[0].mass, 10.0);
        assert!((p[0].radius - 10f64.powf(0.8)).abs() < 1e-12);
        assert_eq!(code.model_time(), 1000.0);
        assert!(code.evolve_model(10.0).is_err());
    }
}
