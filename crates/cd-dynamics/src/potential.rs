//! Static external potentials.

use cd_core::Vec3;
use cd_core::units;

/// External field felt by every particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundPotential {
    /// `Phi = v0^2 / 2 ln(r^2 + r_core^2)`, centred on the origin.
    Logarithmic {
        /// Circular speed at large radius [km/s]
        v0_kms: f64,
        /// [pc]
        r_core_pc: f64,
    },
}

impl BackgroundPotential {
    /// Flat rotation curve of the Galaxy.
    pub fn galactic() -> Self {
        Self::Logarithmic {
            v0_kms: 220.0,
            r_core_pc: 100.0,
        }
    }

    /// Speed of a circular orbit at distance `r_pc` from the centre [km/s].
    pub fn circular_velocity(&self, r_pc: f64) -> f64 {
        match *self {
            Self::Logarithmic { v0_kms, r_core_pc } => v0_kms * r_pc / (r_pc * r_pc + r_core_pc * r_core_pc).sqrt(),
        }
    }

    /// Acceleration at `position` [pc/Myr^2].
    pub fn acceleration(&self, position: &Vec3) -> Vec3 {
        match *self {
            Self::Logarithmic { v0_kms, r_core_pc } => {
                let v0 = units::kms_to_pc_per_myr(v0_kms);
                let denom = position.norm_squared() + r_core_pc * r_core_pc;
                position * (-v0 * v0 / denom)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_speed_is_flat_far_out() {
        let pot = BackgroundPotential::galactic();
        let r = 8000.0;
        let a = pot.acceleration(&Vec3::new(r, 0.0, 0.0));
        assert!(a.x < 0.0);
        let v_circ = (a.norm() * r).sqrt();
        let expected = units::kms_to_pc_per_myr(220.0);
        assert!((v_circ - expected).abs() / expected < 1e-3);
    }

    #[test]
    fn circular_velocity_matches_acceleration() {
        let pot = BackgroundPotential::galactic();
        for r in [50.0, 100.0, 1000.0] {
            let a = pot.acceleration(&Vec3::new(r, 0.0, 0.0)).norm();
            let v = units::kms_to_pc_per_myr(pot.circular_velocity(r));
            assert!((v * v / r - a).abs() / a < 1e-9);
        }
    }
}
