use crate::CoreError;

/// Floating point type used throughout system
pub type Real = f64;

/// Cartesian 3-vector for positions and velocities.
pub type Vec3 = nalgebra::Vector3<Real>;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Log-spaced points from `lo` to `hi` inclusive.
pub fn log_spaced(lo: Real, hi: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let (l0, l1) = (lo.ln(), hi.ln());
            let step = (l1 - l0) / (n - 1) as Real;
            (0..n).map(|i| (l0 + step * i as Real).exp()).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        assert!(format!("{err}").contains("Non-finite"));
    }

    #[test]
    fn log_spaced_hits_endpoints() {
        let pts = log_spaced(0.05, 2000.0, 5);
        assert_eq!(pts.len(), 5);
        assert!((pts[0] - 0.05).abs() < 1e-15);
        assert!((pts[4] - 2000.0).abs() < 1e-9);
        assert!(pts.windows(2).all(|w| w[1] > w[0]));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn log_spaced_is_increasing_and_hits_ends(lo in 1e-3..1.0f64, span in 1.5..1e4f64, n in 2usize..300) {
                let hi = lo * span;
                let points = log_spaced(lo, hi, n);
                prop_assert_eq!(points.len(), n);
                prop_assert!(points.windows(2).all(|w| w[1] > w[0]));
                prop_assert!((points[0] - lo).abs() <= 1e-12 * lo);
                prop_assert!((points[n - 1] - hi).abs() <= 1e-9 * hi);
            }
        }
    }
}
