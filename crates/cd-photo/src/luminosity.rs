//! FUV luminosity of bright stars from their mass.

/// `(lower, upper, coefficient, exponent)`; `L = c m^e` for `lower < m < upper`.
const SEGMENTS: [(f64, f64, f64, f64); 10] = [
    (0.12, 0.24, 1.70294e16, 42.557),
    (0.24, 0.56, 9.11137e-9, 3.8845),
    (0.56, 0.70, 1.10021e-6, 12.237),
    (0.70, 0.91, 2.38690e-4, 27.199),
    (0.91, 1.37, 1.02477e-4, 18.465),
    (1.37, 2.07, 9.66362e-4, 11.410),
    (2.07, 3.72, 6.49335e-2, 5.6147),
    (3.72, 10.0, 6.99075e-1, 3.8058),
    (10.0, 20.2, 9.73664e0, 2.6620),
    (20.2, f64::INFINITY, 1.31175e2, 1.7974),
];

/// FUV luminosity [LSun] of a star of `mass` MSun.
///
/// Piecewise power law over open mass intervals. Masses at or below 0.12 and
/// exactly on a segment boundary give zero.
pub fn luminosity_fit(mass: f64) -> f64 {
    SEGMENTS
        .iter()
        .find(|(lo, hi, _, _)| *lo < mass && mass < *hi)
        .map_or(0.0, |(_, _, c, e)| c * mass.powf(*e))
}
