// cd-core/src/units.rs
//
// Internal quantities are plain f64 in astronomical units:
// time [yr], position [pc], velocity [km/s], mass [MSun], disk radius [AU],
// surface density [MSun/AU^2]. Conversions to cgs go through uom so that the
// length and time definitions stay in one place.

use uom::si::f64::{Area, Length, Mass, Time, Velocity};

/// Julian year in days, the year used for every `_yr` quantity.
pub const DAYS_PER_YEAR: f64 = 365.25;

#[inline]
pub fn au(v: f64) -> Length {
    use uom::si::length::astronomical_unit;
    Length::new::<astronomical_unit>(v)
}

#[inline]
pub fn pc(v: f64) -> Length {
    use uom::si::length::parsec;
    Length::new::<parsec>(v)
}

#[inline]
pub fn yr(v: f64) -> Time {
    use uom::si::time::day;
    Time::new::<day>(v * DAYS_PER_YEAR)
}

#[inline]
pub fn kms(v: f64) -> Velocity {
    use uom::si::velocity::kilometer_per_second;
    Velocity::new::<kilometer_per_second>(v)
}

#[inline]
pub fn msun(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v * constants::MSUN_KG)
}

#[inline]
pub fn to_cm(l: Length) -> f64 {
    use uom::si::length::centimeter;
    l.get::<centimeter>()
}

#[inline]
pub fn to_au(l: Length) -> f64 {
    use uom::si::length::astronomical_unit;
    l.get::<astronomical_unit>()
}

#[inline]
pub fn to_pc(l: Length) -> f64 {
    use uom::si::length::parsec;
    l.get::<parsec>()
}

#[inline]
pub fn to_seconds(t: Time) -> f64 {
    use uom::si::time::second;
    t.get::<second>()
}

/// Astronomical unit in cm.
pub fn au_in_cm() -> f64 {
    to_cm(au(1.0))
}

/// Parsec in cm.
pub fn pc_in_cm() -> f64 {
    to_cm(pc(1.0))
}

/// Parsec in AU.
pub fn pc_in_au() -> f64 {
    to_au(pc(1.0))
}

/// Converts a speed in km/s to AU/yr.
pub fn kms_to_au_per_yr(v: f64) -> f64 {
    use uom::si::velocity::centimeter_per_second;
    kms(v).get::<centimeter_per_second>() * to_seconds(yr(1.0)) / au_in_cm()
}

/// Converts a speed in km/s to pc/Myr.
pub fn kms_to_pc_per_myr(v: f64) -> f64 {
    kms_to_au_per_yr(v) * 1e6 / pc_in_au()
}

/// Converts a surface density in g/cm^2 to MSun/AU^2.
pub fn g_per_cm2_to_msun_per_au2(sigma: f64) -> f64 {
    use uom::si::area::square_centimeter;
    use uom::si::mass::gram;
    let per_au2 = Area::new::<square_centimeter>(au_in_cm() * au_in_cm());
    let grams = Mass::new::<gram>(sigma * per_au2.get::<square_centimeter>());
    grams.get::<gram>() / msun(1.0).get::<gram>()
}

/// Converts Earth masses to MSun.
pub fn mearth_to_msun(m: f64) -> f64 {
    m * constants::MEARTH_KG / constants::MSUN_KG
}

/// Converts Jupiter masses to MSun.
pub fn mjup_to_msun(m: f64) -> f64 {
    m * constants::MJUP_KG / constants::MSUN_KG
}

/// Converts MSun to Jupiter masses.
pub fn msun_to_mjup(m: f64) -> f64 {
    m * constants::MSUN_KG / constants::MJUP_KG
}

/// Gravitational constant in AU^3 MSun^-1 yr^-2.
pub fn g_au3_msun_yr2() -> f64 {
    use uom::si::length::meter;
    let au_m = au(1.0).get::<meter>();
    let yr_s = to_seconds(yr(1.0));
    constants::G_SI * constants::MSUN_KG * yr_s * yr_s / (au_m * au_m * au_m)
}

/// Gravitational constant in pc^3 MSun^-1 Myr^-2.
pub fn g_pc3_msun_myr2() -> f64 {
    let pc_au = pc_in_au();
    g_au3_msun_yr2() * 1e12 / (pc_au * pc_au * pc_au)
}

pub mod constants {
    pub const MSUN_KG: f64 = 1.98892e30;
    pub const MEARTH_KG: f64 = 5.9722e24;
    pub const MJUP_KG: f64 = 1.8987e27;

    /// Solar luminosity [erg/s].
    pub const LSUN_ERG_S: f64 = 3.839e33;

    /// Habing unit of FUV flux [erg s^-1 cm^-2].
    pub const G0_ERG_S_CM2: f64 = 1.6e-3;

    /// Gravitational constant [m^3 kg^-1 s^-2].
    pub const G_SI: f64 = 6.674_30e-11;

    /// Boltzmann constant [erg/K].
    pub const K_B_CGS: f64 = 1.380_649e-16;

    /// Hydrogen atom mass [g].
    pub const M_H_CGS: f64 = 1.673_533e-24;

    /// Solar radius in AU.
    pub const RSUN_AU: f64 = 4.650_467e-3;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, rel: f64) -> bool {
        (a - b).abs() <= rel * b.abs()
    }

    #[test]
    fn length_conversions() {
        assert!(close(au_in_cm(), 1.495_978_707e13, 1e-9));
        assert!(close(pc_in_au(), 206_264.806, 1e-6));
        assert!(close(pc_in_cm(), 3.085_677_58e18, 1e-6));
    }

    #[test]
    fn velocity_conversions() {
        // 1 km/s is about 0.2109 AU/yr and 1.0227 pc/Myr
        assert!(close(kms_to_au_per_yr(1.0), 0.210_945, 1e-4));
        assert!(close(kms_to_pc_per_myr(1.0), 1.022_712, 1e-4));
    }

    #[test]
    fn gravitational_constant_in_astronomical_units() {
        // close to 4 pi^2 in AU^3 MSun^-1 yr^-2
        assert!(close(g_au3_msun_yr2(), 4.0 * std::f64::consts::PI.powi(2), 1e-3));
        assert!(close(g_pc3_msun_myr2(), 4.4985e-3, 1e-3));
    }

    #[test]
    fn surface_density_conversion() {
        // 1 g/cm^2 over 1 AU^2 is 2.238e26 g = 1.125e-7 MSun
        assert!(close(g_per_cm2_to_msun_per_au2(1.0), 1.1252e-7, 1e-3));
    }

    #[test]
    fn mass_conversions() {
        assert!(close(mjup_to_msun(1047.0), 1.0, 1e-3));
        assert!(close(msun_to_mjup(mjup_to_msun(3.0)), 3.0, 1e-12));
        assert!(mearth_to_msun(0.03) < 1e-7);
    }
}
