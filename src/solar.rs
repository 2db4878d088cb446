//! Solar position from the NOAA fractional-year series.
//!
//! Low-order Fourier fits for declination and the equation of time; accurate
//! to a few arc-minutes, which is plenty for a terminal map.

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::f64::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolarPosition {
    /// Radians, within roughly [-0.41, 0.41].
    pub declination_rad: f64,
    /// Longitude of local apparent noon, degrees in [-180, 180].
    pub subsolar_longitude_deg: f64,
}

/// Fractional-year angle γ (radians) for an instant.
///
/// Whole ordinal day plus whole UTC hour, so γ steps once an hour.
pub fn fractional_year(instant: DateTime<Utc>) -> f64 {
    let day_fraction = (instant.ordinal() as f64 - 1.0) + (instant.hour() as f64 - 12.0) / 24.0;
    2.0 * PI / 365.0 * day_fraction
}

/// Solar declination (radians) for a fractional-year angle.
pub fn declination(gamma: f64) -> f64 {
    0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin()
}

/// Equation of time (minutes) for a fractional-year angle.
pub fn equation_of_time_minutes(gamma: f64) -> f64 {
    229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin())
}

pub fn solar_position(instant: DateTime<Utc>) -> SolarPosition {
    let gamma = fractional_year(instant);
    let eqtime = equation_of_time_minutes(gamma);

    let minutes = instant.hour() as f64 * 60.0 + instant.minute() as f64 + instant.second() as f64 / 60.0;
    let true_solar_time = (minutes + eqtime + 1440.0) % 1440.0;

    SolarPosition {
        declination_rad: declination(gamma),
        subsolar_longitude_deg: (720.0 - true_solar_time) / 4.0,
    }
}

/// True when the sun is above the horizon (geometric, no refraction) at the point.
pub fn is_daylight(lon_deg: f64, lat_deg: f64, position: &SolarPosition) -> bool {
    let lat = lat_deg.to_radians();
    let hour_angle = (lon_deg - position.subsolar_longitude_deg).to_radians();
    let decl = position.declination_rad;
    lat.sin() * decl.sin() + lat.cos() * decl.cos() * hour_angle.cos() > 0.0
}
