//! Day/night boundary as a projected polyline.

use crate::projection::{Point, Projector};
use crate::solar::{solar_position, SolarPosition};
use chrono::{DateTime, Utc};
use std::fmt::Write;

/// Longitude sampling step in degrees.
pub const LONGITUDE_STEP_DEG: i32 = 2;

/// Below this |sin(declination)| the sun sits on the equator and the
/// terminator collapses onto the meridians; latitude is pinned to 0 instead.
const EQUINOX_EPSILON: f64 = 1e-6;

/// Ordered projected points from longitude -180 to 180.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerminatorCurve {
    points: Vec<Point>,
}

impl TerminatorCurve {
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// SVG path data: move to the first point, line to the rest.
    pub fn to_svg_path(&self) -> String {
        let mut out = String::with_capacity(self.points.len() * 18);
        for (i, pt) in self.points.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(out, "{} {:.2} {:.2}", cmd, pt.x, pt.y);
        }
        out
    }
}

/// Sampled longitudes, -180..=180.
pub fn sample_longitudes() -> impl Iterator<Item = f64> {
    (-180..=180).step_by(LONGITUDE_STEP_DEG as usize).map(f64::from)
}

/// Terminator latitude (degrees) at a longitude.
pub fn terminator_latitude(lon_deg: f64, position: &SolarPosition) -> f64 {
    let sin_dec = position.declination_rad.sin();
    if sin_dec.abs() < EQUINOX_EPSILON {
        return 0.0;
    }
    let cos_dec = position.declination_rad.cos();
    let hour_angle = (lon_deg - position.subsolar_longitude_deg).to_radians();
    let tan_lat = -hour_angle.cos() * cos_dec / sin_dec;
    tan_lat.atan().to_degrees()
}

/// Curve for an already computed solar position.
pub fn curve_for_position(position: &SolarPosition, projector: &dyn Projector) -> TerminatorCurve {
    let points = sample_longitudes()
        .map(|lon| projector.project(lon, terminator_latitude(lon, position)))
        .collect();
    TerminatorCurve { points }
}

pub fn build_curve(instant: DateTime<Utc>, projector: &dyn Projector) -> TerminatorCurve {
    curve_for_position(&solar_position(instant), projector)
}
