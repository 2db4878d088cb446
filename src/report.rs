//! Plain-text output for the one-shot commands.

use crate::city::City;
use crate::solar::{equation_of_time_minutes, fractional_year, solar_position};
use crate::terminator::TerminatorCurve;
use chrono::{DateTime, SecondsFormat, Utc};
use clap::ValueEnum;
use std::fmt::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CurveFormat {
    /// SVG path data
    Svg,
    /// One `x y` pair per line
    Points,
}

fn hemisphere(value: f64, positive: char, negative: char) -> String {
    let side = if value >= 0.0 { positive } else { negative };
    format!("{:.2}°{side}", value.abs())
}

pub fn sun_report(instant: DateTime<Utc>) -> String {
    let position = solar_position(instant);
    let eot = equation_of_time_minutes(fractional_year(instant));
    let mut out = String::new();
    let _ = writeln!(out, "instant           {}", instant.to_rfc3339_opts(SecondsFormat::Secs, true));
    let _ = writeln!(
        out,
        "declination       {:.5} rad ({:.3}°)",
        position.declination_rad,
        position.declination_rad.to_degrees()
    );
    let _ = writeln!(out, "equation of time  {eot:+.2} min");
    let _ = writeln!(
        out,
        "subsolar point    {} {}",
        hemisphere(position.declination_rad.to_degrees(), 'N', 'S'),
        hemisphere(position.subsolar_longitude_deg, 'E', 'W')
    );
    out
}

pub fn curve_report(curve: &TerminatorCurve, format: CurveFormat) -> String {
    match format {
        CurveFormat::Svg => format!("{}\n", curve.to_svg_path()),
        CurveFormat::Points => {
            let mut out = String::with_capacity(curve.len() * 16);
            for p in curve.points() {
                let _ = writeln!(out, "{:.2} {:.2}", p.x, p.y);
            }
            out
        }
    }
}

pub fn city_report(city: &City) -> String {
    let coords = city
        .coordinates()
        .map(|(lat, lon)| format!("{} {}", hemisphere(lat, 'N', 'S'), hemisphere(lon, 'E', 'W')))
        .unwrap_or_else(|| "--".to_string());
    format!("{}\t{}\t{}\n", city.label, city.timezone_id, coords)
}

/// `server 2026-10-17T14:05:09.000Z  offset +3s`
pub fn sync_report(server_unix_ms: i64, offset_label: &str) -> String {
    let server = DateTime::from_timestamp_millis(server_unix_ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| server_unix_ms.to_string());
    format!("server {server}  {offset_label}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Equirectangular;
    use crate::terminator::build_curve;
    use chrono::TimeZone;

    #[test]
    fn sun_report_at_june_solstice() {
        let instant = Utc.with_ymd_and_hms(2026, 6, 21, 12, 0, 0).unwrap();
        let report = sun_report(instant);
        assert!(report.starts_with("instant           2026-06-21T12:00:00Z\n"));
        assert!(report.contains("declination       0.409"));
        assert!(report.contains("equation of time  -1.3"));
        assert!(report.contains("subsolar point    23.45°N 0.33°E"));
    }

    #[test]
    fn point_list_has_one_line_per_sample() {
        let instant = Utc.with_ymd_and_hms(2026, 3, 20, 12, 0, 0).unwrap();
        let curve = build_curve(instant, &Equirectangular::default());
        let points = curve_report(&curve, CurveFormat::Points);
        assert_eq!(points.lines().count(), 181);
        assert!(points.lines().next().unwrap().starts_with("0.00 "));
        let svg = curve_report(&curve, CurveFormat::Svg);
        assert!(svg.starts_with("M 0.00 "));
        assert_eq!(svg.lines().count(), 1);
    }

    #[test]
    fn city_line() {
        let mut city = City::from_timezone("America/Lima");
        city.label = "Lima, Peru".to_string();
        assert_eq!(city_report(&city), "Lima, Peru\tAmerica/Lima\t--\n");
        city.latitude = Some(-12.05);
        city.longitude = Some(-77.04);
        assert_eq!(city_report(&city), "Lima, Peru\tAmerica/Lima\t12.05°S 77.04°W\n");
    }

    #[test]
    fn sync_line() {
        assert_eq!(
            sync_report(1_792_245_909_000, "offset +3s"),
            "server 2026-10-17T14:05:09.000Z  offset +3s\n"
        );
    }
}
