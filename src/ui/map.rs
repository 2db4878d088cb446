//! Braille world map: land outlines, night shading, the terminator and markers.
//!
//! Each terminal cell is a 2x4 braille block. Geometry arrives in the
//! projector's 800x400 canvas space and is scaled onto the dot grid.

use crate::projection::{Point, Projector};
use crate::solar::{is_daylight, SolarPosition};
use crate::terminal::{colors, rgb, Terminal};
use crate::terminator::TerminatorCurve;
use crate::topo::LandTopology;
use crossterm::style::Color;

const LAND_DAY: u8 = 1;
const LAND_NIGHT: u8 = 2;
const TERMINATOR: u8 = 3;
const SUN: u8 = 4;
const MARKER: u8 = 5;

/// Dot offsets inside a braille cell and their bits.
const DOT_LAYOUT: [(usize, usize, u8); 8] = [
    (0, 0, 0x01),
    (1, 0, 0x02),
    (2, 0, 0x04),
    (0, 1, 0x08),
    (1, 1, 0x10),
    (2, 1, 0x20),
    (3, 0, 0x40),
    (3, 1, 0x80),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapArea {
    pub x: u16,
    pub y: u16,
    pub cols: u16,
    pub rows: u16,
}

/// Everything the map needs for one frame.
pub struct MapScene<'a> {
    pub projector: &'a dyn Projector,
    pub canvas: (f64, f64),
    pub land: Option<&'a LandTopology>,
    pub curve: &'a TerminatorCurve,
    pub solar: &'a SolarPosition,
    pub markers: &'a [Point],
}

struct DotGrid {
    width: usize,
    height: usize,
    dots: Vec<u8>,
    scale_x: f64,
    scale_y: f64,
}

impl DotGrid {
    fn new(area: MapArea, canvas: (f64, f64)) -> Self {
        let width = area.cols as usize * 2;
        let height = area.rows as usize * 4;
        Self {
            width,
            height,
            dots: vec![0; width * height],
            scale_x: width as f64 / canvas.0,
            scale_y: height as f64 / canvas.1,
        }
    }

    fn to_dot(&self, p: Point) -> (i64, i64) {
        ((p.x * self.scale_x).floor() as i64, (p.y * self.scale_y).floor() as i64)
    }

    fn plot(&mut self, x: i64, y: i64, value: u8) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let slot = &mut self.dots[y as usize * self.width + x as usize];
        *slot = (*slot).max(value);
    }

    fn line(&mut self, a: Point, b: Point, value: u8) {
        let (mut x0, mut y0) = self.to_dot(a);
        let (x1, y1) = self.to_dot(b);
        // Segments crossing the whole map are antimeridian wraps
        if (x1 - x0).unsigned_abs() as usize > self.width / 2 {
            self.plot(x0, y0, value);
            self.plot(x1, y1, value);
            return;
        }
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.plot(x0, y0, value);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Braille glyph and strongest layer for a cell.
    fn cell(&self, col: usize, row: usize) -> (char, u8) {
        let (bx, by) = (col * 2, row * 4);
        let mut bits = 0u8;
        let mut strongest = 0u8;
        for &(dy, dx, bit) in &DOT_LAYOUT {
            let (x, y) = (bx + dx, by + dy);
            if x >= self.width || y >= self.height {
                continue;
            }
            let value = self.dots[y * self.width + x];
            if value > 0 {
                bits |= bit;
                strongest = strongest.max(value);
            }
        }
        (char::from_u32(0x2800 + bits as u32).unwrap_or(' '), strongest)
    }
}

/// Curve y at canvas x, linearly interpolated and clamped at the ends.
pub fn curve_y_at(curve: &TerminatorCurve, x: f64) -> Option<f64> {
    let points = curve.points();
    let first = points.first()?;
    let last = points.last()?;
    if x <= first.x {
        return Some(first.y);
    }
    if x >= last.x {
        return Some(last.y);
    }
    points.windows(2).find(|w| x >= w[0].x && x <= w[1].x).map(|w| {
        let span = w[1].x - w[0].x;
        if span <= f64::EPSILON {
            w[0].y
        } else {
            w[0].y + (w[1].y - w[0].y) * (x - w[0].x) / span
        }
    })
}

/// Whether a canvas point lies on the night side of the terminator.
/// Canvas y grows southward. Near an equinox the curve is flat and says
/// nothing about sides, so nothing is shaded.
pub fn is_night_side(curve: &TerminatorCurve, solar: &SolarPosition, x: f64, y: f64) -> bool {
    let sin_dec = solar.declination_rad.sin();
    if sin_dec.abs() < 1e-6 {
        return false;
    }
    match curve_y_at(curve, x) {
        Some(boundary) if sin_dec > 0.0 => y > boundary,
        Some(boundary) => y < boundary,
        None => false,
    }
}

pub fn draw(term: &mut Terminal, area: MapArea, scene: &MapScene) {
    if area.cols == 0 || area.rows == 0 {
        return;
    }
    let mut grid = DotGrid::new(area, scene.canvas);

    if let Some(land) = scene.land {
        for ring in &land.rings {
            for pair in ring.windows(2) {
                let (lon, lat) = pair[0];
                let value = if is_daylight(lon, lat, scene.solar) { LAND_DAY } else { LAND_NIGHT };
                let a = scene.projector.project(lon, lat);
                let b = scene.projector.project(pair[1].0, pair[1].1);
                grid.line(a, b, value);
            }
        }
    }

    for pair in scene.curve.points().windows(2) {
        grid.line(pair[0], pair[1], TERMINATOR);
    }

    let sun = scene.projector.project(
        scene.solar.subsolar_longitude_deg,
        scene.solar.declination_rad.to_degrees(),
    );
    let (sx, sy) = grid.to_dot(sun);
    for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        grid.plot(sx + dx, sy + dy, SUN);
    }
    for marker in scene.markers {
        let (mx, my) = grid.to_dot(*marker);
        for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1), (-1, 0), (0, -1)] {
            grid.plot(mx + dx, my + dy, MARKER);
        }
    }

    let night_bg = rgb(8, 12, 36);
    let cell_w = scene.canvas.0 / area.cols as f64;
    let cell_h = scene.canvas.1 / area.rows as f64;
    for row in 0..area.rows as usize {
        for col in 0..area.cols as usize {
            let tx = area.x as i32 + col as i32;
            let ty = area.y as i32 + row as i32;
            let cx = (col as f64 + 0.5) * cell_w;
            let cy = (row as f64 + 0.5) * cell_h;
            let night = is_night_side(scene.curve, scene.solar, cx, cy);
            let (ch, layer) = grid.cell(col, row);
            let (fg, bold) = layer_style(layer);
            let bg = night.then_some(night_bg);
            term.set_with_bg(tx, ty, if layer == 0 { ' ' } else { ch }, fg, bg, bold);
        }
    }
}

fn layer_style(layer: u8) -> (Option<Color>, bool) {
    match layer {
        LAND_DAY => (Some(colors::LAND_DAY), false),
        LAND_NIGHT => (Some(colors::LAND_NIGHT), false),
        TERMINATOR => (Some(colors::TERMINATOR), false),
        SUN => (Some(colors::SUN), true),
        MARKER => (Some(colors::MARKER), true),
        _ => (None, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Equirectangular;
    use crate::solar::solar_position;
    use crate::terminator::{build_curve, curve_for_position};
    use chrono::{TimeZone, Utc};

    #[test]
    fn interpolates_between_samples() {
        let curve = curve_for_position(
            &SolarPosition {
                declination_rad: 0.4,
                subsolar_longitude_deg: 0.0,
            },
            &Equirectangular::default(),
        );
        let p = curve.points();
        let mid = (p[10].x + p[11].x) / 2.0;
        let y = curve_y_at(&curve, mid).unwrap();
        assert!((y - (p[10].y + p[11].y) / 2.0).abs() < 1e-9);
        assert_eq!(curve_y_at(&curve, -50.0), Some(p[0].y));
        assert_eq!(curve_y_at(&TerminatorCurve::default(), 10.0), None);
    }

    #[test]
    fn night_side_in_june() {
        let instant = Utc.with_ymd_and_hms(2026, 6, 21, 12, 0, 0).unwrap();
        let solar = solar_position(instant);
        let projector = Equirectangular::default();
        let curve = build_curve(instant, &projector);
        // Near the subsolar point it is day
        let noon = projector.project(0.0, 20.0);
        assert!(!is_night_side(&curve, &solar, noon.x, noon.y));
        // Antarctica is dark at the June solstice
        let south = projector.project(0.0, -85.0);
        assert!(is_night_side(&curve, &solar, south.x, south.y));
        // Pacific midnight, mid latitudes
        let midnight = projector.project(179.0, 10.0);
        assert!(is_night_side(&curve, &solar, midnight.x, midnight.y));
        // Midnight sun in the Arctic
        let arctic = projector.project(179.0, 80.0);
        assert!(!is_night_side(&curve, &solar, arctic.x, arctic.y));
    }

    #[test]
    fn night_side_flips_in_december() {
        let instant = Utc.with_ymd_and_hms(2026, 12, 21, 12, 0, 0).unwrap();
        let solar = solar_position(instant);
        let projector = Equirectangular::default();
        let curve = build_curve(instant, &projector);
        let north = projector.project(0.0, 85.0);
        assert!(is_night_side(&curve, &solar, north.x, north.y));
        let south = projector.project(0.0, -85.0);
        assert!(!is_night_side(&curve, &solar, south.x, south.y));
    }

    #[test]
    fn equinox_shades_nothing() {
        let solar = SolarPosition {
            declination_rad: 0.0,
            subsolar_longitude_deg: 0.0,
        };
        let curve = curve_for_position(&solar, &Equirectangular::default());
        assert!(!is_night_side(&curve, &solar, 790.0, 390.0));
    }

    #[test]
    fn braille_cell_bits() {
        let area = MapArea { x: 0, y: 0, cols: 2, rows: 1 };
        let mut grid = DotGrid::new(area, (800.0, 400.0));
        grid.plot(0, 0, LAND_DAY);
        grid.plot(1, 3, MARKER);
        assert_eq!(grid.cell(0, 0), ('\u{2881}', MARKER));
        assert_eq!(grid.cell(1, 0), ('\u{2800}', 0));
        // Out of range is ignored
        grid.plot(9, 9, SUN);
    }

    #[test]
    fn wrap_segments_are_not_drawn_across() {
        let area = MapArea { x: 0, y: 0, cols: 10, rows: 2 };
        let mut grid = DotGrid::new(area, (800.0, 400.0));
        grid.line(Point { x: 1.0, y: 100.0 }, Point { x: 799.0, y: 100.0 }, LAND_DAY);
        let lit = grid.dots.iter().filter(|&&v| v > 0).count();
        assert_eq!(lit, 2);
    }
}
