//! Longitude/latitude to canvas coordinates.
//!
//! Callers hold a [`ProjectorSlot`] and never care whether the fitted map
//! projection has arrived yet: until it does (or forever, if the map data
//! fails to load) the plain equirectangular fallback answers.

use std::f64::consts::PI;

/// Reference canvas the core projects onto. The terminal UI rescales from it.
pub const CANVAS_WIDTH: f64 = 800.0;
pub const CANVAS_HEIGHT: f64 = 400.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

pub trait Projector {
    fn project(&self, lon_deg: f64, lat_deg: f64) -> Point;
}

/// Any `[lon, lat] -> [x, y]` function is a projector.
impl<F> Projector for F
where
    F: Fn([f64; 2]) -> [f64; 2],
{
    fn project(&self, lon_deg: f64, lat_deg: f64) -> Point {
        let [x, y] = self([lon_deg, lat_deg]);
        Point { x, y }
    }
}

/// Whole globe stretched over the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Equirectangular {
    pub width: f64,
    pub height: f64,
}

impl Default for Equirectangular {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }
}

impl Projector for Equirectangular {
    fn project(&self, lon_deg: f64, lat_deg: f64) -> Point {
        Point {
            x: (lon_deg + 180.0) / 360.0 * self.width,
            y: (90.0 - lat_deg) / 180.0 * self.height,
        }
    }
}

/// Geographic extent in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn empty() -> Self {
        Self {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        }
    }

    pub fn include(&mut self, lon: f64, lat: f64) {
        self.min_lon = self.min_lon.min(lon);
        self.max_lon = self.max_lon.max(lon);
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
    }

    pub fn is_empty(&self) -> bool {
        !(self.min_lon <= self.max_lon && self.min_lat <= self.max_lat)
    }
}

/// Equirectangular projection scaled and centered so `bounds` fills the
/// canvas while keeping the aspect ratio (the map data's own fit).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FittedEquirectangular {
    scale: f64,
    translate_x: f64,
    translate_y: f64,
}

impl FittedEquirectangular {
    pub fn fit(bounds: &Bounds, width: f64, height: f64) -> Option<Self> {
        if bounds.is_empty() {
            return None;
        }
        let (x0, x1) = (bounds.min_lon.to_radians(), bounds.max_lon.to_radians());
        let (y0, y1) = (bounds.min_lat.to_radians(), bounds.max_lat.to_radians());
        let span_x = x1 - x0;
        let span_y = y1 - y0;

        let scale = match (span_x > 0.0, span_y > 0.0) {
            (true, true) => (width / span_x).min(height / span_y),
            (true, false) => width / span_x,
            (false, true) => height / span_y,
            (false, false) => width / (2.0 * PI),
        };

        Some(Self {
            scale,
            translate_x: (width - scale * (x0 + x1)) / 2.0,
            translate_y: (height + scale * (y0 + y1)) / 2.0,
        })
    }
}

impl Projector for FittedEquirectangular {
    fn project(&self, lon_deg: f64, lat_deg: f64) -> Point {
        Point {
            x: self.translate_x + self.scale * lon_deg.to_radians(),
            y: self.translate_y - self.scale * lat_deg.to_radians(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapState {
    Pending,
    Loaded,
    Unavailable,
}

/// The one mutable projection slot.
pub struct ProjectorSlot {
    fallback: Equirectangular,
    delegate: Option<Box<dyn Projector>>,
    state: MapState,
}

impl ProjectorSlot {
    pub fn new(fallback: Equirectangular) -> Self {
        Self {
            fallback,
            delegate: None,
            state: MapState::Pending,
        }
    }

    /// Swap in a delegate. Ignored once the map has been declared unavailable.
    pub fn install(&mut self, delegate: impl Projector + 'static) {
        if self.state == MapState::Unavailable {
            log::debug!("ignoring projection delegate after map failure");
            return;
        }
        self.delegate = Some(Box::new(delegate));
        self.state = MapState::Loaded;
    }

    /// Pin the fallback for the rest of the session.
    pub fn mark_unavailable(&mut self) {
        self.delegate = None;
        self.state = MapState::Unavailable;
    }

    pub fn state(&self) -> MapState {
        self.state
    }

    pub fn canvas(&self) -> (f64, f64) {
        (self.fallback.width, self.fallback.height)
    }
}

impl Default for ProjectorSlot {
    fn default() -> Self {
        Self::new(Equirectangular::default())
    }
}

impl Projector for ProjectorSlot {
    fn project(&self, lon_deg: f64, lat_deg: f64) -> Point {
        match &self.delegate {
            Some(delegate) => delegate.project(lon_deg, lat_deg),
            None => self.fallback.project(lon_deg, lat_deg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, x: f64, y: f64) -> bool {
        (a.x - x).abs() < 1e-9 && (a.y - y).abs() < 1e-9
    }

    #[test]
    fn fallback_centers_origin() {
        let slot = ProjectorSlot::default();
        assert!(close(slot.project(0.0, 0.0), 400.0, 200.0));
    }

    #[test]
    fn fallback_corners() {
        let p = Equirectangular::default();
        assert!(close(p.project(-180.0, 90.0), 0.0, 0.0));
        assert!(close(p.project(180.0, -90.0), 800.0, 400.0));
    }

    #[test]
    fn closure_delegate_is_used_once_installed() {
        let mut slot = ProjectorSlot::default();
        slot.install(|[lon, lat]: [f64; 2]| [lon * 2.0, -lat]);
        assert_eq!(slot.state(), MapState::Loaded);
        assert!(close(slot.project(10.0, 5.0), 20.0, -5.0));
    }

    #[test]
    fn unavailable_map_pins_fallback() {
        let mut slot = ProjectorSlot::default();
        slot.mark_unavailable();
        slot.install(|_: [f64; 2]| [0.0, 0.0]);
        assert_eq!(slot.state(), MapState::Unavailable);
        assert!(close(slot.project(0.0, 0.0), 400.0, 200.0));
    }

    #[test]
    fn full_globe_fit_matches_fallback() {
        let bounds = Bounds {
            min_lon: -180.0,
            min_lat: -90.0,
            max_lon: 180.0,
            max_lat: 90.0,
        };
        let fitted = FittedEquirectangular::fit(&bounds, 800.0, 400.0).unwrap();
        let fallback = Equirectangular::default();
        for (lon, lat) in [(0.0, 0.0), (-180.0, 90.0), (120.0, -45.0)] {
            let a = fitted.project(lon, lat);
            let b = fallback.project(lon, lat);
            assert!((a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6);
        }
    }

    #[test]
    fn fit_keeps_bounds_inside_canvas() {
        let bounds = Bounds {
            min_lon: -180.0,
            min_lat: -85.6,
            max_lon: 180.0,
            max_lat: 83.6,
        };
        let fitted = FittedEquirectangular::fit(&bounds, 800.0, 400.0).unwrap();
        let top_left = fitted.project(-180.0, 83.6);
        let bottom_right = fitted.project(180.0, -85.6);
        assert!(top_left.x >= -1e-9 && top_left.y >= -1e-9);
        assert!(bottom_right.x <= 800.0 + 1e-9 && bottom_right.y <= 400.0 + 1e-9);
        // Width is the binding dimension here
        assert!((bottom_right.x - top_left.x - 800.0).abs() < 1e-6);
    }

    #[test]
    fn empty_bounds_do_not_fit() {
        assert!(FittedEquirectangular::fit(&Bounds::empty(), 800.0, 400.0).is_none());
    }
}
