//! The world clock controller.
//!
//! `WorldClock` owns every piece of mutable state: the synced clock, the city
//! board, the projector slot and the cached terminator. Network results come
//! in through the `apply_*`/`finish_*` methods, always on the main loop.

use crate::api::LocalInfo;
use crate::board::{ActivationResult, ActiveRef, CityBoard, LOCAL_CITY_ID};
use crate::city::City;
use crate::clock_sync::{ClockSync, SyncStatus, SystemTimeSource, TimeSource};
use crate::error::{ApiError, LookupError, ProjectionError};
use crate::format;
use crate::projection::{FittedEquirectangular, MapState, Point, Projector, ProjectorSlot};
use crate::solar::{solar_position, SolarPosition};
use crate::terminator::{curve_for_position, TerminatorCurve};
use crate::topo::LandTopology;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub const READY_HINT: &str = "Search by city name and we'll find the timezone.";
pub const READY_PLACEHOLDER: &str = "e.g. Mexico City";
const DUPLICATE_HINT: &str = "Already on your board. Jumped to it.";
const SEARCHING: &str = "Searching...";

/// Input-line state for city lookups.
#[derive(Clone, Debug, PartialEq)]
pub struct LookupState {
    generation: u64,
    busy: bool,
    pub hint: &'static str,
    pub placeholder: &'static str,
}

impl LookupState {
    fn ready() -> Self {
        Self {
            generation: 0,
            busy: false,
            hint: READY_HINT,
            placeholder: READY_PLACEHOLDER,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }
}

/// Headline panel strings.
#[derive(Clone, Debug, PartialEq)]
pub struct HeroView {
    pub time: String,
    pub suffix: &'static str,
    pub date: String,
    pub zone: String,
    pub sun: String,
    pub location: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CardView {
    pub id: String,
    pub label: String,
    pub time: String,
    pub meta: String,
    pub active: bool,
}

pub struct WorldClock<S: TimeSource = SystemTimeSource> {
    clock: ClockSync<S>,
    board: CityBoard,
    projector: ProjectorSlot,
    solar: SolarPosition,
    curve: TerminatorCurve,
    land: Option<LandTopology>,
    lookup: LookupState,
    twenty_four: bool,
}

impl<S: TimeSource> WorldClock<S> {
    pub fn new(source: S, board: CityBoard, twenty_four: bool) -> Self {
        let mut app = Self {
            clock: ClockSync::new(source),
            board,
            projector: ProjectorSlot::default(),
            solar: SolarPosition {
                declination_rad: 0.0,
                subsolar_longitude_deg: 0.0,
            },
            curve: TerminatorCurve::default(),
            land: None,
            lookup: LookupState::ready(),
            twenty_four,
        };
        app.recompute_terminator();
        app
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now()).unwrap_or_default()
    }

    pub fn board(&self) -> &CityBoard {
        &self.board
    }

    pub fn projector(&self) -> &ProjectorSlot {
        &self.projector
    }

    pub fn map_state(&self) -> MapState {
        self.projector.state()
    }

    pub fn land(&self) -> Option<&LandTopology> {
        self.land.as_ref()
    }

    pub fn solar(&self) -> &SolarPosition {
        &self.solar
    }

    pub fn curve(&self) -> &TerminatorCurve {
        &self.curve
    }

    pub fn lookup(&self) -> &LookupState {
        &self.lookup
    }

    pub fn twenty_four(&self) -> bool {
        self.twenty_four
    }

    pub fn toggle_twenty_four(&mut self) {
        self.twenty_four = !self.twenty_four;
    }

    // ---- time sync ----

    /// Claim the sync slot. False while a previous request is still out.
    pub fn begin_sync(&mut self) -> bool {
        self.clock.begin_sync()
    }

    pub fn apply_time(&mut self, result: Result<i64, ApiError>) {
        match result {
            Ok(server_ms) => self.clock.resync(server_ms),
            Err(err) => {
                log::warn!("time sync failed: {err}");
                self.clock.fail_sync();
            }
        }
    }

    /// `Synced` / `offset +3s`
    pub fn sync_status(&self) -> (SyncStatus, String) {
        (self.clock.status(), self.clock.offset_label())
    }

    // ---- terminator ----

    /// Rebuild the solar position and the curve for the current instant.
    pub fn recompute_terminator(&mut self) {
        self.solar = solar_position(self.now_utc());
        self.curve = curve_for_position(&self.solar, &self.projector);
    }

    pub fn apply_map(&mut self, result: Result<LandTopology, ProjectionError>) {
        let fitted = result.and_then(|land| {
            let (width, height) = self.projector.canvas();
            let fitted = FittedEquirectangular::fit(&land.bounds, width, height)
                .ok_or(ProjectionError::Empty)?;
            Ok((land, fitted))
        });
        match fitted {
            Ok((land, projection)) => {
                log::info!("map loaded: {} rings, {} points", land.rings.len(), land.point_count());
                self.projector.install(projection);
                if self.projector.state() == MapState::Loaded {
                    self.land = Some(land);
                }
            }
            Err(err) => {
                log::warn!("{err}; using plain equirectangular projection");
                self.projector.mark_unavailable();
            }
        }
        // Curve points are in projected space
        self.recompute_terminator();
    }

    /// Where a city sits on the map, if it has coordinates.
    pub fn city_point(&self, city: &City) -> Option<Point> {
        let (lat, lon) = city.coordinates()?;
        Some(self.projector.project(lon, lat))
    }

    // ---- board ----

    pub fn apply_local(&mut self, result: Result<LocalInfo, ApiError>) {
        let info = match result {
            Ok(info) => info,
            Err(err) => {
                log::warn!("local lookup failed: {err}");
                return;
            }
        };
        let mut local = info.to_city("UTC");
        local.fill_sun_times(self.now() / 1000);
        log::info!("local city: {} ({})", local.label, local.timezone_id);
        self.board.set_local(local);
        if self.board.active_ref().is_none() {
            self.board.set_active(LOCAL_CITY_ID);
        }
    }

    pub fn select(&mut self, id: &str) -> bool {
        self.board.set_active(id)
    }

    pub fn select_local(&mut self) -> bool {
        self.board.set_active(LOCAL_CITY_ID)
    }

    /// Move the selection through the board, wrapping at either end.
    pub fn cycle(&mut self, forward: bool) {
        let len = self.board.len();
        if len == 0 {
            return;
        }
        let next = match (self.board.active_index(), forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        let id = self.board.list()[next].id.clone();
        self.board.set_active(&id);
    }

    /// Remove the active board city. The headline falls back to local time.
    pub fn remove_active(&mut self) -> Option<City> {
        let Some(ActiveRef::City(id)) = self.board.active_ref().cloned() else {
            return None;
        };
        let removed = self.board.remove(&id);
        if let Some(city) = &removed {
            log::info!("removed {}", city.label);
        }
        removed
    }

    pub fn reset_board(&mut self) {
        self.board.reset();
    }

    // ---- lookups ----

    /// Start a lookup and return its generation, or `None` for a blank query.
    /// Any earlier lookup still in flight is superseded.
    pub fn start_lookup(&mut self, query: &str) -> Option<u64> {
        if query.trim().is_empty() {
            return None;
        }
        self.lookup.generation += 1;
        self.lookup.busy = true;
        self.lookup.hint = SEARCHING;
        self.lookup.placeholder = SEARCHING;
        Some(self.lookup.generation)
    }

    /// Apply a lookup result. Results from superseded lookups are dropped and
    /// yield `None`.
    pub fn finish_lookup(
        &mut self,
        generation: u64,
        result: Result<City, LookupError>,
    ) -> Option<Result<ActivationResult, LookupError>> {
        if generation != self.lookup.generation {
            log::debug!("discarding stale lookup #{generation}");
            return None;
        }
        self.lookup.busy = false;
        let outcome = match result {
            Ok(mut city) => {
                city.fill_sun_times(self.now() / 1000);
                let label = city.label.clone();
                let activation = self.board.add_or_activate(city);
                match activation {
                    ActivationResult::Added => {
                        log::info!("added {label}");
                        self.lookup.hint = READY_HINT;
                    }
                    ActivationResult::AlreadyPresent => self.lookup.hint = DUPLICATE_HINT,
                }
                self.lookup.placeholder = READY_PLACEHOLDER;
                Ok(activation)
            }
            Err(err) => {
                log::info!("lookup failed: {err}");
                self.lookup.hint = err.hint();
                self.lookup.placeholder = err.placeholder();
                Err(err)
            }
        };
        Some(outcome)
    }

    // ---- views ----

    /// The city the headline shows: the active one, else the device-local one.
    pub fn hero_city(&self) -> Option<&City> {
        self.board.active().or_else(|| self.board.local())
    }

    pub fn hero_timezone(&self) -> Tz {
        self.hero_city()
            .and_then(|c| format::parse_timezone(&c.timezone_id).ok())
            .unwrap_or(Tz::UTC)
    }

    pub fn hero(&self) -> HeroView {
        let now = self.now();
        let tz = self.hero_timezone();
        let city = self.hero_city();
        let zone = city
            .map(|c| c.label.clone())
            .unwrap_or_else(|| tz.name().to_string());
        let location = format::location_line(city.map(|c| c.label.as_str()));
        HeroView {
            time: format::hero_time(now, tz, self.twenty_four),
            suffix: format::hero_suffix(now, tz, self.twenty_four),
            date: format::hero_date(now, tz),
            zone,
            sun: format::sun_line(
                city.and_then(|c| c.sunrise.as_deref()),
                city.and_then(|c| c.sunset.as_deref()),
                tz,
            ),
            location,
        }
    }

    pub fn cards(&self) -> Vec<CardView> {
        let now = self.now();
        let active = self.board.active_index();
        self.board
            .list()
            .iter()
            .enumerate()
            .map(|(i, city)| CardView {
                id: city.id.clone(),
                label: city.label.clone(),
                time: format::card_time_or_utc(now, &city.timezone_id, self.twenty_four),
                meta: format::card_meta(
                    now,
                    &city.timezone_id,
                    city.sunrise.as_deref(),
                    city.sunset.as_deref(),
                ),
                active: active == Some(i),
            })
            .collect()
    }
}

impl WorldClock<SystemTimeSource> {
    pub fn with_system_clock(board: CityBoard, twenty_four: bool) -> Self {
        Self::new(SystemTimeSource::new(), board, twenty_four)
    }
}
