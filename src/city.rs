//! City model and its sunrise/sunset fallback.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use sunrise_sunset_calculator::SunriseSunsetParameters;

/// Zones on a fresh board.
pub const DEFAULT_TIMEZONES: [&str; 14] = [
    "UTC",
    "America/Los_Angeles",
    "America/Denver",
    "America/Chicago",
    "America/New_York",
    "Europe/London",
    "Europe/Paris",
    "Europe/Berlin",
    "Africa/Cairo",
    "Asia/Dubai",
    "Asia/Kolkata",
    "Asia/Singapore",
    "Asia/Tokyo",
    "Australia/Sydney",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub label: String,
    pub timezone_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// ISO-8601 timestamps
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
}

impl City {
    /// Board entry for a bare zone id; id, label and zone are the same string.
    pub fn from_timezone(tz: &str) -> Self {
        Self {
            id: tz.to_string(),
            label: tz.to_string(),
            timezone_id: tz.to_string(),
            latitude: None,
            longitude: None,
            sunrise: None,
            sunset: None,
        }
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// Fill missing sunrise/sunset from coordinates for the day containing
    /// `unix_secs`. Leaves server-provided values alone.
    pub fn fill_sun_times(&mut self, unix_secs: i64) {
        if self.sunrise.is_some() && self.sunset.is_some() {
            return;
        }
        let Some((lat, lon)) = self.coordinates() else {
            return;
        };
        match SunriseSunsetParameters::new(unix_secs, lat, lon).calculate() {
            Ok(result) => {
                let iso = |ts: i64| DateTime::from_timestamp(ts, 0).map(|dt| dt.to_rfc3339());
                if self.sunrise.is_none() {
                    self.sunrise = iso(result.rise);
                }
                if self.sunset.is_none() {
                    self.sunset = iso(result.set);
                }
            }
            // Polar day/night: no rise or set to show
            Err(_) => log::debug!("no sunrise/sunset for {} at {lat},{lon}", self.label),
        }
    }
}

pub fn default_cities() -> Vec<City> {
    DEFAULT_TIMEZONES.iter().map(|tz| City::from_timezone(tz)).collect()
}
