use crate::api::MapSource;
use crate::board::CityBoard;
use crate::city::City;
use crate::settings::Settings;
use std::time::Duration;

/// Runtime configuration for the interactive board
#[derive(Clone, Debug, PartialEq)]
pub struct BoardConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub timezones: Vec<String>,
    pub twenty_four: bool,
    pub map_source: MapSource,
    pub map_object: String,
    pub display_interval: Duration,
    pub sync_interval: Duration,
    pub terminator_interval: Duration,
}

impl BoardConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            base_url: settings.server.base_url.clone(),
            timeout: Duration::from_secs(settings.server.timeout_secs.max(1)),
            timezones: settings.board.timezones.clone(),
            twenty_four: settings.board.twenty_four_hour,
            map_source: MapSource::parse(&settings.map.source),
            map_object: settings.map.object.clone(),
            // Floors keep a zero in the config file from spinning the loop
            display_interval: Duration::from_millis(settings.intervals.display_ms.max(100)),
            sync_interval: Duration::from_secs(settings.intervals.sync_secs.max(1)),
            terminator_interval: Duration::from_secs(settings.intervals.terminator_secs.max(1)),
        }
    }

    /// Starting board. An empty zone list means the built-in seed.
    pub fn initial_board(&self) -> CityBoard {
        if self.timezones.is_empty() {
            CityBoard::with_defaults()
        } else {
            CityBoard::from_cities(self.timezones.iter().map(|tz| City::from_timezone(tz)))
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_cadence() {
        let config = BoardConfig::default();
        assert_eq!(config.display_interval, Duration::from_secs(1));
        assert_eq!(config.sync_interval, Duration::from_secs(30));
        assert_eq!(config.terminator_interval, Duration::from_secs(60));
        assert!(matches!(config.map_source, MapSource::Url(_)));
        assert_eq!(config.initial_board().len(), 14);
    }

    #[test]
    fn zero_intervals_are_floored() {
        let settings = Settings::parse("[intervals]\ndisplay_ms = 0\nsync_secs = 0\n[server]\ntimeout_secs = 0").unwrap();
        let config = BoardConfig::from_settings(&settings);
        assert_eq!(config.display_interval, Duration::from_millis(100));
        assert_eq!(config.sync_interval, Duration::from_secs(1));
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    #[test]
    fn custom_zone_list_seeds_board() {
        let settings = Settings::parse("[board]\ntimezones = [\"Asia/Tokyo\", \"UTC\", \"Asia/Tokyo\"]").unwrap();
        let board = BoardConfig::from_settings(&settings).initial_board();
        assert_eq!(board.timezones(), ["Asia/Tokyo", "UTC"]);

        let settings = Settings::parse("[board]\ntimezones = []").unwrap();
        assert_eq!(BoardConfig::from_settings(&settings).initial_board().len(), 14);
    }
}
