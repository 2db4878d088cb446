use crate::city::DEFAULT_TIMEZONES;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of `config.toml`. Every section and key is optional; a broken
/// file is reported and the caller falls back to defaults.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub board: BoardSettings,
    pub map: MapSettings,
    pub intervals: IntervalSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoardSettings {
    /// Seed zones; ids and labels are the zone names
    pub timezones: Vec<String>,
    pub twenty_four_hour: bool,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            timezones: DEFAULT_TIMEZONES.iter().map(|tz| tz.to_string()).collect(),
            twenty_four_hour: false,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct MapSettings {
    /// URL, file path, or `none`
    pub source: String,
    /// Object inside the topology holding the land geometry
    pub object: String,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            source: "https://cdn.jsdelivr.net/npm/world-atlas@2/land-110m.json".to_string(),
            object: "land".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntervalSettings {
    pub display_ms: u64,
    pub sync_secs: u64,
    pub terminator_secs: u64,
}

impl Default for IntervalSettings {
    fn default() -> Self {
        Self {
            display_ms: 1000,
            sync_secs: 30,
            terminator_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Settings {
    /// Read a config file. A missing file is not an error and gives defaults.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
        Self::parse(&content).map_err(|e| format!("{}: {e}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("termclock")
            .join("config.toml")
    }
}
