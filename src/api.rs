//! HTTP client for the world-clock backend and the map data source.

use crate::city::City;
use crate::error::{ApiError, LookupError, ProjectionError};
use crate::topo::LandTopology;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct TimeResponse {
    server_unix_ms: i64,
}

/// Body of `/api/local`. Every field may be null when geolocation fails.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct LocalInfo {
    pub tz: Option<String>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

impl LocalInfo {
    /// `city, region, country` with the missing parts left out.
    pub fn label(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.city, &self.region, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    /// The device-local pseudo-city. Falls back to `fallback_tz` when the
    /// server could not place the client.
    pub fn to_city(&self, fallback_tz: &str) -> City {
        let tz = self
            .tz
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| fallback_tz.to_string());
        City {
            id: String::new(),
            label: self.label().unwrap_or_else(|| "Local time".to_string()),
            timezone_id: tz,
            latitude: self.latitude,
            longitude: self.longitude,
            sunrise: self.sunrise.clone(),
            sunset: self.sunset.clone(),
        }
    }
}

/// Body of `/api/city`, success or failure.
#[derive(Debug, Default, Deserialize)]
pub struct CityBody {
    pub label: Option<String>,
    pub tz: Option<String>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub error: Option<String>,
}

/// Turn a successfully transported `/api/city` body into a city or a lookup error.
pub fn city_from_body(query: &str, body: CityBody) -> Result<City, LookupError> {
    if let Some(error) = body.error {
        return Err(LookupError::NotFound(format!("{query}: {error}")));
    }
    let label = body.label.filter(|l| !l.is_empty()).unwrap_or_else(|| query.to_string());
    let Some(tz) = body.tz.filter(|t| !t.is_empty()) else {
        return Err(LookupError::TimezoneMissing(label));
    };
    Ok(City {
        id: label.clone(),
        label,
        timezone_id: tz,
        latitude: body.latitude,
        longitude: body.longitude,
        sunrise: body.sunrise,
        sunset: body.sunset,
    })
}

/// The remote services the clock consumes.
pub trait WorldApi: Send + Sync {
    fn server_time(&self, timezones: &[String]) -> Result<i64, ApiError>;
    fn local_info(&self) -> Result<LocalInfo, ApiError>;
    fn lookup_city(&self, query: &str) -> Result<City, LookupError>;
}

pub struct HttpApi {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("termclock/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, request: ureq::Request) -> Result<T, ApiError> {
        match request.call() {
            Ok(response) => response
                .into_json::<T>()
                .map_err(|e| ApiError::Malformed(e.to_string())),
            Err(ureq::Error::Status(code, _)) => Err(ApiError::Status(code)),
            Err(ureq::Error::Transport(t)) => Err(ApiError::Transport(t.to_string())),
        }
    }
}

impl WorldApi for HttpApi {
    fn server_time(&self, timezones: &[String]) -> Result<i64, ApiError> {
        let mut request = self.agent.get(&format!("{}/api/time", self.base_url));
        for tz in timezones {
            request = request.query("tz", tz);
        }
        let body: TimeResponse = self.get_json(request)?;
        Ok(body.server_unix_ms)
    }

    fn local_info(&self) -> Result<LocalInfo, ApiError> {
        self.get_json(self.agent.get(&format!("{}/api/local", self.base_url)))
    }

    fn lookup_city(&self, query: &str) -> Result<City, LookupError> {
        let url = format!("{}/api/city?q={}", self.base_url, urlencoding::encode(query));
        let body: CityBody = match self.agent.get(&url).call() {
            Ok(response) => response
                .into_json()
                .map_err(|e| LookupError::Transport(e.to_string()))?,
            // Error statuses still carry `{ error }`; any of them means "not found"
            Err(ureq::Error::Status(code, response)) => {
                let reason = response
                    .into_json::<CityBody>()
                    .ok()
                    .and_then(|b| b.error)
                    .unwrap_or_else(|| format!("status {code}"));
                return Err(LookupError::NotFound(format!("{query}: {reason}")));
            }
            Err(ureq::Error::Transport(t)) => return Err(LookupError::Transport(t.to_string())),
        };
        city_from_body(query, body)
    }
}

/// Where the land topology comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum MapSource {
    Url(String),
    File(PathBuf),
    Disabled,
}

impl MapSource {
    /// `http(s)://` is fetched, `none`/empty disables the map, anything else is a path.
    pub fn parse(source: &str) -> Self {
        let source = source.trim();
        if source.is_empty() || source.eq_ignore_ascii_case("none") {
            MapSource::Disabled
        } else if source.starts_with("http://") || source.starts_with("https://") {
            MapSource::Url(source.to_string())
        } else {
            MapSource::File(PathBuf::from(source))
        }
    }

    pub fn load(&self, object: &str, timeout: Duration) -> Result<LandTopology, ProjectionError> {
        match self {
            MapSource::Url(url) => {
                let response = ureq::AgentBuilder::new()
                    .timeout(timeout)
                    .build()
                    .get(url)
                    .call()
                    .map_err(|e| ProjectionError::Fetch(e.to_string()))?;
                LandTopology::from_reader(response.into_reader(), object)
            }
            MapSource::File(path) => {
                let file = std::fs::File::open(path)
                    .map_err(|e| ProjectionError::Fetch(format!("{}: {e}", path.display())))?;
                LandTopology::from_reader(std::io::BufReader::new(file), object)
            }
            MapSource::Disabled => Err(ProjectionError::Fetch("map disabled".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: &str) -> CityBody {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn city_body_success() {
        let city = city_from_body(
            "lisbon",
            body(r#"{"label":"Lisboa, Portugal","tz":"Europe/Lisbon","latitude":38.72,"longitude":-9.14,"sunrise":null,"sunset":null}"#),
        )
        .unwrap();
        assert_eq!(city.id, "Lisboa, Portugal");
        assert_eq!(city.label, "Lisboa, Portugal");
        assert_eq!(city.timezone_id, "Europe/Lisbon");
        assert_eq!(city.coordinates(), Some((38.72, -9.14)));
    }

    #[test]
    fn error_body_is_not_found() {
        let err = city_from_body("atlantis", body(r#"{"error":"not found"}"#)).unwrap_err();
        assert!(matches!(err, LookupError::NotFound(_)));
        assert_eq!(err.hint(), "City not found. Try a larger city name.");
    }

    #[test]
    fn missing_timezone_is_distinct() {
        let err = city_from_body("point nemo", body(r#"{"label":"Point Nemo","latitude":-48.9,"longitude":-123.4}"#))
            .unwrap_err();
        assert_eq!(err, LookupError::TimezoneMissing("Point Nemo".to_string()));
        assert_eq!(err.hint(), "Timezone not found for that city.");
    }

    #[test]
    fn label_defaults_to_query() {
        let city = city_from_body("Oslo", body(r#"{"tz":"Europe/Oslo"}"#)).unwrap();
        assert_eq!(city.id, "Oslo");
    }

    #[test]
    fn local_label_joins_known_parts() {
        let info: LocalInfo = serde_json::from_str(
            r#"{"ip":"203.0.113.9","tz":"Europe/Lisbon","city":"Lisbon","region":null,"country":"Portugal","latitude":38.7,"longitude":-9.1,"sunrise":null,"sunset":null}"#,
        )
        .unwrap();
        assert_eq!(info.label().as_deref(), Some("Lisbon, Portugal"));
        let city = info.to_city("UTC");
        assert_eq!(city.timezone_id, "Europe/Lisbon");
        assert_eq!(city.label, "Lisbon, Portugal");
    }

    #[test]
    fn empty_local_info_falls_back() {
        let city = LocalInfo::default().to_city("America/Chicago");
        assert_eq!(city.label, "Local time");
        assert_eq!(city.timezone_id, "America/Chicago");
    }

    #[test]
    fn map_source_parsing() {
        assert_eq!(MapSource::parse("none"), MapSource::Disabled);
        assert_eq!(MapSource::parse(""), MapSource::Disabled);
        assert_eq!(
            MapSource::parse("https://cdn.example/land.json"),
            MapSource::Url("https://cdn.example/land.json".to_string())
        );
        assert_eq!(MapSource::parse("./land.json"), MapSource::File(PathBuf::from("./land.json")));
    }

    #[test]
    fn missing_map_file_is_a_fetch_error() {
        let source = MapSource::File(PathBuf::from("/nonexistent/land-110m.json"));
        assert!(matches!(
            source.load("land", Duration::from_secs(1)),
            Err(ProjectionError::Fetch(_))
        ));
    }

    #[test]
    fn unreachable_server_is_a_transport_error() {
        // Port 9 (discard) on localhost is closed on any sane test host
        let api = HttpApi::new("http://127.0.0.1:9", Duration::from_millis(500));
        assert!(matches!(api.server_time(&[]), Err(ApiError::Transport(_))));
        assert!(matches!(api.lookup_city("paris"), Err(LookupError::Transport(_))));
    }
}
