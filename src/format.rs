//! Clock face strings for the hero panel and the city cards.

use crate::error::TimezoneError;
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

pub fn parse_timezone(id: &str) -> Result<Tz, TimezoneError> {
    id.parse::<Tz>().map_err(|_| TimezoneError::Unknown(id.to_string()))
}

fn instant(unix_ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(unix_ms).unwrap_or_default()
}

/// Hero time without the meridiem, e.g. `3:04:05` (or `15:04:05`).
pub fn hero_time(unix_ms: i64, tz: Tz, twenty_four: bool) -> String {
    let local = instant(unix_ms).with_timezone(&tz);
    if twenty_four {
        local.format("%H:%M:%S").to_string()
    } else {
        local.format("%-I:%M:%S").to_string()
    }
}

/// `AM`/`PM` in the hero zone, empty in 24-hour mode.
pub fn hero_suffix(unix_ms: i64, tz: Tz, twenty_four: bool) -> &'static str {
    if twenty_four {
        return "";
    }
    if instant(unix_ms).with_timezone(&tz).hour() >= 12 {
        "PM"
    } else {
        "AM"
    }
}

/// `Saturday, October 17, 2026`
pub fn hero_date(unix_ms: i64, tz: Tz) -> String {
    instant(unix_ms).with_timezone(&tz).format("%A, %B %d, %Y").to_string()
}

/// Card clock in the card's own zone.
pub fn card_time(unix_ms: i64, tz_id: &str, twenty_four: bool) -> Result<String, TimezoneError> {
    let tz = parse_timezone(tz_id)?;
    let local = instant(unix_ms).with_timezone(&tz);
    Ok(if twenty_four {
        local.format("%H:%M:%S").to_string()
    } else {
        local.format("%I:%M:%S %p").to_string()
    })
}

/// Card clock, falling back to UTC when the zone id is not recognized.
pub fn card_time_or_utc(unix_ms: i64, tz_id: &str, twenty_four: bool) -> String {
    card_time(unix_ms, tz_id, twenty_four).unwrap_or_else(|err| {
        log::debug!("{err}, formatting card in UTC");
        card_time(unix_ms, "UTC", twenty_four).unwrap_or_default()
    })
}

/// Local clock time of an ISO-8601 timestamp, `--` when absent or unreadable.
pub fn sun_time(iso: Option<&str>, tz: Tz) -> String {
    iso.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&tz).format("%-I:%M %p").to_string())
        .unwrap_or_else(|| "--".to_string())
}

/// `Sunrise 6:12 AM · Sunset 7:01 PM`
pub fn sun_line(sunrise: Option<&str>, sunset: Option<&str>, tz: Tz) -> String {
    format!("Sunrise {} · Sunset {}", sun_time(sunrise, tz), sun_time(sunset, tz))
}

/// Card footer: `Sat, Oct 17`, with ` · Sun 6:12 AM / 7:01 PM` when known.
pub fn card_meta(unix_ms: i64, tz_id: &str, sunrise: Option<&str>, sunset: Option<&str>) -> String {
    let tz = parse_timezone(tz_id).unwrap_or(Tz::UTC);
    let date = instant(unix_ms).with_timezone(&tz).format("%a, %b %d").to_string();
    if sunrise.is_none() && sunset.is_none() {
        return date;
    }
    format!("{date} · Sun {} / {}", sun_time(sunrise, tz), sun_time(sunset, tz))
}

/// Location line above the hero clock.
pub fn location_line(label: Option<&str>) -> String {
    match label {
        Some(label) if !label.is_empty() => format!("Time in {label}"),
        _ => "Local time".to_string(),
    }
}
