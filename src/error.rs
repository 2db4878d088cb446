//! Error types for the network, lookup, projection and formatting layers.
//!
//! None of these are fatal: every failure degrades to stale data, the
//! fallback projector, or UTC formatting.

use thiserror::Error;

/// Failure talking to the time/local endpoints.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Outcome of a failed city lookup. Each variant carries a distinct user hint.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("no place matched `{0}`")]
    NotFound(String),
    #[error("`{0}` has no resolvable timezone")]
    TimezoneMissing(String),
    #[error("lookup transport failure: {0}")]
    Transport(String),
}

impl LookupError {
    /// Short hint shown under the input line.
    pub fn hint(&self) -> &'static str {
        match self {
            LookupError::NotFound(_) => "City not found. Try a larger city name.",
            LookupError::TimezoneMissing(_) => "Timezone not found for that city.",
            LookupError::Transport(_) => "Lookup failed. Check your connection and try again.",
        }
    }

    /// Placeholder text for the input line after a failure.
    pub fn placeholder(&self) -> &'static str {
        match self {
            LookupError::NotFound(_) => "City not found",
            LookupError::TimezoneMissing(_) => "Timezone not found",
            LookupError::Transport(_) => "Lookup failed",
        }
    }
}

/// Map data could not be fetched or decoded; the fallback projector stays active.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("map data unavailable: {0}")]
    Fetch(String),
    #[error("map data unreadable: {0}")]
    Parse(String),
    #[error("topology has no object named `{0}`")]
    MissingObject(String),
    #[error("topology contains no land geometry")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimezoneError {
    #[error("unknown timezone id `{0}`")]
    Unknown(String),
}
