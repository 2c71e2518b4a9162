use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::icons::IconKey;

/// City identifier assigned by the weather data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub u64);

impl fmt::Display for CityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CityId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Current conditions for one city. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub icon: IconKey,
    /// Raw condition code as sent by the service (e.g. "01d")
    pub condition_code: String,
    pub temperature: f64,
    pub fetched_at: DateTime<Utc>,
}

/// Per-city fetch errors
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Response has no weather condition")]
    MissingCondition,
}

impl FetchError {
    /// Whether the request itself timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_timeout())
    }
}
