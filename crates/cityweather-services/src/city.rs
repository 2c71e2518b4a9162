//! Saved city records and the merged rows shown on the city list.

use cityweather_weather::{CityId, WeatherSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys older writers stored alongside a city; they are display-only.
const SNAPSHOT_KEYS: [&str; 2] = ["icon", "temp"];

/// A saved city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub id: CityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Fields the city picker stored that this crate doesn't interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CityRecord {
    pub fn new(id: CityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            country: None,
            extra: Map::new(),
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Drop weather fields a previous writer may have persisted.
    pub(crate) fn without_snapshot_fields(mut self) -> Self {
        for key in SNAPSHOT_KEYS {
            self.extra.remove(key);
        }
        self
    }
}

/// One row of the city list: the stored record plus current weather, if fetched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityView {
    #[serde(flatten)]
    pub city: CityRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherSnapshot>,
}

impl CityView {
    /// Row for a city whose fetch failed or hasn't run
    pub fn fallback(city: CityRecord) -> Self {
        Self { city, weather: None }
    }

    pub fn id(&self) -> CityId {
        self.city.id
    }

    pub fn has_weather(&self) -> bool {
        self.weather.is_some()
    }
}
