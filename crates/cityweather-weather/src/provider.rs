//! OpenWeatherMap current-weather client.

use async_trait::async_trait;
use cityweather_core::{Units, WeatherConfig};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::icons::map_icon;
use crate::types::{CityId, FetchError, WeatherSnapshot};

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

/// Source of current weather for a city.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch current conditions for one city. No retry is attempted.
    async fn fetch_current(&self, city_id: CityId) -> Result<WeatherSnapshot, FetchError>;
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    #[serde(default)]
    weather: Vec<OwmCondition>,
    main: OwmMain,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
}

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    units: Units,
}

impl OpenWeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            units: config.units,
        })
    }

    pub fn units(&self) -> Units {
        self.units
    }

    fn parse_body(body: &str) -> Result<WeatherSnapshot, FetchError> {
        let parsed: OwmResponse =
            serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;

        let condition = parsed.weather.into_iter().next().ok_or(FetchError::MissingCondition)?;

        Ok(WeatherSnapshot {
            icon: map_icon(&condition.icon),
            condition_code: condition.icon,
            temperature: parsed.main.temp,
            fetched_at: chrono::Utc::now(),
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherProvider {
    #[instrument(skip(self), level = "debug")]
    async fn fetch_current(&self, city_id: CityId) -> Result<WeatherSnapshot, FetchError> {
        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);

        let mut params = vec![("id", city_id.to_string()), ("appid", self.api_key.clone())];
        if let Some(units) = self.units.query_value() {
            params.push(("units", units.to_string()));
        }

        let response = self.client.get(&url).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Weather request for city {} returned {}", city_id, status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let snapshot = Self::parse_body(&body)?;
        tracing::debug!(
            "City {}: {} ({}, {}) {}",
            city_id,
            snapshot.condition_code,
            snapshot.icon.description(),
            snapshot.icon.asset_name(),
            snapshot.temperature
        );
        Ok(snapshot)
    }
}
