//! City list synchronization: load saved cities, fetch weather for all of
//! them concurrently, and merge the results back in saved order.

use std::sync::Arc;

use cityweather_weather::{FetchError, WeatherSnapshot, WeatherSource};
use futures_util::future::join_all;

use crate::city::{CityRecord, CityView};
use crate::city_store::{with_store, SharedStore, StoreResult};

/// Result of one city's fetch, as consumed by [`merge`].
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fetched(WeatherSnapshot),
    Failed(String),
}

impl From<Result<WeatherSnapshot, FetchError>> for FetchOutcome {
    fn from(result: Result<WeatherSnapshot, FetchError>) -> Self {
        match result {
            Ok(snapshot) => Self::Fetched(snapshot),
            Err(e) if e.is_timeout() => Self::Failed("request timed out".to_string()),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// Counts for one sync pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub total: usize,
    pub fetched: usize,
    pub fallback: usize,
}

/// Merged city list from one sync pass
#[derive(Debug, Clone, PartialEq)]
pub struct SyncResult {
    pub cities: Vec<CityView>,
    pub report: SyncReport,
}

/// Pair records with fetch outcomes by position.
///
/// A failed outcome yields the stored record unchanged. Records without a
/// matching outcome are treated as failed.
pub fn merge(records: Vec<CityRecord>, outcomes: Vec<FetchOutcome>) -> Vec<CityView> {
    let mut outcomes = outcomes.into_iter();
    records
        .into_iter()
        .map(|city| match outcomes.next() {
            Some(FetchOutcome::Fetched(snapshot)) => CityView {
                city,
                weather: Some(snapshot),
            },
            Some(FetchOutcome::Failed(reason)) => {
                tracing::warn!("Weather for city {} unavailable: {}", city.id, reason);
                CityView::fallback(city)
            }
            None => CityView::fallback(city),
        })
        .collect()
}

/// Loads saved cities and decorates them with current weather.
#[derive(Clone)]
pub struct CitySynchronizer {
    store: SharedStore,
    source: Arc<dyn WeatherSource>,
}

impl CitySynchronizer {
    pub fn new(store: SharedStore, source: Arc<dyn WeatherSource>) -> Self {
        Self { store, source }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Run one sync pass.
    ///
    /// Fails only when the saved list can't be read; individual fetch
    /// failures fall back to the stored record. The result is a plain value
    /// and may be dropped if the caller is no longer interested.
    pub async fn sync(&self) -> StoreResult<SyncResult> {
        let records = with_store(&self.store, |s| s.load()).await?;
        Ok(self.sync_records(records).await)
    }

    /// Fetch weather for already-loaded records.
    pub async fn sync_records(&self, records: Vec<CityRecord>) -> SyncResult {
        if records.is_empty() {
            tracing::debug!("No saved cities to sync");
            return SyncResult {
                cities: Vec::new(),
                report: SyncReport::default(),
            };
        }

        tracing::info!("Fetching weather for {} cities", records.len());

        // join_all waits for every fetch and keeps results in request order.
        let fetches = records.iter().map(|city| self.source.fetch_current(city.id));
        let outcomes: Vec<FetchOutcome> = join_all(fetches)
            .await
            .into_iter()
            .map(FetchOutcome::from)
            .collect();

        let cities = merge(records, outcomes);
        let fetched = cities.iter().filter(|c| c.has_weather()).count();
        let report = SyncReport {
            total: cities.len(),
            fetched,
            fallback: cities.len() - fetched,
        };

        tracing::info!(
            "Synced {} cities ({} with weather, {} fallback)",
            report.total,
            report.fetched,
            report.fallback
        );

        SyncResult { cities, report }
    }
}
