//! Persisted city list.
//!
//! The whole list lives as one JSON array under the `cities` key of a small
//! SQLite key/value table. Every mutation is a read-modify-write of the whole
//! array; the last writer wins.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use cityweather_weather::CityId;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::city::CityRecord;

/// Storage key holding the serialized city list
pub const CITIES_KEY: &str = "cities";

/// City store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Saved city list is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("Failed to serialize city list: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("City {0} is already saved")]
    DuplicateCity(CityId),

    #[error("Storage task failed: {0}")]
    Task(String),
}

impl StoreError {
    /// User-friendly error message for notifications.
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Task(_) => "Could not access saved cities".to_string(),
            Self::Corrupt(_) => "Saved cities are unreadable".to_string(),
            Self::Serialize(_) => "Could not save the city list".to_string(),
            Self::DuplicateCity(id) => format!("City {} is already in the list", id),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// SQLite-backed city list.
pub struct CityStore {
    conn: Connection,
}

impl CityStore {
    /// Open or create the database
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        tracing::debug!("Opened city store at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    #[cfg(test)]
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn read_raw(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub(crate) fn write_raw(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// True once a list has been written (even an empty one)
    pub fn has_saved_list(&self) -> StoreResult<bool> {
        Ok(self.read_raw(CITIES_KEY)?.is_some())
    }

    /// Saved cities in display order; empty if nothing was ever saved.
    pub fn load(&self) -> StoreResult<Vec<CityRecord>> {
        let raw = match self.read_raw(CITIES_KEY)? {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(Vec::new()),
        };

        let cities: Vec<CityRecord> = serde_json::from_str(&raw).map_err(StoreError::Corrupt)?;
        Ok(dedup_by_id(cities)
            .into_iter()
            .map(CityRecord::without_snapshot_fields)
            .collect())
    }

    /// Overwrite the saved list with a single write.
    pub fn save(&self, cities: &[CityRecord]) -> StoreResult<()> {
        if let Some(id) = first_duplicate(cities) {
            return Err(StoreError::DuplicateCity(id));
        }

        let json = serde_json::to_string(cities).map_err(StoreError::Serialize)?;
        self.write_raw(CITIES_KEY, &json)?;
        tracing::debug!("Saved {} cities", cities.len());
        Ok(())
    }

    /// Remove a city by id and return the remaining list.
    ///
    /// Removing an id that isn't saved leaves storage untouched.
    pub fn remove(&self, id: CityId) -> StoreResult<Vec<CityRecord>> {
        let mut cities = self.load()?;
        let before = cities.len();
        cities.retain(|c| c.id != id);

        if cities.len() == before {
            tracing::debug!("City {} not in saved list, nothing removed", id);
            return Ok(cities);
        }

        self.save(&cities)?;
        tracing::info!("Removed city {}", id);
        Ok(cities)
    }

    /// Append a city and return the new list.
    pub fn add(&self, city: CityRecord) -> StoreResult<Vec<CityRecord>> {
        let mut cities = self.load()?;
        if cities.iter().any(|c| c.id == city.id) {
            return Err(StoreError::DuplicateCity(city.id));
        }

        tracing::info!("Adding city {} ({})", city.id, city.name);
        cities.push(city);
        self.save(&cities)?;
        Ok(cities)
    }

    /// Delete the saved list entirely.
    pub fn clear(&self) -> StoreResult<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![CITIES_KEY])?;
        tracing::info!("Cleared saved cities");
        Ok(())
    }
}

/// Keep the first record for each id, preserving order.
fn dedup_by_id(cities: Vec<CityRecord>) -> Vec<CityRecord> {
    let mut seen = HashSet::new();
    let total = cities.len();
    let unique: Vec<CityRecord> = cities.into_iter().filter(|c| seen.insert(c.id)).collect();
    if unique.len() < total {
        tracing::warn!(
            "Saved city list had {} duplicate entries, keeping first occurrences",
            total - unique.len()
        );
    }
    unique
}

fn first_duplicate(cities: &[CityRecord]) -> Option<CityId> {
    let mut seen = HashSet::new();
    cities.iter().map(|c| c.id).find(|id| !seen.insert(*id))
}

/// City store shared between async tasks.
pub type SharedStore = Arc<Mutex<CityStore>>;

pub fn shared(store: CityStore) -> SharedStore {
    Arc::new(Mutex::new(store))
}

/// Run a store operation on the blocking pool.
pub async fn with_store<T, F>(store: &SharedStore, op: F) -> StoreResult<T>
where
    T: Send + 'static,
    F: FnOnce(&CityStore) -> StoreResult<T> + Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || op(&*store.lock()))
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
}
