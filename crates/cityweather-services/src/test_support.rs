//! Test doubles shared by unit tests in this crate.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cityweather_weather::{CityId, FetchError, WeatherSnapshot, WeatherSource};
use parking_lot::Mutex;

use crate::city_store::{SharedStore, CITIES_KEY};
use crate::collaborators::{Confirmer, Notifier};

/// Weather source answering from a fixed script, optionally after a delay.
#[derive(Default)]
pub struct ScriptedSource {
    responses: HashMap<CityId, (Option<WeatherSnapshot>, u64)>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, id: CityId, snapshot: WeatherSnapshot) -> Self {
        self.ok_after(id, snapshot, 0)
    }

    pub fn ok_after(mut self, id: CityId, snapshot: WeatherSnapshot, delay_ms: u64) -> Self {
        self.responses.insert(id, (Some(snapshot), delay_ms));
        self
    }

    pub fn fail(mut self, id: CityId) -> Self {
        self.responses.insert(id, (None, 0));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of fetches that were running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for ScriptedSource {
    async fn fetch_current(&self, city_id: CityId) -> Result<WeatherSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some((snapshot, delay_ms)) = self.responses.get(&city_id) else {
            return Err(FetchError::Status {
                status: 404,
                body: "city not found".to_string(),
            });
        };

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if *delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        snapshot.clone().ok_or(FetchError::Status {
            status: 500,
            body: "scripted failure".to_string(),
        })
    }
}

/// Confirmer with a fixed answer that records what it was asked.
pub struct FixedConfirmer {
    answer: bool,
    asked: Mutex<Vec<String>>,
}

impl FixedConfirmer {
    pub fn yes() -> Self {
        Self {
            answer: true,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn no() -> Self {
        Self {
            answer: false,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn times_asked(&self) -> usize {
        self.asked.lock().len()
    }
}

impl Confirmer for FixedConfirmer {
    fn confirm(&self, title: &str, _message: &str) -> bool {
        self.asked.lock().push(title.to_string());
        self.answer
    }
}

/// Notifier that keeps every message.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

/// Overwrite the saved list with unparseable data.
pub fn corrupt(store: &SharedStore) {
    if let Err(e) = store.lock().write_raw(CITIES_KEY, "[{\"id\":") {
        panic!("failed to corrupt store: {}", e);
    }
}
