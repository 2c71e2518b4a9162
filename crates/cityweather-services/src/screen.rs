//! City list screen controller.
//!
//! State is an explicit value: every operation takes the current
//! [`ScreenState`] and returns the next one.

use cityweather_core::ScreenPhase;
use cityweather_weather::CityId;

use crate::city::{CityRecord, CityView};
use crate::city_store::with_store;
use crate::collaborators::{Confirmer, Notifier};
use crate::sync::CitySynchronizer;

pub const LOADING_CITIES: &str = "Loading cities";
pub const DELETING_CITY: &str = "Deleting city";
pub const ADDING_CITY: &str = "Adding city";

pub const DELETE_TITLE: &str = "Delete city";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete the selected city?";
pub const CLEAR_TITLE: &str = "Clear cities";
pub const CLEAR_PROMPT: &str = "Remove every saved city?";

pub const MSG_DELETED: &str = "The selected city has been deleted";
pub const MSG_EMPTY_LIST: &str = "The city list is empty";
pub const MSG_CLEARED: &str = "All cities have been removed";

/// What the screen shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenState {
    pub phase: ScreenPhase,
    pub selected_id: Option<CityId>,
    pub loading_text: String,
    pub cities: Vec<CityView>,
}

impl ScreenState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == ScreenPhase::Loading
    }

    pub fn select(self, id: CityId) -> Self {
        Self {
            selected_id: Some(id),
            ..self
        }
    }

    pub fn begin_loading(self, text: &str) -> Self {
        Self {
            phase: self.phase.on_loading(),
            loading_text: text.to_string(),
            ..self
        }
    }

    pub fn finish_loading(self, cities: Vec<CityView>) -> Self {
        Self {
            phase: self.phase.on_loaded(),
            loading_text: String::new(),
            cities,
            ..self
        }
    }

    /// Loading failed: back to idle with nothing to show.
    pub fn fail_loading(self) -> Self {
        self.finish_loading(Vec::new())
    }

    /// Operation failed before reloading: back to idle, list untouched.
    pub fn abort_loading(self) -> Self {
        Self {
            phase: self.phase.on_loaded(),
            loading_text: String::new(),
            ..self
        }
    }

    pub fn begin_delete(self, id: CityId) -> Self {
        Self {
            phase: self.phase.on_delete_requested(),
            selected_id: Some(id),
            ..self
        }
    }

    pub fn cancel_delete(self) -> Self {
        Self {
            phase: self.phase.on_delete_cancelled(),
            ..self
        }
    }
}

/// How a delete (or clear) request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    NothingToDelete,
    Failed(String),
    /// Another operation was in progress
    Busy,
}

/// How an add request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Failed(String),
    Busy,
}

/// Drives the city list: refresh on focus, add, delete.
pub struct CityScreen<C, N> {
    sync: CitySynchronizer,
    confirmer: C,
    notifier: N,
}

impl<C: Confirmer, N: Notifier> CityScreen<C, N> {
    pub fn new(sync: CitySynchronizer, confirmer: C, notifier: N) -> Self {
        Self {
            sync,
            confirmer,
            notifier,
        }
    }

    /// Screen became active: reload the list with fresh weather.
    pub async fn on_focus(&self, state: ScreenState) -> ScreenState {
        if !state.phase.can_start_sync() {
            tracing::debug!("Ignoring focus while {:?}", state.phase);
            return state;
        }
        self.reload(state.begin_loading(LOADING_CITIES)).await
    }

    async fn reload(&self, state: ScreenState) -> ScreenState {
        match self.sync.sync().await {
            Ok(result) => state.finish_loading(result.cities),
            Err(e) => {
                tracing::error!("Failed to load cities: {}", e);
                self.notifier.notify(&e.user_message());
                state.fail_loading()
            }
        }
    }

    /// Ask for confirmation, remove the city, then reload.
    pub async fn delete_city(
        &self,
        state: ScreenState,
        id: CityId,
    ) -> (ScreenState, DeleteOutcome) {
        if !state.phase.can_start_delete() {
            return (state, DeleteOutcome::Busy);
        }

        let state = state.begin_delete(id);
        if !self.confirmer.confirm(DELETE_TITLE, DELETE_PROMPT) {
            tracing::debug!("Delete of city {} cancelled", id);
            return (state.cancel_delete(), DeleteOutcome::Cancelled);
        }

        let state = state.begin_loading(DELETING_CITY);
        let result = with_store(self.sync.store(), move |s| {
            if s.load()?.is_empty() {
                return Ok(None);
            }
            s.remove(id).map(Some)
        })
        .await;

        match result {
            Ok(None) => {
                self.notifier.notify(MSG_EMPTY_LIST);
                (state.abort_loading(), DeleteOutcome::NothingToDelete)
            }
            Ok(Some(_)) => {
                self.notifier.notify(MSG_DELETED);
                (self.reload(state).await, DeleteOutcome::Deleted)
            }
            Err(e) => {
                tracing::error!("Failed to delete city {}: {}", id, e);
                let message = e.user_message();
                self.notifier.notify(&message);
                (state.abort_loading(), DeleteOutcome::Failed(message))
            }
        }
    }

    /// Save a new city, then reload.
    pub async fn add_city(
        &self,
        state: ScreenState,
        city: CityRecord,
    ) -> (ScreenState, AddOutcome) {
        if !state.phase.can_start_sync() {
            return (state, AddOutcome::Busy);
        }

        let state = state.begin_loading(ADDING_CITY);
        let name = city.name.clone();
        match with_store(self.sync.store(), move |s| s.add(city)).await {
            Ok(_) => {
                self.notifier.notify(&format!("{} has been added", name));
                (self.reload(state).await, AddOutcome::Added)
            }
            Err(e) => {
                tracing::error!("Failed to add city {}: {}", name, e);
                let message = e.user_message();
                self.notifier.notify(&message);
                (state.abort_loading(), AddOutcome::Failed(message))
            }
        }
    }

    /// Remove every saved city after confirmation.
    pub async fn clear_cities(&self, state: ScreenState) -> (ScreenState, DeleteOutcome) {
        if !state.phase.can_start_delete() {
            return (state, DeleteOutcome::Busy);
        }

        let state = ScreenState {
            phase: state.phase.on_delete_requested(),
            ..state
        };
        if !self.confirmer.confirm(CLEAR_TITLE, CLEAR_PROMPT) {
            return (state.cancel_delete(), DeleteOutcome::Cancelled);
        }

        let state = state.begin_loading(DELETING_CITY);
        match with_store(self.sync.store(), |s| s.clear()).await {
            Ok(()) => {
                self.notifier.notify(MSG_CLEARED);
                (self.reload(state).await, DeleteOutcome::Deleted)
            }
            Err(e) => {
                tracing::error!("Failed to clear cities: {}", e);
                let message = e.user_message();
                self.notifier.notify(&message);
                (state.abort_loading(), DeleteOutcome::Failed(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::city_store::{shared, CityStore, SharedStore, StoreError};
    use crate::test_support::{corrupt, FixedConfirmer, RecordingNotifier, ScriptedSource};
    use cityweather_weather::WeatherSnapshot;
    use std::sync::Arc;

    fn snapshot(code: &str, temp: f64) -> WeatherSnapshot {
        WeatherSnapshot {
            icon: cityweather_weather::map_icon(code),
            condition_code: code.to_string(),
            temperature: temp,
            fetched_at: chrono::Utc::now(),
        }
    }

    fn seeded_store(cities: &[CityRecord]) -> SharedStore {
        let store = shared(CityStore::in_memory().unwrap());
        if !cities.is_empty() {
            store.lock().save(cities).unwrap();
        }
        store
    }

    fn lima_and_quito() -> Vec<CityRecord> {
        vec![CityRecord::new(CityId(1), "Lima"), CityRecord::new(CityId(2), "Quito")]
    }

    fn screen(
        store: SharedStore,
        confirmer: FixedConfirmer,
    ) -> CityScreen<FixedConfirmer, RecordingNotifier> {
        let source = ScriptedSource::new()
            .ok(CityId(1), snapshot("01d", 295.1))
            .fail(CityId(2));
        let sync = CitySynchronizer::new(store, Arc::new(source));
        CityScreen::new(sync, confirmer, RecordingNotifier::default())
    }

    #[test]
    fn test_state_transitions() {
        let state = ScreenState::new().select(CityId(7));
        assert_eq!(state.selected_id, Some(CityId(7)));
        assert!(!state.is_loading());

        let state = state.begin_loading(LOADING_CITIES);
        assert!(state.is_loading());
        assert_eq!(state.loading_text, LOADING_CITIES);
        assert_eq!(state.selected_id, Some(CityId(7)));

        let lima = CityView::fallback(CityRecord::new(CityId(7), "Lima"));
        let state = state.finish_loading(vec![lima]);
        assert!(!state.is_loading());
        assert!(state.loading_text.is_empty());
        assert_eq!(state.cities.len(), 1);

        let confirming = state.begin_delete(CityId(7));
        assert_eq!(confirming.phase, ScreenPhase::DeleteConfirming);
        let back = confirming.cancel_delete();
        assert_eq!(back.phase, ScreenPhase::Idle);
        assert_eq!(back.cities.len(), 1);

        let failed = back.begin_loading(LOADING_CITIES).fail_loading();
        assert_eq!(failed.phase, ScreenPhase::Idle);
        assert!(failed.cities.is_empty());
    }

    #[tokio::test]
    async fn test_focus_loads_cities_with_weather() {
        let store = seeded_store(&lima_and_quito());
        let screen = screen(store, FixedConfirmer::yes());

        let state = screen.on_focus(ScreenState::new()).await;
        assert_eq!(state.phase, ScreenPhase::Idle);
        assert!(state.loading_text.is_empty());
        assert_eq!(state.cities.len(), 2);
        assert!(state.cities[0].has_weather());
        assert!(!state.cities[1].has_weather());
        assert!(screen.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_focus_with_corrupt_store_notifies_and_shows_nothing() {
        let store = seeded_store(&[]);
        corrupt(&store);
        let screen = screen(store, FixedConfirmer::yes());

        let state = screen.on_focus(ScreenState::new()).await;
        assert_eq!(state.phase, ScreenPhase::Idle);
        assert!(state.cities.is_empty());
        assert_eq!(screen.notifier.messages(), vec!["Saved cities are unreadable"]);
    }

    #[tokio::test]
    async fn test_focus_ignored_while_busy() {
        let screen = screen(seeded_store(&lima_and_quito()), FixedConfirmer::yes());
        let busy = ScreenState::new().begin_loading(LOADING_CITIES);

        let state = screen.on_focus(busy.clone()).await;
        assert_eq!(state, busy);
    }

    #[tokio::test]
    async fn test_delete_removes_city_and_reloads() {
        let store = seeded_store(&lima_and_quito());
        let screen = screen(store.clone(), FixedConfirmer::yes());
        let state = screen.on_focus(ScreenState::new()).await;

        let (state, outcome) = screen.delete_city(state, CityId(2)).await;

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(state.phase, ScreenPhase::Idle);
        assert_eq!(state.selected_id, Some(CityId(2)));
        assert_eq!(state.cities.len(), 1);
        assert_eq!(state.cities[0].id(), CityId(1));
        assert_eq!(store.lock().load().unwrap(), vec![CityRecord::new(CityId(1), "Lima")]);
        assert_eq!(screen.notifier.messages(), vec![MSG_DELETED]);
        assert_eq!(screen.confirmer.times_asked(), 1);
    }

    #[tokio::test]
    async fn test_delete_from_empty_store_writes_nothing() {
        let store = seeded_store(&[]);
        let screen = screen(store.clone(), FixedConfirmer::yes());

        let (state, outcome) = screen.delete_city(ScreenState::new(), CityId(1)).await;

        assert_eq!(outcome, DeleteOutcome::NothingToDelete);
        assert_eq!(state.phase, ScreenPhase::Idle);
        assert!(!store.lock().has_saved_list().unwrap());
        assert_eq!(screen.notifier.messages(), vec![MSG_EMPTY_LIST]);
    }

    #[tokio::test]
    async fn test_delete_cancelled_changes_nothing() {
        let store = seeded_store(&lima_and_quito());
        let screen = screen(store.clone(), FixedConfirmer::no());
        let state = screen.on_focus(ScreenState::new()).await;

        let (after, outcome) = screen.delete_city(state.clone(), CityId(1)).await;

        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(after.phase, ScreenPhase::Idle);
        assert_eq!(after.cities, state.cities);
        assert_eq!(store.lock().load().unwrap(), lima_and_quito());
        assert!(screen.notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_current_list() {
        let store = seeded_store(&lima_and_quito());
        let screen = screen(store.clone(), FixedConfirmer::yes());
        let state = screen.on_focus(ScreenState::new()).await;
        corrupt(&store);

        let (after, outcome) = screen.delete_city(state.clone(), CityId(1)).await;

        assert_eq!(
            outcome,
            DeleteOutcome::Failed("Saved cities are unreadable".to_string())
        );
        assert_eq!(after.phase, ScreenPhase::Idle);
        assert_eq!(after.cities, state.cities);
        assert_eq!(screen.notifier.messages(), vec!["Saved cities are unreadable"]);
    }

    #[tokio::test]
    async fn test_delete_while_loading_is_busy() {
        let screen = screen(seeded_store(&lima_and_quito()), FixedConfirmer::yes());
        let busy = ScreenState::new().begin_loading(LOADING_CITIES);

        let (state, outcome) = screen.delete_city(busy.clone(), CityId(1)).await;
        assert_eq!(outcome, DeleteOutcome::Busy);
        assert_eq!(state, busy);
        assert_eq!(screen.confirmer.times_asked(), 0);
    }

    #[tokio::test]
    async fn test_add_city_then_reload() {
        let store = seeded_store(&[CityRecord::new(CityId(1), "Lima")]);
        let screen = screen(store.clone(), FixedConfirmer::yes());

        let (state, outcome) = screen
            .add_city(ScreenState::new(), CityRecord::new(CityId(2), "Quito"))
            .await;

        assert_eq!(outcome, AddOutcome::Added);
        assert_eq!(state.cities.len(), 2);
        assert_eq!(state.cities[1].id(), CityId(2));
        assert_eq!(screen.notifier.messages(), vec!["Quito has been added"]);
    }

    #[tokio::test]
    async fn test_add_duplicate_city_fails() {
        let store = seeded_store(&lima_and_quito());
        let screen = screen(store.clone(), FixedConfirmer::yes());

        let (state, outcome) = screen
            .add_city(ScreenState::new(), CityRecord::new(CityId(1), "Lima"))
            .await;

        let expected = StoreError::DuplicateCity(CityId(1)).user_message();
        assert_eq!(outcome, AddOutcome::Failed(expected));
        assert_eq!(state.phase, ScreenPhase::Idle);
        assert_eq!(store.lock().load().unwrap(), lima_and_quito());
    }

    #[tokio::test]
    async fn test_clear_cities() {
        let store = seeded_store(&lima_and_quito());
        let screen = screen(store.clone(), FixedConfirmer::yes());

        let (state, outcome) = screen.clear_cities(ScreenState::new()).await;

        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert!(state.cities.is_empty());
        assert!(!store.lock().has_saved_list().unwrap());
        assert_eq!(screen.notifier.messages(), vec![MSG_CLEARED]);
    }

    #[tokio::test]
    async fn test_clear_cancelled() {
        let store = seeded_store(&lima_and_quito());
        let screen = screen(store.clone(), FixedConfirmer::no());

        let (state, outcome) = screen.clear_cities(ScreenState::new()).await;
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(state.phase, ScreenPhase::Idle);
        assert_eq!(store.lock().load().unwrap().len(), 2);
    }
}
