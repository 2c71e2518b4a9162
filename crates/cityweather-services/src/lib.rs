//! Saved-city list services: persistence, weather sync and the screen
//! controller that ties them to the UI.

pub mod city;
pub mod city_store;
pub mod collaborators;
mod error_mapping;
pub mod screen;
pub mod sync;

#[cfg(test)]
mod test_support;

pub use city::{CityRecord, CityView};
pub use city_store::{
    shared, with_store, CityStore, SharedStore, StoreError, StoreResult, CITIES_KEY,
};
pub use collaborators::{Confirmer, Notifier};
pub use screen::{AddOutcome, CityScreen, DeleteOutcome, ScreenState};
pub use sync::{merge, CitySynchronizer, FetchOutcome, SyncReport, SyncResult};
